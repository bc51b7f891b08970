//! Keeps an SSH port-forwarding tunnel to a Docker Machine in sync with the
//! ports that its containers publish.
//!
//! The machine's containers are inspected every 100 milliseconds by default.
//! When the locally reachable published ports change, the tunnel is replaced
//! with one that forwards exactly those ports, plus the Docker daemon port.

pub use mcn_forwarder_model as model;
pub use mcn_forwarder_rt as rt;
