pub use crate::{
    container_record::{ContainerRecord, NetworkSettings},
    error::Error,
    forwarded_port_set::ForwardedPortSet,
    forwarder_config::ForwarderConfig,
    inspect_output::InspectOutput,
    machine_name::MachineName,
    port_binding::PortBinding,
    port_forward::PortForward,
    port_set_diff::PortSetDiff,
    shutdown_reason::ShutdownReason,
};

mod container_record;
mod error;
mod forwarded_port_set;
mod forwarder_config;
mod inspect_output;
mod machine_name;
mod port_binding;
mod port_forward;
mod port_set_diff;
mod shutdown_reason;
