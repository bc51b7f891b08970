pub use crate::{
    container_observer::{ContainerObserver, MachineContainerObserver},
    lifecycle_controller::{LifecycleController, Shutdown},
    port_set_extractor::PortSetExtractor,
    reconciler::{CycleOutcome, Reconciler, ReconcilerExit, ReconcilerState},
    remote_executor::{MachineSsh, RemoteExecutor},
    tunnel_launcher::{MachineSshTunnel, TunnelHandle, TunnelLauncher},
    tunnel_supervisor::{ProcessTunnelSupervisor, TunnelSupervisor},
};

mod container_observer;
mod lifecycle_controller;
mod port_set_extractor;
mod reconciler;
mod remote_executor;
mod tunnel_launcher;
mod tunnel_supervisor;

#[cfg(test)]
mod test_support;
