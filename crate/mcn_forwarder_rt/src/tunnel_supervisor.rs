use async_trait::async_trait;
use mcn_forwarder_model::{Error, ForwardedPortSet, PortForward};
use tracing::info;

use crate::TunnelLauncher;

/// Owns the single forwarding tunnel to the machine.
#[async_trait]
pub trait TunnelSupervisor: Send {
    /// Replaces the active tunnel with one that forwards the given ports.
    ///
    /// The management port is always forwarded in addition to `ports`. If
    /// the active tunnel cannot be terminated, no new tunnel is started.
    async fn replace(&mut self, ports: &ForwardedPortSet) -> Result<(), Error>;

    /// Terminates the active tunnel, if any.
    async fn terminate(&mut self) -> Result<(), Error>;
}

/// Supervises a tunnel run as a local process.
pub struct ProcessTunnelSupervisor<L>
where
    L: TunnelLauncher,
{
    /// Starts and kills forwarding processes.
    launcher: L,
    /// Port of the machine's Docker daemon.
    management_port: u16,
    /// The running tunnel.
    active: Option<L::Handle>,
}

impl<L> ProcessTunnelSupervisor<L>
where
    L: TunnelLauncher,
{
    /// Returns a supervisor with no active tunnel.
    pub fn new(launcher: L, management_port: u16) -> Self {
        Self {
            launcher,
            management_port,
            active: None,
        }
    }

    /// Returns whether a tunnel is running.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Returns the mappings for a tunnel that forwards the given ports.
    pub fn forwards(&self, ports: &ForwardedPortSet) -> Vec<PortForward> {
        std::iter::once(PortForward::same_port(self.management_port.to_string()))
            .chain(ports.iter().map(PortForward::same_port))
            .collect()
    }
}

#[async_trait]
impl<L> TunnelSupervisor for ProcessTunnelSupervisor<L>
where
    L: TunnelLauncher,
{
    async fn replace(&mut self, ports: &ForwardedPortSet) -> Result<(), Error> {
        self.terminate().await?;

        let forwards = self.forwards(ports);
        let handle = self
            .launcher
            .launch(&forwards)
            .map_err(|error| Error::TunnelStart {
                ports: ports.clone(),
                error,
            })?;

        info!(
            pid = ?self.launcher.process_id(&handle),
            %ports,
            "Started SSH forwarding process."
        );
        self.active = Some(handle);

        Ok(())
    }

    async fn terminate(&mut self) -> Result<(), Error> {
        if let Some(handle) = self.active.as_mut() {
            let pid = self.launcher.process_id(handle);
            info!(?pid, "Killing existing SSH forwarding process.");

            self.launcher
                .kill(handle)
                .await
                .map_err(|error| Error::TunnelTerminate { pid, error })?;

            self.active = None;
        }

        Ok(())
    }
}
