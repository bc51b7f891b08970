use std::{io, process::Stdio};

use async_trait::async_trait;
use mcn_forwarder_model::{MachineName, PortForward};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// Starts and kills port forwarding processes.
#[async_trait]
pub trait TunnelLauncher: Send + Sync {
    /// Handle to a running forwarding process.
    type Handle: Send + Sync;

    /// Starts a forwarding process for the given mappings.
    ///
    /// This returns once the process is launched, not when the tunnel is
    /// accepting connections.
    fn launch(&self, forwards: &[PortForward]) -> io::Result<Self::Handle>;

    /// Kills the forwarding process and waits for it to exit.
    ///
    /// Killing a process that has already exited is not an error.
    async fn kill(&self, handle: &mut Self::Handle) -> io::Result<()>;

    /// Returns the OS process ID of the handle, if it is still known.
    fn process_id(&self, handle: &Self::Handle) -> Option<u32>;
}

/// A running `docker-machine ssh -N` process.
#[derive(Debug)]
pub struct TunnelHandle {
    child: Child,
}

impl TunnelHandle {
    /// Returns the OS process ID, if the process has not been reaped.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    async fn kill(&mut self) -> io::Result<()> {
        if let Some(status) = self.child.try_wait()? {
            warn!(%status, "SSH forwarding process had already exited.");
            return Ok(());
        }

        // `docker-machine` runs `ssh` as a child process, which holds the
        // listening ports, so the whole process group is killed.
        #[cfg(unix)]
        if let Some(pid) = self.child.id() {
            kill_process_group(pid)?;
        }

        self.child.kill().await
    }
}

impl Drop for TunnelHandle {
    fn drop(&mut self) {
        // `kill_on_drop` only reaches `docker-machine`, not its `ssh` child.
        #[cfg(unix)]
        if let (Ok(None), Some(pid)) = (self.child.try_wait(), self.child.id()) {
            if let Err(error) = kill_process_group(pid) {
                warn!(pid, %error, "Failed to kill SSH forwarding process group.");
            }
        }
    }
}

#[cfg(unix)]
fn kill_process_group(pid: u32) -> io::Result<()> {
    use nix::{
        errno::Errno,
        sys::signal::{killpg, Signal},
        unistd::Pid,
    };

    match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(errno) => Err(io::Error::from(errno)),
    }
}

/// Opens tunnels to a Docker Machine with `docker-machine ssh <machine> -N -L ..`.
#[derive(Clone, Debug)]
pub struct MachineSshTunnel {
    /// Program used to reach the machine.
    machine_binary: String,
    /// Machine to forward ports from.
    machine_name: MachineName,
    /// Whether to pass `-vvv` to `ssh`.
    ssh_verbose: bool,
}

impl MachineSshTunnel {
    /// Returns a new `MachineSshTunnel`.
    pub fn new(
        machine_binary: impl Into<String>,
        machine_name: MachineName,
        ssh_verbose: bool,
    ) -> Self {
        Self {
            machine_binary: machine_binary.into(),
            machine_name,
            ssh_verbose,
        }
    }

    /// Returns the arguments passed to the machine binary.
    ///
    /// `-N` stops `ssh` from running a remote shell.
    pub fn args(&self, forwards: &[PortForward]) -> Vec<String> {
        let mut args = vec![
            String::from("ssh"),
            self.machine_name.to_string(),
            String::from("-N"),
        ];
        if self.ssh_verbose {
            args.push(String::from("-vvv"));
        }
        forwards.iter().for_each(|forward| {
            args.push(String::from("-L"));
            args.push(forward.to_string());
        });

        args
    }
}

#[async_trait]
impl TunnelLauncher for MachineSshTunnel {
    type Handle = TunnelHandle;

    fn launch(&self, forwards: &[PortForward]) -> io::Result<TunnelHandle> {
        let args = self.args(forwards);
        debug!(binary = %self.machine_binary, ?args, "Running SSH forwarding command.");

        let mut command = Command::new(&self.machine_binary);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let child = command.spawn()?;

        Ok(TunnelHandle { child })
    }

    async fn kill(&self, handle: &mut TunnelHandle) -> io::Result<()> {
        handle.kill().await
    }

    fn process_id(&self, handle: &TunnelHandle) -> Option<u32> {
        handle.id()
    }
}
