use std::process::Stdio;

use async_trait::async_trait;
use mcn_forwarder_model::{Error, MachineName};
use tokio::process::Command;
use tracing::trace;

/// Runs commands on the machine and captures their output.
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Runs the command on the machine, returning its standard output.
    ///
    /// A command that exits unsuccessfully is an error.
    async fn run(&self, args: &[String]) -> Result<Vec<u8>, Error>;
}

/// Runs commands on a Docker Machine through `docker-machine ssh`.
#[derive(Clone, Debug)]
pub struct MachineSsh {
    /// Program used to reach the machine.
    machine_binary: String,
    /// Machine to run commands on.
    machine_name: MachineName,
}

impl MachineSsh {
    /// Returns a new `MachineSsh`.
    pub fn new(machine_binary: impl Into<String>, machine_name: MachineName) -> Self {
        Self {
            machine_binary: machine_binary.into(),
            machine_name,
        }
    }

    fn command_line(&self, args: &[String]) -> String {
        let mut command_line = format!("{} ssh {}", self.machine_binary, self.machine_name);
        args.iter().for_each(|arg| {
            command_line.push(' ');
            command_line.push_str(arg);
        });
        command_line
    }
}

#[async_trait]
impl RemoteExecutor for MachineSsh {
    async fn run(&self, args: &[String]) -> Result<Vec<u8>, Error> {
        trace!(command = %self.command_line(args), "Running remote command.");

        // `kill_on_drop` so that a stop request which drops this future does
        // not leave the command running. The command gets its own process
        // group so that Ctrl+C in the terminal only reaches the forwarder.
        let mut command = Command::new(&self.machine_binary);
        command
            .arg("ssh")
            .arg(&self.machine_name)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let output = command
            .output()
            .await
            .map_err(|error| Error::RemoteExecSpawn {
                command: self.command_line(args),
                error,
            })?;

        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(Error::RemoteExecStatus {
                command: self.command_line(args),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}
