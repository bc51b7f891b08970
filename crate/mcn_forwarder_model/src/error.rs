use std::{fmt, io, process::ExitStatus};

use crate::ForwardedPortSet;

/// Error while forwarding Docker Machine ports.
#[derive(Debug)]
pub enum Error {
    /// Machine name was empty or contained whitespace.
    MachineNameInvalid {
        /// The rejected name.
        name: String,
    },
    /// Failed to launch a command on the machine.
    RemoteExecSpawn {
        /// The command line that was run.
        command: String,
        /// Underlying IO error.
        error: io::Error,
    },
    /// A command on the machine exited unsuccessfully.
    RemoteExecStatus {
        /// The command line that was run.
        command: String,
        /// Exit status of the command.
        status: ExitStatus,
        /// Trimmed standard error of the command.
        stderr: String,
    },
    /// `docker inspect` output could not be read as container records.
    Decode(serde_json::Error),
    /// Failed to launch the forwarding process.
    TunnelStart {
        /// Container ports the tunnel was to forward.
        ports: ForwardedPortSet,
        /// Underlying IO error.
        error: io::Error,
    },
    /// Failed to kill the forwarding process.
    TunnelTerminate {
        /// Process ID of the tunnel, if it was known.
        pid: Option<u32>,
        /// Underlying IO error.
        error: io::Error,
    },
    /// The reconciliation task panicked or was aborted.
    ReconcilerAbort {
        /// Description of the failure.
        message: String,
    },
}

impl Error {
    /// Returns whether this error came from running a command on the machine.
    pub fn is_remote_exec(&self) -> bool {
        matches!(
            self,
            Self::RemoteExecSpawn { .. } | Self::RemoteExecStatus { .. }
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::MachineNameInvalid { name } => write!(
                f,
                "Machine name `{}` is invalid: it must be non-empty and contain no whitespace.",
                name
            ),
            Self::RemoteExecSpawn { command, .. } => {
                write!(f, "Failed to run `{}`.", command)
            }
            Self::RemoteExecStatus {
                command,
                status,
                stderr,
            } => {
                write!(f, "`{}` exited with {}", command, status)?;
                if stderr.is_empty() {
                    write!(f, ".")
                } else {
                    write!(f, ": {}", stderr)
                }
            }
            Self::Decode(..) => write!(f, "Failed to decode `docker inspect` output."),
            Self::TunnelStart { ports, .. } => write!(
                f,
                "Failed to start SSH forwarding process for ports {}.",
                ports
            ),
            Self::TunnelTerminate { pid: Some(pid), .. } => {
                write!(f, "Failed to kill SSH forwarding process {}.", pid)
            }
            Self::TunnelTerminate { pid: None, .. } => {
                write!(f, "Failed to kill SSH forwarding process.")
            }
            Self::ReconcilerAbort { message } => {
                write!(f, "Reconciliation task stopped unexpectedly: {}", message)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MachineNameInvalid { .. } => None,
            Self::RemoteExecSpawn { error, .. } => Some(error),
            Self::RemoteExecStatus { .. } => None,
            Self::Decode(error) => Some(error),
            Self::TunnelStart { error, .. } => Some(error),
            Self::TunnelTerminate { error, .. } => Some(error),
            Self::ReconcilerAbort { .. } => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error)
    }
}
