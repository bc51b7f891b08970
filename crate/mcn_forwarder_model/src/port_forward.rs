use std::fmt;

/// One local to remote port mapping of the SSH tunnel.
///
/// Renders in the `local_port:remote_host:remote_port` form that `ssh -L`
/// takes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortForward {
    /// Port listened on locally.
    pub local_port: String,
    /// Host to connect to, resolved on the remote end of the tunnel.
    pub remote_host: String,
    /// Port to connect to on the remote host.
    pub remote_port: String,
}

impl PortForward {
    /// Host that forwarded connections are opened to on the remote machine.
    pub const REMOTE_LOOPBACK: &'static str = "127.0.0.1";

    /// Returns a mapping that uses the same port number on both ends.
    pub fn same_port(port: impl Into<String>) -> Self {
        let port = port.into();
        Self {
            local_port: port.clone(),
            remote_host: Self::REMOTE_LOOPBACK.to_string(),
            remote_port: port,
        }
    }
}

impl fmt::Display for PortForward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.local_port, self.remote_host, self.remote_port
        )
    }
}
