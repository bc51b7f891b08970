use std::time::Duration;

/// Tunables for observing containers and running the tunnel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForwarderConfig {
    /// Program used to run commands on, and open tunnels to, the machine.
    pub machine_binary: String,
    /// Port of the Docker daemon on the machine, which is always forwarded.
    pub management_port: u16,
    /// Time to wait between polls of the machine's containers.
    pub poll_interval: Duration,
    /// Whether to pass `-vvv` to the tunnel process.
    pub ssh_verbose: bool,
}

impl ForwarderConfig {
    /// Default program used to reach the machine.
    pub const MACHINE_BINARY_DEFAULT: &'static str = "docker-machine";
    /// TLS port of the Docker daemon.
    pub const MANAGEMENT_PORT_DEFAULT: u16 = 2376;
    /// Default time between polls.
    pub const POLL_INTERVAL_DEFAULT: Duration = Duration::from_millis(100);
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            machine_binary: Self::MACHINE_BINARY_DEFAULT.to_string(),
            management_port: Self::MANAGEMENT_PORT_DEFAULT,
            poll_interval: Self::POLL_INTERVAL_DEFAULT,
            ssh_verbose: false,
        }
    }
}
