use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

/// One published port of a container, as reported by `docker inspect`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PortBinding {
    /// Interface on the Docker host that the port is published on.
    #[serde(rename = "HostIp", default)]
    pub host_ip: String,
    /// Port on the Docker host.
    #[serde(rename = "HostPort", default)]
    pub host_port: String,
}

impl PortBinding {
    /// Returns whether the published port can be reached at `127.0.0.1` on
    /// the host, which is where the tunnel connects to.
    ///
    /// This is the case for ports bound to `127.0.0.1`, or to a wildcard
    /// address. Docker leaves `HostIp` empty when the binding was requested
    /// without an interface, which also means all interfaces. Other loopback
    /// addresses such as `127.0.0.2` or `::1` are not reachable at
    /// `127.0.0.1`.
    pub fn is_locally_reachable(&self) -> bool {
        let host_ip = self.host_ip.trim();
        if host_ip.is_empty() {
            return true;
        }

        host_ip
            .parse::<IpAddr>()
            .map(|ip| match ip {
                IpAddr::V4(ip) => ip == Ipv4Addr::LOCALHOST || ip.is_unspecified(),
                IpAddr::V6(ip) => ip.is_unspecified(),
            })
            .unwrap_or(false)
    }
}
