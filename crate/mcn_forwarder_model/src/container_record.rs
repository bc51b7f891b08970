use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::PortBinding;

/// The subset of a `docker inspect` record needed to forward ports.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContainerRecord {
    /// Network settings, which include the published ports.
    #[serde(rename = "NetworkSettings", default)]
    pub network_settings: NetworkSettings,
}

/// Network settings of a container.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct NetworkSettings {
    /// Map from container port specification, e.g. `80/tcp`, to the host
    /// bindings for that port.
    ///
    /// Docker reports `null` for ports that are exposed but not published.
    #[serde(rename = "Ports", default)]
    pub ports: Option<IndexMap<String, Option<Vec<PortBinding>>>>,
}

impl ContainerRecord {
    /// Returns an iterator over every host binding of every published port.
    pub fn port_bindings(&self) -> impl Iterator<Item = &PortBinding> + '_ {
        self.network_settings
            .ports
            .iter()
            .flat_map(|ports| ports.values())
            .flatten()
            .flatten()
    }
}
