use mcn_forwarder_model::{ContainerRecord, Error, ForwardedPortSet, InspectOutput};

/// Derives the ports to forward from `docker inspect` output.
#[derive(Clone, Copy, Debug, Default)]
pub struct PortSetExtractor;

impl PortSetExtractor {
    /// Returns the host ports of all locally reachable bindings in the payload.
    ///
    /// Bindings on a specific non-loopback interface are skipped, as they
    /// cannot be reached through the machine's loopback interface that the
    /// tunnel connects to. An empty or `null` payload has no ports.
    pub fn extract(payload: &[u8]) -> Result<ForwardedPortSet, Error> {
        if payload.iter().all(u8::is_ascii_whitespace) {
            return Ok(ForwardedPortSet::new());
        }

        let container_records = serde_json::from_slice::<Option<Vec<ContainerRecord>>>(payload)?
            .unwrap_or_default();

        let forwarded_ports = container_records
            .iter()
            .flat_map(|container_record| container_record.port_bindings())
            .filter(|binding| binding.is_locally_reachable())
            .map(|binding| binding.host_port.clone())
            .collect();

        Ok(forwarded_ports)
    }

    /// Returns the ports to forward for the given inspection result.
    pub fn extract_output(inspect_output: &InspectOutput) -> Result<ForwardedPortSet, Error> {
        match inspect_output {
            InspectOutput::NoContainers => Ok(ForwardedPortSet::new()),
            InspectOutput::Payload(payload) => Self::extract(payload),
        }
    }
}
