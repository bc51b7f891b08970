/// Result of inspecting the containers on a machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InspectOutput {
    /// There were no containers to inspect.
    NoContainers,
    /// Raw `docker inspect` output.
    Payload(Vec<u8>),
}
