use crate::ForwardedPortSet;

/// Ports added and removed between the applied and the observed port sets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PortSetDiff {
    /// Ports in the observed set that are not currently forwarded.
    pub added: Vec<String>,
    /// Ports currently forwarded that are no longer observed.
    pub removed: Vec<String>,
}

impl PortSetDiff {
    /// Computes the difference going from `current` to `candidate`.
    pub fn between(current: &ForwardedPortSet, candidate: &ForwardedPortSet) -> Self {
        let added = candidate.difference(current).cloned().collect();
        let removed = current.difference(candidate).cloned().collect();

        Self { added, removed }
    }

    /// Returns whether both sets hold the same ports.
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
