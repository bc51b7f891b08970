use crate::Error;

/// Why the forwarder stopped.
#[derive(Debug)]
pub enum ShutdownReason {
    /// The operator asked the forwarder to stop.
    Interrupted,
    /// Reconciliation stopped because of an error.
    Fault(Error),
}
