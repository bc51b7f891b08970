use std::future::Future;

use mcn_forwarder_model::{Error, ShutdownReason};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{ContainerObserver, Reconciler, ReconcilerExit, TunnelSupervisor};

/// How the forwarder shut down.
#[derive(Debug)]
pub struct Shutdown {
    /// Why reconciliation stopped.
    pub reason: ShutdownReason,
    /// Result of terminating the tunnel.
    pub cleanup: Result<(), Error>,
}

impl Shutdown {
    /// Returns whether the forwarder was stopped by the operator and cleaned
    /// up without error.
    pub fn is_clean(&self) -> bool {
        matches!(self.reason, ShutdownReason::Interrupted) && self.cleanup.is_ok()
    }
}

/// Runs the reconciler in the background and shuts it down on request or on
/// failure.
///
/// This is the only holder of the token that stops the reconciler.
#[derive(Debug, Default)]
pub struct LifecycleController {
    stop: CancellationToken,
}

impl LifecycleController {
    /// Returns a new `LifecycleController`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `reconciler` until `stop_request` completes or reconciliation
    /// fails, then terminates the tunnel.
    pub async fn run<O, S, F>(self, reconciler: Reconciler<O, S>, stop_request: F) -> Shutdown
    where
        O: ContainerObserver + 'static,
        S: TunnelSupervisor + 'static,
        F: Future<Output = ()>,
    {
        let reconcile_task = tokio::spawn(reconciler.run(self.stop.clone()));

        let reconcile = async {
            let joined = reconcile_task.await;
            // Releases the stop watch when reconciliation ended on its own.
            self.stop.cancel();
            joined
        };
        let stop_watch = async {
            tokio::select! {
                biased;
                _ = stop_request => {
                    info!("Received stop request, cleaning up...");
                    self.stop.cancel();
                    true
                }
                _ = self.stop.cancelled() => false,
            }
        };
        let (joined, stop_requested) = tokio::join!(reconcile, stop_watch);

        match joined {
            Ok(ReconcilerExit {
                supervisor,
                outcome,
                ..
            }) => {
                let reason = match outcome {
                    Ok(()) => ShutdownReason::Interrupted,
                    // The interrupt also reaches commands running on the
                    // machine, which then exit unsuccessfully.
                    Err(error) if stop_requested => {
                        debug!(%error, "Reconciliation failed while stopping.");
                        ShutdownReason::Interrupted
                    }
                    Err(error) => ShutdownReason::Fault(error),
                };
                let cleanup = Self::cleanup(supervisor).await;

                Shutdown { reason, cleanup }
            }
            // The supervisor was dropped with the task, and dropping a tunnel
            // handle kills the tunnel's process group.
            Err(join_error) => {
                let error = Error::ReconcilerAbort {
                    message: join_error.to_string(),
                };
                error!(%error, "Reconciliation task did not complete.");

                Shutdown {
                    reason: ShutdownReason::Fault(error),
                    cleanup: Ok(()),
                }
            }
        }
    }

    async fn cleanup<S>(mut supervisor: S) -> Result<(), Error>
    where
        S: TunnelSupervisor,
    {
        match supervisor.terminate().await {
            Ok(()) => {
                info!("Cleanup successful.");
                Ok(())
            }
            Err(error) => {
                error!(%error, "Error attempting cleanup.");
                Err(error)
            }
        }
    }
}
