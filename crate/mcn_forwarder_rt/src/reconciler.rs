use std::time::Duration;

use mcn_forwarder_model::{Error, ForwardedPortSet, PortSetDiff};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{ContainerObserver, PortSetExtractor, TunnelSupervisor};

/// Where the [`Reconciler`] is in its polling loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcilerState {
    /// Not yet started.
    Idle,
    /// Observing the machine's containers.
    Polling,
    /// The last poll changed the forwarded ports and the tunnel was replaced.
    ChangeDetected,
    /// The last poll matched the forwarded ports.
    NoChange,
    /// The loop has exited.
    Stopped,
}

/// Result of applying one observation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The tunnel was replaced to apply the difference.
    Changed(PortSetDiff),
    /// The observed ports are already forwarded.
    Unchanged,
}

/// What a [`Reconciler`] hands back when its loop exits.
#[derive(Debug)]
pub struct ReconcilerExit<S> {
    /// The supervisor, which still owns any running tunnel.
    pub supervisor: S,
    /// Where the loop ended, which is always [`ReconcilerState::Stopped`].
    pub state: ReconcilerState,
    /// `Ok` when stopped by request, otherwise the error that stopped the
    /// loop.
    pub outcome: Result<(), Error>,
}

/// Keeps the tunnel forwarding the ports published by the machine's
/// containers.
///
/// Every cycle observes the containers, derives the ports to forward, and
/// replaces the tunnel when they differ from the ports that were last
/// applied. Cycles run one after another, so two tunnel replacements never
/// overlap.
#[derive(Debug)]
pub struct Reconciler<O, S> {
    /// Reads the machine's containers.
    observer: O,
    /// Owns the tunnel.
    supervisor: S,
    /// Time to wait between cycles.
    poll_interval: Duration,
    /// Ports the active tunnel forwards.
    forwarded_ports: ForwardedPortSet,
    /// Where the loop is.
    state: ReconcilerState,
}

impl<O, S> Reconciler<O, S>
where
    O: ContainerObserver,
    S: TunnelSupervisor,
{
    /// Returns an idle `Reconciler`.
    pub fn new(observer: O, supervisor: S, poll_interval: Duration) -> Self {
        Self {
            observer,
            supervisor,
            poll_interval,
            forwarded_ports: ForwardedPortSet::new(),
            state: ReconcilerState::Idle,
        }
    }

    /// Returns where the loop is.
    pub fn state(&self) -> ReconcilerState {
        self.state
    }

    /// Returns the ports the active tunnel forwards.
    pub fn forwarded_ports(&self) -> &ForwardedPortSet {
        &self.forwarded_ports
    }

    /// Runs the loop until `stop` is cancelled or a cycle fails.
    ///
    /// Errors are not retried: the supervisor is handed back together with
    /// the error so that the caller can terminate the tunnel.
    pub async fn run(mut self, stop: CancellationToken) -> ReconcilerExit<S> {
        let outcome = self.run_until_stopped(&stop).await;
        self.state = ReconcilerState::Stopped;

        match &outcome {
            Ok(()) => info!("Stopped polling for container changes."),
            Err(error) => error!(%error, "Stopped polling for container changes."),
        }

        ReconcilerExit {
            supervisor: self.supervisor,
            state: self.state,
            outcome,
        }
    }

    /// Starts the tunnel forwarding only the management port.
    pub async fn establish_baseline(&mut self) -> Result<(), Error> {
        let baseline = ForwardedPortSet::new();
        self.supervisor.replace(&baseline).await?;
        self.forwarded_ports = baseline;

        Ok(())
    }

    /// Observes the machine once and applies any change.
    pub async fn reconcile_once(&mut self) -> Result<CycleOutcome, Error> {
        let candidate = self.observe().await?;
        self.apply(candidate).await
    }

    async fn run_until_stopped(&mut self, stop: &CancellationToken) -> Result<(), Error> {
        self.establish_baseline().await?;

        loop {
            // Observation may be abandoned part way, but tunnel replacement
            // always runs to completion.
            let candidate = tokio::select! {
                biased;
                _ = stop.cancelled() => return Ok(()),
                candidate = self.observe() => candidate?,
            };
            self.apply(candidate).await?;

            tokio::select! {
                biased;
                _ = stop.cancelled() => return Ok(()),
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }

    async fn observe(&mut self) -> Result<ForwardedPortSet, Error> {
        self.state = ReconcilerState::Polling;

        let ids = self.observer.list_container_ids().await?;
        let inspect_output = self.observer.inspect_all(&ids).await?;

        PortSetExtractor::extract_output(&inspect_output)
    }

    async fn apply(&mut self, candidate: ForwardedPortSet) -> Result<CycleOutcome, Error> {
        let diff = PortSetDiff::between(&self.forwarded_ports, &candidate);
        if diff.is_unchanged() {
            self.state = ReconcilerState::NoChange;
            return Ok(CycleOutcome::Unchanged);
        }

        self.state = ReconcilerState::ChangeDetected;
        info!(
            added = ?diff.added,
            removed = ?diff.removed,
            "Change detected, reloading..."
        );
        debug!(previous = %self.forwarded_ports, current = %candidate);

        self.supervisor.replace(&candidate).await?;
        self.forwarded_ports = candidate;

        Ok(CycleOutcome::Changed(diff))
    }
}
