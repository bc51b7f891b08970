use async_trait::async_trait;
use mcn_forwarder_model::{Error, InspectOutput};

use crate::RemoteExecutor;

/// Reads the containers present on the machine.
#[async_trait]
pub trait ContainerObserver: Send + Sync {
    /// Returns the IDs of all containers, running or not.
    async fn list_container_ids(&self) -> Result<Vec<String>, Error>;

    /// Returns `docker inspect` output for the given containers.
    ///
    /// An empty `ids` slice returns [`InspectOutput::NoContainers`] without
    /// running anything.
    async fn inspect_all(&self, ids: &[String]) -> Result<InspectOutput, Error>;
}

/// Observes containers by running `docker` on the machine.
#[derive(Clone, Debug)]
pub struct MachineContainerObserver<E> {
    /// Runs commands on the machine.
    executor: E,
}

impl<E> MachineContainerObserver<E>
where
    E: RemoteExecutor,
{
    /// Returns a new `MachineContainerObserver`.
    pub fn new(executor: E) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl<E> ContainerObserver for MachineContainerObserver<E>
where
    E: RemoteExecutor,
{
    async fn list_container_ids(&self) -> Result<Vec<String>, Error> {
        let args = ["docker", "ps", "-aq"].map(String::from);
        let stdout = self.executor.run(&args).await?;

        let ids = String::from_utf8_lossy(&stdout)
            .split_whitespace()
            .map(String::from)
            .collect();

        Ok(ids)
    }

    async fn inspect_all(&self, ids: &[String]) -> Result<InspectOutput, Error> {
        if ids.is_empty() {
            return Ok(InspectOutput::NoContainers);
        }

        let mut args = Vec::with_capacity(ids.len() + 2);
        args.push(String::from("docker"));
        args.push(String::from("inspect"));
        args.extend(ids.iter().cloned());

        self.executor.run(&args).await.map(InspectOutput::Payload)
    }
}
