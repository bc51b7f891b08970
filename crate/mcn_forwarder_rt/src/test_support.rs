//! Fake collaborators for exercising the runtime without a machine.

use std::{
    collections::{BTreeSet, VecDeque},
    future::Future,
    io,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use tokio::sync::Notify;
use mcn_forwarder_model::{Error, ForwardedPortSet, InspectOutput, PortForward};

use crate::{ContainerObserver, RemoteExecutor, TunnelLauncher, TunnelSupervisor};

fn remote_exec_error(command: &str) -> Error {
    Error::RemoteExecSpawn {
        command: String::from(command),
        error: io::Error::new(io::ErrorKind::Other, "machine unreachable"),
    }
}

/// Returns scripted responses in order, recording the arguments it was run
/// with.
#[derive(Clone, Debug, Default)]
pub struct FakeExecutor {
    responses: Arc<Mutex<VecDeque<Result<Vec<u8>, Error>>>>,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl FakeExecutor {
    pub fn new(responses: Vec<Result<Vec<u8>, Error>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            calls: Arc::default(),
        }
    }

    pub fn unreachable() -> Error {
        remote_exec_error("docker-machine ssh default")
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteExecutor for FakeExecutor {
    async fn run(&self, args: &[String]) -> Result<Vec<u8>, Error> {
        self.calls.lock().unwrap().push(args.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("`FakeExecutor` ran out of responses.")
    }
}

/// What the machine looks like for one poll of a [`FakeObserver`].
#[derive(Clone, Debug)]
pub enum Observation {
    /// `docker ps` lists no containers.
    NoContainers,
    /// One container whose `docker inspect` output is the given payload.
    Payload(&'static str),
    /// `docker ps` fails.
    ListFails,
    /// `docker inspect` fails.
    InspectFails,
}

/// Plays back observations, repeating the last one once the rest are used.
#[derive(Clone, Debug)]
pub struct FakeObserver {
    observations: Arc<Mutex<VecDeque<Observation>>>,
    current: Arc<Mutex<Observation>>,
    list_count: Arc<Mutex<usize>>,
}

impl FakeObserver {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self {
            observations: Arc::new(Mutex::new(observations.into())),
            current: Arc::new(Mutex::new(Observation::NoContainers)),
            list_count: Arc::default(),
        }
    }

    pub fn list_count(&self) -> usize {
        *self.list_count.lock().unwrap()
    }
}

#[async_trait]
impl ContainerObserver for FakeObserver {
    async fn list_container_ids(&self) -> Result<Vec<String>, Error> {
        *self.list_count.lock().unwrap() += 1;

        let mut current = self.current.lock().unwrap();
        if let Some(observation) = self.observations.lock().unwrap().pop_front() {
            *current = observation;
        }

        match &*current {
            Observation::NoContainers => Ok(Vec::new()),
            Observation::Payload(_) | Observation::InspectFails => {
                Ok(vec![String::from("4f2a")])
            }
            Observation::ListFails => Err(remote_exec_error("docker ps -aq")),
        }
    }

    async fn inspect_all(&self, ids: &[String]) -> Result<InspectOutput, Error> {
        if ids.is_empty() {
            return Ok(InspectOutput::NoContainers);
        }

        match &*self.current.lock().unwrap() {
            Observation::Payload(payload) => {
                Ok(InspectOutput::Payload(payload.as_bytes().to_vec()))
            }
            Observation::InspectFails => Err(remote_exec_error("docker inspect 4f2a")),
            observation => panic!("Inspected containers during {:?}.", observation),
        }
    }
}

/// Fails to list containers and raises an interrupt at the same moment, as
/// happens when Ctrl+C reaches both the forwarder and the remote command.
#[derive(Clone, Debug, Default)]
pub struct InterruptedObserver {
    interrupt: Arc<Notify>,
}

impl InterruptedObserver {
    /// Returns a future that completes once the interrupt is raised.
    pub fn interrupted(&self) -> impl Future<Output = ()> + 'static {
        let interrupt = Arc::clone(&self.interrupt);
        async move { interrupt.notified().await }
    }
}

#[async_trait]
impl ContainerObserver for InterruptedObserver {
    async fn list_container_ids(&self) -> Result<Vec<String>, Error> {
        self.interrupt.notify_one();
        Err(remote_exec_error("docker ps -aq"))
    }

    async fn inspect_all(&self, _ids: &[String]) -> Result<InspectOutput, Error> {
        panic!("Inspected containers after listing failed.");
    }
}

/// Calls made to a [`FakeSupervisor`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SupervisorEvent {
    Replace(ForwardedPortSet),
    Terminate,
}

/// Records tunnel operations, optionally failing them.
#[derive(Clone, Debug, Default)]
pub struct FakeSupervisor {
    events: Arc<Mutex<Vec<SupervisorEvent>>>,
    fail_replace_after: Option<usize>,
    fail_terminate: bool,
}

impl FakeSupervisor {
    /// Fails every `replace` after the first `successes` calls.
    pub fn failing_replace_after(successes: usize) -> Self {
        Self {
            fail_replace_after: Some(successes),
            ..Self::default()
        }
    }

    pub fn failing_terminate() -> Self {
        Self {
            fail_terminate: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<SupervisorEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn replaced(&self) -> Vec<ForwardedPortSet> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SupervisorEvent::Replace(ports) => Some(ports),
                SupervisorEvent::Terminate => None,
            })
            .collect()
    }

    pub fn terminate_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| **event == SupervisorEvent::Terminate)
            .count()
    }
}

#[async_trait]
impl TunnelSupervisor for FakeSupervisor {
    async fn replace(&mut self, ports: &ForwardedPortSet) -> Result<(), Error> {
        let replaced = self.replaced().len();
        if self
            .fail_replace_after
            .map_or(false, |successes| replaced >= successes)
        {
            return Err(Error::TunnelStart {
                ports: ports.clone(),
                error: io::Error::new(io::ErrorKind::NotFound, "docker-machine not found"),
            });
        }

        self.events
            .lock()
            .unwrap()
            .push(SupervisorEvent::Replace(ports.clone()));
        Ok(())
    }

    async fn terminate(&mut self) -> Result<(), Error> {
        self.events.lock().unwrap().push(SupervisorEvent::Terminate);
        if self.fail_terminate {
            Err(Error::TunnelTerminate {
                pid: Some(42),
                error: io::Error::new(io::ErrorKind::PermissionDenied, "operation not permitted"),
            })
        } else {
            Ok(())
        }
    }
}

/// Calls made to a [`FakeLauncher`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LauncherEvent {
    /// Launched with the rendered `-L` mappings.
    Launch(Vec<String>),
    /// Killed the handle with the given ID.
    Kill(u32),
}

#[derive(Debug, Default)]
struct LauncherState {
    events: Vec<LauncherEvent>,
    live: BTreeSet<u32>,
    max_live: usize,
    next_id: u32,
    fail_launch: bool,
    fail_kill: bool,
}

/// Hands out numbered handles and tracks which are still live.
#[derive(Clone, Debug, Default)]
pub struct FakeLauncher {
    state: Arc<Mutex<LauncherState>>,
}

impl FakeLauncher {
    pub fn fail_launch(&self, fail: bool) {
        self.state.lock().unwrap().fail_launch = fail;
    }

    pub fn fail_kill(&self, fail: bool) {
        self.state.lock().unwrap().fail_kill = fail;
    }

    pub fn events(&self) -> Vec<LauncherEvent> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn live(&self) -> usize {
        self.state.lock().unwrap().live.len()
    }

    pub fn max_live(&self) -> usize {
        self.state.lock().unwrap().max_live
    }

    pub fn launch_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, LauncherEvent::Launch(..)))
            .count()
    }

    pub fn kill_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, LauncherEvent::Kill(..)))
            .count()
    }
}

#[async_trait]
impl TunnelLauncher for FakeLauncher {
    type Handle = u32;

    fn launch(&self, forwards: &[PortForward]) -> io::Result<u32> {
        let mut state = self.state.lock().unwrap();
        if state.fail_launch {
            return Err(io::Error::new(io::ErrorKind::NotFound, "docker-machine"));
        }

        let id = state.next_id;
        state.next_id += 1;
        state.events.push(LauncherEvent::Launch(
            forwards.iter().map(PortForward::to_string).collect(),
        ));
        state.live.insert(id);
        state.max_live = state.max_live.max(state.live.len());

        Ok(id)
    }

    async fn kill(&self, handle: &mut u32) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_kill {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "operation not permitted",
            ));
        }

        state.events.push(LauncherEvent::Kill(*handle));
        state.live.remove(handle);

        Ok(())
    }

    fn process_id(&self, handle: &u32) -> Option<u32> {
        Some(*handle)
    }
}
