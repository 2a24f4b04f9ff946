//! Lifecycle of the local inference server: start on demand, stop only what
//! we started.

use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::error::ServerError;

use super::supervisor::ProcessSupervisor;

/// Interval between health checks while a spawned server boots.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Where the manager is in the server lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Nothing checked yet.
    Unknown,
    /// Found live on probe; someone else owns it.
    ProbedRunning,
    /// Spawned by this manager; ours to stop.
    StartedByUs { pid: u32 },
    /// Our server was stopped.
    Stopped,
}

/// Snapshot of what the manager knows about the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerHandle {
    /// The server was already up before this manager looked.
    pub already_running: bool,
    /// PID of the process this manager spawned, if any.
    pub owned_pid: Option<u32>,
}

/// Ensures an inference server is reachable and never leaks one it spawned.
///
/// The manager only ever terminates a process it started itself; a server
/// found already running is left alone.
pub struct InferenceServerManager<S: ProcessSupervisor> {
    supervisor: S,
    state: ServerState,
    startup_timeout: Duration,
    poll_interval: Duration,
}

impl<S: ProcessSupervisor> InferenceServerManager<S> {
    pub fn new(supervisor: S, startup_timeout: Duration) -> Self {
        Self {
            supervisor,
            state: ServerState::Unknown,
            startup_timeout,
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Override the interval between startup health checks.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            already_running: self.state == ServerState::ProbedRunning,
            owned_pid: self.owned_pid(),
        }
    }

    pub fn owned_pid(&self) -> Option<u32> {
        match self.state {
            ServerState::StartedByUs { pid } => Some(pid),
            _ => None,
        }
    }

    /// Whether the server answers its health check right now.
    pub async fn probe_liveness(&self) -> bool {
        self.supervisor.probe().await
    }

    /// Make sure a server is reachable, spawning one if needed.
    ///
    /// A spawned server is recorded as ours before it becomes ready, so even
    /// a [`ServerError::StartupTimeout`] leaves it for [`Self::stop_if_owned`].
    pub async fn ensure_started(&mut self) -> Result<(), ServerError> {
        if self.probe_liveness().await {
            if self.owned_pid().is_none() {
                debug!("Inference server already running");
                self.state = ServerState::ProbedRunning;
            }
            return Ok(());
        }

        let pid = self.supervisor.spawn().await?;
        self.state = ServerState::StartedByUs { pid };

        let deadline = Instant::now() + self.startup_timeout;
        loop {
            if self.probe_liveness().await {
                info!("Inference server (PID {}) is ready", pid);
                return Ok(());
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(ServerError::StartupTimeout(self.startup_timeout));
            }
            sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    /// Terminate the server if this manager started it. Safe to call again.
    pub async fn stop_if_owned(&mut self) -> Result<(), ServerError> {
        let ServerState::StartedByUs { pid } = self.state else {
            return Ok(());
        };

        info!("Stopping inference server (PID {})", pid);
        self.supervisor.terminate(pid).await?;
        self.state = ServerState::Stopped;
        Ok(())
    }

    /// PID of a server already running on the host, by process-list lookup.
    ///
    /// Point-in-time and racy: a server can appear or vanish between this
    /// snapshot and [`Self::ensure_started`]. Callers use it only to decide
    /// teardown policy.
    pub async fn current_pid(&self) -> Option<u32> {
        self.supervisor.find_running_pid().await
    }
}
