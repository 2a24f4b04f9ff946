//! OS-level supervision of the `ollama serve` process.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::ServerError;

use super::probe::HealthProbe;

/// How long a terminated server gets to exit before it is killed outright.
pub const TERMINATE_GRACE: Duration = Duration::from_secs(10);

/// Start, probe, find and terminate the inference server.
///
/// This is the seam between the lifecycle state machine and the operating
/// system, so the manager can be driven by a mock in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcessSupervisor: Send + Sync {
    /// Whether the server answers its health check.
    async fn probe(&self) -> bool;

    /// Spawn a detached server and return its PID.
    async fn spawn(&mut self) -> Result<u32, ServerError>;

    /// Gracefully stop a process previously returned by `spawn` and wait
    /// for it to exit.
    async fn terminate(&mut self, pid: u32) -> Result<(), ServerError>;

    /// PID of any server already running on the host, from the process list.
    async fn find_running_pid(&self) -> Option<u32>;
}

/// Supervisor for a real `ollama` binary.
pub struct OllamaSupervisor {
    binary: String,
    listen_addr: String,
    probe: HealthProbe,
    terminate_grace: Duration,
    owned: Option<(u32, Child)>,
}

impl OllamaSupervisor {
    /// `listen_addr` is exported to the child as `OLLAMA_HOST` so it binds
    /// where `probe` looks.
    pub fn new(binary: impl Into<String>, listen_addr: impl Into<String>, probe: HealthProbe) -> Self {
        Self {
            binary: binary.into(),
            listen_addr: listen_addr.into(),
            probe,
            terminate_grace: TERMINATE_GRACE,
            owned: None,
        }
    }

    /// Override how long `terminate` waits before killing the process group.
    pub fn with_terminate_grace(mut self, grace: Duration) -> Self {
        self.terminate_grace = grace;
        self
    }

    /// Command line `pgrep` matches against, e.g. `ollama serve`.
    fn serve_pattern(&self) -> String {
        let name = Path::new(&self.binary)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.binary.clone());
        format!("{} serve", name)
    }
}

#[async_trait]
impl ProcessSupervisor for OllamaSupervisor {
    async fn probe(&self) -> bool {
        self.probe.is_live().await
    }

    async fn spawn(&mut self) -> Result<u32, ServerError> {
        let binary_path =
            which::which(&self.binary).map_err(|_| ServerError::NotInstalled(self.binary.clone()))?;

        let mut cmd = Command::new(&binary_path);
        cmd.arg("serve")
            .env("OLLAMA_HOST", &self.listen_addr)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Own process group: a Ctrl-C aimed at our terminal does not reach it.
        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd.spawn().map_err(ServerError::SpawnFailed)?;
        let pid = child.id().ok_or_else(|| {
            ServerError::SpawnFailed(std::io::Error::other("spawned server has no PID"))
        })?;

        info!("Started {} serve (PID {}) on {}", binary_path.display(), pid, self.listen_addr);
        self.owned = Some((pid, child));
        Ok(pid)
    }

    async fn terminate(&mut self, pid: u32) -> Result<(), ServerError> {
        // Ownership is released only once the process is reaped, so a
        // cancelled call leaves it for the next attempt.
        let child = match self.owned.as_mut() {
            Some((owned_pid, child)) if *owned_pid == pid => child,
            _ => return Err(ServerError::NotOwned(pid)),
        };

        send_sigterm(pid)?;

        let result = match timeout(self.terminate_grace, child.wait()).await {
            Ok(Ok(status)) => {
                debug!("Server (PID {}) exited with {}", pid, status);
                Ok(())
            }
            Ok(Err(source)) => Err(ServerError::TerminateFailed { pid, source }),
            Err(_) => {
                warn!(
                    "Server (PID {}) did not exit within {}ms, killing its process group",
                    pid,
                    self.terminate_grace.as_millis()
                );
                force_kill(pid, child).await
            }
        };

        if result.is_ok() {
            self.owned = None;
        }
        result
    }

    async fn find_running_pid(&self) -> Option<u32> {
        let output = Command::new("pgrep")
            .arg("-f")
            .arg(self.serve_pattern())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => {
                parse_first_pid(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(_) => None,
            Err(e) => {
                debug!("pgrep unavailable: {}", e);
                None
            }
        }
    }
}

/// Ask the process to shut down. An already-exited process is not an error.
#[cfg(unix)]
fn send_sigterm(pid: u32) -> Result<(), ServerError> {
    send_signal(pid, to_pid_t(pid)?, libc::SIGTERM)
}

// No graceful signal off unix; the grace-period wait falls through to kill.
#[cfg(not(unix))]
fn send_sigterm(_pid: u32) -> Result<(), ServerError> {
    Ok(())
}

/// SIGKILL the whole process group, so runners the server forked go too,
/// then reap the leader.
#[cfg(unix)]
async fn force_kill(pid: u32, child: &mut Child) -> Result<(), ServerError> {
    send_signal(pid, -to_pid_t(pid)?, libc::SIGKILL)?;
    child
        .wait()
        .await
        .map(|_| ())
        .map_err(|source| ServerError::TerminateFailed { pid, source })
}

#[cfg(not(unix))]
async fn force_kill(pid: u32, child: &mut Child) -> Result<(), ServerError> {
    child
        .kill()
        .await
        .map_err(|source| ServerError::TerminateFailed { pid, source })
}

#[cfg(unix)]
fn to_pid_t(pid: u32) -> Result<libc::pid_t, ServerError> {
    libc::pid_t::try_from(pid).map_err(|_| ServerError::TerminateFailed {
        pid,
        source: std::io::Error::other("PID out of range"),
    })
}

/// `kill(2)` on `target` (negative for a process group). ESRCH is ignored.
#[cfg(unix)]
fn send_signal(pid: u32, target: libc::pid_t, signal: libc::c_int) -> Result<(), ServerError> {
    // SAFETY: kill(2) has no memory-safety preconditions; the PID is one we
    // spawned and have not reaped yet, so it cannot have been recycled.
    let rc = unsafe { libc::kill(target, signal) };
    if rc != 0 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            return Err(ServerError::TerminateFailed { pid, source: err });
        }
    }
    Ok(())
}

/// First PID in `pgrep` output.
fn parse_first_pid(output: &str) -> Option<u32> {
    output
        .lines()
        .find_map(|line| line.trim().parse::<u32>().ok())
}
