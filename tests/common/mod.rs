//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use auto_commit_message::{InferenceClient, InferenceError, ProcessSupervisor, ServerError};

/// Get the path to test fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Get the path to a diff fixture.
pub fn diff_fixture(name: &str) -> PathBuf {
    fixtures_dir().join("diffs").join(name)
}

/// Read a fixture file as a string.
pub fn read_fixture(path: PathBuf) -> String {
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {:?}: {}", path, e))
}

/// Build a minimal one-line-change diff section for `path`.
pub fn file_section(path: &str, added: &str) -> String {
    format!(
        "diff --git a/{path} b/{path}\n--- a/{path}\n+++ b/{path}\n@@ -0,0 +1 @@\n+{added}\n"
    )
}

/// Call counters shared between a [`FakeSupervisor`] and the test body.
#[derive(Debug, Default, Clone)]
pub struct SupervisorCalls {
    pub probes: Arc<AtomicU32>,
    pub spawns: Arc<AtomicU32>,
    pub terminations: Arc<AtomicU32>,
}

impl SupervisorCalls {
    pub fn probes(&self) -> u32 {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn spawns(&self) -> u32 {
        self.spawns.load(Ordering::SeqCst)
    }

    pub fn terminations(&self) -> u32 {
        self.terminations.load(Ordering::SeqCst)
    }
}

/// In-memory supervisor simulating a host with or without a server.
pub struct FakeSupervisor {
    /// PID reported by the process list before anything happens.
    pub preexisting_pid: Option<u32>,
    /// Whether a server answers before we spawn one.
    pub live_before_spawn: bool,
    /// Whether a spawned server ever becomes ready.
    pub becomes_ready: bool,
    pub calls: SupervisorCalls,
    spawned: bool,
}

impl FakeSupervisor {
    /// A host where the server is already up.
    pub fn running(pid: u32) -> Self {
        Self {
            preexisting_pid: Some(pid),
            live_before_spawn: true,
            becomes_ready: true,
            calls: SupervisorCalls::default(),
            spawned: false,
        }
    }

    /// A host with no server; a spawned one comes up.
    pub fn cold() -> Self {
        Self {
            preexisting_pid: None,
            live_before_spawn: false,
            becomes_ready: true,
            calls: SupervisorCalls::default(),
            spawned: false,
        }
    }

    /// A host with no server; a spawned one never answers.
    pub fn hung() -> Self {
        Self {
            becomes_ready: false,
            ..Self::cold()
        }
    }
}

pub const FAKE_PID: u32 = 4242;

#[async_trait]
impl ProcessSupervisor for FakeSupervisor {
    async fn probe(&self) -> bool {
        self.calls.probes.fetch_add(1, Ordering::SeqCst);
        if self.spawned {
            self.becomes_ready
        } else {
            self.live_before_spawn
        }
    }

    async fn spawn(&mut self) -> Result<u32, ServerError> {
        self.calls.spawns.fetch_add(1, Ordering::SeqCst);
        self.spawned = true;
        Ok(FAKE_PID)
    }

    async fn terminate(&mut self, pid: u32) -> Result<(), ServerError> {
        if !self.spawned || pid != FAKE_PID {
            return Err(ServerError::NotOwned(pid));
        }
        self.calls.terminations.fetch_add(1, Ordering::SeqCst);
        self.spawned = false;
        Ok(())
    }

    async fn find_running_pid(&self) -> Option<u32> {
        self.preexisting_pid
    }
}

/// Client returning a canned reply and recording what it was sent.
pub struct ScriptedClient {
    reply: Option<String>,
    pub last_user_message: Mutex<Option<String>>,
    pub calls: AtomicU32,
}

impl ScriptedClient {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            last_user_message: Mutex::new(None),
            calls: AtomicU32::new(0),
        }
    }

    /// A client whose model returns nothing usable.
    pub fn failing() -> Self {
        Self {
            reply: None,
            last_user_message: Mutex::new(None),
            calls: AtomicU32::new(0),
        }
    }

    pub fn sent(&self) -> Option<String> {
        self.last_user_message.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceClient for ScriptedClient {
    async fn complete(&self, _system: &str, user: &str) -> Result<String, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_user_message.lock().unwrap() = Some(user.to_string());
        self.reply.clone().ok_or(InferenceError::EmptyResponse)
    }
}
