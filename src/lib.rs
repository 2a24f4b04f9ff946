//! auto-commit-message - generate commit messages from staged diffs with a local model.
//!
//! # Overview
//!
//! The diff is split per file and stripped of noise files (lockfiles,
//! project metadata), then sent to a local Ollama server together with a
//! fixed commit-message style guide. The server is started on demand and
//! stopped again afterwards if this tool was the one that started it.

pub mod clipboard;
pub mod commit;
pub mod config;
pub mod diff;
pub mod error;
pub mod llm;
pub mod server;

// Re-export commonly used types
pub use commit::generate_commit_message;
pub use config::Config;
pub use diff::{FileDiffs, FilterResult, NoiseFiles, filter_diff, partition};
pub use error::{ClipboardError, GenerateError, InferenceError, InputError, ServerError};
pub use llm::{InferenceClient, OllamaClient};
pub use server::{
    HealthProbe, InferenceServerManager, OllamaSupervisor, ProcessSupervisor, ServerHandle,
    ServerState,
};
