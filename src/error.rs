//! Error types for auto-commit-message modules using thiserror.

use std::time::Duration;

use thiserror::Error;

/// Errors from managing the local Ollama server process.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Ollama binary '{0}' not found. Install it from https://ollama.com/download")]
    NotInstalled(String),

    #[error("Failed to spawn Ollama server: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Ollama server did not become ready within {}s", .0.as_secs_f64())]
    StartupTimeout(Duration),

    #[error("Failed to stop Ollama server (PID {pid}): {source}")]
    TerminateFailed {
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("Process {0} is not owned by this manager")]
    NotOwned(u32),
}

/// Errors from the language model request.
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Inference request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Inference request failed: {0}")]
    RequestFailed(#[source] reqwest::Error),

    #[error("Ollama returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Ollama returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("Ollama returned an empty message")]
    EmptyResponse,
}

/// Errors from a commit message generation request.
///
/// Startup and inference failures pass through unmodified.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Server(#[from] ServerError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Errors from reading the diff to summarize.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("No diff provided!")]
    Empty,

    #[error("Failed to read diff file '{path}': {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read diff from stdin: {0}")]
    ReadStdin(#[source] std::io::Error),

    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to collect staged diff: {0}")]
    DiffFailed(#[source] git2::Error),
}

/// Errors from copying text to the system clipboard.
#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("Clipboard not available: {0}")]
    Unavailable(#[source] arboard::Error),

    #[error("Failed to copy to clipboard: {0}")]
    SetFailed(#[source] arboard::Error),
}
