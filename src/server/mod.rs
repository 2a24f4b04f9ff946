//! Local Ollama server lifecycle management.

pub mod manager;
pub mod probe;
pub mod supervisor;

pub use manager::{InferenceServerManager, POLL_INTERVAL, ServerHandle, ServerState};
pub use probe::{HealthProbe, PROBE_TIMEOUT};
pub use supervisor::{OllamaSupervisor, ProcessSupervisor, TERMINATE_GRACE};
