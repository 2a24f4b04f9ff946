//! Language model access: client, system prompt, and response cleanup.

pub mod client;
pub mod prompt;
pub mod response;

pub use client::{InferenceClient, OllamaClient};
pub use prompt::SYSTEM_PROMPT;
pub use response::{OMISSION_NOTE, clean_response, strip_commit_label};
