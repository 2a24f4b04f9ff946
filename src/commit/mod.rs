//! Commit message generation from a staged diff.

pub mod generator;

pub use generator::generate_commit_message;
