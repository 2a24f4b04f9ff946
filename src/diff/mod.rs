//! Unified diff preprocessing: per-file partitioning and noise filtering.

pub mod filter;
pub mod partition;
pub mod staged;

pub use filter::{DEFAULT_NOISE_FILES, FilterResult, NoiseFiles, filter_diff};
pub use partition::{FileDiffs, partition};
pub use staged::collect_staged_diff;
