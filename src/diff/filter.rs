//! Removing noise files (lockfiles, project metadata) from a diff.

use std::collections::BTreeSet;

use super::partition::partition;

/// Files whose changes are left out of the text sent to the model.
pub const DEFAULT_NOISE_FILES: &[&str] = &["pyproject.toml", "uv.lock"];

/// Set of post-change paths treated as noise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseFiles(BTreeSet<String>);

impl NoiseFiles {
    /// An empty set: nothing is filtered.
    pub fn none() -> Self {
        Self(BTreeSet::new())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for NoiseFiles {
    fn default() -> Self {
        DEFAULT_NOISE_FILES.iter().copied().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for NoiseFiles {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Outcome of filtering a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterResult {
    /// Non-noise segments joined with newlines, in original order.
    pub filtered_text: String,
    /// True iff at least one noise file was present in the diff.
    pub noted_omission: bool,
    /// Noise paths that were dropped, in diff order.
    pub omitted: Vec<String>,
}

/// Drop the segments of every file in `noise_files` from `diff_text`.
pub fn filter_diff(diff_text: &str, noise_files: &NoiseFiles) -> FilterResult {
    let file_diffs = partition(diff_text);

    let mut kept = Vec::with_capacity(file_diffs.len());
    let mut omitted = Vec::new();

    for (path, segment) in file_diffs.iter() {
        if noise_files.contains(path) {
            omitted.push(path.to_string());
        } else {
            kept.push(segment);
        }
    }

    FilterResult {
        filtered_text: kept.join("\n"),
        noted_omission: !omitted.is_empty(),
        omitted,
    }
}
