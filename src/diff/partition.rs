//! Splitting a unified diff into per-file segments.

use tracing::debug;

/// Prefix of the line that opens each file's section in a git diff.
const HEADER_PREFIX: &str = "diff --git";

/// Per-file diff segments keyed by post-change path, in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDiffs {
    entries: Vec<(String, String)>,
}

impl FileDiffs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Segment recorded for `path`, header line included.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, segment)| segment.as_str())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Paths in the order they first appeared.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(p, segment)| (p.as_str(), segment.as_str()))
    }

    /// Record a segment. A path seen before keeps its position and the new
    /// segment is appended to the existing one.
    fn insert(&mut self, path: String, segment: String) {
        match self.entries.iter_mut().find(|(p, _)| *p == path) {
            Some((_, existing)) => {
                debug!(path = %path, "Path appears in more than one diff header");
                existing.push('\n');
                existing.push_str(&segment);
            }
            None => self.entries.push((path, segment)),
        }
    }
}

/// Split `diff_text` into one segment per `diff --git` header.
///
/// Each segment runs from its header line up to the next header. Lines
/// before the first header have no file to belong to and are dropped.
///
/// A header with fewer than three tokens names no file, so it does not open
/// a segment: it is kept as an ordinary line of the current segment (or
/// dropped before the first header).
pub fn partition(diff_text: &str) -> FileDiffs {
    let mut file_diffs = FileDiffs::new();
    let mut current_file: Option<String> = None;
    let mut lines: Vec<&str> = Vec::new();

    for line in diff_text.lines() {
        if line.starts_with(HEADER_PREFIX)
            && let Some(path) = header_path(line)
        {
            if let Some(file) = current_file.take() {
                file_diffs.insert(file, lines.join("\n"));
            }
            current_file = Some(path.to_string());
            lines.clear();
            lines.push(line);
        } else if current_file.is_some() {
            lines.push(line);
        }
    }

    if let Some(file) = current_file {
        file_diffs.insert(file, lines.join("\n"));
    }

    file_diffs
}

/// Extract the post-change path from a `diff --git a/<old> b/<new>` line.
///
/// Returns `None` for a malformed header with fewer than three tokens, or
/// one that names an empty path.
fn header_path(line: &str) -> Option<&str> {
    let tokens: Vec<&str> = line.split(' ').collect();
    if tokens.len() < 3 {
        debug!("Malformed diff header: {}", line);
        return None;
    }

    let path = unchanged_path(line)
        .or_else(|| line.rfind(" b/").map(|idx| &line[idx + 3..]))
        .or_else(|| tokens.last().map(|token| strip_vcs_prefix(token)))?;

    if path.is_empty() {
        debug!("Diff header names no file: {}", line);
        return None;
    }
    Some(path)
}

/// Path of a header whose old and new paths match, `a/<p> b/<p>`.
///
/// Splitting at the midpoint keeps directories containing ` b/` intact.
fn unchanged_path(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("diff --git a/")?;
    if rest.len() < 3 || rest.len() % 2 == 0 {
        return None;
    }

    let mid = (rest.len() - 3) / 2;
    let old = rest.get(..mid)?;
    let new = rest.get(mid..)?.strip_prefix(" b/")?;
    (old == new).then_some(new)
}

/// Drop the two-character `a/` / `b/` style prefix.
fn strip_vcs_prefix(token: &str) -> &str {
    match token.char_indices().nth(2) {
        Some((idx, _)) => &token[idx..],
        None => "",
    }
}
