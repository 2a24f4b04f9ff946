//! Staged diff collection from a repository's index using git2.

use std::path::Path;

use git2::{DiffFormat, ErrorCode, Repository, Tree};
use tracing::{debug, warn};

use crate::error::InputError;

/// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
///
/// Returns `Ok(None)` for repos with no commits (unborn branch / not found),
/// so the staged diff of a first commit is taken against the empty tree.
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, InputError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(InputError::DiffFailed(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(InputError::DiffFailed)?;
    Ok(Some(tree))
}

/// Render the changes staged in the index of the repository containing
/// `path` as unified diff text, the same shape `git diff --staged` prints.
///
/// A clean index yields an empty string.
pub fn collect_staged_diff(path: &Path) -> Result<String, InputError> {
    let repo = Repository::discover(path).map_err(InputError::OpenRepository)?;
    let head_tree = resolve_head_tree(&repo)?;

    let diff = repo
        .diff_tree_to_index(head_tree.as_ref(), None, None)
        .map_err(InputError::DiffFailed)?;

    debug!("Staged diff touches {} file(s)", diff.deltas().len());

    let mut text = String::new();
    if let Err(e) = diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let origin = line.origin();
        if matches!(origin, '+' | '-' | ' ') {
            text.push(origin);
        }
        text.push_str(&String::from_utf8_lossy(line.content()));
        true
    }) {
        warn!("Failed to render staged diff: {e}");
        return Err(InputError::DiffFailed(e));
    }

    Ok(text)
}
