//! Post-processing of the raw model response.

use std::sync::LazyLock;

use regex_lite::Regex;

/// Clause appended when noise files were dropped from the diff.
pub const OMISSION_NOTE: &str = " and updated documentation accordingly";

/// Boilerplate label the model sometimes puts before the message.
static COMMIT_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*\*\*Commit Message:\*\*\s*").expect("Invalid regex")
});

/// Remove a leading `**Commit Message:**` label (any case) and the
/// whitespace around it. Anything else is returned unchanged.
pub fn strip_commit_label(response: &str) -> String {
    COMMIT_LABEL_RE.replace(response, "").into_owned()
}

/// Turn the raw model output into the final commit message.
///
/// Trailing whitespace is trimmed so the omission note, when requested,
/// continues the last sentence instead of landing on a new line.
pub fn clean_response(raw: &str, noted_omission: bool) -> String {
    let mut message = raw.trim_end().to_string();
    if noted_omission {
        message.push_str(OMISSION_NOTE);
    }
    strip_commit_label(&message)
}
