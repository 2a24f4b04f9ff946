//! Copying the generated message to the system clipboard.

use arboard::Clipboard;
use tracing::debug;

use crate::error::ClipboardError;

/// Put `text` on the system clipboard.
pub fn copy_to_clipboard(text: &str) -> Result<(), ClipboardError> {
    let mut clipboard = Clipboard::new().map_err(ClipboardError::Unavailable)?;
    clipboard
        .set_text(text.to_string())
        .map_err(ClipboardError::SetFailed)?;

    debug!("Copied {} chars to the clipboard", text.len());
    Ok(())
}
