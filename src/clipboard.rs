//! Clipboard access for generated articles

use arboard::Clipboard;
use tracing::{error, info};

/// Copy text to the system clipboard. Returns whether the copy happened.
pub fn copy_to_clipboard(text: &str) -> bool {
    if text.trim().is_empty() {
        info!("Nothing to copy (empty)");
        return false;
    }

    match Clipboard::new() {
        Ok(mut clipboard) => match clipboard.set_text(text) {
            Ok(_) => {
                info!("Copied to clipboard ({} chars)", text.len());
                true
            }
            Err(e) => {
                error!("Failed to copy to clipboard: {}", e);
                false
            }
        },
        Err(e) => {
            error!("Failed to initialize clipboard: {}", e);
            false
        }
    }
}
