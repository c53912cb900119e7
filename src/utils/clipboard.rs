// src/utils/clipboard.rs
use clipboard_rs::{Clipboard, ClipboardContext};
use thiserror::Error;

use crate::models::GeneratedPassword;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to write to clipboard: {0}")]
    Write(String),
}

pub type Result<T> = std::result::Result<T, ClipboardError>;

/// Anything that can take text, so menu and CLI code can be tested without a display.
pub trait TextClipboard {
    fn write_text(&self, text: &str) -> Result<()>;
}

/// The desktop clipboard via clipboard-rs.
pub struct SystemClipboard {
    context: ClipboardContext,
}

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        let context = ClipboardContext::new()
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        Ok(Self { context })
    }
}

impl TextClipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        self.context
            .set_text(text.to_string())
            .map_err(|e| ClipboardError::Write(e.to_string()))
    }
}

pub fn copy_password(clipboard: &dyn TextClipboard, password: &GeneratedPassword) -> Result<()> {
    clipboard.write_text(password.as_str())?;
    log::debug!("Copied {}-character password to clipboard", password.len());
    Ok(())
}

/// Copies to the system clipboard, failing when no clipboard is reachable
/// (headless sessions, missing display server).
pub fn copy_to_system_clipboard(password: &GeneratedPassword) -> Result<()> {
    let clipboard = SystemClipboard::new()?;
    copy_password(&clipboard, password)
}
