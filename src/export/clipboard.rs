// System clipboard sink

use crate::error::AppError;

/// Anything that can take a copy of exported text
pub trait ClipboardWriter: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), AppError>;
}

/// The OS clipboard via arboard
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl ClipboardWriter for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), AppError> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| AppError::Clipboard(format!("clipboard unavailable: {}", e)))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| AppError::Clipboard(e.to_string()))?;
        tracing::debug!("Export: Copied {} chars to clipboard", text.chars().count());
        Ok(())
    }
}
