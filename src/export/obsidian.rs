// Obsidian sink - append to a note through the Advanced URI plugin

use super::clipboard::ClipboardWriter;
use crate::error::AppError;
use crate::platform::PlatformDetector;
use crate::settings::NoteTarget;

/// Longest URI handed to the opener; longer payloads go through the clipboard
pub const MAX_URI_CHARS: usize = 2000;

/// A ready-to-open Advanced URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObsidianUri {
    /// Content travels inside the `data` parameter
    Data(String),
    /// Content must be on the clipboard before the URI is opened
    Clipboard(String),
}

impl ObsidianUri {
    pub fn as_str(&self) -> &str {
        match self {
            ObsidianUri::Data(uri) | ObsidianUri::Clipboard(uri) => uri,
        }
    }
}

fn base_uri(target: &NoteTarget) -> String {
    format!(
        "obsidian://advanced-uri?vault={}&filepath={}",
        urlencoding::encode(&target.vault),
        urlencoding::encode(&target.note)
    )
}

/// Append `content` (preceded by a blank line) to the target note
pub fn build_obsidian_uri(target: &NoteTarget, content: &str) -> ObsidianUri {
    let base = base_uri(target);
    let payload = format!("\n\n{}", content);
    let data = urlencoding::encode(&payload);
    let full = format!("{}&mode=append&data={}", base, data);

    if full.chars().count() > MAX_URI_CHARS {
        ObsidianUri::Clipboard(format!("{}&mode=append&clipboard=true", base))
    } else {
        ObsidianUri::Data(full)
    }
}

/// Hands URIs to whatever handles their scheme
pub trait UriOpener: Send + Sync {
    fn open(&self, uri: &str) -> Result<(), AppError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOpener;

impl UriOpener for SystemOpener {
    fn open(&self, uri: &str) -> Result<(), AppError> {
        PlatformDetector::open_uri(uri).map_err(AppError::Export)
    }
}

/// How the content reached Obsidian
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Direct,
    ViaClipboard,
}

/// Copies to the clipboard when needed, then opens the URI
pub fn export_to_obsidian(
    target: &NoteTarget,
    content: &str,
    opener: &dyn UriOpener,
    clipboard: &dyn ClipboardWriter,
) -> Result<Delivery, AppError> {
    match build_obsidian_uri(target, content) {
        ObsidianUri::Data(uri) => {
            opener.open(&uri)?;
            Ok(Delivery::Direct)
        }
        ObsidianUri::Clipboard(uri) => {
            tracing::info!("Export: URI too long, using clipboard method");
            clipboard.write_text(content)?;
            opener.open(&uri)?;
            Ok(Delivery::ViaClipboard)
        }
    }
}
