// Application error types with user-facing messages

use thiserror::Error;

/// Application error types for tabscribe
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Summarization was requested before an API key was installed
    #[error("Gemini API not initialized. Please check your API key.")]
    NotInitialized,

    /// The API key was rejected while initializing the Gemini client
    #[error("Invalid Gemini API key")]
    InvalidCredential,

    /// Obsidian export needs both a vault and a note path
    #[error("Please enter Obsidian vault and note names")]
    MissingNoteTarget,

    /// The browser returned no tabs for the requested action ("export", "copy", ...)
    #[error("No tabs found to {0}")]
    NoTabs(&'static str),

    /// Attempted to start auto-scroll while one is already running
    #[error("Scroll already in progress")]
    ScrollInProgress,

    /// Auto-scroll was requested outside the Watch Later playlist
    #[error("Please navigate to YouTube Watch Later page first")]
    NotWatchLater,

    /// Action requires a YouTube video tab
    #[error("Not a YouTube video")]
    NotYouTube,

    /// URL looked like YouTube but carried no video id
    #[error("Invalid YouTube URL")]
    InvalidVideoUrl,

    /// Caption retrieval failed; carries the underlying message unchanged
    #[error("{0}")]
    Transcript(String),

    /// Browser adapter failure (AppleScript, tab lookup, script execution)
    #[error("Browser error: {0}")]
    Browser(String),

    /// System clipboard could not be written
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// File I/O operation failed (write, create directory)
    #[error("File operation failed: {0}")]
    FileIO(String),

    /// Settings could not be loaded, validated or saved
    #[error("Settings error: {0}")]
    Settings(String),

    /// Obsidian URI could not be opened
    #[error("Export failed: {0}")]
    Export(String),
}
