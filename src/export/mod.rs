// Export sinks for rendered Markdown

pub mod clipboard;
pub mod file;
pub mod obsidian;

pub use clipboard::{ClipboardWriter, SystemClipboard};
pub use file::{default_download_dir, export_file_name, write_markdown, ListingKind};
pub use obsidian::{build_obsidian_uri, export_to_obsidian, Delivery, ObsidianUri, SystemOpener, UriOpener};
