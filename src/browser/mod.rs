// Browser module - tab access, page content extraction, YouTube transcripts and Watch Later

pub mod adapters;
pub mod agent;
pub mod cleaning;
pub mod extractor;
pub mod fallback;
pub mod html;
pub mod proxy;
pub mod scripts;
pub mod watch_later;
pub mod youtube;

pub use adapters::{BrowserAdapter, Tab};
pub use extractor::{ContentSource, PageContent, PageContentExtractor};
pub use proxy::ProxyFetcher;
pub use watch_later::{AutoScrollController, VideoRecord};
pub use youtube::{extract_video_id, is_youtube_host, is_youtube_url, TranscriptFetcher};
