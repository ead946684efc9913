// User actions: validate input, gather tabs, summarize and hand the result to one sink

use chrono::{Local, Utc};
use std::path::PathBuf;

use crate::batch::{self, TabBatch};
use crate::browser::agent::{AgentRequest, AgentResponse, StatusReply};
use crate::browser::{
    extract_video_id, is_youtube_host, BrowserAdapter, PageContentExtractor, ProxyFetcher,
    Tab, TranscriptFetcher,
};
use crate::error::AppError;
use crate::export::{self, ClipboardWriter, Delivery, ListingKind, SystemClipboard, SystemOpener, UriOpener};
use crate::intelligence::Summarizer;
use crate::settings::{NoteTarget, Settings, SettingsManager};

/// Where a tab listing is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sink {
    Clipboard,
    File,
    Obsidian,
}

impl Sink {
    /// Verb used in "No tabs found to ..." messages
    fn verb(self) -> &'static str {
        match self {
            Sink::Clipboard => "copy",
            Sink::File => "download",
            Sink::Obsidian => "export",
        }
    }
}

/// Result of a command: a status line plus optional text to show the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub status: String,
    pub details: Option<String>,
}

impl Report {
    fn status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            details: None,
        }
    }
}

/// The user-facing actions over one browser
pub struct Commands<A: BrowserAdapter> {
    adapter: A,
    settings: SettingsManager,
    summarizer: Summarizer,
    transcripts: TranscriptFetcher,
    clipboard: Box<dyn ClipboardWriter>,
    opener: Box<dyn UriOpener>,
    download_dir: Option<PathBuf>,
}

impl<A: BrowserAdapter> Commands<A> {
    /// Wire the system sinks and initialize the summarizer from the stored (or env) API key
    pub fn new(adapter: A, settings: SettingsManager) -> Result<Self, AppError> {
        let current = settings.get();
        let mut summarizer = Summarizer::new();
        if let Some(key) = current.effective_api_key() {
            if let Err(e) = summarizer.init(&key, &current.gemini_model) {
                tracing::warn!("Commands: {}", e);
            }
        }

        Ok(Self {
            adapter,
            settings,
            summarizer,
            transcripts: TranscriptFetcher::new().map_err(AppError::Browser)?,
            clipboard: Box::new(SystemClipboard),
            opener: Box::new(SystemOpener),
            download_dir: None,
        })
    }

    pub fn with_summarizer(mut self, summarizer: Summarizer) -> Self {
        self.summarizer = summarizer;
        self
    }

    pub fn with_transcripts(mut self, transcripts: TranscriptFetcher) -> Self {
        self.transcripts = transcripts;
        self
    }

    pub fn with_clipboard(mut self, clipboard: Box<dyn ClipboardWriter>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn with_opener(mut self, opener: Box<dyn UriOpener>) -> Self {
        self.opener = opener;
        self
    }

    pub fn with_download_dir(mut self, dir: PathBuf) -> Self {
        self.download_dir = Some(dir);
        self
    }

    pub fn settings(&self) -> Settings {
        self.settings.get()
    }

    fn note_target(&self) -> Result<NoteTarget, AppError> {
        self.settings.get().note_target().ok_or(AppError::MissingNoteTarget)
    }

    fn ensure_summarizer(&self) -> Result<(), AppError> {
        if self.summarizer.is_initialized() {
            Ok(())
        } else {
            Err(AppError::NotInitialized)
        }
    }

    async fn collect_tabs(&self, sink: Sink) -> Result<Vec<Tab>, AppError> {
        let tabs = self.adapter.list_tabs().await.map_err(AppError::Browser)?;
        tracing::info!("Commands: Found {} tabs in {}", tabs.len(), self.adapter.name());
        if tabs.is_empty() {
            return Err(AppError::NoTabs(sink.verb()));
        }
        Ok(tabs)
    }

    async fn active_tab(&self) -> Result<Tab, AppError> {
        self.adapter.active_tab().await.map_err(AppError::Browser)
    }

    fn deliver_to_obsidian(&self, target: &NoteTarget, content: &str, success: &str) -> Result<String, AppError> {
        match export::export_to_obsidian(target, content, self.opener.as_ref(), self.clipboard.as_ref())? {
            Delivery::Direct => Ok(success.to_string()),
            Delivery::ViaClipboard => Ok(format!("{} (via clipboard)", success)),
        }
    }

    /// Render every tab, with summaries or as bare links, and hand it to `sink`
    pub async fn save_tabs(&self, sink: Sink, with_summaries: bool) -> Result<Report, AppError> {
        let target = match sink {
            Sink::Obsidian => Some(self.note_target()?),
            _ => None,
        };
        if with_summaries {
            self.ensure_summarizer()?;
        }

        let tabs = self.collect_tabs(sink).await?;

        let markdown = if with_summaries {
            let settings = self.settings.get();
            let proxy = ProxyFetcher::new(settings.proxies).map_err(AppError::Browser)?;
            let batch = TabBatch::new(
                PageContentExtractor::new(&self.adapter, proxy),
                &self.summarizer,
                &self.transcripts,
                settings.enable_youtube_summary,
            );
            batch.format_tabs_as_markdown(&tabs, Local::now()).await
        } else {
            batch::format_tabs_as_links_only(&tabs, Local::now())
        };

        let status = match (sink, with_summaries) {
            (Sink::Clipboard, true) => {
                self.clipboard.write_text(&markdown)?;
                "Copied to clipboard".to_string()
            }
            (Sink::Clipboard, false) => {
                self.clipboard.write_text(&markdown)?;
                "Links copied to clipboard".to_string()
            }
            (Sink::File, _) => {
                let kind = if with_summaries { ListingKind::Tabs } else { ListingKind::Links };
                let dir = match &self.download_dir {
                    Some(dir) => dir.clone(),
                    None => export::default_download_dir()?,
                };
                let path = export::write_markdown(&dir, kind, &markdown, Utc::now())?;
                let label = if with_summaries { "Download complete" } else { "Links download complete" };
                format!("{}: {}", label, path.display())
            }
            (Sink::Obsidian, _) => {
                let success = if with_summaries { "Exported to Obsidian" } else { "Links exported to Obsidian" };
                match &target {
                    Some(target) => self.deliver_to_obsidian(target, &markdown, success)?,
                    None => return Err(AppError::MissingNoteTarget),
                }
            }
        };

        Ok(Report::status(status))
    }

    /// Analyze the active YouTube video with the research prompt and append it to Obsidian
    pub async fn research(&self, custom_prompt: Option<&str>) -> Result<Report, AppError> {
        let target = self.note_target()?;
        self.ensure_summarizer()?;

        let tab = self.active_tab().await?;
        if !is_youtube_host(&tab.url) {
            return Err(AppError::NotYouTube);
        }
        if extract_video_id(&tab.url).is_none() {
            return Err(AppError::InvalidVideoUrl);
        }

        tracing::info!("Commands: Analyzing YouTube video {}", tab.url);
        let default_prompt = self.settings.get().default_yt_prompt;
        let prompt = custom_prompt.unwrap_or(&default_prompt);

        let analysis = self
            .summarizer
            .summarize_video(&tab.url, &self.transcripts, Some(prompt))
            .await
            .ok_or_else(|| {
                AppError::Transcript("Failed to analyze video. Transcript may be unavailable.".to_string())
            })?;

        let markdown = batch::format_research(&tab, &analysis.text, Local::now());
        let status = self.deliver_to_obsidian(&target, &markdown, "Analysis complete and exported to Obsidian")?;

        Ok(Report {
            status,
            details: Some(analysis.text),
        })
    }

    /// Copy the transcript of the active YouTube video
    pub async fn copy_transcript(&self) -> Result<Report, AppError> {
        let tab = self.active_tab().await?;
        if !is_youtube_host(&tab.url) {
            return Err(AppError::NotYouTube);
        }
        let video_id = extract_video_id(&tab.url).ok_or(AppError::InvalidVideoUrl)?;

        let transcript = self.transcripts.fetch(&video_id).await?;
        if transcript.is_empty() {
            return Err(AppError::Transcript("No transcript available".to_string()));
        }

        self.clipboard
            .write_text(&batch::format_transcript(&tab, &transcript))?;
        Ok(Report::status("Transcript copied to clipboard!"))
    }

    /// Scroll the active Watch Later tab to its end and append every video to Obsidian
    pub async fn export_watch_later(&self) -> Result<Report, AppError> {
        let target = self.note_target()?;
        let tab = self.active_tab().await?;

        tracing::info!("Commands: Starting YouTube Watch Later extraction");
        let reply = self
            .adapter
            .send_agent_message(&tab, &AgentRequest::StartAutoScroll)
            .await
            .map_err(|e| AppError::Browser(format!("Failed to extract videos: {}", e)))?;

        let videos = match reply {
            AgentResponse::Status(StatusReply::Complete { videos }) => videos,
            AgentResponse::Status(StatusReply::Error { message }) => return Err(scroll_error(message)),
            other => {
                return Err(AppError::Browser(format!(
                    "Failed to extract videos: unexpected reply {:?}",
                    other
                )))
            }
        };

        let markdown = batch::format_watch_later(&videos, Local::now());
        let success = format!("Extracted {} videos and sent to Obsidian", videos.len());
        let status = self.deliver_to_obsidian(&target, &markdown, &success)?;
        Ok(Report::status(status))
    }

    /// Validate and persist settings; a non-empty API key must initialize the client
    pub fn save_settings(&mut self, settings: Settings) -> Result<Report, AppError> {
        let mut summarizer = Summarizer::new();
        if let Some(key) = settings.effective_api_key() {
            summarizer.init(&key, &settings.gemini_model)?;
        }

        self.settings.update(settings).map_err(AppError::Settings)?;
        self.summarizer = summarizer;
        Ok(Report::status("Settings saved"))
    }
}

/// Errors come back from the agent as text; recover the typed ones
fn scroll_error(message: String) -> AppError {
    if message == AppError::ScrollInProgress.to_string() {
        AppError::ScrollInProgress
    } else if message == AppError::NotWatchLater.to_string() {
        AppError::NotWatchLater
    } else {
        AppError::Browser(message)
    }
}
