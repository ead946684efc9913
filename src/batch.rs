// Batch orchestration: sequential per-tab processing and the Markdown renderings

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::browser::adapters::{BrowserAdapter, Tab};
use crate::browser::extractor::PageContentExtractor;
use crate::browser::watch_later::VideoRecord;
use crate::browser::youtube::{is_youtube_url, TranscriptFetcher};
use crate::intelligence::{Summarizer, Summary};

/// A tab with its summary, ready for rendering
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessedTab {
    pub title: String,
    pub url: String,
    pub summary: Summary,
}

/// Runs extraction and summarization tab by tab
pub struct TabBatch<'a, A: BrowserAdapter> {
    extractor: PageContentExtractor<'a, A>,
    summarizer: &'a Summarizer,
    transcripts: &'a TranscriptFetcher,
    youtube_summaries: bool,
}

impl<'a, A: BrowserAdapter> TabBatch<'a, A> {
    pub fn new(
        extractor: PageContentExtractor<'a, A>,
        summarizer: &'a Summarizer,
        transcripts: &'a TranscriptFetcher,
        youtube_summaries: bool,
    ) -> Self {
        Self {
            extractor,
            summarizer,
            transcripts,
            youtube_summaries,
        }
    }

    /// Summarize one tab; errors end up inside the summary text
    pub async fn process_tab(&self, tab: &Tab) -> ProcessedTab {
        let summary = if self.youtube_summaries && is_youtube_url(&tab.url) {
            tracing::info!("Batch: Trying transcript summary for {}", tab.url);
            match self.summarizer.summarize_video(&tab.url, self.transcripts, None).await {
                Some(summary) => Ok(summary),
                None => {
                    tracing::info!("Batch: Transcript summary unavailable, falling back to page content");
                    self.summarize_page(tab).await
                }
            }
        } else {
            self.summarize_page(tab).await
        };

        ProcessedTab {
            title: tab.title.clone(),
            url: tab.url.clone(),
            summary: summary.unwrap_or_else(|e| {
                tracing::warn!("Batch: Error processing tab {}: {}", tab.url, e);
                Summary::failed(format!("Error processing tab: {}", e))
            }),
        }
    }

    async fn summarize_page(&self, tab: &Tab) -> Result<Summary, crate::error::AppError> {
        let content = self.extractor.extract(tab).await;
        self.summarizer.summarize(&content).await
    }

    /// Process every tab strictly in order, then render the summaries
    pub async fn format_tabs_as_markdown(&self, tabs: &[Tab], now: DateTime<Local>) -> String {
        tracing::info!("Batch: Processing {} tabs in sequence", tabs.len());

        let mut processed = Vec::with_capacity(tabs.len());
        for tab in tabs {
            processed.push(self.process_tab(tab).await);
        }

        render_summaries(&processed, now)
    }
}

fn date_and_time(now: DateTime<Local>) -> (String, String) {
    (
        now.format("%-m/%-d/%Y").to_string(),
        now.format("%-I:%M:%S %p").to_string(),
    )
}

pub fn render_summaries(tabs: &[ProcessedTab], now: DateTime<Local>) -> String {
    let (date, time) = date_and_time(now);
    let mut markdown = format!("# Saved Tabs ({} at {})\n\n", date, time);
    for tab in tabs {
        markdown.push_str(&format!("## [{}]({})\n\n", tab.title, tab.url));
        markdown.push_str(&format!("**Summary:** {}\n\n", tab.summary));
    }
    markdown
}

/// Links only; no extraction and no model calls
pub fn format_tabs_as_links_only(tabs: &[Tab], now: DateTime<Local>) -> String {
    let (date, time) = date_and_time(now);
    let mut markdown = format!("# Saved Links ({} at {})\n\n", date, time);
    for tab in tabs {
        markdown.push_str(&format!("- [{}]({})\n", tab.title, tab.url));
    }
    markdown
}

pub fn format_watch_later(videos: &[VideoRecord], now: DateTime<Local>) -> String {
    let (date, time) = date_and_time(now);
    let mut markdown = String::from("# YouTube Watch Later Videos\n\n");
    markdown.push_str(&format!("Extracted on {}, {}\n\n", date, time));
    for (i, video) in videos.iter().enumerate() {
        markdown.push_str(&format!("## {}. {}\n", i + 1, video.title));
        markdown.push_str(&format!("- Channel: {}\n", video.channel));
        markdown.push_str(&format!("- Duration: {}\n", video.duration));
        markdown.push_str(&format!("- URL: {}\n\n", video.url));
    }
    markdown
}

pub fn format_research(tab: &Tab, analysis: &str, now: DateTime<Local>) -> String {
    let (date, time) = date_and_time(now);
    format!(
        "# YouTube Research: {}\n\n*Analyzed on {} at {}*\n\nURL: {}\n\n## Analysis\n\n{}\n\n",
        tab.title, date, time, tab.url, analysis
    )
}

pub fn format_transcript(tab: &Tab, transcript: &str) -> String {
    format!("# {}\n{}\n\n## Transcript:\n\n{}", tab.title, tab.url, transcript)
}
