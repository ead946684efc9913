// Watch Later collector: scrolls the playlist until lazy rows stop loading, then scrapes them

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;

use super::agent::PageHandle;
use super::html::{Document, Selector};
use crate::error::AppError;

pub const WATCH_LATER_MARKER: &str = "youtube.com/playlist?list=WL";

pub const POLL_INTERVAL: Duration = Duration::from_millis(500);
pub const SAFETY_TIMEOUT: Duration = Duration::from_secs(30);
pub const SCROLL_STEP: i64 = 800;
/// Distance from the bottom (px) that still counts as "at the bottom"
pub const BOTTOM_THRESHOLD: f64 = 10.0;
/// Consecutive unchanged heights at the bottom before stopping
pub const MAX_UNCHANGED_POLLS: u32 = 5;

const YOUTUBE_ORIGIN: &str = "https://www.youtube.com";

/// One rendered playlist row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoRecord {
    pub title: String,
    pub channel: String,
    pub duration: String,
    pub url: String,
    pub timestamp: String,
}

/// Document height and the bottom edge of the viewport (`scrollY + innerHeight`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub height: f64,
    pub position: f64,
}

/// How the scroll loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Stable,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ScrollState {
    #[default]
    Idle,
    Scrolling,
}

/// Owns the in-flight state; a second run while one is active is rejected
#[derive(Debug, Default)]
pub struct AutoScrollController {
    state: Mutex<ScrollState>,
}

/// Resets the controller to idle however the run ends
struct ScrollGuard<'a> {
    controller: &'a AutoScrollController,
}

impl Drop for ScrollGuard<'_> {
    fn drop(&mut self) {
        self.controller.set_state(ScrollState::Idle);
    }
}

impl AutoScrollController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_scrolling(&self) -> bool {
        self.state() == ScrollState::Scrolling
    }

    fn state(&self) -> ScrollState {
        match self.state.lock() {
            Ok(state) => *state,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn set_state(&self, new_state: ScrollState) {
        match self.state.lock() {
            Ok(mut state) => *state = new_state,
            Err(poisoned) => *poisoned.into_inner() = new_state,
        }
    }

    fn try_begin(&self) -> Result<ScrollGuard<'_>, AppError> {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *state == ScrollState::Scrolling {
            return Err(AppError::ScrollInProgress);
        }
        *state = ScrollState::Scrolling;
        Ok(ScrollGuard { controller: self })
    }

    /// Scroll the Watch Later page to its end and scrape every rendered row
    pub async fn run(&self, page: &dyn PageHandle) -> Result<Vec<VideoRecord>, AppError> {
        let _guard = self.try_begin()?;

        if !page.url().contains(WATCH_LATER_MARKER) {
            return Err(AppError::NotWatchLater);
        }

        page.scroll_to_top().await.map_err(AppError::Browser)?;

        let reason = scroll_until_stable(page).await.map_err(AppError::Browser)?;
        tracing::info!("WatchLater: Scrolling stopped ({:?})", reason);

        page.scroll_to_top().await.map_err(AppError::Browser)?;
        let html = page.document_html().await.map_err(AppError::Browser)?;
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let videos = parse_playlist_rows(&html, &timestamp);
        tracing::info!("WatchLater: Extracted {} videos", videos.len());
        Ok(videos)
    }
}

/// Poll every [`POLL_INTERVAL`] until the height is stable at the bottom, bounded by [`SAFETY_TIMEOUT`].
pub async fn scroll_until_stable(page: &dyn PageHandle) -> Result<StopReason, String> {
    match tokio::time::timeout(SAFETY_TIMEOUT, poll_until_stable(page)).await {
        Ok(Ok(())) => Ok(StopReason::Stable),
        Ok(Err(e)) => Err(e),
        Err(_) => Ok(StopReason::TimedOut),
    }
}

async fn poll_until_stable(page: &dyn PageHandle) -> Result<(), String> {
    let start = tokio::time::Instant::now() + POLL_INTERVAL;
    let mut ticker = tokio::time::interval_at(start, POLL_INTERVAL);
    let mut previous_height = 0.0;
    let mut unchanged = 0;

    loop {
        ticker.tick().await;

        let metrics = page.scroll_metrics().await?;
        if metrics.position >= metrics.height - BOTTOM_THRESHOLD {
            if metrics.height == previous_height {
                unchanged += 1;
                if unchanged >= MAX_UNCHANGED_POLLS {
                    return Ok(());
                }
            } else {
                unchanged = 0;
            }
        }
        previous_height = metrics.height;

        page.scroll_by(SCROLL_STEP).await?;
    }
}

/// Scrape `ytd-playlist-video-renderer` rows in page order
pub fn parse_playlist_rows(html: &str, timestamp: &str) -> Vec<VideoRecord> {
    let doc = Document::parse(html);
    let title_selector = Selector::Id("video-title".to_string());
    let channel_selector = Selector::Class("ytd-channel-name".to_string());
    let link_selector = Selector::Tag("a".to_string());
    let duration_selector = Selector::Class("badge-shape-wiz__text".to_string());

    doc.select(&Selector::Tag("ytd-playlist-video-renderer".to_string()))
        .iter()
        .map(|row| {
            let row = row.document();
            let title_el = row.select_first(&title_selector);

            let title = title_el
                .map(|el| el.text_content().trim().to_string())
                .unwrap_or_default();
            let url = title_el
                .and_then(|el| el.attr("href"))
                .map(|href| resolve_link(&href))
                .unwrap_or_default();

            // `.ytd-channel-name a`
            let channel = row
                .select(&channel_selector)
                .iter()
                .find_map(|el| {
                    el.document()
                        .select_first(&link_selector)
                        .map(|a| a.text_content().trim().to_string())
                })
                .unwrap_or_default();

            let duration = row
                .select_first(&duration_selector)
                .map(|el| el.text_content().trim().to_string())
                .unwrap_or_default();

            VideoRecord {
                title,
                channel,
                duration,
                url,
                timestamp: timestamp.to_string(),
            }
        })
        .collect()
}

fn resolve_link(href: &str) -> String {
    if href.is_empty() {
        return String::new();
    }
    url::Url::parse(YOUTUBE_ORIGIN)
        .and_then(|base| base.join(href))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}
