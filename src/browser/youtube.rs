// YouTube transcripts - video id recognition and caption track retrieval

use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;

use super::html::decode_html_entities;
use crate::error::AppError;

const YOUTUBE_BASE_URL: &str = "https://www.youtube.com";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/85.0.4183.83 Safari/537.36,gzip(gfe)";

/// Extract the 11-character video id from any common YouTube URL shape.
pub fn extract_video_id(url: &str) -> Option<String> {
    static VIDEO_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^.*(?:youtu\.be/|v/|/u/\w/|embed/|watch\?(?:.*&)?v=)([^#&?/]*)").unwrap()
    });

    VIDEO_ID_REGEX
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|id| id.chars().count() == 11)
        .map(str::to_string)
}

/// True for youtube.com and youtu.be URLs, whatever the path
pub fn is_youtube_host(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or_default().to_lowercase();
            host == "youtu.be" || host == "youtube.com" || host.ends_with(".youtube.com")
        }
        Err(_) => false,
    }
}

/// True for YouTube URLs that carry a video id
pub fn is_youtube_url(url: &str) -> bool {
    is_youtube_host(url) && extract_video_id(url).is_some()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionsBlock {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
}

/// Fetches caption tracks from the watch page of a video
pub struct TranscriptFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl TranscriptFetcher {
    pub fn new() -> Result<Self, String> {
        Self::with_base_url(YOUTUBE_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Plain transcript text of a video, segments joined by single spaces
    pub async fn fetch(&self, video_id: &str) -> Result<String, AppError> {
        tracing::info!("YouTube: Fetching transcript for {}", video_id);

        let watch_url = format!("{}/watch?v={}", self.base_url, video_id);
        let page = self.get_text(&watch_url).await?;

        let track_url = caption_track_url(&page, video_id)?;
        let track_url = self.resolve(&track_url);
        let xml = self.get_text(&track_url).await?;

        let transcript = parse_transcript_xml(&xml);
        tracing::info!("YouTube: Transcript has {} chars", transcript.len());
        Ok(transcript)
    }

    async fn get_text(&self, url: &str) -> Result<String, AppError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US")
            .send()
            .await
            .map_err(|e| AppError::Transcript(format!("Failed to fetch {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Transcript(format!(
                "YouTube returned {} for {}",
                status.as_u16(),
                url
            )));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::Transcript(format!("Failed to read response body: {}", e)))
    }

    /// Caption URLs are absolute on youtube.com but may be root-relative
    fn resolve(&self, track_url: &str) -> String {
        if track_url.starts_with('/') {
            format!("{}{}", self.base_url, track_url)
        } else {
            track_url.to_string()
        }
    }
}

/// Locate the `"captions":` JSON block of a watch page and return the first track URL.
fn caption_track_url(page: &str, video_id: &str) -> Result<String, AppError> {
    let Some(block) = extract_json_block(page, "\"captions\":") else {
        if page.contains("class=\"g-recaptcha\"") {
            return Err(AppError::Transcript(
                "YouTube is receiving too many requests from this IP and now requires solving a captcha to continue"
                    .to_string(),
            ));
        }
        if !page.contains("\"playabilityStatus\":") {
            return Err(AppError::Transcript(format!(
                "The video is no longer available ({})",
                video_id
            )));
        }
        return Err(AppError::Transcript(format!(
            "Transcript is disabled on this video ({})",
            video_id
        )));
    };

    let captions: CaptionsBlock = serde_json::from_str(block)
        .map_err(|e| AppError::Transcript(format!("Failed to parse captions: {}", e)))?;

    let renderer = captions.player_captions_tracklist_renderer.ok_or_else(|| {
        AppError::Transcript(format!("Transcript is disabled on this video ({})", video_id))
    })?;

    renderer
        .caption_tracks
        .into_iter()
        .next()
        .map(|track| track.base_url)
        .ok_or_else(|| {
            AppError::Transcript(format!(
                "No transcripts are available for this video ({})",
                video_id
            ))
        })
}

/// The balanced `{...}` object following `marker`, found by brace counting
fn extract_json_block<'a>(html: &'a str, marker: &str) -> Option<&'a str> {
    let start = html.find(marker)? + marker.len();
    let remaining = html[start..].trim_start();
    if !remaining.starts_with('{') {
        return None;
    }

    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in remaining.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&remaining[..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Join the decoded text of every `<text>` segment of a timed-text document
fn parse_transcript_xml(xml: &str) -> String {
    static SEGMENT_REGEX: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)<text\b[^>]*>(.*?)</text>").unwrap());

    SEGMENT_REGEX
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|m| decode_html_entities(m.as_str()))
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}
