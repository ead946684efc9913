// Summarizer - prompts, degraded fallbacks and tagged results over a TextGenerator

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::gemini_provider::GeminiProvider;
use super::provider::TextGenerator;
use crate::browser::cleaning::{truncate_at_sentence, MAX_CONTENT_CHARS, SENTENCE_BOUNDARY_MIN};
use crate::browser::extractor::PageContent;
use crate::browser::youtube::{extract_video_id, TranscriptFetcher};
use crate::error::AppError;
use crate::settings::TRANSCRIPT_PLACEHOLDER;

pub const URL_ONLY_PREFIX: &str = "[Auto-generated based on URL only] ";
pub const NO_CONTENT_MESSAGE: &str = "No content available to summarize";
pub const EMPTY_SUMMARY_MESSAGE: &str = "Summary generation failed";

/// How a summary was obtained
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SummaryKind {
    Generated,
    /// The model only saw the URL
    UrlOnly,
    NoContent,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Summary {
    pub kind: SummaryKind,
    pub text: String,
}

impl Summary {
    pub fn new(kind: SummaryKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn failed(text: impl Into<String>) -> Self {
        Self::new(SummaryKind::Failed, text)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn content_prompt(content: &str) -> String {
    format!(
        "Please provide a brief, informative summary (2-3 sentences) of the following content:\n\n{}",
        content
    )
}

fn url_only_prompt(url: &str) -> String {
    format!(
        "Please provide a brief, informative summary (2-3 sentences) of what this website is likely about, based only on its URL: {}.\n\
         Note that I couldn't access the actual content. Focus on what you know about this domain and what the URL path suggests.",
        url
    )
}

fn video_prompt(transcript: &str) -> String {
    format!(
        "Please provide a brief, informative summary (3-5 sentences) of this YouTube video based on its transcript:\n\n{}",
        transcript
    )
}

/// Fill `{transcript}` in a user prompt, or append the transcript when the placeholder is absent
pub fn apply_custom_prompt(prompt: &str, transcript: &str) -> String {
    if prompt.contains(TRANSCRIPT_PLACEHOLDER) {
        prompt.replace(TRANSCRIPT_PLACEHOLDER, transcript)
    } else {
        format!("{}\n\n{}", prompt, transcript)
    }
}

/// Rough category of a site, used when nothing else is known about it
pub fn url_type(url: &str) -> String {
    let lower = url.to_lowercase();
    if lower.contains("google.dev") || lower.contains("ai.google") {
        return "Google AI developer documentation".to_string();
    }
    if lower.contains("github.com") {
        return "GitHub repository".to_string();
    }
    if lower.contains("youtube.com") || lower.contains("youtu.be") {
        return "YouTube video".to_string();
    }
    if lower.contains("docs.") || lower.contains("/docs/") {
        return "documentation".to_string();
    }
    if lower.contains("blog") || lower.contains("article") {
        return "blog or article".to_string();
    }

    match url::Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => format!("{} page", host),
            None => "web".to_string(),
        },
        Err(_) => "web".to_string(),
    }
}

/// Summarization client; unusable until a generator is installed
#[derive(Default)]
pub struct Summarizer {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl Summarizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_generator(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator: Some(generator),
        }
    }

    /// Install a Gemini client for `api_key`
    pub fn init(&mut self, api_key: &str, model: &str) -> Result<(), AppError> {
        let api_key = api_key.trim();
        if api_key.is_empty() || model.trim().is_empty() {
            return Err(AppError::InvalidCredential);
        }
        self.generator = Some(Arc::new(GeminiProvider::new(
            api_key.to_string(),
            model.trim().to_string(),
        )));
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.generator.is_some()
    }

    fn generator(&self) -> Result<&Arc<dyn TextGenerator>, AppError> {
        self.generator.as_ref().ok_or(AppError::NotInitialized)
    }

    /// Summarize extracted page content. Only fails when uninitialized.
    pub async fn summarize(&self, content: &PageContent) -> Result<Summary, AppError> {
        let generator = self.generator()?;

        match content {
            PageContent::Missing { .. } => Ok(Summary::new(SummaryKind::NoContent, NO_CONTENT_MESSAGE)),
            PageContent::Extracted { text, .. } if text.trim().is_empty() => {
                Ok(Summary::new(SummaryKind::NoContent, NO_CONTENT_MESSAGE))
            }
            PageContent::Unreachable { url, .. } => Ok(summarize_url(generator.as_ref(), url).await),
            PageContent::Extracted { text, .. } => {
                let bounded = truncate_at_sentence(text, MAX_CONTENT_CHARS, SENTENCE_BOUNDARY_MIN);
                tracing::info!("Summarizer: Sending {} chars to {}", bounded.len(), generator.name());

                Ok(match generator.generate(&content_prompt(&bounded)).await {
                    Ok(output) if output.trim().is_empty() => Summary::failed(EMPTY_SUMMARY_MESSAGE),
                    Ok(output) => Summary::new(SummaryKind::Generated, output.trim()),
                    Err(e) => {
                        tracing::warn!("Summarizer: Error generating summary: {}", e);
                        Summary::failed(format!("Unable to generate summary: {}", e))
                    }
                })
            }
        }
    }

    /// Summarize raw text, recognizing extraction diagnostics that embed a URL
    pub async fn summarize_text(&self, raw: &str) -> Result<Summary, AppError> {
        self.summarize(&PageContent::parse(raw)).await
    }

    /// Transcript-based summary of a video, or a research analysis with `custom_prompt`.
    ///
    /// `None` when the video has no id or transcript, or the model fails.
    pub async fn summarize_video(
        &self,
        url: &str,
        transcripts: &TranscriptFetcher,
        custom_prompt: Option<&str>,
    ) -> Option<Summary> {
        let generator = match self.generator() {
            Ok(generator) => generator,
            Err(e) => {
                tracing::warn!("Summarizer: {}", e);
                return None;
            }
        };
        let video_id = extract_video_id(url)?;

        let transcript = match transcripts.fetch(&video_id).await {
            Ok(transcript) if !transcript.is_empty() => transcript,
            Ok(_) => {
                tracing::info!("Summarizer: Empty transcript for {}", video_id);
                return None;
            }
            Err(e) => {
                tracing::info!("Summarizer: No transcript for {}: {}", video_id, e);
                return None;
            }
        };

        let prompt = match custom_prompt.map(str::trim).filter(|p| !p.is_empty()) {
            Some(custom) => apply_custom_prompt(custom, &transcript),
            None => video_prompt(&transcript),
        };

        match generator.generate(&prompt).await {
            Ok(output) if !output.trim().is_empty() => {
                Some(Summary::new(SummaryKind::Generated, output.trim()))
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Summarizer: Video summary failed: {}", e);
                None
            }
        }
    }
}

async fn summarize_url(generator: &dyn TextGenerator, url: &str) -> Summary {
    tracing::info!("Summarizer: Generating URL-based summary for {}", url);
    match generator.generate(&url_only_prompt(url)).await {
        Ok(output) => Summary::new(
            SummaryKind::UrlOnly,
            format!("{}{}", URL_ONLY_PREFIX, output.trim()),
        ),
        Err(e) => {
            tracing::warn!("Summarizer: Error generating URL summary: {}", e);
            Summary::failed(format!(
                "Unable to summarize. This appears to be a {} website.",
                url_type(url)
            ))
        }
    }
}
