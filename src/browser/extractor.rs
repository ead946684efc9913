// Page content extraction: DOM strategies first, CORS relays and tab metadata as fallbacks

use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::adapters::{BrowserAdapter, Tab};
use super::agent::{AgentRequest, AgentResponse, StatusReply};
use super::cleaning::{truncate_at_sentence, MAX_CONTENT_CHARS, SENTENCE_BOUNDARY_MIN};
use super::fallback::{first_success, Attempt};
use super::proxy::ProxyFetcher;
use super::scripts;

/// How long the in-page agent gets to answer `ping`
pub const AGENT_PROBE_TIMEOUT: Duration = Duration::from_millis(500);

/// DOM text at or below this length falls through to the relays
pub const MIN_DOM_CONTENT_CHARS: usize = 100;

/// Relay text below this length is replaced by tab metadata
pub const MIN_PROXY_CONTENT_CHARS: usize = 50;

/// Where extracted text came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ContentSource {
    InPageAgent,
    Scripting,
    LegacyScript,
    Proxy,
    TabMetadata,
}

/// Result of extracting one tab
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum PageContent {
    Extracted { source: ContentSource, text: String },
    /// The page exists but none of its text can be read
    Unreachable { url: String, reason: String },
    /// Nothing to extract from
    Missing { reason: String },
}

impl PageContent {
    /// Text handed to the summarizer; diagnostics for the non-extracted cases
    pub fn text(&self) -> String {
        match self {
            PageContent::Extracted { text, .. } => text.clone(),
            PageContent::Unreachable { url, reason } => {
                format!("Unable to extract content: {}\nURL: {}", reason, url)
            }
            PageContent::Missing { reason } => reason.clone(),
        }
    }

    /// Classify raw text coming from outside the extractor (piped input, stored notes)
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return PageContent::Missing {
                reason: String::new(),
            };
        }

        if trimmed.starts_with("Unable to") {
            if let Some((head, url)) = trimmed.split_once("URL:") {
                let url = url.trim().lines().next().unwrap_or_default().trim().to_string();
                let reason = head
                    .trim_start_matches("Unable to extract content:")
                    .trim()
                    .to_string();
                return PageContent::Unreachable { url, reason };
            }
        }

        PageContent::Extracted {
            source: ContentSource::TabMetadata,
            text: trimmed.to_string(),
        }
    }
}

/// Extracts bounded plain text for a tab through a browser adapter
pub struct PageContentExtractor<'a, A: BrowserAdapter> {
    adapter: &'a A,
    proxy: ProxyFetcher,
}

impl<'a, A: BrowserAdapter> PageContentExtractor<'a, A> {
    pub fn new(adapter: &'a A, proxy: ProxyFetcher) -> Self {
        Self { adapter, proxy }
    }

    /// Never fails; the weakest outcome is the tab's own title and URL.
    pub async fn extract(&self, tab: &Tab) -> PageContent {
        tracing::info!("Extractor: Extracting content from tab {} ({})", tab.id, tab.url);

        if tab.url.trim().is_empty() {
            return PageContent::Missing {
                reason: "No URL to extract content from".to_string(),
            };
        }

        if !tab.url.starts_with("http") {
            return PageContent::Unreachable {
                url: tab.url.clone(),
                reason: "Unsupported URL protocol".to_string(),
            };
        }

        if let Some((source, text)) = self.extract_from_dom(tab).await {
            if text.chars().count() > MIN_DOM_CONTENT_CHARS {
                tracing::info!("Extractor: Got {} chars via {:?}", text.len(), source);
                return PageContent::Extracted { source, text };
            }
        }

        tracing::info!("Extractor: DOM extraction insufficient, trying relays");
        let metadata = format!("Tab Title: {}\nURL: {}", tab.title, tab.url);

        match self.proxy.fetch_content(&tab.url).await {
            Ok(text) if text.chars().count() >= MIN_PROXY_CONTENT_CHARS => PageContent::Extracted {
                source: ContentSource::Proxy,
                text,
            },
            Ok(_) => PageContent::Extracted {
                source: ContentSource::TabMetadata,
                text: metadata,
            },
            Err(failure) => {
                tracing::warn!("Extractor: {}", failure.diagnostic().replace('\n', "; "));
                PageContent::Extracted {
                    source: ContentSource::TabMetadata,
                    text: metadata,
                }
            }
        }
    }

    /// First non-empty DOM strategy, re-bounded
    async fn extract_from_dom(&self, tab: &Tab) -> Option<(ContentSource, String)> {
        let mut attempts = vec![Attempt::new("agent", self.via_agent(tab).boxed())];
        if self.adapter.supports_scripting() {
            attempts.push(Attempt::new("scripting", self.via_script(tab).boxed()));
        }
        attempts.push(Attempt::new("legacy", self.via_legacy_script(tab).boxed()));

        match first_success(attempts).await {
            Ok(success) => {
                let (source, text) = success.value;
                Some((
                    source,
                    truncate_at_sentence(&text, MAX_CONTENT_CHARS, SENTENCE_BOUNDARY_MIN),
                ))
            }
            Err(failures) => {
                for (label, e) in failures {
                    tracing::debug!("Extractor: {} failed: {}", label, e);
                }
                None
            }
        }
    }

    async fn via_agent(&self, tab: &Tab) -> Result<(ContentSource, String), String> {
        let pong = tokio::time::timeout(
            AGENT_PROBE_TIMEOUT,
            self.adapter.send_agent_message(tab, &AgentRequest::Ping),
        )
        .await
        .map_err(|_| "Agent did not answer ping in time".to_string())??;

        if !pong.is_pong() {
            return Err("Agent is not available".to_string());
        }

        match self
            .adapter
            .send_agent_message(tab, &AgentRequest::GetPageContent)
            .await?
        {
            AgentResponse::Content { content } if !content.trim().is_empty() => {
                Ok((ContentSource::InPageAgent, content))
            }
            AgentResponse::Status(StatusReply::Error { message }) => Err(message),
            _ => Err("Agent returned no content".to_string()),
        }
    }

    async fn via_script(&self, tab: &Tab) -> Result<(ContentSource, String), String> {
        non_empty(self.adapter.execute_script(tab, scripts::READABLE_TEXT).await?)
            .map(|text| (ContentSource::Scripting, text))
            .ok_or_else(|| "Scripting returned nothing".to_string())
    }

    async fn via_legacy_script(&self, tab: &Tab) -> Result<(ContentSource, String), String> {
        non_empty(self.adapter.execute_legacy_script(tab, scripts::LEGACY_SUMMARY).await?)
            .map(|text| (ContentSource::LegacyScript, text))
            .ok_or_else(|| "Legacy script returned nothing".to_string())
    }
}

fn non_empty(result: Option<String>) -> Option<String> {
    result.filter(|text| !text.trim().is_empty())
}
