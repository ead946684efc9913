// In-page agent: answers extension messages against a live page

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::cleaning::{extract_metadata, extract_readable_text, PageMetadata};
use super::watch_later::{AutoScrollController, ScrollMetrics, VideoRecord};

/// Messages understood by the agent, tagged by `action`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum AgentRequest {
    Ping,
    GetMetadata,
    GetPageContent,
    StartAutoScroll,
}

/// Replies carrying a `status` field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StatusReply {
    Pong,
    Complete { videos: Vec<VideoRecord> },
    Error { message: String },
}

/// Any agent reply; the JSON shape identifies the variant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AgentResponse {
    Status(StatusReply),
    Metadata(PageMetadata),
    Content { content: String },
}

impl AgentResponse {
    pub fn is_pong(&self) -> bool {
        matches!(self, AgentResponse::Status(StatusReply::Pong))
    }
}

/// The page as seen from inside a tab
#[async_trait]
pub trait PageHandle: Send + Sync {
    fn url(&self) -> &str;
    /// Serialized document (`document.documentElement.outerHTML`)
    async fn document_html(&self) -> Result<String, String>;
    async fn scroll_metrics(&self) -> Result<ScrollMetrics, String>;
    async fn scroll_by(&self, dy: i64) -> Result<(), String>;
    async fn scroll_to_top(&self) -> Result<(), String>;
}

/// Message handler with the per-page auto-scroll state
#[derive(Default)]
pub struct PageAgent {
    scroller: AutoScrollController,
}

impl PageAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn handle(&self, request: &AgentRequest, page: &dyn PageHandle) -> AgentResponse {
        tracing::debug!("Agent: {:?} for {}", request, page.url());

        match request {
            AgentRequest::Ping => AgentResponse::Status(StatusReply::Pong),
            AgentRequest::GetMetadata => match page.document_html().await {
                Ok(html) => AgentResponse::Metadata(extract_metadata(&html)),
                Err(e) => {
                    tracing::warn!("Agent: Error extracting metadata: {}", e);
                    AgentResponse::Metadata(PageMetadata::default())
                }
            },
            AgentRequest::GetPageContent => match page.document_html().await {
                Ok(html) => AgentResponse::Content {
                    content: extract_readable_text(&html),
                },
                Err(e) => AgentResponse::Status(StatusReply::Error {
                    message: format!("Error extracting content: {}", e),
                }),
            },
            AgentRequest::StartAutoScroll => match self.scroller.run(page).await {
                Ok(videos) => AgentResponse::Status(StatusReply::Complete { videos }),
                Err(e) => AgentResponse::Status(StatusReply::Error {
                    message: e.to_string(),
                }),
            },
        }
    }
}
