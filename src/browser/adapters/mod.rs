// Browser adapter trait: browser-agnostic interface for tabs and in-page access

pub mod chrome;
pub mod url_list;

use serde::{Deserialize, Serialize};
use std::future::Future;

use super::agent::{AgentRequest, AgentResponse};

/// Tab descriptor from a browser, read-only
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tab {
    pub id: String,
    pub title: String,
    pub url: String,
}

impl Tab {
    pub fn new(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
        }
    }
}

/// Trait for browser-specific tab access.
/// Implement this for each way of reaching a browser (Chrome via AppleScript, a plain URL list...).
pub trait BrowserAdapter: Send + Sync {
    /// Human-readable browser name
    fn name(&self) -> &str;
    /// Check if this browser is running/available
    fn is_available(&self) -> bool;
    /// Get all tabs of the current window set
    fn list_tabs(&self) -> impl Future<Output = Result<Vec<Tab>, String>> + Send;
    /// Get the focused tab
    fn active_tab(&self) -> impl Future<Output = Result<Tab, String>> + Send;
    /// Send a message to the in-page agent of a tab and wait for its answer.
    /// Errors when no agent is reachable in that tab.
    fn send_agent_message(
        &self,
        tab: &Tab,
        request: &AgentRequest,
    ) -> impl Future<Output = Result<AgentResponse, String>> + Send;
    /// Whether one-shot script injection is available
    fn supports_scripting(&self) -> bool;
    /// Inject a script expression and return its string result (None when it produced nothing)
    fn execute_script(
        &self,
        tab: &Tab,
        script: &str,
    ) -> impl Future<Output = Result<Option<String>, String>> + Send;
    /// Older injection path, used when scripting is unavailable or failed
    fn execute_legacy_script(
        &self,
        tab: &Tab,
        script: &str,
    ) -> impl Future<Output = Result<Option<String>, String>> + Send;
}

/// Parse `URL|||Title` lines into tabs. Lines without a title use the URL as title.
pub fn parse_tab_lines(output: &str, id_prefix: &str) -> Vec<Tab> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, line)| {
            let mut parts = line.splitn(2, "|||");
            let url = parts.next().unwrap_or_default().trim().to_string();
            let title = parts
                .next()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| url.clone());
            Tab {
                id: format!("{}{}", id_prefix, i),
                title,
                url,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tab_lines() {
        let output = "https://github.com|||GitHub\nhttps://youtube.com/watch?v=abc|||My Video\n";
        let tabs = parse_tab_lines(output, "t");

        assert_eq!(tabs.len(), 2);
        assert_eq!(tabs[0], Tab::new("t0", "GitHub", "https://github.com"));
        assert_eq!(tabs[1].title, "My Video");
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_tab_lines("\n\n", "t").is_empty());
    }

    #[test]
    fn test_parse_title_with_delimiter() {
        // splitn(2, ...) keeps the delimiter inside titles
        let tabs = parse_tab_lines("https://example.com|||Page with ||| in title\n", "t");
        assert_eq!(tabs[0].title, "Page with ||| in title");
    }

    #[test]
    fn test_parse_url_without_title() {
        let tabs = parse_tab_lines("https://example.com/a\n", "u");
        assert_eq!(tabs[0].title, "https://example.com/a");
    }
}
