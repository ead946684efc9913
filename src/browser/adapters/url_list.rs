// URL list adapter: tabs given on the command line or in a file, no page access

use super::{parse_tab_lines, BrowserAdapter, Tab};
use crate::browser::agent::{AgentRequest, AgentResponse};

/// Treats a fixed list of URLs as the open tabs. Content can only come from the relays.
pub struct UrlListAdapter {
    tabs: Vec<Tab>,
}

impl UrlListAdapter {
    pub fn new(tabs: Vec<Tab>) -> Self {
        Self { tabs }
    }

    /// `URL|||Title` or bare `URL` lines
    pub fn from_lines(text: &str) -> Self {
        Self::new(parse_tab_lines(text, "u"))
    }

    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines = urls
            .into_iter()
            .map(|u| u.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        Self::from_lines(&lines)
    }
}

impl BrowserAdapter for UrlListAdapter {
    fn name(&self) -> &str {
        "URL list"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn list_tabs(&self) -> Result<Vec<Tab>, String> {
        Ok(self.tabs.clone())
    }

    /// The first listed URL
    async fn active_tab(&self) -> Result<Tab, String> {
        self.tabs
            .first()
            .cloned()
            .ok_or_else(|| "No active tab found".to_string())
    }

    async fn send_agent_message(&self, _tab: &Tab, _request: &AgentRequest) -> Result<AgentResponse, String> {
        Err("No in-page agent for listed URLs".to_string())
    }

    fn supports_scripting(&self) -> bool {
        false
    }

    async fn execute_script(&self, _tab: &Tab, _script: &str) -> Result<Option<String>, String> {
        Err("Scripting is not available for listed URLs".to_string())
    }

    async fn execute_legacy_script(&self, _tab: &Tab, _script: &str) -> Result<Option<String>, String> {
        Err("Scripting is not available for listed URLs".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_urls() {
        let adapter = UrlListAdapter::from_urls(["https://a.dev/x", "https://b.dev|||B site"]);
        let tabs = adapter.list_tabs().await.unwrap();

        assert_eq!(
            tabs,
            vec![
                Tab::new("u0", "https://a.dev/x", "https://a.dev/x"),
                Tab::new("u1", "B site", "https://b.dev"),
            ]
        );
        assert_eq!(adapter.active_tab().await.unwrap(), tabs[0]);
    }

    #[tokio::test]
    async fn test_no_page_access() {
        let adapter = UrlListAdapter::from_lines("https://a.dev\n");
        let tab = adapter.active_tab().await.unwrap();

        assert!(!adapter.supports_scripting());
        assert!(adapter.send_agent_message(&tab, &AgentRequest::Ping).await.is_err());
        assert!(adapter.execute_legacy_script(&tab, "1").await.is_err());
    }

    #[tokio::test]
    async fn test_empty_list() {
        assert!(UrlListAdapter::from_lines("").active_tab().await.is_err());
    }
}
