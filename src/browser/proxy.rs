// CORS relay fetcher: last-resort content source when the DOM is unreachable

use super::cleaning::extract_proxy_text;
use super::fallback::{first_success, Attempt};
use futures_util::FutureExt;
use std::time::Duration;

/// Public CORS relays, tried in this order
pub const DEFAULT_PROXIES: [&str; 5] = [
    "https://api.codetabs.com/v1/proxy?quest=",
    "https://corsproxy.io/?",
    "https://proxy.cors.sh/",
    "https://cors-anywhere.herokuapp.com/",
    "https://api.allorigins.win/raw?url=",
];

pub const PROXY_TIMEOUT: Duration = Duration::from_secs(8);

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Why a single relay attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyError {
    /// 403 with a body mentioning country blocking
    RegionBlocked,
    Status(u16),
    EmptyContent,
    Request(String),
}

impl std::fmt::Display for ProxyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProxyError::RegionBlocked => write!(f, "Regional blocking detected, proxy access restricted"),
            ProxyError::Status(code) => write!(f, "Proxy returned {}", code),
            ProxyError::EmptyContent => write!(f, "No content found"),
            ProxyError::Request(msg) => write!(f, "{}", msg),
        }
    }
}

/// Every relay failed for `url`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyFailure {
    pub url: String,
    pub domain: String,
    pub path: String,
    pub region_blocked: bool,
    pub last_error: String,
}

impl ProxyFailure {
    fn from_failures(url: &str, failures: &[(String, ProxyError)]) -> Self {
        let (domain, path) = match url::Url::parse(url) {
            Ok(parsed) => (
                parsed.host_str().unwrap_or_default().to_string(),
                parsed.path().to_string(),
            ),
            Err(_) => (String::new(), String::new()),
        };

        Self {
            url: url.to_string(),
            domain,
            path,
            region_blocked: failures.iter().any(|(_, e)| *e == ProxyError::RegionBlocked),
            last_error: failures
                .last()
                .map(|(_, e)| e.to_string())
                .unwrap_or_else(|| "No proxies configured".to_string()),
        }
    }

    /// Diagnostic text handed on in place of page content
    pub fn diagnostic(&self) -> String {
        let reason = if self.region_blocked {
            "CORS proxies are blocked in your region".to_string()
        } else {
            format!("Proxies failed: {}", self.last_error)
        };
        format!(
            "Unable to extract content from URL: {}\nDomain: {}\nPath: {}\nError: {}",
            self.url, self.domain, self.path, reason
        )
    }
}

/// Fetches pages through the configured relays
pub struct ProxyFetcher {
    client: reqwest::Client,
    proxies: Vec<String>,
}

impl ProxyFetcher {
    pub fn new(proxies: Vec<String>) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(PROXY_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self { client, proxies })
    }

    /// Fetch and clean `url` through the first relay that returns content
    pub async fn fetch_content(&self, url: &str) -> Result<String, ProxyFailure> {
        tracing::info!("Proxy: Fetching content from URL: {}", url);

        let attempts = self
            .proxies
            .iter()
            .map(|proxy| Attempt::new(proxy.clone(), self.fetch_via(proxy, url).boxed()))
            .collect();

        match first_success(attempts).await {
            Ok(success) => {
                tracing::info!("Proxy: {} returned {} chars", success.label, success.value.len());
                Ok(success.value)
            }
            Err(failures) => {
                for (proxy, e) in &failures {
                    tracing::warn!("Proxy: {} failed: {}", proxy, e);
                }
                Err(ProxyFailure::from_failures(url, &failures))
            }
        }
    }

    async fn fetch_via(&self, proxy: &str, url: &str) -> Result<String, ProxyError> {
        let target = format!("{}{}", proxy, urlencoding::encode(url));

        let response = self
            .client
            .get(&target)
            .header(reqwest::header::ACCEPT, "text/html")
            .send()
            .await
            .map_err(|e| ProxyError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            if status == reqwest::StatusCode::FORBIDDEN {
                let body = response.text().await.unwrap_or_default();
                if is_region_block(&body) {
                    return Err(ProxyError::RegionBlocked);
                }
            }
            return Err(ProxyError::Status(status.as_u16()));
        }

        let html = response
            .text()
            .await
            .map_err(|e| ProxyError::Request(e.to_string()))?;

        let content = extract_proxy_text(&html);
        if content.is_empty() {
            return Err(ProxyError::EmptyContent);
        }

        Ok(content)
    }
}

fn is_region_block(body: &str) -> bool {
    body.contains("country") && body.contains("block")
}
