// In-memory fakes for the page, browser, model and export seams

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::browser::adapters::{BrowserAdapter, Tab};
use crate::browser::agent::{AgentRequest, AgentResponse, PageAgent, PageHandle};
use crate::browser::watch_later::ScrollMetrics;
use crate::error::AppError;
use crate::export::{ClipboardWriter, UriOpener};
use crate::intelligence::TextGenerator;

const VIEWPORT_HEIGHT: f64 = 1000.0;

enum Growth {
    /// Each time the bottom is reached the height moves to the next step
    Steps(Vec<f64>),
    /// Every scroll adds more than it moves, so the bottom is never reached
    Endless,
}

struct ScrollSim {
    height: f64,
    scroll_y: f64,
    growth: Growth,
    scroll_to_top_calls: usize,
}

/// A page with static HTML and a simulated scroll position
pub struct FakePage {
    url: String,
    html: String,
    failing: bool,
    sim: Mutex<ScrollSim>,
}

impl FakePage {
    pub fn with_html(url: &str, html: &str) -> Self {
        Self::scrolling(url, html, vec![VIEWPORT_HEIGHT])
    }

    /// Heights the document grows through as lazy rows load
    pub fn scrolling(url: &str, html: &str, mut heights: Vec<f64>) -> Self {
        let height = if heights.is_empty() {
            VIEWPORT_HEIGHT
        } else {
            heights.remove(0)
        };
        Self::build(url, html, false, height, Growth::Steps(heights))
    }

    pub fn endless(url: &str, html: &str) -> Self {
        Self::build(url, html, false, VIEWPORT_HEIGHT * 2.0, Growth::Endless)
    }

    /// Every page access errors
    pub fn failing(url: &str) -> Self {
        Self::build(url, "", true, VIEWPORT_HEIGHT, Growth::Steps(Vec::new()))
    }

    fn build(url: &str, html: &str, failing: bool, height: f64, growth: Growth) -> Self {
        Self {
            url: url.to_string(),
            html: html.to_string(),
            failing,
            sim: Mutex::new(ScrollSim {
                height,
                scroll_y: 0.0,
                growth,
                scroll_to_top_calls: 0,
            }),
        }
    }

    pub fn height(&self) -> f64 {
        self.sim.lock().unwrap().height
    }

    /// Current `scrollY`
    pub fn position(&self) -> f64 {
        self.sim.lock().unwrap().scroll_y
    }

    pub fn scroll_to_top_calls(&self) -> usize {
        self.sim.lock().unwrap().scroll_to_top_calls
    }

    fn check(&self) -> Result<(), String> {
        if self.failing {
            Err("Page went away".to_string())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PageHandle for FakePage {
    fn url(&self) -> &str {
        &self.url
    }

    async fn document_html(&self) -> Result<String, String> {
        self.check()?;
        Ok(self.html.clone())
    }

    async fn scroll_metrics(&self) -> Result<ScrollMetrics, String> {
        self.check()?;
        let sim = self.sim.lock().unwrap();
        Ok(ScrollMetrics {
            height: sim.height,
            position: sim.scroll_y + VIEWPORT_HEIGHT,
        })
    }

    async fn scroll_by(&self, dy: i64) -> Result<(), String> {
        self.check()?;
        let mut sim = self.sim.lock().unwrap();
        let max_scroll = (sim.height - VIEWPORT_HEIGHT).max(0.0);
        sim.scroll_y = (sim.scroll_y + dy as f64).min(max_scroll);

        let at_bottom = sim.scroll_y + VIEWPORT_HEIGHT >= sim.height;
        let next_height = match &mut sim.growth {
            Growth::Steps(steps) if at_bottom && !steps.is_empty() => Some(steps.remove(0)),
            Growth::Steps(_) => None,
            Growth::Endless => Some(sim.height + dy as f64 * 2.0),
        };
        if let Some(height) = next_height {
            sim.height = height;
        }
        Ok(())
    }

    async fn scroll_to_top(&self) -> Result<(), String> {
        self.check()?;
        let mut sim = self.sim.lock().unwrap();
        sim.scroll_y = 0.0;
        sim.scroll_to_top_calls += 1;
        Ok(())
    }
}

/// Browser with scripted per-tab behavior; tabs are keyed by URL
pub struct FakeAdapter {
    tabs: Vec<Tab>,
    agent_pages: HashMap<String, FakePage>,
    agent: PageAgent,
    scripting: bool,
    script_results: HashMap<String, String>,
    legacy_results: HashMap<String, String>,
    ping_delay: Duration,
    calls: Mutex<Vec<String>>,
}

impl FakeAdapter {
    pub fn new(tabs: Vec<Tab>) -> Self {
        Self {
            tabs,
            agent_pages: HashMap::new(),
            agent: PageAgent::new(),
            scripting: true,
            script_results: HashMap::new(),
            legacy_results: HashMap::new(),
            ping_delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Install the in-page agent on the tab showing `url`
    pub fn with_agent(mut self, url: &str, html: &str) -> Self {
        self.agent_pages.insert(url.to_string(), FakePage::with_html(url, html));
        self
    }

    pub fn with_agent_page(mut self, page: FakePage) -> Self {
        self.agent_pages.insert(page.url().to_string(), page);
        self
    }

    pub fn with_script_result(mut self, url: &str, text: &str) -> Self {
        self.script_results.insert(url.to_string(), text.to_string());
        self
    }

    pub fn with_legacy_result(mut self, url: &str, text: &str) -> Self {
        self.legacy_results.insert(url.to_string(), text.to_string());
        self
    }

    pub fn without_scripting(mut self) -> Self {
        self.scripting = false;
        self
    }

    pub fn with_ping_delay(mut self, delay: Duration) -> Self {
        self.ping_delay = delay;
        self
    }

    /// `"<kind>:<url>"` for every seam call, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, kind: &str, tab: &Tab) {
        self.calls.lock().unwrap().push(format!("{}:{}", kind, tab.url));
    }
}

impl BrowserAdapter for FakeAdapter {
    fn name(&self) -> &str {
        "Fake"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn list_tabs(&self) -> Result<Vec<Tab>, String> {
        Ok(self.tabs.clone())
    }

    async fn active_tab(&self) -> Result<Tab, String> {
        self.tabs
            .first()
            .cloned()
            .ok_or_else(|| "No active tab".to_string())
    }

    async fn send_agent_message(&self, tab: &Tab, request: &AgentRequest) -> Result<AgentResponse, String> {
        self.record("agent", tab);
        let page = self
            .agent_pages
            .get(&tab.url)
            .ok_or_else(|| "Could not establish connection. Receiving end does not exist.".to_string())?;
        if *request == AgentRequest::Ping && !self.ping_delay.is_zero() {
            tokio::time::sleep(self.ping_delay).await;
        }
        Ok(self.agent.handle(request, page).await)
    }

    fn supports_scripting(&self) -> bool {
        self.scripting
    }

    async fn execute_script(&self, tab: &Tab, _script: &str) -> Result<Option<String>, String> {
        self.record("script", tab);
        Ok(self.script_results.get(&tab.url).cloned())
    }

    async fn execute_legacy_script(&self, tab: &Tab, _script: &str) -> Result<Option<String>, String> {
        self.record("legacy", tab);
        self.legacy_results
            .get(&tab.url)
            .cloned()
            .map(Some)
            .ok_or_else(|| "Cannot access contents of the page".to_string())
    }
}

/// Model that answers every prompt the same way and records what it was asked
#[derive(Clone)]
pub struct FakeGenerator {
    reply: Result<String, String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl FakeGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    fn name(&self) -> &str {
        "fake"
    }

    async fn generate(&self, prompt: &str) -> Result<String, String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone()
    }
}

/// Clipboard and URI opener that record into one shared log
#[derive(Clone, Default)]
pub struct RecordingSinks {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingSinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// `"copy:<text>"` and `"open:<uri>"` entries, in order
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn copied(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| e.strip_prefix("copy:").map(str::to_string))
            .collect()
    }

    pub fn opened(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| e.strip_prefix("open:").map(str::to_string))
            .collect()
    }
}

impl ClipboardWriter for RecordingSinks {
    fn write_text(&self, text: &str) -> Result<(), AppError> {
        self.events.lock().unwrap().push(format!("copy:{}", text));
        Ok(())
    }
}

impl UriOpener for RecordingSinks {
    fn open(&self, uri: &str) -> Result<(), AppError> {
        self.events.lock().unwrap().push(format!("open:{}", uri));
        Ok(())
    }
}
