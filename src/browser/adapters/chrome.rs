// Chrome browser adapter: macOS AppleScript implementation

use async_trait::async_trait;
use tokio::process::Command;

use super::{BrowserAdapter, Tab};
use crate::browser::agent::{AgentRequest, AgentResponse, PageAgent, PageHandle};
use crate::browser::scripts;
use crate::browser::watch_later::ScrollMetrics;

/// Chrome adapter using AppleScript (macOS only).
///
/// Chrome has no extension agent here; agent messages are answered by a
/// [`PageAgent`] that reaches the page through `execute javascript`.
#[derive(Default)]
pub struct ChromeAppleScriptAdapter {
    agent: PageAgent,
}

impl ChromeAppleScriptAdapter {
    /// AppleScript that gets ALL tabs from ALL Chrome windows.
    /// Returns lines in format: windowIndex|||tabIndex|||URL|||Title
    const LIST_TABS_SCRIPT: &'static str = r#"
tell application "Google Chrome"
    set tabInfo to ""
    set windowCount to count of windows
    repeat with w from 1 to windowCount
        set tabCount to count of tabs in window w
        repeat with t from 1 to tabCount
            set tabURL to URL of tab t of window w
            set tabTitle to title of tab t of window w
            set tabInfo to tabInfo & w & "|||" & t & "|||" & tabURL & "|||" & tabTitle & linefeed
        end repeat
    end repeat
    return tabInfo
end tell
"#;

    /// Same line format, for the active tab of the front window
    const ACTIVE_TAB_SCRIPT: &'static str = r#"
tell application "Google Chrome"
    set w to front window
    set t to active tab index of w
    return (index of w as text) & "|||" & (t as text) & "|||" & (URL of active tab of w) & "|||" & (title of active tab of w)
end tell
"#;

    /// Max HTML size we'll accept from a tab (5MB)
    const MAX_HTML_SIZE: usize = 5 * 1024 * 1024;

    pub fn new() -> Self {
        Self::default()
    }

    async fn osascript(script: &str) -> Result<String, String> {
        let output = Command::new("osascript")
            .arg("-e")
            .arg(script)
            .output()
            .await
            .map_err(|e| format!("Failed to execute AppleScript: {}", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("JavaScript through AppleScript is turned off") {
                return Err(
                    "Chrome requires JavaScript from AppleScript to be enabled. \
                     Go to Chrome menu: View → Developer → Allow JavaScript from Apple Events"
                        .to_string(),
                );
            }
            return Err(format!("AppleScript failed: {}", stderr.trim()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Window/tab position of `tab`, re-checked against the live tab list.
    /// Falls back to a URL search when the tab moved.
    async fn locate(&self, tab: &Tab) -> Result<(usize, usize), String> {
        let live = parse_indexed_tab_lines(&Self::osascript(Self::LIST_TABS_SCRIPT).await?);

        live.iter()
            .find(|t| t.id == tab.id && t.url == tab.url)
            .or_else(|| live.iter().find(|t| t.url == tab.url))
            .and_then(|t| parse_tab_id(&t.id))
            .ok_or_else(|| "Chrome tab not found for this URL - the tab may have been closed".to_string())
    }

    async fn run_js(&self, tab: &Tab, js: &str) -> Result<Option<String>, String> {
        let (w, t) = self.locate(tab).await?;
        let output = Self::osascript(&execute_javascript_script(w, t, js)).await?;
        let output = output.trim_end_matches('\n');

        if output.is_empty() || output == "missing value" {
            Ok(None)
        } else {
            Ok(Some(output.to_string()))
        }
    }
}

/// AppleScript running `js` in tab `t` of window `w`, addressed by numeric indices only
fn execute_javascript_script(w: usize, t: usize, js: &str) -> String {
    // Escape for AppleScript string: backslashes first, then double quotes
    let escaped_js = js.replace('\\', "\\\\").replace('"', "\\\"");
    format!(
        r#"tell application "Google Chrome" to execute tab {} of window {} javascript "{}""#,
        t, w, escaped_js
    )
}

/// Parse `window|||tab|||URL|||Title` lines; ids are `"window:tab"`.
fn parse_indexed_tab_lines(output: &str) -> Vec<Tab> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let parts: Vec<&str> = line.splitn(4, "|||").collect();
            if parts.len() < 3 {
                return None;
            }
            let w: usize = parts[0].trim().parse().ok()?;
            let t: usize = parts[1].trim().parse().ok()?;
            let url = parts[2].trim().to_string();
            let title = parts
                .get(3)
                .map(|title| title.trim().to_string())
                .filter(|title| !title.is_empty())
                .unwrap_or_else(|| url.clone());
            Some(Tab::new(format!("{}:{}", w, t), title, url))
        })
        .collect()
}

fn parse_tab_id(id: &str) -> Option<(usize, usize)> {
    let (w, t) = id.split_once(':')?;
    Some((w.parse().ok()?, t.parse().ok()?))
}

/// One Chrome tab seen through `execute javascript`
struct ChromeTabPage<'a> {
    adapter: &'a ChromeAppleScriptAdapter,
    tab: &'a Tab,
}

impl ChromeTabPage<'_> {
    async fn eval(&self, js: &str) -> Result<String, String> {
        self.adapter
            .run_js(self.tab, js)
            .await?
            .ok_or_else(|| "Script produced no result".to_string())
    }
}

#[async_trait]
impl PageHandle for ChromeTabPage<'_> {
    fn url(&self) -> &str {
        &self.tab.url
    }

    async fn document_html(&self) -> Result<String, String> {
        let html = self.eval(scripts::OUTER_HTML).await?;
        if html.len() > ChromeAppleScriptAdapter::MAX_HTML_SIZE {
            return Err(format!(
                "Page HTML too large ({:.1} MB) - this may not be a normal article page",
                html.len() as f64 / (1024.0 * 1024.0)
            ));
        }
        Ok(html)
    }

    async fn scroll_metrics(&self) -> Result<ScrollMetrics, String> {
        let (height, position) = scripts::parse_scroll_metrics(&self.eval(scripts::SCROLL_METRICS).await?)?;
        Ok(ScrollMetrics { height, position })
    }

    async fn scroll_by(&self, dy: i64) -> Result<(), String> {
        self.eval(&scripts::scroll_by(dy)).await.map(|_| ())
    }

    async fn scroll_to_top(&self) -> Result<(), String> {
        self.eval(scripts::SCROLL_TO_TOP).await.map(|_| ())
    }
}

impl BrowserAdapter for ChromeAppleScriptAdapter {
    fn name(&self) -> &str {
        "Chrome (macOS)"
    }

    fn is_available(&self) -> bool {
        // Check if Chrome is running via AppleScript
        let output = std::process::Command::new("osascript")
            .arg("-e")
            .arg(r#"tell application "System Events" to (name of processes) contains "Google Chrome""#)
            .output();

        match output {
            Ok(out) => String::from_utf8_lossy(&out.stdout).trim() == "true",
            Err(_) => false,
        }
    }

    async fn list_tabs(&self) -> Result<Vec<Tab>, String> {
        let stdout = Self::osascript(Self::LIST_TABS_SCRIPT).await?;
        Ok(parse_indexed_tab_lines(&stdout))
    }

    async fn active_tab(&self) -> Result<Tab, String> {
        let stdout = Self::osascript(Self::ACTIVE_TAB_SCRIPT).await?;
        parse_indexed_tab_lines(&stdout)
            .into_iter()
            .next()
            .ok_or_else(|| "No active tab found".to_string())
    }

    async fn send_agent_message(&self, tab: &Tab, request: &AgentRequest) -> Result<AgentResponse, String> {
        let page = ChromeTabPage { adapter: self, tab };

        // The agent is reachable exactly when script execution works
        if *request == AgentRequest::Ping {
            let reply = page.eval(scripts::PING).await?;
            if reply.trim() != "pong" {
                return Err(format!("Unexpected ping reply: {}", reply.trim()));
            }
        }

        Ok(self.agent.handle(request, &page).await)
    }

    fn supports_scripting(&self) -> bool {
        true
    }

    async fn execute_script(&self, tab: &Tab, script: &str) -> Result<Option<String>, String> {
        self.run_js(tab, script).await
    }

    async fn execute_legacy_script(&self, tab: &Tab, script: &str) -> Result<Option<String>, String> {
        // AppleScript has a single injection path
        self.run_js(tab, script).await
    }
}
