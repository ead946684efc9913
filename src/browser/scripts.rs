// JavaScript expressions evaluated inside a tab. Each one evaluates to a string.

/// One-shot readable-text extraction, mirroring `cleaning::extract_readable_text`.
pub const READABLE_TEXT: &str = r#"(function () {
  try {
    var body = document.body.cloneNode(true);
    body.querySelectorAll('script, style, noscript, iframe, nav, header, footer, aside, [role="banner"], [role="navigation"], [role="complementary"], .nav, .navigation, .header, .footer, .sidebar, .ad, .advertisement, .cookie-banner, .popup, .modal, .social-links, .related-posts')
      .forEach(function (el) { if (el.parentNode) { el.parentNode.removeChild(el); } });
    var selectors = ['main', 'article', '[role="main"]', '.content', '#content', '.main-content', '#main-content', '.post-content', '.article-content', '.entry-content'];
    var container = null;
    for (var i = 0; i < selectors.length; i++) {
      var el = body.querySelector(selectors[i]);
      if (el && el.textContent.trim().length > 100) { container = el; break; }
    }
    container = container || body;
    var text = '';
    container.querySelectorAll('p, h1, h2, h3, h4, h5, h6, li').forEach(function (p) {
      var t = p.textContent.trim();
      if (t.length > 20) { text += t + ' '; }
    });
    if (text.length < 100) { text = container.textContent; }
    text = text.replace(/\s+/g, ' ').trim();
    if (text.length > 3000) {
      var cut = text.slice(0, 3000);
      var last = cut.lastIndexOf('.');
      text = last > 2000 ? cut.slice(0, last + 1) : cut;
    }
    return text || 'No content found on page';
  } catch (e) {
    return 'Error extracting content via scripting: ' + e.message;
  }
})()"#;

/// Title, meta description and the first five substantial paragraphs.
pub const LEGACY_SUMMARY: &str = r#"(function () {
  try {
    var title = document.title || '';
    var meta = document.querySelector('meta[name="description"]') || document.querySelector('meta[property="og:description"]');
    var desc = meta ? (meta.content || '') : '';
    var paragraphs = Array.prototype.slice.call(document.querySelectorAll('p'))
      .map(function (p) { return p.textContent.trim(); })
      .filter(function (t) { return t.length > 50; })
      .slice(0, 5)
      .join(' ');
    return title + '\n\n' + (desc ? desc + '\n\n' : '') + paragraphs;
  } catch (e) {
    return 'Error extracting content: ' + e.message;
  }
})()"#;

pub const OUTER_HTML: &str = "document.documentElement.outerHTML";

/// Document height and bottom edge of the viewport, as `height|position`.
pub const SCROLL_METRICS: &str =
    "document.documentElement.scrollHeight + '|' + (window.scrollY + window.innerHeight)";

pub const SCROLL_TO_TOP: &str = "window.scrollTo(0, 0); 'ok'";

pub const PING: &str = "'pong'";

pub fn scroll_by(dy: i64) -> String {
    format!("window.scrollBy(0, {}); 'ok'", dy)
}

/// Parse the `height|position` pair produced by [`SCROLL_METRICS`].
pub fn parse_scroll_metrics(raw: &str) -> Result<(f64, f64), String> {
    let (height, position) = raw
        .trim()
        .split_once('|')
        .ok_or_else(|| format!("Unexpected scroll metrics: {}", raw.trim()))?;
    let height = height
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("Invalid scroll height '{}': {}", height, e))?;
    let position = position
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("Invalid scroll position '{}': {}", position, e))?;
    Ok((height, position))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scroll_metrics() {
        assert_eq!(parse_scroll_metrics("4200|1080.5\n").unwrap(), (4200.0, 1080.5));
        assert!(parse_scroll_metrics("4200").is_err());
        assert!(parse_scroll_metrics("tall|1").is_err());
    }

    #[test]
    fn test_scroll_by() {
        assert_eq!(scroll_by(800), "window.scrollBy(0, 800); 'ok'");
    }
}
