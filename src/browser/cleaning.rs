// Content cleaning rules shared by the in-page agent, scripted extraction and proxy fetches

use super::html::{collapse_whitespace, Document, Selector};
use serde::{Deserialize, Serialize};

/// Upper bound on text produced from a live DOM
pub const MAX_CONTENT_CHARS: usize = 3000;

/// A sentence boundary past this index is preferred over a hard cut
pub const SENTENCE_BOUNDARY_MIN: usize = 2000;

/// Upper bound on text produced from a proxied fetch
pub const MAX_PROXY_CONTENT_CHARS: usize = 1500;

pub const NO_CONTENT_FOUND: &str = "No content found on page";

const NON_CONTENT_SELECTORS: &str = r#"script, style, noscript, iframe, nav, header, footer, aside, [role="banner"], [role="navigation"], [role="complementary"], .nav, .navigation, .header, .footer, .sidebar, .ad, .advertisement, .cookie-banner, .popup, .modal, .social-links, .related-posts"#;

const MAIN_CONTENT_SELECTORS: &str = r#"main, article, [role="main"], .content, #content, .main-content, #main-content, .post-content, .article-content, .entry-content"#;

const TEXT_BLOCK_SELECTORS: &str = "p, h1, h2, h3, h4, h5, h6, li";

const PROXY_NON_CONTENT_SELECTORS: &str = "script, style, nav, header, footer, aside";

const PROXY_MAIN_SELECTORS: &str = "main, article, .content, #content, .post, #main";

/// Page metadata answered to `getMetadata`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageMetadata {
    pub description: String,
    pub keywords: String,
    pub heading: String,
    pub preview: String,
}

/// Readable text of a page: main container paragraphs, cleaned and bounded.
pub fn extract_readable_text(html: &str) -> String {
    let body = Document::parse(html)
        .body()
        .without(&Selector::parse_group(NON_CONTENT_SELECTORS));

    // Only the first match of each selector is considered
    let container = Selector::parse_group(MAIN_CONTENT_SELECTORS)
        .iter()
        .filter_map(|selector| body.select_first(selector))
        .find(|el| el.text_content().trim().chars().count() > 100)
        .map(|el| el.document())
        .unwrap_or(body);

    let mut text = String::new();
    for block in container.select_any(&Selector::parse_group(TEXT_BLOCK_SELECTORS)) {
        let block_text = block.text_content();
        let block_text = block_text.trim();
        if block_text.chars().count() > 20 {
            text.push_str(block_text);
            text.push(' ');
        }
    }

    if text.chars().count() < 100 {
        text = container.text_content();
    }

    let text = truncate_at_sentence(
        &collapse_whitespace(&text),
        MAX_CONTENT_CHARS,
        SENTENCE_BOUNDARY_MIN,
    );

    if text.is_empty() {
        NO_CONTENT_FOUND.to_string()
    } else {
        text
    }
}

/// Text of a page fetched through a relay: coarser cleaning, shorter bound.
pub fn extract_proxy_text(html: &str) -> String {
    let doc = Document::parse(html).without(&Selector::parse_group(PROXY_NON_CONTENT_SELECTORS));

    // First element in document order matching any of the group
    let text = match doc
        .select_any(&Selector::parse_group(PROXY_MAIN_SELECTORS))
        .first()
    {
        Some(main) => main.text_content(),
        None => doc.body().text_content(),
    };

    truncate_chars(&collapse_whitespace(&text), MAX_PROXY_CONTENT_CHARS)
}

/// Description, keywords, first heading and first paragraph preview.
pub fn extract_metadata(html: &str) -> PageMetadata {
    let doc = Document::parse(html);
    let metas = doc.select(&Selector::Tag("meta".to_string()));

    let meta_content = |attr: &str, value: &str| -> Option<String> {
        metas
            .iter()
            .find(|m| m.attr(attr).as_deref() == Some(value))
            .and_then(|m| m.attr("content"))
            .filter(|content| !content.is_empty())
    };

    let description = meta_content("name", "description")
        .or_else(|| meta_content("property", "og:description"))
        .unwrap_or_default();
    let keywords = meta_content("name", "keywords").unwrap_or_default();

    let heading = doc
        .select_first(&Selector::Tag("h1".to_string()))
        .map(|h| h.text_content().trim().to_string())
        .unwrap_or_default();

    let preview = doc
        .select_first(&Selector::Tag("p".to_string()))
        .map(|p| {
            let text = p.text_content().trim().to_string();
            if text.chars().count() > 300 {
                format!("{}...", truncate_chars(&text, 300))
            } else {
                text
            }
        })
        .unwrap_or_default();

    PageMetadata {
        description,
        keywords,
        heading,
        preview,
    }
}

/// Cut `text` to `max_chars`, stopping after the last `.` if it lies past `min_boundary`.
pub fn truncate_at_sentence(text: &str, max_chars: usize, min_boundary: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let truncated = truncate_chars(text, max_chars);
    match truncated.char_indices().filter(|(_, c)| *c == '.').last() {
        Some((byte_idx, _)) if truncated[..byte_idx].chars().count() > min_boundary => {
            truncated[..=byte_idx].to_string()
        }
        _ => truncated,
    }
}

/// First `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn paragraph(words: usize) -> String {
        format!("<p>{}</p>", vec!["word"; words].join(" "))
    }

    #[test]
    fn test_prefers_main_container() {
        let html = format!(
            "<html><body><div class=\"sidebar\">{}</div><nav>{}</nav><article>{}{}</article></body></html>",
            paragraph(40),
            paragraph(40),
            "<h2>An article heading that is long enough</h2>",
            "<p>The article paragraph carries the actual content of the page and is long enough to count as the main container body text.</p>",
        );
        let text = extract_readable_text(&html);

        assert!(text.starts_with("An article heading"));
        assert!(text.contains("actual content"));
        assert!(!text.contains("word word"));
    }

    #[test]
    fn test_removes_banners_and_modals() {
        let html = "<body><div class=\"cookie-banner\"><p>We use cookies to improve your experience here</p></div>\
                    <div role=\"navigation\"><li>Menu item that is very long indeed</li></div>\
                    <p>Real paragraph number one with enough characters to count.</p>\
                    <p>Real paragraph number two with enough characters to count.</p></body>";
        let text = extract_readable_text(html);

        assert!(!text.contains("cookies"));
        assert!(!text.contains("Menu item"));
        assert!(text.contains("number one"));
    }

    #[test]
    fn test_skips_short_blocks() {
        let html = "<body><p>Short</p><p>This is a longer paragraph that should be extracted because it has enough meaningful content to pass.</p></body>";
        let text = extract_readable_text(html);
        assert!(!text.contains("Short"));
        assert!(text.contains("longer paragraph"));
    }

    #[test]
    fn test_falls_back_to_full_text() {
        let html = "<body><div>Loose   text\n outside of any paragraph</div></body>";
        assert_eq!(extract_readable_text(html), "Loose text outside of any paragraph");
    }

    #[test]
    fn test_empty_page() {
        assert_eq!(extract_readable_text("<body><script>x()</script></body>"), NO_CONTENT_FOUND);
    }

    #[test]
    fn test_short_first_main_is_skipped() {
        let long = "Long article body text that certainly exceeds one hundred characters once it is all put together here.";
        let html = format!("<body><main>tiny</main><article><p>{}</p></article></body>", long);
        assert_eq!(extract_readable_text(&html), long);
    }

    #[test]
    fn test_truncate_prefers_late_sentence_boundary() {
        let text = format!("{}. {}", "a".repeat(2500), "b".repeat(1000));
        let truncated = truncate_at_sentence(&text, 3000, 2000);
        assert_eq!(truncated.chars().count(), 2501);
        assert!(truncated.ends_with('.'));
    }

    #[test]
    fn test_truncate_ignores_early_sentence_boundary() {
        let text = format!("{}. {}", "a".repeat(1000), "b".repeat(3000));
        let truncated = truncate_at_sentence(&text, 3000, 2000);
        assert_eq!(truncated.chars().count(), 3000);
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("ok", 10), "ok");
    }

    #[test]
    fn test_proxy_text() {
        let html = "<html><head><style>p{}</style></head><body><header>Site</header>\
                    <div id=\"main\">Main &amp; only</div><footer>c</footer></body></html>";
        assert_eq!(extract_proxy_text(html), "Main & only");
    }

    #[test]
    fn test_proxy_text_is_bounded() {
        let html = format!("<body><p>{}</p></body>", "x".repeat(5000));
        assert_eq!(extract_proxy_text(&html).chars().count(), MAX_PROXY_CONTENT_CHARS);
    }

    #[test]
    fn test_extract_metadata() {
        let html = format!(
            r#"<head><meta property="og:description" content="OG desc"><meta name="keywords" content="rust, tabs"></head>
               <body><h1> Title </h1><p>{}</p></body>"#,
            "p".repeat(400)
        );
        let meta = extract_metadata(&html);

        assert_eq!(meta.description, "OG desc");
        assert_eq!(meta.keywords, "rust, tabs");
        assert_eq!(meta.heading, "Title");
        assert_eq!(meta.preview.chars().count(), 303);
        assert!(meta.preview.ends_with("..."));
    }

    #[test]
    fn test_extract_metadata_missing() {
        assert_eq!(extract_metadata("<p></p>"), PageMetadata::default());
    }

    proptest! {
        #[test]
        fn prop_readable_text_is_bounded(
            paragraphs in proptest::collection::vec("[a-zA-Z .]{0,400}", 0..30)
        ) {
            let html = paragraphs
                .iter()
                .map(|p| format!("<p>{}</p>", p))
                .collect::<String>();
            let text = extract_readable_text(&format!("<body>{}</body>", html));
            prop_assert!(text.chars().count() <= MAX_CONTENT_CHARS);
        }

        #[test]
        fn prop_truncation_keeps_prefix(text in "[a-z. ]{0,5000}") {
            let truncated = truncate_at_sentence(&text, MAX_CONTENT_CHARS, SENTENCE_BOUNDARY_MIN);
            prop_assert!(truncated.chars().count() <= MAX_CONTENT_CHARS);
            prop_assert!(text.starts_with(&truncated));
        }
    }
}
