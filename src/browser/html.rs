// Lightweight HTML querying over page snapshots.
//
// Not a full parser: tags are tokenized with regexes and element extents are
// recovered by counting same-name open/close tags, which is enough for
// selecting, removing and reading the text of page regions.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static COMMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

static TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9-]*)((?:[^>\x22']|\x22[^\x22]*\x22|'[^']*')*)>").unwrap());

static ATTR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).unwrap()
});

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static ENTITY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap());

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is raw text, never markup
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Elements commonly left unclosed; a sibling of the same name closes them
const IMPLICIT_CLOSE_ELEMENTS: &[&str] = &["p", "li"];

/// A simple CSS selector: tag, `.class`, `#id` or `[role="..."]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Tag(String),
    Class(String),
    Id(String),
    Role(String),
}

impl Selector {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Some(class) = raw.strip_prefix('.') {
            return Some(Selector::Class(class.to_string()));
        }
        if let Some(id) = raw.strip_prefix('#') {
            return Some(Selector::Id(id.to_string()));
        }
        if let Some(inner) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            let (name, value) = inner.split_once('=')?;
            if name.trim() != "role" {
                return None;
            }
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            return Some(Selector::Role(value.to_string()));
        }
        if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Some(Selector::Tag(raw.to_ascii_lowercase()));
        }
        None
    }

    /// Parse a comma separated selector group, skipping unsupported entries
    pub fn parse_group(raw: &str) -> Vec<Self> {
        raw.split(',').filter_map(Selector::parse).collect()
    }

    fn matches(&self, tag: &str, attrs: &str) -> bool {
        match self {
            Selector::Tag(name) => tag == name,
            Selector::Class(class) => attribute(attrs, "class")
                .map(|value| value.split_whitespace().any(|c| c == class))
                .unwrap_or(false),
            Selector::Id(id) => attribute(attrs, "id").as_deref() == Some(id.as_str()),
            Selector::Role(role) => attribute(attrs, "role").as_deref() == Some(role.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    name: String,
    attrs_range: (usize, usize),
    start: usize,
    end: usize,
    closing: bool,
    self_closing: bool,
}

/// A tokenized HTML string
#[derive(Debug, Clone)]
pub struct Document {
    html: String,
    tokens: Vec<Token>,
}

/// An element of a [`Document`], by byte offsets into its source
#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    doc: &'a Document,
    token: usize,
    content_start: usize,
    content_end: usize,
    end: usize,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        let html = COMMENT_REGEX.replace_all(html, "").into_owned();
        let tokens = tokenize(&html);
        Self { html, tokens }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// Elements matching the selector, in document order
    pub fn select(&self, selector: &Selector) -> Vec<Element<'_>> {
        self.select_any(std::slice::from_ref(selector))
    }

    /// Elements matching any of the selectors, in document order, each once
    pub fn select_any(&self, selectors: &[Selector]) -> Vec<Element<'_>> {
        self.tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| !token.closing)
            .filter(|(_, token)| {
                let attrs = self.attrs_of(token);
                selectors.iter().any(|s| s.matches(&token.name, attrs))
            })
            .map(|(i, _)| self.element_at(i))
            .collect()
    }

    pub fn select_first(&self, selector: &Selector) -> Option<Element<'_>> {
        self.select(selector).into_iter().next()
    }

    /// Copy of the document with every element matching any selector cut out
    pub fn without(&self, selectors: &[Selector]) -> Document {
        let mut spans: Vec<(usize, usize)> = self
            .select_any(selectors)
            .iter()
            .map(|el| (el.start(), el.end))
            .collect();
        spans.sort_unstable();

        let mut output = String::with_capacity(self.html.len());
        let mut cursor = 0;
        for (start, end) in spans {
            // Nested inside an element that is already removed
            if start < cursor {
                continue;
            }
            output.push_str(&self.html[cursor..start]);
            cursor = end;
        }
        output.push_str(&self.html[cursor..]);

        Document::parse(&output)
    }

    /// Inner HTML of `<body>`, or the whole document when there is none
    pub fn body(&self) -> Document {
        match self.select_first(&Selector::Tag("body".to_string())) {
            Some(body) => Document::parse(body.inner_html()),
            None => self.clone(),
        }
    }

    /// Text of the whole document with tags stripped and entities decoded
    pub fn text_content(&self) -> String {
        text_of(&self.html)
    }

    fn attrs_of(&self, token: &Token) -> &str {
        &self.html[token.attrs_range.0..token.attrs_range.1]
    }

    fn element_at(&self, index: usize) -> Element<'_> {
        let token = &self.tokens[index];
        let (content_end, end) = if token.self_closing || VOID_ELEMENTS.contains(&token.name.as_str()) {
            (token.end, token.end)
        } else {
            self.find_close(index)
        };
        Element {
            doc: self,
            token: index,
            content_start: token.end,
            content_end,
            end,
        }
    }

    /// Returns (content end, element end) for the open token at `index`
    fn find_close(&self, index: usize) -> (usize, usize) {
        let open = &self.tokens[index];
        let implicit = IMPLICIT_CLOSE_ELEMENTS.contains(&open.name.as_str());
        let mut depth = 1usize;

        for token in &self.tokens[index + 1..] {
            if token.name != open.name {
                continue;
            }
            if token.closing {
                depth -= 1;
                if depth == 0 {
                    return (token.start, token.end);
                }
            } else if implicit && depth == 1 {
                return (token.start, token.start);
            } else if !token.self_closing {
                depth += 1;
            }
        }

        (self.html.len(), self.html.len())
    }
}

impl<'a> Element<'a> {
    pub fn start(&self) -> usize {
        self.doc.tokens[self.token].start
    }

    pub fn inner_html(&self) -> &'a str {
        &self.doc.html[self.content_start..self.content_end]
    }

    pub fn text_content(&self) -> String {
        text_of(self.inner_html())
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        let token = &self.doc.tokens[self.token];
        attribute(self.doc.attrs_of(token), name).map(|v| decode_html_entities(&v))
    }

    /// The element's content as its own document, for nested selection
    pub fn document(&self) -> Document {
        Document::parse(self.inner_html())
    }
}

fn tokenize(html: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(caps) = TOKEN_REGEX.captures_at(html, pos) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let name = caps.get(2).map_or("", |m| m.as_str()).to_ascii_lowercase();
        let attrs = caps.get(3).map_or(whole.end..whole.end, |m| m.range());
        let self_closing = html[attrs.clone()].trim_end().ends_with('/');

        pos = whole.end;
        let raw_text = !closing && RAW_TEXT_ELEMENTS.contains(&name.as_str());

        tokens.push(Token {
            name: name.clone(),
            attrs_range: (attrs.start, attrs.end),
            start: whole.start,
            end: whole.end,
            closing,
            self_closing,
        });

        // Raw text content is skipped up to the matching close tag
        if raw_text && !self_closing {
            let close = format!("</{}", name);
            match find_ascii_case_insensitive(&html[pos..], &close) {
                Some(offset) => pos += offset,
                None => break,
            }
        }
    }

    tokens
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

fn attribute(attrs: &str, name: &str) -> Option<String> {
    ATTR_REGEX
        .captures_iter(attrs)
        .find(|cap| cap.get(1).is_some_and(|m| m.as_str().eq_ignore_ascii_case(name)))
        .map(|cap| {
            cap.get(2)
                .or_else(|| cap.get(3))
                .or_else(|| cap.get(4))
                .map_or(String::new(), |m| m.as_str().to_string())
        })
}

fn text_of(html: &str) -> String {
    // Raw text blocks never contribute visible text here
    let doc = Document::parse(html);
    let stripped_source = doc.without(&[
        Selector::Tag("script".to_string()),
        Selector::Tag("style".to_string()),
    ]);
    let stripped = TAG_REGEX.replace_all(stripped_source.html(), "");
    decode_html_entities(&stripped)
}

/// Collapse runs of whitespace into single spaces and trim
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_REGEX.replace_all(s, " ").trim().to_string()
}

/// Decode named and numeric HTML entities
pub fn decode_html_entities(s: &str) -> String {
    ENTITY_REGEX
        .replace_all(s, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    "ndash" => Some('–'),
                    "mdash" => Some('—'),
                    "hellip" => Some('…'),
                    "rsquo" => Some('’'),
                    "lsquo" => Some('‘'),
                    "rdquo" => Some('”'),
                    "ldquo" => Some('“'),
                    _ => None,
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), |c| c.to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> Selector {
        Selector::Tag(name.to_string())
    }

    #[test]
    fn test_parse_selectors() {
        assert_eq!(Selector::parse("nav"), Some(tag("nav")));
        assert_eq!(Selector::parse(".cookie-banner"), Some(Selector::Class("cookie-banner".into())));
        assert_eq!(Selector::parse("#main-content"), Some(Selector::Id("main-content".into())));
        assert_eq!(Selector::parse(r#"[role="main"]"#), Some(Selector::Role("main".into())));
        assert_eq!(Selector::parse("div > p"), None);
        assert_eq!(Selector::parse_group("script, style, .ad").len(), 3);
    }

    #[test]
    fn test_select_nested_same_tag() {
        let doc = Document::parse("<div id=\"outer\"><div>inner</div>tail</div><p>after</p>");
        let outer = doc.select_first(&Selector::Id("outer".into())).unwrap();
        assert_eq!(outer.inner_html(), "<div>inner</div>tail");
        assert_eq!(doc.select(&tag("div")).len(), 2);
    }

    #[test]
    fn test_select_by_class_token() {
        let doc = Document::parse(r#"<div class="wrap ad big">x</div><div class="adverb">y</div>"#);
        let ads = doc.select(&Selector::Class("ad".into()));
        assert_eq!(ads.len(), 1);
        assert_eq!(ads[0].text_content(), "x");
    }

    #[test]
    fn test_without_removes_nested_and_siblings() {
        let doc = Document::parse(
            "<nav><ul><li>Home</li></ul></nav><main>Keep<aside>drop</aside></main><footer>f</footer>",
        );
        let cleaned = doc.without(&[tag("nav"), tag("aside"), tag("footer"), tag("li")]);
        assert_eq!(cleaned.html(), "<main>Keep</main>");
    }

    #[test]
    fn test_script_content_is_not_markup() {
        let doc = Document::parse(
            "<script>var s = '<div class=\"ad\">fake</div>';</script><div class=\"ad\">real</div>",
        );
        let ads = doc.select(&Selector::Class("ad".into()));
        assert_eq!(ads.len(), 1);
        assert_eq!(ads[0].text_content(), "real");
        assert_eq!(doc.text_content(), "real");
    }

    #[test]
    fn test_unclosed_paragraphs_close_at_sibling() {
        let doc = Document::parse("<p>first<p>second</p>");
        let paragraphs: Vec<String> = doc.select(&tag("p")).iter().map(|p| p.text_content()).collect();
        assert_eq!(paragraphs, vec!["first", "second"]);
    }

    #[test]
    fn test_void_and_self_closing_elements() {
        let doc = Document::parse(r#"<meta name="description" content="Hi &amp; bye"><br/><p>x</p>"#);
        let meta = doc.select_first(&tag("meta")).unwrap();
        assert_eq!(meta.attr("content").as_deref(), Some("Hi & bye"));
        assert_eq!(meta.inner_html(), "");
        assert_eq!(doc.select_first(&tag("p")).unwrap().text_content(), "x");
    }

    #[test]
    fn test_attribute_quoting_styles() {
        let doc = Document::parse("<a href='/watch?v=1' id=title data-x=\"a>b\">t</a>");
        let a = doc.select_first(&tag("a")).unwrap();
        assert_eq!(a.attr("href").as_deref(), Some("/watch?v=1"));
        assert_eq!(a.attr("id").as_deref(), Some("title"));
        assert_eq!(a.text_content(), "t");
    }

    #[test]
    fn test_comments_are_ignored() {
        let doc = Document::parse("<!-- <main>hidden</main> --><main>shown</main>");
        assert_eq!(doc.select(&tag("main")).len(), 1);
        assert_eq!(doc.text_content(), "shown");
    }

    #[test]
    fn test_body_falls_back_to_document() {
        let with_body = Document::parse("<html><head><title>T</title></head><body><p>b</p></body></html>");
        assert_eq!(with_body.body().html(), "<p>b</p>");
        let fragment = Document::parse("<p>b</p>");
        assert_eq!(fragment.body().html(), "<p>b</p>");
    }

    #[test]
    fn test_decode_html_entities() {
        assert_eq!(decode_html_entities("Hello &amp; World"), "Hello & World");
        assert_eq!(decode_html_entities("&lt;tag&gt;"), "<tag>");
        assert_eq!(decode_html_entities("It&#39;s fine"), "It's fine");
        assert_eq!(decode_html_entities("It&#x27;s"), "It's");
        assert_eq!(decode_html_entities("&amp;lt;"), "&lt;");
        assert_eq!(decode_html_entities("&bogus; stays"), "&bogus; stays");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b   c "), "a b c");
    }
}
