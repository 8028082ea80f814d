//! Tolerant `<item>` extraction from raw feed XML.
//!
//! This is a textual scan, not an XML parse. Feeds in the wild are often
//! malformed, use undeclared namespaces, or mix HTML into XML; a conforming
//! parser rejects those outright while a tag-bounded scan still recovers the
//! handful of fields we need. The accepted cost is that nested elements with
//! the same name as their parent (`<item>` inside `<item>`) are not supported.

use regex::Regex;
use std::sync::LazyLock;

/// Tags tried in order for the full article body; first non-blank wins.
const CONTENT_TAGS: [&str; 3] = ["content:encoded", "content", "body"];

static ITEM_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<item(?:\s[^>]*)?>(.*?)</item\s*>").expect("item pattern is valid")
});

static CDATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("CDATA pattern is valid")
});

static FIELDS: LazyLock<FieldPatterns> = LazyLock::new(FieldPatterns::compile);

struct FieldPatterns {
    title: Regex,
    link: Regex,
    pub_date: Regex,
    content: Vec<Regex>,
    description: Regex,
}

impl FieldPatterns {
    fn compile() -> Self {
        let compile = |tag: &str| tag_pattern(tag).expect("escaped tag pattern is valid");
        Self {
            title: compile("title"),
            link: compile("link"),
            pub_date: compile("pubDate"),
            content: CONTENT_TAGS.into_iter().map(&compile).collect(),
            description: compile("description"),
        }
    }
}

/// Raw, un-sanitized text of the fields of one `<item>` block.
///
/// Missing tags are represented by an empty string, never by `None`: callers
/// treat `""` as "absent".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItemFields {
    pub title: String,
    pub link: String,
    pub pub_date: String,
    /// First non-blank of `content:encoded`, `content`, `body`
    pub content: String,
    pub description: String,
}

impl RawItemFields {
    /// Extracts the known fields from the inner text of an `<item>` block.
    pub fn from_block(block: &str) -> Self {
        let fields = &*FIELDS;

        let content = fields
            .content
            .iter()
            .map(|pattern| field_text(pattern, block))
            .find(|text| !text.trim().is_empty())
            .unwrap_or_default();

        Self {
            title: field_text(&fields.title, block),
            link: field_text(&fields.link, block),
            pub_date: field_text(&fields.pub_date, block),
            content,
            description: field_text(&fields.description, block),
        }
    }
}

/// Finds every `<item>...</item>` block in document order and extracts its
/// raw fields.
///
/// Matching is case-insensitive and non-overlapping. A document without items
/// yields an empty `Vec`.
///
/// # Examples
///
/// ```
/// use miolib_rss::feed::extract_items;
///
/// let xml = "<rss><channel><item><title>One</title></item>\
///            <item><title>Two</title></item></channel></rss>";
/// let items = extract_items(xml);
/// assert_eq!(items.len(), 2);
/// assert_eq!(items[1].title, "Two");
/// ```
pub fn extract_items(xml: &str) -> Vec<RawItemFields> {
    let items: Vec<RawItemFields> = ITEM_BLOCK
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|block| RawItemFields::from_block(block.as_str()))
        .collect();

    tracing::debug!(items = items.len(), "Extracted feed items");
    items
}

/// Returns the raw inner text of the first `<tag>...</tag>` in `source`,
/// unwrapped from CDATA when present, or `""` when the tag is absent.
///
/// `tag` is matched literally (namespaced tags such as `media:title` work)
/// and case-insensitively. The opening tag may carry attributes.
///
/// # Examples
///
/// ```
/// use miolib_rss::feed::extract_tag_text;
///
/// let block = r#"<guid isPermaLink="false">abc-1</guid>"#;
/// assert_eq!(extract_tag_text("guid", block), "abc-1");
/// assert_eq!(extract_tag_text("author", block), "");
/// ```
pub fn extract_tag_text(tag: &str, source: &str) -> String {
    match tag_pattern(tag) {
        Ok(pattern) => field_text(&pattern, source),
        Err(e) => {
            tracing::debug!(tag = %tag, error = %e, "Could not build tag pattern");
            String::new()
        }
    }
}

fn tag_pattern(tag: &str) -> Result<Regex, regex::Error> {
    let tag = regex::escape(tag);
    Regex::new(&format!(r"(?is)<{tag}(?:\s[^>]*)?>(.*?)</{tag}\s*>"))
}

fn field_text(pattern: &Regex, source: &str) -> String {
    pattern
        .captures(source)
        .and_then(|caps| caps.get(1))
        .map(|raw| unwrap_cdata(raw.as_str()).to_owned())
        .unwrap_or_default()
}

/// Returns the payload of the first CDATA section in `raw`, or `raw` itself.
fn unwrap_cdata(raw: &str) -> &str {
    CDATA
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map_or(raw, |payload| payload.as_str())
}
