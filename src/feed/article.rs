use serde::Serialize;

use crate::feed::extractor::RawItemFields;
use crate::util::{char_len, excerpt, sanitize_with, DEFAULT_NOISE_PHRASES};

/// Default excerpt length in characters (ellipsis not included)
pub const DEFAULT_EXCERPT_CHARS: usize = 100;
/// Default margin by which content must outgrow the description to be chosen as body
pub const DEFAULT_BODY_THRESHOLD: usize = 50;

/// Tunables for turning raw item fields into [`ArticleRecord`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Characters kept in the excerpt before the ellipsis marker.
    pub excerpt_chars: usize,
    /// Content is used as body only if it is longer than the description
    /// by more than this many characters.
    pub body_threshold: usize,
    /// Boilerplate phrases removed during sanitizing.
    pub noise_phrases: Vec<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
            body_threshold: DEFAULT_BODY_THRESHOLD,
            noise_phrases: DEFAULT_NOISE_PHRASES
                .iter()
                .map(|phrase| phrase.to_string())
                .collect(),
        }
    }
}

impl PipelineOptions {
    fn sanitize(&self, raw: &str) -> String {
        sanitize_with(raw, &self.noise_phrases)
    }
}

/// One article, ready for display.
///
/// Records are immutable: fields are only reachable through accessors and
/// every fetch builds a fresh list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleRecord {
    title: String,
    link: String,
    publication_date: String,
    excerpt: String,
    body: String,
}

impl ArticleRecord {
    /// Builds a record from raw item fields.
    ///
    /// Title, description and content are sanitized; link and date are only
    /// trimmed. The date is kept verbatim since feed date formats vary too
    /// much to parse reliably.
    pub fn from_raw(raw: &RawItemFields, options: &PipelineOptions) -> Self {
        let description = options.sanitize(&raw.description);
        let content = options.sanitize(&raw.content);

        Self {
            title: single_line(&options.sanitize(&raw.title)),
            link: raw.link.trim().to_owned(),
            publication_date: raw.pub_date.trim().to_owned(),
            excerpt: excerpt(&description, options.excerpt_chars),
            body: select_body(content, description, options.body_threshold),
        }
    }

    /// Builds a synthetic record explaining a failed fetch.
    ///
    /// `summary` and `body` are plain text. The summary is cut into an
    /// excerpt like any description; the body is kept as given.
    pub(crate) fn diagnostic(
        title: impl Into<String>,
        link: &str,
        summary: &str,
        body: impl Into<String>,
        options: &PipelineOptions,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.to_owned(),
            publication_date: String::new(),
            excerpt: excerpt(summary, options.excerpt_chars),
            body: body.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    /// Publication date exactly as the feed wrote it (trimmed).
    pub fn publication_date(&self) -> &str {
        &self.publication_date
    }

    pub fn excerpt(&self) -> &str {
        &self.excerpt
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Chooses the full-text body between sanitized content and description.
///
/// Content wins only when it is longer than the description by more than
/// `threshold` characters. Many feeds repeat the content in the description,
/// or ship a stub content element, so the description is the safer default.
///
/// # Examples
///
/// ```
/// use miolib_rss::feed::select_body;
///
/// let long = "x".repeat(80);
/// assert_eq!(select_body(long.clone(), "short".into(), 50), long);
/// assert_eq!(select_body("stub".into(), "short".into(), 50), "short");
/// ```
pub fn select_body(content: String, description: String, threshold: usize) -> String {
    if char_len(&content) > char_len(&description).saturating_add(threshold) {
        content
    } else {
        description
    }
}

fn single_line(text: &str) -> String {
    if !text.contains(['\n', '\r']) {
        return text.to_owned();
    }
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(title: &str, description: &str, content: &str) -> RawItemFields {
        RawItemFields {
            title: title.into(),
            link: " http://x/1 \n".into(),
            pub_date: "\n  Mon  ".into(),
            content: content.into(),
            description: description.into(),
        }
    }

    #[test]
    fn test_from_raw_well_formed() {
        let record = ArticleRecord::from_raw(
            &raw("Hello &amp; World", "A <b>bold</b> claim.", ""),
            &PipelineOptions::default(),
        );

        assert_eq!(record.title(), "Hello & World");
        assert_eq!(record.link(), "http://x/1");
        assert_eq!(record.publication_date(), "Mon");
        assert_eq!(record.body(), "A bold claim.");
        assert_eq!(record.excerpt(), "A bold claim....");
    }

    #[test]
    fn test_title_flattened_to_single_line() {
        let record = ArticleRecord::from_raw(
            &raw("First<br/>  Second\n\nThird", "", ""),
            &PipelineOptions::default(),
        );
        assert_eq!(record.title(), "First Second Third");
    }

    #[test]
    fn test_link_not_sanitized() {
        let fields = RawItemFields {
            link: "http://x/?a=1&amp;b=2".into(),
            ..Default::default()
        };
        let record = ArticleRecord::from_raw(&fields, &PipelineOptions::default());
        assert_eq!(record.link(), "http://x/?a=1&amp;b=2");
    }

    #[test]
    fn test_empty_item() {
        let record = ArticleRecord::from_raw(&RawItemFields::default(), &PipelineOptions::default());
        assert_eq!(record.title(), "");
        assert_eq!(record.link(), "");
        assert_eq!(record.body(), "");
        assert_eq!(record.excerpt(), "...");
    }

    #[test]
    fn test_body_prefers_long_content() {
        let content = format!("<p>{}</p>", "c".repeat(200));
        let record = ArticleRecord::from_raw(
            &raw("t", "short description", &content),
            &PipelineOptions::default(),
        );
        assert_eq!(record.body(), "c".repeat(200));
        assert_eq!(record.excerpt(), "short description...");
    }

    #[test]
    fn test_body_threshold_boundary() {
        let description = "d".repeat(10);
        let at_threshold = "c".repeat(60);
        let past_threshold = "c".repeat(61);

        assert_eq!(
            select_body(at_threshold, description.clone(), 50),
            description
        );
        assert_eq!(
            select_body(past_threshold.clone(), description, 50),
            past_threshold
        );
    }

    #[test]
    fn test_body_threshold_counts_chars_not_bytes() {
        // 30 CJK chars = 90 bytes, still shorter than description + 50 chars
        let content = "字".repeat(30);
        assert_eq!(select_body(content, "d".into(), 50), "d");
    }

    #[test]
    fn test_body_threshold_configurable() {
        let options = PipelineOptions {
            body_threshold: 0,
            ..Default::default()
        };
        let record = ArticleRecord::from_raw(&raw("t", "ab", "abc"), &options);
        assert_eq!(record.body(), "abc");
    }

    #[test]
    fn test_excerpt_length_configurable() {
        let options = PipelineOptions {
            excerpt_chars: 4,
            ..Default::default()
        };
        let record = ArticleRecord::from_raw(&raw("t", "<p>abcdefgh</p>", ""), &options);
        assert_eq!(record.excerpt(), "abcd...");
        assert_eq!(record.body(), "abcdefgh");
    }

    #[test]
    fn test_diagnostic_record() {
        let summary = "s".repeat(150);
        let record = ArticleRecord::diagnostic(
            "Failed",
            "http://x/feed",
            &summary,
            "line one\nline two",
            &PipelineOptions::default(),
        );
        assert_eq!(record.title(), "Failed");
        assert_eq!(record.link(), "http://x/feed");
        assert_eq!(record.publication_date(), "");
        assert_eq!(record.excerpt().chars().count(), 103);
        assert_eq!(record.body(), "line one\nline two");
    }

    #[test]
    fn test_serializes_with_all_fields() {
        let record = ArticleRecord::from_raw(&raw("T", "D", ""), &PipelineOptions::default());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["title"], "T");
        assert_eq!(json["publication_date"], "Mon");
        assert_eq!(json["body"], "D");
    }

    #[test]
    fn test_serialized_record_carries_sanitized_text() {
        let record = ArticleRecord::from_raw(
            &raw("<b>T</b>", "<p>D &amp; E</p>", ""),
            &PipelineOptions::default(),
        );
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains('<'));
        assert!(json.contains(r#""body":"D & E""#));
    }
}
