//! Property tests for sanitizing, excerpts and body selection.

use miolib_rss::feed::{select_body, ArticleRecord, PipelineOptions, RawItemFields};
use miolib_rss::util::{excerpt, sanitize};
use proptest::prelude::*;

/// Characters that survive sanitizing literally. No `;` (so no entity can
/// form by accident), no `<` (so no tag can form), no whitespace (trimmed).
const LITERAL_ALPHABET: &[char] = &[
    'a', 'b', 'q', 't', 'l', 'g', 'm', 'p', 'x', 'Z', '0', '7', '&', '"', '\'', '>', 'é', '字',
];

fn named_entity(c: char) -> Option<&'static str> {
    match c {
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&apos;"),
        _ => None,
    }
}

/// Encodes one character as a literal, named, decimal or hex reference.
/// `&` is always escaped.
fn encode_char(c: char, mode: u8) -> String {
    match mode {
        0 if c != '&' => c.to_string(),
        1 => format!("&#{};", c as u32),
        2 => format!("&#x{:X};", c as u32),
        _ => named_entity(c)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("&#{};", c as u32)),
    }
}

fn literal_text() -> impl Strategy<Value = Vec<(char, u8)>> {
    prop::collection::vec((prop::sample::select(LITERAL_ALPHABET), 0u8..4), 0..40)
}

/// Markup and entity tokens found in typical feed HTML, escaped at most once.
const HTML_TOKENS: &[&str] = &[
    " ",
    "\n",
    "&amp;",
    "&quot;",
    "&apos;",
    "&#65;",
    "&#x42;",
    "<b>",
    "</b>",
    "<p>",
    "</p>",
    "<br/>",
    "</div>",
    "</li>",
    r#"<a href="http://x/?a=1&amp;b=2">"#,
];

fn html_fragment() -> impl Strategy<Value = String> {
    let token = prop_oneof![
        "[a-z]{1,8}",
        prop::sample::select(HTML_TOKENS).prop_map(str::to_owned),
    ];
    prop::collection::vec(token, 0..30).prop_map(|tokens| tokens.concat())
}

proptest! {
    #[test]
    fn prop_entity_round_trip(chars in literal_text()) {
        let literal: String = chars.iter().map(|(c, _)| *c).collect();
        let encoded: String = chars.iter().map(|(c, mode)| encode_char(*c, *mode)).collect();
        prop_assert_eq!(sanitize(&encoded), literal);
    }

    #[test]
    fn prop_sanitize_idempotent(html in html_fragment()) {
        let once = sanitize(&html);
        prop_assert_eq!(sanitize(&once), once.clone());
        prop_assert!(!once.contains('<'));
        prop_assert!(!once.contains("\n\n\n"));
    }

    #[test]
    fn prop_excerpt_bounded_and_single_line(chars in prop::collection::vec(any::<char>(), 0..400)) {
        let description: String = chars.into_iter().collect();
        let record = ArticleRecord::from_raw(
            &RawItemFields { description: description.clone(), ..Default::default() },
            &PipelineOptions::default(),
        );
        prop_assert!(record.excerpt().chars().count() <= 103);
        prop_assert!(!record.excerpt().contains('\n'));

        let direct = excerpt(&description, 100);
        prop_assert!(direct.chars().count() <= 103);
        prop_assert!(!direct.contains('\n'));
    }

    #[test]
    fn prop_body_selection(content_len in 0usize..300, description_len in 0usize..300) {
        let content = "c".repeat(content_len);
        let description = "d".repeat(description_len);

        let record = ArticleRecord::from_raw(
            &RawItemFields {
                content: content.clone(),
                description: description.clone(),
                ..Default::default()
            },
            &PipelineOptions::default(),
        );

        let expected = if content_len > description_len + 50 { &content } else { &description };
        prop_assert_eq!(record.body(), expected.as_str());
        prop_assert_eq!(
            select_body(content.clone(), description.clone(), 50),
            expected.clone()
        );
    }

    #[test]
    fn prop_missing_title_is_empty(link in "[a-z]{0,12}") {
        let xml = format!("<rss><channel><item><link>{link}</link></item></channel></rss>");
        let records = miolib_rss::feed::parse_feed(&xml, &PipelineOptions::default());
        prop_assert_eq!(records.len(), 1);
        prop_assert_eq!(records[0].title(), "");
        prop_assert_eq!(records[0].link(), link.as_str());
    }
}
