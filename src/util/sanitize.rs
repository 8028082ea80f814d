//! Markup-to-text sanitizer for feed fields.
//!
//! Feed titles, descriptions and content blocks arrive as HTML fragments,
//! frequently escaped once (or twice) on top of that. [`sanitize`] turns such a
//! fragment into readable plain text:
//!
//! 1. Decode entities (named, decimal `&#NN;`, hex `&#xHH;`)
//! 2. Rewrite `<br>`, `</p>`, `</div>`, `</li>` into line breaks
//! 3. Remove boilerplate phrases from the noise denylist
//! 4. Strip every remaining `<...>` tag
//! 5. Decode entities again (catches double-escaped content)
//! 6. Collapse runs of blank lines into a single blank line
//! 7. Trim
//!
//! Step order is load-bearing: decoding before tag rewriting lets escaped
//! markup (`&lt;p&gt;`) be recognized as markup.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Boilerplate phrases removed from every field by default ("view full text").
pub const DEFAULT_NOISE_PHRASES: &[&str] = &["查看全文"];

/// Named entities, replaced in this order, one non-rescanning pass each.
const NAMED_ENTITIES: [(&str, &str); 6] = [
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&amp;", "&"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&nbsp;", " "),
];

static DECIMAL_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#([0-9]+);").expect("decimal reference pattern is valid"));

static HEX_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#x([0-9a-fA-F]+);").expect("hex reference pattern is valid"));

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("line break pattern is valid"));

static PARAGRAPH_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</p>").expect("paragraph pattern is valid"));

static BLOCK_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</(?:div|li)>").expect("block pattern is valid"));

static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n+").expect("blank line pattern is valid"));

/// Decodes HTML/XML entity references.
///
/// Handles the six named entities in [`NAMED_ENTITIES`], then decimal and hex
/// numeric references. A numeric reference that does not name a Unicode scalar
/// value (surrogates, values past U+10FFFF, digit overflow) is left untouched.
///
/// # Examples
///
/// ```
/// use miolib_rss::util::unescape_entities;
///
/// assert_eq!(unescape_entities("Tom &amp; Jerry"), "Tom & Jerry");
/// assert_eq!(unescape_entities("&#65;&#x42;"), "AB");
/// assert_eq!(unescape_entities("&#xD800;"), "&#xD800;");
/// ```
pub fn unescape_entities(input: &str) -> String {
    let mut text = input.to_owned();
    for (entity, literal) in NAMED_ENTITIES {
        if text.contains(entity) {
            text = text.replace(entity, literal);
        }
    }

    let text = replace_numeric_refs(&DECIMAL_REF, &text, 10);
    replace_numeric_refs(&HEX_REF, &text, 16).into_owned()
}

fn replace_numeric_refs<'a>(pattern: &Regex, text: &'a str, radix: u32) -> Cow<'a, str> {
    pattern.replace_all(text, |caps: &regex::Captures<'_>| {
        u32::from_str_radix(&caps[1], radix)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_owned())
    })
}

/// Sanitizes a raw feed field with the default noise denylist.
///
/// See the module docs for the individual passes.
///
/// # Examples
///
/// ```
/// use miolib_rss::util::sanitize;
///
/// assert_eq!(sanitize("A <b>bold</b> claim."), "A bold claim.");
/// assert_eq!(sanitize("<p>Para one</p><p>Para two</p>"), "Para one\n\nPara two");
/// ```
pub fn sanitize(raw: &str) -> String {
    sanitize_with(raw, DEFAULT_NOISE_PHRASES)
}

/// Sanitizes a raw feed field, removing each phrase in `noise_phrases`.
///
/// Empty phrases are ignored.
pub fn sanitize_with<S: AsRef<str>>(raw: &str, noise_phrases: &[S]) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let text = unescape_entities(raw);

    let text = LINE_BREAK.replace_all(&text, "\n");
    let text = PARAGRAPH_CLOSE.replace_all(&text, "\n\n");
    let text = BLOCK_CLOSE.replace_all(&text, "\n");

    let mut text = text.into_owned();
    for phrase in noise_phrases {
        let phrase = phrase.as_ref();
        if !phrase.is_empty() && text.contains(phrase) {
            text = text.replace(phrase, "");
        }
    }

    let text = ANY_TAG.replace_all(&text, "");
    let text = unescape_entities(&text);
    let text = BLANK_LINES.replace_all(&text, "\n\n");

    text.trim().to_owned()
}
