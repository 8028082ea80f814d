/// Ellipsis marker appended to every excerpt
pub const ELLIPSIS: &str = "...";

/// Length of a string in Unicode scalar values.
///
/// Feed text is mostly non-ASCII for some sources, so byte length would
/// skew both the excerpt cut and the body-selection margin.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Builds a one-line preview from already sanitized text.
///
/// Keeps the first `max_chars` characters, flattens `\n` and `\r` to spaces,
/// and always appends [`ELLIPSIS`], even when nothing was cut.
///
/// # Examples
///
/// ```
/// use miolib_rss::util::excerpt;
///
/// assert_eq!(excerpt("Line one\nLine two", 100), "Line one Line two...");
/// assert_eq!(excerpt("abcdef", 3), "abc...");
/// assert_eq!(excerpt("", 100), "...");
/// ```
pub fn excerpt(s: &str, max_chars: usize) -> String {
    let mut out: String = s
        .chars()
        .take(max_chars)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    out.push_str(ELLIPSIS);
    out
}
