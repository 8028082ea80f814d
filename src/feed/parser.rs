use crate::feed::article::{ArticleRecord, PipelineOptions};
use crate::feed::extractor::extract_items;

/// Turns raw feed XML into display-ready records, in document order.
///
/// Pure function: no I/O, never fails. Input without `<item>` blocks yields
/// an empty `Vec`.
pub fn parse_feed(xml: &str, options: &PipelineOptions) -> Vec<ArticleRecord> {
    extract_items(xml)
        .iter()
        .map(|raw| ArticleRecord::from_raw(raw, options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TWO_ITEMS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
<channel>
  <title>Example</title>
  <item>
    <title><![CDATA[First &amp; foremost]]></title>
    <link>https://example.com/1</link>
    <pubDate>Tue, 02 Jan 2024 10:00:00 +0000</pubDate>
    <description><![CDATA[<p>Short summary.</p>]]></description>
    <content:encoded><![CDATA[<p>Para one</p><p>Para two is a good deal longer than the summary, so it wins.</p>]]></content:encoded>
  </item>
  <item>
    <title>Second</title>
    <link>https://example.com/2</link>
    <description>&lt;p&gt;Escaped &lt;i&gt;markup&lt;/i&gt;&lt;/p&gt;</description>
  </item>
</channel>
</rss>"#;

    #[test]
    fn test_parse_two_items() {
        let records = parse_feed(TWO_ITEMS, &PipelineOptions::default());
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.title(), "First & foremost");
        assert_eq!(first.link(), "https://example.com/1");
        assert_eq!(first.publication_date(), "Tue, 02 Jan 2024 10:00:00 +0000");
        assert_eq!(first.excerpt(), "Short summary....");
        assert_eq!(
            first.body(),
            "Para one\n\nPara two is a good deal longer than the summary, so it wins."
        );

        let second = &records[1];
        assert_eq!(second.title(), "Second");
        assert_eq!(second.publication_date(), "");
        assert_eq!(second.body(), "Escaped markup");
    }

    #[test]
    fn test_parse_spec_like_item() {
        let xml = "<item><title>Hello &amp; World</title><link>http://x/1</link>\
                   <pubDate>Mon</pubDate><description>A <b>bold</b> claim.</description></item>";
        let records = parse_feed(xml, &PipelineOptions::default());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title(), "Hello & World");
        assert_eq!(records[0].body(), "A bold claim.");
        assert!(!records[0].excerpt().contains("<b>"));
    }

    #[test]
    fn test_parse_empty_channel() {
        let xml = r#"<?xml version="1.0"?><rss version="2.0"><channel></channel></rss>"#;
        assert!(parse_feed(xml, &PipelineOptions::default()).is_empty());
    }

    #[test]
    fn test_parse_malformed_xml_still_recovers_items() {
        // Unclosed channel, undeclared namespace, stray ampersand
        let xml = "<rss><channel><item><dc:creator>me</dc:creator><title>Still here & fine</title>";
        let xml = format!("{xml}</item>");
        let records = parse_feed(&xml, &PipelineOptions::default());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title(), "Still here & fine");
    }
}
