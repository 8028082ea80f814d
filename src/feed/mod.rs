//! Feed retrieval and sanitization pipeline.
//!
//! A fetch runs three stages, strictly one-directional:
//!
//! - **Fetching**: one HTTP GET with browser-like headers, outcome classified
//!   as feed / blocked / other status / transport failure
//! - **Extraction**: tolerant scan for `<item>` blocks and their fields
//! - **Sanitizing**: entity decoding, markup stripping, excerpt and body
//!   selection
//!
//! # Architecture
//!
//! - [`fetcher`] - HTTP retrieval and diagnostic records for failures
//! - [`extractor`] - pattern-based `<item>` and field extraction
//! - [`parser`] - extraction plus record construction, no I/O
//! - [`article`] - the [`ArticleRecord`] output type and body heuristics
//! - [`source`] - feed subscriptions and mirror rewriting
//!
//! # Example
//!
//! ```no_run
//! use miolib_rss::feed::FeedClient;
//!
//! # async fn demo() {
//! let client = FeedClient::default();
//! for article in client.fetch("https://example.com/feed.xml").await {
//!     println!("{}: {}", article.title(), article.excerpt());
//! }
//! # }
//! ```

mod article;
mod extractor;
mod fetcher;
mod parser;
mod source;

pub use article::{
    select_body, ArticleRecord, PipelineOptions, DEFAULT_BODY_THRESHOLD, DEFAULT_EXCERPT_CHARS,
};
pub use extractor::{extract_items, extract_tag_text, RawItemFields};
pub use fetcher::{
    browser_headers, fetch_feed, FeedClient, FetchError, FetchOutcome, MAX_FEED_SIZE,
};
pub use parser::parse_feed;
pub use source::{default_feeds, FeedSource, DEFAULT_MIRROR_HOST, PUBLIC_RSSHUB_HOST};
