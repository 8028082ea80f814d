//! RSS retrieval and sanitization.
//!
//! Fetches a feed URL, extracts its `<item>` blocks with a tolerant text
//! scan, and turns every item into an [`ArticleRecord`] of plain text ready
//! for a list view and a reader view. Fetch failures never surface as errors;
//! they become records a reader can open, or an empty list.

pub mod config;
pub mod feed;
pub mod util;

pub use config::{Config, ConfigError};
pub use feed::{fetch_feed, ArticleRecord, FeedClient, FeedSource, PipelineOptions};
