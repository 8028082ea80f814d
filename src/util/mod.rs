//! Text utilities shared by the feed pipeline.
//!
//! - **Sanitizing**: entity decoding and markup stripping for feed fields
//! - **Text helpers**: character counting and excerpt building
//!
//! # Examples
//!
//! ```
//! use miolib_rss::util::{excerpt, sanitize};
//!
//! let text = sanitize("<p>Hello &amp; welcome</p>");
//! assert_eq!(text, "Hello & welcome");
//! assert_eq!(excerpt(&text, 5), "Hello...");
//! ```

mod sanitize;
mod text;

pub use sanitize::{sanitize, sanitize_with, unescape_entities, DEFAULT_NOISE_PHRASES};
pub use text::{char_len, excerpt, ELLIPSIS};
