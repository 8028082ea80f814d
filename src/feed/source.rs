use serde::{Deserialize, Serialize};
use url::Url;

/// Public RSSHub host that default subscriptions point at
pub const PUBLIC_RSSHUB_HOST: &str = "rsshub.app";

/// Mirror substituted for [`PUBLIC_RSSHUB_HOST`] unless configured otherwise.
/// The public instance sits behind aggressive anti-bot protection.
pub const DEFAULT_MIRROR_HOST: &str = "http://rsshub.isrss.com";

/// A named feed subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Returns this source with its `rsshub.app` origin replaced by `mirror_host`.
    ///
    /// Only the scheme, host and port change; path and query are kept. Sources
    /// on other hosts, and URLs that fail to parse, are returned unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use miolib_rss::feed::FeedSource;
    ///
    /// let source = FeedSource::new("blog", "https://rsshub.app/baoyu/blog");
    /// let mirrored = source.with_mirror("http://mirror.example:8080");
    /// assert_eq!(mirrored.url, "http://mirror.example:8080/baoyu/blog");
    /// ```
    pub fn with_mirror(&self, mirror_host: &str) -> Self {
        match rewrite_origin(&self.url, mirror_host) {
            Some(url) => Self {
                name: self.name.clone(),
                url,
            },
            None => self.clone(),
        }
    }
}

fn rewrite_origin(url: &str, mirror_host: &str) -> Option<String> {
    let mut parsed = Url::parse(url).ok()?;
    if parsed.host_str() != Some(PUBLIC_RSSHUB_HOST) {
        return None;
    }

    let mirror = match Url::parse(mirror_host) {
        Ok(mirror) => mirror,
        Err(e) => {
            tracing::warn!(mirror = %mirror_host, error = %e, "Ignoring unparsable mirror host");
            return None;
        }
    };

    parsed.set_scheme(mirror.scheme()).ok()?;
    parsed.set_host(mirror.host_str()).ok()?;
    parsed.set_port(mirror.port()).ok()?;
    Some(parsed.into())
}

/// Built-in subscriptions used when the config lists none.
pub fn default_feeds() -> Vec<FeedSource> {
    vec![
        FeedSource::new("知乎专栏", "https://rsshub.app/baoyu/blog"),
        FeedSource::new(
            "RSSHub",
            "https://rsshub.app/xiaohongshu/user/593032945e87e77791e03696/notes",
        ),
        FeedSource::new(
            "awesomeRSSHub",
            "http://rsshub.isrss.com/telegram/channel/awesomeRSSHub",
        ),
    ]
}
