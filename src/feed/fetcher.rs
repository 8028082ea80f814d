use encoding_rs::{Encoding, UTF_8};
use futures::StreamExt;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONTENT_TYPE,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;
use crate::feed::article::{ArticleRecord, PipelineOptions};
use crate::feed::parser::parse_feed;

/// Default response body ceiling (10MB)
pub const MAX_FEED_SIZE: usize = 10 * 1024 * 1024;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Client hints and fetch-metadata headers sent by a desktop Chrome navigation.
/// Names must be lowercase for `HeaderName::from_static`.
const BROWSER_HINT_HEADERS: [(&str, &str); 7] = [
    (
        "sec-ch-ua",
        r#""Not_A Brand";v="8", "Chromium";v="120", "Google Chrome";v="120""#,
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", r#""macOS""#),
    ("sec-fetch-dest", "document"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-site", "none"),
    ("sec-fetch-user", "?1"),
];

/// Errors that can occur while retrieving a feed.
///
/// HTTP statuses are not errors here; they are classified into
/// [`FetchOutcome`] instead.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, timeout, broken body)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Response body exceeded the configured size limit
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),
}

/// Classified result of a single feed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// HTTP 200 with the body decoded as text
    Feed(String),
    /// HTTP 403, usually an anti-bot wall in front of the origin
    Blocked,
    /// Any other status
    Status(u16),
}

/// Fetches feeds and turns them into [`ArticleRecord`]s.
///
/// Holds no per-request state: browser headers are attached to each request,
/// so one client may serve concurrent fetches of different feeds.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: reqwest::Client,
    options: PipelineOptions,
    max_feed_bytes: usize,
}

impl Default for FeedClient {
    fn default() -> Self {
        Self::new(PipelineOptions::default())
    }
}

impl FeedClient {
    /// Creates a client with a default `reqwest::Client` (no timeout).
    pub fn new(options: PipelineOptions) -> Self {
        Self::with_client(reqwest::Client::new(), options)
    }

    /// Creates a client around an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client, options: PipelineOptions) -> Self {
        Self {
            client,
            options,
            max_feed_bytes: MAX_FEED_SIZE,
        }
    }

    /// Creates a client from configuration, applying the transport timeout
    /// when one is set.
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(FetchError::Client)?;

        Ok(Self::with_client(client, config.pipeline_options())
            .with_max_feed_bytes(config.max_feed_bytes))
    }

    pub fn with_max_feed_bytes(mut self, limit: usize) -> Self {
        self.max_feed_bytes = limit;
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Fetches `url` and returns its articles in document order.
    ///
    /// Never fails. Failures become displayable results:
    ///
    /// - HTTP 403 → one record explaining the block and how to work around it
    /// - other non-200 status → empty `Vec`
    /// - transport failure or oversized body → one record carrying the URL
    ///   and the error chain
    ///
    /// Exactly one request is made; there is no retry and no cache.
    ///
    /// # Cancellation
    ///
    /// Dropping the returned future aborts the request. Cancellation is never
    /// turned into a diagnostic record.
    pub async fn fetch(&self, url: &str) -> Vec<ArticleRecord> {
        match self.fetch_outcome(url).await {
            Ok(FetchOutcome::Feed(xml)) => {
                let records = parse_feed(&xml, &self.options);
                tracing::info!(url = %url, articles = records.len(), "Feed parsed");
                records
            }
            Ok(FetchOutcome::Blocked) => {
                tracing::warn!(url = %url, "Feed origin rejected the request (403)");
                vec![blocked_record(url, &self.options)]
            }
            Ok(FetchOutcome::Status(status)) => {
                tracing::warn!(
                    url = %url,
                    status = status,
                    "Feed request returned non-success status, no articles"
                );
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Feed request failed");
                vec![transport_failure_record(url, &e, &self.options)]
            }
        }
    }

    /// Performs the request and classifies the response without building records.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Network`] - connection, TLS, timeout or body read errors
    /// - [`FetchError::ResponseTooLarge`] - body larger than the size limit
    pub async fn fetch_outcome(&self, url: &str) -> Result<FetchOutcome, FetchError> {
        tracing::debug!(url = %url, "Requesting feed");

        let response = self
            .client
            .get(url)
            .headers(browser_headers())
            .send()
            .await?;

        let status = response.status();
        tracing::info!(url = %url, status = status.as_u16(), "Feed response received");

        if status == StatusCode::FORBIDDEN {
            return Ok(FetchOutcome::Blocked);
        }
        if status != StatusCode::OK {
            return Ok(FetchOutcome::Status(status.as_u16()));
        }

        let encoding = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(charset_encoding)
            .unwrap_or(UTF_8);

        let bytes = read_limited_bytes(response, self.max_feed_bytes).await?;
        let (text, used, had_errors) = encoding.decode(&bytes);
        if had_errors {
            tracing::debug!(
                url = %url,
                encoding = used.name(),
                "Feed body contained undecodable bytes"
            );
        }
        Ok(FetchOutcome::Feed(text.into_owned()))
    }
}

/// Fetches `url` with a fresh client and default options.
///
/// Convenience for one-off callers; see [`FeedClient::fetch`].
pub async fn fetch_feed(url: &str) -> Vec<ArticleRecord> {
    FeedClient::default().fetch(url).await
}

/// Header set that mimics a desktop Chrome navigation request.
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    for (name, value) in BROWSER_HINT_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers
}

/// Resolves the `charset` parameter of a Content-Type value.
///
/// Returns `None` when the parameter is absent or names an unknown encoding;
/// the caller then decodes as UTF-8. A byte order mark in the body still
/// takes precedence when decoding.
fn charset_encoding(content_type: &str) -> Option<&'static Encoding> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
        .and_then(|(_, label)| Encoding::for_label(label.trim().trim_matches('"').as_bytes()))
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

fn blocked_record(url: &str, options: &PipelineOptions) -> ArticleRecord {
    let summary = format!(
        "The server ({url}) refused the request. This is usually caused by anti-bot protection in front of the feed.\nTry another instance or mirror of the feed host."
    );
    let body = format!(
        "The server ({url}) refused the request.\n\
         Public feed hosts are often behind CDN anti-bot protection that rejects automated clients.\n\n\
         Suggested fixes:\n\
         1. Use a self-hosted instance of the feed service.\n\
         2. Try another public mirror that is not being rate limited.\n\
         3. Try again later."
    );
    ArticleRecord::diagnostic("Access denied (403 Forbidden)", url, &summary, body, options)
}

fn transport_failure_record(url: &str, error: &FetchError, options: &PipelineOptions) -> ArticleRecord {
    let summary = format!("Error: {error}");
    let body = format!(
        "Request URL: {url}\nError chain:\n{}",
        error_chain(error).join("\n")
    );
    ArticleRecord::diagnostic("Network request failed", url, &summary, body, options)
}

/// Renders an error and all of its sources, outermost first.
fn error_chain(error: &(dyn std::error::Error + 'static)) -> Vec<String> {
    let mut chain = vec![error.to_string()];
    let mut source = error.source();
    while let Some(cause) = source {
        chain.push(format!("caused by: {cause}"));
        source = cause.source();
    }
    chain
}
