use anyhow::{Context, Result};
use clap::Parser;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::future::Future;
use std::path::{Path, PathBuf};

use miolib_rss::{ArticleRecord, Config, FeedClient, FeedSource};

/// Get the default config file path (~/.config/miolib-rss/config.toml),
/// or `None` when HOME is not set
fn default_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("miolib-rss")
            .join("config.toml"),
    )
}

#[derive(Parser, Debug)]
#[command(name = "miolib-rss", about = "Fetch RSS feeds and print them as readable text")]
struct Args {
    /// Feed URL to fetch (repeatable); replaces the configured feeds
    #[arg(long = "url", value_name = "URL")]
    urls: Vec<String>,

    /// Only fetch the configured feed with this name
    #[arg(long, value_name = "NAME", conflicts_with = "urls")]
    feed: Option<String>,

    /// Config file (default: ~/.config/miolib-rss/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the full body of every article
    #[arg(long)]
    full: bool,

    /// Print JSON instead of text
    #[arg(long, conflicts_with = "full")]
    json: bool,

    /// List the selected feeds and exit without fetching
    #[arg(long)]
    list_feeds: bool,
}

#[derive(Debug, Serialize)]
struct FeedReport {
    source: FeedSource,
    articles: Vec<ArticleRecord>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so --json output stays machine readable
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let default_path = default_config_path();
    let config = load_config(args.config.as_deref().or(default_path.as_deref()))?;

    let sources = select_sources(&args, &config)?;

    if args.list_feeds {
        for source in &sources {
            println!("{}\t{}", source.name, source.url);
        }
        return Ok(());
    }

    let client = FeedClient::from_config(&config).context("Failed to create HTTP client")?;

    // Ctrl-C drops the in-flight fetches instead of waiting for them
    let fetches = fetch_all(&client, sources, config.concurrency);
    let Some(reports) = until_interrupted(fetches, tokio::signal::ctrl_c()).await else {
        eprintln!("Interrupted, fetches cancelled.");
        std::process::exit(130)
    };

    if args.json {
        let json = serde_json::to_string_pretty(&reports).context("Failed to encode JSON")?;
        println!("{json}");
    } else {
        print_reports(&reports, args.full);
    }

    Ok(())
}

/// Loads the config file, falling back to defaults when there is no path.
fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        tracing::warn!("HOME is not set and no --config given, using default configuration");
        return Ok(Config::default());
    };
    Config::load(path).with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Runs `work` to completion unless `interrupt` fires first.
///
/// Returns `None` when interrupted. If the interrupt listener itself fails,
/// `work` keeps running and its output is returned.
async fn until_interrupted<F, I>(work: F, interrupt: I) -> Option<F::Output>
where
    F: Future,
    I: Future<Output = std::io::Result<()>>,
{
    tokio::pin!(work);
    let signal = tokio::select! {
        output = &mut work => return Some(output),
        signal = interrupt => signal,
    };

    match signal {
        Ok(()) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C, fetches cannot be interrupted");
            Some(work.await)
        }
    }
}

fn select_sources(args: &Args, config: &Config) -> Result<Vec<FeedSource>> {
    if !args.urls.is_empty() {
        return Ok(args
            .urls
            .iter()
            .map(|url| FeedSource::new(url.clone(), url.clone()))
            .collect());
    }

    let sources = config.sources();
    match &args.feed {
        Some(name) => {
            let selected: Vec<FeedSource> =
                sources.into_iter().filter(|s| &s.name == name).collect();
            if selected.is_empty() {
                anyhow::bail!("No configured feed named '{name}' (see --list-feeds)");
            }
            Ok(selected)
        }
        None => Ok(sources),
    }
}

/// Fetches every source with bounded concurrency; reports keep source order.
async fn fetch_all(
    client: &FeedClient,
    sources: Vec<FeedSource>,
    concurrency: usize,
) -> Vec<FeedReport> {
    stream::iter(sources)
        .map(|source| async move {
            let articles = client.fetch(&source.url).await;
            FeedReport { source, articles }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

fn print_reports(reports: &[FeedReport], full: bool) {
    for report in reports {
        println!("== {} <{}>", report.source.name, report.source.url);
        if report.articles.is_empty() {
            println!("   (no articles)");
        }

        for (index, article) in report.articles.iter().enumerate() {
            println!("{:>2}. {}", index + 1, article.title());
            if !article.publication_date().is_empty() {
                println!("    {}", article.publication_date());
            }
            if !article.link().is_empty() {
                println!("    {}", article.link());
            }
            println!("    {}", article.excerpt());
            if full && !article.body().is_empty() {
                println!();
                for line in article.body().lines() {
                    println!("    | {line}");
                }
            }
        }
        println!();
    }
}
