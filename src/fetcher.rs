use std::time::Duration;

use feed_rs::model::Feed;
use feed_rs::parser;
use futures::future::join_all;
use reqwest::Client;
use thiserror::Error;
use tracing::{error, info};

use crate::config::FetchConfig;
use crate::model::{ComicItem, NewsItem, RedditItem};
use crate::normalize::{
    feed_source_name, normalize_entries, parse_comic_entry, parse_news_entry, parse_reddit_entry,
};

pub const DEFAULT_NEWS_LIMIT: usize = 3;
pub const DEFAULT_REDDIT_LIMIT: usize = 2;
pub const DEFAULT_COMICS_LIMIT: usize = 1;

/// Why a single source contributed nothing.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parsing error: {0}")]
    Parse(#[from] parser::ParseFeedError),

    #[error("No response within {0:?}")]
    Timeout(Duration),
}

pub struct Fetcher {
    client: Client,
    timeout: Duration,
    reddit_base_url: String,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            timeout: Duration::from_secs(config.timeout_secs),
            reddit_base_url: config.reddit_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Replaces the per-fetch deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn reddit_feed_url(&self, subreddit: &str) -> String {
        format!("{}/r/{}/.rss", self.reddit_base_url, subreddit)
    }

    /// Downloads and parses one feed. The deadline covers the request, the
    /// body and the parse.
    pub async fn fetch_feed(&self, url: &str) -> Result<Feed, FetchError> {
        let request = async {
            let response = self.client.get(url).send().await?.error_for_status()?;
            let bytes = response.bytes().await?;
            Ok::<Feed, FetchError>(parser::parse(&bytes[..])?)
        };

        tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))?
    }

    pub async fn fetch_news(&self, feeds: &[String], limit: usize) -> Vec<NewsItem> {
        let tasks = sources(feeds).map(|url| async move {
            match self.fetch_feed(url).await {
                Ok(feed) => {
                    let source = feed_source_name(&feed, url);
                    normalize_entries(&feed.entries, limit, |e| parse_news_entry(e, &source))
                }
                Err(e) => {
                    error!("RSS feed error '{}': {}", url, e);
                    Vec::new()
                }
            }
        });

        let items: Vec<NewsItem> = join_all(tasks).await.into_iter().flatten().collect();
        info!("Collected {} news items", items.len());
        items
    }

    pub async fn fetch_reddit(&self, subreddits: &[String], limit: usize) -> Vec<RedditItem> {
        let tasks = sources(subreddits).map(|sub| async move {
            let url = self.reddit_feed_url(sub);
            match self.fetch_feed(&url).await {
                Ok(feed) => normalize_entries(&feed.entries, limit, |e| parse_reddit_entry(e, sub)),
                Err(e) => {
                    error!("Reddit RSS error '{}': {}", sub, e);
                    Vec::new()
                }
            }
        });

        let items: Vec<RedditItem> = join_all(tasks).await.into_iter().flatten().collect();
        info!("Collected {} reddit items", items.len());
        items
    }

    pub async fn fetch_comics(&self, feeds: &[String], limit: usize) -> Vec<ComicItem> {
        let tasks = sources(feeds).map(|url| async move {
            match self.fetch_feed(url).await {
                Ok(feed) => normalize_entries(&feed.entries, limit, parse_comic_entry),
                Err(e) => {
                    error!("Comic feed error '{}': {}", url, e);
                    Vec::new()
                }
            }
        });

        let items: Vec<ComicItem> = join_all(tasks).await.into_iter().flatten().collect();
        info!("Collected {} comics", items.len());
        items
    }
}

fn sources(identifiers: &[String]) -> impl Iterator<Item = &str> {
    identifiers.iter().map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Splits a comma-separated query value into decoded source identifiers.
pub fn parse_source_list(param: &str) -> Vec<String> {
    param
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(decode_component)
        .collect()
}

fn decode_component(part: &str) -> String {
    // Literal '+', '=' and '&' are re-escaped so the part parses as one key
    // and '+' is not read as a space
    let escaped = part
        .replace('+', "%2B")
        .replace('=', "%3D")
        .replace('&', "%26");
    url::form_urlencoded::parse(escaped.as_bytes())
        .next()
        .map(|(key, _)| key.into_owned())
        .unwrap_or_default()
}

/// Positive numbers (fractions floored) are used as-is; anything else falls
/// back to `default`.
pub fn effective_limit(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|r| r.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite() && *n >= 1.0)
        .map(|n| n.floor() as usize)
        .unwrap_or(default)
}
