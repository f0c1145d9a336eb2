//! Turns parsed feed entries into the item shapes the strip understands.
//!
//! Every entry either yields a validated item or a [`Skip`] saying why it
//! was left out; nothing downstream ever sees a half-filled item.

use feed_rs::model::{Entry, Feed};
use tracing::debug;

use crate::model::{ComicItem, NewsItem, RedditItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    MissingTitle,
    MissingImage,
}

/// Applies `parse` to the first `limit` entries in feed order, keeping the
/// ones that parse.
pub fn normalize_entries<T, F>(entries: &[Entry], limit: usize, mut parse: F) -> Vec<T>
where
    F: FnMut(&Entry) -> Result<T, Skip>,
{
    entries
        .iter()
        .take(limit)
        .filter_map(|entry| match parse(entry) {
            Ok(item) => Some(item),
            Err(skip) => {
                debug!("Skipping entry '{}': {:?}", entry.id, skip);
                None
            }
        })
        .collect()
}

fn entry_title(entry: &Entry) -> Option<String> {
    entry
        .title
        .as_ref()
        .map(|t| t.content.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

pub fn parse_news_entry(entry: &Entry, source: &str) -> Result<NewsItem, Skip> {
    let title = entry_title(entry).ok_or(Skip::MissingTitle)?;
    Ok(NewsItem {
        title,
        source: source.to_string(),
    })
}

pub fn parse_reddit_entry(entry: &Entry, subreddit: &str) -> Result<RedditItem, Skip> {
    let title = entry_title(entry).ok_or(Skip::MissingTitle)?;
    Ok(RedditItem {
        title,
        subreddit: subreddit.to_string(),
    })
}

pub fn parse_comic_entry(entry: &Entry) -> Result<ComicItem, Skip> {
    let image_url = extract_image_url(entry).ok_or(Skip::MissingImage)?;
    Ok(ComicItem {
        image_url,
        title: entry_title(entry),
    })
}

/// Name shown next to a headline: the feed's own title, else the host of
/// the feed URL, else "Unknown".
pub fn feed_source_name(feed: &Feed, feed_url: &str) -> String {
    if let Some(title) = feed
        .title
        .as_ref()
        .map(|t| t.content.trim())
        .filter(|t| !t.is_empty())
    {
        return title.to_string();
    }

    url::Url::parse(feed_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Enclosure first, then the first `<img>` in the entry's HTML.
pub fn extract_image_url(entry: &Entry) -> Option<String> {
    // feed_rs folds RSS <enclosure> into media content
    let enclosure = entry
        .media
        .iter()
        .flat_map(|m| m.content.iter())
        .find_map(|c| c.url.as_ref())
        .map(|u| u.to_string());
    if enclosure.is_some() {
        return enclosure;
    }

    let html = entry
        .content
        .as_ref()
        .and_then(|c| c.body.as_deref())
        .or_else(|| entry.summary.as_ref().map(|s| s.content.as_str()))?;

    find_img_src(html)
}

/// Finds the `src` of the first `<img>` tag carrying a quoted, non-empty one.
/// Tag and attribute names match case-insensitively.
pub fn find_img_src(html: &str) -> Option<String> {
    // ASCII lowercasing keeps byte offsets identical to `html`
    let lower = html.to_ascii_lowercase();
    let mut offset = 0;

    while let Some(found) = lower[offset..].find("<img") {
        let tag_start = offset + found + "<img".len();
        let tag_end = lower[tag_start..]
            .find('>')
            .map_or(lower.len(), |end| tag_start + end);
        offset = tag_end;

        if let Some(src) = find_src_attribute(&html[tag_start..tag_end], &lower[tag_start..tag_end]) {
            return Some(src);
        }
    }

    None
}

fn find_src_attribute(tag: &str, lower_tag: &str) -> Option<String> {
    let mut offset = 0;

    while let Some(found) = lower_tag[offset..].find("src=") {
        let attr_start = offset + found;
        offset = attr_start + "src=".len();

        // `data-src=` and friends are not the image source
        let preceded_by_space = lower_tag[..attr_start]
            .chars()
            .next_back()
            .is_some_and(char::is_whitespace);
        if !preceded_by_space {
            continue;
        }

        let rest = &tag[offset..];
        let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            continue;
        };
        let value = &rest[quote.len_utf8()..];
        let Some(end) = value.find(['"', '\'']) else {
            continue;
        };
        let src = value[..end].trim();
        if !src.is_empty() {
            return Some(src.to_string());
        }
    }

    None
}
