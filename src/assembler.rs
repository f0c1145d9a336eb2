//! Builds the ordered block list of one strip from the user's settings.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{error, info};

use crate::content;
use crate::fetcher::Fetcher;
use crate::model::{ComicItem, NewsItem, Puzzle, PrintBlock, Quote, RedditItem};
use crate::settings::UserSettings;

pub const FALLBACK_TEXT: &str = "No fresh content right now, but you still deserve a tiny print.";
pub const FALLBACK_AUTHOR: &str = "Little Printer Web";

/// Where each module's content comes from.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn news(&self, feeds: &[String], limit: usize) -> anyhow::Result<Vec<NewsItem>>;
    async fn reddit(&self, subreddits: &[String], limit: usize) -> anyhow::Result<Vec<RedditItem>>;
    async fn comics(&self, feeds: &[String], limit: usize) -> anyhow::Result<Vec<ComicItem>>;
    async fn quote(&self) -> anyhow::Result<Quote>;
    async fn puzzle(&self) -> anyhow::Result<Puzzle>;
}

#[async_trait]
impl ContentSource for Fetcher {
    async fn news(&self, feeds: &[String], limit: usize) -> anyhow::Result<Vec<NewsItem>> {
        Ok(self.fetch_news(feeds, limit).await)
    }

    async fn reddit(&self, subreddits: &[String], limit: usize) -> anyhow::Result<Vec<RedditItem>> {
        Ok(self.fetch_reddit(subreddits, limit).await)
    }

    async fn comics(&self, feeds: &[String], limit: usize) -> anyhow::Result<Vec<ComicItem>> {
        Ok(self.fetch_comics(feeds, limit).await)
    }

    async fn quote(&self) -> anyhow::Result<Quote> {
        Ok(content::random_quote(&mut rand::thread_rng()))
    }

    async fn puzzle(&self) -> anyhow::Result<Puzzle> {
        Ok(content::random_puzzle(&mut rand::thread_rng()))
    }
}

/// Everything gathered for one strip, before shuffling.
#[derive(Debug, Default)]
pub struct Fetched {
    pub news: Vec<NewsItem>,
    pub reddit: Vec<RedditItem>,
    pub comics: Vec<ComicItem>,
    pub quote: Option<Quote>,
    pub puzzle: Option<Puzzle>,
}

/// Gathers every enabled module concurrently and builds the strip.
///
/// Modules settle independently: one failing module is logged and left
/// empty without discarding what the others returned.
pub async fn assemble<S>(settings: &UserSettings, source: &S) -> Vec<PrintBlock>
where
    S: ContentSource + ?Sized,
{
    let fetched = gather(settings, source).await;
    let mut rng = StdRng::from_entropy();
    build_blocks(fetched, &mut rng)
}

pub async fn gather<S>(settings: &UserSettings, source: &S) -> Fetched
where
    S: ContentSource + ?Sized,
{
    let limits = settings.strip_length.limits();
    let modules = settings.modules;

    let news = async {
        if modules.news && !settings.rss_feeds.is_empty() {
            source.news(&settings.rss_feeds, limits.news).await
        } else {
            Ok(Vec::new())
        }
    };
    let reddit = async {
        if modules.reddit && !settings.subreddits.is_empty() {
            source.reddit(&settings.subreddits, limits.reddit).await
        } else {
            Ok(Vec::new())
        }
    };
    let comics = async {
        if modules.comics && !settings.comic_feeds.is_empty() {
            source.comics(&settings.comic_feeds, limits.comics).await
        } else {
            Ok(Vec::new())
        }
    };
    let quote = async {
        if modules.quotes {
            source.quote().await.map(Some)
        } else {
            Ok(None)
        }
    };
    let puzzle = async {
        if modules.puzzle {
            source.puzzle().await.map(Some)
        } else {
            Ok(None)
        }
    };

    let (news, reddit, comics, quote, puzzle) = tokio::join!(news, reddit, comics, quote, puzzle);

    let fetched = Fetched {
        news: settle("news", news),
        reddit: settle("reddit", reddit),
        comics: settle("comics", comics),
        quote: settle("quote", quote),
        puzzle: settle("puzzle", puzzle),
    };
    info!(
        "Gathered {} news, {} reddit, {} comics, quote: {}, puzzle: {}",
        fetched.news.len(),
        fetched.reddit.len(),
        fetched.comics.len(),
        fetched.quote.is_some(),
        fetched.puzzle.is_some()
    );
    fetched
}

fn settle<T: Default>(module: &str, result: anyhow::Result<T>) -> T {
    result.unwrap_or_else(|e| {
        error!("Error fetching {} content: {:#}", module, e);
        T::default()
    })
}

/// Shuffles each list and lays blocks out in the fixed order news, reddit,
/// comic, quote, puzzle. Never returns an empty list.
pub fn build_blocks<R: Rng + ?Sized>(fetched: Fetched, rng: &mut R) -> Vec<PrintBlock> {
    let mut blocks = Vec::new();

    if !fetched.news.is_empty() {
        blocks.push(PrintBlock::News {
            items: shuffle(fetched.news, rng),
        });
    }

    if !fetched.reddit.is_empty() {
        blocks.push(PrintBlock::Reddit {
            items: shuffle(fetched.reddit, rng),
        });
    }

    if !fetched.comics.is_empty() {
        blocks.push(PrintBlock::Comic {
            items: shuffle(fetched.comics, rng),
        });
    }

    if let Some(quote) = fetched.quote {
        blocks.push(PrintBlock::Quote {
            text: quote.text,
            author: quote.author,
        });
    }

    if let Some(puzzle) = fetched.puzzle {
        blocks.push(PrintBlock::Puzzle {
            title: puzzle.title,
            content: puzzle.content,
        });
    }

    if blocks.is_empty() {
        blocks.push(fallback_block());
    }

    blocks
}

/// Uniformly random permutation of `items`.
pub fn shuffle<T, R: Rng + ?Sized>(mut items: Vec<T>, rng: &mut R) -> Vec<T> {
    items.shuffle(rng);
    items
}

pub fn fallback_block() -> PrintBlock {
    PrintBlock::Quote {
        text: FALLBACK_TEXT.to_string(),
        author: Some(FALLBACK_AUTHOR.to_string()),
    }
}

/// What the preview shows before the first strip is generated.
pub fn placeholder_blocks() -> Vec<PrintBlock> {
    vec![
        PrintBlock::News {
            items: vec![NewsItem {
                title: "Your cozy daily strip is ready to print.".to_string(),
                source: "Little Printer Web".to_string(),
            }],
        },
        PrintBlock::Quote {
            text: "Small rituals make days feel bigger.".to_string(),
            author: Some("Unknown".to_string()),
        },
    ]
}
