use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedditItem {
    pub title: String,
    pub subreddit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComicItem {
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PuzzleKind {
    Prompt,
    Wordsearch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: PuzzleKind,
    /// Preformatted ASCII
    pub content: String,
}

/// One titled section of a strip.
///
/// `Header` and `Footer` exist for completeness of the wire shape; the
/// assembler never emits them and the renderer ignores them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PrintBlock {
    Header {
        text: String,
    },
    News {
        items: Vec<NewsItem>,
    },
    Reddit {
        items: Vec<RedditItem>,
    },
    Comic {
        items: Vec<ComicItem>,
    },
    Quote {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        author: Option<String>,
    },
    Puzzle {
        title: String,
        content: String,
    },
    Footer {
        text: String,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Cozy,
    Minimal,
    Playful,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Cozy, Theme::Minimal, Theme::Playful];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Cozy => "cozy",
            Theme::Minimal => "minimal",
            Theme::Playful => "playful",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Cozy => "Cozy",
            Theme::Minimal => "Minimal",
            Theme::Playful => "Playful",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StripLength {
    Short,
    #[default]
    Medium,
    Long,
}

/// Per-kind item caps for one strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub news: usize,
    pub reddit: usize,
    pub comics: usize,
}

impl StripLength {
    pub const ALL: [StripLength; 3] = [StripLength::Short, StripLength::Medium, StripLength::Long];

    pub fn limits(self) -> Limits {
        match self {
            StripLength::Short => Limits {
                news: 3,
                reddit: 2,
                comics: 1,
            },
            StripLength::Medium => Limits {
                news: 4,
                reddit: 3,
                comics: 1,
            },
            StripLength::Long => Limits {
                news: 6,
                reddit: 4,
                comics: 2,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StripLength::Short => "short",
            StripLength::Medium => "medium",
            StripLength::Long => "long",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StripLength::Short => "Short",
            StripLength::Medium => "Medium",
            StripLength::Long => "Long",
        }
    }
}
