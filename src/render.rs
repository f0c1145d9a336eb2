//! Turns a block list into the printable strip markup.

use askama::Template;
use chrono::NaiveDate;

use crate::model::{PrintBlock, Theme};

/// 58mm thermal paper. Use 576 for 80mm rolls.
pub const PRINTER_WIDTH_PX: u32 = 384;

pub const GREETING: &str = "Here’s your little daily strip.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decorations {
    pub divider: &'static str,
    pub icon: &'static str,
    pub footer: &'static str,
}

impl Theme {
    pub fn decorations(self) -> Decorations {
        match self {
            Theme::Cozy => Decorations {
                divider: "⋯⋯⋯⋯⋯⋯⋯⋯⋯⋯",
                icon: "☕\u{fe0f}",
                footer: "printed with love (and a bit of thermal magic)",
            },
            Theme::Minimal => Decorations {
                divider: "──────────────",
                icon: "◦",
                footer: "printed on purpose ✶",
            },
            Theme::Playful => Decorations {
                divider: "· · · · · · · · ·",
                icon: "☻",
                footer: "made by a tiny imaginary printer friend",
            },
        }
    }
}

pub struct SectionView {
    pub class: &'static str,
    pub title: &'static str,
    pub entries: Vec<EntryView>,
}

#[derive(Default)]
pub struct EntryView {
    pub heading: Option<String>,
    pub text: Option<String>,
    pub meta: Option<String>,
    pub image: Option<ImageView>,
    pub preformatted: Option<String>,
}

pub struct ImageView {
    pub src: String,
    pub alt: String,
}

#[derive(Template)]
#[template(path = "strip.html")]
pub struct StripTemplate {
    pub theme: &'static str,
    pub width_px: u32,
    pub decor: Decorations,
    pub date: String,
    pub greeting: &'static str,
    pub sections: Vec<SectionView>,
}

/// "Monday, October 19, 2026"
pub fn format_strip_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// Header and footer blocks have no section of their own.
pub fn section_for(block: &PrintBlock) -> Option<SectionView> {
    let section = match block {
        PrintBlock::News { items } => SectionView {
            class: "news",
            title: "~ headlines ~",
            entries: items
                .iter()
                .map(|item| EntryView {
                    text: Some(format!("• {}", item.title)),
                    meta: Some(format!("[{}]", item.source)),
                    ..EntryView::default()
                })
                .collect(),
        },
        PrintBlock::Reddit { items } => SectionView {
            class: "reddit",
            title: "reddit corner",
            entries: items
                .iter()
                .map(|item| EntryView {
                    text: Some(format!("• {}", item.title)),
                    meta: Some(format!("[/r/{}]", item.subreddit)),
                    ..EntryView::default()
                })
                .collect(),
        },
        PrintBlock::Comic { items } => SectionView {
            class: "comic",
            title: "comic relief",
            entries: items
                .iter()
                .map(|item| EntryView {
                    heading: item.title.clone(),
                    image: Some(ImageView {
                        src: item.image_url.clone(),
                        alt: item.title.clone().unwrap_or_else(|| "Comic".to_string()),
                    }),
                    ..EntryView::default()
                })
                .collect(),
        },
        PrintBlock::Quote { text, author } => SectionView {
            class: "quote",
            title: "today’s quote",
            entries: vec![EntryView {
                text: Some(format!("“{}”", text)),
                meta: author.as_ref().map(|a| format!("— {}", a)),
                ..EntryView::default()
            }],
        },
        PrintBlock::Puzzle { title, content } => SectionView {
            class: "puzzle",
            title: "little puzzle",
            entries: vec![EntryView {
                heading: Some(title.clone()),
                preformatted: Some(content.clone()),
                ..EntryView::default()
            }],
        },
        PrintBlock::Header { .. } | PrintBlock::Footer { .. } => return None,
    };
    Some(section)
}

pub fn strip_template(blocks: &[PrintBlock], theme: Theme, date: NaiveDate) -> StripTemplate {
    StripTemplate {
        theme: theme.as_str(),
        width_px: PRINTER_WIDTH_PX,
        decor: theme.decorations(),
        date: format_strip_date(date),
        greeting: GREETING,
        sections: blocks.iter().filter_map(section_for).collect(),
    }
}

/// Renders the strip markup. The date is passed in so output depends only
/// on the arguments.
pub fn render_strip(
    blocks: &[PrintBlock],
    theme: Theme,
    date: NaiveDate,
) -> Result<String, askama::Error> {
    strip_template(blocks, theme, date).render()
}
