//! Local content: quotes and puzzles picked from fixed tables.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::{Puzzle, PuzzleKind, Quote};

const QUOTES: &[(&str, &str)] = &[
    (
        "Be kind, for everyone you meet is fighting a hard battle.",
        "Ian Maclaren",
    ),
    ("In the middle of difficulty lies opportunity.", "Albert Einstein"),
    ("No rain, no flowers.", "Unknown"),
    ("One day or day one. You decide.", "Unknown"),
    (
        "The best time to plant a tree was 20 years ago. The second best time is now.",
        "Chinese proverb",
    ),
    ("Small steps still move you forward.", "Unknown"),
];

const PROMPT_PUZZLES: &[(&str, &str)] = &[
    (
        "Gratitude Trio",
        "List 3 things you’re grateful for today:\n\n1)\n2)\n3)",
    ),
    (
        "Tiny Time Capsule",
        "Write 3 things future-you should remember about today:\n\n1)\n2)\n3)",
    ),
    (
        "Kindness Quest",
        "Plan 2 small acts of kindness:\n\n1) ____________________________\n2) ____________________________",
    ),
];

const WORD_SEARCH_GRID: [&str; 8] = [
    "C A T X R A I N",
    "D O G S U N X X",
    "X X X X X X X X",
    "R A I N X X X X",
    "S U N X C A T X",
    "X X X X D O G X",
    "X X X X X X X X",
    "X X X X X X X X",
];

const WORD_SEARCH_PROBABILITY: f64 = 0.4;

pub fn random_quote<R: Rng + ?Sized>(rng: &mut R) -> Quote {
    // QUOTES is a non-empty literal
    let (text, author) = QUOTES.choose(rng).copied().unwrap_or(QUOTES[0]);
    Quote {
        text: text.to_string(),
        author: Some(author.to_string()),
    }
}

pub fn random_puzzle<R: Rng + ?Sized>(rng: &mut R) -> Puzzle {
    if rng.gen_bool(WORD_SEARCH_PROBABILITY) {
        return word_search_puzzle();
    }

    let (title, content) = PROMPT_PUZZLES
        .choose(rng)
        .copied()
        .unwrap_or(PROMPT_PUZZLES[0]);
    Puzzle {
        title: title.to_string(),
        kind: PuzzleKind::Prompt,
        content: content.to_string(),
    }
}

/// A small printer-friendly grid hiding CAT, DOG, RAIN and SUN.
pub fn word_search_puzzle() -> Puzzle {
    let content = format!(
        "{}\n\nFind: CAT, DOG, RAIN, SUN\n(Circling is encouraged.)",
        WORD_SEARCH_GRID.join("\n")
    );

    Puzzle {
        title: "Mini Word Search".to_string(),
        kind: PuzzleKind::Wordsearch,
        content,
    }
}
