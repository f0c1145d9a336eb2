//! Little Printer - a daily "print strip" for thermal receipt printers.
//!
//! Pulls a few headlines, reddit posts and comics from public feeds, adds a
//! quote and a puzzle, and renders the lot as one narrow printable page.

pub mod assembler;
pub mod config;
pub mod content;
pub mod fetcher;
pub mod model;
pub mod normalize;
pub mod render;
pub mod routes;
pub mod settings;
