#![forbid(unsafe_code)]

//! Headless SVG slide renderer for extracted clinical cases.
//!
//! Consumes the semantic model and timeline layout from `caseline-core` and
//! emits one standalone SVG document per slide. All coordinates are in slide
//! inches (16:9 deck, 13.333 × 7.5); font sizes are given in points and
//! converted at 72 pt per inch.

pub mod slides;
pub mod svg;
pub mod text;
pub mod timeline;

pub use slides::{DeckOptions, Slide, render_deck};
pub use text::{DeterministicTextMeasurer, TextMeasurer, TextMetrics, TextStyle, wrap_lines};
pub use timeline::paint_timeline;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Layout(#[from] caseline_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
