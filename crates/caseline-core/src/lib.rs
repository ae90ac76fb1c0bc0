#![forbid(unsafe_code)]

//! Semantic case model + deterministic treatment-timeline layout (headless).
//!
//! Design goals:
//! - pure layout: (event list, axis width) -> geometry, no I/O, no globals
//! - deterministic, testable outputs (exact coordinates, exact colors)
//! - all visual constants are injected configuration, never module state

pub mod case;
pub mod error;
pub mod theme;
pub mod timeline;

pub use case::{
    Baseline, CaseReport, CaseSummary, Cover, CurrentAdmission, EventCategory, TimelineEvent,
    TreatmentPhase,
};
pub use error::{Error, Result};
pub use theme::{Color, Palette};
pub use timeline::{
    AxisLayout, CardSide, Classification, ClassifierRule, ClassifierRules, MarkerLayout, Rect,
    SizingTier, SpacingPolicy, StemLayout, TimelineLayout, TimelineLayoutOptions, TimelineNode,
    layout_timeline,
};

#[cfg(test)]
mod tests;
