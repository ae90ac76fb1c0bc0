//! Deterministic layout for the whole-course treatment timeline.
//!
//! The engine is a pure function from an ordered event list and an axis width
//! to per-node geometry plus a semantic color. It performs no I/O, trusts the
//! caller's chronological ordering, and degrades large inputs by truncation
//! (never by error). The downstream renderer paints the result; the upstream
//! extractor produced the events. Neither concern leaks in here.

use crate::case::{EventCategory, TimelineEvent};
use crate::error::{Error, Result};
use crate::theme::{Color, Palette};
use serde::{Deserialize, Serialize};

const DEFAULT_MAX_EVENTS: usize = 12;
const DEFAULT_START_X: f64 = 0.6;
const DEFAULT_AXIS_Y: f64 = 4.2;
const DEFAULT_AXIS_OVERHANG: f64 = 0.2;
const DEFAULT_AXIS_THICKNESS: f64 = 0.1;
const DEFAULT_MARKER_RADIUS: f64 = 0.15;
const DEFAULT_STEM_THICKNESS: f64 = 0.03;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardSide {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Vertical connector from the axis to a card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StemLayout {
    pub x: f64,
    pub y_top: f64,
    pub y_bottom: f64,
    pub thickness: f64,
}

/// Circular event marker sitting on the axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerLayout {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
}

/// The shared horizontal axis band (rendered as a right-pointing arrow).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisLayout {
    pub x1: f64,
    pub x2: f64,
    pub y: f64,
    pub thickness: f64,
}

/// One row of the density-aware sizing table.
///
/// A tier applies to event counts up to and including `max_count`; the table
/// is scanned in order and the last row is the fallback for anything denser.
/// Font sizes are in points, lengths in slide inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizingTier {
    pub max_count: usize,
    pub card_width: f64,
    pub card_height: f64,
    pub date_font_pt: f64,
    pub body_font_pt: f64,
    pub stem_length: f64,
}

fn default_tiers() -> Vec<SizingTier> {
    vec![
        SizingTier {
            max_count: 6,
            card_width: 1.6,
            card_height: 1.2,
            date_font_pt: 12.0,
            body_font_pt: 11.0,
            stem_length: 1.0,
        },
        SizingTier {
            max_count: 9,
            card_width: 1.3,
            card_height: 1.2,
            date_font_pt: 10.0,
            body_font_pt: 9.0,
            stem_length: 1.0,
        },
        SizingTier {
            max_count: usize::MAX,
            card_width: 0.95,
            card_height: 1.4,
            date_font_pt: 9.0,
            body_font_pt: 8.0,
            stem_length: 1.0,
        },
    ]
}

/// How nodes are distributed along the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpacingPolicy {
    /// First node on the left margin, last on the right margin, regardless of
    /// density. A single node is centered.
    #[default]
    SpanFilling,
    /// Fixed interval of `canvas_width / n` from the start offset. Leaves
    /// trailing space when `n` is small; kept for low-density decks.
    EvenInterval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Progression,
    Favorable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierRule {
    /// Substrings matched against the uppercased description.
    pub patterns: Vec<String>,
    pub class: Classification,
}

/// Ordered lexical rules for node color classification; first match wins.
///
/// Ordering is the contract: progression rules come before response rules so
/// that a description carrying both markers classifies as progression. The
/// default set mirrors the extraction language (Chinese clinical narrative
/// with RECIST shorthand codes); deployments may swap in localized sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierRules {
    pub rules: Vec<ClassifierRule>,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            rules: vec![
                ClassifierRule {
                    patterns: ["进展", "PD", "复发"].map(str::to_string).to_vec(),
                    class: Classification::Progression,
                },
                ClassifierRule {
                    patterns: ["PR", "SD", "缩小"].map(str::to_string).to_vec(),
                    class: Classification::Favorable,
                },
            ],
        }
    }
}

impl ClassifierRules {
    /// First rule with any pattern present in the description, case-insensitive.
    pub fn classify(&self, description: &str) -> Option<Classification> {
        let haystack = description.to_uppercase();
        for rule in &self.rules {
            if rule
                .patterns
                .iter()
                .any(|p| haystack.contains(p.to_uppercase().as_str()))
            {
                return Some(rule.class);
            }
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineLayoutOptions {
    /// Hard cap on rendered events; later events are silently dropped.
    pub max_events: usize,
    /// Left margin of the axis span.
    pub start_x: f64,
    /// Vertical position of the axis.
    pub axis_y: f64,
    /// How far the axis band extends past each margin.
    pub axis_overhang: f64,
    pub axis_thickness: f64,
    pub marker_radius: f64,
    pub stem_thickness: f64,
    pub spacing: SpacingPolicy,
    /// Ordered by `max_count`; last row is the fallback.
    pub tiers: Vec<SizingTier>,
    pub rules: ClassifierRules,
    pub palette: Palette,
    /// Phase label meaning "evaluation-only"; suppressed in favor of the
    /// generic tag below.
    pub evaluation_placeholder: String,
    /// Tag shown on evaluation events that carry no usable phase label.
    pub evaluation_tag: String,
}

impl Default for TimelineLayoutOptions {
    fn default() -> Self {
        Self {
            max_events: DEFAULT_MAX_EVENTS,
            start_x: DEFAULT_START_X,
            axis_y: DEFAULT_AXIS_Y,
            axis_overhang: DEFAULT_AXIS_OVERHANG,
            axis_thickness: DEFAULT_AXIS_THICKNESS,
            marker_radius: DEFAULT_MARKER_RADIUS,
            stem_thickness: DEFAULT_STEM_THICKNESS,
            spacing: SpacingPolicy::default(),
            tiers: default_tiers(),
            rules: ClassifierRules::default(),
            palette: Palette::default(),
            evaluation_placeholder: "评估".to_string(),
            evaluation_tag: "疗效评估".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineNode {
    pub index: usize,
    pub anchor_x: f64,
    pub side: CardSide,
    pub marker: MarkerLayout,
    pub stem: StemLayout,
    pub card: Rect,
    pub color: Color,
    pub date: String,
    /// Bolded tag line above the description, already resolved (phase label
    /// or the generic evaluation tag).
    pub tag: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineLayout {
    pub axis: AxisLayout,
    /// The tier every node on this timeline was sized with.
    pub tier: SizingTier,
    pub nodes: Vec<TimelineNode>,
}

fn select_tier(tiers: &[SizingTier], n: usize) -> Result<SizingTier> {
    let last = tiers.last().ok_or(Error::EmptyTierTable)?;
    Ok(*tiers.iter().find(|t| n <= t.max_count).unwrap_or(last))
}

fn anchor_x(policy: SpacingPolicy, start_x: f64, canvas_width: f64, i: usize, n: usize) -> f64 {
    match policy {
        SpacingPolicy::SpanFilling => {
            if n > 1 {
                start_x + canvas_width * (i as f64) / ((n - 1) as f64)
            } else {
                start_x + canvas_width / 2.0
            }
        }
        SpacingPolicy::EvenInterval => start_x + (i as f64) * (canvas_width / n as f64),
    }
}

fn node_color(
    options: &TimelineLayoutOptions,
    category: EventCategory,
    description: &str,
) -> Color {
    match options.rules.classify(description) {
        Some(Classification::Progression) => options.palette.alert,
        Some(Classification::Favorable) if category == EventCategory::Evaluation => {
            options.palette.favorable
        }
        _ => options.palette.primary,
    }
}

fn tag_line(options: &TimelineLayoutOptions, event: &TimelineEvent) -> Option<String> {
    let phase = event.phase.as_deref().map(str::trim).unwrap_or("");
    if !phase.is_empty() && phase != options.evaluation_placeholder {
        Some(phase.to_string())
    } else if event.category == EventCategory::Evaluation {
        Some(options.evaluation_tag.clone())
    } else {
        None
    }
}

/// Lays out up to `options.max_events` events along an axis spanning
/// `[start_x, start_x + canvas_width]`.
///
/// Events are consumed in caller order and never re-sorted. Cards alternate
/// above/below the axis strictly by index parity so that same-side neighbors
/// are two spacing steps apart. An empty event list yields an empty node list;
/// callers are expected to skip rendering entirely in that case.
pub fn layout_timeline(
    events: &[TimelineEvent],
    canvas_width: f64,
    options: &TimelineLayoutOptions,
) -> Result<TimelineLayout> {
    if !canvas_width.is_finite() || canvas_width <= 0.0 {
        return Err(Error::NonPositiveCanvasWidth {
            width: canvas_width,
        });
    }
    if options.max_events == 0 {
        return Err(Error::ZeroEventCap);
    }

    let n = events.len().min(options.max_events);
    if events.len() > n {
        tracing::debug!(
            total = events.len(),
            rendered = n,
            "timeline event cap reached; dropping trailing events"
        );
    }
    let tier = select_tier(&options.tiers, n)?;

    let axis = AxisLayout {
        x1: options.start_x - options.axis_overhang,
        x2: options.start_x + canvas_width + options.axis_overhang,
        y: options.axis_y,
        thickness: options.axis_thickness,
    };

    let mut nodes = Vec::with_capacity(n);
    for (i, event) in events.iter().take(n).enumerate() {
        let x = anchor_x(options.spacing, options.start_x, canvas_width, i, n);
        let side = if i % 2 == 0 {
            CardSide::Above
        } else {
            CardSide::Below
        };

        let stem = match side {
            CardSide::Above => StemLayout {
                x,
                y_top: options.axis_y - tier.stem_length,
                y_bottom: options.axis_y,
                thickness: options.stem_thickness,
            },
            CardSide::Below => StemLayout {
                x,
                y_top: options.axis_y,
                y_bottom: options.axis_y + tier.stem_length,
                thickness: options.stem_thickness,
            },
        };

        let card_y = match side {
            CardSide::Above => options.axis_y - tier.stem_length - tier.card_height,
            CardSide::Below => options.axis_y + tier.stem_length,
        };
        let card = Rect {
            x: x - tier.card_width / 2.0,
            y: card_y,
            width: tier.card_width,
            height: tier.card_height,
        };

        nodes.push(TimelineNode {
            index: i,
            anchor_x: x,
            side,
            marker: MarkerLayout {
                cx: x,
                cy: options.axis_y,
                radius: options.marker_radius,
            },
            stem,
            card,
            color: node_color(options, event.category, &event.description),
            date: event.date.clone(),
            tag: tag_line(options, event),
            description: event.description.clone(),
        });
    }

    Ok(TimelineLayout { axis, tier, nodes })
}
