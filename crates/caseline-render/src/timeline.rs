//! Paints a computed `TimelineLayout` onto a slide.
//!
//! The layout engine owns every coordinate; this pass only translates nodes
//! into SVG primitives and wraps card text. Card text that exceeds the card
//! height is clipped visually but never resizes the card.

use crate::svg::SvgDoc;
use crate::text::{TextMeasurer, TextStyle, wrap_lines};
use caseline_core::{Palette, TimelineLayout, TimelineNode};

const CARD_CORNER_RADIUS: f64 = 0.08;
const CARD_BORDER_WIDTH: f64 = 1.5 / 72.0;
const MARKER_OUTLINE_WIDTH: f64 = 2.0 / 72.0;
const CARD_TEXT_MARGIN: f64 = 0.05;

pub fn paint_timeline(
    doc: &mut SvgDoc,
    layout: &TimelineLayout,
    palette: &Palette,
    measurer: &dyn TextMeasurer,
) {
    doc.arrow_band(
        layout.axis.x1,
        layout.axis.x2,
        layout.axis.y,
        layout.axis.thickness,
        palette.axis,
    );
    for node in &layout.nodes {
        paint_node(doc, layout, node, palette, measurer);
    }
}

fn paint_node(
    doc: &mut SvgDoc,
    layout: &TimelineLayout,
    node: &TimelineNode,
    palette: &Palette,
    measurer: &dyn TextMeasurer,
) {
    doc.rect(
        node.stem.x - node.stem.thickness / 2.0,
        node.stem.y_top,
        node.stem.thickness,
        node.stem.y_bottom - node.stem.y_top,
        node.color,
    );
    doc.circle(
        node.marker.cx,
        node.marker.cy,
        node.marker.radius,
        node.color,
        palette.white,
        MARKER_OUTLINE_WIDTH,
    );
    doc.rounded_rect(
        node.card.x,
        node.card.y,
        node.card.width,
        node.card.height,
        CARD_CORNER_RADIUS,
        palette.card_fill,
        node.color,
        CARD_BORDER_WIDTH,
    );

    let tier = &layout.tier;
    let center_x = node.card.x + node.card.width / 2.0;
    let content_width = (node.card.width - CARD_TEXT_MARGIN * 2.0).max(0.1);

    let date_style = TextStyle::bold(tier.date_font_pt);
    let body_style = TextStyle::new(tier.body_font_pt);
    let date_line_h = date_style.font_size_in() * 1.2;
    let body_line_h = body_style.font_size_in() * 1.2;

    // Baseline of the first line sits one line height below the card top.
    let mut y = node.card.y + CARD_TEXT_MARGIN + date_line_h;
    doc.text(
        center_x,
        y,
        &node.date,
        date_style.font_size_in(),
        node.color,
        true,
        "middle",
    );
    y += body_line_h;

    if let Some(tag) = &node.tag {
        doc.text(
            center_x,
            y,
            &format!("【{tag}】"),
            body_style.font_size_in(),
            node.color,
            true,
            "middle",
        );
        y += body_line_h;
    }

    for line in wrap_lines(&node.description, content_width, &body_style, measurer) {
        doc.text(
            center_x,
            y,
            &line,
            body_style.font_size_in(),
            palette.card_text,
            false,
            "middle",
        );
        y += body_line_h;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::DeterministicTextMeasurer;
    use caseline_core::{
        EventCategory, TimelineEvent, TimelineLayoutOptions, layout_timeline,
    };

    fn event(category: EventCategory, description: &str) -> TimelineEvent {
        TimelineEvent {
            date: "2021-03".to_string(),
            phase: None,
            category,
            description: description.to_string(),
        }
    }

    #[test]
    fn paints_axis_nodes_and_card_text() {
        let options = TimelineLayoutOptions::default();
        let events = vec![
            event(EventCategory::Treatment, "regimen A started"),
            event(EventCategory::Evaluation, "PD, liver lesion growth"),
        ];
        let layout = layout_timeline(&events, 12.1, &options).unwrap();
        let mut doc = SvgDoc::new(13.333, 7.5);
        paint_timeline(&mut doc, &layout, &options.palette, &DeterministicTextMeasurer::default());
        let svg = doc.finish();

        // Axis band plus one stem per node.
        assert_eq!(svg.matches("<circle").count(), 2);
        // Alert node border color from the PD marker.
        assert!(svg.contains("#dc3232"));
        // Generic evaluation tag is painted for the evaluation event.
        assert!(svg.contains("【疗效评估】"));
        assert!(svg.contains("regimen A started"));
    }
}
