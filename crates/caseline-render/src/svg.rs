//! Minimal SVG emission helpers.
//!
//! Everything is string building over `std::fmt::Write`; there is no DOM.
//! Numbers are trimmed so geometry like `4.2` does not render as `4.2000000001`.

use caseline_core::Color;
use std::fmt::Write as _;

pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn fmt_num(v: f64) -> String {
    let v = (v * 1e6).round() / 1e6;
    let v = if v == -0.0 { 0.0 } else { v };
    let mut s = format!("{v:.6}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}

/// One SVG document under construction, in slide-inch coordinates.
#[derive(Debug)]
pub struct SvgDoc {
    width: f64,
    height: f64,
    body: String,
}

impl SvgDoc {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            body: String::new(),
        }
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: Color) {
        let _ = write!(
            self.body,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
            fmt_num(x),
            fmt_num(y),
            fmt_num(w),
            fmt_num(h),
            fill.to_hex()
        );
    }

    pub fn rounded_rect(
        &mut self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        radius: f64,
        fill: Color,
        stroke: Color,
        stroke_width: f64,
    ) {
        let _ = write!(
            self.body,
            r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{}" fill="{}" stroke="{}" stroke-width="{}"/>"#,
            fmt_num(x),
            fmt_num(y),
            fmt_num(w),
            fmt_num(h),
            fmt_num(radius),
            fill.to_hex(),
            stroke.to_hex(),
            fmt_num(stroke_width)
        );
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: Color, stroke: Color, stroke_width: f64) {
        let _ = write!(
            self.body,
            r#"<circle cx="{}" cy="{}" r="{}" fill="{}" stroke="{}" stroke-width="{}"/>"#,
            fmt_num(cx),
            fmt_num(cy),
            fmt_num(r),
            fill.to_hex(),
            stroke.to_hex(),
            fmt_num(stroke_width)
        );
    }

    /// Horizontal arrow band: a rectangle shaft with a triangular head.
    pub fn arrow_band(&mut self, x1: f64, x2: f64, y: f64, thickness: f64, fill: Color) {
        let head = thickness * 1.5;
        let shaft_end = x2 - head;
        self.rect(x1, y - thickness / 2.0, (shaft_end - x1).max(0.0), thickness, fill);
        let _ = write!(
            self.body,
            r#"<polygon points="{},{} {},{} {},{}" fill="{}"/>"#,
            fmt_num(shaft_end),
            fmt_num(y - thickness),
            fmt_num(x2),
            fmt_num(y),
            fmt_num(shaft_end),
            fmt_num(y + thickness),
            fill.to_hex()
        );
    }

    /// Single line of text. `anchor` is an SVG `text-anchor` value.
    pub fn text(
        &mut self,
        x: f64,
        y: f64,
        content: &str,
        font_size_in: f64,
        fill: Color,
        bold: bool,
        anchor: &str,
    ) {
        let weight = if bold { r#" font-weight="bold""# } else { "" };
        let _ = write!(
            self.body,
            r#"<text x="{}" y="{}" font-size="{}" fill="{}" text-anchor="{}"{}>{}</text>"#,
            fmt_num(x),
            fmt_num(y),
            fmt_num(font_size_in),
            fill.to_hex(),
            anchor,
            weight,
            escape_xml(content)
        );
    }

    pub fn finish(self) -> String {
        format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" "#,
                r#"font-family="'Microsoft YaHei','PingFang SC',sans-serif">{body}</svg>"#
            ),
            w = fmt_num(self.width),
            h = fmt_num(self.height),
            body = self.body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_trimmed() {
        assert_eq!(fmt_num(4.2), "4.2");
        assert_eq!(fmt_num(12.0), "12");
        assert_eq!(fmt_num(0.6 + 12.1 / 2.0), "6.65");
        assert_eq!(fmt_num(-0.0), "0");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml(r#"<PD> & "PR""#), "&lt;PD&gt; &amp; &quot;PR&quot;");
    }

    #[test]
    fn document_has_viewbox_and_body() {
        let mut doc = SvgDoc::new(13.333, 7.5);
        doc.rect(0.0, 0.0, 1.0, 1.0, Color::rgb(255, 0, 0));
        let svg = doc.finish();
        assert!(svg.starts_with("<svg "));
        assert!(svg.contains(r#"viewBox="0 0 13.333 7.5""#));
        assert!(svg.contains(r##"fill="#ff0000""##));
        assert!(svg.ends_with("</svg>"));
    }
}
