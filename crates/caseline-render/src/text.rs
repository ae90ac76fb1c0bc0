//! Width estimation and line wrapping without a font stack.
//!
//! Slide text is mostly CJK clinical shorthand, so wrapping has to work on
//! runs with no whitespace at all: the greedy word wrapper falls back to
//! per-character breaking whenever a single token is wider than the line.

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font size in points.
    pub font_size_pt: f64,
    pub bold: bool,
}

impl TextStyle {
    pub fn new(font_size_pt: f64) -> Self {
        Self {
            font_size_pt,
            bold: false,
        }
    }

    pub fn bold(font_size_pt: f64) -> Self {
        Self {
            font_size_pt,
            bold: true,
        }
    }

    /// Font size in slide inches.
    pub fn font_size_in(&self) -> f64 {
        self.font_size_pt / 72.0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
}

pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

/// Deterministic measurer: a terminal cell is half an em, so a CJK character
/// (two cells) measures one em and ASCII half an em. Close enough for card
/// wrapping and fully reproducible in CI.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub cell_width_factor: f64,
    pub line_height_factor: f64,
}

impl DeterministicTextMeasurer {
    fn cell_factor(&self) -> f64 {
        if self.cell_width_factor == 0.0 {
            0.5
        } else {
            self.cell_width_factor
        }
    }

    fn line_factor(&self) -> f64 {
        if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        }
    }
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let em = style.font_size_in().max(1.0 / 72.0);
        let cells = UnicodeWidthStr::width(text);
        TextMetrics {
            width: cells as f64 * em * self.cell_factor(),
            height: em * self.line_factor(),
        }
    }
}

fn break_wide_token(
    token: &str,
    max_width: f64,
    style: &TextStyle,
    measurer: &dyn TextMeasurer,
    out: &mut Vec<String>,
) {
    let mut buf = String::new();
    for ch in token.chars() {
        let mut candidate = buf.clone();
        candidate.push(ch);
        if !buf.is_empty() && measurer.measure(&candidate, style).width > max_width {
            out.push(std::mem::take(&mut buf));
            buf.push(ch);
        } else {
            buf = candidate;
        }
    }
    if !buf.is_empty() {
        out.push(buf);
    }
}

/// Greedy wrap at whitespace, breaking inside tokens wider than the line.
/// Always returns at least one line.
pub fn wrap_lines(
    text: &str,
    max_width: f64,
    style: &TextStyle,
    measurer: &dyn TextMeasurer,
) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw_line in text.split('\n') {
        let mut cur = String::new();
        for token in raw_line.split_whitespace() {
            let token_width = measurer.measure(token, style).width;
            if token_width > max_width {
                if !cur.is_empty() {
                    lines.push(std::mem::take(&mut cur));
                }
                let mut pieces = Vec::new();
                break_wide_token(token, max_width, style, measurer, &mut pieces);
                if let Some(tail) = pieces.pop() {
                    lines.extend(pieces);
                    cur = tail;
                }
                continue;
            }
            let candidate = if cur.is_empty() {
                token.to_string()
            } else {
                format!("{cur} {token}")
            };
            if measurer.measure(&candidate, style).width > max_width && !cur.is_empty() {
                lines.push(std::mem::take(&mut cur));
                cur = token.to_string();
            } else {
                cur = candidate;
            }
        }
        lines.push(cur);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> TextStyle {
        TextStyle::new(72.0) // 1 inch em: ASCII 0.5", CJK 1.0"
    }

    #[test]
    fn short_text_stays_on_one_line() {
        let m = DeterministicTextMeasurer::default();
        assert_eq!(wrap_lines("ab cd", 10.0, &style(), &m), vec!["ab cd"]);
    }

    #[test]
    fn wraps_at_whitespace() {
        let m = DeterministicTextMeasurer::default();
        let lines = wrap_lines("aa bb cc", 2.6, &style(), &m);
        assert_eq!(lines, vec!["aa bb", "cc"]);
    }

    #[test]
    fn breaks_unspaced_cjk_runs() {
        let m = DeterministicTextMeasurer::default();
        // Each CJK char is 1 inch wide at this style; 3 inch line -> 3 per line.
        let lines = wrap_lines("肝内多发新发转移灶", 3.0, &style(), &m);
        assert_eq!(lines, vec!["肝内多", "发新发", "转移灶"]);
    }

    #[test]
    fn empty_text_yields_one_empty_line() {
        let m = DeterministicTextMeasurer::default();
        assert_eq!(wrap_lines("", 3.0, &style(), &m), vec![""]);
    }

    #[test]
    fn newlines_are_hard_breaks() {
        let m = DeterministicTextMeasurer::default();
        assert_eq!(wrap_lines("ab\ncd", 10.0, &style(), &m), vec!["ab", "cd"]);
    }
}
