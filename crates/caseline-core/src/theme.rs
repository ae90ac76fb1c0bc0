use serde::{Deserialize, Serialize};

/// Opaque sRGB color carried through layout output and into the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rgb` or `#rrggbb` (leading `#` optional).
    pub fn parse_hex(s: &str) -> Option<Self> {
        let s = s.trim();
        let hex = s.strip_prefix('#').unwrap_or(s);
        if !hex.is_ascii() {
            return None;
        }
        let (r, g, b) = match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
                let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
                let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
                (r, g, b)
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                (r, g, b)
            }
            _ => return None,
        };
        Some(Self { r, g, b })
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Deck brand colors, injected into the layout engine and renderer.
///
/// Kept as a plain value object so the engine stays a pure function and tests
/// can assert exact colors without a rendering context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    /// Brand accent; the neutral node color.
    pub primary: Color,
    /// Secondary accent used for marker-value text on content slides.
    pub accent: Color,
    /// Progression / recurrence nodes.
    pub alert: Color,
    /// Response / stable-disease evaluation nodes.
    pub favorable: Color,
    /// Main axis band.
    pub axis: Color,
    /// Card background.
    pub card_fill: Color,
    /// Card body text.
    pub card_text: Color,
    /// Marker outline and cover/headers text.
    pub white: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: Color::rgb(115, 21, 40),
            accent: Color::rgb(0, 51, 102),
            alert: Color::rgb(220, 50, 50),
            favorable: Color::rgb(46, 139, 87),
            axis: Color::rgb(220, 220, 220),
            card_fill: Color::rgb(250, 250, 250),
            card_text: Color::rgb(30, 30, 30),
            white: Color::rgb(255, 255, 255),
        }
    }
}
