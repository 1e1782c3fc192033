//! Color values and the math the game is built on.
//!
//! - [`space`]: hex / HSL / CIE Lab conversions
//! - [`difference`]: CIEDE2000 perceptual distance

pub mod difference;
pub mod space;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

pub use difference::{ciede2000, distance};
pub use space::{hex_to_hsl, hex_to_lab, hsl_to_hex, Hsl, Lab};

/// An sRGB color, canonically written as lowercase `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `rrggbb` (case-insensitive). Surrounding whitespace
    /// is rejected, not trimmed.
    pub fn parse(input: &str) -> EngineResult<Self> {
        let digits = input.strip_prefix('#').unwrap_or(input);
        let bytes = digits.as_bytes();
        if bytes.len() != 6 {
            return Err(EngineError::InvalidColorFormat(input.to_string()));
        }

        let channel = |hi: u8, lo: u8| -> Option<u8> {
            let h = (hi as char).to_digit(16)?;
            let l = (lo as char).to_digit(16)?;
            Some((h << 4 | l) as u8)
        };

        match (
            channel(bytes[0], bytes[1]),
            channel(bytes[2], bytes[3]),
            channel(bytes[4], bytes[5]),
        ) {
            (Some(r), Some(g), Some(b)) => Ok(Self::new(r, g, b)),
            _ => Err(EngineError::InvalidColorFormat(input.to_string())),
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_hsl(self) -> Hsl {
        space::rgb_to_hsl(self)
    }

    pub fn from_hsl(hsl: Hsl) -> Self {
        space::hsl_to_rgb(hsl)
    }

    pub fn to_lab(self) -> Lab {
        space::rgb_to_lab(self)
    }

    /// Shift hue (wrapping) and saturation/lightness (clamped) in HSL space.
    pub fn adjust(self, hue: f64, saturation: f64, lightness: f64) -> Self {
        let hsl = self.to_hsl();
        Self::from_hsl(Hsl::new(
            hsl.h + hue,
            hsl.s + saturation,
            hsl.l + lightness,
        ))
    }

    /// Black or white, whichever reads better on top of this color.
    pub fn contrast_text(self) -> Self {
        let luma = 0.2126 * self.r as f64 + 0.7152 * self.g as f64 + 0.0722 * self.b as f64;
        if luma < 128.0 {
            Self::WHITE
        } else {
            Self::BLACK
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_mixed_case_and_optional_hash() {
        assert_eq!(Color::parse("#FF8000").unwrap(), Color::new(255, 128, 0));
        assert_eq!(Color::parse("ff8000").unwrap(), Color::new(255, 128, 0));
        assert_eq!(Color::parse("#aBcDeF").unwrap().to_hex(), "#abcdef");
    }

    #[test]
    fn test_parse_rejects_padded_input() {
        for padded in ["  #abcdef ", " abcdef", "#abcdef\n", "# abcdef"] {
            assert!(
                matches!(Color::parse(padded), Err(EngineError::InvalidColorFormat(_))),
                "{padded:?}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        for bad in ["", "#", "#fff", "#12345", "#1234567", "#gg0000", "red", "#12 456"] {
            let err = Color::parse(bad).unwrap_err();
            assert!(matches!(err, EngineError::InvalidColorFormat(_)), "{bad}");
        }
    }

    #[test]
    fn test_serde_uses_hex_string() {
        let json = serde_json::to_string(&Color::new(1, 2, 255)).unwrap();
        assert_eq!(json, "\"#0102ff\"");

        let parsed: Color = serde_json::from_str("\"#0102FF\"").unwrap();
        assert_eq!(parsed, Color::new(1, 2, 255));

        assert!(serde_json::from_str::<Color>("\"nope\"").is_err());
    }

    #[test]
    fn test_adjust_wraps_hue() {
        let red = Color::parse("#ff0000").unwrap();
        assert_eq!(red.adjust(60.0, 10.0, 0.0).to_hex(), "#ffff00");
        assert_eq!(red.adjust(-120.0, 0.0, 0.0).to_hex(), "#0000ff");
    }

    #[test]
    fn test_contrast_text() {
        assert_eq!(Color::parse("#000000").unwrap().contrast_text(), Color::WHITE);
        assert_eq!(Color::parse("#123456").unwrap().contrast_text(), Color::WHITE);
        assert_eq!(Color::parse("#ffffff").unwrap().contrast_text(), Color::BLACK);
        assert_eq!(Color::parse("#eeeeee").unwrap().contrast_text(), Color::BLACK);
    }
}
