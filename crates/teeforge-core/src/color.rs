//! Garment colors.

use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Color errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("Invalid color value: {0}")]
    InvalidHex(String),
    #[error("Color not available for this product: {0}")]
    NotAvailable(String),
}

/// A parsed `#rrggbb` / `#rgb` / `#rrggbbaa` color value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl HexColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse a CSS hex color. The leading `#` is optional.
    pub fn parse(value: &str) -> Result<Self, ColorError> {
        let invalid = || ColorError::InvalidHex(value.to_string());
        let digits = value.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match digits.len() {
            3 => {
                let expand = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
                Ok(Self::new(expand(0)?, expand(1)?, expand(2)?))
            }
            6 | 8 => {
                let mut color = Self::new(
                    channel(&digits[0..2])?,
                    channel(&digits[2..4])?,
                    channel(&digits[4..6])?,
                );
                if digits.len() == 8 {
                    color.a = channel(&digits[6..8])?;
                }
                Ok(color)
            }
            _ => Err(invalid()),
        }
    }

    /// Convert to a renderer color.
    pub fn to_color(self) -> Color {
        Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

impl From<Color> for HexColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

/// A named color a product is offered in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarmentColor {
    /// Display name ("Dark Grey").
    pub name: String,
    /// Color value as entered by the seller.
    pub hex: String,
}

impl GarmentColor {
    pub fn new(name: impl Into<String>, hex: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hex: hex.into(),
        }
    }

    /// Parsed color value.
    pub fn value(&self) -> Result<HexColor, ColorError> {
        HexColor::parse(&self.hex)
    }
}

/// Palette offered to sellers when listing a product.
pub const SWATCHES: [(&str, &str); 8] = [
    ("White", "#FFFFFF"),
    ("Ash", "#F3F4F6"),
    ("Silver", "#E5E7EB"),
    ("Dark Grey", "#4B5563"),
    ("Black", "#1F2937"),
    ("Red", "#EF4444"),
    ("Mauve", "#D1D5DB"),
    ("Brown", "#7C3AED"),
];

/// The swatch palette as garment colors.
pub fn swatches() -> Vec<GarmentColor> {
    SWATCHES
        .iter()
        .map(|(name, hex)| GarmentColor::new(*name, *hex))
        .collect()
}

/// Toggle a swatch in a seller's selection by name.
pub fn toggle_color(selection: &mut Vec<GarmentColor>, color: &GarmentColor) {
    if let Some(pos) = selection.iter().position(|c| c.name == color.name) {
        selection.remove(pos);
    } else {
        selection.push(color.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_and_short() {
        assert_eq!(HexColor::parse("#EF4444"), Ok(HexColor::new(0xef, 0x44, 0x44)));
        assert_eq!(HexColor::parse("fff"), Ok(HexColor::new(255, 255, 255)));
        let translucent = HexColor::parse("#00000080").unwrap();
        assert_eq!(translucent.a, 0x80);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(HexColor::parse("#12345").is_err());
        assert!(HexColor::parse("#gg0000").is_err());
        assert!(HexColor::parse("").is_err());
    }

    #[test]
    fn test_display_normalizes() {
        assert_eq!(HexColor::parse("#1F2937").unwrap().to_string(), "#1f2937");
        assert_eq!(HexColor::parse("#abc").unwrap().to_string(), "#aabbcc");
    }

    #[test]
    fn test_peniko_roundtrip() {
        let hex = HexColor::new(0x4b, 0x55, 0x63);
        assert_eq!(HexColor::from(hex.to_color()), hex);
    }

    #[test]
    fn test_toggle_color() {
        let palette = swatches();
        let mut selection = Vec::new();
        toggle_color(&mut selection, &palette[0]);
        toggle_color(&mut selection, &palette[5]);
        assert_eq!(selection.len(), 2);
        toggle_color(&mut selection, &palette[0]);
        assert_eq!(selection, vec![palette[5].clone()]);
    }
}
