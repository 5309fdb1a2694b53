//! Color values and their textual/numeric encodings.
//!
//! Style declarations accept colors as `#rgb`, `#rgba`, `#rrggbb`,
//! `#aarrggbb`, decimal `"r g b"` / `"r g b a"`, CSS color names, or a packed
//! 32-bit ARGB integer. Parsing is case-insensitive and whitespace-trimmed;
//! anything malformed is a [`ColorFormatError`] surfaced to the caller
//! immediately.

use crate::style::lexer::{lex, ValueToken};

/// Malformed color string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed color value: {0:?}")]
pub struct ColorFormatError(pub String);

/// An RGBA color with 8-bit channels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Opaque color from RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color from RGBA channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Unpack a 32-bit ARGB integer (`0xAARRGGBB`).
    pub const fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    /// Pack into a 32-bit ARGB integer (`0xAARRGGBB`).
    pub const fn to_argb(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    /// Normalized RGBA channels in 0.0..=1.0, the shape GPU color buffers take.
    pub fn to_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    /// Parse a textual color encoding.
    pub fn parse(input: &str) -> Result<Self, ColorFormatError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ColorFormatError(input.to_string()));
        }

        let tokens = lex(trimmed).ok_or_else(|| ColorFormatError(input.to_string()))?;
        match tokens.as_slice() {
            [(ValueToken::HexColor, slice)] => {
                parse_hex(&slice[1..]).ok_or_else(|| ColorFormatError(input.to_string()))
            }
            [(ValueToken::Ident, slice)] => {
                named(&slice.to_ascii_lowercase()).ok_or_else(|| ColorFormatError(input.to_string()))
            }
            numbers if !numbers.is_empty()
                && numbers.iter().all(|(t, _)| *t == ValueToken::Number) =>
            {
                parse_decimal(numbers).ok_or_else(|| ColorFormatError(input.to_string()))
            }
            _ => Err(ColorFormatError(input.to_string())),
        }
    }
}

/// Parse the hex digits after `#`. Supports 3/4-digit shorthand (each digit
/// doubled) and 6/8-digit forms; 8 digits are `AARRGGBB`.
fn parse_hex(digits: &str) -> Option<Color> {
    let expand = |d: u8| d << 4 | d;
    let nibble = |c: char| c.to_digit(16).map(|d| d as u8);
    let chars: Vec<u8> = digits.chars().map(nibble).collect::<Option<_>>()?;

    match chars.as_slice() {
        [r, g, b] => Some(Color::rgb(expand(*r), expand(*g), expand(*b))),
        [r, g, b, a] => Some(Color::rgba(expand(*r), expand(*g), expand(*b), expand(*a))),
        [r1, r2, g1, g2, b1, b2] => {
            Some(Color::rgb(*r1 << 4 | *r2, *g1 << 4 | *g2, *b1 << 4 | *b2))
        }
        [a1, a2, r1, r2, g1, g2, b1, b2] => Some(Color::rgba(
            *r1 << 4 | *r2,
            *g1 << 4 | *g2,
            *b1 << 4 | *b2,
            *a1 << 4 | *a2,
        )),
        _ => None,
    }
}

/// Parse `"r g b"` / `"r g b a"` decimal channel lists.
fn parse_decimal(tokens: &[(ValueToken, &str)]) -> Option<Color> {
    let channel = |s: &str| s.parse::<u16>().ok().filter(|v| *v <= 255).map(|v| v as u8);
    let values: Vec<u8> = tokens
        .iter()
        .map(|(_, slice)| channel(slice))
        .collect::<Option<_>>()?;
    match values.as_slice() {
        [r, g, b] => Some(Color::rgb(*r, *g, *b)),
        [r, g, b, a] => Some(Color::rgba(*r, *g, *b, *a)),
        _ => None,
    }
}

/// CSS named colors (the common keyword set).
fn named(name: &str) -> Option<Color> {
    let color = match name {
        "transparent" => Color::TRANSPARENT,
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "red" => Color::rgb(255, 0, 0),
        "lime" => Color::rgb(0, 255, 0),
        "blue" => Color::rgb(0, 0, 255),
        "yellow" => Color::rgb(255, 255, 0),
        "cyan" | "aqua" => Color::rgb(0, 255, 255),
        "magenta" | "fuchsia" => Color::rgb(255, 0, 255),
        "green" => Color::rgb(0, 128, 0),
        "maroon" => Color::rgb(128, 0, 0),
        "navy" => Color::rgb(0, 0, 128),
        "olive" => Color::rgb(128, 128, 0),
        "purple" => Color::rgb(128, 0, 128),
        "teal" => Color::rgb(0, 128, 128),
        "silver" => Color::rgb(192, 192, 192),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        "orange" => Color::rgb(255, 165, 0),
        _ => return None,
    };
    Some(color)
}
