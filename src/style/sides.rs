//! All-direction values: per-side quantities with CSS shorthand expansion.
//!
//! Border sizes, padding, and margins are specified independently for
//! top/right/bottom/left, with the usual shorthand rules for 1, 2, 3, or 4
//! space-separated components.

use crate::style::lexer::{lex, ValueToken};

/// Malformed directional shorthand string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed directional value: {0:?}")]
pub struct SidesFormatError(pub String);

/// A value specified per side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Sides<T> {
    pub top: T,
    pub right: T,
    pub bottom: T,
    pub left: T,
}

impl<T: Copy> Sides<T> {
    /// The same value on all four sides.
    pub const fn uniform(value: T) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Explicit per-side values in CSS order (top, right, bottom, left).
    pub const fn new(top: T, right: T, bottom: T, left: T) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// As a `(top, right, bottom, left)` tuple.
    pub const fn as_tuple(&self) -> (T, T, T, T) {
        (self.top, self.right, self.bottom, self.left)
    }

    /// Expand 1–4 components with CSS shorthand rules:
    /// 1 = all sides, 2 = vertical/horizontal, 3 = top/horizontal/bottom,
    /// 4 = top/right/bottom/left.
    pub fn expand(components: &[T]) -> Option<Self> {
        match components {
            [all] => Some(Self::uniform(*all)),
            [vertical, horizontal] => Some(Self::new(*vertical, *horizontal, *vertical, *horizontal)),
            [top, horizontal, bottom] => Some(Self::new(*top, *horizontal, *bottom, *horizontal)),
            [top, right, bottom, left] => Some(Self::new(*top, *right, *bottom, *left)),
            _ => None,
        }
    }
}

impl Sides<i32> {
    /// Whether every side is zero.
    pub fn is_zero(&self) -> bool {
        *self == Sides::uniform(0)
    }

    /// Parse a space-separated shorthand string, e.g. `"1 2 3 4"` or `"7"`.
    pub fn parse(input: &str) -> Result<Self, SidesFormatError> {
        let trimmed = input.trim();
        let tokens = lex(trimmed).ok_or_else(|| SidesFormatError(input.to_string()))?;
        let components: Vec<i32> = tokens
            .iter()
            .map(|(token, slice)| match token {
                ValueToken::Number => slice.parse::<i32>().ok(),
                _ => None,
            })
            .collect::<Option<_>>()
            .ok_or_else(|| SidesFormatError(input.to_string()))?;
        Self::expand(&components).ok_or_else(|| SidesFormatError(input.to_string()))
    }
}
