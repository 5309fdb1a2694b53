//! StyleValue: the closed tagged variant stored in resolved style properties.
//!
//! Every resolved style property holds one of these shapes. Conversions
//! between stored and requested kinds are explicit per kind (bool→int,
//! color→packed ARGB int, sides→tuple, …) and fail with a [`CastError`] for
//! anything else — a deliberately narrow contract, not reflection-driven
//! coercion.

use crate::style::color::Color;
use crate::style::sides::Sides;

/// Line rendering style for borders and rectangle outlines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LineKind {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Requesting a style property as an incompatible type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot convert style value of kind {found} to {requested}")]
pub struct CastError {
    pub found: &'static str,
    pub requested: &'static str,
}

/// A style property value.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Int(i32),
    Bool(bool),
    Str(String),
    Color(Color),
    Sides(Sides<i32>),
    Line(LineKind),
}

impl StyleValue {
    /// The kind name, used in cast-error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            StyleValue::Int(_) => "int",
            StyleValue::Bool(_) => "bool",
            StyleValue::Str(_) => "string",
            StyleValue::Color(_) => "color",
            StyleValue::Sides(_) => "sides",
            StyleValue::Line(_) => "line",
        }
    }

    fn cast_error(&self, requested: &'static str) -> CastError {
        CastError {
            found: self.kind(),
            requested,
        }
    }
}

/// Conversion from a stored [`StyleValue`] into a concrete type.
///
/// `Default` doubles as the zero value returned when a property has neither
/// an explicit value nor a seeded default.
pub trait FromStyleValue: Sized + Default {
    fn from_style_value(value: &StyleValue) -> Result<Self, CastError>;
}

impl FromStyleValue for i32 {
    fn from_style_value(value: &StyleValue) -> Result<Self, CastError> {
        match value {
            StyleValue::Int(v) => Ok(*v),
            StyleValue::Bool(v) => Ok(i32::from(*v)),
            // Packed ARGB, bit-preserving.
            StyleValue::Color(c) => Ok(c.to_argb() as i32),
            other => Err(other.cast_error("int")),
        }
    }
}

impl FromStyleValue for bool {
    fn from_style_value(value: &StyleValue) -> Result<Self, CastError> {
        match value {
            StyleValue::Bool(v) => Ok(*v),
            StyleValue::Int(v) => Ok(*v != 0),
            other => Err(other.cast_error("bool")),
        }
    }
}

impl FromStyleValue for String {
    fn from_style_value(value: &StyleValue) -> Result<Self, CastError> {
        match value {
            StyleValue::Str(v) => Ok(v.clone()),
            other => Err(other.cast_error("string")),
        }
    }
}

impl FromStyleValue for Color {
    fn from_style_value(value: &StyleValue) -> Result<Self, CastError> {
        match value {
            StyleValue::Color(v) => Ok(*v),
            StyleValue::Int(v) => Ok(Color::from_argb(*v as u32)),
            other => Err(other.cast_error("color")),
        }
    }
}

impl FromStyleValue for Sides<i32> {
    fn from_style_value(value: &StyleValue) -> Result<Self, CastError> {
        match value {
            StyleValue::Sides(v) => Ok(*v),
            StyleValue::Int(v) => Ok(Sides::uniform(*v)),
            other => Err(other.cast_error("sides")),
        }
    }
}

impl FromStyleValue for (i32, i32, i32, i32) {
    fn from_style_value(value: &StyleValue) -> Result<Self, CastError> {
        let sides = Sides::from_style_value(value)?;
        Ok(sides.as_tuple())
    }
}

impl FromStyleValue for LineKind {
    fn from_style_value(value: &StyleValue) -> Result<Self, CastError> {
        match value {
            StyleValue::Line(v) => Ok(*v),
            other => Err(other.cast_error("line")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_from_int() {
        assert_eq!(i32::from_style_value(&StyleValue::Int(42)), Ok(42));
    }

    #[test]
    fn int_from_bool() {
        assert_eq!(i32::from_style_value(&StyleValue::Bool(true)), Ok(1));
        assert_eq!(i32::from_style_value(&StyleValue::Bool(false)), Ok(0));
    }

    #[test]
    fn int_from_color_is_packed_argb() {
        let value = StyleValue::Color(Color::rgb(255, 0, 0));
        assert_eq!(i32::from_style_value(&value), Ok(0xffff0000u32 as i32));
    }

    #[test]
    fn bool_from_int() {
        assert_eq!(bool::from_style_value(&StyleValue::Int(0)), Ok(false));
        assert_eq!(bool::from_style_value(&StyleValue::Int(3)), Ok(true));
    }

    #[test]
    fn color_from_packed_int() {
        let value = StyleValue::Int(0xffff0000u32 as i32);
        assert_eq!(
            Color::from_style_value(&value),
            Ok(Color::rgb(255, 0, 0))
        );
    }

    #[test]
    fn sides_from_uniform_int() {
        assert_eq!(
            Sides::from_style_value(&StyleValue::Int(5)),
            Ok(Sides::uniform(5))
        );
    }

    #[test]
    fn tuple_from_sides() {
        let value = StyleValue::Sides(Sides::new(1, 2, 3, 4));
        assert_eq!(
            <(i32, i32, i32, i32)>::from_style_value(&value),
            Ok((1, 2, 3, 4))
        );
    }

    #[test]
    fn unsupported_cast_fails() {
        let err = String::from_style_value(&StyleValue::Int(1)).unwrap_err();
        assert_eq!(err.found, "int");
        assert_eq!(err.requested, "string");

        assert!(LineKind::from_style_value(&StyleValue::Bool(true)).is_err());
        assert!(Color::from_style_value(&StyleValue::Str("red".into())).is_err());
    }

    #[test]
    fn kind_names() {
        assert_eq!(StyleValue::Int(0).kind(), "int");
        assert_eq!(StyleValue::Line(LineKind::Dashed).kind(), "line");
    }
}
