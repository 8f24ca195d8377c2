/*!
Attribute values.

Values are what attribute reads return and what filters compare against:
text, numbers, booleans, geometry, references to other elements, and lists
of any of those. `R` is the platform's element reference type, so a value
can point at another node (`AXTitleUIElement`, `AXChildren`).
*/

#![allow(missing_docs)]

use crate::types::{Bounds, Point, Size, TextRange};
use serde::{Deserialize, Serialize};

/// RGBA color with float components (0.0-1.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
  /// Red component (0.0-1.0)
  pub r: f64,
  /// Green component (0.0-1.0)
  pub g: f64,
  /// Blue component (0.0-1.0)
  pub b: f64,
  /// Alpha/opacity component (0.0-1.0)
  pub a: f64,
}

impl Color {
  /// Create a color from RGBA components.
  pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
    Self { r, g, b, a }
  }

  /// Create an opaque color (alpha = 1.0).
  pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
    Self { r, g, b, a: 1.0 }
  }
}

/// Typed value of an attribute.
///
/// Equality is structural, which is exactly what search filters use:
/// `Value::from("Finder") == Value::String("Finder".into())`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value<R> {
  /// Attribute present but empty.
  Null,
  String(String),
  /// Integers are stored as whole f64 values.
  Number(f64),
  Boolean(bool),
  Color(Color),
  Point(Point),
  Size(Size),
  Bounds(Bounds),
  Range(TextRange),
  /// Reference to another element in the tree.
  Element(R),
  Array(Vec<Value<R>>),
}

/// Discriminant of a [`Value`], for error messages and dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
  Null,
  String,
  Number,
  Boolean,
  Color,
  Point,
  Size,
  Bounds,
  Range,
  Element,
  Array,
}

impl<R> Value<R> {
  /// Get as string reference if this is a String value.
  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::String(s) => Some(s),
      Self::Null
      | Self::Number(_)
      | Self::Boolean(_)
      | Self::Color(_)
      | Self::Point(_)
      | Self::Size(_)
      | Self::Bounds(_)
      | Self::Range(_)
      | Self::Element(_)
      | Self::Array(_) => None,
    }
  }

  /// Get as f64 if this is a Number value.
  pub const fn as_f64(&self) -> Option<f64> {
    match self {
      Self::Number(n) => Some(*n),
      Self::Null
      | Self::String(_)
      | Self::Boolean(_)
      | Self::Color(_)
      | Self::Point(_)
      | Self::Size(_)
      | Self::Bounds(_)
      | Self::Range(_)
      | Self::Element(_)
      | Self::Array(_) => None,
    }
  }

  /// Get as i64 (truncated) if this is a Number value.
  #[allow(clippy::cast_possible_truncation)] // Intentional: caller expects truncation
  pub const fn as_i64(&self) -> Option<i64> {
    match self {
      Self::Number(n) => Some(*n as i64),
      Self::Null
      | Self::String(_)
      | Self::Boolean(_)
      | Self::Color(_)
      | Self::Point(_)
      | Self::Size(_)
      | Self::Bounds(_)
      | Self::Range(_)
      | Self::Element(_)
      | Self::Array(_) => None,
    }
  }

  /// Get as bool if this is a Boolean value.
  pub const fn as_bool(&self) -> Option<bool> {
    match self {
      Self::Boolean(b) => Some(*b),
      Self::Null
      | Self::String(_)
      | Self::Number(_)
      | Self::Color(_)
      | Self::Point(_)
      | Self::Size(_)
      | Self::Bounds(_)
      | Self::Range(_)
      | Self::Element(_)
      | Self::Array(_) => None,
    }
  }

  /// Get as Color if this is a Color value.
  pub const fn as_color(&self) -> Option<Color> {
    match self {
      Self::Color(c) => Some(*c),
      Self::Null
      | Self::String(_)
      | Self::Number(_)
      | Self::Boolean(_)
      | Self::Point(_)
      | Self::Size(_)
      | Self::Bounds(_)
      | Self::Range(_)
      | Self::Element(_)
      | Self::Array(_) => None,
    }
  }

  /// Get as Point if this is a Point value.
  pub const fn as_point(&self) -> Option<Point> {
    match self {
      Self::Point(p) => Some(*p),
      Self::Null
      | Self::String(_)
      | Self::Number(_)
      | Self::Boolean(_)
      | Self::Color(_)
      | Self::Size(_)
      | Self::Bounds(_)
      | Self::Range(_)
      | Self::Element(_)
      | Self::Array(_) => None,
    }
  }

  /// Get as Size if this is a Size value.
  pub const fn as_size(&self) -> Option<Size> {
    match self {
      Self::Size(s) => Some(*s),
      Self::Null
      | Self::String(_)
      | Self::Number(_)
      | Self::Boolean(_)
      | Self::Color(_)
      | Self::Point(_)
      | Self::Bounds(_)
      | Self::Range(_)
      | Self::Element(_)
      | Self::Array(_) => None,
    }
  }

  /// Get as Bounds if this is a Bounds value.
  pub const fn as_bounds(&self) -> Option<Bounds> {
    match self {
      Self::Bounds(b) => Some(*b),
      Self::Null
      | Self::String(_)
      | Self::Number(_)
      | Self::Boolean(_)
      | Self::Color(_)
      | Self::Point(_)
      | Self::Size(_)
      | Self::Range(_)
      | Self::Element(_)
      | Self::Array(_) => None,
    }
  }

  /// Get as text range if this is a Range value.
  pub const fn as_range(&self) -> Option<TextRange> {
    match self {
      Self::Range(r) => Some(*r),
      Self::Null
      | Self::String(_)
      | Self::Number(_)
      | Self::Boolean(_)
      | Self::Color(_)
      | Self::Point(_)
      | Self::Size(_)
      | Self::Bounds(_)
      | Self::Element(_)
      | Self::Array(_) => None,
    }
  }

  /// Get the referenced element if this is an Element value.
  pub const fn as_element(&self) -> Option<&R> {
    match self {
      Self::Element(r) => Some(r),
      Self::Null
      | Self::String(_)
      | Self::Number(_)
      | Self::Boolean(_)
      | Self::Color(_)
      | Self::Point(_)
      | Self::Size(_)
      | Self::Bounds(_)
      | Self::Range(_)
      | Self::Array(_) => None,
    }
  }

  /// Get the items if this is an Array value.
  pub fn as_array(&self) -> Option<&[Self]> {
    match self {
      Self::Array(items) => Some(items),
      Self::Null
      | Self::String(_)
      | Self::Number(_)
      | Self::Boolean(_)
      | Self::Color(_)
      | Self::Point(_)
      | Self::Size(_)
      | Self::Bounds(_)
      | Self::Range(_)
      | Self::Element(_) => None,
    }
  }

  /// Whether the attribute is present but empty.
  pub const fn is_null(&self) -> bool {
    matches!(self, Self::Null)
  }

  /// Take the referenced element if this is an Element value.
  pub fn into_element(self) -> Option<R> {
    match self {
      Self::Element(r) => Some(r),
      Self::Null
      | Self::String(_)
      | Self::Number(_)
      | Self::Boolean(_)
      | Self::Color(_)
      | Self::Point(_)
      | Self::Size(_)
      | Self::Bounds(_)
      | Self::Range(_)
      | Self::Array(_) => None,
    }
  }

  /// Element references held directly or inside an array, in order.
  ///
  /// Non-element array members are skipped.
  pub fn into_elements(self) -> Vec<R> {
    match self {
      Self::Element(r) => vec![r],
      Self::Array(items) => items.into_iter().filter_map(Self::into_element).collect(),
      Self::Null
      | Self::String(_)
      | Self::Number(_)
      | Self::Boolean(_)
      | Self::Color(_)
      | Self::Point(_)
      | Self::Size(_)
      | Self::Bounds(_)
      | Self::Range(_) => Vec::new(),
    }
  }

  /// Convert element references, keeping everything else.
  pub fn map_elements<S>(self, mut f: impl FnMut(R) -> S) -> Value<S> {
    self.map_elements_with(&mut f)
  }

  fn map_elements_with<S>(self, f: &mut impl FnMut(R) -> S) -> Value<S> {
    match self {
      Self::Null => Value::Null,
      Self::String(s) => Value::String(s),
      Self::Number(n) => Value::Number(n),
      Self::Boolean(b) => Value::Boolean(b),
      Self::Color(c) => Value::Color(c),
      Self::Point(p) => Value::Point(p),
      Self::Size(s) => Value::Size(s),
      Self::Bounds(b) => Value::Bounds(b),
      Self::Range(r) => Value::Range(r),
      Self::Element(r) => Value::Element(f(r)),
      Self::Array(items) => Value::Array(
        items
          .into_iter()
          .map(|item| item.map_elements_with(f))
          .collect(),
      ),
    }
  }

  /// Discriminant of this value.
  pub const fn value_type(&self) -> ValueType {
    match self {
      Self::Null => ValueType::Null,
      Self::String(_) => ValueType::String,
      Self::Number(_) => ValueType::Number,
      Self::Boolean(_) => ValueType::Boolean,
      Self::Color(_) => ValueType::Color,
      Self::Point(_) => ValueType::Point,
      Self::Size(_) => ValueType::Size,
      Self::Bounds(_) => ValueType::Bounds,
      Self::Range(_) => ValueType::Range,
      Self::Element(_) => ValueType::Element,
      Self::Array(_) => ValueType::Array,
    }
  }
}

impl<R> From<String> for Value<R> {
  fn from(s: String) -> Self {
    Self::String(s)
  }
}

impl<R> From<&str> for Value<R> {
  fn from(s: &str) -> Self {
    Self::String(s.to_owned())
  }
}

impl<R> From<f64> for Value<R> {
  fn from(n: f64) -> Self {
    Self::Number(n)
  }
}

impl<R> From<i32> for Value<R> {
  fn from(n: i32) -> Self {
    Self::Number(f64::from(n))
  }
}

impl<R> From<i64> for Value<R> {
  #[allow(clippy::cast_precision_loss)] // Acceptable: i64 range rarely needs full precision
  fn from(n: i64) -> Self {
    Self::Number(n as f64)
  }
}

impl<R> From<bool> for Value<R> {
  fn from(b: bool) -> Self {
    Self::Boolean(b)
  }
}

impl<R> From<Color> for Value<R> {
  fn from(c: Color) -> Self {
    Self::Color(c)
  }
}

impl<R> From<Point> for Value<R> {
  fn from(p: Point) -> Self {
    Self::Point(p)
  }
}

impl<R> From<Size> for Value<R> {
  fn from(s: Size) -> Self {
    Self::Size(s)
  }
}

impl<R> From<Bounds> for Value<R> {
  fn from(b: Bounds) -> Self {
    Self::Bounds(b)
  }
}

impl<R> From<TextRange> for Value<R> {
  fn from(r: TextRange) -> Self {
    Self::Range(r)
  }
}

impl<R, T: Into<Self>> From<Vec<T>> for Value<R> {
  fn from(items: Vec<T>) -> Self {
    Self::Array(items.into_iter().map(Into::into).collect())
  }
}


#[cfg(test)]
mod proptests {
  use super::*;
  use proptest::prelude::*;

  proptest! {
    /// String values roundtrip through as_str
    #[test]
    fn string_roundtrip(s in ".*") {
      let v = Value::<u32>::from(s.clone());
      prop_assert_eq!(v.as_str(), Some(s.as_str()));
    }

    /// String values are never confused with other types
    #[test]
    fn string_type_exclusivity(s in ".*") {
      let v = Value::<u32>::from(s);
      prop_assert_eq!(v.value_type(), ValueType::String);
      prop_assert!(v.as_f64().is_none());
      prop_assert!(v.as_bool().is_none());
      prop_assert!(v.as_element().is_none());
    }
  }
}
