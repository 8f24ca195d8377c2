/*! Geometry types carried by attribute values (positions, sizes, frames, ranges). */

use serde::{Deserialize, Serialize};

/// A 2D point in screen coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

impl Point {
  pub const fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }
}

/// Width and height in points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Size {
  pub w: f64,
  pub h: f64,
}

impl Size {
  pub const fn new(w: f64, h: f64) -> Self {
    Self { w, h }
  }
}

/// Rectangle bounds in screen coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
  pub x: f64,
  pub y: f64,
  pub w: f64,
  pub h: f64,
}

impl Bounds {
  /// Build bounds from an origin and a size.
  pub const fn from_parts(origin: Point, size: Size) -> Self {
    Self {
      x: origin.x,
      y: origin.y,
      w: size.w,
      h: size.h,
    }
  }

  pub const fn origin(&self) -> Point {
    Point::new(self.x, self.y)
  }

  pub const fn size(&self) -> Size {
    Size::new(self.w, self.h)
  }

  /// Check if a point is contained within these bounds.
  pub fn contains(&self, point: Point) -> bool {
    point.x >= self.x
      && point.x <= self.x + self.w
      && point.y >= self.y
      && point.y <= self.y + self.h
  }

  /// Center of the rectangle, e.g. for clicking an element.
  pub fn center(&self) -> Point {
    Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
  }
}

/// Character range within text. End is exclusive, matching Rust's `Range` semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRange {
  /// Start position (inclusive).
  pub start: u32,
  /// End position (exclusive).
  pub end: u32,
}

impl TextRange {
  pub const fn new(start: u32, end: u32) -> Self {
    Self { start, end }
  }

  /// Length of the range in characters.
  pub const fn len(&self) -> u32 {
    self.end.saturating_sub(self.start)
  }

  /// Check if the range is empty (cursor position, no selection).
  pub const fn is_empty(&self) -> bool {
    self.start >= self.end
  }
}

impl From<(u32, u32)> for TextRange {
  fn from((start, end): (u32, u32)) -> Self {
    Self { start, end }
  }
}
