/*! Core types for axnav. */

#![allow(missing_docs)]

mod error;
mod geometry;
mod ids;

pub use error::{AxnavError, AxnavResult};
pub use geometry::{Bounds, Point, Size, TextRange};
pub use ids::ProcessId;
