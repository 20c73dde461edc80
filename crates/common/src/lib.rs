//! Common types shared by the viewport tracking crates.

pub mod error;
pub mod geometry;

pub use error::{ViewportError, ViewportResult};
pub use geometry::{EdgeSizes, Point, Rect, ScrollPosition, Size};
