//! Gridded scalar field input model for contour extraction.
//!
//! A field is a rectangular grid of 3-D sample points, stored row-major as a
//! sequence of rows of equal length. Each point carries a validity tag so
//! that missing or clipped samples can be skipped without restructuring the
//! grid.

pub mod error;
pub mod range;
pub mod types;

pub use error::{GridError, Result};
pub use range::GridRange;
pub use types::{Grid, GridRow, PointKind, SamplePoint};
