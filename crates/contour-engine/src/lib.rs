//! Iso-contour extraction for gridded scalar fields.
//!
//! The engine triangulates a rectangular grid of samples into an adjacency
//! mesh, selects a sequence of z levels, traces each level's crossings into
//! ordered polylines, and finishes every polyline as-is or smoothed with a
//! natural cubic spline or a B-spline approximation.
//!
//! ```no_run
//! use contour_engine::{trace_field, ContourConfig};
//! use field_grid::Grid;
//!
//! let grid = Grid::from_z_values(&[0.0, 1.0, 1.0, 2.0], 2, 2)?;
//! let contours = trace_field(&grid, &ContourConfig::default());
//! for contour in &contours {
//!     println!("level {}: {} points", contour.level, contour.points.len());
//! }
//! # Ok::<(), field_grid::GridError>(())
//! ```

pub mod bspline;
pub mod config;
pub mod engine;
pub mod error;
pub mod finish;
pub mod levels;
pub mod mesh;
pub mod spline;
pub mod trace;

pub use config::{ContourConfig, InterpolationKind, LevelSelection};
pub use engine::{trace_field, ContourLine, ContourPoint};
pub use error::{SplineError, TraceError};
