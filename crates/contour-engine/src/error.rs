//! Error types for the contour engine.
//!
//! All of these are soft failures: a trace error abandons the current
//! level's remaining contours, a spline error drops a single contour.
//! Neither aborts the whole contouring call, and output already produced
//! for earlier levels is always kept.

use thiserror::Error;

/// Mesh inconsistencies hit while tracing one level.
#[derive(Error, Debug)]
pub enum TraceError {
    /// A walk could not find an active continuation edge in the next
    /// triangle. The partial polyline is discarded.
    #[error("unexpected end of contour: no active continuation edge")]
    UnexpectedEnd,

    /// Closed-mode seed scan found no interior active edge although the
    /// active count is still nonzero.
    #[error("no contour found: {remaining} active edges but no interior seed")]
    NoInteriorSeed { remaining: usize },
}

/// Numerical failure in the cubic-spline solver.
#[derive(Error, Debug)]
pub enum SplineError {
    /// The (cyclic) tri-diagonal system for the second derivatives is not
    /// positive definite, so no spline exists for this contour.
    #[error("tri-diagonal spline system of size {n} is not positive definite")]
    NotPositiveDefinite { n: usize },
}
