//! Error types for grid construction.

use thiserror::Error;

/// Errors that can occur while assembling a sample grid.
#[derive(Error, Debug)]
pub enum GridError {
    /// The grid contains no rows at all.
    #[error("grid has no rows")]
    Empty,

    /// A row is shorter than the two points needed to form an edge.
    #[error("row {row} has {len} points, need at least 2")]
    RowTooShort { row: usize, len: usize },

    /// Rows do not all have the same length.
    #[error("row {row} has {len} points, expected {expected}")]
    RaggedRows {
        row: usize,
        len: usize,
        expected: usize,
    },

    /// A flat value buffer does not match the stated dimensions.
    #[error("got {len} values for a {width}x{height} grid")]
    SizeMismatch {
        len: usize,
        width: usize,
        height: usize,
    },
}

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
