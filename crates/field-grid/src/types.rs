//! Core types for gridded scalar fields.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Validity of a single grid sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointKind {
    /// No usable value at this grid position.
    Undefined,
    /// Valid sample inside the plotted range.
    InRange,
    /// Valid sample, but outside the plotted range.
    OutRange,
}

/// One sample of the scalar field: a 3-D position plus validity tag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub kind: PointKind,
}

impl SamplePoint {
    /// Create an in-range sample.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            kind: PointKind::InRange,
        }
    }

    /// Create a sample with no usable value.
    pub fn undefined(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            kind: PointKind::Undefined,
        }
    }

    /// Create a valid sample that lies outside the plotted range.
    pub fn out_of_range(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            kind: PointKind::OutRange,
        }
    }

    /// True if both this point and `other` are usable edge endpoints.
    pub fn is_in_range(&self) -> bool {
        self.kind == PointKind::InRange
    }
}

/// One row of the input grid (an "iso-curve" in plotting terms).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridRow {
    points: Vec<SamplePoint>,
}

impl GridRow {
    pub fn new(points: Vec<SamplePoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[SamplePoint] {
        &self.points
    }
}

/// A validated rectangular grid of samples, stored row-major.
///
/// Every row has the same length (at least 2 points) and there is at least
/// one row. Contouring indexes points by `(row, col)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    rows: Vec<GridRow>,
    row_len: usize,
}

impl Grid {
    /// Validate and assemble a grid from its rows.
    pub fn new(rows: Vec<GridRow>) -> Result<Self> {
        let first = rows.first().ok_or(GridError::Empty)?;
        let row_len = first.len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() < 2 {
                return Err(GridError::RowTooShort {
                    row: i,
                    len: row.len(),
                });
            }
            if row.len() != row_len {
                return Err(GridError::RaggedRows {
                    row: i,
                    len: row.len(),
                    expected: row_len,
                });
            }
        }
        Ok(Self { rows, row_len })
    }

    /// Build a grid from a row-major slice of z values at integer (x, y).
    ///
    /// Convenience for tests and callers with plain raster data; NaN z
    /// becomes an `Undefined` sample.
    pub fn from_z_values(values: &[f64], width: usize, height: usize) -> Result<Self> {
        if values.len() != width * height {
            return Err(GridError::SizeMismatch {
                len: values.len(),
                width,
                height,
            });
        }
        let rows = (0..height)
            .map(|r| {
                GridRow::new(
                    (0..width)
                        .map(|c| {
                            let z = values[r * width + c];
                            if z.is_nan() {
                                SamplePoint::undefined(c as f64, r as f64)
                            } else {
                                SamplePoint::new(c as f64, r as f64, z)
                            }
                        })
                        .collect(),
                )
            })
            .collect();
        Self::new(rows)
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Points per row.
    pub fn row_len(&self) -> usize {
        self.row_len
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    pub fn point(&self, row: usize, col: usize) -> &SamplePoint {
        &self.rows[row].points[col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(zs: &[f64], y: f64) -> GridRow {
        GridRow::new(
            zs.iter()
                .enumerate()
                .map(|(i, &z)| SamplePoint::new(i as f64, y, z))
                .collect(),
        )
    }

    #[test]
    fn test_grid_validation() {
        assert!(matches!(Grid::new(vec![]), Err(GridError::Empty)));

        let short = GridRow::new(vec![SamplePoint::new(0.0, 0.0, 1.0)]);
        assert!(matches!(
            Grid::new(vec![short]),
            Err(GridError::RowTooShort { .. })
        ));

        let ragged = Grid::new(vec![row(&[1.0, 2.0, 3.0], 0.0), row(&[1.0, 2.0], 1.0)]);
        assert!(matches!(ragged, Err(GridError::RaggedRows { row: 1, .. })));
    }

    #[test]
    fn test_grid_accessors() {
        let grid = Grid::new(vec![row(&[0.0, 1.0], 0.0), row(&[2.0, 3.0], 1.0)]).unwrap();
        assert_eq!(grid.num_rows(), 2);
        assert_eq!(grid.row_len(), 2);
        assert_eq!(grid.point(1, 0).z, 2.0);
        assert_eq!(grid.point(1, 0).y, 1.0);
    }

    #[test]
    fn test_from_z_values_size_mismatch() {
        let err = Grid::from_z_values(&[0.0, 1.0, 2.0], 2, 2).unwrap_err();
        assert!(matches!(
            err,
            GridError::SizeMismatch {
                len: 3,
                width: 2,
                height: 2
            }
        ));
    }

    #[test]
    fn test_from_z_values_nan_is_undefined() {
        let grid = Grid::from_z_values(&[0.0, 1.0, f64::NAN, 3.0], 2, 2).unwrap();
        assert_eq!(grid.point(1, 0).kind, PointKind::Undefined);
        assert_eq!(grid.point(1, 1).kind, PointKind::InRange);
    }
}
