//! Component-wise bounding range of a sample grid.

use serde::{Deserialize, Serialize};

use crate::types::{Grid, PointKind};

/// Min/max of x, y and z over every defined point of a grid.
///
/// The x/y widths serve as the reference lengths for point-equality
/// thresholds during tracing, and the z width drives automatic level
/// selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridRange {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub z_min: f64,
    pub z_max: f64,
}

impl GridRange {
    /// Scan every point once, ignoring `Undefined` samples.
    pub fn scan(grid: &Grid) -> Self {
        let mut r = Self {
            x_min: f64::INFINITY,
            x_max: f64::NEG_INFINITY,
            y_min: f64::INFINITY,
            y_max: f64::NEG_INFINITY,
            z_min: f64::INFINITY,
            z_max: f64::NEG_INFINITY,
        };
        for row in grid.rows() {
            for p in row.points() {
                if p.kind == PointKind::Undefined {
                    continue;
                }
                r.x_min = r.x_min.min(p.x);
                r.x_max = r.x_max.max(p.x);
                r.y_min = r.y_min.min(p.y);
                r.y_max = r.y_max.max(p.y);
                r.z_min = r.z_min.min(p.z);
                r.z_max = r.z_max.max(p.z);
            }
        }
        r
    }

    pub fn x_width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn y_width(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn z_width(&self) -> f64 {
        self.z_max - self.z_min
    }

    /// A field with zero z extent has nothing to contour.
    pub fn is_z_degenerate(&self) -> bool {
        self.z_width() == 0.0
    }
}
