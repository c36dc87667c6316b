//! The contouring pipeline: range scan, mesh build, level loop, finishing.

use field_grid::{Grid, GridRange};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ContourConfig;
use crate::finish::finish_polyline;
use crate::levels::resolve_levels;
use crate::mesh::Mesh;
use crate::trace::trace_level;

/// One vertex of a finished contour; z is the contour's level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContourPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// One finished contour polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourLine {
    pub points: Vec<ContourPoint>,
    /// The z level this contour belongs to.
    pub level: f64,
    /// Display label, set only on the contour flagged `is_new_level`.
    pub label: String,
    /// True for the first returned contour of each level, the one that
    /// carries the label downstream.
    pub is_new_level: bool,
}

/// Extract all contours of a grid.
///
/// Runs synchronously to completion: builds the triangulated mesh, resolves
/// the level sequence from `config`, and for each level traces and finishes
/// every contour. The returned list is ordered newest level first; within a
/// level the label-carrying contour comes first. A degenerate z range (or a
/// grid with no defined points) yields an empty list.
///
/// Trace and spline failures are logged and stay local to one level or one
/// contour; output already produced is never discarded.
pub fn trace_field(grid: &Grid, config: &ContourConfig) -> Vec<ContourLine> {
    let range = GridRange::scan(grid);
    debug!(
        rows = grid.num_rows(),
        cols = grid.row_len(),
        z_min = range.z_min,
        z_max = range.z_max,
        kind = ?config.kind,
        "contour input"
    );

    if !range.z_width().is_finite() || range.is_z_degenerate() {
        return Vec::new();
    }

    let mut mesh = Mesh::build(grid);
    let levels = resolve_levels(&config.levels, &range);

    let mut contours: Vec<ContourLine> = Vec::new();
    for level in levels {
        let before = contours.len();
        for polyline in trace_level(&mut mesh, grid, &range, level) {
            if let Some(points) = finish_polyline(polyline, &range, config) {
                contours.push(ContourLine {
                    points: points
                        .into_iter()
                        .map(|p| ContourPoint {
                            x: p.x,
                            y: p.y,
                            z: level,
                        })
                        .collect(),
                    level,
                    label: String::new(),
                    is_new_level: false,
                });
            }
        }
        // The most recently finished contour of the level carries the label.
        if contours.len() > before {
            if let Some(last) = contours.last_mut() {
                last.is_new_level = true;
                last.label = config.format_level(level);
            }
        }
    }

    // Newest level first, label carrier leading its level's block.
    contours.reverse();

    debug!(
        num_contours = contours.len(),
        total_points = contours.iter().map(|c| c.points.len()).sum::<usize>(),
        "contours generated"
    );
    contours
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LevelSelection;

    #[test]
    fn test_degenerate_z_range_yields_nothing() {
        let grid = Grid::from_z_values(&[3.0; 9], 3, 3).unwrap();
        assert!(trace_field(&grid, &ContourConfig::default()).is_empty());
    }

    #[test]
    fn test_all_undefined_grid_yields_nothing() {
        let grid = Grid::from_z_values(&[f64::NAN; 4], 2, 2).unwrap();
        assert!(trace_field(&grid, &ContourConfig::default()).is_empty());
    }

    #[test]
    fn test_levels_ordered_newest_first() {
        // z = x over a 3x3 grid: discrete levels 0.5 and 1.5 each produce
        // one vertical contour; the later level's contour is returned first.
        let grid =
            Grid::from_z_values(&[0.0, 1.0, 2.0, 0.0, 1.0, 2.0, 0.0, 1.0, 2.0], 3, 3).unwrap();
        let config = ContourConfig {
            levels: LevelSelection::Discrete {
                values: vec![0.5, 1.5],
            },
            ..Default::default()
        };
        let contours = trace_field(&grid, &config);
        assert_eq!(contours.len(), 2);
        assert_eq!(contours[0].level, 1.5);
        assert_eq!(contours[1].level, 0.5);
        assert!(contours[0].is_new_level);
        assert!(contours[1].is_new_level);
        assert_eq!(contours[0].label, "1.5");
    }

    #[test]
    fn test_points_carry_level_as_z() {
        let grid =
            Grid::from_z_values(&[0.0, 1.0, 2.0, 0.0, 1.0, 2.0, 0.0, 1.0, 2.0], 3, 3).unwrap();
        let config = ContourConfig {
            levels: LevelSelection::Discrete { values: vec![0.5] },
            ..Default::default()
        };
        let contours = trace_field(&grid, &config);
        assert_eq!(contours.len(), 1);
        for p in &contours[0].points {
            assert_eq!(p.z, 0.5);
        }
    }
}
