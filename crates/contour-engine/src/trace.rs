//! Per-level edge activation and contour tracing.
//!
//! For one z level, every mesh edge whose endpoints straddle the level is
//! marked active, then traces repeatedly consume active edges by walking
//! from triangle to shared triangle until no active edges remain. All
//! boundary-seeded open traces are finished before the first interior-seeded
//! closed trace; that ordering decides which trace emits which contour and
//! must not change.

use field_grid::{Grid, GridRange};
use tracing::warn;

use crate::error::TraceError;
use crate::mesh::{EdgeId, EdgePosition, Mesh, TriId};

/// Relative tolerance deciding whether two traced points coincide.
pub(crate) const POINT_EPSILON: f64 = 1e-5;

/// A vertex of a raw traced polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPoint {
    pub x: f64,
    pub y: f64,
}

/// One raw polyline produced by a single trace.
#[derive(Debug, Clone)]
pub struct TracedPolyline {
    pub points: Vec<RawPoint>,
    pub closed: bool,
}

/// Point equality scaled by the whole grid's x/y extent, so the threshold is
/// the same for every contour of the grid.
pub(crate) fn same_point(a: &RawPoint, b: &RawPoint, range: &GridRange) -> bool {
    (a.x - b.x).abs() < range.x_width().abs() * POINT_EPSILON
        && (a.y - b.y).abs() < range.y_width().abs() * POINT_EPSILON
}

/// Mark every edge crossed by `level` as active and return how many.
///
/// The same `>=` comparison is applied at both endpoints; an edge is active
/// exactly when the two results differ. Using one operator on both ends
/// keeps points that sit exactly on the level classified consistently.
pub fn activate_edges(mesh: &mut Mesh, grid: &Grid, level: f64) -> usize {
    let mut count = 0;
    for i in 0..mesh.num_edges() {
        let id = EdgeId(i as u32);
        let [a, b] = mesh.endpoints(grid, id);
        let active = (a.z >= level) != (b.z >= level);
        mesh.edge_mut(id).is_active = active;
        if active {
            count += 1;
        }
    }
    count
}

/// Interpolated crossing position of `level` along an active edge.
fn crossing_point(mesh: &Mesh, grid: &Grid, id: EdgeId, level: f64) -> RawPoint {
    let [a, b] = mesh.endpoints(grid, id);
    let t = ((level - a.z) / (b.z - a.z)).clamp(0.0, 1.0);
    RawPoint {
        x: b.x * t + a.x * (1.0 - t),
        y: b.y * t + a.y * (1.0 - t),
    }
}

/// Trace every contour of one level, in seed-scan order.
///
/// Inconsistencies are reported and cut tracing short for this level only;
/// polylines already traced are returned.
pub fn trace_level(
    mesh: &mut Mesh,
    grid: &Grid,
    range: &GridRange,
    level: f64,
) -> Vec<TracedPolyline> {
    let mut active = activate_edges(mesh, grid, level);
    let mut closed_mode = false;
    let mut polylines = Vec::new();

    while active > 0 {
        let seed = match next_seed(mesh, &mut closed_mode, active) {
            Ok(seed) => seed,
            Err(err) => {
                warn!(level, error = %err, "abandoning level");
                break;
            }
        };
        match trace_one(mesh, grid, range, level, seed, closed_mode, &mut active) {
            Ok(Some(polyline)) => polylines.push(polyline),
            Ok(None) => {} // seed without a triangle, nothing to trace
            Err(err) => warn!(level, error = %err, "discarding partial contour"),
        }
    }

    polylines
}

/// Find the next seed edge: boundary edges while any remain active, interior
/// edges afterwards. Once the boundary supply is exhausted the level stays
/// in closed mode.
fn next_seed(mesh: &Mesh, closed_mode: &mut bool, active: usize) -> Result<EdgeId, TraceError> {
    if !*closed_mode {
        for &id in mesh.scan_order() {
            let edge = mesh.edge(id);
            if edge.is_active && edge.position == EdgePosition::Boundary {
                return Ok(id);
            }
        }
        *closed_mode = true;
    }
    for &id in mesh.scan_order() {
        let edge = mesh.edge(id);
        if edge.is_active && edge.position != EdgePosition::Boundary {
            return Ok(id);
        }
    }
    Err(TraceError::NoInteriorSeed { remaining: active })
}

/// Walk the mesh from `seed`, consuming active edges, until the walk returns
/// to the seed (closed loop) or reaches a boundary edge (open trace).
fn trace_one(
    mesh: &mut Mesh,
    grid: &Grid,
    range: &GridRange,
    level: f64,
    seed: EdgeId,
    closed_mode: bool,
    active: &mut usize,
) -> Result<Option<TracedPolyline>, TraceError> {
    if !closed_mode {
        // A closed trace consumes its seed when the loop comes back around.
        mesh.edge_mut(seed).is_active = false;
        *active -= 1;
    }
    if !mesh.edge(seed).has_triangle() {
        return Ok(None);
    }

    let mut points = vec![crossing_point(mesh, grid, seed, level)];
    let mut current = seed;
    let mut last_tri: Option<TriId> = None;

    loop {
        // Continue through the triangle we did not just come from.
        let owners = mesh.edge(current).triangles();
        let tri = if owners[0] == last_tri {
            owners[1]
        } else {
            owners[0]
        };
        let Some(tri) = tri else {
            return Err(release_seed(mesh, seed, active, TraceError::UnexpectedEnd));
        };

        let mut next = None;
        for id in mesh.triangle(tri).edges() {
            if id != current && mesh.edge(id).is_active {
                next = Some(id);
            }
        }
        let Some(next) = next else {
            return Err(release_seed(mesh, seed, active, TraceError::UnexpectedEnd));
        };

        current = next;
        last_tri = Some(tri);
        mesh.edge_mut(current).is_active = false;
        *active -= 1;

        // Diagonal crossings are redundant with the cell's other two edges
        // and emit no vertex.
        if mesh.edge(current).position != EdgePosition::Diagonal {
            let point = crossing_point(mesh, grid, current, level);
            let duplicate = points
                .last()
                .is_some_and(|prev| same_point(prev, &point, range));
            if !duplicate {
                points.push(point);
            }
        }

        if current == seed || mesh.edge(current).position == EdgePosition::Boundary {
            break;
        }
    }

    let closed = current == seed;
    if closed {
        // Snap the endpoints together so roundoff cannot leave a gap.
        if let Some(&last) = points.last() {
            points[0] = last;
        }
    }
    Ok(Some(TracedPolyline { points, closed }))
}

/// Make sure a failed walk still consumed its seed, so the level loop keeps
/// terminating.
fn release_seed(mesh: &mut Mesh, seed: EdgeId, active: &mut usize, err: TraceError) -> TraceError {
    if mesh.edge(seed).is_active {
        mesh.edge_mut(seed).is_active = false;
        *active -= 1;
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_and_range(values: &[f64], width: usize, height: usize) -> (Grid, GridRange) {
        let grid = Grid::from_z_values(values, width, height).unwrap();
        let range = GridRange::scan(&grid);
        (grid, range)
    }

    #[test]
    fn test_activate_edges_single_cell() {
        // z = {0,0;10,10}: level 5 crosses both verticals and the diagonal.
        let (grid, _) = grid_and_range(&[0.0, 0.0, 10.0, 10.0], 2, 2);
        let mut mesh = Mesh::build(&grid);
        assert_eq!(activate_edges(&mut mesh, &grid, 5.0), 3);
    }

    #[test]
    fn test_activate_edges_level_below_and_above() {
        let (grid, _) = grid_and_range(&[0.0, 0.0, 10.0, 10.0], 2, 2);
        let mut mesh = Mesh::build(&grid);
        assert_eq!(activate_edges(&mut mesh, &grid, -1.0), 0);
        assert_eq!(activate_edges(&mut mesh, &grid, 11.0), 0);
    }

    #[test]
    fn test_boundary_value_uses_same_comparison() {
        // Level exactly equal to one endpoint: >= on both ends puts the
        // endpoint on the "above" side consistently.
        let (grid, _) = grid_and_range(&[0.0, 0.0, 10.0, 10.0], 2, 2);
        let mut mesh = Mesh::build(&grid);
        assert_eq!(activate_edges(&mut mesh, &grid, 0.0), 0);
        assert!(activate_edges(&mut mesh, &grid, 10.0) > 0);
    }

    #[test]
    fn test_open_trace_single_cell_midline() {
        let (grid, range) = grid_and_range(&[0.0, 0.0, 10.0, 10.0], 2, 2);
        let mut mesh = Mesh::build(&grid);
        let polylines = trace_level(&mut mesh, &grid, &range, 5.0);
        assert_eq!(polylines.len(), 1);
        let polyline = &polylines[0];
        assert!(!polyline.closed);
        // Both endpoints at t = 0.5 along the two verticals; the diagonal
        // crossing emits nothing.
        assert_eq!(polyline.points.len(), 2);
        for p in &polyline.points {
            assert!((p.y - 0.5).abs() < 1e-12, "expected y = 0.5, got {}", p.y);
        }
        let xs: Vec<f64> = polyline.points.iter().map(|p| p.x).collect();
        assert!(xs.contains(&0.0) && xs.contains(&1.0));
    }

    #[test]
    fn test_active_count_reaches_zero() {
        let (grid, range) = grid_and_range(&[0.0, 0.0, 0.0, 0.0, 9.0, 0.0, 0.0, 0.0, 0.0], 3, 3);
        let mut mesh = Mesh::build(&grid);
        let _ = trace_level(&mut mesh, &grid, &range, 4.5);
        for i in 0..mesh.num_edges() {
            assert!(!mesh.edge(EdgeId(i as u32)).is_active);
        }
    }

    #[test]
    fn test_closed_loop_around_peak() {
        // Peak in the middle of a 3x3 grid: one closed contour ring.
        let (grid, range) = grid_and_range(&[0.0, 0.0, 0.0, 0.0, 9.0, 0.0, 0.0, 0.0, 0.0], 3, 3);
        let mut mesh = Mesh::build(&grid);
        let polylines = trace_level(&mut mesh, &grid, &range, 4.5);
        assert_eq!(polylines.len(), 1);
        let polyline = &polylines[0];
        assert!(polyline.closed);
        let first = polyline.points.first().unwrap();
        let last = polyline.points.last().unwrap();
        assert_eq!(first.x.to_bits(), last.x.to_bits());
        assert_eq!(first.y.to_bits(), last.y.to_bits());
        assert!(polyline.points.len() >= 4);
    }

    #[test]
    fn test_near_duplicate_suppression_is_idempotent() {
        let (_, range) = grid_and_range(&[0.0, 0.0, 10.0, 10.0], 2, 2);
        let raw = vec![
            RawPoint { x: 0.0, y: 0.0 },
            RawPoint { x: 1e-9, y: 1e-9 },
            RawPoint { x: 0.5, y: 0.5 },
            RawPoint { x: 1.0, y: 1.0 },
        ];
        let dedup = |input: &[RawPoint]| {
            let mut out: Vec<RawPoint> = Vec::new();
            for p in input {
                if !out.last().is_some_and(|prev| same_point(prev, p, &range)) {
                    out.push(*p);
                }
            }
            out
        };
        let once = dedup(&raw);
        assert_eq!(once.len(), 3);
        let twice = dedup(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_isolated_edges_trace_nothing() {
        // A single row has edges but no triangles; seeds yield no contour
        // and the loop still drains the active count.
        let (grid, range) = grid_and_range(&[0.0, 10.0, 0.0], 3, 1);
        let mut mesh = Mesh::build(&grid);
        let polylines = trace_level(&mut mesh, &grid, &range, 5.0);
        assert!(polylines.is_empty());
    }
}
