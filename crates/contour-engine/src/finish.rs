//! Conversion of raw traced polylines into their output representation.

use field_grid::GridRange;
use tracing::warn;

use crate::bspline::bspline_approx;
use crate::config::{ContourConfig, InterpolationKind};
use crate::spline::cubic_spline;
use crate::trace::{same_point, RawPoint, TracedPolyline};

/// Finish one raw polyline according to the configured interpolation kind,
/// consuming it. Returns `None` when the polyline is too short to produce a
/// contour or the spline solver rejects it.
pub fn finish_polyline(
    raw: TracedPolyline,
    range: &GridRange,
    config: &ContourConfig,
) -> Option<Vec<RawPoint>> {
    match config.kind {
        InterpolationKind::Linear => {
            if raw.points.len() < 2 {
                None
            } else {
                Some(raw.points)
            }
        }
        InterpolationKind::CubicSpline => {
            let closed = is_effectively_closed(&raw, range);
            let density = config.points_per_segment.max(1);
            match cubic_spline(&raw.points, closed, range, density) {
                Ok(points) if points.is_empty() => None,
                Ok(points) => Some(points),
                Err(err) => {
                    warn!(error = %err, "dropping contour");
                    None
                }
            }
        }
        InterpolationKind::BSpline => {
            let closed = is_effectively_closed(&raw, range);
            let density = config.points_per_segment.max(1);
            let points = bspline_approx(&raw.points, config.order, closed, range, density);
            if points.is_empty() {
                None
            } else {
                Some(points)
            }
        }
    }
}

/// Open traces whose endpoints meet within the grid tolerance are treated
/// as closed for spline purposes, so the smoothed curve wraps instead of
/// leaving a seam.
fn is_effectively_closed(raw: &TracedPolyline, range: &GridRange) -> bool {
    if raw.closed {
        return true;
    }
    match (raw.points.first(), raw.points.last()) {
        (Some(first), Some(last)) if raw.points.len() >= 2 => same_point(last, first, range),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use field_grid::Grid;

    fn unit_range() -> GridRange {
        let grid = Grid::from_z_values(&[0.0, 1.0, 2.0, 3.0], 2, 2).unwrap();
        GridRange::scan(&grid)
    }

    fn open_polyline(points: Vec<(f64, f64)>) -> TracedPolyline {
        TracedPolyline {
            points: points
                .into_iter()
                .map(|(x, y)| RawPoint { x, y })
                .collect(),
            closed: false,
        }
    }

    #[test]
    fn test_linear_passthrough() {
        let raw = open_polyline(vec![(0.0, 0.0), (0.5, 0.5), (1.0, 0.0)]);
        let expected = raw.points.clone();
        let out = finish_polyline(raw, &unit_range(), &ContourConfig::default()).unwrap();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_short_polylines_are_dropped() {
        for kind in [
            InterpolationKind::Linear,
            InterpolationKind::CubicSpline,
            InterpolationKind::BSpline,
        ] {
            let config = ContourConfig {
                kind,
                ..Default::default()
            };
            let raw = open_polyline(vec![(0.5, 0.5)]);
            assert!(finish_polyline(raw, &unit_range(), &config).is_none());
        }
    }

    #[test]
    fn test_open_trace_with_meeting_ends_is_closed() {
        let raw = open_polyline(vec![
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 1.0),
            (0.0, 1e-9),
        ]);
        assert!(is_effectively_closed(&raw, &unit_range()));

        let raw = open_polyline(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        assert!(!is_effectively_closed(&raw, &unit_range()));
    }

    #[test]
    fn test_zero_density_clamps_to_one_sample_per_segment() {
        for kind in [InterpolationKind::CubicSpline, InterpolationKind::BSpline] {
            let config = ContourConfig {
                kind,
                points_per_segment: 0,
                ..Default::default()
            };
            let raw = open_polyline(vec![(0.0, 0.0), (0.4, 0.3), (1.0, 0.1)]);
            let out = finish_polyline(raw, &unit_range(), &config).unwrap();
            assert!(out.len() >= 2, "density 0 must behave as density 1");
        }
    }

    #[test]
    fn test_cubic_finish_resamples() {
        let config = ContourConfig {
            kind: InterpolationKind::CubicSpline,
            ..Default::default()
        };
        let raw = open_polyline(vec![(0.0, 0.0), (0.4, 0.3), (1.0, 0.1)]);
        let out = finish_polyline(raw, &unit_range(), &config).unwrap();
        // 1 + (N-1) * points_per_segment samples.
        assert_eq!(out.len(), 1 + 2 * 5);
    }
}
