//! Natural cubic spline interpolation of traced polylines.
//!
//! The spline is the 2-D function s(t) = (x(t), y(t)) with t the cumulative
//! chord length, measured in coordinates normalized by the grid's x/y spans
//! so the parameterization is not distorted by anisotropic grids. Second
//! derivatives at the knots come from a symmetric tri-diagonal linear
//! system, cyclic for closed contours, with natural (zero third derivative)
//! end conditions for open ones. The system is solved by a Cholesky-style
//! factorization specialized to this shape.

use field_grid::GridRange;

use crate::error::SplineError;
use crate::trace::{same_point, RawPoint};

/// Lower bound for the normalization units, in case the grid collapses to a
/// line or point in x or y.
const ZERO_GUARD: f64 = 1e-8;

/// Interpolate `points` with a cubic spline and resample it at
/// `1 + (N-1) * points_per_segment` parameter values.
///
/// Returns an empty vector when there are not at least two points. A closed
/// polyline whose endpoints do not already coincide gets its first point
/// appended so the curve wraps.
pub fn cubic_spline(
    points: &[RawPoint],
    closed: bool,
    range: &GridRange,
    points_per_segment: u32,
) -> Result<Vec<RawPoint>, SplineError> {
    let mut work = points.to_vec();
    if closed {
        if let (Some(&first), Some(last)) = (points.first(), points.last()) {
            if !same_point(last, &first, range) {
                work.push(first);
            }
        }
    }
    let num_pts = work.len();
    if num_pts < 2 {
        return Ok(Vec::new());
    }

    let unit_x = range.x_width().max(ZERO_GUARD);
    let unit_y = range.y_width().max(ZERO_GUARD);

    let mut d2x = vec![0.0; num_pts];
    let mut d2y = vec![0.0; num_pts];
    let mut delta_t = vec![0.0; num_pts];

    if num_pts > 2 {
        second_derivatives(
            &work, &mut d2x, &mut d2y, &mut delta_t, closed, unit_x, unit_y,
        )?;
    } else {
        // Exactly two points: zero curvature over a unit interval.
        delta_t[0] = 1.0;
    }

    let samples = 1 + (num_pts - 1) * points_per_segment as usize;
    Ok(resample(&work, &d2x, &d2y, &delta_t, samples))
}

/// Compute the knot second derivatives and chord-length intervals.
///
/// `d2x`/`d2y` are used as scratch for the first differences and right-hand
/// sides before they receive the solution, mirroring the staged layout of
/// the computation.
fn second_derivatives(
    points: &[RawPoint],
    d2x: &mut [f64],
    d2y: &mut [f64],
    delta_t: &mut [f64],
    closed: bool,
    unit_x: f64,
    unit_y: f64,
) -> Result<(), SplineError> {
    let num_pts = points.len();

    for i in 0..num_pts - 1 {
        d2x[i] = points[i + 1].x - points[i].x;
        d2y[i] = points[i + 1].y - points[i].y;
        // Chord length in normalized coordinates is the parameter interval.
        delta_t[i] = ((d2x[i] / unit_x).powi(2) + (d2y[i] / unit_y).powi(2)).sqrt();
        d2x[i] /= delta_t[i];
        d2y[i] /= delta_t[i];
    }

    // System size: interior knots only, plus the wrap equation when closed.
    let mut n = num_pts - 2;
    if closed {
        delta_t[num_pts - 1] = delta_t[0];
        d2x[num_pts - 1] = d2x[0];
        d2y[num_pts - 1] = d2y[0];
        n += 1;
    }

    let mut m = vec![[0.0f64; 3]; n];
    for i in 0..n {
        m[i][0] = delta_t[i];
        m[i][1] = 2.0 * (delta_t[i] + delta_t[i + 1]);
        m[i][2] = delta_t[i + 1];

        d2x[i] = (d2x[i + 1] - d2x[i]) * 6.0;
        d2y[i] = (d2y[i + 1] - d2y[i]) * 6.0;

        // A turn sharper than about 90 degrees makes the spline overshoot;
        // damping the right-hand side there gives up first-derivative
        // continuity at the cusp instead. The 8.5 scale is empirical and
        // the visual output depends on it.
        let norm = ((d2x[i] / unit_x).powi(2) + (d2y[i] / unit_y).powi(2)).sqrt() / 8.5;
        if norm > 1.0 {
            d2x[i] /= norm;
            d2y[i] /= norm;
        }
    }

    if !closed {
        // Natural end conditions: third derivative zero at both ends.
        m[0][1] += m[0][0];
        m[0][0] = 0.0;
        m[n - 1][1] += m[n - 1][2];
        m[n - 1][2] = 0.0;
    }

    if !factorize(&mut m) {
        return Err(SplineError::NotPositiveDefinite { n });
    }
    substitute(&m, &mut d2x[..n]);
    substitute(&m, &mut d2y[..n]);

    // Shift the solution one place right; the ends repeat their neighbor
    // (open) or wrap (closed).
    for i in (1..=n).rev() {
        d2x[i] = d2x[i - 1];
        d2y[i] = d2y[i - 1];
    }
    if closed {
        d2x[0] = d2x[n];
        d2y[0] = d2y[n];
    } else {
        d2x[0] = d2x[1];
        d2y[0] = d2y[1];
        d2x[n + 1] = d2x[n];
        d2y[n + 1] = d2y[n];
    }

    Ok(())
}

/// Cholesky-style decomposition M = Cᵀ·D·C of the symmetric tri-diagonal
/// matrix with cyclic corner elements.
///
/// Row layout: `m[i][0]` is M[i][i-1] (and `m[0][0]` the corner M[0][n-1]),
/// `m[i][1]` the diagonal, `m[i][2]` is M[i][i+1] (and `m[n-1][2]` the
/// corner M[n-1][0]). The factors overwrite `m`. Returns false when the
/// matrix is not positive definite.
fn factorize(m: &mut [[f64; 3]]) -> bool {
    let n = m.len();
    if n < 1 {
        return false;
    }

    let mut d = m[0][1];
    if d <= 0.0 {
        return false;
    }
    let mut m_n = m[0][0];
    let mut m_nn = m[n - 1][1];
    for i in 0..n.saturating_sub(2) {
        let m_ij = m[i][2];
        m[i][2] = m_ij / d;
        m[i][0] = m_n / d;
        m_nn -= m[i][0] * m_n;
        m_n = -m[i][2] * m_n;
        d = m[i + 1][1] - m[i][2] * m_ij;
        if d <= 0.0 {
            return false;
        }
        m[i + 1][1] = d;
    }
    if n >= 2 {
        // Complete the last column.
        m_n += m[n - 2][2];
        m[n - 2][0] = m_n / d;
        d = m_nn - m[n - 2][0] * m_n;
        m[n - 1][1] = d;
        if d <= 0.0 {
            return false;
        }
    }
    true
}

/// Solve M·x = b in place using the factorization left in `m`.
fn substitute(m: &[[f64; 3]], x: &mut [f64]) {
    let n = m.len();

    // b := C⁻ᵀ b
    let mut x_n = x[n - 1];
    for i in 0..n.saturating_sub(2) {
        x[i + 1] -= m[i][2] * x[i];
        x_n -= m[i][0] * x[i];
    }
    if n >= 2 {
        x[n - 1] = x_n - m[n - 2][0] * x[n - 2];
    }

    // b := D⁻¹ b
    for i in 0..n {
        x[i] /= m[i][1];
    }

    // b := C⁻¹ b
    let x_n = x[n - 1];
    if n >= 2 {
        x[n - 2] -= m[n - 2][0] * x_n;
    }
    for i in (0..n.saturating_sub(2)).rev() {
        x[i] -= m[i][2] * x[i + 1] + m[i][0] * x_n;
    }
}

/// Evaluate the spline segments at `samples` equally spaced parameter
/// values over the whole chord-length interval.
fn resample(
    points: &[RawPoint],
    d2x: &[f64],
    d2y: &[f64],
    delta_t: &[f64],
    samples: usize,
) -> Vec<RawPoint> {
    let n = points.len();
    let t_max: f64 = delta_t[..n - 1].iter().sum();
    // Shrink slightly so the last sample stays inside the final interval.
    let t_skip = (1.0 - 1e-7) * t_max / (samples - 1) as f64;

    let mut out = Vec::with_capacity(samples);
    let mut x1 = points[0].x;
    let mut y1 = points[0].y;
    out.push(RawPoint { x: x1, y: y1 });
    let mut t = t_skip;

    for i in 0..n - 1 {
        let d = delta_t[i];
        let x0 = x1;
        let y0 = y1;
        x1 = points[i + 1].x;
        y1 = points[i + 1].y;

        let hx = (x1 - x0) / d;
        let hy = (y1 - y0) / d;
        let dx0 = (d2x[i + 1] + 2.0 * d2x[i]) / 6.0;
        let dy0 = (d2y[i + 1] + 2.0 * d2y[i]) / 6.0;
        let dx01 = (d2x[i + 1] - d2x[i]) / (6.0 * d);
        let dy01 = (d2y[i + 1] - d2y[i]) / (6.0 * d);

        while t <= d {
            out.push(RawPoint {
                x: x0 + t * (hx + (t - d) * (dx0 + t * dx01)),
                y: y0 + t * (hy + (t - d) * (dy0 + t * dy01)),
            });
            t += t_skip;
        }
        // Carry the parameter into the next interval.
        t -= d;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use field_grid::Grid;

    fn unit_range() -> GridRange {
        let grid = Grid::from_z_values(&[0.0, 1.0, 2.0, 3.0], 2, 2).unwrap();
        GridRange::scan(&grid)
    }

    fn p(x: f64, y: f64) -> RawPoint {
        RawPoint { x, y }
    }

    #[test]
    fn test_two_point_fallback_is_linear() {
        let pts = vec![p(0.0, 0.0), p(1.0, 1.0)];
        let out = cubic_spline(&pts, false, &unit_range(), 4).unwrap();
        assert_eq!(out.len(), 5);
        for q in &out {
            assert!((q.x - q.y).abs() < 1e-9, "point off the segment: {q:?}");
        }
        assert!((out[0].x - 0.0).abs() < 1e-12);
        assert!((out.last().unwrap().x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_single_point_yields_nothing() {
        let out = cubic_spline(&[p(0.5, 0.5)], false, &unit_range(), 4).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_collinear_points_stay_collinear() {
        // A straight polyline must spline to the same straight line.
        let pts = vec![p(0.0, 0.25), p(0.3, 0.25), p(0.6, 0.25), p(1.0, 0.25)];
        let out = cubic_spline(&pts, false, &unit_range(), 5).unwrap();
        assert_eq!(out.len(), 1 + 3 * 5);
        for q in &out {
            assert!((q.y - 0.25).abs() < 1e-9);
        }
    }

    #[test]
    fn test_spline_passes_through_knots() {
        let pts = vec![p(0.0, 0.0), p(0.4, 0.3), p(0.8, 0.1), p(1.0, 0.6)];
        let out = cubic_spline(&pts, false, &unit_range(), 50).unwrap();
        // Dense resampling must come arbitrarily close to every knot.
        for knot in &pts {
            let min_dist = out
                .iter()
                .map(|q| ((q.x - knot.x).powi(2) + (q.y - knot.y).powi(2)).sqrt())
                .fold(f64::INFINITY, f64::min);
            assert!(
                min_dist < 0.02,
                "spline misses knot {knot:?} by {min_dist}"
            );
        }
    }

    #[test]
    fn test_closed_spline_wraps() {
        // A square traversed closed: the curve must start and end at the
        // same place and the cyclic system must be positive definite.
        let pts = vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)];
        let out = cubic_spline(&pts, true, &unit_range(), 10).unwrap();
        assert!(!out.is_empty());
        let first = out.first().unwrap();
        let last = out.last().unwrap();
        assert!((first.x - last.x).abs() < 1e-3);
        assert!((first.y - last.y).abs() < 1e-3);
    }

    #[test]
    fn test_factorize_rejects_non_positive_definite() {
        // Non-positive first diagonal fails at the first pivot.
        let mut m = [[0.0, -1.0, 0.0]];
        assert!(!factorize(&mut m));

        // Cyclic 2x2 system whose corner terms overwhelm the diagonal
        // fails at the last pivot.
        let mut m = [[1.0, 1.0, 1.0], [1.0, 1.0, 1.0]];
        assert!(!factorize(&mut m));

        // A diagonally dominant system factorizes; chord-length spline
        // matrices always land here, so the rejection path above is only
        // reachable through the solver directly.
        let mut m = [[0.0, 4.0, 1.0], [1.0, 4.0, 0.0]];
        assert!(factorize(&mut m));
    }

    #[test]
    fn test_resample_count() {
        let pts = vec![p(0.0, 0.0), p(0.5, 0.2), p(1.0, 0.0)];
        let out = cubic_spline(&pts, false, &unit_range(), 7).unwrap();
        assert_eq!(out.len(), 1 + 2 * 7);
    }
}
