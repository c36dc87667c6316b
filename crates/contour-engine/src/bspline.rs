//! B-spline approximation of traced polylines.
//!
//! The traced points act as the control polygon of a B-spline evaluated by
//! recursive de Boor blending. The knot vector is never materialized: open
//! curves use a clamped ("open") vector whose first and last knots repeat,
//! closed curves a uniform one, both simulated by `fetch_knot`. Closed
//! contours extend the control polygon with wrapped points so the curve
//! closes smoothly.

use field_grid::GridRange;

use crate::trace::{same_point, RawPoint, POINT_EPSILON};

/// Approximate `points` with a B-spline of the given order (polynomial
/// degree `order - 1`), sampled at `points_per_segment` values per knot
/// span.
///
/// Returns an empty vector when there are not at least two points. The
/// degree is clamped so it never reaches the point count.
pub fn bspline_approx(
    points: &[RawPoint],
    order: u32,
    closed: bool,
    range: &GridRange,
    points_per_segment: u32,
) -> Vec<RawPoint> {
    let num_pts = points.len();
    if num_pts < 2 {
        return Vec::new();
    }
    let degree = (order.max(2) as usize - 1).min(num_pts - 1);

    // Closed curves blend `degree` extra wrapped control points (one less
    // when the trace already ends on its first point) so the evaluation
    // runs all the way around.
    let mut ctrl = points.to_vec();
    let mut num = num_pts;
    if closed {
        let first = points[0];
        let last = points[num_pts - 1];
        if same_point(&last, &first, range) {
            let cycle = &points[1..];
            for k in 0..degree - 1 {
                ctrl.push(cycle[k % cycle.len()]);
            }
            num += degree - 1;
        } else {
            for k in 0..degree {
                ctrl.push(points[k % num_pts]);
            }
            num += degree;
        }
    }

    let t_min = fetch_knot(closed, num, degree, degree);
    let t_max = fetch_knot(closed, num, degree, num);
    let mut t = t_min;
    let mut next_t = t_min + 1.0;
    let mut knot_index = degree;
    let dt = 1.0 / points_per_segment as f64;

    let mut out = Vec::new();
    let mut pts_count = 1usize;
    while t < t_max {
        if t > next_t {
            knot_index += 1;
            next_t += 1.0;
        }
        out.push(eval(t, &ctrl, num, degree, knot_index, closed));
        pts_count += 1;
        // Roundoff can drift t past the last span; emit the final point
        // outside the loop instead.
        if pts_count == points_per_segment as usize * (num - degree) + 1 {
            break;
        }
        t += dt;
    }
    out.push(eval(
        t_max - POINT_EPSILON,
        &ctrl,
        num,
        degree,
        knot_index,
        closed,
    ));
    out
}

/// De Boor blend of the `degree + 1` control points ending at index `j`.
fn eval(
    t: f64,
    ctrl: &[RawPoint],
    num: usize,
    degree: usize,
    j: usize,
    closed: bool,
) -> RawPoint {
    let mut dx = vec![0.0; j + 1];
    let mut dy = vec![0.0; j + 1];
    for i in j - degree..=j {
        dx[i] = ctrl[i].x;
        dy[i] = ctrl[i].y;
    }

    for p in 1..=degree {
        for i in ((j - degree + p)..=j).rev() {
            let ti = fetch_knot(closed, num, degree, i);
            let tikp = fetch_knot(closed, num, degree, i + degree + 1 - p);
            if ti != tikp {
                dx[i] = dx[i] * (t - ti) / (tikp - ti) + dx[i - 1] * (tikp - t) / (tikp - ti);
                dy[i] = dy[i] * (t - ti) / (tikp - ti) + dy[i - 1] * (tikp - t) / (tikp - ti);
            }
        }
    }

    RawPoint {
        x: dx[j],
        y: dy[j],
    }
}

/// Simulated knot vector: clamped for open curves, uniform for closed.
fn fetch_knot(closed: bool, num: usize, degree: usize, i: usize) -> f64 {
    if closed {
        i as f64
    } else if i <= degree {
        0.0
    } else if i <= num {
        (i - degree) as f64
    } else {
        (num - degree) as f64
    }
}
