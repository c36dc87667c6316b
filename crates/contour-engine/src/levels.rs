//! Contour level sequencing.
//!
//! Turns a `LevelSelection` into the ordered list of z levels to trace.
//! The automatic policy quantizes the z range to a human-friendly tic step
//! and asks for twice the requested count before rounding, which lands the
//! final level count near the request; the factor is historical and output
//! depends on it.

use field_grid::GridRange;

use crate::config::LevelSelection;

/// Fraction of the step below which an auto level snaps to exactly zero.
const ZERO_SNAP: f64 = 0.01;

/// Resolve the configured policy into concrete levels, ordered ascending for
/// the automatic and incremental policies, caller-ordered for discrete.
pub fn resolve_levels(selection: &LevelSelection, range: &GridRange) -> Vec<f64> {
    match selection {
        LevelSelection::Auto { requested } => auto_levels(range, *requested),
        LevelSelection::Incremental { start, step, count } => (0..*count)
            .map(|i| start + i as f64 * step)
            .collect(),
        LevelSelection::Discrete { values } => values.clone(),
    }
}

fn auto_levels(range: &GridRange, requested: u32) -> Vec<f64> {
    let span = range.z_width().abs();
    if span == 0.0 || !span.is_finite() {
        return Vec::new();
    }
    let dz = quantize_tics(span, (requested + 1) * 2);
    let start = (range.z_min / dz).floor() * dz;
    let count = ((range.z_max - start) / dz).floor() as i64;

    let mut levels = Vec::with_capacity(count.max(0) as usize);
    let mut z = start;
    for _ in 0..count {
        z = check_zero(z + dz, dz);
        levels.push(z);
    }
    levels
}

/// Snap values within rounding distance of zero to exactly zero, so a level
/// that should be 0 is not displayed as 1e-17.
fn check_zero(z: f64, dz: f64) -> f64 {
    if z.abs() < dz * ZERO_SNAP {
        0.0
    } else {
        z
    }
}

/// Quantize an interval to a 1/2/5-style tic step such that at most `guide`
/// tics cover it.
pub fn quantize_tics(span: f64, guide: u32) -> f64 {
    // Order of magnitude of the span, then tics per decade.
    let power = 10f64.powf(span.log10().floor());
    let xnorm = span / power;
    let posns = guide as f64 / xnorm;

    let tics = if posns > 40.0 {
        0.05
    } else if posns > 20.0 {
        0.1
    } else if posns > 10.0 {
        0.2
    } else if posns > 4.0 {
        0.5
    } else if posns > 2.0 {
        1.0
    } else if posns > 0.5 {
        2.0
    } else {
        // Round up so the step covers the span even when the range is just
        // short of a power of ten.
        xnorm.ceil()
    };

    tics * power
}
