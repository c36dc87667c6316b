//! Per-call configuration for contour extraction.
//!
//! The whole engine is driven by one immutable `ContourConfig` value passed
//! into the call, so concurrent callers can contour different grids with
//! different settings without shared state.

use serde::{Deserialize, Serialize};

/// How a raw traced polyline is turned into the output contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterpolationKind {
    /// Pass the traced points through unmodified.
    Linear,
    /// Natural cubic spline through the points, resampled densely.
    CubicSpline,
    /// B-spline approximation of the configured order.
    BSpline,
}

/// How the sequence of contour levels is chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LevelSelection {
    /// Pick a human-friendly step so roughly `requested` levels span the
    /// field's z range.
    Auto { requested: u32 },
    /// `start + i * step` for `i` in `0..count`.
    Incremental { start: f64, step: f64, count: u32 },
    /// An explicit ordered list of levels.
    Discrete { values: Vec<f64> },
}

/// Configuration for one contouring call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourConfig {
    /// Output representation of each contour.
    pub kind: InterpolationKind,

    /// Level selection policy.
    pub levels: LevelSelection,

    /// Spline/B-spline order, at least 2. Clamped per contour so the order
    /// never exceeds the contour's point count minus one.
    pub order: u32,

    /// Resampling density: evaluated points per polyline segment. A value
    /// of 0 is treated as 1.
    pub points_per_segment: u32,

    /// Significant digits used when formatting level labels. Stands in for
    /// a free-form numeric format string: labels render as the shortest
    /// decimal with this many significant digits, switching to exponent
    /// notation for extreme magnitudes.
    pub label_digits: usize,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            kind: InterpolationKind::Linear,
            levels: LevelSelection::Auto { requested: 5 },
            order: 4,
            points_per_segment: 5,
            label_digits: 3,
        }
    }
}

impl ContourConfig {
    /// Load configuration overrides from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("CONTOUR_KIND") {
            match val.to_ascii_lowercase().as_str() {
                "linear" => config.kind = InterpolationKind::Linear,
                "cubic" => config.kind = InterpolationKind::CubicSpline,
                "bspline" => config.kind = InterpolationKind::BSpline,
                _ => {}
            }
        }
        if let Ok(val) = std::env::var("CONTOUR_LEVELS") {
            if let Ok(n) = val.parse() {
                config.levels = LevelSelection::Auto { requested: n };
            }
        }
        if let Ok(val) = std::env::var("CONTOUR_ORDER") {
            if let Ok(n) = val.parse::<u32>() {
                config.order = n.max(2);
            }
        }
        if let Ok(val) = std::env::var("CONTOUR_POINTS") {
            if let Ok(n) = val.parse::<u32>() {
                config.points_per_segment = n.max(1);
            }
        }
        if let Ok(val) = std::env::var("CONTOUR_LABEL_DIGITS") {
            if let Ok(n) = val.parse() {
                config.label_digits = n;
            }
        }

        config
    }

    /// Format a level value for its display label.
    pub fn format_level(&self, z: f64) -> String {
        format_significant(z, self.label_digits.max(1))
    }
}

/// Shortest decimal representation of `z` with the given number of
/// significant digits, falling back to exponent notation for very large or
/// very small magnitudes.
fn format_significant(z: f64, digits: usize) -> String {
    if z == 0.0 {
        return "0".to_string();
    }
    let exponent = z.abs().log10().floor() as i32;
    if exponent < -4 || exponent >= digits as i32 {
        format!("{:.*e}", digits - 1, z)
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        let fixed = format!("{:.*}", decimals, z);
        if fixed.contains('.') {
            fixed.trim_end_matches('0').trim_end_matches('.').to_string()
        } else {
            fixed
        }
    }
}
