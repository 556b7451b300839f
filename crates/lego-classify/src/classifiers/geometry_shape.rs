//! Shared scoring helpers for the geometry classifiers — Background,
//! Divider, ProgressBarIndicator, RotationSymbol, Arrow, LoosePartSymbol,
//! and Shine — each of which scores a vector `Drawing` or `Image` by
//! intrinsic shape alone: dimensions, aspect ratio, and color, with no
//! reference to any other candidate (`spec.md` §4.2).

use lego_core::BBox;

/// `1.0` at `target`, decaying linearly to `0.0` at `target ± tolerance`.
#[must_use]
pub fn proximity(value: f64, target: f64, tolerance: f64) -> f64 {
    if tolerance <= 0.0 {
        return f64::from((value - target).abs() < f64::EPSILON);
    }
    (1.0 - (value - target).abs() / tolerance).clamp(0.0, 1.0)
}

/// `width / height`, or `1.0` for a degenerate zero-height box rather than
/// dividing by zero.
#[must_use]
pub fn aspect_ratio(bbox: &BBox) -> f64 {
    if bbox.height() <= 0.0 {
        1.0
    } else {
        bbox.width() / bbox.height()
    }
}

/// How dark a fill color reads, in `[0.0, 1.0]` (0 = white, 1 = black),
/// using the standard luma weighting.
#[must_use]
pub fn darkness(color: (u8, u8, u8)) -> f64 {
    let (r, g, b) = color;
    1.0 - (0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)) / 255.0
}
