//! Axis-aligned bounding boxes in PDF point space.
//!
//! Coordinates are PDF points; `y` increases downward (top-left origin), matching the
//! convention the layout extractor hands us. `BBox::new` enforces `x0 <= x1` and
//! `y0 <= y1` for literal, known-good construction — callers building blocks from raw
//! extractor output (including deserialized JSON, which bypasses both constructors)
//! instead check [`BBox::is_valid`] or call [`BBox::try_new_for_block`] and treat
//! failure as a per-block data error (see `LegoError::InvalidBBox`); `PageData::try_new`
//! (`crate::block`) is the ingestion path that does this and drops offending blocks.

use crate::error::{LegoError, Result};
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in PDF point space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BBox {
    /// Build a bbox, panicking if the invariant doesn't hold.
    ///
    /// Only use this for literal, known-good coordinates (tests, constants). Data
    /// arriving from the extractor must go through [`BBox::try_new`].
    #[must_use = "returns a new BBox instance"]
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::try_new(x0, y0, x1, y1).expect("BBox::new called with an invalid rectangle")
    }

    /// Build a bbox, validating `x0 <= x1` and `y0 <= y1`. Used for
    /// context-free construction (no source block to blame); the error's
    /// `block_id` is `0` as a sentinel. Callers validating an actual extracted
    /// block should use [`BBox::try_new_for_block`] instead, so the error
    /// carries the real block id.
    pub fn try_new(x0: f64, y0: f64, x1: f64, y1: f64) -> Result<Self> {
        Self::try_new_for_block(0, x0, y0, x1, y1)
    }

    /// Like [`BBox::try_new`], but tags the error with the id of the block
    /// this rectangle came from (`spec.md` §7: invalid-bbox blocks are dropped
    /// with a warning that should name the offending block).
    pub fn try_new_for_block(block_id: u64, x0: f64, y0: f64, x1: f64, y1: f64) -> Result<Self> {
        if x0 > x1 || y0 > y1 {
            return Err(LegoError::InvalidBBox {
                block_id,
                reason: format!(
                    "rectangle ({x0}, {y0}, {x1}, {y1}) has x0 > x1 or y0 > y1"
                ),
            });
        }
        Ok(Self { x0, y0, x1, y1 })
    }

    /// True if the rectangle satisfies `x0 <= x1` and `y0 <= y1`. Unlike
    /// [`BBox::try_new`], this checks a `BBox` that already exists — needed
    /// because `#[derive(Deserialize)]` constructs one directly over public
    /// fields without routing through either constructor.
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.x0 <= self.x1 && self.y0 <= self.y1
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    #[inline]
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// True if `self` lies entirely within `other` (inclusive of the boundary).
    #[must_use]
    pub fn fully_inside(&self, other: &Self) -> bool {
        self.x0 >= other.x0 && self.y0 >= other.y0 && self.x1 <= other.x1 && self.y1 <= other.y1
    }

    /// True if `self` and `other` share any area.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }

    #[must_use]
    pub fn overlap_area(&self, other: &Self) -> f64 {
        let x0 = self.x0.max(other.x0);
        let y0 = self.y0.max(other.y0);
        let x1 = self.x1.min(other.x1);
        let y1 = self.y1.min(other.y1);
        (x1 - x0).max(0.0) * (y1 - y0).max(0.0)
    }

    /// Intersection over union.
    #[must_use]
    pub fn iou(&self, other: &Self) -> f64 {
        let inter = self.overlap_area(other);
        let union = self.area() + other.area() - inter;
        if union > 0.0 {
            inter / union
        } else {
            0.0
        }
    }

    /// Grow the rectangle by `margin` on every side.
    #[must_use]
    pub fn expand(&self, margin: f64) -> Self {
        Self {
            x0: self.x0 - margin,
            y0: self.y0 - margin,
            x1: self.x1 + margin,
            y1: self.y1 + margin,
        }
    }

    /// Vertical gap between the two boxes; zero if they vertically overlap.
    /// Positive when `other` is below `self` or vice versa.
    #[must_use]
    pub fn vertical_distance(&self, other: &Self) -> f64 {
        if self.y1 < other.y0 {
            other.y0 - self.y1
        } else if other.y1 < self.y0 {
            self.y0 - other.y1
        } else {
            0.0
        }
    }

    /// Horizontal gap between the two boxes; zero if they horizontally overlap.
    #[must_use]
    pub fn horizontal_distance(&self, other: &Self) -> f64 {
        if self.x1 < other.x0 {
            other.x0 - self.x1
        } else if other.x1 < self.x0 {
            self.x0 - other.x1
        } else {
            0.0
        }
    }

    /// Euclidean distance between centers; used for spatial-assignment cost matrices.
    #[must_use]
    pub fn center_distance(&self, other: &Self) -> f64 {
        let (cx0, cy0) = self.center();
        let (cx1, cy1) = other.center();
        ((cx1 - cx0).powi(2) + (cy1 - cy0).powi(2)).sqrt()
    }

    /// True if the two boxes' left edges (or, with `vertical = false`, top edges)
    /// line up within `tolerance` points. Used by classifiers that look for
    /// left-alignment between a part image and its count text.
    #[must_use]
    pub fn aligned(&self, other: &Self, tolerance: f64, vertical_edge: bool) -> bool {
        if vertical_edge {
            (self.x0 - other.x0).abs() <= tolerance
        } else {
            (self.y0 - other.y0).abs() <= tolerance
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_rectangle() {
        assert!(BBox::try_new(10.0, 0.0, 0.0, 10.0).is_err());
    }

    #[test]
    fn try_new_for_block_tags_the_error_with_the_real_block_id() {
        let err = BBox::try_new_for_block(42, 10.0, 0.0, 0.0, 10.0).unwrap_err();
        match err {
            LegoError::InvalidBBox { block_id, .. } => assert_eq!(block_id, 42),
            other => panic!("expected InvalidBBox, got {other:?}"),
        }
    }

    #[test]
    fn is_valid_detects_a_bbox_built_around_the_constructors() {
        let constructed_directly = BBox {
            x0: 10.0,
            y0: 0.0,
            x1: 0.0,
            y1: 10.0,
        };
        assert!(!constructed_directly.is_valid());
        assert!(BBox::new(0.0, 0.0, 10.0, 10.0).is_valid());
    }

    #[test]
    fn area_and_dims() {
        let b = BBox::new(0.0, 0.0, 10.0, 5.0);
        assert_eq!(b.width(), 10.0);
        assert_eq!(b.height(), 5.0);
        assert_eq!(b.area(), 50.0);
    }

    #[test]
    fn fully_inside() {
        let outer = BBox::new(0.0, 0.0, 100.0, 100.0);
        let inner = BBox::new(10.0, 10.0, 20.0, 20.0);
        assert!(inner.fully_inside(&outer));
        assert!(!outer.fully_inside(&inner));
    }

    #[test]
    fn overlap_area_and_iou() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(5.0, 5.0, 15.0, 15.0);
        assert_eq!(a.overlap_area(&b), 25.0);
        assert!((a.iou(&b) - (25.0 / 175.0)).abs() < 1e-9);
    }

    #[test]
    fn no_intersection_has_positive_distance() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(0.0, 20.0, 10.0, 30.0);
        assert!(!a.intersects(&b));
        assert_eq!(a.vertical_distance(&b), 10.0);
        assert_eq!(a.horizontal_distance(&b), 0.0);
    }

    proptest::proptest! {
        #[test]
        fn area_is_never_negative(x0 in -1000.0..1000.0f64, y0 in -1000.0..1000.0f64, w in 0.0..1000.0f64, h in 0.0..1000.0f64) {
            let b = BBox::new(x0, y0, x0 + w, y0 + h);
            proptest::prop_assert!(b.area() >= 0.0);
        }

        #[test]
        fn fully_inside_implies_overlap_equals_inner_area(
            x0 in 0.0..100.0f64, y0 in 0.0..100.0f64, w in 0.0..50.0f64, h in 0.0..50.0f64
        ) {
            let outer = BBox::new(0.0, 0.0, 200.0, 200.0);
            let inner = BBox::new(x0, y0, x0 + w, y0 + h);
            if inner.fully_inside(&outer) {
                proptest::prop_assert!((inner.overlap_area(&outer) - inner.area()).abs() < 1e-6);
            }
        }
    }
}
