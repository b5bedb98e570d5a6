// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Pagescan engine: sizes, points, corner quads, and
// the tone-curve mark/range arrays.

use serde::{Deserialize, Serialize};

/// Brightest channel value.
pub const WHITE: i32 = 255;

/// Output level assigned to the mid (gray) mark of a tone curve.
pub const MID_OUT: i32 = 127;

/// Black-point, mid-gray and white-point of a tone curve, each in 0..=255.
pub type MarkArray = [i32; 3];

/// Output remap interval `[lo, hi]` of a tone curve, each in 0..=255.
pub type RangeArray = [i32; 2];

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when both dimensions are non-zero.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// True when this size fits within `frame` on both axes.
    pub fn fits_within(&self, frame: Size) -> bool {
        self.width <= frame.width && self.height <= frame.height
    }

    /// Same size with width and height exchanged.
    pub fn transposed(&self) -> Self {
        Self::new(self.height, self.width)
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Integer pixel-space coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Floating coordinate. In a [`CornerQuad`] both axes are normalized to 0..1.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

impl PointF {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn capped(self) -> Self {
        Self::new(self.x.clamp(0.0, 1.0), self.y.clamp(0.0, 1.0))
    }
}

impl From<Point> for PointF {
    fn from(p: Point) -> Self {
        Self::new(p.x as f64, p.y as f64)
    }
}

/// Four normalized corners of a clip region.
///
/// Canonical order is top-left, top-right, bottom-right, bottom-left. Corners
/// coming out of auto-detection or user dragging are in arbitrary order until
/// [`CornerQuad::rearrange`] is called.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerQuad {
    #[serde(rename = "topLeft")]
    pub top_left: PointF,
    #[serde(rename = "topRight")]
    pub top_right: PointF,
    #[serde(rename = "bottomRight")]
    pub bottom_right: PointF,
    #[serde(rename = "bottomLeft")]
    pub bottom_left: PointF,
}

impl CornerQuad {
    /// The whole image; means "no clip configured".
    pub const RESET: CornerQuad = CornerQuad {
        top_left: PointF::new(0.0, 0.0),
        top_right: PointF::new(1.0, 0.0),
        bottom_right: PointF::new(1.0, 1.0),
        bottom_left: PointF::new(0.0, 1.0),
    };

    pub fn from_array(corners: [PointF; 4]) -> Self {
        let [top_left, top_right, bottom_right, bottom_left] = corners;
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    pub fn to_array(&self) -> [PointF; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    pub fn is_reset(&self) -> bool {
        *self == Self::RESET
    }

    pub fn reset(&mut self) {
        *self = Self::RESET;
    }

    /// Clamp every coordinate into 0..=1.
    pub fn cap(&mut self) {
        *self = Self::from_array(self.to_array().map(PointF::capped));
    }

    /// Put the corners into top-left, top-right, bottom-right, bottom-left order.
    ///
    /// The two leftmost points (by X, ties broken by Y) form the left edge and
    /// the other two the right edge; each pair is then ordered by Y.
    pub fn rearrange(&mut self) {
        let mut c = self.to_array();
        c.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));

        // The second point in X order belongs on the left edge, i.e. last slot.
        c.swap(1, 3);

        if c[3].y < c[0].y {
            c.swap(0, 3);
        }
        if c[2].y < c[1].y {
            c.swap(1, 2);
        }

        *self = Self::from_array(c);
    }
}

impl Default for CornerQuad {
    fn default() -> Self {
        Self::RESET
    }
}

impl std::ops::Index<usize> for CornerQuad {
    type Output = PointF;

    fn index(&self, index: usize) -> &PointF {
        match index {
            0 => &self.top_left,
            1 => &self.top_right,
            2 => &self.bottom_right,
            3 => &self.bottom_left,
            _ => panic!("corner index {index} out of range"),
        }
    }
}

impl std::ops::IndexMut<usize> for CornerQuad {
    fn index_mut(&mut self, index: usize) -> &mut PointF {
        match index {
            0 => &mut self.top_left,
            1 => &mut self.top_right,
            2 => &mut self.bottom_right,
            3 => &mut self.bottom_left,
            _ => panic!("corner index {index} out of range"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(points: [(f64, f64); 4]) -> CornerQuad {
        CornerQuad::from_array(points.map(|(x, y)| PointF::new(x, y)))
    }

    #[test]
    fn reset_quad_is_reset() {
        assert!(CornerQuad::RESET.is_reset());
        assert!(CornerQuad::default().is_reset());

        let mut q = quad([(0.1, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        assert!(!q.is_reset());
        q.reset();
        assert!(q.is_reset());
    }

    #[test]
    fn rearrange_sorts_shuffled_corners() {
        let mut q = quad([(0.9, 0.95), (0.1, 0.05), (0.05, 0.9), (0.95, 0.1)]);
        q.rearrange();
        assert_eq!(q.top_left, PointF::new(0.1, 0.05));
        assert_eq!(q.top_right, PointF::new(0.95, 0.1));
        assert_eq!(q.bottom_right, PointF::new(0.9, 0.95));
        assert_eq!(q.bottom_left, PointF::new(0.05, 0.9));
    }

    #[test]
    fn rearrange_leaves_canonical_quad_unchanged() {
        let mut q = CornerQuad::RESET;
        q.rearrange();
        assert_eq!(q, CornerQuad::RESET);

        let canonical = quad([(0.1, 0.2), (0.8, 0.1), (0.9, 0.9), (0.2, 0.8)]);
        let mut q = canonical;
        q.rearrange();
        assert_eq!(q, canonical);
    }

    #[test]
    fn rearrange_is_idempotent() {
        let mut once = quad([(0.5, 0.5), (0.5, 0.0), (0.0, 0.5), (0.0, 0.0)]);
        once.rearrange();
        let mut twice = once;
        twice.rearrange();
        assert_eq!(once, twice);
    }

    #[test]
    fn cap_clamps_into_unit_square() {
        let mut q = quad([(-0.2, 0.1), (1.4, -3.0), (0.5, 1.01), (0.0, 1.0)]);
        q.cap();
        assert_eq!(q, quad([(0.0, 0.1), (1.0, 0.0), (0.5, 1.0), (0.0, 1.0)]));
    }

    #[test]
    fn quad_indexing_follows_canonical_order() {
        let mut q = CornerQuad::RESET;
        assert_eq!(q[2], PointF::new(1.0, 1.0));
        q[3] = PointF::new(0.25, 0.75);
        assert_eq!(q.bottom_left, PointF::new(0.25, 0.75));
    }

    #[test]
    fn quad_serializes_with_named_corners() {
        let json = serde_json::to_string(&CornerQuad::RESET).unwrap();
        assert!(json.contains("\"topLeft\""));
        assert!(json.contains("\"bottomLeft\""));
        let back: CornerQuad = serde_json::from_str(&json).unwrap();
        assert!(back.is_reset());
    }

    #[test]
    fn size_helpers() {
        let s = Size::new(200, 100);
        assert!(s.is_valid());
        assert!(!Size::new(0, 10).is_valid());
        assert!(s.fits_within(Size::new(200, 100)));
        assert!(!s.fits_within(Size::new(199, 100)));
        assert_eq!(s.transposed(), Size::new(100, 200));
        assert_eq!(s.to_string(), "200x100");
    }
}
