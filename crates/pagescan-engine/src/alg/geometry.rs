// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometry helpers — pixel distances, linear interpolation between points, and
// aspect-preserving size fitting.

use pagescan_core::{Point, PointF, Size};

/// Euclidean distance between two pixel coordinates, truncated to an integer.
pub fn point_distance(p0: Point, p1: Point) -> u32 {
    let dx = (p0.x - p1.x) as f64;
    let dy = (p0.y - p1.y) as f64;
    (dx * dx + dy * dy).sqrt() as u32
}

/// The point `num / den` of the way from `p0` to `p1`, in integer arithmetic.
///
/// Intermediate results truncate toward zero. A zero denominator (a one-pixel
/// output axis) yields `p0`.
pub fn line_fraction(num: i32, den: i32, p0: Point, p1: Point) -> Point {
    if den == 0 {
        return p0;
    }
    let (num, den) = (num as i64, den as i64);
    Point::new(
        (num * (p1.x - p0.x) as i64 / den + p0.x as i64) as i32,
        (num * (p1.y - p0.y) as i64 / den + p0.y as i64) as i32,
    )
}

/// Floating variant of [`line_fraction`].
pub fn line_fraction_f(num: i32, den: i32, p0: PointF, p1: PointF) -> PointF {
    if den == 0 {
        return p0;
    }
    let (num, den) = (num as f64, den as f64);
    PointF::new(
        num * (p1.x - p0.x) / den + p0.x,
        num * (p1.y - p0.y) / den + p0.y,
    )
}

/// Scale `current` to fit `wanted_frame`, preserving aspect ratio.
///
/// Without `grow_to_fit`, a size that already fits is returned unchanged.
/// Otherwise both axes are scaled by the smaller of the two frame ratios and
/// truncated.
pub fn calc_aspect(current: Size, wanted_frame: Size, grow_to_fit: bool) -> Size {
    if !grow_to_fit && current.fits_within(wanted_frame) {
        return current;
    }

    let scale_rows = wanted_frame.height as f64 / current.height as f64;
    let scale_cols = wanted_frame.width as f64 / current.width as f64;
    let scale = scale_rows.min(scale_cols);

    Size::new(
        (scale * current.width as f64) as u32,
        (scale * current.height as f64) as u32,
    )
}

/// Shrink `current` into `wanted_frame` by a whole-number divisor.
///
/// A size strictly smaller than the frame on both axes is returned unchanged.
/// Otherwise both axes are divided by `ceil(1 / scale)`, which keeps pixel
/// blocks even for a fast downsample.
pub fn calc_aspect_even(current: Size, wanted_frame: Size) -> Size {
    if current.width < wanted_frame.width && current.height < wanted_frame.height {
        return current;
    }

    let scale_rows = wanted_frame.height as f64 / current.height as f64;
    let scale_cols = wanted_frame.width as f64 / current.width as f64;
    let scale = scale_rows.min(scale_cols);
    if scale.is_nan() || scale <= 0.0 {
        return current;
    }

    let divisor = (1.0 / scale).ceil() as u32;
    if divisor > 1 {
        Size::new(current.width / divisor, current.height / divisor)
    } else {
        current
    }
}
