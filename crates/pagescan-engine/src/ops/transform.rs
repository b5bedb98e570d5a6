// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rotation in quarter turns.

use image::metadata::Orientation;
use image::{RgbImage, imageops};
use pagescan_core::Size;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Clockwise rotation applied to a page before clipping.
///
/// `rotate_code` is the number of clockwise quarter turns: 0 = none,
/// 1 = 90°, 2 = 180°, 3 = 270° (90° counter-clockwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformOp {
    rotate_code: u8,
}

impl TransformOp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a stored code, wrapping it into 0..4.
    pub fn from_rotate_code(code: i32) -> Self {
        Self {
            rotate_code: code.rem_euclid(4) as u8,
        }
    }

    /// The quarter turns that bring an EXIF-tagged photo upright.
    ///
    /// Mirrored orientations keep only their rotation part.
    pub fn from_orientation(orientation: Orientation) -> Self {
        let code = match orientation {
            Orientation::NoTransforms | Orientation::FlipHorizontal => 0,
            Orientation::Rotate90 | Orientation::Rotate90FlipH => 1,
            Orientation::Rotate180 | Orientation::FlipVertical => 2,
            Orientation::Rotate270 | Orientation::Rotate270FlipH => 3,
        };
        Self::from_rotate_code(code)
    }

    pub fn rotate_code(&self) -> u8 {
        self.rotate_code
    }

    pub fn is_reset(&self) -> bool {
        self.rotate_code == 0
    }

    pub fn reset(&mut self) {
        self.rotate_code = 0;
    }

    pub fn rotate_left(&mut self) {
        self.rotate_code = (self.rotate_code + 3) % 4;
    }

    pub fn rotate_right(&mut self) {
        self.rotate_code = (self.rotate_code + 1) % 4;
    }

    /// Rotate `image`; unchanged when no rotation is set.
    pub fn apply(&self, image: RgbImage) -> RgbImage {
        match self.rotate_code {
            0 => image,
            code => {
                debug!(code, "Rotating page");
                match code {
                    1 => imageops::rotate90(&image),
                    2 => imageops::rotate180(&image),
                    _ => imageops::rotate270(&image),
                }
            }
        }
    }

    /// The size `apply` would produce for an input of `size`.
    pub fn apply_size(&self, size: Size) -> Size {
        if self.rotate_code % 2 == 1 {
            size.transposed()
        } else {
            size
        }
    }
}
