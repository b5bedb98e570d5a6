// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corner auto-detection — threshold the page against its background, then walk
// inward from each image corner with a butterfly scan until the page is hit.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use pagescan_core::{CornerQuad, PointF, Size};
use tracing::{debug, info, instrument};

use crate::alg::geometry::calc_aspect_even;
use crate::alg::scheduler::Scheduler;
use crate::alg::threshold::{AverageAbove, ThresholdAlg};

/// Images smaller than this on either axis are never searched.
pub const MIN_IMAGE_DIMENSION: u32 = 10;

/// Frame the detector input is shrunk into by [`shrink_for_detection`].
pub const DETECTION_FRAME: Size = Size::new(400, 400);

const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);

/// Scan origin and inward diagonal step for each canonical corner.
const CORNER_WALKS: [(bool, bool, i64, i64); 4] = [
    // (origin at right edge, origin at bottom edge, dx, dy)
    (false, false, 1, 1),
    (true, false, -1, 1),
    (true, true, -1, -1),
    (false, true, 1, -1),
];

/// Finds the four corners of a light page on a dark background.
pub struct AutoClip<'a> {
    scheduler: &'a Scheduler,
    parallelism: usize,
}

impl<'a> AutoClip<'a> {
    pub fn new(scheduler: &'a Scheduler, parallelism: usize) -> Self {
        Self {
            scheduler,
            parallelism,
        }
    }

    /// Detect page corners in `input`, writing them into `corners`.
    ///
    /// Returns how many of the four corners differ from the reset quad; zero
    /// means detection failed. `corners` is untouched when the image is too
    /// small or its foreground coverage is unusable. Detected corners must be
    /// passed through [`CornerQuad::rearrange`] before resampling.
    pub fn detect(&self, input: &RgbImage, corners: &mut CornerQuad) -> usize {
        self.detect_with_mask(input, corners).0
    }

    /// Like [`detect`](Self::detect), also returning the image the search ran
    /// on: the threshold mask on success, a copy of `input` otherwise.
    #[instrument(skip_all, fields(width = input.width(), height = input.height()))]
    pub fn detect_with_mask(
        &self,
        input: &RgbImage,
        corners: &mut CornerQuad,
    ) -> (usize, RgbImage) {
        if input.width() < MIN_IMAGE_DIMENSION || input.height() < MIN_IMAGE_DIMENSION {
            debug!("Image below minimum size, skipping corner detection");
            return (0, input.clone());
        }

        let threshold = ThresholdAlg::new(input, AverageAbove::default())
            .run(self.scheduler, self.parallelism);
        let percent = threshold.percent_true();
        if percent <= 50 || percent >= 100 {
            debug!(percent, "Foreground coverage unusable for corner detection");
            return (0, input.clone());
        }

        let found = find_corners(threshold.output(), corners);
        if found == 0 {
            return (0, input.clone());
        }

        info!(found, percent, "Page corners detected");
        (found, threshold.into_output())
    }
}

/// Butterfly-scan each corner of `mask` for the first non-black pixel.
///
/// Each corner starts at its reset position. At depth `d` the scan visits the
/// anti-diagonal through the point `d` steps in from the corner, moving
/// outward from the centre one pixel per side at a time. Pixels outside the
/// image count as background. The search gives up after `width / 4` steps.
///
/// Returns the number of corners that end up away from their reset position,
/// which can be fewer than the number the scan actually hit.
pub fn find_corners(mask: &RgbImage, corners: &mut CornerQuad) -> usize {
    let width = mask.width() as i64;
    let height = mask.height() as i64;
    let max_depth = width / 4;

    let is_foreground = |x: i64, y: i64| {
        (0..width).contains(&x)
            && (0..height).contains(&y)
            && *mask.get_pixel(x as u32, y as u32) != BACKGROUND
    };

    for (index, &(right, bottom, dx, dy)) in CORNER_WALKS.iter().enumerate() {
        corners[index] = CornerQuad::RESET[index];

        let top_x = if right { width - 1 } else { 0 };
        let top_y = if bottom { height - 1 } else { 0 };
        // Perpendicular to the walk direction.
        let (wing_x, wing_y) = (dx, -dy);

        let hit = (0..max_depth).find_map(|d| {
            let base_x = top_x + dx * d;
            let base_y = top_y + dy * d;
            (0..=d).find_map(|sub| {
                let (ox, oy) = (sub * wing_x, sub * wing_y);
                if is_foreground(base_x + ox, base_y + oy) {
                    Some((base_x + ox, base_y + oy))
                } else if is_foreground(base_x - ox, base_y - oy) {
                    Some((base_x - ox, base_y - oy))
                } else {
                    None
                }
            })
        });

        if let Some((x, y)) = hit {
            corners[index] = PointF::new(
                x as f64 / (width - 1) as f64,
                y as f64 / (height - 1) as f64,
            );
        }
    }

    let differing = corners
        .to_array()
        .iter()
        .zip(CornerQuad::RESET.to_array())
        .filter(|(corner, default)| **corner != *default)
        .count();
    debug!(differing, "Corner search finished");
    differing
}

/// Downsample `image` by a whole-number factor so it fits [`DETECTION_FRAME`].
///
/// Small images are returned as a copy.
pub fn shrink_for_detection(image: &RgbImage) -> RgbImage {
    let current = Size::new(image.width(), image.height());
    let target = calc_aspect_even(current, DETECTION_FRAME);
    if target == current || !target.is_valid() {
        return image.clone();
    }
    debug!(from = %current, to = %target, "Shrinking image for corner detection");
    imageops::resize(image, target.width, target.height, FilterType::Triangle)
}
