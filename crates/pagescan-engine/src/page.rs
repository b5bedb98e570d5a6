// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-page settings — the transform, clip and level ops of one scanned page,
// the flags recording which automatic checks have run, and the render chain.

use image::RgbImage;
use image::metadata::Orientation;
use pagescan_core::Size;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::alg::histogram::Histogram;
use crate::engine::Engine;
use crate::ops::{ClipOp, LevelOp, TransformOp};
use crate::scan::autoclip::{AutoClip, shrink_for_detection};

/// Standard deviation (in histogram bins) above which an automatic level
/// is computed but not recommended.
pub const AUTO_LEVEL_MAX_STD_DEV: f64 = 30.0;

/// How far the derived mid mark sits below the histogram mean, in standard
/// deviations.
const AUTO_LEVEL_STD_DEV_OFFSET: f64 = 1.5;

fn using_clip_on_load() -> bool {
    true
}

/// Outcome of one automatic check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The check had already run for this page.
    Skipped,
    /// The check ran but its result was not adopted.
    Rejected,
    /// The check ran and the page now uses its result.
    Adopted,
}

/// What [`PageSettings::run_auto_checks`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoChecks {
    pub transform: CheckOutcome,
    pub clip: CheckOutcome,
    pub level: CheckOutcome,
}

/// Everything recorded about one page except its file name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageSettings {
    pub transform_op: TransformOp,
    pub clip_op: ClipOp,
    pub level_op: LevelOp,
    #[serde(default = "using_clip_on_load")]
    pub using_clip: bool,
    pub using_level: bool,
    pub did_exif_check: bool,
    pub did_clip_check: bool,
    pub did_level_check: bool,
}

impl PageSettings {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Automatic parameters -------------------------------------------------

    /// The rotation that brings a photo tagged with `orientation` upright.
    pub fn compute_auto_transform_op(orientation: Orientation) -> TransformOp {
        TransformOp::from_orientation(orientation)
    }

    /// Run corner detection on an already shrunk page image.
    ///
    /// The detected corners go into `op`, which is marked configured either
    /// way. Returns whether any corner was found; the corners still need
    /// [`ClipOp::rearrange`] before use.
    pub fn compute_auto_clip_op(engine: &Engine, shrunk: &RgbImage, op: &mut ClipOp) -> bool {
        let detector = AutoClip::new(engine.scheduler(), engine.parallelism());
        let count = detector.detect(shrunk, op.corners_mut());
        op.set_configured(true);
        count > 0
    }

    /// Derive a level op from a page histogram.
    ///
    /// The mid mark goes 1.5 standard deviations below the mean. Returns
    /// whether the spread is low enough (text-like page) to recommend the
    /// result.
    pub fn compute_auto_level_op(histogram: &Histogram, op: &mut LevelOp) -> bool {
        let (mean, std_dev) = histogram.mean_and_std_dev();
        let mid = (mean - AUTO_LEVEL_STD_DEV_OFFSET * std_dev) as i32;
        op.set_magic_value(mid);
        debug!(mean, std_dev, mid, "Auto level derived");
        std_dev <= AUTO_LEVEL_MAX_STD_DEV
    }

    /// Run whichever automatic checks this page has not had yet and adopt
    /// their results when recommended.
    ///
    /// `image` is the page as loaded, before any op, and `orientation` its EXIF
    /// tag. The EXIF check sets the rotation first. Corner detection runs on a
    /// shrunk copy of the rotated page; the level histogram is taken from the
    /// rotated and (if in use) clipped page.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn run_auto_checks(
        &mut self,
        engine: &Engine,
        image: &RgbImage,
        orientation: Orientation,
    ) -> AutoChecks {
        if self.did_exif_check && self.did_clip_check && self.did_level_check {
            return AutoChecks {
                transform: CheckOutcome::Skipped,
                clip: CheckOutcome::Skipped,
                level: CheckOutcome::Skipped,
            };
        }

        let transform = if self.did_exif_check {
            CheckOutcome::Skipped
        } else {
            self.did_exif_check = true;
            self.transform_op = Self::compute_auto_transform_op(orientation);
            if self.transform_op.is_reset() {
                CheckOutcome::Rejected
            } else {
                info!(rotate_code = self.transform_op.rotate_code(), "Adopting EXIF rotation");
                CheckOutcome::Adopted
            }
        };

        let rotated = self.transform_op.apply(image.clone());

        let clip = if self.did_clip_check {
            CheckOutcome::Skipped
        } else {
            self.did_clip_check = true;
            let mut detected = ClipOp::new();
            if Self::compute_auto_clip_op(engine, &shrink_for_detection(&rotated), &mut detected) {
                detected.rearrange();
                info!(corners = ?detected.corners(), "Adopting detected clip");
                self.clip_op = detected;
                self.using_clip = true;
                CheckOutcome::Adopted
            } else {
                CheckOutcome::Rejected
            }
        };

        let level = if self.did_level_check {
            CheckOutcome::Skipped
        } else {
            self.did_level_check = true;
            let pre_level = if self.using_clip {
                self.clip_op.apply(engine, rotated, None)
            } else {
                rotated
            };
            let histogram =
                Histogram::compute(engine.scheduler(), &pre_level, engine.parallelism());
            let mut derived = LevelOp::new();
            if Self::compute_auto_level_op(&histogram, &mut derived) {
                info!(marks = ?derived.marks(), "Adopting automatic level");
                self.level_op = derived;
                self.using_level = true;
                CheckOutcome::Adopted
            } else {
                CheckOutcome::Rejected
            }
        };

        AutoChecks {
            transform,
            clip,
            level,
        }
    }

    // -- Rendering ------------------------------------------------------------

    /// Apply transform, then clip (if in use), then level (if in use).
    ///
    /// `max_size` bounds the clip output; unclipped pages keep their size.
    #[instrument(skip_all, fields(
        width = image.width(),
        height = image.height(),
        using_clip = self.using_clip,
        using_level = self.using_level,
    ))]
    pub fn render(&self, engine: &Engine, image: RgbImage, max_size: Option<Size>) -> RgbImage {
        let mut page = self.transform_op.apply(image);
        if self.using_clip {
            page = self.clip_op.apply(engine, page, max_size);
        }
        if self.using_level {
            page = self.level_op.apply(engine, page);
        }
        page
    }

    /// [`render`](Self::render) bounded by the configured preview size.
    pub fn render_preview(&self, engine: &Engine, image: RgbImage) -> RgbImage {
        self.render(engine, image, engine.config().preview_max_size)
    }
}
