// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-page crop: a corner quad plus whether it has been configured.

use image::RgbImage;
use pagescan_core::{CornerQuad, Size};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::alg::clip::ClipAlg;
use crate::engine::Engine;

fn configured_on_load() -> bool {
    true
}

/// Crop and de-skew state of one page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClipOp {
    #[serde(flatten)]
    corners: CornerQuad,
    /// Set once the corners have been filled in, by detection or by hand.
    /// Stored projects predating the flag are treated as configured.
    #[serde(default = "configured_on_load")]
    configured: bool,
}

impl ClipOp {
    pub fn new() -> Self {
        Self::default()
    }

    /// A configured op with the given corners.
    pub fn with_corners(corners: CornerQuad) -> Self {
        Self {
            corners,
            configured: true,
        }
    }

    pub fn corners(&self) -> &CornerQuad {
        &self.corners
    }

    pub fn corners_mut(&mut self) -> &mut CornerQuad {
        &mut self.corners
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn set_configured(&mut self, configured: bool) {
        self.configured = configured;
    }

    pub fn is_reset(&self) -> bool {
        self.corners.is_reset()
    }

    /// Back to the whole image. The configured flag is kept.
    pub fn reset(&mut self) {
        self.corners.reset();
    }

    pub fn cap(&mut self) {
        self.corners.cap();
    }

    pub fn rearrange(&mut self) {
        self.corners.rearrange();
    }

    /// Resample the quad out of `image`, shrinking the result to fit
    /// `max_size` when given. Passthrough when reset or unconfigured.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn apply(&self, engine: &Engine, image: RgbImage, max_size: Option<Size>) -> RgbImage {
        if self.is_reset() || !self.configured {
            return image;
        }

        let mut alg = ClipAlg::new(&image, &self.corners, engine.config().interpolation);
        if let Some(max_size) = max_size.filter(Size::is_valid) {
            alg.resize_output_by_max(max_size);
        }
        alg.run(engine.scheduler(), engine.parallelism())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use pagescan_core::{EngineConfig, Interpolation, PointF};

    fn engine(interpolation: Interpolation) -> Engine {
        Engine::new(EngineConfig {
            worker_threads: 2,
            interpolation,
            ..EngineConfig::default()
        })
        .unwrap()
    }

    fn inset() -> CornerQuad {
        CornerQuad::from_array([
            PointF::new(0.25, 0.25),
            PointF::new(0.75, 0.25),
            PointF::new(0.75, 0.75),
            PointF::new(0.25, 0.75),
        ])
    }

    #[test]
    fn reset_op_is_passthrough() {
        let img = RgbImage::from_fn(9, 7, |x, y| Rgb([x as u8, y as u8, 3]));
        let op = ClipOp::with_corners(CornerQuad::RESET);
        assert!(op.is_reset());
        assert_eq!(op.apply(&engine(Interpolation::Bilinear), img.clone(), None), img);
    }

    #[test]
    fn unconfigured_op_is_passthrough() {
        let img = RgbImage::new(41, 41);
        let mut op = ClipOp::new();
        *op.corners_mut() = inset();
        assert!(!op.is_configured());
        let out = op.apply(&engine(Interpolation::Nearest), img, None);
        assert_eq!(out.dimensions(), (41, 41));
    }

    #[test]
    fn configured_op_crops_and_respects_max_size() {
        let img = RgbImage::from_pixel(41, 41, Rgb([60, 70, 80]));
        let op = ClipOp::with_corners(inset());
        let engine = engine(Interpolation::Nearest);

        let full = op.apply(&engine, img.clone(), None);
        assert_eq!(full.dimensions(), (20, 20));
        assert!(full.pixels().all(|p| *p == Rgb([60, 70, 80])));

        let small = op.apply(&engine, img, Some(Size::new(10, 5)));
        assert_eq!(small.dimensions(), (5, 5));
    }

    #[test]
    fn cap_and_rearrange_repair_user_corners() {
        let mut op = ClipOp::with_corners(CornerQuad::from_array([
            PointF::new(1.2, 0.9),
            PointF::new(-0.1, 0.1),
            PointF::new(0.9, 0.05),
            PointF::new(0.1, 0.95),
        ]));
        op.cap();
        op.rearrange();
        assert_eq!(
            op.corners().to_array(),
            [
                PointF::new(0.0, 0.1),
                PointF::new(0.9, 0.05),
                PointF::new(1.0, 0.9),
                PointF::new(0.1, 0.95),
            ]
        );
        op.reset();
        assert!(op.is_reset());
        assert!(op.is_configured());
    }

    #[test]
    fn stored_corners_load_as_configured() {
        let json = r#"{
            "topLeft": { "x": 0.1, "y": 0.1 },
            "topRight": { "x": 0.9, "y": 0.1 },
            "bottomRight": { "x": 0.9, "y": 0.9 },
            "bottomLeft": { "x": 0.1, "y": 0.9 }
        }"#;
        let op: ClipOp = serde_json::from_str(json).unwrap();
        assert!(op.is_configured());
        assert_eq!(op.corners().top_right, PointF::new(0.9, 0.1));

        let json = serde_json::to_string(&ClipOp::new()).unwrap();
        let back: ClipOp = serde_json::from_str(&json).unwrap();
        assert!(!back.is_configured());
    }
}
