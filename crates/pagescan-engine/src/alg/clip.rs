// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quad resampler — maps the interior of a four-corner region of the source
// image onto a flat rectangle, with nearest-neighbour or bilinear sampling.

use image::{Rgb, RgbImage};
use pagescan_core::{CornerQuad, Interpolation, Point, PointF, Size};
use tracing::{debug, instrument};

use super::geometry::{calc_aspect, line_fraction, line_fraction_f, point_distance};
use super::scheduler::{Band, BandAlgorithm, Scheduler};

const CHANNELS: usize = 3;

/// Texture-maps a corner quad of `src` into an upright rectangle.
///
/// The corners must already be in canonical order (see
/// [`CornerQuad::rearrange`]). The output is sized from the longer of each
/// pair of opposing quad edges so nothing is lost on the longer side.
pub struct ClipAlg<'a> {
    src: &'a RgbImage,
    pix_corners: [Point; 4],
    output_size: Size,
    sampling: Interpolation,
}

impl<'a> ClipAlg<'a> {
    pub fn new(src: &'a RgbImage, corners: &CornerQuad, sampling: Interpolation) -> Self {
        let max_x = (src.width() as f64 - 1.0).max(0.0);
        let max_y = (src.height() as f64 - 1.0).max(0.0);
        let pix_corners = corners
            .to_array()
            .map(|c| Point::new((c.x * max_x).round() as i32, (c.y * max_y).round() as i32));

        let [tl, tr, br, bl] = pix_corners;
        let output_size = Size::new(
            point_distance(tl, tr).max(point_distance(br, bl)),
            point_distance(tl, bl).max(point_distance(tr, br)),
        );

        Self {
            src,
            pix_corners,
            output_size,
            sampling,
        }
    }

    pub fn nearest(src: &'a RgbImage, corners: &CornerQuad) -> Self {
        Self::new(src, corners, Interpolation::Nearest)
    }

    pub fn bilinear(src: &'a RgbImage, corners: &CornerQuad) -> Self {
        Self::new(src, corners, Interpolation::Bilinear)
    }

    /// Corners in source pixel coordinates, canonical order.
    pub fn pixel_corners(&self) -> [Point; 4] {
        self.pix_corners
    }

    pub fn output_size(&self) -> Size {
        self.output_size
    }

    /// Shrink the output to fit within `max_size`, preserving aspect ratio.
    /// Never grows; a no-op when the output already fits.
    pub fn resize_output_by_max(&mut self, max_size: Size) {
        debug_assert!(max_size.is_valid(), "max size must be non-empty");
        self.output_size = calc_aspect(self.output_size, max_size, false);
    }

    /// Resample into a new image.
    #[instrument(skip(self, scheduler), fields(
        src_w = self.src.width(),
        src_h = self.src.height(),
        out = %self.output_size,
        sampling = ?self.sampling,
    ))]
    pub fn run(&self, scheduler: &Scheduler, parallelism: usize) -> RgbImage {
        let mut output = RgbImage::new(self.output_size.width, self.output_size.height);
        scheduler.run(self, &mut output, parallelism);
        debug!("Quad resampled");
        output
    }

    fn process_nearest(&self, band: Band, rows: &mut [u8]) {
        let [tl, tr, br, bl] = self.pix_corners;
        let den_h = self.output_size.height as i32 - 1;
        let den_w = self.output_size.width as i32 - 1;
        let row_bytes = self.row_bytes();

        for (y, row) in band.row_range().zip(rows.chunks_exact_mut(row_bytes)) {
            let left = line_fraction(y as i32, den_h, tl, bl);
            let right = line_fraction(y as i32, den_h, tr, br);
            for (x, out) in row.chunks_exact_mut(CHANNELS).enumerate() {
                let p = line_fraction(x as i32, den_w, left, right);
                if let Some(pixel) = self.sample(p.x as i64, p.y as i64) {
                    out.copy_from_slice(&pixel.0);
                }
            }
        }
    }

    fn process_bilinear(&self, band: Band, rows: &mut [u8]) {
        let [tl, tr, br, bl] = self.pix_corners.map(PointF::from);
        let den_h = self.output_size.height as i32 - 1;
        let den_w = self.output_size.width as i32 - 1;
        let row_bytes = self.row_bytes();

        for (y, row) in band.row_range().zip(rows.chunks_exact_mut(row_bytes)) {
            let left = line_fraction_f(y as i32, den_h, tl, bl);
            let right = line_fraction_f(y as i32, den_h, tr, br);
            for (x, out) in row.chunks_exact_mut(CHANNELS).enumerate() {
                let p = line_fraction_f(x as i32, den_w, left, right);
                out.copy_from_slice(&self.blend(p));
            }
        }
    }

    fn sample(&self, x: i64, y: i64) -> Option<Rgb<u8>> {
        if x < 0 || y < 0 || x >= self.src.width() as i64 || y >= self.src.height() as i64 {
            return None;
        }
        Some(*self.src.get_pixel(x as u32, y as u32))
    }

    /// Weighted blend of the four pixels around `p`.
    ///
    /// Neighbours outside the source contribute nothing; the remaining weights
    /// are not renormalized. Channels truncate toward zero.
    fn blend(&self, p: PointF) -> [u8; CHANNELS] {
        let ix = p.x.floor() as i64;
        let iy = p.y.floor() as i64;
        let fx = p.x - ix as f64;
        let fy = p.y - iy as f64;

        let Some(a) = self.sample(ix, iy) else {
            return [0; CHANNELS];
        };
        let b = self.sample(ix + 1, iy);
        let c = self.sample(ix, iy + 1);
        let d = self.sample(ix + 1, iy + 1);

        let mut out = [0u8; CHANNELS];
        for (ch, slot) in out.iter_mut().enumerate() {
            let at = |px: Rgb<u8>| px.0[ch] as f64;
            let top = match b {
                Some(b) => lerp(at(a), at(b), fx),
                None => (1.0 - fx) * at(a),
            };
            let value = match c {
                Some(c) => {
                    let bottom = match d {
                        Some(d) => lerp(at(c), at(d), fx),
                        None => (1.0 - fx) * at(c),
                    };
                    lerp(top, bottom, fy)
                }
                None => (1.0 - fy) * top,
            };
            *slot = value as u8;
        }
        out
    }
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

impl BandAlgorithm for ClipAlg<'_> {
    type Tally = ();

    fn height(&self) -> u32 {
        self.output_size.height
    }

    fn row_bytes(&self) -> usize {
        self.output_size.width as usize * CHANNELS
    }

    fn process(&self, band: Band, rows: &mut [u8]) {
        if rows.is_empty() {
            return;
        }
        match self.sampling {
            Interpolation::Nearest => self.process_nearest(band, rows),
            Interpolation::Bilinear => self.process_bilinear(band, rows),
        }
    }
}
