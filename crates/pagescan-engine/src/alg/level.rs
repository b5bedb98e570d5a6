// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tone-curve mapping — a three-mark piecewise-linear curve remapped into an
// output range, applied per RGB channel or to the HSV value channel.

use image::{Rgb, RgbImage};
use pagescan_core::{LevelMode, MID_OUT, MarkArray, RangeArray, WHITE};
use tracing::instrument;

use super::hsv::Hsv;
use super::scheduler::{Band, BandAlgorithm, Scheduler};

const CHANNELS: usize = 3;

/// Black/mid/white marks plus the output range they map into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneCurve {
    marks: MarkArray,
    range: RangeArray,
}

impl ToneCurve {
    /// Marks must be non-decreasing and the range strictly increasing.
    pub fn new(marks: MarkArray, range: RangeArray) -> Self {
        debug_assert!(
            marks[0] <= marks[1] && marks[1] <= marks[2],
            "marks out of order: {marks:?}"
        );
        debug_assert!(range[0] < range[1], "empty output range: {range:?}");
        Self { marks, range }
    }

    pub fn marks(&self) -> MarkArray {
        self.marks
    }

    pub fn range(&self) -> RangeArray {
        self.range
    }

    /// The piecewise curve alone, 0..=255, before the range remap.
    pub fn level(&self, value: i32) -> i32 {
        let [lo, mid, hi] = self.marks;
        let out = if value == mid {
            MID_OUT
        } else if value <= lo {
            0
        } else if value >= hi {
            WHITE
        } else if value < mid {
            MID_OUT * (value - lo) / (mid - lo)
        } else {
            MID_OUT + (WHITE - MID_OUT) * (value - mid) / (hi - mid)
        };
        debug_assert!((0..=WHITE).contains(&out));
        out
    }

    /// Scale a curve output into the configured range.
    pub fn remap(&self, level: i32) -> i32 {
        let [range_lo, range_hi] = self.range;
        range_lo + (range_hi - range_lo) * level / WHITE
    }

    /// Curve then range remap for one channel value.
    pub fn cap_channel(&self, value: i32) -> i32 {
        self.remap(self.level(value))
    }
}

/// Applies a [`ToneCurve`] to every pixel of the source.
pub struct LevelAlg<'a> {
    src: &'a RgbImage,
    curve: ToneCurve,
    mode: LevelMode,
}

impl<'a> LevelAlg<'a> {
    pub fn new(src: &'a RgbImage, curve: ToneCurve, mode: LevelMode) -> Self {
        Self { src, curve, mode }
    }

    /// Per-channel mapping with range remap.
    pub fn rgb(src: &'a RgbImage, marks: MarkArray, range: RangeArray) -> Self {
        Self::new(src, ToneCurve::new(marks, range), LevelMode::Rgb)
    }

    /// HSV value mapping. The range is not used.
    pub fn legacy(src: &'a RgbImage, marks: MarkArray) -> Self {
        Self::new(src, ToneCurve::new(marks, [0, WHITE]), LevelMode::LegacyHsv)
    }

    #[instrument(skip(self, scheduler), fields(
        width = self.src.width(),
        height = self.src.height(),
        marks = ?self.curve.marks,
        mode = ?self.mode,
    ))]
    pub fn run(&self, scheduler: &Scheduler, parallelism: usize) -> RgbImage {
        let mut output = RgbImage::new(self.src.width(), self.src.height());
        scheduler.run(self, &mut output, parallelism);
        output
    }

    fn map_pixel(&self, pixel: Rgb<u8>) -> Rgb<u8> {
        match self.mode {
            LevelMode::Rgb => Rgb(pixel.0.map(|c| self.curve.cap_channel(c as i32) as u8)),
            LevelMode::LegacyHsv => {
                let hsv = Hsv::from_rgb(pixel);
                match self.curve.level(hsv.value) {
                    // Pin the extremes; the HSV round trip greys them out.
                    0 => Rgb([0, 0, 0]),
                    WHITE => Rgb([255, 255, 255]),
                    value => hsv.with_value(value).to_rgb(),
                }
            }
        }
    }
}

impl BandAlgorithm for LevelAlg<'_> {
    type Tally = ();

    fn height(&self) -> u32 {
        self.src.height()
    }

    fn row_bytes(&self) -> usize {
        self.src.width() as usize * CHANNELS
    }

    fn process(&self, band: Band, rows: &mut [u8]) {
        if rows.is_empty() {
            return;
        }
        for (y, row) in band.row_range().zip(rows.chunks_exact_mut(self.row_bytes())) {
            for (x, out) in row.chunks_exact_mut(CHANNELS).enumerate() {
                let mapped = self.map_pixel(*self.src.get_pixel(x as u32, y));
                out.copy_from_slice(&mapped.0);
            }
        }
    }
}
