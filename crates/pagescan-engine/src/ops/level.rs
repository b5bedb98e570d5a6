// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-page tone adjustment: tone-curve marks and output range, with the
// "magic value" and brightness/contrast views the editor sliders work in.

use image::RgbImage;
use pagescan_core::{MID_OUT, MarkArray, RangeArray, WHITE};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::alg::level::{LevelAlg, ToneCurve};
use crate::engine::Engine;

const RESET_MARKS: MarkArray = [0, MID_OUT, WHITE];
const RESET_RANGE: RangeArray = [0, WHITE];

/// Largest magnitude the brightness and contrast sliders produce.
pub const BC_LIMIT: i32 = 127;

/// Tone state of one page.
///
/// Stored as plain `lo`/`mid`/`hi` marks plus an optional `range_lo`/`range_hi`
/// pair (missing range fields mean the full 0..255 range).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredLevel", into = "StoredLevel")]
pub struct LevelOp {
    marks: MarkArray,
    range: RangeArray,
}

#[derive(Serialize, Deserialize)]
struct StoredLevel {
    lo: i32,
    mid: i32,
    hi: i32,
    #[serde(default = "range_lo")]
    range_lo: i32,
    #[serde(default = "range_hi")]
    range_hi: i32,
}

fn range_lo() -> i32 {
    RESET_RANGE[0]
}

fn range_hi() -> i32 {
    RESET_RANGE[1]
}

impl From<StoredLevel> for LevelOp {
    fn from(s: StoredLevel) -> Self {
        Self {
            marks: [s.lo, s.mid, s.hi],
            range: [s.range_lo, s.range_hi],
        }
    }
}

impl From<LevelOp> for StoredLevel {
    fn from(op: LevelOp) -> Self {
        let [lo, mid, hi] = op.marks;
        let [range_lo, range_hi] = op.range;
        Self {
            lo,
            mid,
            hi,
            range_lo,
            range_hi,
        }
    }
}

impl Default for LevelOp {
    /// Magic value at mid-gray, which is not the reset state.
    fn default() -> Self {
        let mut op = Self {
            marks: RESET_MARKS,
            range: RESET_RANGE,
        };
        op.set_magic_value(MID_OUT);
        op
    }
}

impl LevelOp {
    pub fn new() -> Self {
        Self::default()
    }

    /// The identity op.
    pub fn identity() -> Self {
        Self {
            marks: RESET_MARKS,
            range: RESET_RANGE,
        }
    }

    pub fn marks(&self) -> MarkArray {
        self.marks
    }

    pub fn range(&self) -> RangeArray {
        self.range
    }

    pub fn curve(&self) -> ToneCurve {
        ToneCurve::new(self.marks, self.range)
    }

    pub fn reset(&mut self) {
        self.marks = RESET_MARKS;
        self.range = RESET_RANGE;
    }

    pub fn is_reset(&self) -> bool {
        self.marks == RESET_MARKS && self.range == RESET_RANGE
    }

    /// Run the tone mapper picked by the engine config. Passthrough when reset.
    #[instrument(skip_all, fields(marks = ?self.marks, range = ?self.range))]
    pub fn apply(&self, engine: &Engine, image: RgbImage) -> RgbImage {
        if self.is_reset() {
            return image;
        }
        LevelAlg::new(&image, self.curve(), engine.config().level_mode)
            .run(engine.scheduler(), engine.parallelism())
    }

    // -- Magic value ----------------------------------------------------------

    /// Place the curve around `mid`: black point 20 below, white point 10
    /// above, all clamped to 0..=255. Resets the output range.
    pub fn set_magic_value(&mut self, mid: i32) {
        self.marks = [mid - 20, mid, mid + 10].map(|m| m.clamp(0, WHITE));
        self.range = RESET_RANGE;
    }

    pub fn magic_value(&self) -> i32 {
        self.marks[1]
    }

    // -- Brightness / contrast ------------------------------------------------

    /// Rebuild marks and range from slider values.
    ///
    /// Negative brightness pulls the range top down, positive pushes the range
    /// bottom up. Negative contrast narrows the range from both ends, positive
    /// steepens the curve by moving the black and white points inward. Both
    /// inputs are clamped to `-BC_LIMIT..=BC_LIMIT`.
    pub fn set_bc_value(&mut self, brightness: i32, contrast: i32) {
        self.reset();
        let brightness = brightness.clamp(-BC_LIMIT, BC_LIMIT);
        let contrast = contrast.clamp(-BC_LIMIT, BC_LIMIT);

        if brightness < 0 {
            self.range[1] += brightness;
        } else if brightness > 0 {
            self.range[0] += brightness;
        }

        if contrast < 0 {
            self.range[0] -= contrast;
            self.range[1] += contrast;
        } else if contrast > 0 {
            self.marks[0] += contrast;
            self.marks[2] -= contrast;
        }

        if self.marks[0] >= self.marks[1] {
            self.marks[0] = self.marks[1] - 1;
        }
        if self.marks[2] <= self.marks[1] {
            self.marks[2] = self.marks[1] + 1;
        }
        if self.range[0] >= self.range[1] {
            self.range.swap(0, 1);
        }
    }

    fn range_insets(&self) -> (i32, i32, i32) {
        let left = self.range[0];
        let right = WHITE - self.range[1];
        (left, right, left.min(right))
    }

    pub fn brightness_value(&self) -> i32 {
        let (left, right, common) = self.range_insets();
        if left > common {
            left - common
        } else if right > common {
            -(right - common)
        } else {
            0
        }
    }

    pub fn contrast_value(&self) -> i32 {
        if self.marks[0] > 0 && self.marks[0] == WHITE - self.marks[2] {
            return self.marks[0];
        }
        let (_, _, common) = self.range_insets();
        debug_assert!(common >= 0, "range outside 0..=255: {:?}", self.range);
        -common
    }
}
