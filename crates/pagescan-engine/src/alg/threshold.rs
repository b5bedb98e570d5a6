// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Generic thresholding — classify every pixel with a predicate, producing a
// black/white mask and a count of matching pixels.

use image::{Rgb, RgbImage};
use tracing::{debug, instrument};

use super::hsv::{self, Hsv};
use super::scheduler::{Band, BandAlgorithm, Scheduler};

const CHANNELS: usize = 3;
const FOREGROUND: [u8; CHANNELS] = [255, 255, 255];
const BACKGROUND: [u8; CHANNELS] = [0, 0, 0];

/// A per-pixel foreground test.
pub trait PixelPredicate: Sync {
    fn test(&self, pixel: Rgb<u8>) -> bool;
}

impl<F> PixelPredicate for F
where
    F: Fn(Rgb<u8>) -> bool + Sync,
{
    fn test(&self, pixel: Rgb<u8>) -> bool {
        self(pixel)
    }
}

/// Foreground when the channel average is strictly above the wrapped level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AverageAbove(pub i32);

impl Default for AverageAbove {
    fn default() -> Self {
        Self(100)
    }
}

impl PixelPredicate for AverageAbove {
    fn test(&self, pixel: Rgb<u8>) -> bool {
        hsv::average(pixel) > self.0
    }
}

/// Foreground for nearly-gray, reasonably bright pixels (paper on a
/// coloured background).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LowSaturationBright {
    pub max_saturation: i32,
    pub min_average: i32,
}

impl Default for LowSaturationBright {
    fn default() -> Self {
        Self {
            max_saturation: 30,
            min_average: 120,
        }
    }
}

impl PixelPredicate for LowSaturationBright {
    fn test(&self, pixel: Rgb<u8>) -> bool {
        Hsv::from_rgb(pixel).saturation < self.max_saturation
            && hsv::average(pixel) > self.min_average
    }
}

/// Thresholds `src` with predicate `P`.
pub struct ThresholdAlg<'a, P> {
    src: &'a RgbImage,
    predicate: P,
}

impl<'a, P: PixelPredicate> ThresholdAlg<'a, P> {
    pub fn new(src: &'a RgbImage, predicate: P) -> Self {
        Self { src, predicate }
    }

    #[instrument(skip_all, fields(width = self.src.width(), height = self.src.height()))]
    pub fn run(&self, scheduler: &Scheduler, parallelism: usize) -> Threshold {
        let mut output = RgbImage::new(self.src.width(), self.src.height());
        let true_count = scheduler.run(self, &mut output, parallelism);
        debug!(true_count, "Threshold applied");
        Threshold { output, true_count }
    }
}

impl<P: PixelPredicate> BandAlgorithm for ThresholdAlg<'_, P> {
    type Tally = u64;

    fn height(&self) -> u32 {
        self.src.height()
    }

    fn row_bytes(&self) -> usize {
        self.src.width() as usize * CHANNELS
    }

    fn process(&self, band: Band, rows: &mut [u8]) -> u64 {
        if rows.is_empty() {
            return 0;
        }
        let mut mine = 0;
        for (y, row) in band.row_range().zip(rows.chunks_exact_mut(self.row_bytes())) {
            for (x, out) in row.chunks_exact_mut(CHANNELS).enumerate() {
                if self.predicate.test(*self.src.get_pixel(x as u32, y)) {
                    out.copy_from_slice(&FOREGROUND);
                    mine += 1;
                } else {
                    out.copy_from_slice(&BACKGROUND);
                }
            }
        }
        mine
    }

    fn merge(total: &mut u64, part: u64) {
        *total += part;
    }
}

/// Result of a threshold run.
#[derive(Debug, Clone)]
pub struct Threshold {
    output: RgbImage,
    true_count: u64,
}

impl Threshold {
    /// White where the predicate held, black elsewhere.
    pub fn output(&self) -> &RgbImage {
        &self.output
    }

    pub fn into_output(self) -> RgbImage {
        self.output
    }

    pub fn true_count(&self) -> u64 {
        self.true_count
    }

    pub fn total_count(&self) -> u64 {
        self.output.width() as u64 * self.output.height() as u64
    }

    /// Integer percentage of matching pixels; 0 for an empty image.
    pub fn percent_true(&self) -> u64 {
        match self.total_count() {
            0 => 0,
            total => 100 * self.true_count / total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;

    fn scheduler() -> Scheduler {
        Scheduler::with_threads(4).unwrap()
    }

    #[test]
    fn average_predicate_is_strict() {
        let p = AverageAbove::default();
        assert!(!p.test(Rgb([100, 100, 100])));
        assert!(p.test(Rgb([101, 101, 101])));
        assert!(p.test(Rgb([255, 40, 10])));
        // (90 + 100 + 112) / 3 = 100
        assert!(!p.test(Rgb([90, 100, 112])));
    }

    #[test]
    fn saturation_predicate_wants_bright_grays() {
        let p = LowSaturationBright::default();
        assert!(p.test(Rgb([200, 200, 195])));
        assert!(!p.test(Rgb([100, 100, 100])));
        assert!(!p.test(Rgb([250, 120, 120])));
    }

    #[test]
    fn mask_and_count() {
        let mut img = RgbImage::from_pixel(4, 3, Rgb([20, 20, 20]));
        img.put_pixel(1, 1, Rgb([200, 200, 200]));
        img.put_pixel(3, 2, Rgb([150, 150, 150]));
        let result = ThresholdAlg::new(&img, AverageAbove::default()).run(&scheduler(), 2);
        assert_eq!(result.true_count(), 2);
        assert_eq!(result.total_count(), 12);
        assert_eq!(result.percent_true(), 16);
        assert_eq!(*result.output().get_pixel(1, 1), Rgb([255, 255, 255]));
        assert_eq!(*result.output().get_pixel(3, 2), Rgb([255, 255, 255]));
        assert_eq!(*result.output().get_pixel(0, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn closures_are_predicates() {
        let img: RgbImage = ImageBuffer::from_fn(10, 10, |x, _| Rgb([x as u8, 0, 0]));
        let result = ThresholdAlg::new(&img, |p: Rgb<u8>| p.0[0] >= 5).run(&scheduler(), 3);
        assert_eq!(result.true_count(), 50);
    }

    #[test]
    fn counts_match_across_partitions() {
        let img: RgbImage = ImageBuffer::from_fn(73, 67, |x, y| {
            Rgb([((x * 7 + y * 3) % 256) as u8, (y * 5 % 256) as u8, 90])
        });
        let scheduler = scheduler();
        let alg = ThresholdAlg::new(&img, AverageAbove::default());
        let reference = alg.run(&scheduler, 1);
        for parallelism in [0, 2, 3, 8, 67, 68] {
            let result = alg.run(&scheduler, parallelism);
            assert_eq!(result.true_count(), reference.true_count());
            assert_eq!(result.output(), reference.output());
        }
    }

    #[test]
    fn empty_image_has_no_percentage() {
        let img = RgbImage::new(0, 0);
        let result = ThresholdAlg::new(&img, AverageAbove::default()).run(&scheduler(), 0);
        assert_eq!(result.total_count(), 0);
        assert_eq!(result.percent_true(), 0);
    }
}
