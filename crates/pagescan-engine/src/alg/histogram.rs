// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Brightness histogram — per-band tallies of the HSV value channel merged into
// a shared 256-bin count, plus the statistics derived from it.

use image::RgbImage;
use tracing::{debug, instrument};

use super::hsv;
use super::scheduler::{Band, BandAlgorithm, Scheduler};

/// Number of histogram bins.
pub const HISTO_SIZE: usize = 256;

/// Pixel values per bin.
pub const HISTO_FACTOR: usize = 256 / HISTO_SIZE;

pub type HistoArray = [u64; HISTO_SIZE];

/// Running tally for one band or for the merged total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoTally {
    pub counts: HistoArray,
    pub count_max: u64,
}

impl Default for HistoTally {
    fn default() -> Self {
        Self {
            counts: [0; HISTO_SIZE],
            count_max: 0,
        }
    }
}

/// Counts pixel brightness over the whole source image.
pub struct HistoAlg<'a> {
    src: &'a RgbImage,
}

impl<'a> HistoAlg<'a> {
    pub fn new(src: &'a RgbImage) -> Self {
        Self { src }
    }

    pub fn run(&self, scheduler: &Scheduler, parallelism: usize) -> HistoTally {
        scheduler.run(self, &mut [], parallelism)
    }
}

impl BandAlgorithm for HistoAlg<'_> {
    type Tally = HistoTally;

    fn height(&self) -> u32 {
        self.src.height()
    }

    fn row_bytes(&self) -> usize {
        0
    }

    fn process(&self, band: Band, _rows: &mut [u8]) -> HistoTally {
        let mut mine = HistoTally::default();
        for y in band.row_range() {
            for x in 0..self.src.width() {
                let bin = hsv::value(*self.src.get_pixel(x, y)) as usize / HISTO_FACTOR;
                mine.counts[bin] += 1;
            }
        }
        mine
    }

    fn merge(total: &mut HistoTally, part: HistoTally) {
        for (sum, count) in total.counts.iter_mut().zip(part.counts) {
            *sum += count;
        }
        total.count_max = total.counts.iter().copied().max().unwrap_or(0);
    }
}

/// A brightness histogram, or the null histogram before one is computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    counts: HistoArray,
    count_max: i64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::null()
    }
}

impl Histogram {
    /// The null histogram (`count_max() == -1`).
    pub fn null() -> Self {
        Self {
            counts: [0; HISTO_SIZE],
            count_max: -1,
        }
    }

    /// Build the histogram of `image`'s HSV values.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn compute(scheduler: &Scheduler, image: &RgbImage, parallelism: usize) -> Self {
        let tally = HistoAlg::new(image).run(scheduler, parallelism);
        debug!(count_max = tally.count_max, "Histogram computed");
        Self::from(tally)
    }

    pub fn is_null(&self) -> bool {
        self.count_max == -1
    }

    pub fn counts(&self) -> &HistoArray {
        &self.counts
    }

    /// Largest bin count, or -1 for the null histogram.
    pub fn count_max(&self) -> i64 {
        self.count_max
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Mean and population standard deviation of the bin indices, weighted by
    /// their counts. An empty histogram yields `(0.0, 0.0)`.
    pub fn mean_and_std_dev(&self) -> (f64, f64) {
        debug_assert!(!self.is_null(), "statistics of a null histogram");

        let mut sum = 0.0;
        let mut count = 0u64;
        for (bin, &n) in self.counts.iter().enumerate() {
            sum += bin as f64 * n as f64;
            count += n;
        }
        if count == 0 {
            return (0.0, 0.0);
        }
        let mean = sum / count as f64;

        let variance = self
            .counts
            .iter()
            .enumerate()
            .map(|(bin, &n)| {
                let diff = bin as f64 - mean;
                diff * diff * n as f64
            })
            .sum::<f64>()
            / count as f64;

        (mean, variance.sqrt())
    }
}

impl From<HistoTally> for Histogram {
    fn from(tally: HistoTally) -> Self {
        Self {
            counts: tally.counts,
            count_max: tally.count_max as i64,
        }
    }
}

impl std::ops::Index<usize> for Histogram {
    type Output = u64;

    fn index(&self, bin: usize) -> &u64 {
        &self.counts[bin]
    }
}

impl std::ops::IndexMut<usize> for Histogram {
    fn index_mut(&mut self, bin: usize) -> &mut u64 {
        &mut self.counts[bin]
    }
}
