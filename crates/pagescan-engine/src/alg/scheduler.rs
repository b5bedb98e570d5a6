// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Row-band scheduler — splits an algorithm's output rows into contiguous bands,
// runs each band on a worker from an injected rayon pool, and merges per-band
// tallies through a single lock before returning.

use std::sync::{Arc, Mutex, PoisonError};

use pagescan_core::EngineConfig;
use pagescan_core::error::{PageScanError, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info};

/// A half-open row interval `[start, start + rows)` owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub start: u32,
    pub rows: u32,
}

impl Band {
    pub fn new(start: u32, rows: u32) -> Self {
        Self { start, rows }
    }

    /// One past the last row of the band.
    pub fn end(&self) -> u32 {
        self.start + self.rows
    }

    pub fn row_range(&self) -> std::ops::Range<u32> {
        self.start..self.end()
    }
}

/// An image algorithm whose output rows can be computed independently.
///
/// `process` receives the band and the slice of the output buffer that holds
/// exactly that band's rows (`band.rows * row_bytes()` bytes). It may read any
/// part of the source but writes only its own slice. Partial results come back
/// as a `Tally` and are folded into the shared total with `merge`, which must be
/// commutative so the total does not depend on band completion order.
pub trait BandAlgorithm: Sync {
    type Tally: Default + Send;

    /// Number of output rows to partition.
    fn height(&self) -> u32;

    /// Bytes per output row; zero for algorithms that only tally.
    fn row_bytes(&self) -> usize;

    fn process(&self, band: Band, rows: &mut [u8]) -> Self::Tally;

    fn merge(_total: &mut Self::Tally, _part: Self::Tally) {}
}

/// Dispatches [`BandAlgorithm`] runs onto a worker pool.
///
/// The pool is passed in rather than taken from a process-wide global, so
/// callers decide how many threads the engine may use. Cloning is cheap and
/// shares the pool.
#[derive(Clone)]
pub struct Scheduler {
    pool: Arc<ThreadPool>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("threads", &self.pool.current_num_threads())
            .finish()
    }
}

impl Scheduler {
    // -- Construction ---------------------------------------------------------

    /// Wrap an existing pool.
    pub fn new(pool: Arc<ThreadPool>) -> Self {
        Self { pool }
    }

    /// Build a dedicated pool with `threads` workers (0 = one per CPU).
    pub fn with_threads(threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("pagescan-worker-{index}"))
            .build()
            .map_err(|err| PageScanError::ThreadPool(err.to_string()))?;
        info!(threads = pool.current_num_threads(), "Worker pool started");
        Ok(Self::new(Arc::new(pool)))
    }

    /// Build a pool sized by `config.worker_threads`.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Self::with_threads(config.worker_threads)
    }

    // -- Accessors ------------------------------------------------------------

    pub fn pool(&self) -> &ThreadPool {
        &self.pool
    }

    /// Number of worker threads in the pool; what a parallelism of 0 resolves to.
    pub fn thread_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    // -- Partitioning ---------------------------------------------------------

    /// Split `height` rows into bands for `parallelism` workers.
    ///
    /// A single band covering everything is returned when `parallelism <= 1`
    /// or when there are more workers than rows. Otherwise the first
    /// `parallelism - 1` bands get `height / parallelism` rows each and the
    /// last band takes the remainder.
    pub fn partition(height: u32, parallelism: usize) -> Vec<Band> {
        if parallelism <= 1 || parallelism > height as usize {
            return vec![Band::new(0, height)];
        }

        let workers = parallelism as u32;
        let band_size = height / workers;
        let mut bands: Vec<Band> = (0..workers - 1)
            .map(|i| Band::new(i * band_size, band_size))
            .collect();
        let last_start = band_size * (workers - 1);
        bands.push(Band::new(last_start, height - last_start));
        bands
    }

    // -- Execution ------------------------------------------------------------

    /// Run `alg` over `output`, blocking until every band has finished.
    ///
    /// `parallelism` of 0 means one band per pool thread. `output` must hold
    /// exactly `alg.height() * alg.row_bytes()` bytes. Returns the merged tally.
    pub fn run<A: BandAlgorithm>(
        &self,
        alg: &A,
        output: &mut [u8],
        parallelism: usize,
    ) -> A::Tally {
        let height = alg.height();
        let stride = alg.row_bytes();
        assert_eq!(
            output.len(),
            height as usize * stride,
            "output buffer does not match algorithm geometry"
        );

        let target = if parallelism == 0 {
            self.thread_count()
        } else {
            parallelism
        };
        let bands = Self::partition(height, target);

        if bands.len() == 1 {
            let mut total = A::Tally::default();
            A::merge(&mut total, alg.process(bands[0], output));
            return total;
        }

        debug!(height, bands = bands.len(), "Dispatching row bands");

        let shared = Mutex::new(A::Tally::default());
        let mut rest = output;
        self.pool.scope(|scope| {
            for band in bands {
                let (rows, tail) =
                    std::mem::take(&mut rest).split_at_mut(band.rows as usize * stride);
                rest = tail;
                let shared = &shared;
                scope.spawn(move |_| {
                    let part = alg.process(band, rows);
                    let mut total = shared.lock().unwrap_or_else(PoisonError::into_inner);
                    A::merge(&mut total, part);
                });
            }
        });

        shared.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn covers_exactly(bands: &[Band], height: u32) -> bool {
        let mut next = 0;
        for band in bands {
            if band.start != next {
                return false;
            }
            next = band.end();
        }
        next == height
    }

    #[test]
    fn partition_single_band_for_low_parallelism() {
        assert_eq!(Scheduler::partition(100, 0), vec![Band::new(0, 100)]);
        assert_eq!(Scheduler::partition(100, 1), vec![Band::new(0, 100)]);
    }

    #[test]
    fn partition_single_band_when_more_workers_than_rows() {
        assert_eq!(Scheduler::partition(3, 4), vec![Band::new(0, 3)]);
    }

    #[test]
    fn partition_last_band_absorbs_remainder() {
        let bands = Scheduler::partition(10, 3);
        assert_eq!(bands, vec![Band::new(0, 3), Band::new(3, 3), Band::new(6, 4)]);
        assert!(covers_exactly(&bands, 10));
    }

    #[test]
    fn partition_is_disjoint_and_complete() {
        for height in [1u32, 2, 7, 64, 101, 999] {
            for parallelism in 0..12usize {
                let bands = Scheduler::partition(height, parallelism);
                assert!(
                    covers_exactly(&bands, height),
                    "height {height} parallelism {parallelism}"
                );
                let last = bands.last().unwrap();
                assert!(bands.iter().all(|b| b.rows <= last.rows));
            }
        }
    }

    /// Writes each row's index into its bytes and counts rows visited.
    struct RowStamp {
        height: u32,
        width: usize,
        calls: AtomicUsize,
    }

    impl BandAlgorithm for RowStamp {
        type Tally = u64;

        fn height(&self) -> u32 {
            self.height
        }

        fn row_bytes(&self) -> usize {
            self.width
        }

        fn process(&self, band: Band, rows: &mut [u8]) -> u64 {
            self.calls.fetch_add(1, Ordering::SeqCst);
            for (offset, row) in rows.chunks_mut(self.width).enumerate() {
                row.fill((band.start as usize + offset) as u8);
            }
            band.rows as u64
        }

        fn merge(total: &mut u64, part: u64) {
            *total += part;
        }
    }

    #[test]
    fn run_writes_every_row_and_merges_tallies() {
        let scheduler = Scheduler::with_threads(4).unwrap();
        for parallelism in [0, 1, 2, 3, 4, 7, 50, 51] {
            let alg = RowStamp {
                height: 50,
                width: 5,
                calls: AtomicUsize::new(0),
            };
            let mut out = vec![255u8; 50 * 5];
            let rows = scheduler.run(&alg, &mut out, parallelism);
            assert_eq!(rows, 50);
            for (y, row) in out.chunks(5).enumerate() {
                assert!(row.iter().all(|&v| v == y as u8), "row {y} parallelism {parallelism}");
            }
            let expected_calls = Scheduler::partition(50, if parallelism == 0 {
                scheduler.thread_count()
            } else {
                parallelism
            })
            .len();
            assert_eq!(alg.calls.load(Ordering::SeqCst), expected_calls);
        }
    }

    #[test]
    fn run_handles_zero_height() {
        let scheduler = Scheduler::with_threads(2).unwrap();
        let alg = RowStamp {
            height: 0,
            width: 4,
            calls: AtomicUsize::new(0),
        };
        let mut out = Vec::new();
        assert_eq!(scheduler.run(&alg, &mut out, 0), 0);
    }

    #[test]
    fn scheduler_from_config_uses_worker_threads() {
        let config = EngineConfig {
            worker_threads: 3,
            ..EngineConfig::default()
        };
        let scheduler = Scheduler::from_config(&config).unwrap();
        assert_eq!(scheduler.thread_count(), 3);
    }
}
