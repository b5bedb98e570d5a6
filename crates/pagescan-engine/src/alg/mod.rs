// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image algorithms. Each one is a `BandAlgorithm` run by the row-band
// `Scheduler`, plus the geometry and colour helpers they share.

pub mod clip;
pub mod geometry;
pub mod histogram;
pub mod hsv;
pub mod level;
pub mod scheduler;
pub mod threshold;

pub use clip::ClipAlg;
pub use histogram::{HistoAlg, Histogram};
pub use level::{LevelAlg, ToneCurve};
pub use scheduler::{Band, BandAlgorithm, Scheduler};
pub use threshold::{AverageAbove, LowSaturationBright, PixelPredicate, Threshold, ThresholdAlg};
