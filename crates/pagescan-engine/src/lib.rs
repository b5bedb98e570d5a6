// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagescan-engine — Parallel page-image transforms for book scanning.
//
// Provides the row-band scheduler and the algorithms it runs (quad resampling,
// histogram, tone curves, thresholding), automatic corner detection, and the
// per-page transform/clip/level operations built on them.

pub mod alg;
pub mod engine;
pub mod load;
pub mod ops;
pub mod page;
pub mod scan;

// Re-export the primary types so callers can use `pagescan_engine::Engine` etc.
pub use alg::geometry::{calc_aspect, calc_aspect_even};
pub use alg::{Histogram, Scheduler};
pub use engine::Engine;
pub use load::{
    decode_page, decode_page_with_orientation, open_page, open_page_with_orientation, save_page,
};
pub use ops::{ClipOp, LevelOp, TransformOp};
pub use page::{AutoChecks, CheckOutcome, PageSettings};
pub use scan::AutoClip;
