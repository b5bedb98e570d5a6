// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan analysis — automatic page corner detection.

pub mod autoclip;

pub use autoclip::{AutoClip, shrink_for_detection};
