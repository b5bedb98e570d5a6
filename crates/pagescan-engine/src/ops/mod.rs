// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-page operations, applied in order: transform, clip, level.

pub mod clip;
pub mod level;
pub mod transform;

pub use clip::ClipOp;
pub use level::LevelOp;
pub use transform::TransformOp;
