// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PageScanError, Result};
use crate::types::Size;

/// Sampling used when a corner quad is resampled into a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Copy the source pixel under the truncated sample point.
    Nearest,
    /// Blend the four neighbouring source pixels.
    #[default]
    Bilinear,
}

/// Which tone-curve mapper a level operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelMode {
    /// Apply the curve to R, G and B independently.
    #[default]
    Rgb,
    /// Apply the curve to the HSV value channel only.
    LegacyHsv,
}

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of row bands per algorithm run (0 = one per pool thread).
    pub parallelism: usize,
    /// Threads in a pool built from this config (0 = one per available CPU).
    pub worker_threads: usize,
    /// Sampling used by clip operations.
    pub interpolation: Interpolation,
    /// Tone mapper used by level operations.
    pub level_mode: LevelMode,
    /// Upper bound on clip output size for previews; `None` keeps full size.
    pub preview_max_size: Option<Size>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallelism: 0,
            worker_threads: 0,
            interpolation: Interpolation::Bilinear,
            level_mode: LevelMode::Rgb,
            preview_max_size: None,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(max) = self.preview_max_size {
            if !max.is_valid() {
                return Err(PageScanError::InvalidConfig(format!(
                    "preview_max_size must be non-zero on both axes, got {max}"
                )));
            }
        }
        Ok(())
    }
}
