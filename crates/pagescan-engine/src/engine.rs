// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine handle — the worker pool plus the settings every page operation reads.

use pagescan_core::EngineConfig;
use pagescan_core::error::Result;
use tracing::info;

use crate::alg::scheduler::Scheduler;

/// Scheduler and configuration shared by all page operations.
///
/// Cloning is cheap; clones share the worker pool.
#[derive(Debug, Clone)]
pub struct Engine {
    scheduler: Scheduler,
    config: EngineConfig,
}

impl Engine {
    /// Validate `config` and start a worker pool sized from it.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let scheduler = Scheduler::from_config(&config)?;
        info!(
            threads = scheduler.thread_count(),
            parallelism = config.parallelism,
            interpolation = ?config.interpolation,
            level_mode = ?config.level_mode,
            "Engine ready"
        );
        Ok(Self { scheduler, config })
    }

    /// Use an existing scheduler instead of starting a new pool.
    pub fn with_scheduler(scheduler: Scheduler, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { scheduler, config })
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Row bands per algorithm run (0 = one per pool thread).
    pub fn parallelism(&self) -> usize {
        self.config.parallelism
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagescan_core::{PageScanError, Size};

    #[test]
    fn engine_from_config_sizes_pool() {
        let engine = Engine::new(EngineConfig {
            worker_threads: 2,
            parallelism: 5,
            ..EngineConfig::default()
        })
        .unwrap();
        assert_eq!(engine.scheduler().thread_count(), 2);
        assert_eq!(engine.parallelism(), 5);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let scheduler = Scheduler::with_threads(1).unwrap();
        let config = EngineConfig {
            preview_max_size: Some(Size::new(0, 0)),
            ..EngineConfig::default()
        };
        let err = Engine::with_scheduler(scheduler, config).unwrap_err();
        assert!(matches!(err, PageScanError::InvalidConfig(_)));
    }
}
