// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Pagescan.

use thiserror::Error;

/// Top-level error type for all Pagescan operations.
///
/// The image algorithms themselves are total over well-formed input; errors
/// only arise while setting up the engine (thread pool, configuration) or
/// when crossing into an external collaborator's data.
#[derive(Debug, Error)]
pub enum PageScanError {
    // -- Engine setup --
    #[error("thread pool construction failed: {0}")]
    ThreadPool(String),

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    // -- Image data --
    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PageScanError>;
