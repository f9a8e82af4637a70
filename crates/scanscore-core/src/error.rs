// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanscore.

use std::fmt;

use thiserror::Error;

/// The external collaborator that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalService {
    /// The image-to-image denoising model.
    Denoiser,
    /// The optical character recognition engine.
    Ocr,
}

impl fmt::Display for ExternalService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Denoiser => f.write_str("denoise model"),
            Self::Ocr => f.write_str("OCR engine"),
        }
    }
}

/// Top-level error type for all Scanscore operations.
#[derive(Debug, Error)]
pub enum ScanScoreError {
    // -- Validation --
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // -- Detection --
    #[error("no document boundary found")]
    NoBoundaryFound,

    // -- External collaborators --
    #[error("{service} failed: {detail}")]
    ExternalService {
        service: ExternalService,
        detail: String,
    },

    // -- Images --
    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScanScoreError {
    /// Shorthand for a denoiser failure.
    pub fn denoiser(detail: impl Into<String>) -> Self {
        Self::ExternalService {
            service: ExternalService::Denoiser,
            detail: detail.into(),
        }
    }

    /// Shorthand for an OCR engine failure.
    pub fn ocr(detail: impl Into<String>) -> Self {
        Self::ExternalService {
            service: ExternalService::Ocr,
            detail: detail.into(),
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanScoreError>;
