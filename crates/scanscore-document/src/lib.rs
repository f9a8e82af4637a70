// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanscore-document — Image side of the Scanscore pipeline.
//
// Provides the preprocessing around the denoise model (normalisation,
// sharpening, upscaling, binarization), page boundary detection, perspective
// rectification, and the denoiser and OCR engine boundaries.

pub mod geometry;
pub mod image;
pub mod scan;

// Re-export the primary structs so callers can use `scanscore_document::Preprocessor` etc.
pub use self::image::preprocess::{Preprocessor, RefinedImages};
pub use scan::boundary::BoundaryDetector;
pub use scan::denoise::{Denoiser, PassthroughDenoiser};
pub use scan::ocr::{OcrConfig, TextRecognizer, UnavailableRecognizer};
pub use scan::rectify::{Rectified, Rectifier};

#[cfg(feature = "denoise")]
pub use scan::denoise::RtenDenoiser;

#[cfg(feature = "ocr")]
pub use scan::ocr::TesseractRecognizer;
