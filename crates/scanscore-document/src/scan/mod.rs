// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline — denoising, page boundary detection, perspective
// rectification, and optical character recognition (OCR).

pub mod boundary;
pub mod denoise;
pub mod ocr;
pub mod rectify;

pub use boundary::BoundaryDetector;
pub use denoise::{Denoiser, PassthroughDenoiser};
pub use ocr::{OcrConfig, TextRecognizer, UnavailableRecognizer};
pub use rectify::{Rectified, Rectifier};

#[cfg(feature = "denoise")]
pub use denoise::RtenDenoiser;

#[cfg(feature = "ocr")]
pub use ocr::TesseractRecognizer;
