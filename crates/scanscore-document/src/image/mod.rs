// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — inference normalisation, sharpening, upscaling, and
// thresholding.

pub mod preprocess;

pub use preprocess::{Preprocessor, RefinedImages};
