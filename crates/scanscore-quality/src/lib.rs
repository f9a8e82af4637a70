// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanscore-quality — Recognition quality metrics.
//
// Scores an OCR transcription against a known-correct reference using
// edit-distance Word and Character Error Rates, and folds the OCR engine's
// token table into per-line confidence figures.

pub mod lines;
pub mod score;

pub use lines::{aggregate_lines, average_confidence, line_confidences};
pub use score::{character_error_rate, score_bytes, score_text, word_error_rate};
