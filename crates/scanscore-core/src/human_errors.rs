// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the report surface.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Nothing here is retried automatically; the severity only drives how the
// message is presented.

use crate::error::{ExternalService, ScanScoreError};

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The request ran but produced nothing to report (e.g. no page found).
    NoResult,
    /// User must do something (fix the input, install a model, edit config).
    ActionRequired,
    /// Cannot be fixed by user action on this input.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    pub severity: Severity,
}

impl std::fmt::Display for HumanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n{}", self.message, self.suggestion)
    }
}

/// Convert a `ScanScoreError` into a `HumanError`.
pub fn humanize_error(err: &ScanScoreError) -> HumanError {
    match err {
        ScanScoreError::InvalidInput(detail) => HumanError {
            message: "The input couldn't be used.".into(),
            suggestion: format!("Check the image and the reference text, then try again. ({detail})"),
            severity: Severity::ActionRequired,
        },

        ScanScoreError::NoBoundaryFound => HumanError {
            message: "No document was found in this image.".into(),
            suggestion: "Photograph the page against a contrasting background so all four edges are visible.".into(),
            severity: Severity::NoResult,
        },

        ScanScoreError::ExternalService { service, detail } => humanize_external(*service, detail),

        ScanScoreError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            severity: Severity::Permanent,
        },

        ScanScoreError::Config(detail) => HumanError {
            message: "The configuration file has a problem.".into(),
            suggestion: format!("Fix the setting and run again. ({detail})"),
            severity: Severity::ActionRequired,
        },

        ScanScoreError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Check the path and try again.".into(),
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "There's no permission to read or write that file.".into(),
                    suggestion: "Check the file permissions, or copy the file to a different location first.".into(),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, the disk may be full.".into(),
                    severity: Severity::Permanent,
                }
            }
        }

        ScanScoreError::Serialization(_) => HumanError {
            message: "A settings or report file isn't valid JSON.".into(),
            suggestion: "Check the file for typos such as missing commas or quotes.".into(),
            severity: Severity::ActionRequired,
        },
    }
}

/// Explain a failure of the denoise model or the OCR engine.
fn humanize_external(service: ExternalService, detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    match service {
        ExternalService::Denoiser if lower.contains("not found") || lower.contains("load") => {
            HumanError {
                message: "The denoise model couldn't be loaded.".into(),
                suggestion: "Check `denoise_model_path` points at a valid .rten model file.".into(),
                severity: Severity::ActionRequired,
            }
        }
        ExternalService::Denoiser => HumanError {
            message: "The denoise model returned an unusable result.".into(),
            suggestion: format!("The model may not match the expected 360x612 input. ({detail})"),
            severity: Severity::Permanent,
        },
        ExternalService::Ocr if lower.contains("not available") => HumanError {
            message: "Text recognition isn't available in this build.".into(),
            suggestion: "Rebuild with the `ocr` feature and install Tesseract.".into(),
            severity: Severity::ActionRequired,
        },
        ExternalService::Ocr if lower.contains("initialise") || lower.contains("language") => {
            HumanError {
                message: "Tesseract couldn't start.".into(),
                suggestion: "Make sure the language data is installed (e.g. `tesseract-ocr-eng`) or set `tessdata_dir`.".into(),
                severity: Severity::ActionRequired,
            }
        }
        ExternalService::Ocr => HumanError {
            message: "Text recognition didn't work on this scan.".into(),
            suggestion: format!("Try a sharper photo with better lighting. ({detail})"),
            severity: Severity::Permanent,
        },
    }
}
