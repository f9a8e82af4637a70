// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Extraction pipeline — one pass from raw image bytes to a scored report.
//
// decode → normalise → denoise → refine → detect boundary → rectify → OCR →
// score + line confidences

use chrono::Utc;
use image::{DynamicImage, GrayImage};
use scanscore_core::error::{Result, ScanScoreError};
use scanscore_core::{Quad, RequestId};
use scanscore_document::{BoundaryDetector, Preprocessor, Rectified, Rectifier};
use scanscore_quality::{aggregate_lines, average_confidence, line_confidences, score_text};
use tracing::{info, info_span, warn};

use crate::report::{Extraction, Outcome, ProcessingReport};
use crate::services::{AppContext, Artifacts};

/// A report together with the intermediate images that produced it.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub report: ProcessingReport,
    pub artifacts: Artifacts,
}

/// Runs requests against a shared [`AppContext`].
pub struct Pipeline<'a> {
    ctx: &'a AppContext,
    preprocessor: Preprocessor,
    detector: BoundaryDetector,
    rectifier: Rectifier,
}

impl<'a> Pipeline<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        let config = ctx.config().pipeline.clone();
        Self {
            ctx,
            preprocessor: Preprocessor::new(config.clone()),
            detector: BoundaryDetector::new(config.clone()),
            rectifier: Rectifier::new(config),
        }
    }

    /// Process one encoded image (JPEG or PNG) and score its text against
    /// `ground_truth`.
    ///
    /// A missing or degenerate document boundary is a normal outcome, and so
    /// is a ground truth that cannot be scored (the error is kept in the
    /// report). Every other failure is returned.
    pub fn process(&self, image_bytes: &[u8], ground_truth: &str) -> Result<ProcessingReport> {
        self.run(image_bytes, ground_truth).map(|output| output.report)
    }

    /// [`process`](Self::process), also returning the intermediate images.
    pub fn run(&self, image_bytes: &[u8], ground_truth: &str) -> Result<PipelineOutput> {
        let request_id = RequestId::new();
        let span = info_span!("request", %request_id);
        let _guard = span.enter();

        let original = image::load_from_memory(image_bytes)
            .map_err(|err| ScanScoreError::ImageError(format!("cannot decode image: {err}")))?;
        let (width, height) = (original.width(), original.height());
        info!(width, height, bytes = image_bytes.len(), "Image decoded");

        let mut artifacts = Artifacts::new(original);
        let outcome = self.extract(&mut artifacts, ground_truth)?;

        Ok(PipelineOutput {
            report: ProcessingReport {
                request_id,
                processed_at: Utc::now(),
                width,
                height,
                outcome,
            },
            artifacts,
        })
    }

    fn extract(&self, artifacts: &mut Artifacts, ground_truth: &str) -> Result<Outcome> {
        // -- Denoise ----------------------------------------------------------
        let input = self.preprocessor.normalize_for_inference(&artifacts.original)?;
        let denoiser = self.ctx.denoiser()?;
        let output = denoiser.denoise(&input)?;
        let denoised = self.preprocessor.tensor_to_gray(&output)?;
        info!(denoiser = denoiser.name(), "Denoising complete");

        // -- Refine and detect ------------------------------------------------
        let refined = self.preprocessor.refine(denoised);
        artifacts.denoised = Some(refined.denoised.clone());

        let Some(quad) = self.detector.detect_quad(&refined.binary) else {
            info!("No document boundary; skipping rectification and OCR");
            return Ok(Outcome::NoBoundary);
        };

        // -- Rectify ----------------------------------------------------------
        let Some(rectified) = self.rectify(&quad, &refined.upscaled)? else {
            return Ok(Outcome::NoBoundary);
        };
        let ocr_input = DynamicImage::ImageLuma8(rectified.ocr_input().clone());
        artifacts.annotated = Some(rectified.annotated);
        artifacts.rectified = rectified.warped;

        // -- Recognise --------------------------------------------------------
        let recognizer = self.ctx.recognizer()?;
        let recognition = recognizer.recognize(&ocr_input)?;
        info!(
            engine = recognizer.name(),
            chars = recognition.text.chars().count(),
            tokens = recognition.tokens.len(),
            "Text recognised"
        );

        // -- Score ------------------------------------------------------------
        let (scores, scoring_error) = match score_text(&recognition.text, ground_truth) {
            Ok(scores) => {
                info!(
                    wer = scores.wer.error_rate,
                    cer = scores.cer.error_rate,
                    "Transcription scored"
                );
                (Some(scores), None)
            }
            Err(err) => {
                warn!(error = %err, "Transcription could not be scored");
                (None, Some(err.to_string()))
            }
        };

        let lines = aggregate_lines(&recognition.tokens);
        Ok(Outcome::Extracted(Extraction {
            corners: rectified.corners,
            text: recognition.text,
            scores,
            scoring_error,
            line_confidences: line_confidences(&lines),
            average_confidence: average_confidence(&lines),
        }))
    }

    /// Rectify the detected quad. Corners that cannot be warped mean no
    /// usable page was found, so they end the request like a missing boundary.
    fn rectify(&self, quad: &Quad, source: &GrayImage) -> Result<Option<Rectified>> {
        match self.rectifier.rectify(quad, source) {
            Ok(rectified) => Ok(Some(rectified)),
            Err(ScanScoreError::InvalidInput(detail)) => {
                warn!(%detail, "Degenerate document boundary; skipping OCR");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

// -- Tests --------------------------------------------------------------------
