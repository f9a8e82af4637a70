// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Processing report — what one request found, for humans and for JSON.

use chrono::{DateTime, Utc};
use scanscore_core::human_errors::humanize_error;
use scanscore_core::{CanonicalCorners, LineConfidence, RequestId, ScanScoreError, TextScores};
use serde::{Deserialize, Serialize};

/// The result of processing one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingReport {
    pub request_id: RequestId,
    pub processed_at: DateTime<Utc>,
    /// Dimensions of the decoded input image.
    pub width: u32,
    pub height: u32,
    pub outcome: Outcome,
}

/// Whether a document was found, and what was read from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// No contour simplified to a quadrilateral; nothing was read.
    NoBoundary,
    Extracted(Extraction),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub corners: CanonicalCorners,
    /// Raw transcription from the OCR engine.
    pub text: String,
    /// `None` when scoring failed; see `scoring_error`.
    pub scores: Option<TextScores>,
    pub scoring_error: Option<String>,
    pub line_confidences: Vec<LineConfidence>,
    pub average_confidence: f64,
}

impl ProcessingReport {
    /// The human-readable result, as printed by the CLI.
    pub fn summary(&self) -> String {
        match &self.outcome {
            Outcome::NoBoundary => {
                let human = humanize_error(&ScanScoreError::NoBoundaryFound);
                format!("{} {}", human.message, human.suggestion)
            }
            Outcome::Extracted(extraction) => extraction.summary(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Extraction {
    fn summary(&self) -> String {
        let mut out = match (&self.scores, &self.scoring_error) {
            (Some(scores), _) => format!(
                "Detected Text:\n{}\n\nWER Accuracy: {:.2}% | CER Accuracy: {:.2}%",
                self.text, scores.wer.accuracy, scores.cer.accuracy
            ),
            (None, Some(err)) => format!("Detected Text:\n{}\n\nScoring failed: {}", self.text, err),
            (None, None) => format!("Detected Text:\n{}", self.text),
        };

        if !self.line_confidences.is_empty() {
            out.push_str("\n\nLine confidences:");
            for line in &self.line_confidences {
                out.push_str(&format!("\n  {:>7.3}  {}", line.confidence, line.text));
            }
            out.push_str(&format!("\nAverage confidence: {:.2}", self.average_confidence));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanscore_core::{Point, ScorePair};

    fn corners() -> CanonicalCorners {
        CanonicalCorners {
            top_left: Point::new(0.0, 0.0),
            top_right: Point::new(10.0, 0.0),
            bottom_right: Point::new(10.0, 10.0),
            bottom_left: Point::new(0.0, 10.0),
        }
    }

    fn report(outcome: Outcome) -> ProcessingReport {
        ProcessingReport {
            request_id: RequestId::new(),
            processed_at: Utc::now(),
            width: 612,
            height: 360,
            outcome,
        }
    }

    fn extraction() -> Extraction {
        Extraction {
            corners: corners(),
            text: "hello wrld".into(),
            scores: Some(TextScores {
                wer: ScorePair::from_ratio(0.5),
                cer: ScorePair::from_ratio(1.0 / 11.0),
            }),
            scoring_error: None,
            line_confidences: vec![],
            average_confidence: 0.0,
        }
    }

    #[test]
    fn summary_matches_the_result_banner() {
        let summary = report(Outcome::Extracted(extraction())).summary();
        assert_eq!(
            summary,
            "Detected Text:\nhello wrld\n\nWER Accuracy: 50.00% | CER Accuracy: 90.91%"
        );
    }

    #[test]
    fn summary_lists_line_confidences() {
        let mut extraction = extraction();
        extraction.line_confidences = vec![LineConfidence {
            text: "hello wrld".into(),
            confidence: 85.5,
        }];
        extraction.average_confidence = 85.5;

        let summary = report(Outcome::Extracted(extraction)).summary();
        assert!(summary.contains("\n\nLine confidences:\n   85.500  hello wrld"));
        assert!(summary.ends_with("Average confidence: 85.50"));
    }

    #[test]
    fn summary_reports_scoring_failure() {
        let mut extraction = extraction();
        extraction.scores = None;
        extraction.scoring_error = Some("invalid input: ground truth is empty".into());

        let summary = report(Outcome::Extracted(extraction)).summary();
        assert!(summary.starts_with("Detected Text:\nhello wrld"));
        assert!(summary.contains("Scoring failed: invalid input"));
    }

    #[test]
    fn no_boundary_summary_is_friendly() {
        let summary = report(Outcome::NoBoundary).summary();
        assert!(summary.starts_with("No document was found"));
    }

    #[test]
    fn json_round_trip_keeps_the_outcome_tag() {
        let original = report(Outcome::Extracted(extraction()));
        let json = original.to_json().unwrap();
        assert!(json.contains("\"kind\": \"extracted\""));

        let parsed: ProcessingReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.request_id, original.request_id);
        match parsed.outcome {
            Outcome::Extracted(extraction) => {
                assert_eq!(extraction.text, "hello wrld");
                assert_eq!(extraction.corners, corners());
            }
            Outcome::NoBoundary => panic!("outcome changed kind"),
        }

        let none = report(Outcome::NoBoundary).to_json().unwrap();
        assert!(none.contains("\"kind\": \"no_boundary\""));
    }
}
