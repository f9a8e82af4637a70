// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Scanscore extraction pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single processing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// -- Geometry -----------------------------------------------------------------

/// A point in image coordinates (x grows right, y grows down).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Tuple form, as used by `imageproc` projections.
    pub fn as_tuple(self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// Four vertices of a detected document outline, in whatever order the
/// polygon approximation produced them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub points: [Point; 4],
}

impl Quad {
    pub fn new(points: [Point; 4]) -> Self {
        Self { points }
    }
}

/// The four corners of a quadrilateral labelled consistently, regardless of
/// input vertex order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanonicalCorners {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

impl CanonicalCorners {
    /// Corners in `[top_left, top_right, bottom_right, bottom_left]` order.
    pub fn as_array(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Corners as tuples in canonical order.
    pub fn as_tuples(&self) -> [(f32, f32); 4] {
        self.as_array().map(Point::as_tuple)
    }
}

// -- OCR ----------------------------------------------------------------------

/// Confidence value the OCR engine uses for rows that carry no text.
pub const NO_TEXT_CONFIDENCE: f32 = -1.0;

/// One row of the OCR engine's token table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub page_num: u32,
    pub block_num: u32,
    pub par_num: u32,
    pub line_num: u32,
    /// Recognition confidence in [0, 100], or -1 for "no recognized text".
    pub confidence: f32,
    pub text: String,
}

impl TokenRecord {
    /// The line this token belongs to.
    pub fn line_key(&self) -> LineKey {
        LineKey {
            page: self.page_num,
            block: self.block_num,
            paragraph: self.par_num,
            line: self.line_num,
        }
    }

    /// Whether the engine discarded this token (negative confidence).
    pub fn is_discarded(&self) -> bool {
        self.confidence < 0.0
    }
}

/// Grouping key for tokens on the same physical text line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub page: u32,
    pub block: u32,
    pub paragraph: u32,
    pub line: u32,
}

/// All surviving tokens of one line, joined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineAggregate {
    pub key: LineKey,
    /// Token texts joined by a single space.
    pub text: String,
    /// Mean confidence of the tokens in this line.
    pub mean_confidence: f64,
    pub token_count: usize,
}

/// A non-blank line and its rounded mean confidence, for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineConfidence {
    pub text: String,
    pub confidence: f64,
}

/// Output of the OCR boundary: a plain transcription and the token table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recognition {
    pub text: String,
    pub tokens: Vec<TokenRecord>,
}

// -- Scoring ------------------------------------------------------------------

/// An error rate and its complementary accuracy, both in percent.
///
/// `accuracy` is always exactly `100 - error_rate`; neither is clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScorePair {
    pub error_rate: f64,
    pub accuracy: f64,
}

impl ScorePair {
    /// Build a pair from a fractional error ratio (0.25 → 25%).
    pub fn from_ratio(ratio: f64) -> Self {
        let error_rate = ratio * 100.0;
        Self {
            error_rate,
            accuracy: 100.0 - error_rate,
        }
    }
}

/// Word- and character-level scores for one transcription.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextScores {
    pub wer: ScorePair,
    pub cer: ScorePair,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_pair_accuracy_is_complement() {
        let pair = ScorePair::from_ratio(0.5);
        assert_eq!(pair.error_rate, 50.0);
        assert_eq!(pair.accuracy, 50.0);

        let over = ScorePair::from_ratio(1.5);
        assert_eq!(over.error_rate, 150.0);
        assert_eq!(over.accuracy, -50.0);
    }

    #[test]
    fn discarded_tokens_have_negative_confidence() {
        let token = TokenRecord {
            page_num: 1,
            block_num: 1,
            par_num: 1,
            line_num: 1,
            confidence: NO_TEXT_CONFIDENCE,
            text: String::new(),
        };
        assert!(token.is_discarded());
        assert_eq!(
            token.line_key(),
            LineKey {
                page: 1,
                block: 1,
                paragraph: 1,
                line: 1
            }
        );
    }

    #[test]
    fn canonical_corners_array_order() {
        let corners = CanonicalCorners {
            top_left: Point::new(0.0, 0.0),
            top_right: Point::new(10.0, 0.0),
            bottom_right: Point::new(10.0, 5.0),
            bottom_left: Point::new(0.0, 5.0),
        };
        assert_eq!(
            corners.as_tuples(),
            [(0.0, 0.0), (10.0, 0.0), (10.0, 5.0), (0.0, 5.0)]
        );
    }

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }
}
