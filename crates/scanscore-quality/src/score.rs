// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Word Error Rate (WER) and Character Error Rate (CER).
//
// Both metrics divide an edit distance by the length of the ground truth, so
// they are not symmetric and can exceed 100% when the prediction inserts more
// than the reference contains. Neither is clamped.

use scanscore_core::error::{Result, ScanScoreError};
use scanscore_core::{ScorePair, TextScores};
use tracing::{debug, instrument};

/// Word-level edit distance over whitespace tokens, normalised by the number
/// of ground-truth words.
///
/// # Errors
///
/// [`ScanScoreError::InvalidInput`] if `ground_truth` contains no words.
#[instrument(skip_all, fields(predicted_len = predicted.len(), truth_len = ground_truth.len()))]
pub fn word_error_rate(predicted: &str, ground_truth: &str) -> Result<ScorePair> {
    let predicted_words: Vec<&str> = predicted.split_whitespace().collect();
    let truth_words: Vec<&str> = ground_truth.split_whitespace().collect();

    if truth_words.is_empty() {
        return Err(ScanScoreError::InvalidInput(
            "the ground truth must contain at least one word".into(),
        ));
    }

    let distance = strsim::generic_levenshtein(&predicted_words, &truth_words);
    let pair = ScorePair::from_ratio(distance as f64 / truth_words.len() as f64);
    debug!(distance, words = truth_words.len(), wer = pair.error_rate, "WER computed");
    Ok(pair)
}

/// Character-level edit distance, normalised by the number of ground-truth
/// characters (Unicode scalar values).
///
/// # Errors
///
/// [`ScanScoreError::InvalidInput`] if `ground_truth` is empty.
#[instrument(skip_all, fields(predicted_len = predicted.len(), truth_len = ground_truth.len()))]
pub fn character_error_rate(predicted: &str, ground_truth: &str) -> Result<ScorePair> {
    let truth_chars = ground_truth.chars().count();
    if truth_chars == 0 {
        return Err(ScanScoreError::InvalidInput(
            "the ground truth must not be empty".into(),
        ));
    }

    let distance = strsim::levenshtein(predicted, ground_truth);
    let pair = ScorePair::from_ratio(distance as f64 / truth_chars as f64);
    debug!(distance, chars = truth_chars, cer = pair.error_rate, "CER computed");
    Ok(pair)
}

/// Compute both WER and CER for one transcription.
pub fn score_text(predicted: &str, ground_truth: &str) -> Result<TextScores> {
    Ok(TextScores {
        wer: word_error_rate(predicted, ground_truth)?,
        cer: character_error_rate(predicted, ground_truth)?,
    })
}

/// Score raw inputs that may not be text at all (e.g. a reference read from
/// disk or an OCR engine's byte output).
///
/// # Errors
///
/// [`ScanScoreError::InvalidInput`] if either side is not valid UTF-8, plus
/// the errors of [`score_text`].
pub fn score_bytes(predicted: &[u8], ground_truth: &[u8]) -> Result<TextScores> {
    let predicted = std::str::from_utf8(predicted).map_err(|err| {
        ScanScoreError::InvalidInput(format!("the prediction must be text: {err}"))
    })?;
    let ground_truth = std::str::from_utf8(ground_truth).map_err(|err| {
        ScanScoreError::InvalidInput(format!("the ground truth must be text: {err}"))
    })?;
    score_text(predicted, ground_truth)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-2
    }

    #[test]
    fn one_substituted_word_and_one_deleted_char() {
        let wer = word_error_rate("hello wrld", "hello world").unwrap();
        assert_eq!(wer.error_rate, 50.0);
        assert_eq!(wer.accuracy, 50.0);

        let cer = character_error_rate("hello wrld", "hello world").unwrap();
        assert!(close(cer.error_rate, 9.09), "got {}", cer.error_rate);
        assert!(close(cer.accuracy, 90.91), "got {}", cer.accuracy);
    }

    #[test]
    fn exact_match_scores_zero() {
        for text in ["hello world", "a", "The quick brown fox."] {
            let scores = score_text(text, text).unwrap();
            assert_eq!(scores.wer.error_rate, 0.0);
            assert_eq!(scores.cer.error_rate, 0.0);
            assert_eq!(scores.wer.accuracy, 100.0);
            assert_eq!(scores.cer.accuracy, 100.0);
        }
    }

    #[test]
    fn whitespace_differences_do_not_count_as_word_errors() {
        let wer = word_error_rate("hello \n\t world ", "hello world").unwrap();
        assert_eq!(wer.error_rate, 0.0);
    }

    #[test]
    fn empty_ground_truth_is_rejected() {
        assert!(matches!(
            word_error_rate("anything", ""),
            Err(ScanScoreError::InvalidInput(_))
        ));
        assert!(matches!(
            character_error_rate("anything", ""),
            Err(ScanScoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn whitespace_only_ground_truth_has_no_words() {
        assert!(word_error_rate("x", "   ").is_err());
        // A string of spaces still has characters.
        assert!(character_error_rate("x", "   ").is_ok());
    }

    #[test]
    fn rates_are_not_commutative() {
        let forward = word_error_rate("a b c", "a").unwrap();
        let backward = word_error_rate("a", "a b c").unwrap();
        assert_eq!(forward.error_rate, 200.0);
        assert!(close(backward.error_rate, 66.67));
        assert_ne!(forward, backward);
    }

    #[test]
    fn insertions_push_rate_past_one_hundred() {
        let cer = character_error_rate("abcdef", "ab").unwrap();
        assert_eq!(cer.error_rate, 200.0);
        assert_eq!(cer.accuracy, -100.0);
    }

    #[test]
    fn empty_prediction_is_all_deletions() {
        let scores = score_text("", "two words").unwrap();
        assert_eq!(scores.wer.error_rate, 100.0);
        assert_eq!(scores.cer.error_rate, 100.0);
    }

    #[test]
    fn characters_are_counted_not_bytes() {
        // "é" is two bytes but one character.
        let cer = character_error_rate("cafe", "café").unwrap();
        assert_eq!(cer.error_rate, 25.0);
    }

    #[test]
    fn non_text_bytes_are_rejected() {
        let err = score_bytes(&[0xff, 0xfe], b"hello").unwrap_err();
        assert!(matches!(err, ScanScoreError::InvalidInput(_)));

        let err = score_bytes(b"hello", &[0xc3]).unwrap_err();
        assert!(matches!(err, ScanScoreError::InvalidInput(_)));

        let scores = score_bytes(b"hello wrld", b"hello world").unwrap();
        assert_eq!(scores.wer.error_rate, 50.0);
    }
}
