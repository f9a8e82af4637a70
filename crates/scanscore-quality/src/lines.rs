// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR token table → per-line text and confidence.

use std::collections::HashMap;

use scanscore_core::{LineAggregate, LineConfidence, LineKey, TokenRecord};
use tracing::debug;

/// Group tokens by `(page, block, paragraph, line)` and average their
/// confidences.
///
/// Tokens the engine discarded (negative confidence) are dropped before
/// grouping, so they neither contribute text nor drag the mean down. Lines
/// come out in the order their key was first seen.
pub fn aggregate_lines(tokens: &[TokenRecord]) -> Vec<LineAggregate> {
    let mut order: Vec<LineKey> = Vec::new();
    let mut groups: HashMap<LineKey, (Vec<&str>, f64)> = HashMap::new();

    for token in tokens.iter().filter(|t| !t.is_discarded()) {
        let key = token.line_key();
        let entry = groups.entry(key).or_insert_with(|| {
            order.push(key);
            (Vec::new(), 0.0)
        });
        entry.0.push(token.text.as_str());
        entry.1 += f64::from(token.confidence);
    }

    let lines: Vec<LineAggregate> = order
        .into_iter()
        .filter_map(|key| {
            let (texts, sum) = groups.remove(&key)?;
            let token_count = texts.len();
            Some(LineAggregate {
                key,
                text: texts.join(" "),
                mean_confidence: sum / token_count as f64,
                token_count,
            })
        })
        .collect();

    debug!(
        tokens = tokens.len(),
        lines = lines.len(),
        "OCR tokens aggregated into lines"
    );
    lines
}

/// Lines with visible text, paired with their confidence rounded to three
/// decimals.
pub fn line_confidences(lines: &[LineAggregate]) -> Vec<LineConfidence> {
    lines
        .iter()
        .filter(|line| !line.text.trim().is_empty())
        .map(|line| LineConfidence {
            text: line.text.clone(),
            confidence: round_to(line.mean_confidence, 3),
        })
        .collect()
}

/// Mean of the per-line confidences, rounded to two decimals; `0.0` when
/// there are no lines.
pub fn average_confidence(lines: &[LineAggregate]) -> f64 {
    if lines.is_empty() {
        return 0.0;
    }
    let total: f64 = lines.iter().map(|line| line.mean_confidence).sum();
    round_to(total / lines.len() as f64, 2)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
