// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the scanscore-quality crate. Scores a page-sized
// transcription against a reference with a sprinkling of OCR-style errors.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use scanscore_quality::score_text;

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Benchmark WER + CER on roughly one page of text (~2 KB).
fn bench_score_page(c: &mut Criterion) {
    let sentence = "The quick brown fox jumps over the lazy dog near the river bank. ";
    let truth: String = sentence.repeat(32);
    let predicted = truth.replace("quick", "qu1ck").replace("lazy", "1azy");

    c.bench_function("score_text (~2KB page)", |b| {
        b.iter(|| {
            let scores = score_text(black_box(&predicted), black_box(&truth));
            black_box(scores.ok());
        });
    });
}

criterion_group!(benches, bench_score_page);
criterion_main!(benches);
