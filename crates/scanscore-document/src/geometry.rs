// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Planar geometry helpers for document outlines — corner canonicalization and
// closed-curve polygon simplification.

use scanscore_core::error::{Result, ScanScoreError};
use scanscore_core::{CanonicalCorners, Point};

// -- Corner canonicalization --------------------------------------------------

/// Label four arbitrary-order vertices as top-left, top-right, bottom-right,
/// bottom-left.
///
/// With `s = x + y` and `d = y - x`: top-left has the smallest `s`,
/// bottom-right the largest `s`, top-right the smallest `d` and bottom-left
/// the largest `d`.
///
/// Ties are resolved deterministically: a minimum takes the first matching
/// point, a maximum takes the last. When every point has the same `s`,
/// bottom-right is the last point that differs from top-left, so the two are
/// distinct unless all four points coincide.
///
/// # Errors
///
/// [`ScanScoreError::InvalidInput`] unless exactly four points are given.
pub fn canonicalize(points: &[Point]) -> Result<CanonicalCorners> {
    if points.len() != 4 {
        return Err(ScanScoreError::InvalidInput(format!(
            "a quadrilateral needs exactly 4 points, got {}",
            points.len()
        )));
    }

    let sum = |p: &Point| p.x + p.y;
    let diff = |p: &Point| p.y - p.x;

    let top_left = points[first_min_index(points, sum)];
    let mut bottom_right = points[last_max_index(points, sum)];
    if bottom_right == top_left {
        // Only possible when all sums tie.
        if let Some(other) = points.iter().rev().find(|p| **p != top_left) {
            bottom_right = *other;
        }
    }

    Ok(CanonicalCorners {
        top_left,
        top_right: points[first_min_index(points, diff)],
        bottom_right,
        bottom_left: points[last_max_index(points, diff)],
    })
}

fn first_min_index(points: &[Point], key: impl Fn(&Point) -> f32) -> usize {
    let mut best = 0;
    for (i, p) in points.iter().enumerate().skip(1) {
        if key(p) < key(&points[best]) {
            best = i;
        }
    }
    best
}

fn last_max_index(points: &[Point], key: impl Fn(&Point) -> f32) -> usize {
    let mut best = 0;
    for (i, p) in points.iter().enumerate().skip(1) {
        if key(p) >= key(&points[best]) {
            best = i;
        }
    }
    best
}

// -- Distances ----------------------------------------------------------------

fn distance(a: Point, b: Point) -> f64 {
    let dx = f64::from(a.x) - f64::from(b.x);
    let dy = f64::from(a.y) - f64::from(b.y);
    (dx * dx + dy * dy).sqrt()
}

/// Distance from `p` to the infinite line through `a` and `b` (or to `a`
/// when the two coincide).
fn distance_to_line(p: Point, a: Point, b: Point) -> f64 {
    let (ax, ay) = (f64::from(a.x), f64::from(a.y));
    let (dx, dy) = (f64::from(b.x) - ax, f64::from(b.y) - ay);
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return distance(p, a);
    }
    ((f64::from(p.x) - ax) * dy - (f64::from(p.y) - ay) * dx).abs() / len
}

// -- Polygon approximation ----------------------------------------------------

/// Simplify a closed curve with the Douglas–Peucker algorithm.
///
/// The curve is cut at two anchors: the point farthest from the first
/// vertex, and the point farthest from that one. Each of the two open chains
/// between the anchors is simplified independently; a vertex survives when it
/// lies more than `epsilon` from the chord of its enclosing span. Surviving
/// vertices keep their original cyclic order.
pub fn approximate_polygon(points: &[Point], epsilon: f64) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let first_anchor = farthest_from(points, 0);
    let second_anchor = farthest_from(points, first_anchor);
    if distance(points[first_anchor], points[second_anchor]) == 0.0 {
        // Every vertex is the same point.
        return vec![points[0]];
    }

    let start = first_anchor.min(second_anchor);
    let end = first_anchor.max(second_anchor);

    let mut keep = vec![false; n];
    keep[start] = true;
    keep[end] = true;

    let forward: Vec<usize> = (start..=end).collect();
    let wrapped: Vec<usize> = (end..n).chain(0..=start).collect();
    simplify_chain(points, &forward, epsilon, &mut keep);
    simplify_chain(points, &wrapped, epsilon, &mut keep);

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, kept)| kept.then_some(*p))
        .collect()
}

fn farthest_from(points: &[Point], origin: usize) -> usize {
    let mut best = origin;
    let mut best_dist = 0.0;
    for (i, p) in points.iter().enumerate() {
        let d = distance(points[origin], *p);
        if d > best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// Mark the vertices of one open chain (given as indices into `points`)
/// that survive simplification. The chain endpoints are already kept.
fn simplify_chain(points: &[Point], chain: &[usize], epsilon: f64, keep: &mut [bool]) {
    // Explicit stack: pixel contours can run to thousands of vertices.
    let mut spans = vec![(0usize, chain.len().saturating_sub(1))];

    while let Some((lo, hi)) = spans.pop() {
        if hi <= lo + 1 {
            continue;
        }
        let a = points[chain[lo]];
        let b = points[chain[hi]];

        let mut split = lo;
        let mut max_dist = 0.0;
        for k in lo + 1..hi {
            let d = distance_to_line(points[chain[k]], a, b);
            if d > max_dist {
                max_dist = d;
                split = k;
            }
        }

        if max_dist > epsilon {
            keep[chain[split]] = true;
            spans.push((lo, split));
            spans.push((split, hi));
        }
    }
}
