// Copyright (c) 2018 10X Genomics, Inc. All rights reserved.

// Compute some stats.  These are the numbers used to calibrate a sample: the
// read-length envelope and the depth cutoff above which a position is treated as
// over-covered.

use statrs::statistics::Statistics;

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
// MOMENTS
// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

// Compute mean of some numbers, returning zero on empty vector.  Sums first, so
// that integral inputs with an integral mean give it exactly.

pub fn mean(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0_f64;
    }
    v.iter().sum::<f64>() / v.len() as f64
}

// Compute standard deviation of some numbers, returning zero on an empty vector.
// Divides by n, not n-1.

pub fn population_stdev(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0_f64;
    }
    v.iter().population_std_dev()
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
// READ LENGTH ENVELOPE
// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

/// Rounded-up mean read length, and the mean +/- two standard deviations around
/// it.  The lower limit never goes below zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LengthEnvelope {
    pub mean: i64,
    pub lower: i64,
    pub upper: i64,
}

// Returns None for an empty list, since neither moment is defined there.

pub fn read_length_envelope(lengths: &[usize]) -> Option<LengthEnvelope> {
    if lengths.is_empty() {
        return None;
    }
    let x: Vec<f64> = lengths.iter().map(|&n| n as f64).collect();
    let sd = population_stdev(&x);
    let m = mean(&x).ceil();
    let lower = (m - 2.0 * sd).ceil().max(0.0);
    let upper = (m + 2.0 * sd).ceil();
    Some(LengthEnvelope {
        mean: m as i64,
        lower: lower as i64,
        upper: upper as i64,
    })
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
// DEPTH
// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

// Estimated coverage: sampled bases over sampled span.  Zero span gives zero.

pub fn coverage(total_bases: u64, sampled_span: u64) -> f64 {
    if sampled_span == 0 {
        return 0_f64;
    }
    total_bases as f64 / sampled_span as f64
}

// Upper bound on per-base depth, treating depth as Poisson with mean equal to the
// coverage: mean plus four standard deviations, rounded up.

pub fn md_threshold(coverage: f64) -> i64 {
    (coverage + 4.0 * coverage.sqrt()).ceil() as i64
}
