// Copyright (c) 2019 10x Genomics, Inc. All rights reserved.

// Estimate per-sample thresholds from a random sample of the alignments.
//
// For each contig we draw distinct random window starts, fetch the reads overlapping
// each window, and keep the primary alignments with positive mapping quality.  Their
// lengths give the read-length envelope (mean +/- 2 sd), and their total length over
// the total sampled span gives the coverage, from which the depth threshold follows.
//
// A read overlapping several windows is counted once per window, and windows running
// off the end of a contig are still counted at full length in the sampled span.

use hapsmash_types::{AlignmentStore, HapsmashError, HapsmashResult};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use stats_utils::{coverage, md_threshold, read_length_envelope};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingConfig {
    pub seed: u64,
    // windows per contig
    pub sample_count: usize,
    pub window_len: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig {
            seed: 10,
            sample_count: 100,
            window_len: 100_000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub qlen_mean: i64,
    pub qlen_lower: i64,
    pub qlen_upper: i64,
    pub md_threshold: i64,
    pub coverage: f64,
    pub read_count: usize,
    pub windows: usize,
}

// Distinct window starts in [0, contig_len), at most sample_count of them.

fn window_starts(rng: &mut StdRng, contig_len: u64, sample_count: usize) -> Vec<u64> {
    let n = contig_len as usize;
    let amount = sample_count.min(n);
    rand::seq::index::sample(rng, n, amount)
        .into_iter()
        .map(|i| i as u64)
        .collect()
}

pub fn estimate_thresholds<S: AlignmentStore + ?Sized>(
    store: &mut S,
    contigs: &[String],
    contig_lengths: &HashMap<String, u64>,
    config: &SamplingConfig,
) -> HapsmashResult<Thresholds> {
    if contigs.is_empty() {
        return Err(HapsmashError::Configuration(
            "target is missing.\nPlease check the .vcf file or the .target file.".to_string(),
        ));
    }
    let mut lens = Vec::<(&str, u64)>::with_capacity(contigs.len());
    for c in contigs.iter() {
        match contig_lengths.get(c) {
            Some(&len) => lens.push((c.as_str(), len)),
            None => {
                return Err(HapsmashError::Configuration(format!(
                    "contig {} is not in the alignment header",
                    c
                )))
            }
        }
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut qlens = Vec::<usize>::new();
    let mut total_bases = 0_u64;
    let mut windows = 0_usize;
    for (contig, len) in lens {
        if len == 0 {
            warn!("contig {} has length zero, skipping", contig);
            continue;
        }
        let before = qlens.len();
        for start in window_starts(&mut rng, len, config.sample_count) {
            let end = (start + config.window_len).min(len);
            for r in store.fetch(contig, start, end)? {
                if r.mapq > 0 && r.is_primary() {
                    qlens.push(r.qlen());
                    total_bases += r.qlen() as u64;
                }
            }
            windows += 1;
        }
        debug!("{}: {} qualifying reads", contig, qlens.len() - before);
    }

    let env = read_length_envelope(&qlens).ok_or(HapsmashError::InsufficientSample {
        contigs: contigs.len(),
        windows,
    })?;
    let cov = coverage(total_bases, windows as u64 * config.window_len);
    let t = Thresholds {
        qlen_mean: env.mean,
        qlen_lower: env.lower,
        qlen_upper: env.upper,
        md_threshold: md_threshold(cov),
        coverage: cov,
        read_count: qlens.len(),
        windows,
    };
    info!(
        "sampled {} reads in {} windows: read length {} [{}, {}], coverage {:.2}, depth threshold {}",
        t.read_count, t.windows, t.qlen_mean, t.qlen_lower, t.qlen_upper, t.coverage, t.md_threshold
    );
    Ok(t)
}
