// Copyright (c) 2021 10x Genomics, Inc. All rights reserved.

// Driver code for the hapsmash binary: region parsing, threshold estimation for a
// sample, and per-read classification over a region.

use hapsmash_types::{AlignedRead, AlignmentDecoder, AlignmentStore, HapsmashError, HapsmashResult};
use itertools::Itertools;
use log::{debug, info, warn};
use mismatch_classify::{Classification, ClassifiedRead};
use serde::Serialize;
use std::path::Path;
use threshold_est::{estimate_thresholds, SamplingConfig, Thresholds};

/// A reference interval, 1-based and inclusive, as written "chr1:1000-2000".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub contig: String,
    pub start: u64,
    pub end: u64,
}

pub fn parse_region(s: &str) -> HapsmashResult<Region> {
    let bad = || HapsmashError::Configuration(format!("region {} is not of the form chr:start-end", s));
    let colon = s.rfind(':').ok_or_else(bad)?;
    let (contig, span) = (&s[..colon], &s[colon + 1..]);
    let span = span.replace(',', "");
    let dash = span.find('-').ok_or_else(bad)?;
    let start = span[..dash].parse::<u64>().map_err(|_| bad())?;
    let end = span[dash + 1..].parse::<u64>().map_err(|_| bad())?;
    if contig.is_empty() || start == 0 || end < start {
        return Err(bad());
    }
    Ok(Region {
        contig: contig.to_string(),
        start,
        end,
    })
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
// THRESHOLDS
// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SampleThresholds {
    pub sample: String,
    pub thresholds: Thresholds,
}

// Estimate thresholds for the sample in the store.  Windows are drawn from the
// contigs of the VCF if one is given, else from every contig in the header.

pub fn sample_thresholds<S: AlignmentStore + ?Sized>(
    store: &mut S,
    vcf: Option<&Path>,
    config: &SamplingConfig,
) -> HapsmashResult<SampleThresholds> {
    let sample = store.sample_name()?;
    let (header_contigs, lengths) = store.contigs()?;
    let contigs = match vcf {
        Some(path) => vcf_sets::vcf_contigs(path)?,
        None => header_contigs,
    };
    info!(
        "{}: sampling {} contigs: {}",
        sample,
        contigs.len(),
        contigs.iter().format(", ")
    );
    let thresholds = estimate_thresholds(store, &contigs, &lengths, config)?;
    Ok(SampleThresholds { sample, thresholds })
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
// CLASSIFICATION
// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

/// One output line of `hapsmash classify`.  Coordinates are those of the record,
/// 0-based half-open.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReadReport {
    pub qname: String,
    pub tname: String,
    pub tstart: u64,
    pub tend: u64,
    pub mapq: u8,
    pub is_primary: bool,
    pub query_alignment_proportion: f64,
    pub classification: Classification,
}

impl ReadReport {
    fn new(c: ClassifiedRead) -> ReadReport {
        let read = &c.read;
        ReadReport {
            qname: read.qname.clone(),
            tname: read.tname.clone(),
            tstart: read.tstart,
            tend: read.tend,
            mapq: read.mapq,
            is_primary: read.is_primary,
            query_alignment_proportion: read.query_alignment_proportion(),
            classification: c.mismatches,
        }
    }
}

// Classify every record overlapping the region.  The calls are loaded over the span
// of the fetched records rather than the region itself, so that mismatches of a read
// hanging over the region edge still see their calls.  Records whose tag cannot be
// decoded are reported and skipped.

pub fn classify_region<S, D>(
    store: &mut S,
    decoder: &D,
    vcf: &Path,
    region: &Region,
) -> HapsmashResult<Vec<ReadReport>>
where
    S: AlignmentStore + ?Sized,
    D: AlignmentDecoder + ?Sized,
{
    let records = store.fetch(&region.contig, region.start.saturating_sub(1), region.end)?;
    if records.is_empty() {
        return Ok(Vec::new());
    }
    let lo = records.iter().map(|r| r.tstart).min().unwrap_or(0);
    let hi = records.iter().map(|r| r.tend).max().unwrap_or(0);
    let sets = vcf_sets::load_variant_sets(vcf, &region.contig, lo + 1, hi + 2)?;
    if sets.is_empty() {
        debug!("{}:{}-{}: no calls, every mismatch is de novo", region.contig, lo + 1, hi + 1);
    }

    let mut reports = Vec::<ReadReport>::with_capacity(records.len());
    let mut skipped = 0;
    for r in records {
        let read = match AlignedRead::from_record(r, decoder) {
            Ok(read) => read,
            Err(e) => {
                warn!("{}", e);
                skipped += 1;
                continue;
            }
        };
        reports.push(ReadReport::new(ClassifiedRead::new(read, &sets)));
    }
    info!(
        "{}:{}-{}: classified {} reads, skipped {}",
        region.contig,
        region.start,
        region.end,
        reports.len(),
        skipped
    );
    Ok(reports)
}
