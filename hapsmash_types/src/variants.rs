// Copyright (c) 2021 10x Genomics, Inc. All rights reserved.

// Known-variant lookups and the labels that the classifier hands out.

use crate::read::MismatchEvent;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use strum_macros::{Display, EnumIter, EnumString};

/// Exact allele identity: (1-based position, ref allele, alt allele).
pub type AlleleKey = (u64, String, String);

/// Variant calls for one sample over one window, in the shape the classifier
/// needs.  The exact-allele sets hold SNVs and indels alike; the position sets and
/// `pos2allele` hold indels only, for the cases where the allele text of a read
/// and of the call disagree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VariantSets {
    pub het_set: HashSet<AlleleKey>,
    pub hom_set: HashSet<AlleleKey>,
    pub hetpos_set: HashSet<u64>,
    pub hompos_set: HashSet<u64>,
    pub phased_hetsnp_set: HashSet<AlleleKey>,
    pub pos2allele: HashMap<u64, [String; 2]>,
}

fn key(pos: u64, ref_allele: &str, alt_allele: &str) -> AlleleKey {
    (pos, ref_allele.to_string(), alt_allele.to_string())
}

impl VariantSets {
    pub fn new() -> VariantSets {
        VariantSets::default()
    }

    pub fn is_empty(&self) -> bool {
        self.het_set.is_empty()
            && self.hom_set.is_empty()
            && self.phased_hetsnp_set.is_empty()
            && self.pos2allele.is_empty()
    }

    // Record a heterozygous call.  Indels also go into the position lookups.

    pub fn add_het(&mut self, pos: u64, ref_allele: &str, alt_allele: &str) {
        self.het_set.insert(key(pos, ref_allele, alt_allele));
        if ref_allele.len() != alt_allele.len() {
            self.hetpos_set.insert(pos);
            self.pos2allele
                .insert(pos, [ref_allele.to_string(), alt_allele.to_string()]);
        }
    }

    pub fn add_hom(&mut self, pos: u64, ref_allele: &str, alt_allele: &str) {
        self.hom_set.insert(key(pos, ref_allele, alt_allele));
        if ref_allele.len() != alt_allele.len() {
            self.hompos_set.insert(pos);
            self.pos2allele
                .insert(pos, [ref_allele.to_string(), alt_allele.to_string()]);
        }
    }

    pub fn add_phased_hetsnp(&mut self, pos: u64, ref_allele: &str, alt_allele: &str) {
        self.phased_hetsnp_set
            .insert(key(pos, ref_allele, alt_allele));
    }

    pub fn is_het(&self, e: &MismatchEvent) -> bool {
        self.het_set.contains(&key(e.pos, &e.ref_allele, &e.alt_allele))
    }

    pub fn is_hom(&self, e: &MismatchEvent) -> bool {
        self.hom_set.contains(&key(e.pos, &e.ref_allele, &e.alt_allele))
    }

    pub fn is_phased_hetsnp(&self, e: &MismatchEvent) -> bool {
        self.phased_hetsnp_set
            .contains(&key(e.pos, &e.ref_allele, &e.alt_allele))
    }
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
// CLASSIFICATION LABELS
// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

/// Where a single mismatch lands.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
    Hash,
)]
pub enum MismatchClass {
    #[strum(to_string = "hom")]
    #[serde(rename = "hom")]
    Homozygous,
    #[strum(to_string = "het")]
    #[serde(rename = "het")]
    Heterozygous,
    #[strum(to_string = "het_phased")]
    #[serde(rename = "het_phased")]
    HeterozygousPhased,
    #[strum(to_string = "denovo")]
    #[serde(rename = "denovo")]
    DeNovo,
    // known het SNV whose phase is not resolved
    #[strum(to_string = "dropped")]
    #[serde(rename = "dropped")]
    Dropped,
    // indel at a called position that is in neither position set
    #[strum(to_string = "unresolved")]
    #[serde(rename = "unresolved")]
    Unresolved,
}

/// A classified mismatch.  `confidence` is the base quality normalized by
/// `MAX_BASE_QUALITY` (and by allele length for indels).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mismatch {
    pub pos: u64,
    pub ref_allele: String,
    pub alt_allele: String,
    pub confidence: f64,
}

impl Mismatch {
    pub fn from_event(e: &MismatchEvent, confidence: f64) -> Mismatch {
        Mismatch {
            pos: e.pos,
            ref_allele: e.ref_allele.clone(),
            alt_allele: e.alt_allele.clone(),
            confidence,
        }
    }
}
