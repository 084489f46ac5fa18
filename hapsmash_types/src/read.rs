// Copyright (c) 2021 10x Genomics, Inc. All rights reserved.

// Alignment records, as handed over by an alignment store, and the per-read view
// that the classifier works on.

use crate::error::HapsmashResult;
use serde::{Deserialize, Serialize};

/// Highest base quality representable in the phred+33 encoding.  Confidences are
/// base qualities divided by this.
pub const MAX_BASE_QUALITY: f64 = 93.0;

/// Value of the `tp` tag marking a primary alignment.
pub const PRIMARY_ALIGNMENT: char = 'P';

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
// MISMATCH EVENTS
// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

/// One difference between a read and the reference, in VCF coordinates: `pos` is
/// 1-based, and indels carry the anchoring reference base on both alleles.  `bq` is
/// the base quality summed over the query bases of the alt allele.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MismatchEvent {
    pub pos: u64,
    pub ref_allele: String,
    pub alt_allele: String,
    pub bq: u32,
}

impl MismatchEvent {
    pub fn new(pos: u64, ref_allele: &str, alt_allele: &str, bq: u32) -> MismatchEvent {
        MismatchEvent {
            pos,
            ref_allele: ref_allele.to_string(),
            alt_allele: alt_allele.to_string(),
            bq,
        }
    }

    pub fn is_deletion(&self) -> bool {
        self.ref_allele.len() > self.alt_allele.len()
    }

    pub fn is_insertion(&self) -> bool {
        self.ref_allele.len() < self.alt_allele.len()
    }
}

/// Output of decoding one record's difference tag.  Both lists are in reference
/// order.  `indels` never contains an event with equal allele lengths.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedEvents {
    pub substitutions: Vec<MismatchEvent>,
    pub indels: Vec<MismatchEvent>,
}

/// Turns the difference tag of a record into substitution and indel events.
pub trait AlignmentDecoder {
    fn decode(&self, record: &RawRecord) -> HapsmashResult<DecodedEvents>;
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
// RAW RECORDS
// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

/// The fields of one alignment record that anything downstream looks at.
/// Reference coordinates are 0-based half-open; `qstart..qend` is the aligned part
/// of `qseq` (i.e. soft clips excluded).  `quals` are raw phred values, no offset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub tname: String,
    pub tstart: u64,
    pub tend: u64,
    pub qname: String,
    pub qstart: usize,
    pub qend: usize,
    pub qseq: Vec<u8>,
    pub quals: Vec<u8>,
    pub mapq: u8,
    pub cs_tag: Option<String>,
    pub alignment_type: Option<char>,
}

impl RawRecord {
    // Absent tp tag means not primary.

    pub fn is_primary(&self) -> bool {
        self.alignment_type == Some(PRIMARY_ALIGNMENT)
    }

    pub fn cs(&self) -> &str {
        self.cs_tag.as_deref().unwrap_or(".")
    }

    pub fn qlen(&self) -> usize {
        self.qseq.len()
    }
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
// ALIGNED READS
// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

/// A record together with its decoded mismatches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlignedRead {
    pub tname: String,
    pub tstart: u64,
    pub tend: u64,
    pub qname: String,
    pub qstart: usize,
    pub qend: usize,
    pub qseq: Vec<u8>,
    pub quals: Vec<u8>,
    pub mapq: u8,
    pub cs_tag: String,
    pub is_primary: bool,
    pub substitution_events: Vec<MismatchEvent>,
    pub indel_events: Vec<MismatchEvent>,
}

impl AlignedRead {
    pub fn from_record<D: AlignmentDecoder + ?Sized>(
        record: RawRecord,
        decoder: &D,
    ) -> HapsmashResult<AlignedRead> {
        let events = decoder.decode(&record)?;
        let is_primary = record.is_primary();
        let cs_tag = record.cs().to_string();
        Ok(AlignedRead {
            tname: record.tname,
            tstart: record.tstart,
            tend: record.tend,
            qname: record.qname,
            qstart: record.qstart,
            qend: record.qend,
            qseq: record.qseq,
            quals: record.quals,
            mapq: record.mapq,
            cs_tag,
            is_primary,
            substitution_events: events.substitutions,
            indel_events: events.indels,
        })
    }

    pub fn target_alignment_length(&self) -> u64 {
        self.tend.saturating_sub(self.tstart)
    }

    pub fn qlen(&self) -> usize {
        self.qseq.len()
    }

    pub fn query_alignment_length(&self) -> usize {
        self.qend.saturating_sub(self.qstart)
    }

    // Fraction of the read that is aligned; zero for a read with no stored sequence.

    pub fn query_alignment_proportion(&self) -> f64 {
        if self.qseq.is_empty() {
            return 0_f64;
        }
        self.query_alignment_length() as f64 / self.qlen() as f64
    }
}
