// Copyright (c) 2021 10x Genomics, Inc. All rights reserved.

// The view of an alignment file that the threshold estimator and the classifier
// driver need: header text plus region queries.

use crate::error::{HapsmashError, HapsmashResult};
use crate::header;
use crate::read::RawRecord;
use std::collections::HashMap;

/// An indexed source of alignment records.  Implementations release their
/// resources on drop.
pub trait AlignmentStore {
    /// The text header, one entry per line.
    fn header_lines(&self) -> Vec<String>;

    /// All records on `contig` overlapping the 0-based half-open `[start, end)`.
    fn fetch(&mut self, contig: &str, start: u64, end: u64) -> HapsmashResult<Vec<RawRecord>>;

    fn sample_name(&self) -> HapsmashResult<String> {
        header::sample_name(&self.header_lines())
    }

    fn contigs(&self) -> HapsmashResult<(Vec<String>, HashMap<String, u64>)> {
        header::contigs(&self.header_lines())
    }
}

/// An alignment store held in memory.  Records are kept in the order given; fetch
/// returns them in that order.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    pub header: Vec<String>,
    pub records: Vec<RawRecord>,
    pub fetches: usize,
}

impl MemoryStore {
    pub fn new(header: Vec<String>, records: Vec<RawRecord>) -> MemoryStore {
        MemoryStore {
            header,
            records,
            fetches: 0,
        }
    }
}

impl AlignmentStore for MemoryStore {
    fn header_lines(&self) -> Vec<String> {
        self.header.clone()
    }

    fn fetch(&mut self, contig: &str, start: u64, end: u64) -> HapsmashResult<Vec<RawRecord>> {
        if !self.header.iter().any(|h| {
            h.starts_with("@SQ") && string_utils::field_value(h, "SN") == Some(contig)
        }) {
            return Err(HapsmashError::Store(format!("unknown contig {}", contig)));
        }
        self.fetches += 1;
        Ok(self
            .records
            .iter()
            .filter(|r| r.tname == contig && r.tstart < end && r.tend > start)
            .cloned()
            .collect())
    }
}
