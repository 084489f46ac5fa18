// Copyright (c) 2021 10x Genomics, Inc. All rights reserved.

// An AlignmentStore over an indexed BAM or CRAM file.

use hapsmash_types::{AlignmentStore, HapsmashError, HapsmashResult, RawRecord};
use log::debug;
use rust_htslib::bam::record::{Aux, Record};
use rust_htslib::bam::{self, Read};
use std::path::Path;

fn store_err<E: std::fmt::Display>(what: &str, e: E) -> HapsmashError {
    HapsmashError::Store(format!("{}: {}", what, e))
}

pub struct BamStore {
    reader: bam::IndexedReader,
    header: Vec<String>,
}

impl BamStore {
    /// Open an alignment file.  The index (.bai, .csi or .crai) must sit next to it.
    pub fn open<P: AsRef<Path>>(path: P) -> HapsmashResult<BamStore> {
        let path = path.as_ref();
        let reader = bam::IndexedReader::from_path(path)
            .map_err(|e| store_err(&format!("failed to open {}", path.display()), e))?;
        let header = String::from_utf8_lossy(reader.header().as_bytes())
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        Ok(BamStore { reader, header })
    }
}

// Convert one htslib record.  qstart and qend bracket the aligned part of the query
// sequence, which still carries its soft clips.

fn to_raw(tname: &str, r: &Record) -> RawRecord {
    let cigar = r.cigar();
    let qlen = r.seq_len();
    let qstart = cigar.leading_softclips().max(0) as usize;
    let qend = qlen.saturating_sub(cigar.trailing_softclips().max(0) as usize);
    let mut quals = r.qual().to_vec();
    if quals.first() == Some(&255) {
        quals.clear();
    }
    let cs_tag = match r.aux(b"cs") {
        Ok(Aux::String(s)) => Some(s.to_string()),
        _ => None,
    };
    let alignment_type = match r.aux(b"tp") {
        Ok(Aux::Char(c)) => Some(c as char),
        _ => None,
    };
    RawRecord {
        tname: tname.to_string(),
        tstart: r.pos().max(0) as u64,
        tend: cigar.end_pos().max(0) as u64,
        qname: String::from_utf8_lossy(r.qname()).into_owned(),
        qstart,
        qend,
        qseq: r.seq().as_bytes(),
        quals,
        mapq: r.mapq(),
        cs_tag,
        alignment_type,
    }
}

impl AlignmentStore for BamStore {
    fn header_lines(&self) -> Vec<String> {
        self.header.clone()
    }

    fn fetch(&mut self, contig: &str, start: u64, end: u64) -> HapsmashResult<Vec<RawRecord>> {
        self.reader
            .fetch((contig, start as i64, end as i64))
            .map_err(|e| store_err(&format!("failed to fetch {}:{}-{}", contig, start, end), e))?;
        let mut out = Vec::<RawRecord>::new();
        let mut rec = Record::new();
        while let Some(r) = self.reader.read(&mut rec) {
            r.map_err(|e| store_err(&format!("failed to read {}", contig), e))?;
            if rec.is_unmapped() {
                continue;
            }
            out.push(to_raw(contig, &rec));
        }
        debug!("{}:{}-{}: {} records", contig, start, end, out.len());
        Ok(out)
    }
}
