// Copyright (c) 2019 10x Genomics, Inc. All rights reserved.

// Decode a minimap2 cs tag into substitution and indel events.
//
// Operators:
// :N        N matching bases (short form)
// =ACGT     matching bases, spelled out (long form)
// *xy       substitution, reference base x, query base y
// +acg      insertion of acg into the reference
// -acg      deletion of acg from the reference
// ~gt42ag   intron of length 42 (spliced alignments)
//
// Events are reported in VCF coordinates.  A substitution at 0-based reference
// position t is reported at t+1.  An indel is anchored on the reference base just
// before it, so it is reported at the 1-based position of that base, with the
// anchor prepended to both alleles: deleting "CT" after an "A" gives ("ACT", "A"),
// inserting "CT" after it gives ("A", "ACT").
//
// The quality of an event is the summed quality of the query bases making up its
// alt allele: the substituted base, the anchor plus inserted bases, or just the
// anchor for a deletion.  An indel with no aligned base before it cannot be
// anchored and is skipped.

use hapsmash_types::{
    AlignmentDecoder, DecodedEvents, HapsmashError, HapsmashResult, MismatchEvent, RawRecord,
};

#[derive(Clone, Copy, Debug, Default)]
pub struct CsDecoder;

impl AlignmentDecoder for CsDecoder {
    fn decode(&self, record: &RawRecord) -> HapsmashResult<DecodedEvents> {
        decode_cs(record)
    }
}

// Walk state.  tpos is 0-based on the reference, qpos is an index into qseq.
// anchor is the reference base immediately before tpos, if it is known and was
// aligned to the query.

struct Walk<'a> {
    record: &'a RawRecord,
    tpos: u64,
    qpos: usize,
    anchor: Option<u8>,
    events: DecodedEvents,
}

impl<'a> Walk<'a> {
    fn qual(&self, i: usize) -> u32 {
        self.record.quals.get(i).map_or(0, |&q| u32::from(q))
    }

    fn fail(&self, reason: String) -> HapsmashError {
        HapsmashError::MalformedCsTag {
            qname: self.record.qname.clone(),
            reason,
        }
    }

    fn advance_query(&mut self, n: usize) -> HapsmashResult<()> {
        self.qpos += n;
        if self.qpos > self.record.qseq.len() {
            return Err(self.fail(format!(
                "tag covers {} query bases but the read has {}",
                self.qpos,
                self.record.qseq.len()
            )));
        }
        Ok(())
    }

    fn matches(&mut self, n: usize) -> HapsmashResult<()> {
        if n == 0 {
            return Ok(());
        }
        self.advance_query(n)?;
        self.tpos += n as u64;
        self.anchor = Some(self.record.qseq[self.qpos - 1].to_ascii_uppercase());
        Ok(())
    }

    fn substitution(&mut self, r: u8, a: u8) -> HapsmashResult<()> {
        let bq = self.qual(self.qpos);
        self.advance_query(1)?;
        self.events.substitutions.push(MismatchEvent {
            pos: self.tpos + 1,
            ref_allele: (r as char).to_string(),
            alt_allele: (a as char).to_string(),
            bq,
        });
        self.tpos += 1;
        self.anchor = Some(r);
        Ok(())
    }

    fn insertion(&mut self, seq: &str) -> HapsmashResult<()> {
        let start = self.qpos;
        self.advance_query(seq.len())?;
        if let Some(anchor) = self.anchor {
            let anchor = anchor as char;
            let bq = (start - 1..self.qpos).map(|i| self.qual(i)).sum();
            self.events.indels.push(MismatchEvent {
                pos: self.tpos,
                ref_allele: anchor.to_string(),
                alt_allele: format!("{}{}", anchor, seq),
                bq,
            });
        }
        Ok(())
    }

    fn deletion(&mut self, seq: &str) {
        if let Some(anchor) = self.anchor {
            let anchor = anchor as char;
            let bq = self.qual(self.qpos - 1);
            self.events.indels.push(MismatchEvent {
                pos: self.tpos,
                ref_allele: format!("{}{}", anchor, seq),
                alt_allele: anchor.to_string(),
                bq,
            });
        }
        self.tpos += seq.len() as u64;
        // A deleted base only anchors a following indel once some query base has
        // been aligned, since the indel quality is read off the query.
        self.anchor = if self.qpos > self.record.qstart {
            seq.as_bytes().last().copied()
        } else {
            None
        };
    }

    fn intron(&mut self, n: u64) {
        self.tpos += n;
        self.anchor = None;
    }
}

fn take_while<F: Fn(u8) -> bool>(b: &[u8], mut i: usize, f: F) -> usize {
    while i < b.len() && f(b[i]) {
        i += 1;
    }
    i
}

fn is_base(c: u8) -> bool {
    c.is_ascii_alphabetic()
}

/// Decode the cs tag of a record.  A record without a tag (cs ".") or without a
/// stored sequence has no events.
pub fn decode_cs(record: &RawRecord) -> HapsmashResult<DecodedEvents> {
    let cs = record.cs();
    let mut w = Walk {
        record,
        tpos: record.tstart,
        qpos: record.qstart,
        anchor: None,
        events: DecodedEvents::default(),
    };
    if cs == "." || record.qseq.is_empty() {
        return Ok(w.events);
    }
    let b = cs.as_bytes();
    let mut i = 0;
    while i < b.len() {
        let op = b[i];
        let j = match op {
            b':' => {
                let j = take_while(b, i + 1, |c| c.is_ascii_digit());
                let n = cs[i + 1..j]
                    .parse::<usize>()
                    .map_err(|_| w.fail(format!("bad match length at offset {}", i)))?;
                w.matches(n)?;
                j
            }
            b'=' => {
                let j = take_while(b, i + 1, is_base);
                w.matches(j - i - 1)?;
                j
            }
            b'*' => {
                if i + 2 >= b.len() || !is_base(b[i + 1]) || !is_base(b[i + 2]) {
                    return Err(w.fail(format!("bad substitution at offset {}", i)));
                }
                w.substitution(b[i + 1].to_ascii_uppercase(), b[i + 2].to_ascii_uppercase())?;
                i + 3
            }
            b'+' | b'-' => {
                let j = take_while(b, i + 1, is_base);
                if j == i + 1 {
                    return Err(w.fail(format!("empty indel at offset {}", i)));
                }
                let seq = cs[i + 1..j].to_ascii_uppercase();
                if op == b'+' {
                    w.insertion(&seq)?;
                } else {
                    w.deletion(&seq);
                }
                j
            }
            b'~' => {
                let bad = || w.fail(format!("bad intron at offset {}", i));
                if i + 2 >= b.len() || !is_base(b[i + 1]) || !is_base(b[i + 2]) {
                    return Err(bad());
                }
                let k = take_while(b, i + 3, |c| c.is_ascii_digit());
                if k + 2 > b.len() || !is_base(b[k]) || !is_base(b[k + 1]) {
                    return Err(bad());
                }
                let n = cs[i + 3..k].parse::<u64>().map_err(|_| bad())?;
                w.intron(n);
                k + 2
            }
            _ => {
                return Err(w.fail(format!(
                    "unexpected character '{}' at offset {}",
                    op as char, i
                )))
            }
        };
        i = j;
    }
    Ok(w.events)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reads align at reference position 100; the aligned part of the read starts at
    // query offset qstart.  Base qualities are 10, 11, 12, ...

    fn record(cs: &str, qseq: &str, qstart: usize) -> RawRecord {
        RawRecord {
            tname: "chr1".to_string(),
            tstart: 100,
            tend: 200,
            qname: "read1".to_string(),
            qstart,
            qend: qseq.len(),
            qseq: qseq.as_bytes().to_vec(),
            quals: (0..qseq.len()).map(|i| 10 + i as u8).collect(),
            mapq: 60,
            cs_tag: Some(cs.to_string()),
            alignment_type: Some('P'),
        }
    }

    #[test]
    fn test_no_tag() {
        let mut r = record(":4", "ACGT", 0);
        r.cs_tag = None;
        assert_eq!(decode_cs(&r).unwrap(), DecodedEvents::default());
    }

    #[test]
    fn test_substitution() {
        // ACGT ACGT with the 6th base C>T
        let r = record(":5*ct:2", "ACGTATGT", 0);
        let e = decode_cs(&r).unwrap();
        assert_eq!(e.substitutions, vec![MismatchEvent::new(106, "C", "T", 15)]);
        assert!(e.indels.is_empty());
    }

    #[test]
    fn test_insertion() {
        // ACGT, then TT inserted, then ACGT; quality of anchor (T, q13) + TT (q14, q15)
        let r = record(":4+tt:4", "ACGTTTACGT", 0);
        let e = decode_cs(&r).unwrap();
        assert!(e.substitutions.is_empty());
        assert_eq!(e.indels, vec![MismatchEvent::new(104, "T", "TTT", 13 + 14 + 15)]);
        assert!(e.indels[0].is_insertion());
    }

    #[test]
    fn test_deletion() {
        // ACGT, then AC deleted, then GT; anchor T at 0-based 103 -> 1-based 104
        let r = record(":4-ac:2", "ACGTGT", 0);
        let e = decode_cs(&r).unwrap();
        assert_eq!(e.indels, vec![MismatchEvent::new(104, "TAC", "T", 13)]);
        assert!(e.indels[0].is_deletion());
    }

    #[test]
    fn test_soft_clip_offset_and_long_form() {
        // two clipped bases, then long-form match, substitution, deletion
        let r = record("=ACG*ta-gg=TT", "NNACGATT", 2);
        let e = decode_cs(&r).unwrap();
        // substitution at 0-based 103, quality of query index 5
        assert_eq!(e.substitutions, vec![MismatchEvent::new(104, "T", "A", 15)]);
        // deletion anchored on the substituted reference base T
        assert_eq!(e.indels, vec![MismatchEvent::new(104, "TGG", "T", 15)]);
    }

    #[test]
    fn test_unanchored_indel_skipped() {
        let r = record("+gg:4", "GGACGT", 0);
        let e = decode_cs(&r).unwrap();
        assert!(e.indels.is_empty());
    }

    #[test]
    fn test_leading_deletions_do_not_anchor() {
        let r = record("-ac+tt:2", "TTAC", 0);
        assert_eq!(decode_cs(&r).unwrap(), DecodedEvents::default());
        let r = record("-a-c:2", "AC", 0);
        assert_eq!(decode_cs(&r).unwrap(), DecodedEvents::default());
        // same after soft clipping
        let r = record("-a-c:2", "NNAC", 2);
        assert_eq!(decode_cs(&r).unwrap(), DecodedEvents::default());
        // once a base is aligned, a deletion anchors the next indel
        let r = record(":1-a-c:1", "GT", 0);
        let e = decode_cs(&r).unwrap();
        assert_eq!(
            e.indels,
            vec![MismatchEvent::new(101, "GA", "G", 10), MismatchEvent::new(102, "AC", "A", 10)]
        );
    }

    #[test]
    fn test_intron() {
        let r = record(":2~gt10ag*ag", "ACG", 0);
        let e = decode_cs(&r).unwrap();
        assert_eq!(e.substitutions, vec![MismatchEvent::new(113, "A", "G", 12)]);
    }

    #[test]
    fn test_malformed() {
        for cs in &[":4x", "*a", ":", "+:3", ":9", "~gt", "~1234ag", ":2~gt10a", ":2~gt10", ":2~gtag"] {
            let r = record(cs, "ACGT", 0);
            match decode_cs(&r) {
                Err(HapsmashError::MalformedCsTag { qname, .. }) => assert_eq!(qname, "read1"),
                other => panic!("cs {} gave {:?}", cs, other),
            }
        }
    }

    #[test]
    fn test_decoder_trait() {
        let r = record(":1*ag", "AG", 0);
        let e = CsDecoder.decode(&r).unwrap();
        assert_eq!(e.substitutions.len(), 1);
    }
}
