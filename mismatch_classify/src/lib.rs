// Copyright (c) 2019 10x Genomics, Inc. All rights reserved.

// Classify the mismatches of one read against the variant calls of its sample.
//
// Substitutions are checked against the calls in a fixed order: homozygous, then
// heterozygous (these are dropped, since their phase is unknown), then phased
// heterozygous, and whatever is left is de novo.
//
// Indels are first matched exactly.  Failing that, if there is a call at the same
// position with different allele text, the read and the call are compared only by
// orientation (insertion versus deletion), since the same event is often spelled
// differently without realignment.

use hapsmash_types::{
    AlignedRead, Mismatch, MismatchClass, MismatchEvent, VariantSets, MAX_BASE_QUALITY,
};
use log::debug;
use serde::Serialize;
use std::cmp::Ordering;
use string_utils::natural_cmp;

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
// CONFIDENCE
// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

pub fn snv_confidence(bq: u32) -> f64 {
    f64::from(bq) / MAX_BASE_QUALITY
}

// The quality of an indel is summed over its alt allele, so divide by its length.

pub fn indel_confidence(bq: u32, alt_len: usize) -> f64 {
    f64::from(bq) / (MAX_BASE_QUALITY * alt_len.max(1) as f64)
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
// PER-EVENT CLASSIFICATION
// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

/// Classify a substitution.  Never returns `Heterozygous` or `Unresolved`.
pub fn snv_class(e: &MismatchEvent, sets: &VariantSets) -> MismatchClass {
    match (sets.is_hom(e), sets.is_het(e), sets.is_phased_hetsnp(e)) {
        (true, _, _) => MismatchClass::Homozygous,
        (false, true, _) => MismatchClass::Dropped,
        (false, false, true) => MismatchClass::HeterozygousPhased,
        (false, false, false) => MismatchClass::DeNovo,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Deletion,
    Insertion,
    // equal allele lengths, i.e. not an indel
    Neither,
}

pub fn orientation(ref_allele: &str, alt_allele: &str) -> Orientation {
    match ref_allele.len().cmp(&alt_allele.len()) {
        Ordering::Greater => Orientation::Deletion,
        Ordering::Less => Orientation::Insertion,
        Ordering::Equal => Orientation::Neither,
    }
}

impl Orientation {
    pub fn of_event(e: &MismatchEvent) -> Orientation {
        if e.is_deletion() {
            Orientation::Deletion
        } else if e.is_insertion() {
            Orientation::Insertion
        } else {
            Orientation::Neither
        }
    }
}

/// Classify an indel.  Never returns `HeterozygousPhased` or `Dropped`.
pub fn indel_class(e: &MismatchEvent, sets: &VariantSets) -> MismatchClass {
    if sets.is_het(e) {
        return MismatchClass::Heterozygous;
    }
    if sets.is_hom(e) {
        return MismatchClass::Homozygous;
    }
    let called = match sets.pos2allele.get(&e.pos) {
        Some(called) => called,
        None => return MismatchClass::DeNovo,
    };
    let read_state = Orientation::of_event(e);
    let call_state = orientation(&called[0], &called[1]);
    let agree = read_state != Orientation::Neither && read_state == call_state;
    match (
        sets.hetpos_set.contains(&e.pos),
        sets.hompos_set.contains(&e.pos),
        agree,
    ) {
        (true, _, true) => MismatchClass::Heterozygous,
        (true, _, false) => MismatchClass::DeNovo,
        (false, true, true) => MismatchClass::Homozygous,
        (false, true, false) => MismatchClass::DeNovo,
        (false, false, _) => MismatchClass::Unresolved,
    }
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
// PER-READ CLASSIFICATION
// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

/// The mismatches of one read, by category, each list in the order of the read's
/// events.  `mismatch_list` merges the de novo and the indel categories (phased
/// heterozygous and homozygous SNVs are left out) in natural order, and
/// `mismatch_positions` gives their positions in the same order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Classification {
    pub hetsnp: Vec<Mismatch>,
    pub homsnp: Vec<Mismatch>,
    pub hetindel: Vec<Mismatch>,
    pub homindel: Vec<Mismatch>,
    pub denovo_sbs: Vec<Mismatch>,
    pub denovo_indel: Vec<Mismatch>,
    pub unresolved_indel: Vec<Mismatch>,
    pub dropped_snv: usize,
    pub mismatch_list: Vec<Mismatch>,
    pub mismatch_positions: Vec<u64>,
}

impl Classification {
    pub fn snv_count(&self) -> usize {
        self.hetsnp.len() + self.homsnp.len() + self.denovo_sbs.len() + self.dropped_snv
    }

    pub fn indel_count(&self) -> usize {
        self.hetindel.len()
            + self.homindel.len()
            + self.denovo_indel.len()
            + self.unresolved_indel.len()
    }
}

// Order mismatches by position, then alleles in natural order, then confidence.

pub fn mismatch_cmp(a: &Mismatch, b: &Mismatch) -> Ordering {
    a.pos
        .cmp(&b.pos)
        .then_with(|| natural_cmp(&a.ref_allele, &b.ref_allele))
        .then_with(|| natural_cmp(&a.alt_allele, &b.alt_allele))
        .then_with(|| a.confidence.total_cmp(&b.confidence))
}

pub fn classify(read: &AlignedRead, sets: &VariantSets) -> Classification {
    let mut c = Classification::default();
    for e in read.substitution_events.iter() {
        let m = Mismatch::from_event(e, snv_confidence(e.bq));
        match snv_class(e, sets) {
            MismatchClass::Homozygous => c.homsnp.push(m),
            MismatchClass::HeterozygousPhased => c.hetsnp.push(m),
            MismatchClass::DeNovo => c.denovo_sbs.push(m),
            MismatchClass::Dropped | MismatchClass::Heterozygous | MismatchClass::Unresolved => {
                c.dropped_snv += 1
            }
        }
    }
    for e in read.indel_events.iter() {
        let m = Mismatch::from_event(e, indel_confidence(e.bq, e.alt_allele.len()));
        match indel_class(e, sets) {
            MismatchClass::Heterozygous => c.hetindel.push(m),
            MismatchClass::Homozygous => c.homindel.push(m),
            MismatchClass::DeNovo => c.denovo_indel.push(m),
            MismatchClass::Unresolved
            | MismatchClass::Dropped
            | MismatchClass::HeterozygousPhased => {
                debug!(
                    "{}: indel {}:{}>{} sits on a call that is neither het nor hom",
                    read.qname, e.pos, e.ref_allele, e.alt_allele
                );
                c.unresolved_indel.push(m)
            }
        }
    }
    let mut merged = Vec::<Mismatch>::with_capacity(
        c.denovo_sbs.len() + c.denovo_indel.len() + c.hetindel.len() + c.homindel.len(),
    );
    merged.extend(c.denovo_sbs.iter().cloned());
    merged.extend(c.denovo_indel.iter().cloned());
    merged.extend(c.hetindel.iter().cloned());
    merged.extend(c.homindel.iter().cloned());
    merged.sort_by(mismatch_cmp);
    c.mismatch_positions = merged.iter().map(|m| m.pos).collect();
    c.mismatch_list = merged;
    c
}

/// A read together with its classified mismatches.
#[derive(Clone, Debug)]
pub struct ClassifiedRead {
    pub read: AlignedRead,
    pub mismatches: Classification,
}

impl ClassifiedRead {
    pub fn new(read: AlignedRead, sets: &VariantSets) -> ClassifiedRead {
        let mismatches = classify(&read, sets);
        ClassifiedRead { read, mismatches }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(subs: Vec<MismatchEvent>, indels: Vec<MismatchEvent>) -> AlignedRead {
        AlignedRead {
            tname: "chr20".to_string(),
            tstart: 0,
            tend: 20000,
            qname: "m84011_220902_175841_s1/1234/ccs".to_string(),
            qstart: 0,
            qend: 20000,
            qseq: Vec::new(),
            quals: Vec::new(),
            mapq: 60,
            cs_tag: ".".to_string(),
            is_primary: true,
            substitution_events: subs,
            indel_events: indels,
        }
    }

    fn ev(pos: u64, r: &str, a: &str, bq: u32) -> MismatchEvent {
        MismatchEvent::new(pos, r, a, bq)
    }

    fn m(pos: u64, r: &str, a: &str, confidence: f64) -> Mismatch {
        Mismatch {
            pos,
            ref_allele: r.to_string(),
            alt_allele: a.to_string(),
            confidence,
        }
    }

    #[test]
    fn test_hom_snv_end_to_end() {
        let mut sets = VariantSets::new();
        sets.add_hom(1000, "A", "G");
        let c = classify(&read(vec![ev(1000, "A", "G", 60)], vec![]), &sets);
        assert_eq!(c.homsnp, vec![m(1000, "A", "G", 60.0 / 93.0)]);
        assert!(c.hetsnp.is_empty());
        assert!(c.denovo_sbs.is_empty());
        // hom SNVs are not part of the merged list
        assert!(c.mismatch_list.is_empty());
        assert!(c.mismatch_positions.is_empty());
    }

    #[test]
    fn test_snv_priority() {
        let mut sets = VariantSets::new();
        // in every set: hom wins
        sets.add_hom(10, "C", "T");
        sets.add_het(10, "C", "T");
        sets.add_phased_hetsnp(10, "C", "T");
        // het and phased: dropped, since het is checked first
        sets.add_het(20, "G", "A");
        sets.add_phased_hetsnp(20, "G", "A");
        // phased only
        sets.add_phased_hetsnp(30, "T", "C");

        assert_eq!(snv_class(&ev(10, "C", "T", 30), &sets), MismatchClass::Homozygous);
        assert_eq!(snv_class(&ev(20, "G", "A", 30), &sets), MismatchClass::Dropped);
        assert_eq!(snv_class(&ev(30, "T", "C", 30), &sets), MismatchClass::HeterozygousPhased);
        // same position, different allele
        assert_eq!(snv_class(&ev(30, "T", "G", 30), &sets), MismatchClass::DeNovo);
        assert_eq!(snv_class(&ev(40, "A", "C", 30), &sets), MismatchClass::DeNovo);
    }

    #[test]
    fn test_snv_partition() {
        let mut sets = VariantSets::new();
        sets.add_hom(1, "A", "C");
        sets.add_het(2, "A", "C");
        sets.add_het(3, "A", "C");
        sets.add_phased_hetsnp(4, "A", "C");
        let subs: Vec<MismatchEvent> = (1..=6).map(|p| ev(p, "A", "C", 93)).collect();
        let c = classify(&read(subs.clone(), vec![]), &sets);
        assert_eq!(c.homsnp.len(), 1);
        assert_eq!(c.dropped_snv, 2);
        assert_eq!(c.hetsnp, vec![m(4, "A", "C", 1.0)]);
        assert_eq!(c.denovo_sbs.len(), 2);
        assert_eq!(c.snv_count(), subs.len());
        // nothing dropped shows up anywhere
        for cat in &[&c.homsnp, &c.hetsnp, &c.denovo_sbs, &c.mismatch_list] {
            assert!(cat.iter().all(|x| x.pos != 2 && x.pos != 3));
        }
    }

    #[test]
    fn test_indel_exact_match() {
        let mut sets = VariantSets::new();
        sets.add_hom(500, "AT", "A");
        // position also carries a het call with different allele text
        sets.hetpos_set.insert(500);
        sets.add_het(600, "G", "GCC");

        assert_eq!(indel_class(&ev(500, "AT", "A", 40), &sets), MismatchClass::Homozygous);
        assert_eq!(indel_class(&ev(600, "G", "GCC", 40), &sets), MismatchClass::Heterozygous);

        let c = classify(&read(vec![], vec![ev(500, "AT", "A", 40)]), &sets);
        assert_eq!(c.homindel, vec![m(500, "AT", "A", 40.0 / 93.0)]);
        assert!(c.hetindel.is_empty());
        assert!(c.denovo_indel.is_empty());
    }

    #[test]
    fn test_indel_orientation() {
        let mut sets = VariantSets::new();
        // het insertion called at 700, hom deletion called at 800
        sets.add_het(700, "C", "CAAA");
        sets.add_hom(800, "GTT", "G");

        // read shows a different insertion at 700: same orientation
        assert_eq!(indel_class(&ev(700, "C", "CAA", 50), &sets), MismatchClass::Heterozygous);
        // read shows a deletion where an insertion was called
        assert_eq!(indel_class(&ev(700, "CA", "C", 50), &sets), MismatchClass::DeNovo);
        // different deletion at 800
        assert_eq!(indel_class(&ev(800, "GT", "G", 50), &sets), MismatchClass::Homozygous);
        assert_eq!(indel_class(&ev(800, "G", "GT", 50), &sets), MismatchClass::DeNovo);
        // no call at the position
        assert_eq!(indel_class(&ev(900, "G", "GT", 50), &sets), MismatchClass::DeNovo);
    }

    #[test]
    fn test_deletion_against_called_insertion_is_denovo() {
        let mut sets = VariantSets::new();
        sets.hetpos_set.insert(1234);
        sets.pos2allele
            .insert(1234, ["A".to_string(), "AGG".to_string()]);
        let c = classify(&read(vec![], vec![ev(1234, "AC", "A", 30)]), &sets);
        assert!(c.hetindel.is_empty());
        assert_eq!(c.denovo_indel, vec![m(1234, "AC", "A", 30.0 / 93.0)]);
    }

    #[test]
    fn test_indel_on_called_snv_position() {
        // the call at 77 has equal allele lengths, so no read indel agrees with it
        let mut sets = VariantSets::new();
        sets.hetpos_set.insert(77);
        sets.pos2allele.insert(77, ["A".to_string(), "G".to_string()]);
        assert_eq!(indel_class(&ev(77, "A", "AT", 20), &sets), MismatchClass::DeNovo);
        assert_eq!(indel_class(&ev(77, "AT", "A", 20), &sets), MismatchClass::DeNovo);

        let mut sets = VariantSets::new();
        sets.pos2allele.insert(77, ["A".to_string(), "G".to_string()]);
        assert_eq!(indel_class(&ev(77, "A", "AT", 20), &sets), MismatchClass::Unresolved);
    }

    #[test]
    fn test_event_orientation() {
        assert_eq!(Orientation::of_event(&ev(1, "AT", "A", 0)), Orientation::Deletion);
        assert_eq!(Orientation::of_event(&ev(1, "A", "AT", 0)), Orientation::Insertion);
        assert_eq!(Orientation::of_event(&ev(1, "A", "G", 0)), Orientation::Neither);
        assert_eq!(orientation("A", "G"), Orientation::Neither);
    }

    #[test]
    fn test_unresolved_indel() {
        let mut sets = VariantSets::new();
        // allele recorded but position in neither set
        sets.pos2allele.insert(42, ["T".to_string(), "TA".to_string()]);
        assert_eq!(indel_class(&ev(42, "T", "TAA", 10), &sets), MismatchClass::Unresolved);

        let c = classify(&read(vec![], vec![ev(42, "T", "TAA", 10)]), &sets);
        assert_eq!(c.unresolved_indel.len(), 1);
        assert!(c.mismatch_list.is_empty());
        assert_eq!(c.indel_count(), 1);
    }

    #[test]
    fn test_indel_confidence_length_normalized() {
        // insertion alt of length 3 with summed quality 90
        let c = classify(&read(vec![], vec![ev(10, "A", "ACG", 90)]), &VariantSets::new());
        assert_eq!(c.denovo_indel, vec![m(10, "A", "ACG", 90.0 / (93.0 * 3.0))]);
        assert_eq!(indel_confidence(93, 1), 1.0);
        assert_eq!(indel_confidence(93, 0), 1.0);
        assert_eq!(snv_confidence(93), 1.0);
    }

    #[test]
    fn test_mismatch_list_natural_order() {
        let mut sets = VariantSets::new();
        sets.add_het(10, "A", "AT");
        sets.add_hom(9, "CG", "C");
        let subs = vec![ev(100, "A", "C", 20), ev(9, "G", "T", 20)];
        let indels = vec![ev(10, "A", "AT", 20), ev(9, "CG", "C", 20), ev(100, "A", "AGG", 20)];
        let c = classify(&read(subs, indels), &sets);
        assert_eq!(c.mismatch_positions, vec![9, 9, 10, 100, 100]);
        let alleles: Vec<(&str, &str)> = c
            .mismatch_list
            .iter()
            .map(|x| (x.ref_allele.as_str(), x.alt_allele.as_str()))
            .collect();
        assert_eq!(
            alleles,
            vec![("CG", "C"), ("G", "T"), ("A", "AT"), ("A", "AGG"), ("A", "C")]
        );
    }

    #[test]
    fn test_classification_serializes() {
        let c = classify(&read(vec![ev(5, "A", "T", 0)], vec![]), &VariantSets::new());
        let j = serde_json::to_value(&c).unwrap();
        assert_eq!(j["mismatch_positions"], serde_json::json!([5]));
        assert_eq!(j["denovo_sbs"][0]["alt_allele"], "T");
    }

    #[test]
    fn test_classified_read() {
        let r = ClassifiedRead::new(read(vec![ev(5, "A", "T", 0)], vec![]), &VariantSets::new());
        assert_eq!(r.mismatches.denovo_sbs.len(), 1);
        assert_eq!(r.read.substitution_events.len(), 1);
    }
}
