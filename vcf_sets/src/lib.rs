// Copyright (c) 2019 10x Genomics, Inc. All rights reserved.

// Load the variant calls of one sample from an indexed VCF or BCF file into the
// lookups used to classify read mismatches.
//
// Only the first sample column is read.  For each ALT allele of a record:
// - if every allele of the genotype is this ALT, the call is homozygous;
// - if the ALT is on one haplotype only, the call is heterozygous.  Phased
//   heterozygous SNVs are kept apart from the other heterozygous calls, since
//   they are the only ones whose haplotype is known.
// Records that do not pass filters, symbolic alleles and missing genotypes are
// ignored.

use hapsmash_types::{HapsmashError, HapsmashResult, VariantSets};
use log::debug;
use rust_htslib::bcf::record::GenotypeAllele;
use rust_htslib::bcf::{self, Read};
use std::collections::HashSet;
use std::path::Path;
use string_utils::natural_sort;

fn vcf_err<E: std::fmt::Display>(what: &str, e: E) -> HapsmashError {
    HapsmashError::Vcf(format!("{}: {}", what, e))
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
// GENOTYPES
// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

#[derive(Clone, Debug, PartialEq, Eq)]
struct Call {
    alleles: Vec<usize>,
    phased: bool,
}

impl Call {
    // None if the genotype is empty or any allele is missing.  htslib stores the
    // phase of "a|b" on the second allele, so the first one is not looked at.

    fn from_genotype(gt: &[GenotypeAllele]) -> Option<Call> {
        let mut alleles = Vec::<usize>::with_capacity(gt.len());
        for a in gt {
            match *a {
                GenotypeAllele::Unphased(i) | GenotypeAllele::Phased(i) if i >= 0 => {
                    alleles.push(i as usize)
                }
                _ => return None,
            }
        }
        if alleles.is_empty() {
            return None;
        }
        let phased = gt
            .iter()
            .skip(1)
            .any(|a| matches!(a, GenotypeAllele::Phased(_)));
        Some(Call { alleles, phased })
    }
}

fn is_symbolic(alt: &str) -> bool {
    alt.starts_with('<') || alt == "*" || alt == "." || alt.contains('[') || alt.contains(']')
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
// RECORDS
// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

// Bucket the call of one site.  alleles[0] is REF.

fn add_call(
    sets: &mut VariantSets,
    locus: &str,
    pos: u64,
    alleles: &[String],
    call: &Call,
) -> HapsmashResult<()> {
    let bad = |reason: String| HapsmashError::MalformedVcf {
        locus: locus.to_string(),
        reason,
    };
    if alleles.is_empty() {
        return Err(bad("no REF allele".to_string()));
    }
    if let Some(&a) = call.alleles.iter().find(|&&a| a >= alleles.len()) {
        return Err(bad(format!(
            "genotype allele {} but only {} ALT alleles",
            a,
            alleles.len() - 1
        )));
    }
    let ref_allele = &alleles[0];
    for (k, alt) in alleles.iter().enumerate().skip(1) {
        if is_symbolic(alt) {
            continue;
        }
        let copies = call.alleles.iter().filter(|&&a| a == k).count();
        if copies == 0 {
            continue;
        }
        if copies == call.alleles.len() {
            sets.add_hom(pos, ref_allele, alt);
        } else if call.phased && ref_allele.len() == 1 && alt.len() == 1 {
            sets.add_phased_hetsnp(pos, ref_allele, alt);
        } else {
            sets.add_het(pos, ref_allele, alt);
        }
    }
    Ok(())
}

// A record passes if it has no FILTER value or only PASS.

fn passes(rec: &bcf::Record) -> bool {
    let header = rec.header();
    rec.filters().all(|id| header.id_to_name(id) == b"PASS")
}

fn add_record(sets: &mut VariantSets, contig: &str, rec: &bcf::Record) -> HapsmashResult<()> {
    if !passes(rec) {
        return Ok(());
    }
    let pos = rec.pos() as u64 + 1;
    let locus = format!("{}:{}", contig, pos);
    let genotypes = match rec.genotypes() {
        Ok(g) => g,
        Err(_) => return Ok(()),
    };
    let call = match Call::from_genotype(&genotypes.get(0)) {
        Some(call) => call,
        None => return Ok(()),
    };
    let alleles: Vec<String> = rec
        .alleles()
        .iter()
        .map(|a| String::from_utf8_lossy(a).to_ascii_uppercase())
        .collect();
    add_call(sets, &locus, pos, &alleles, &call)
}

/// Read the calls on `contig` with `start <= POS < end` (VCF coordinates, i.e.
/// 1-based).  The file must be bgzipped VCF or BCF with a .tbi or .csi index.
/// A contig absent from the header has no calls.
pub fn load_variant_sets<P: AsRef<Path>>(
    path: P,
    contig: &str,
    start: u64,
    end: u64,
) -> HapsmashResult<VariantSets> {
    let path = path.as_ref();
    let mut sets = VariantSets::new();
    let mut reader = bcf::IndexedReader::from_path(path)
        .map_err(|e| vcf_err(&format!("failed to open {}", path.display()), e))?;
    if reader.header().sample_count() == 0 {
        return Err(HapsmashError::Vcf(format!(
            "{} has no sample column",
            path.display()
        )));
    }
    let rid = match reader.header().name2rid(contig.as_bytes()) {
        Ok(rid) => rid,
        Err(_) => {
            debug!("{}: {} not in header", path.display(), contig);
            return Ok(sets);
        }
    };
    let start = start.max(1);
    if end <= start {
        return Ok(sets);
    }
    reader
        .fetch(rid, start - 1, Some(end - 2))
        .map_err(|e| vcf_err(&format!("failed to fetch {}:{}-{}", contig, start, end), e))?;
    for rec in reader.records() {
        let rec = rec.map_err(|e| vcf_err(&format!("failed to read {}", contig), e))?;
        // fetch also returns records that start before the window and overlap it
        let pos = rec.pos() as u64 + 1;
        if pos < start || pos >= end {
            continue;
        }
        add_record(&mut sets, contig, &rec)?;
    }
    debug!(
        "{}:{}-{}: {} het, {} hom, {} phased het SNVs, {} indel positions",
        contig,
        start,
        end,
        sets.het_set.len(),
        sets.hom_set.len(),
        sets.phased_hetsnp_set.len(),
        sets.pos2allele.len()
    );
    Ok(sets)
}

// Contigs having at least one record, in natural order.

pub fn vcf_contigs<P: AsRef<Path>>(path: P) -> HapsmashResult<Vec<String>> {
    let path = path.as_ref();
    let mut reader = bcf::Reader::from_path(path)
        .map_err(|e| vcf_err(&format!("failed to open {}", path.display()), e))?;
    let mut rids = HashSet::<u32>::new();
    for rec in reader.records() {
        let rec = rec.map_err(|e| vcf_err(&format!("failed to read {}", path.display()), e))?;
        if let Some(rid) = rec.rid() {
            rids.insert(rid);
        }
    }
    let header = reader.header();
    let mut contigs = Vec::<String>::with_capacity(rids.len());
    for rid in rids {
        let name = header
            .rid2name(rid)
            .map_err(|e| vcf_err(&format!("bad contig id {}", rid), e))?;
        contigs.push(String::from_utf8_lossy(name).into_owned());
    }
    natural_sort(&mut contigs);
    Ok(contigs)
}
