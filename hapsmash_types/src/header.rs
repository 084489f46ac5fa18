// Copyright (c) 2021 10x Genomics, Inc. All rights reserved.

// Sample and contig metadata from the text header of an alignment file.

use crate::error::{HapsmashError, HapsmashResult};
use std::collections::HashMap;
use string_utils::{field_value, natural_sort};

const REHEADER_HINT: &str =
    "samtools reheader in.header.sam in.bam > out.bam can be used to insert a new header";

// Return the SM field of the first @RG line that has one.

pub fn sample_name<S: AsRef<str>>(lines: &[S]) -> HapsmashResult<String> {
    for line in lines {
        let line = line.as_ref();
        if line.starts_with("@RG") {
            if let Some(sm) = field_value(line, "SM") {
                return Ok(sm.to_string());
            }
        }
    }
    Err(HapsmashError::Configuration(format!(
        "SM field is missing.\nPlease provide a BAM file with an @RG group.\n{}",
        REHEADER_HINT
    )))
}

/// Contig names from the @SQ lines, in natural order ("chr2" before "chr10"), and
/// a map from name to length.
pub fn contigs<S: AsRef<str>>(lines: &[S]) -> HapsmashResult<(Vec<String>, HashMap<String, u64>)> {
    let mut lengths = HashMap::<String, u64>::new();
    for line in lines {
        let line = line.as_ref();
        if !line.starts_with("@SQ") {
            continue;
        }
        let bad = |what: &str| {
            HapsmashError::Configuration(format!("@SQ header line {} : {}", what, line))
        };
        let name = field_value(line, "SN").ok_or_else(|| bad("has no SN field"))?;
        let len = field_value(line, "LN")
            .ok_or_else(|| bad("has no LN field"))?
            .parse::<u64>()
            .map_err(|_| bad("has an unparsable LN field"))?;
        lengths.insert(name.to_string(), len);
    }
    if lengths.is_empty() {
        return Err(HapsmashError::Configuration(format!(
            "@SQ header is missing from BAM file.\nPlease use samtools reheader to insert \
             an appropriate header into your BAM file.\n{}",
            REHEADER_HINT
        )));
    }
    let mut names: Vec<String> = lengths.keys().cloned().collect();
    natural_sort(&mut names);
    Ok((names, lengths))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<String> {
        vec![
            "@HD\tVN:1.6\tSO:coordinate".to_string(),
            "@SQ\tSN:chr10\tLN:133797422".to_string(),
            "@SQ\tSN:chr2\tLN:242193529".to_string(),
            "@SQ\tSN:chr1\tLN:248956422\tM5:6aef897c3d6ff0c78aff06ac189178dd".to_string(),
            "@RG\tID:m64011\tPL:PACBIO\tSM:HG002".to_string(),
            "@PG\tID:minimap2\tPN:minimap2\tVN:2.24".to_string(),
        ]
    }

    #[test]
    fn test_sample_name() {
        assert_eq!(sample_name(&header()).unwrap(), "HG002");
        let no_rg: Vec<&str> = vec!["@HD\tVN:1.6", "@SQ\tSN:chr1\tLN:10"];
        let e = sample_name(&no_rg).unwrap_err();
        assert!(e.is_configuration());
        assert!(e.to_string().contains("SM field is missing"));
        let no_sm = vec!["@RG\tID:x\tPL:PACBIO"];
        assert!(sample_name(&no_sm).unwrap_err().is_configuration());
    }

    #[test]
    fn test_contigs() {
        let (names, lengths) = contigs(&header()).unwrap();
        assert_eq!(names, vec!["chr1", "chr2", "chr10"]);
        assert_eq!(lengths["chr1"], 248956422);
        assert_eq!(lengths["chr10"], 133797422);

        let e = contigs(&["@HD\tVN:1.6", "@RG\tID:x\tSM:y"]).unwrap_err();
        assert!(e.is_configuration());
        assert!(e.to_string().contains("@SQ header is missing"));

        assert!(contigs(&["@SQ\tSN:chr1\tLN:abc"]).unwrap_err().is_configuration());
        assert!(contigs(&["@SQ\tSN:chr1"]).unwrap_err().is_configuration());
    }
}
