// Copyright (c) 2021 10x Genomics, Inc. All rights reserved.

/// Everything that can go wrong between opening the inputs and producing
/// thresholds or classified reads.
#[derive(Debug, thiserror::Error)]
pub enum HapsmashError {
    /// Required inputs or metadata are missing.  Not recoverable; the run should stop.
    #[error("{0}")]
    Configuration(String),

    /// No read in any sampled window was a primary alignment with mapq > 0, so the
    /// read-length moments are undefined.
    #[error(
        "no primary alignments with mapping quality > 0 were found in {windows} sampled \
         windows across {contigs} contigs"
    )]
    InsufficientSample { contigs: usize, windows: usize },

    #[error("malformed cs tag in read {qname}: {reason}")]
    MalformedCsTag { qname: String, reason: String },

    #[error("malformed VCF record at {locus}: {reason}")]
    MalformedVcf { locus: String, reason: String },

    #[error("variant file error: {0}")]
    Vcf(String),

    #[error("alignment store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type HapsmashResult<T> = Result<T, HapsmashError>;

impl HapsmashError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, HapsmashError::Configuration(_))
    }
}
