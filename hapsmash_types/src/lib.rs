// Copyright (c) 2021 10x Genomics, Inc. All rights reserved.

// Types shared by the mismatch classifier and the threshold estimator, together with
// the interfaces through which they see alignment data.  Nothing in here knows about
// a particular file format.

pub mod error;
pub mod header;
pub mod read;
pub mod store;
pub mod variants;

pub use error::{HapsmashError, HapsmashResult};
pub use read::{
    AlignedRead, AlignmentDecoder, DecodedEvents, MismatchEvent, RawRecord, MAX_BASE_QUALITY,
    PRIMARY_ALIGNMENT,
};
pub use store::{AlignmentStore, MemoryStore};
pub use variants::{AlleleKey, Mismatch, MismatchClass, VariantSets};
