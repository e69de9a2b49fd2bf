//! # astat
//!
//! Classify assembly contigs as single-copy or repetitive using Myers' a-statistic.
//!
//! Reads aligned back to an assembly pile up on collapsed repeats: a contig that
//! represents two genomic copies attracts roughly twice the reads its length
//! predicts. The a-statistic is the log-likelihood ratio of the observed read
//! count under a one-copy versus a two-copy model, given a genome-wide read
//! arrival rate.
//!
//! The arrival rate is itself unknown, so `astat` estimates it iteratively:
//! first from the longest contigs, then repeatedly from the contigs currently
//! classified as unique.
//!
//! ## Modules
//!
//! - [`parsing`]: SAM/BAM alignment input
//! - [`core`]: contig records and the per-run catalog
//! - [`estimation`]: a-statistic, classifier and arrival-rate estimator
//! - [`cli`]: Command-line interface and report output

pub mod cli;
pub mod core;
pub mod estimation;
pub mod parsing;

// Re-export commonly used types for convenience
pub use crate::core::catalog::{CatalogError, ContigCatalog};
pub use crate::core::contig::ContigRecord;
pub use crate::core::types::*;
pub use estimation::astat::{a_statistic, Classifier};
pub use estimation::estimator::{
    ArrivalRateEstimator, EstimationError, EstimationOutcome, EstimatorConfig, RunState,
};
pub use parsing::alignment::{AlignedRead, AlignmentFile, AlignmentSource, ParseError};
