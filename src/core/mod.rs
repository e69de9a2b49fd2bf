//! Core data types for contig classification.
//!
//! - [`ContigRecord`](contig::ContigRecord): name, length, effective length and read count
//!   of one contig, plus its last a-statistic and classification
//! - [`ContigCatalog`](catalog::ContigCatalog): all records of one run, built by a single
//!   pass over an alignment source
//! - [`Classification`](types::Classification), [`Stage`](types::Stage),
//!   [`StageEstimate`](types::StageEstimate): result and diagnostic types
//!
//! ## Effective length
//!
//! A contig of length `L` can only produce reads of the average length `R` from
//! `L - R + 1` start positions. Contigs shorter than `R - 1` get a non-positive
//! effective length; it is kept as-is and flows into every sum and statistic.

pub mod catalog;
pub mod contig;
pub mod types;
