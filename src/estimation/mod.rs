//! Arrival-rate estimation and unique/repeat classification.
//!
//! - [`a_statistic`](astat::a_statistic): Myers' a-statistic for one contig
//! - [`Classifier`](astat::Classifier): threshold call on the a-statistic
//! - [`ArrivalRateEstimator`](estimator::ArrivalRateEstimator): bootstrap and refinement loop
//!
//! ## Algorithm
//!
//! 1. **Bootstrap**: the longest contigs are assumed single-copy. Their reads
//!    divided by their summed effective length give the initial arrival rate.
//! 2. **Refine**: every contig gets an a-statistic at the current rate and is
//!    called unique when it exceeds the threshold. The rate is re-estimated from
//!    the unique contigs that pass the minimum length.
//! 3. Step 2 repeats a fixed number of times; each iteration's rate depends on
//!    the previous iteration's calls, so iterations run strictly in order.
//!
//! Each stage also reports a genome size estimate: total reads divided by the
//! arrival rate.
//!
//! ## Example
//!
//! ```rust,no_run
//! use astat::{AlignmentFile, ArrivalRateEstimator, ContigCatalog, EstimatorConfig};
//! use std::path::Path;
//!
//! let mut source = AlignmentFile::open(Path::new("contigs.bam"), None).unwrap();
//! let catalog = ContigCatalog::ingest(&mut source).unwrap();
//!
//! let estimator = ArrivalRateEstimator::new(EstimatorConfig::default());
//! let outcome = estimator.run(catalog).unwrap();
//!
//! for contig in outcome.catalog.contigs() {
//!     println!("{}: {:?}", contig.name, contig.classification);
//! }
//! ```

pub mod astat;
pub mod estimator;
