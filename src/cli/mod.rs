//! Command-line interface for astat.
//!
//! A single command: count alignments per contig, estimate the read arrival
//! rate, and print one row per contig.
//!
//! ## Usage
//!
//! ```text
//! # Classify contigs from a BAM of reads aligned to the assembly
//! astat contigs.bam > contigs.astat.tsv
//!
//! # Only report contigs of at least 500 bp, bootstrap from the 50 longest
//! astat -m 500 -b 50 contigs.bam
//!
//! # Stream SAM from another tool
//! samtools view -h contigs.bam | astat -
//!
//! # JSON output for scripting
//! astat contigs.bam --format json
//! ```
//!
//! Per-stage arrival rates and genome size estimates go to stderr; the report
//! goes to stdout.

use clap::Parser;

pub mod estimate;
pub mod report;

#[derive(Parser)]
#[command(name = "astat")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Classify assembly contigs as unique or repetitive with Myers' a-statistic")]
#[command(
    long_about = "astat computes Myers' a-statistic for every contig in an assembly from the reads aligned to it.\n\nThe read arrival rate is first estimated from the longest contigs, then refined from the contigs classified as unique. Contigs with an a-statistic above the single-copy threshold are unique; the rest are likely collapsed repeats."
)]
pub struct Cli {
    #[command(flatten)]
    pub args: estimate::EstimateArgs,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, default_value = "tsv")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Tsv,
    Json,
}
