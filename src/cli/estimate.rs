use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;

use crate::cli::report;
use crate::cli::OutputFormat;
use crate::core::catalog::ContigCatalog;
use crate::estimation::astat::DEFAULT_SINGLE_COPY_THRESHOLD;
use crate::estimation::estimator::{
    ArrivalRateEstimator, EstimatorConfig, DEFAULT_BOOTSTRAP_CONTIGS, DEFAULT_ITERATIONS,
};
use crate::parsing::alignment::{AlignmentFile, AlignmentFormat};

#[derive(Args)]
pub struct EstimateArgs {
    /// Input alignment file (SAM or BAM)
    /// Use '-' for stdin (SAM unless --input-format bam)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Input format (detected from the file extension by default)
    #[arg(long, value_enum)]
    pub input_format: Option<AlignmentFormat>,

    /// Only report contigs of at least this many bases; shorter contigs are
    /// also left out of the refined arrival rate
    #[arg(short = 'm', long, default_value = "0")]
    pub min_length: u64,

    /// Number of longest contigs used for the initial arrival rate
    #[arg(short = 'b', long, default_value_t = DEFAULT_BOOTSTRAP_CONTIGS)]
    pub bootstrap_contigs: usize,

    /// Number of refinement iterations
    #[arg(short = 'n', long, default_value_t = DEFAULT_ITERATIONS)]
    pub iterations: usize,

    /// a-statistic above which a contig is called unique
    #[arg(short = 't', long, default_value_t = DEFAULT_SINGLE_COPY_THRESHOLD)]
    pub threshold: f64,
}

impl EstimateArgs {
    #[must_use]
    pub fn config(&self) -> EstimatorConfig {
        EstimatorConfig {
            bootstrap_contigs: self.bootstrap_contigs,
            iterations: self.iterations,
            min_length: self.min_length,
            single_copy_threshold: self.threshold,
        }
    }
}

/// Execute the a-statistic estimation
///
/// # Errors
///
/// Returns an error if the input cannot be read, holds no usable alignments,
/// or the arrival rate cannot be estimated.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: EstimateArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    eprintln!("Reading alignments from {}", args.input.display());

    let mut source = AlignmentFile::open(&args.input, args.input_format)?;
    let catalog = ContigCatalog::ingest(&mut source)?;

    if verbose {
        eprintln!(
            "Counted {} reads on {} contigs (average read length {})",
            catalog.total_reads(),
            catalog.contigs().len(),
            catalog.avg_read_len(),
        );
    }

    let estimator = ArrivalRateEstimator::new(args.config());
    let outcome = estimator.run_with(catalog, |estimate| {
        eprint!("{}", report::format_stage(estimate));
    })?;

    if args.iterations == 0 && verbose {
        eprintln!("No refinement iterations run; contigs are unclassified");
    }

    let rows = report::rows(&outcome, args.min_length);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match format {
        OutputFormat::Tsv => report::write_tsv(&mut out, &rows)?,
        OutputFormat::Json => report::write_json(&mut out, &outcome, &rows)?,
    }

    out.flush()?;
    Ok(())
}
