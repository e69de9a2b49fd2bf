//! Report output: per-contig rows on stdout and per-stage diagnostics on stderr.

use std::io::{self, Write};

use serde::Serialize;

use crate::core::types::{Classification, Stage, StageEstimate};
use crate::estimation::estimator::{EstimationOutcome, RunState};

/// One output row per reported contig
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContigRow<'a> {
    pub name: &'a str,
    pub length: u64,
    pub effective_length: i64,
    pub read_count: u64,
    pub copy_number: Option<f64>,
    pub a_stat: Option<f64>,
    pub classification: Option<Classification>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    state: &'a RunState,
    stages: &'a [StageEstimate],
    contigs: &'a [ContigRow<'a>],
}

/// Rows for every contig of at least `min_length` bases, longest first
#[must_use]
pub fn rows(outcome: &EstimationOutcome, min_length: u64) -> Vec<ContigRow<'_>> {
    let contigs = outcome.catalog.contigs();
    let arrival_rate = outcome.state.arrival_rate;

    outcome
        .catalog
        .by_length()
        .into_iter()
        .map(|i| &contigs[i])
        .filter(|c| c.length >= min_length)
        .map(|c| ContigRow {
            name: &c.name,
            length: c.length,
            effective_length: c.effective_length,
            read_count: c.read_count,
            copy_number: c.copy_number(arrival_rate),
            a_stat: c.a_stat,
            classification: c.classification,
        })
        .collect()
}

fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "NA".to_string(), |v| format!("{v:.6}"))
}

/// Write rows as `name, length, effective length, reads, copy number, a-stat`
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_tsv<W: Write>(out: &mut W, rows: &[ContigRow<'_>]) -> io::Result<()> {
    for row in rows {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}",
            row.name,
            row.length,
            row.effective_length,
            row.read_count,
            format_optional(row.copy_number),
            format_optional(row.a_stat),
        )?;
    }
    Ok(())
}

/// Write the final state, stage diagnostics and rows as one JSON document
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write>(
    out: &mut W,
    outcome: &EstimationOutcome,
    rows: &[ContigRow<'_>],
) -> anyhow::Result<()> {
    let report = JsonReport {
        state: &outcome.state,
        stages: &outcome.stages,
        contigs: rows,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

/// Arrival rate and genome size estimate of one stage, one per line
#[must_use]
pub fn format_stage(estimate: &StageEstimate) -> String {
    let label = match estimate.stage {
        Stage::Initial => "Initial".to_string(),
        Stage::Iteration(i) => format!("Iteration {i}"),
    };
    format!(
        "{label} arrival rate: {}\n{label} genome size estimate: {}\n",
        estimate.arrival_rate, estimate.genome_size_estimate
    )
}
