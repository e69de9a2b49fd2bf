use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::core::catalog::ContigCatalog;
use crate::core::contig::{count_to_f64, length_to_f64, ContigRecord};
use crate::core::types::{Stage, StageEstimate};
use crate::estimation::astat::{a_statistic, Classifier, DEFAULT_SINGLE_COPY_THRESHOLD};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimationError {
    #[error(
        "{stage} estimate: total effective length {effective_length} over {contigs} contigs is not positive"
    )]
    NonPositiveLength {
        stage: Stage,
        effective_length: i64,
        contigs: usize,
    },

    #[error("{stage} estimate: no contig of at least {min_length} bp is classified unique")]
    EmptyUniqueSet { stage: Stage, min_length: u64 },

    #[error("{stage} estimate: no reads on the {contigs} contigs used, arrival rate is zero")]
    ZeroArrivalRate { stage: Stage, contigs: usize },
}

/// Default number of longest contigs used for the bootstrap estimate
pub const DEFAULT_BOOTSTRAP_CONTIGS: usize = 20;

/// Default number of refinement iterations
pub const DEFAULT_ITERATIONS: usize = 3;

/// Configuration for the arrival-rate estimator
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorConfig {
    /// Number of longest contigs used for the initial estimate
    pub bootstrap_contigs: usize,
    /// Number of refinement iterations
    pub iterations: usize,
    /// Contigs shorter than this never contribute to a refined estimate
    pub min_length: u64,
    /// a-statistic above which a contig is called unique
    pub single_copy_threshold: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            bootstrap_contigs: DEFAULT_BOOTSTRAP_CONTIGS,
            iterations: DEFAULT_ITERATIONS,
            min_length: 0,
            single_copy_threshold: DEFAULT_SINGLE_COPY_THRESHOLD,
        }
    }
}

/// Run-wide values threaded from one estimation step to the next
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunState {
    pub total_reads: u64,
    pub avg_read_len: u64,
    pub arrival_rate: f64,
    pub genome_size_estimate: u64,
}

/// Final state of a run together with the classified catalog
#[derive(Debug, Clone)]
pub struct EstimationOutcome {
    /// Catalog holding the a-statistics of the last iteration
    pub catalog: ContigCatalog,
    pub state: RunState,
    /// One record per stage, bootstrap first
    pub stages: Vec<StageEstimate>,
}

/// Iterative estimator of the read arrival rate
pub struct ArrivalRateEstimator {
    config: EstimatorConfig,
    classifier: Classifier,
}

impl ArrivalRateEstimator {
    #[must_use]
    pub fn new(config: EstimatorConfig) -> Self {
        let classifier = Classifier::new(config.single_copy_threshold);
        Self { config, classifier }
    }

    /// Estimate the arrival rate from the longest contigs.
    ///
    /// Uses `min(bootstrap_contigs, M)` contigs ordered by length
    /// descending, ties broken by catalog order.
    ///
    /// # Errors
    ///
    /// Returns `EstimationError::NonPositiveLength` if the selected contigs have
    /// no positive total effective length, or `EstimationError::ZeroArrivalRate`
    /// if they carry no reads.
    pub fn bootstrap(
        &self,
        catalog: &ContigCatalog,
    ) -> Result<(RunState, StageEstimate), EstimationError> {
        let contigs = catalog.contigs();
        let take = self.config.bootstrap_contigs.min(contigs.len());
        let selected = catalog.by_length().into_iter().take(take).map(|i| &contigs[i]);

        let estimate = estimate_stage(Stage::Initial, catalog.total_reads(), selected)?;
        let state = RunState {
            total_reads: catalog.total_reads(),
            avg_read_len: catalog.avg_read_len(),
            arrival_rate: estimate.arrival_rate,
            genome_size_estimate: estimate.genome_size_estimate,
        };

        Ok((state, estimate))
    }

    /// Classify every contig at the current arrival rate, then re-estimate the
    /// rate from the contigs called unique that pass the length filter.
    ///
    /// # Errors
    ///
    /// Returns `EstimationError::EmptyUniqueSet` if no contig qualifies,
    /// otherwise the same errors as [`bootstrap`](Self::bootstrap).
    pub fn refine(
        &self,
        catalog: &mut ContigCatalog,
        state: RunState,
        iteration: usize,
    ) -> Result<(RunState, StageEstimate), EstimationError> {
        let stage = Stage::Iteration(iteration);

        for contig in catalog.contigs_mut() {
            let a_stat = a_statistic(state.arrival_rate, contig.effective_length, contig.read_count);
            contig.a_stat = Some(a_stat);
            contig.classification = Some(self.classifier.classify(a_stat));
        }

        let min_length = self.config.min_length;
        let mut selected = catalog
            .contigs()
            .iter()
            .filter(|c| c.length >= min_length && c.is_unique())
            .peekable();

        if selected.peek().is_none() {
            return Err(EstimationError::EmptyUniqueSet { stage, min_length });
        }

        let estimate = estimate_stage(stage, state.total_reads, selected)?;
        let state = RunState {
            arrival_rate: estimate.arrival_rate,
            genome_size_estimate: estimate.genome_size_estimate,
            ..state
        };

        Ok((state, estimate))
    }

    /// Bootstrap then refine `iterations` times.
    ///
    /// With zero iterations the bootstrap rate is final and no contig is classified.
    ///
    /// # Errors
    ///
    /// Returns the first `EstimationError` raised by any stage.
    pub fn run(&self, catalog: ContigCatalog) -> Result<EstimationOutcome, EstimationError> {
        self.run_with(catalog, |_| {})
    }

    /// Like [`run`](Self::run), calling `on_stage` as soon as each stage completes
    /// so diagnostics of earlier stages survive a failure in a later one.
    ///
    /// # Errors
    ///
    /// Returns the first `EstimationError` raised by any stage.
    pub fn run_with<F>(
        &self,
        mut catalog: ContigCatalog,
        mut on_stage: F,
    ) -> Result<EstimationOutcome, EstimationError>
    where
        F: FnMut(&StageEstimate),
    {
        let (mut state, initial) = self.bootstrap(&catalog)?;
        on_stage(&initial);
        let mut stages = Vec::with_capacity(self.config.iterations + 1);
        stages.push(initial);

        for iteration in 0..self.config.iterations {
            let (next, estimate) = self.refine(&mut catalog, state, iteration)?;
            on_stage(&estimate);
            state = next;
            stages.push(estimate);
        }

        Ok(EstimationOutcome {
            catalog,
            state,
            stages,
        })
    }
}

fn estimate_stage<'a>(
    stage: Stage,
    total_reads: u64,
    contigs: impl Iterator<Item = &'a ContigRecord>,
) -> Result<StageEstimate, EstimationError> {
    let mut effective_length: i64 = 0;
    let mut reads: u64 = 0;
    let mut used: usize = 0;

    for contig in contigs {
        effective_length = effective_length.saturating_add(contig.effective_length);
        reads += contig.read_count;
        used += 1;
    }

    if effective_length <= 0 {
        return Err(EstimationError::NonPositiveLength {
            stage,
            effective_length,
            contigs: used,
        });
    }
    if reads == 0 {
        return Err(EstimationError::ZeroArrivalRate {
            stage,
            contigs: used,
        });
    }

    let arrival_rate = count_to_f64(reads) / length_to_f64(effective_length);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // positive and finite
    let genome_size_estimate = (count_to_f64(total_reads) / arrival_rate).floor() as u64;

    debug!(
        %stage,
        contigs = used,
        reads,
        effective_length,
        arrival_rate,
        genome_size_estimate,
        "Estimated arrival rate"
    );

    Ok(StageEstimate {
        stage,
        arrival_rate,
        genome_size_estimate,
        contigs_used: used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Classification;

    /// Catalog where every read has the same length
    fn catalog(contigs: &[(&str, u64, u64)], read_length: u64) -> ContigCatalog {
        let records: Vec<ContigRecord> = contigs
            .iter()
            .map(|&(name, length, reads)| ContigRecord::new(name, length).with_read_count(reads))
            .collect();
        let total_reads: u64 = contigs.iter().map(|c| c.2).sum();
        ContigCatalog::from_counts(records, total_reads, total_reads * read_length).unwrap()
    }

    fn config(bootstrap_contigs: usize, iterations: usize) -> EstimatorConfig {
        EstimatorConfig {
            bootstrap_contigs,
            iterations,
            ..EstimatorConfig::default()
        }
    }

    /// Two unique contigs at exactly 1/16 reads per position and one 3-copy repeat
    fn stable_catalog() -> ContigCatalog {
        catalog(
            &[("ctgC", 489, 90), ("ctgA", 1609, 100), ("ctgB", 969, 60)],
            10,
        )
    }

    #[test]
    fn test_config_defaults() {
        let config = EstimatorConfig::default();
        assert_eq!(config.bootstrap_contigs, 20);
        assert_eq!(config.iterations, 3);
        assert_eq!(config.min_length, 0);
        assert_eq!(config.single_copy_threshold, 17.0);
    }

    #[test]
    fn test_bootstrap_uses_longest_contigs() {
        let catalog = catalog(&[("a", 1000, 50), ("b", 800, 45), ("c", 50, 2)], 100);
        let effective: Vec<i64> = catalog.contigs().iter().map(|c| c.effective_length).collect();
        assert_eq!(effective, vec![901, 701, -49]);

        let estimator = ArrivalRateEstimator::new(config(2, 3));
        let (state, initial) = estimator.bootstrap(&catalog).unwrap();

        assert_eq!(initial.stage, Stage::Initial);
        assert_eq!(initial.contigs_used, 2);
        assert!((state.arrival_rate - 95.0 / 1602.0).abs() < 1e-12);
        assert_eq!(state.genome_size_estimate, 1635);
        assert_eq!(state.total_reads, 97);
        assert_eq!(state.avg_read_len, 100);
    }

    #[test]
    fn test_bootstrap_sums_negative_effective_length() {
        let catalog = catalog(&[("a", 1000, 50), ("b", 800, 45), ("c", 50, 2)], 100);
        let estimator = ArrivalRateEstimator::new(config(3, 0));
        let (state, initial) = estimator.bootstrap(&catalog).unwrap();

        // 901 + 701 - 49
        assert_eq!(initial.contigs_used, 3);
        assert!((state.arrival_rate - 97.0 / 1553.0).abs() < 1e-12);
    }

    #[test]
    fn test_bootstrap_clamps_to_catalog_size() {
        let catalog = catalog(&[("a", 1000, 50), ("b", 800, 45), ("c", 50, 2)], 100);
        let estimator = ArrivalRateEstimator::new(EstimatorConfig::default());
        let (_, initial) = estimator.bootstrap(&catalog).unwrap();
        assert_eq!(initial.contigs_used, 3);
    }

    #[test]
    fn test_bootstrap_tie_break_by_catalog_order() {
        // "first" and "second" tie on length; only the earlier one is used
        let catalog = catalog(&[("first", 1000, 10), ("second", 1000, 90)], 1);
        let estimator = ArrivalRateEstimator::new(config(1, 0));
        let (state, _) = estimator.bootstrap(&catalog).unwrap();
        assert!((state.arrival_rate - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_bootstrap_non_positive_length() {
        let catalog = catalog(&[("a", 50, 1), ("b", 40, 1)], 100);
        let estimator = ArrivalRateEstimator::new(EstimatorConfig::default());
        let err = estimator.bootstrap(&catalog).unwrap_err();
        assert_eq!(
            err,
            EstimationError::NonPositiveLength {
                stage: Stage::Initial,
                effective_length: -108,
                contigs: 2,
            }
        );
        assert!(err.to_string().starts_with("initial estimate"));
    }

    #[test]
    fn test_bootstrap_zero_reads() {
        let catalog = catalog(&[("a", 1000, 0), ("b", 500, 5)], 1);
        let estimator = ArrivalRateEstimator::new(config(1, 3));
        assert_eq!(
            estimator.bootstrap(&catalog).unwrap_err(),
            EstimationError::ZeroArrivalRate {
                stage: Stage::Initial,
                contigs: 1,
            }
        );
    }

    #[test]
    fn test_zero_iterations_leaves_contigs_unclassified() {
        let estimator = ArrivalRateEstimator::new(config(2, 0));
        let (bootstrap_state, _) = estimator.bootstrap(&stable_catalog()).unwrap();

        let outcome = estimator.run(stable_catalog()).unwrap();
        assert_eq!(outcome.stages.len(), 1);
        assert_eq!(outcome.state, bootstrap_state);
        assert!(outcome
            .catalog
            .contigs()
            .iter()
            .all(|c| c.a_stat.is_none() && c.classification.is_none()));
    }

    #[test]
    fn test_refinement_classifies_contigs() {
        let estimator = ArrivalRateEstimator::new(config(2, 3));
        let outcome = estimator.run(stable_catalog()).unwrap();

        assert_eq!(outcome.stages.len(), 4);
        assert_eq!(outcome.stages[0].stage, Stage::Initial);
        for (i, stage) in outcome.stages.iter().enumerate().skip(1) {
            assert_eq!(stage.stage, Stage::Iteration(i - 1));
            assert_eq!(stage.arrival_rate, 0.0625);
            assert_eq!(stage.genome_size_estimate, 4000);
            assert_eq!(stage.contigs_used, 2);
        }

        let contigs = outcome.catalog.contigs();
        assert_eq!(contigs[0].classification, Some(Classification::Repeat));
        assert_eq!(contigs[1].classification, Some(Classification::Unique));
        assert_eq!(contigs[2].classification, Some(Classification::Unique));

        let a_repeat = contigs[0].a_stat.unwrap();
        assert!((a_repeat - (30.0 - 90.0 * std::f64::consts::LN_2)).abs() < 1e-9);
        assert!((contigs[0].copy_number(outcome.state.arrival_rate).unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_refinement_respects_min_length() {
        let estimator = ArrivalRateEstimator::new(EstimatorConfig {
            min_length: 1000,
            ..config(2, 1)
        });
        let outcome = estimator.run(stable_catalog()).unwrap();
        assert_eq!(outcome.stages[1].contigs_used, 1);

        // Short contigs are still classified, just not used for the estimate
        assert!(outcome.catalog.contigs()[2].is_unique());
    }

    #[test]
    fn test_refinement_fails_when_no_contig_stays_unique() {
        // "x" is unique at the bootstrap rate but drags the rate down until
        // neither contig clears the threshold
        let catalog = catalog(&[("x", 1000, 200), ("y", 900, 10)], 1);
        let estimator = ArrivalRateEstimator::new(config(1, 3));

        let mut reported = Vec::new();
        let err = estimator
            .run_with(catalog, |estimate| reported.push(estimate.clone()))
            .unwrap_err();
        assert_eq!(
            err,
            EstimationError::EmptyUniqueSet {
                stage: Stage::Iteration(2),
                min_length: 0,
            }
        );

        // Stages before the failure were still reported, none with a zero or NaN rate
        let stages: Vec<Stage> = reported.iter().map(|e| e.stage).collect();
        assert_eq!(
            stages,
            vec![Stage::Initial, Stage::Iteration(0), Stage::Iteration(1)]
        );
        assert!(reported
            .iter()
            .all(|e| e.arrival_rate.is_finite() && e.arrival_rate > 0.0));
    }

    #[test]
    fn test_refine_threads_state_explicitly() {
        let mut catalog = stable_catalog();
        let estimator = ArrivalRateEstimator::new(config(3, 1));
        let (state, initial) = estimator.bootstrap(&catalog).unwrap();
        // All three contigs: 250 reads over 3040 positions
        assert!((initial.arrival_rate - 250.0 / 3040.0).abs() < 1e-12);

        let (next, estimate) = estimator.refine(&mut catalog, state, 0).unwrap();
        assert_eq!(estimate.stage, Stage::Iteration(0));
        assert_eq!(next.arrival_rate, 0.0625);
        assert_eq!(next.total_reads, state.total_reads);
        assert_eq!(next.avg_read_len, state.avg_read_len);
    }

    #[test]
    fn test_run_is_deterministic() {
        let estimator = ArrivalRateEstimator::new(config(2, 3));
        let first = estimator.run(stable_catalog()).unwrap();
        let second = estimator.run(stable_catalog()).unwrap();

        assert_eq!(first.stages, second.stages);
        assert_eq!(first.state, second.state);
        assert_eq!(first.catalog.contigs(), second.catalog.contigs());
    }
}
