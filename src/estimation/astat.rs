use std::f64::consts::LN_2;

use crate::core::contig::{count_to_f64, length_to_f64};
use crate::core::types::Classification;

/// Myers' default single-copy threshold
pub const DEFAULT_SINGLE_COPY_THRESHOLD: f64 = 17.0;

/// Myers' a-statistic: log-odds that a contig is single-copy rather than two-copy.
///
/// `arrival_rate * effective_length - read_count * ln(2)`
#[must_use]
pub fn a_statistic(arrival_rate: f64, effective_length: i64, read_count: u64) -> f64 {
    arrival_rate * length_to_f64(effective_length) - count_to_f64(read_count) * LN_2
}

/// Maps an a-statistic onto a unique/repeat call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classifier {
    threshold: f64,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_SINGLE_COPY_THRESHOLD)
    }
}

impl Classifier {
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Unique only when strictly above the threshold
    #[must_use]
    pub fn classify(&self, a_stat: f64) -> Classification {
        if a_stat > self.threshold {
            Classification::Unique
        } else {
            Classification::Repeat
        }
    }
}
