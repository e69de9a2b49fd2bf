use crate::core::types::Classification;

/// Helper function to convert a signed length to f64 with explicit precision loss allowance
#[inline]
pub(crate) fn length_to_f64(length: i64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        length as f64
    }
}

/// Helper function to convert a read count to f64 with explicit precision loss allowance
#[inline]
pub(crate) fn count_to_f64(count: u64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Per-contig counts and the classification derived from them
#[derive(Debug, Clone, PartialEq)]
pub struct ContigRecord {
    /// Reference sequence name
    pub name: String,

    /// Contig length in bases
    pub length: u64,

    /// Number of read start positions: `length - avg_read_len + 1`.
    /// Negative for contigs shorter than the average read.
    pub effective_length: i64,

    /// Number of alignments placed on this contig
    pub read_count: u64,

    /// a-statistic from the last refinement iteration, if any ran
    pub a_stat: Option<f64>,

    /// Classification from the last refinement iteration, if any ran
    pub classification: Option<Classification>,
}

impl ContigRecord {
    pub fn new(name: impl Into<String>, length: u64) -> Self {
        let length_i64 = i64::try_from(length).unwrap_or(i64::MAX);
        Self {
            name: name.into(),
            length,
            effective_length: length_i64,
            read_count: 0,
            a_stat: None,
            classification: None,
        }
    }

    #[cfg(test)]
    pub fn with_read_count(mut self, read_count: u64) -> Self {
        self.read_count = read_count;
        self
    }

    /// Recompute the effective length for the given average read length
    pub fn set_effective_length(&mut self, avg_read_len: u64) {
        let length = i64::try_from(self.length).unwrap_or(i64::MAX);
        let avg = i64::try_from(avg_read_len).unwrap_or(i64::MAX);
        self.effective_length = length.saturating_sub(avg).saturating_add(1);
    }

    /// True if the last refinement classified this contig as single-copy
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.classification.is_some_and(Classification::is_unique)
    }

    /// Estimated copy number: observed reads over reads expected for one copy.
    ///
    /// Returns `None` when the effective length is zero.
    #[must_use]
    pub fn copy_number(&self, arrival_rate: f64) -> Option<f64> {
        if self.effective_length == 0 {
            return None;
        }
        Some(count_to_f64(self.read_count) / (length_to_f64(self.effective_length) * arrival_rate))
    }
}
