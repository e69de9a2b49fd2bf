use serde::{Deserialize, Serialize};

/// Copy-number class assigned to a contig from its a-statistic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// a-statistic above the single-copy threshold
    Unique,
    /// a-statistic at or below the threshold (likely a collapsed repeat)
    Repeat,
}

impl Classification {
    #[must_use]
    pub fn is_unique(self) -> bool {
        matches!(self, Self::Unique)
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unique => write!(f, "unique"),
            Self::Repeat => write!(f, "repeat"),
        }
    }
}

/// Stage of the arrival-rate estimation that produced an estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Bootstrap estimate from the longest contigs
    Initial,
    /// Refinement iteration (0-based)
    Iteration(usize),
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initial => write!(f, "initial"),
            Self::Iteration(i) => write!(f, "iteration {i}"),
        }
    }
}

/// Diagnostic record emitted once per estimation stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageEstimate {
    pub stage: Stage,
    pub arrival_rate: f64,
    pub genome_size_estimate: u64,
    /// Number of contigs the estimate was computed from
    pub contigs_used: usize,
}
