//! Cross-session aggregation.
//!
//! A batch of [`BatchEntry`] values is folded into an [`AggregateState`]
//! one entry at a time and finished into a [`CrossSessionAnalysis`].

pub mod overview;
pub mod state;
pub mod stats;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use tide_core::{AnalysisConfig, FactorGroup, SessionRecord};

use crate::pipeline::SessionAnalysis;

pub use overview::{BatchOverview, DateRange};
pub use state::AggregateState;
pub use stats::{
    ConfidenceInterval, ModelStats, ProcessingBalance, SignificanceTest, StatisticalTests,
};

/// Reported when no session contributed a pattern transition.
pub const NO_CLEAR_PATTERN: &str = "No clear pattern";

/// One analyzed session as stored in a batch file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub model: String,
    /// Per-model run counter.
    #[serde(alias = "session")]
    pub session_index: usize,
    pub timestamp: String,
    pub data: SessionRecord,
    pub analysis: SessionAnalysis,
}

/// Population-level statistics over a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossSessionAnalysis {
    pub total_sessions: usize,
    pub models_tested: Vec<String>,
    pub avg_pattern_coherence: f64,
    pub dimensional_shift_magnitude: f64,
    /// Most frequent pattern transition over the batch.
    pub pattern_evolution: String,
    pub model_comparisons: IndexMap<String, ModelStats>,
    pub confidence_intervals: IndexMap<String, ConfidenceInterval>,
    pub model_rankings: Vec<String>,
    pub dominant_mode: FactorGroup,
    pub ie_balance: ProcessingBalance,
    #[serde(default)]
    pub statistical_tests: StatisticalTests,
    pub overview: BatchOverview,
}

#[derive(Debug, Clone, Default)]
pub struct CrossSessionAggregator {
    config: AnalysisConfig,
}

impl CrossSessionAggregator {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Fold `entries` into a partial state in batch order.
    pub fn fold(&self, entries: &[BatchEntry]) -> AggregateState {
        entries
            .iter()
            .map(|e| AggregateState::from_entry(e, &self.config))
            .fold(AggregateState::default(), AggregateState::merge)
    }

    pub fn aggregate(&self, entries: &[BatchEntry]) -> CrossSessionAnalysis {
        let state = self.fold(entries);
        debug!(sessions = state.total_sessions(), "aggregate state folded");
        let analysis = state.finish(&self.config);

        info!(
            sessions = analysis.total_sessions,
            models = analysis.models_tested.len(),
            avg_coherence = analysis.avg_pattern_coherence,
            dominant_mode = %analysis.dominant_mode,
            balance = %analysis.ie_balance,
            anova = analysis.statistical_tests.anova.is_some(),
            "cross-session analysis complete"
        );
        analysis
    }

    pub fn average_coherence(&self, entries: &[BatchEntry]) -> f64 {
        self.fold(entries).average_coherence()
    }

    pub fn average_shift_magnitude(&self, entries: &[BatchEntry]) -> f64 {
        self.fold(entries).average_shift_magnitude()
    }

    pub fn dominant_pattern_transition(&self, entries: &[BatchEntry]) -> String {
        self.fold(entries).dominant_pattern_transition()
    }

    pub fn per_model_stats(&self, entries: &[BatchEntry]) -> IndexMap<String, ModelStats> {
        self.fold(entries).per_model_stats()
    }

    pub fn dominant_processing_mode(&self, entries: &[BatchEntry]) -> FactorGroup {
        self.fold(entries).dominant_processing_mode()
    }

    pub fn internal_external_balance(&self, entries: &[BatchEntry]) -> ProcessingBalance {
        self.fold(entries).internal_external_balance(&self.config)
    }

    pub fn significance_test(&self, entries: &[BatchEntry]) -> Option<SignificanceTest> {
        self.fold(entries).significance_test(&self.config)
    }
}
