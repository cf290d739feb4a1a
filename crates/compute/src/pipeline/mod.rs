//! Batch analysis pipeline.
//!
//! Wires per-session analysis and cross-session aggregation together:
//!
//! - **Per session**: shifts, trajectories, pattern evolution, coherence and
//!   representational similarity, run as an independent parallel map.
//! - **Per batch**: the analyzed entries are folded by the
//!   [`CrossSessionAggregator`] once every session is done.

pub mod analyzer;
pub mod coherence;
pub mod metrics;
pub mod patterns;
pub mod shifts;
pub mod trend;

#[cfg(test)]
pub(crate) mod test_support;

use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use tide_core::{AnalysisConfig, SessionRecord};

use crate::aggregate::{BatchEntry, CrossSessionAggregator, CrossSessionAnalysis};

pub use self::analyzer::{SessionAnalysis, SessionAnalyzer};
pub use self::metrics::PipelineMetrics;

/// Output of one full pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
    pub cross_analysis: CrossSessionAnalysis,
}

/// Main pipeline orchestrator.
pub struct Pipeline {
    analyzer: SessionAnalyzer,
    aggregator: CrossSessionAggregator,
    /// Pipeline performance metrics.
    pub metrics: PipelineMetrics,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl Pipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            analyzer: SessionAnalyzer::new(config.clone()),
            aggregator: CrossSessionAggregator::new(config),
            metrics: PipelineMetrics::default(),
        }
    }

    pub fn analyzer(&self) -> &SessionAnalyzer {
        &self.analyzer
    }

    pub fn aggregator(&self) -> &CrossSessionAggregator {
        &self.aggregator
    }

    /// Analyze every session in parallel, preserving input order.
    ///
    /// Structurally invalid sessions are logged and skipped. Each surviving
    /// entry gets a zero-based run index counted per model in input order.
    pub fn analyze_batch(&mut self, sessions: &[SessionRecord]) -> Vec<BatchEntry> {
        let timer = self.metrics.batch_timer();

        let mut per_model: HashMap<&str, usize> = HashMap::new();
        let indices: Vec<usize> = sessions
            .iter()
            .map(|s| {
                let next = per_model.entry(s.model.as_str()).or_insert(0);
                let idx = *next;
                *next += 1;
                idx
            })
            .collect();

        let analyzer = &self.analyzer;
        let results: Vec<_> = sessions
            .par_iter()
            .zip(indices.par_iter())
            .map(|(session, &session_index)| {
                analyzer.analyze_session(session).map(|analysis| BatchEntry {
                    model: session.model.clone(),
                    session_index,
                    timestamp: session.timestamp.clone(),
                    data: session.clone(),
                    analysis,
                })
            })
            .collect();

        let mut entries = Vec::with_capacity(results.len());
        let mut skipped = 0u64;
        for (position, result) in results.into_iter().enumerate() {
            match result {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    skipped += 1;
                    warn!(position, error = %e, "skipping session");
                }
            }
        }

        let responses: u64 = entries.iter().map(|e| e.data.response_count() as u64).sum();
        timer.finish(&mut self.metrics, entries.len() as u64, skipped, responses);
        entries
    }

    pub fn aggregate(&self, entries: &[BatchEntry]) -> CrossSessionAnalysis {
        self.aggregator.aggregate(entries)
    }

    /// Analyze then aggregate a whole batch.
    pub fn run(&mut self, sessions: &[SessionRecord]) -> BatchReport {
        let entries = self.analyze_batch(sessions);
        let cross_analysis = self.aggregate(&entries);

        info!(
            analyzed = self.metrics.sessions_analyzed,
            skipped = self.metrics.sessions_skipped,
            responses = self.metrics.responses_processed,
            duration_ms = self.metrics.last_batch_duration_ms,
            "pipeline run complete"
        );

        BatchReport {
            entries,
            cross_analysis,
        }
    }
}
