//! Per-session analysis: shifts, trajectories, pattern evolution, coherence
//! and representational similarity for one [`SessionRecord`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use tide_core::{AnalysisConfig, Result, SessionRecord};

use crate::similarity::{SimilarityAnalysis, SimilarityEngine};

use super::coherence::compute_coherence;
use super::patterns::{analyze_pattern_evolution, PatternEvolution};
use super::shifts::{compute_dimensional_shifts, DimensionalShift};
use super::trend::{track_feature_trajectories, FeatureTrajectories};

/// Everything derived from one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionAnalysis {
    pub dimensional_shifts: Vec<DimensionalShift>,
    pub rsa_patterns: SimilarityAnalysis,
    pub feature_trajectories: FeatureTrajectories,
    pub pattern_evolution: PatternEvolution,
    pub coherence_score: f64,
}

/// Stateless analyzer; holds only configuration.
#[derive(Debug, Clone, Default)]
pub struct SessionAnalyzer {
    config: AnalysisConfig,
    similarity: SimilarityEngine,
}

impl SessionAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            similarity: SimilarityEngine::new(),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze one session.
    ///
    /// Fails only for structurally invalid sessions; statistically
    /// degenerate input always yields neutral values.
    pub fn analyze_session(&self, session: &SessionRecord) -> Result<SessionAnalysis> {
        session.validate()?;

        let analysis = SessionAnalysis {
            dimensional_shifts: self.compute_dimensional_shifts(session),
            rsa_patterns: self.similarity.analyze(session),
            feature_trajectories: self.track_feature_trajectories(session),
            pattern_evolution: self.analyze_pattern_evolution(session),
            coherence_score: self.compute_coherence(session),
        };

        debug!(
            model = %session.model,
            responses = session.response_count(),
            shifts = analysis.dimensional_shifts.len(),
            coherence = analysis.coherence_score,
            "session analyzed"
        );
        Ok(analysis)
    }

    pub fn compute_dimensional_shifts(&self, session: &SessionRecord) -> Vec<DimensionalShift> {
        compute_dimensional_shifts(session)
    }

    pub fn track_feature_trajectories(&self, session: &SessionRecord) -> FeatureTrajectories {
        track_feature_trajectories(session, self.config.trend_threshold)
    }

    pub fn analyze_pattern_evolution(&self, session: &SessionRecord) -> PatternEvolution {
        analyze_pattern_evolution(session)
    }

    pub fn compute_coherence(&self, session: &SessionRecord) -> f64 {
        compute_coherence(session)
    }

    pub fn analyze_similarity(&self, session: &SessionRecord) -> SimilarityAnalysis {
        self.similarity.analyze(session)
    }
}
