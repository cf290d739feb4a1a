//! Representational similarity across three encodings of a session's
//! responses: feature geometry, lexical overlap, and pattern-label equality.
//!
//! All three matrices are built over the same response list, flattened in
//! the session's stored task order. Comparisons are only reported when both
//! matrices involved were computed.

pub mod rdm;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tide_core::{ResponseRecord, SessionRecord};

pub use rdm::{feature_rdm, pattern_rdm, semantic_rdm, DissimilarityMatrix, MatrixSummary};

pub const FEATURES_KEY: &str = "features";
pub const SEMANTIC_KEY: &str = "semantic";
pub const PATTERN_KEY: &str = "pattern";

pub const FEATURE_SEMANTIC: &str = "feature_semantic";
pub const FEATURE_PATTERN: &str = "feature_pattern";
pub const SEMANTIC_PATTERN: &str = "semantic_pattern";

/// Serializable RSA result for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarityAnalysis {
    pub rdms: IndexMap<String, MatrixSummary>,
    pub comparisons: IndexMap<String, f64>,
}

impl SimilarityAnalysis {
    pub fn comparison(&self, key: &str) -> Option<f64> {
        self.comparisons.get(key).copied()
    }
}

/// The three matrices for one session before summarizing.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionMatrices {
    pub features: DissimilarityMatrix,
    pub semantic: DissimilarityMatrix,
    pub pattern: DissimilarityMatrix,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityEngine;

impl SimilarityEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn matrices(&self, session: &SessionRecord) -> SessionMatrices {
        let responses: Vec<&ResponseRecord> =
            session.flatten_stored().into_iter().map(|(_, r)| r).collect();
        SessionMatrices {
            features: feature_rdm(&responses),
            semantic: semantic_rdm(&responses),
            pattern: pattern_rdm(&responses),
        }
    }

    pub fn analyze(&self, session: &SessionRecord) -> SimilarityAnalysis {
        let m = self.matrices(session);

        let mut rdms = IndexMap::new();
        rdms.insert(FEATURES_KEY.to_string(), m.features.summary());
        rdms.insert(SEMANTIC_KEY.to_string(), m.semantic.summary());
        rdms.insert(PATTERN_KEY.to_string(), m.pattern.summary());

        let mut comparisons = IndexMap::new();
        let pairs = [
            (FEATURE_SEMANTIC, &m.features, &m.semantic),
            (FEATURE_PATTERN, &m.features, &m.pattern),
            (SEMANTIC_PATTERN, &m.semantic, &m.pattern),
        ];
        for (key, a, b) in pairs {
            if a.is_empty() || b.is_empty() {
                continue;
            }
            comparisons.insert(key.to_string(), a.compare(b));
        }

        debug!(
            model = %session.model,
            responses = m.features.shape()[0],
            comparisons = comparisons.len(),
            "similarity analysis complete"
        );

        SimilarityAnalysis { rdms, comparisons }
    }
}
