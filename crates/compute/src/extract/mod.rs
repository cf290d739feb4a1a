//! Turning raw model transcripts into scored [`SessionRecord`]s.
//!
//! Feature scoring and pattern labelling sit behind two small traits so the
//! keyword heuristics can be swapped without touching the analysis code.

pub mod lexicon;
pub mod signature;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tide_core::{FeatureVector, ResponseRecord, Result, SessionRecord, TaskType, TideError};

pub use lexicon::LexiconExtractor;
pub use signature::SignatureClassifier;

/// Scores response text on the 14 canonical features.
pub trait FeatureExtractor {
    fn extract(&self, text: &str) -> FeatureVector;
}

/// Assigns a short categorical pattern label to response text.
pub trait PatternClassifier {
    fn classify(&self, text: &str) -> String;
}

/// One unscored model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResponse {
    pub prompt: String,
    pub response: String,
    #[serde(default)]
    pub timestamp: String,
}

/// A collected transcript before feature extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSession {
    pub model: String,
    pub timestamp: String,
    #[serde(default)]
    pub responses: IndexMap<TaskType, Vec<RawResponse>>,
}

/// Combines an extractor and a classifier to score raw transcripts.
#[derive(Debug, Clone, Default)]
pub struct ResponseScorer<E = LexiconExtractor, C = SignatureClassifier> {
    extractor: E,
    classifier: C,
}

impl<E: FeatureExtractor, C: PatternClassifier> ResponseScorer<E, C> {
    pub fn new(extractor: E, classifier: C) -> Self {
        Self {
            extractor,
            classifier,
        }
    }

    pub fn score_response(&self, raw: &RawResponse) -> ResponseRecord {
        ResponseRecord {
            prompt: raw.prompt.clone(),
            response: raw.response.clone(),
            features: self.extractor.extract(&raw.response),
            pattern: self.classifier.classify(&raw.response),
            timestamp: raw.timestamp.clone(),
        }
    }

    /// Score every response, keeping task and response order.
    pub fn score_session(&self, raw: &RawSession) -> Result<SessionRecord> {
        if raw.model.trim().is_empty() {
            return Err(TideError::InvalidSession(
                "transcript has no model identifier".to_string(),
            ));
        }

        let mut session = SessionRecord::new(raw.model.clone(), raw.timestamp.clone());
        for (task, responses) in &raw.responses {
            for r in responses {
                session.push(*task, self.score_response(r));
            }
        }
        debug!(
            model = %session.model,
            responses = session.response_count(),
            "transcript scored"
        );
        Ok(session)
    }
}
