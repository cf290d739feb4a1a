//! Composite session coherence score.
//!
//! The score is the unweighted mean of every factor that can be computed:
//! one within-task similarity factor per task type with at least two
//! responses, plus one dimensional-alignment factor when the session has
//! any responses at all.

use tide_core::{ResponseRecord, SessionRecord, TaskType};

use crate::algorithms::descriptive::{finite_or_zero, mean};
use crate::algorithms::similarity::feature_similarity;

/// Mean pairwise feature similarity among responses of one task type.
pub fn within_task_similarity(responses: &[ResponseRecord]) -> Option<f64> {
    if responses.len() < 2 {
        return None;
    }
    let mut sims = Vec::with_capacity(responses.len() * (responses.len() - 1) / 2);
    for i in 0..responses.len() {
        for j in (i + 1)..responses.len() {
            sims.push(feature_similarity(&responses[i].features, &responses[j].features));
        }
    }
    mean(&sims)
}

/// Mean, over all responses, of the response's score on the factor group
/// its own task type targets.
pub fn dimensional_alignment(session: &SessionRecord) -> Option<f64> {
    let scores: Vec<f64> = session
        .flatten_canonical()
        .into_iter()
        .map(|(task, r)| r.features.group_mean(task.expected_group()))
        .collect();
    mean(&scores)
}

pub fn compute_coherence(session: &SessionRecord) -> f64 {
    let mut factors: Vec<f64> = TaskType::CANONICAL_ORDER
        .iter()
        .filter_map(|task| within_task_similarity(session.task_responses(*task)))
        .collect();

    if let Some(alignment) = dimensional_alignment(session) {
        factors.push(alignment);
    }

    finite_or_zero(mean(&factors).unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::{response, session_with};
    use tide_core::FeatureName;

    #[test]
    fn empty_session_is_zero() {
        assert_eq!(compute_coherence(&session_with(vec![])), 0.0);
    }

    #[test]
    fn single_response_uses_alignment_only() {
        let session = session_with(vec![(
            TaskType::External,
            response("EEFS", &[(FeatureName::Number, 0.6), (FeatureName::Social, 1.0)]),
        )]);
        // external mean = 0.6 / 3
        assert!((compute_coherence(&session) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn combines_similarity_and_alignment() {
        let session = session_with(vec![
            (TaskType::Concrete, response("A", &[(FeatureName::Color, 0.5)])),
            (TaskType::Concrete, response("B", &[(FeatureName::Color, 1.0)])),
        ]);
        // similarity factor = 1.0 (parallel vectors)
        // alignment = mean(0.5 / 5, 1.0 / 5) = 0.15
        let expected = (1.0 + 0.15) / 2.0;
        assert!((compute_coherence(&session) - expected).abs() < 1e-12);
    }

    #[test]
    fn identical_tiny_responses_are_fully_similar() {
        let session = session_with(vec![
            (TaskType::Concrete, response("A", &[(FeatureName::Color, 1e-17)])),
            (TaskType::Concrete, response("A", &[(FeatureName::Color, 1e-17)])),
        ]);
        // similarity factor = 1.0, alignment is negligible
        assert!((compute_coherence(&session) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_vectors_do_not_produce_nan() {
        let session = session_with(vec![
            (TaskType::Internal, response("A", &[])),
            (TaskType::Internal, response("B", &[])),
        ]);
        let c = compute_coherence(&session);
        assert!(c.is_finite());
        assert_eq!(c, 0.0);
    }
}
