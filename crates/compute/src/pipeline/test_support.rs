//! Fixture builders shared by the pipeline unit tests.

use tide_core::{FeatureName, FeatureVector, ResponseRecord, SessionRecord, TaskType};

pub(crate) fn response(pattern: &str, feats: &[(FeatureName, f64)]) -> ResponseRecord {
    text_response(pattern, "", feats)
}

pub(crate) fn text_response(
    pattern: &str,
    text: &str,
    feats: &[(FeatureName, f64)],
) -> ResponseRecord {
    ResponseRecord {
        prompt: "prompt".to_string(),
        response: text.to_string(),
        features: feats.iter().copied().collect::<FeatureVector>(),
        pattern: pattern.to_string(),
        timestamp: "2024-05-01T12:00:00".to_string(),
    }
}

pub(crate) fn session_with(responses: Vec<(TaskType, ResponseRecord)>) -> SessionRecord {
    session_for("test-model", responses)
}

pub(crate) fn session_for(model: &str, responses: Vec<(TaskType, ResponseRecord)>) -> SessionRecord {
    let mut session = SessionRecord::new(model, "2024-05-01T12:00:00");
    for (task, r) in responses {
        session.push(task, r);
    }
    session
}
