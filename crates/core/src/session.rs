use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TideError};
use crate::feature::FeatureVector;
use crate::task::TaskType;

/// Short categorical code summarizing one response (e.g. `"CCDS"`).
pub type PatternLabel = String;

/// One evaluated model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub prompt: String,
    pub response: String,
    pub features: FeatureVector,
    pub pattern: PatternLabel,
    pub timestamp: String,
}

/// One evaluation run against one named model.
///
/// Response order within a task type is significant; the order of task
/// types in the map is not used by the analysis, which always flattens in
/// [`TaskType::CANONICAL_ORDER`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub model: String,
    pub timestamp: String,
    #[serde(default)]
    pub responses: IndexMap<TaskType, Vec<ResponseRecord>>,
}

impl SessionRecord {
    pub fn new(model: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            timestamp: timestamp.into(),
            responses: IndexMap::new(),
        }
    }

    /// Append a response under `task`.
    pub fn push(&mut self, task: TaskType, response: ResponseRecord) {
        self.responses.entry(task).or_default().push(response);
    }

    /// Responses for one task type (empty when the task was never run).
    pub fn task_responses(&self, task: TaskType) -> &[ResponseRecord] {
        self.responses.get(&task).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All responses tagged with their task type, in canonical task order.
    pub fn flatten_canonical(&self) -> Vec<(TaskType, &ResponseRecord)> {
        TaskType::CANONICAL_ORDER
            .iter()
            .flat_map(|task| self.task_responses(*task).iter().map(move |r| (*task, r)))
            .collect()
    }

    /// All responses tagged with their task type, in map order.
    pub fn flatten_stored(&self) -> Vec<(TaskType, &ResponseRecord)> {
        self.responses
            .iter()
            .flat_map(|(task, rs)| rs.iter().map(move |r| (*task, r)))
            .collect()
    }

    pub fn response_count(&self) -> usize {
        self.responses.values().map(Vec::len).sum()
    }

    /// Reject structurally unusable sessions.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(TideError::InvalidSession(
                "session has no model identifier".to_string(),
            ));
        }
        Ok(())
    }

    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}

/// Parse RFC 3339 or naive ISO-8601 timestamps (naive values are taken as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
