//! Batch-wide descriptive overview: response distribution, pattern
//! histogram and stability, collection date range, per-model feature
//! activations.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use tide_core::{FeatureName, SessionRecord, TaskType};

use crate::algorithms::descriptive::finite_or_zero;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub collection_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOverview {
    pub total_responses: usize,
    pub response_distribution: IndexMap<TaskType, usize>,
    /// Pattern counts over every response, first-seen order.
    pub pattern_histogram: IndexMap<String, u64>,
    /// `1 - changes / total` over the batch-wide pattern stream.
    pub pattern_stability: f64,
    pub date_range: DateRange,
    /// Mean recorded value of each feature, per model.
    pub feature_activations: IndexMap<String, IndexMap<FeatureName, f64>>,
}

/// Running sum and count of one feature's recorded values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Activation {
    sum: f64,
    count: u64,
}

/// Mergeable partial overview.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverviewState {
    total_responses: usize,
    response_distribution: IndexMap<TaskType, usize>,
    pattern_histogram: IndexMap<String, u64>,
    pattern_total: u64,
    pattern_changes: u64,
    first_pattern: Option<String>,
    last_pattern: Option<String>,
    earliest: Option<DateTime<Utc>>,
    latest: Option<DateTime<Utc>>,
    activations: IndexMap<String, [Activation; 14]>,
}

impl OverviewState {
    /// Partial overview of one session, responses taken in stored order.
    pub fn from_session(session: &SessionRecord) -> Self {
        let mut state = Self::default();
        let parsed = session.parsed_timestamp();
        state.earliest = parsed;
        state.latest = parsed;

        let activations = state
            .activations
            .entry(session.model.clone())
            .or_insert([Activation::default(); 14]);

        for (task, response) in session.flatten_stored() {
            state.total_responses += 1;
            *state.response_distribution.entry(task).or_insert(0) += 1;
            *state
                .pattern_histogram
                .entry(response.pattern.clone())
                .or_insert(0) += 1;

            if let Some(prev) = &state.last_pattern {
                if *prev != response.pattern {
                    state.pattern_changes += 1;
                }
            }
            if state.first_pattern.is_none() {
                state.first_pattern = Some(response.pattern.clone());
            }
            state.last_pattern = Some(response.pattern.clone());
            state.pattern_total += 1;

            for (idx, name) in FeatureName::ALL.iter().enumerate() {
                if let Some(v) = response.features.recorded(*name) {
                    activations[idx].sum += v;
                    activations[idx].count += 1;
                }
            }
        }
        state
    }

    /// Append `other` after `self`.
    pub fn merge(mut self, other: Self) -> Self {
        self.total_responses += other.total_responses;
        for (task, n) in other.response_distribution {
            *self.response_distribution.entry(task).or_insert(0) += n;
        }
        for (pattern, n) in other.pattern_histogram {
            *self.pattern_histogram.entry(pattern).or_insert(0) += n;
        }

        let boundary_change = match (&self.last_pattern, &other.first_pattern) {
            (Some(a), Some(b)) if a != b => 1,
            _ => 0,
        };
        self.pattern_changes += other.pattern_changes + boundary_change;
        self.pattern_total += other.pattern_total;
        if self.first_pattern.is_none() {
            self.first_pattern = other.first_pattern;
        }
        if other.last_pattern.is_some() {
            self.last_pattern = other.last_pattern;
        }

        self.earliest = min_opt(self.earliest, other.earliest);
        self.latest = max_opt(self.latest, other.latest);

        for (model, acts) in other.activations {
            let entry = self
                .activations
                .entry(model)
                .or_insert([Activation::default(); 14]);
            for (mine, theirs) in entry.iter_mut().zip(acts.iter()) {
                mine.sum += theirs.sum;
                mine.count += theirs.count;
            }
        }
        self
    }

    pub fn finish(self) -> BatchOverview {
        let pattern_stability = if self.pattern_total > 1 {
            finite_or_zero(1.0 - self.pattern_changes as f64 / self.pattern_total as f64)
        } else {
            0.0
        };

        let mut response_distribution: IndexMap<TaskType, usize> =
            TaskType::CANONICAL_ORDER.iter().map(|t| (*t, 0)).collect();
        for (task, n) in self.response_distribution {
            *response_distribution.entry(task).or_insert(0) += n;
        }

        let collection_days = match (self.earliest, self.latest) {
            (Some(start), Some(end)) => (end - start).num_days(),
            _ => 0,
        };

        let feature_activations = self
            .activations
            .into_iter()
            .map(|(model, acts)| {
                let means = FeatureName::ALL
                    .iter()
                    .zip(acts.iter())
                    .filter(|(_, a)| a.count > 0)
                    .map(|(name, a)| (*name, finite_or_zero(a.sum / a.count as f64)))
                    .collect();
                (model, means)
            })
            .collect();

        BatchOverview {
            total_responses: self.total_responses,
            response_distribution,
            pattern_histogram: self.pattern_histogram,
            pattern_stability,
            date_range: DateRange {
                start: self.earliest,
                end: self.latest,
                collection_days,
            },
            feature_activations,
        }
    }
}

fn min_opt(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

fn max_opt(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::{response, session_for};

    fn session(model: &str, ts: &str, patterns: &[&str]) -> SessionRecord {
        let mut s = session_for(
            model,
            patterns
                .iter()
                .map(|p| (TaskType::Internal, response(p, &[(FeatureName::Emotion, 0.5)])))
                .collect(),
        );
        s.timestamp = ts.to_string();
        s
    }

    #[test]
    fn stability_counts_changes_across_sessions() {
        let a = OverviewState::from_session(&session("m", "2024-01-01T00:00:00", &["X", "X"]));
        let b = OverviewState::from_session(&session("m", "2024-01-03T00:00:00", &["Y", "Y"]));
        let overview = a.merge(b).finish();
        // X X | Y Y: one change across the boundary.
        assert!((overview.pattern_stability - 0.75).abs() < 1e-12);
        assert_eq!(overview.total_responses, 4);
        assert_eq!(overview.pattern_histogram["X"], 2);
        assert_eq!(overview.date_range.collection_days, 2);
    }

    #[test]
    fn merge_is_associative() {
        let s1 = session("a", "2024-01-02T00:00:00", &["X", "Y"]);
        let s2 = session("b", "2024-01-01T00:00:00", &["Y"]);
        let s3 = session("a", "2024-01-05T00:00:00", &["Z", "X"]);
        let p = |s: &SessionRecord| OverviewState::from_session(s);

        let left = p(&s1).merge(p(&s2)).merge(p(&s3));
        let right = p(&s1).merge(p(&s2).merge(p(&s3)));
        assert_eq!(left, right);
    }

    #[test]
    fn distribution_lists_every_task() {
        let overview = OverviewState::from_session(&session("m", "bad-ts", &["X"])).finish();
        assert_eq!(overview.response_distribution.len(), 3);
        assert_eq!(overview.response_distribution[&TaskType::Internal], 1);
        assert_eq!(overview.response_distribution[&TaskType::Concrete], 0);
        assert!(overview.date_range.start.is_none());
        assert_eq!(overview.pattern_stability, 0.0);
        assert_eq!(
            overview.feature_activations["m"][&FeatureName::Emotion],
            0.5
        );
        assert!(!overview.feature_activations["m"].contains_key(&FeatureName::Social));
    }
}
