//! Per-feature trajectories across a session and their trend classification.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tide_core::{FeatureName, SessionRecord};

use crate::algorithms::correlation::index_correlation;
use crate::algorithms::descriptive::{all_identical, finite_or_zero, mean, population_std, range};

/// Direction of a feature trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    /// Fewer than two points.
    Unknown,
}

/// Summary statistics of one trajectory with at least two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityStats {
    pub mean: f64,
    pub std: f64,
    pub range: f64,
    pub trend: TrendDirection,
}

/// Feature values in session order plus stability stats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureTrajectories {
    /// Every canonical feature, possibly with an empty or singleton series.
    pub trajectories: IndexMap<FeatureName, Vec<f64>>,
    /// Only features whose trajectory has at least two points.
    pub stability: IndexMap<FeatureName, StabilityStats>,
}

/// Classify a series by exact constancy, then by its correlation with the
/// position index.
///
/// An undefined correlation is classified as stable.
pub fn classify_trend(values: &[f64], threshold: f64) -> TrendDirection {
    if values.len() < 2 {
        return TrendDirection::Unknown;
    }
    if all_identical(values) {
        return TrendDirection::Stable;
    }
    match index_correlation(values) {
        Some(r) if r > threshold => TrendDirection::Increasing,
        Some(r) if r < -threshold => TrendDirection::Decreasing,
        Some(_) => TrendDirection::Stable,
        None => {
            debug!(points = values.len(), "correlation undefined, treating trajectory as stable");
            TrendDirection::Stable
        }
    }
}

/// Collect each feature's recorded values in canonical task order and
/// summarize every series of length two or more.
pub fn track_feature_trajectories(session: &SessionRecord, threshold: f64) -> FeatureTrajectories {
    let mut trajectories: IndexMap<FeatureName, Vec<f64>> =
        FeatureName::ALL.iter().map(|f| (*f, Vec::new())).collect();

    for (_, response) in session.flatten_canonical() {
        for (name, value) in response.features.iter() {
            if let Some(series) = trajectories.get_mut(&name) {
                series.push(value);
            }
        }
    }

    let stability = trajectories
        .iter()
        .filter(|(_, series)| series.len() > 1)
        .map(|(name, series)| {
            let stats = StabilityStats {
                mean: finite_or_zero(mean(series).unwrap_or(0.0)),
                std: finite_or_zero(population_std(series).unwrap_or(0.0)),
                range: finite_or_zero(range(series).unwrap_or(0.0)),
                trend: classify_trend(series, threshold),
            };
            (*name, stats)
        })
        .collect();

    FeatureTrajectories {
        trajectories,
        stability,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::{response, session_with};
    use tide_core::TaskType;

    #[test]
    fn constant_series_is_stable() {
        assert_eq!(classify_trend(&[0.5, 0.5, 0.5, 0.5], 0.3), TrendDirection::Stable);
    }

    #[test]
    fn constant_trajectory_reports_zero_std() {
        let session = session_with(vec![
            (TaskType::Concrete, response("A", &[(FeatureName::Color, 0.1)])),
            (TaskType::Concrete, response("A", &[(FeatureName::Color, 0.1)])),
            (TaskType::Internal, response("A", &[(FeatureName::Color, 0.1)])),
        ]);
        let t = track_feature_trajectories(&session, 0.3);
        let color = &t.stability[&FeatureName::Color];
        assert_eq!(color.std, 0.0);
        assert_eq!(color.mean, 0.1);
        assert_eq!(color.trend, TrendDirection::Stable);
    }

    #[test]
    fn ramp_up_and_down() {
        let up = [0.1, 0.2, 0.3, 0.4, 0.5];
        let down: Vec<f64> = up.iter().rev().copied().collect();
        assert_eq!(classify_trend(&up, 0.3), TrendDirection::Increasing);
        assert_eq!(classify_trend(&down, 0.3), TrendDirection::Decreasing);
    }

    #[test]
    fn weak_correlation_is_stable() {
        // r(index, value) = 0 for a symmetric zigzag.
        assert_eq!(classify_trend(&[0.0, 1.0, 1.0, 0.0], 0.3), TrendDirection::Stable);
    }

    #[test]
    fn short_series_is_unknown() {
        assert_eq!(classify_trend(&[0.4], 0.3), TrendDirection::Unknown);
        assert_eq!(classify_trend(&[], 0.3), TrendDirection::Unknown);
    }

    #[test]
    fn trajectories_skip_unrecorded_features() {
        let session = session_with(vec![
            (TaskType::Internal, response("A", &[(FeatureName::Emotion, 0.2), (FeatureName::Social, 0.1)])),
            (TaskType::Concrete, response("B", &[(FeatureName::Emotion, 0.6)])),
        ]);
        let t = track_feature_trajectories(&session, 0.3);

        assert_eq!(t.trajectories.len(), 14);
        // Concrete first, then internal.
        assert_eq!(t.trajectories[&FeatureName::Emotion], vec![0.6, 0.2]);
        assert_eq!(t.trajectories[&FeatureName::Social], vec![0.1]);
        assert!(t.trajectories[&FeatureName::Tactile].is_empty());

        assert_eq!(t.stability.len(), 1);
        let emotion = &t.stability[&FeatureName::Emotion];
        assert!((emotion.mean - 0.4).abs() < 1e-12);
        assert!((emotion.std - 0.2).abs() < 1e-12);
        assert!((emotion.range - 0.4).abs() < 1e-12);
        assert_eq!(emotion.trend, TrendDirection::Decreasing);
    }
}
