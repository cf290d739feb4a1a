//! Finished per-model statistics and batch-level classifications.

use serde::{Deserialize, Serialize};

use tide_core::FactorGroup;

use crate::algorithms::anova::one_way_anova;
use crate::algorithms::descriptive::{finite_or_zero, mean, population_std};
use crate::algorithms::distributions::student_t_quantile;

/// Per-model coherence and diversity figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStats {
    pub coherence_scores: Vec<f64>,
    pub pattern_diversity: Vec<usize>,
    pub avg_coherence: f64,
    pub avg_diversity: f64,
    pub sessions: usize,
    pub responses: usize,
}

/// Student-t confidence interval around a model's mean coherence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub mean: f64,
    /// Population standard deviation of the samples.
    pub std: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub n: usize,
}

impl ConfidenceInterval {
    /// `mean ± t((1 + level) / 2, n - 1) · std / √n`; `None` below two samples.
    pub fn student_t(samples: &[f64], level: f64) -> Option<Self> {
        let n = samples.len();
        if n < 2 {
            return None;
        }
        let m = mean(samples)?;
        let std = population_std(samples)?;
        let se = std / (n as f64).sqrt();
        let t = student_t_quantile((1.0 + level) / 2.0, (n - 1) as f64)?;
        let half = finite_or_zero(t * se);
        Some(Self {
            mean: m,
            std,
            ci_lower: m - half,
            ci_upper: m + half,
            n,
        })
    }
}

/// One-way ANOVA over per-model coherence scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignificanceTest {
    pub f_statistic: f64,
    pub p_value: f64,
    pub significant: bool,
    pub df_between: usize,
    pub df_within: usize,
    /// Models that entered the test, in first-seen order.
    pub models: Vec<String>,
}

impl SignificanceTest {
    /// Run the test over `(model, samples)` groups with at least
    /// `min_samples` each. `None` when fewer than two groups qualify or the
    /// statistic is undefined.
    pub fn anova(groups: &[(&str, &[f64])], min_samples: usize, alpha: f64) -> Option<Self> {
        let eligible: Vec<&(&str, &[f64])> = groups
            .iter()
            .filter(|(_, samples)| samples.len() >= min_samples)
            .collect();
        if eligible.len() < 2 {
            return None;
        }
        let samples: Vec<&[f64]> = eligible.iter().map(|(_, s)| *s).collect();
        let result = one_way_anova(&samples)?;
        Some(Self {
            f_statistic: result.f_statistic,
            p_value: result.p_value,
            significant: result.p_value < alpha,
            df_between: result.df_between,
            df_within: result.df_within,
            models: eligible.iter().map(|(m, _)| m.to_string()).collect(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticalTests {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anova: Option<SignificanceTest>,
}

/// Internal vs external share of large shifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingBalance {
    #[serde(rename = "Internal-dominant")]
    InternalDominant,
    #[serde(rename = "External-dominant")]
    ExternalDominant,
    Balanced,
}

impl ProcessingBalance {
    pub fn classify(avg_internal: f64, avg_external: f64, ratio: f64) -> Self {
        if avg_internal > avg_external * ratio {
            Self::InternalDominant
        } else if avg_external > avg_internal * ratio {
            Self::ExternalDominant
        } else {
            Self::Balanced
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InternalDominant => "Internal-dominant",
            Self::ExternalDominant => "External-dominant",
            Self::Balanced => "Balanced",
        }
    }
}

impl std::fmt::Display for ProcessingBalance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Group with the highest mean; ties resolve in [`FactorGroup::ALL`] order.
pub fn dominant_group(means: &[(FactorGroup, f64)]) -> FactorGroup {
    let mut best = (FactorGroup::ALL[0], f64::NEG_INFINITY);
    for group in FactorGroup::ALL {
        let value = means
            .iter()
            .find(|(g, _)| *g == group)
            .map(|(_, v)| finite_or_zero(*v))
            .unwrap_or(0.0);
        if value > best.1 {
            best = (group, value);
        }
    }
    best.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ci_matches_reference_values() {
        // mean 0.85, population std 0.05, se = 0.05 / √2, t(0.975, 1) = 12.7062.
        let ci = ConfidenceInterval::student_t(&[0.8, 0.9], 0.95).unwrap();
        assert!((ci.mean - 0.85).abs() < 1e-12);
        assert!((ci.std - 0.05).abs() < 1e-12);
        let half = 12.706_204_7 * 0.05 / 2f64.sqrt();
        assert!((ci.ci_upper - (0.85 + half)).abs() < 1e-5);
        assert!((ci.ci_lower - (0.85 - half)).abs() < 1e-5);
        assert_eq!(ci.n, 2);
    }

    #[test]
    fn ci_of_constant_samples_collapses() {
        let ci = ConfidenceInterval::student_t(&[0.4, 0.4, 0.4], 0.95).unwrap();
        assert_eq!(ci.mean, 0.4);
        assert_eq!(ci.std, 0.0);
        assert_eq!(ci.ci_lower, ci.mean);
        assert_eq!(ci.ci_upper, ci.mean);
    }

    #[test]
    fn ci_needs_two_samples() {
        assert!(ConfidenceInterval::student_t(&[0.5], 0.95).is_none());
    }

    #[test]
    fn anova_requires_two_eligible_groups() {
        let a = [0.9, 0.88, 0.91];
        let b = [0.1];
        assert!(SignificanceTest::anova(&[("a", &a), ("b", &b)], 2, 0.05).is_none());
    }

    #[test]
    fn anova_detects_large_effect() {
        let a = [0.9, 0.88, 0.91];
        let b = [0.1, 0.12, 0.09];
        let c = [0.5];
        let test = SignificanceTest::anova(&[("a", &a), ("c", &c), ("b", &b)], 2, 0.05).unwrap();
        assert!(test.significant);
        assert!(test.p_value < 0.001);
        assert_eq!(test.models, vec!["a", "b"]);
        assert_eq!(test.df_between, 1);
        assert_eq!(test.df_within, 4);
    }

    #[test]
    fn balance_classification() {
        assert_eq!(
            ProcessingBalance::classify(0.4, 0.2, 1.5),
            ProcessingBalance::InternalDominant
        );
        assert_eq!(
            ProcessingBalance::classify(0.0, 0.2, 1.5),
            ProcessingBalance::ExternalDominant
        );
        assert_eq!(ProcessingBalance::classify(0.3, 0.25, 1.5), ProcessingBalance::Balanced);
        assert_eq!(ProcessingBalance::classify(0.0, 0.0, 1.5), ProcessingBalance::Balanced);
        assert_eq!(
            serde_json::to_string(&ProcessingBalance::InternalDominant).unwrap(),
            "\"Internal-dominant\""
        );
    }

    #[test]
    fn dominant_group_tie_break() {
        let means = [
            (FactorGroup::Concrete, 0.2),
            (FactorGroup::External, 0.2),
            (FactorGroup::Internal, 0.1),
        ];
        assert_eq!(dominant_group(&means), FactorGroup::External);
        assert_eq!(dominant_group(&[]), FactorGroup::Internal);
    }
}
