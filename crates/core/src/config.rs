use std::env;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TideError};
use crate::task::TaskType;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_f64(profile: &str, key: &str, default: f64) -> f64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Analysis thresholds ───────────────────────────────────────

/// Tunable constants of the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// |pearson(index, value)| above this classifies a trajectory as trending.
    pub trend_threshold: f64,
    /// Shifts with |Δ| at or below this are ignored by the I/E balance.
    pub balance_threshold: f64,
    /// One side must exceed the other by this factor to be "dominant".
    pub balance_ratio: f64,
    /// Two-sided confidence level for per-model intervals.
    pub confidence_level: f64,
    /// p-value below which the ANOVA is reported significant.
    pub significance_alpha: f64,
    /// Minimum coherence samples a model needs to enter CI and ANOVA.
    pub min_group_samples: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            trend_threshold: 0.3,
            balance_threshold: 0.1,
            balance_ratio: 1.5,
            confidence_level: 0.95,
            significance_alpha: 0.05,
            min_group_samples: 2,
        }
    }
}

impl AnalysisConfig {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `TIDE_PROFILE`; when set, every key is first
    /// looked up as `{PROFILE}_{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("TIDE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        let d = Self::default();
        Self {
            trend_threshold: profiled_env_f64(p, "TIDE_TREND_THRESHOLD", d.trend_threshold),
            balance_threshold: profiled_env_f64(p, "TIDE_BALANCE_THRESHOLD", d.balance_threshold),
            balance_ratio: profiled_env_f64(p, "TIDE_BALANCE_RATIO", d.balance_ratio),
            confidence_level: profiled_env_f64(p, "TIDE_CONFIDENCE_LEVEL", d.confidence_level),
            significance_alpha: profiled_env_f64(p, "TIDE_SIGNIFICANCE_ALPHA", d.significance_alpha),
            min_group_samples: profiled_env_usize(p, "TIDE_MIN_GROUP_SAMPLES", d.min_group_samples),
        }
    }

    /// Reject values the statistics cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(TideError::Config(format!(
                "confidence_level must be in (0, 1), got {}",
                self.confidence_level
            )));
        }
        if !(self.significance_alpha > 0.0 && self.significance_alpha < 1.0) {
            return Err(TideError::Config(format!(
                "significance_alpha must be in (0, 1), got {}",
                self.significance_alpha
            )));
        }
        if self.min_group_samples < 2 {
            return Err(TideError::Config(
                "min_group_samples must be at least 2".to_string(),
            ));
        }
        if self.balance_ratio < 1.0 || self.balance_threshold < 0.0 || self.trend_threshold < 0.0 {
            return Err(TideError::Config(
                "thresholds must be non-negative and balance_ratio >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Analysis config:");
        tracing::info!("  trend:        threshold={}", self.trend_threshold);
        tracing::info!(
            "  balance:      threshold={}, ratio={}",
            self.balance_threshold,
            self.balance_ratio
        );
        tracing::info!(
            "  statistics:   confidence={}, alpha={}, min_samples={}",
            self.confidence_level,
            self.significance_alpha,
            self.min_group_samples
        );
    }
}

// ── Task catalog ──────────────────────────────────────────────

/// Recognized task types and their default prompt sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCatalog {
    pub tasks: IndexMap<TaskType, Vec<String>>,
}

impl Default for TaskCatalog {
    fn default() -> Self {
        let mut tasks = IndexMap::new();
        tasks.insert(
            TaskType::Concrete,
            to_owned(&[
                "Describe the physical properties of water",
                "What does a tree look like?",
                "Explain the texture of sand",
                "Describe the taste of chocolate",
                "What color is the sky?",
                "How does rain feel on your skin?",
                "Describe the sound of ocean waves",
                "What does fresh bread smell like?",
                "Explain the shape of a circle",
                "Describe the temperature of ice",
            ]),
        );
        tasks.insert(
            TaskType::Internal,
            to_owned(&[
                "How does happiness feel?",
                "What is empathy?",
                "Describe the feeling of nostalgia",
                "What does it mean to trust someone?",
                "How would you comfort a sad friend?",
                "What is the nature of consciousness?",
                "Describe the emotion of pride",
                "What makes a good friendship?",
                "How does guilt affect behavior?",
                "What is the meaning of love?",
            ]),
        );
        tasks.insert(
            TaskType::External,
            to_owned(&[
                "Calculate the area of a circle with radius 5",
                "What is the distance between Earth and Moon?",
                "Explain the concept of time",
                "How many seconds in an hour?",
                "Describe spatial relationships",
                "What is the speed of light?",
                "Explain coordinate systems",
                "How do you measure angles?",
                "What is the volume of a cube?",
                "Describe the concept of infinity",
            ]),
        );
        Self { tasks }
    }
}

fn to_owned(prompts: &[&str]) -> Vec<String> {
    prompts.iter().map(|p| p.to_string()).collect()
}

impl TaskCatalog {
    pub fn prompts(&self, task: TaskType) -> &[String] {
        self.tasks.get(&task).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace the prompt set for `task`; empty overrides are ignored.
    pub fn override_prompts(&mut self, task: TaskType, prompts: Vec<String>) {
        if prompts.is_empty() {
            tracing::warn!(task = %task, "ignoring empty prompt override");
            return;
        }
        self.tasks.insert(task, prompts);
    }

    pub fn task_types(&self) -> impl Iterator<Item = TaskType> + '_ {
        self.tasks.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_confidence() {
        let cfg = AnalysisConfig {
            confidence_level: 1.5,
            ..AnalysisConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(TideError::Config(_))));
    }

    #[test]
    fn profiled_key_wins_over_plain_key() {
        env::set_var("STAGING_TIDE_TREND_THRESHOLD", "0.45");
        env::set_var("TIDE_TREND_THRESHOLD", "0.2");
        env::set_var("TIDE_BALANCE_RATIO", "2.5");

        let cfg = AnalysisConfig::for_profile("staging");
        assert_eq!(cfg.trend_threshold, 0.45);
        assert_eq!(cfg.balance_ratio, 2.5);
        assert_eq!(cfg.confidence_level, 0.95);

        let plain = AnalysisConfig::for_profile("");
        assert_eq!(plain.trend_threshold, 0.2);

        env::remove_var("STAGING_TIDE_TREND_THRESHOLD");
        env::remove_var("TIDE_TREND_THRESHOLD");
        env::remove_var("TIDE_BALANCE_RATIO");
    }

    #[test]
    fn partial_deserialize_fills_defaults() {
        let cfg: AnalysisConfig = serde_json::from_str(r#"{"trend_threshold": 0.5}"#).unwrap();
        assert_eq!(cfg.trend_threshold, 0.5);
        assert_eq!(cfg.balance_ratio, 1.5);
    }

    #[test]
    fn catalog_covers_every_task() {
        let catalog = TaskCatalog::default();
        for task in TaskType::CANONICAL_ORDER {
            assert_eq!(catalog.prompts(task).len(), 10);
        }
    }

    #[test]
    fn empty_override_is_ignored() {
        let mut catalog = TaskCatalog::default();
        catalog.override_prompts(TaskType::Internal, vec![]);
        assert_eq!(catalog.prompts(TaskType::Internal).len(), 10);
        catalog.override_prompts(TaskType::Internal, vec!["Why?".to_string()]);
        assert_eq!(catalog.prompts(TaskType::Internal), ["Why?".to_string()]);
    }
}
