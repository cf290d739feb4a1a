use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use tide_core::{AnalysisConfig, TaskCatalog, TaskType};

/// CLI configuration loaded from TOML.
///
/// ```toml
/// [analysis]
/// trend_threshold = 0.25
///
/// [prompts]
/// concrete = ["Describe a lemon"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Replaces the environment-derived analysis config when present.
    /// Keys missing from the table take their defaults.
    #[serde(default)]
    pub analysis: Option<AnalysisConfig>,

    /// Prompt overrides keyed by task type name.
    #[serde(default)]
    pub prompts: HashMap<String, Vec<String>>,
}

impl CliConfig {
    /// Load from `path`, or return defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            debug!("No config file given, using defaults");
            return Ok(Self::default());
        };
        debug!(path = %path.display(), "Loading config");
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    /// Analysis settings. Priority: config file > `TIDE_*` env > defaults.
    pub fn resolve_analysis(&self) -> Result<AnalysisConfig> {
        let config = match &self.analysis {
            Some(c) => c.clone(),
            None => AnalysisConfig::from_env(),
        };
        config.validate().context("invalid analysis config")?;
        Ok(config)
    }

    /// Default catalog with this file's prompt overrides applied.
    pub fn task_catalog(&self) -> TaskCatalog {
        let mut catalog = TaskCatalog::default();
        let mut names: Vec<&String> = self.prompts.keys().collect();
        names.sort();
        for name in names {
            match name.parse::<TaskType>() {
                Ok(task) => catalog.override_prompts(task, self.prompts[name].clone()),
                Err(e) => warn!(task = %name, error = %e, "ignoring prompts for unknown task type"),
            }
        }
        catalog
    }
}
