mod cli;
mod config;
mod loader;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};

use tide_compute::{BatchEntry, CrossSessionAggregator, Pipeline, RawSession, ResponseScorer};
use tide_core::{config::load_dotenv, AnalysisConfig, SessionRecord, TaskType};

use crate::cli::{CliArgs, Command};
use crate::config::CliConfig;
use crate::loader::{load_records, write_json, LoadStatus, Loaded};

const SESSIONS_FILE: &str = "all_sessions.json";
const CROSS_ANALYSIS_FILE: &str = "cross_analysis.json";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    load_dotenv();
    let args = CliArgs::parse();

    let config = CliConfig::load(args.config.as_deref()).context("failed to load configuration")?;

    match args.command {
        Command::Score {
            input,
            output,
            model,
        } => score(&input, &output, model),
        Command::Analyze { input, output } => {
            let analysis = config.resolve_analysis()?;
            analysis.log_summary();
            analyze(&input, &output, analysis)
        }
        Command::Aggregate { input, output } => {
            let analysis = config.resolve_analysis()?;
            analysis.log_summary();
            aggregate(&input, &output, analysis)
        }
        Command::Prompts { task } => print_prompts(&config, task.as_deref()),
    }
}

fn score(input: &Path, output: &Path, model: Option<String>) -> Result<()> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read transcript: {}", input.display()))?;
    let mut raw: RawSession = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse transcript: {}", input.display()))?;
    if let Some(model) = model {
        raw.model = model;
    }

    let scorer: ResponseScorer = ResponseScorer::default();
    let session = scorer
        .score_session(&raw)
        .with_context(|| format!("cannot score transcript: {}", input.display()))?;

    write_json(output, &session)?;
    info!(
        model = %session.model,
        responses = session.response_count(),
        output = %output.display(),
        "scored transcript"
    );
    Ok(())
}

fn report_load<T>(loaded: &Loaded<T>, kind: &str) {
    for result in &loaded.results {
        match &result.status {
            LoadStatus::Failed { error } => {
                warn!(path = %result.path.display(), error = %error, "input file not loaded")
            }
            LoadStatus::Skipped { reason } => {
                debug!(path = %result.path.display(), reason = %reason, "input file skipped")
            }
            LoadStatus::Loaded { .. } => {}
        }
    }
    info!(
        records = loaded.records.len(),
        files = loaded.results.len(),
        failed = loaded.failed(),
        kind,
        "input loaded"
    );
}

fn analyze(input: &Path, output_dir: &Path, config: AnalysisConfig) -> Result<()> {
    let loaded: Loaded<SessionRecord> = load_records(input)?;
    report_load(&loaded, "sessions");

    let mut pipeline = Pipeline::new(config);
    let report = pipeline.run(&loaded.records);

    write_json(&output_dir.join(SESSIONS_FILE), &report.entries)?;
    write_json(&output_dir.join(CROSS_ANALYSIS_FILE), &report.cross_analysis)?;

    let metrics = serde_json::to_string(&pipeline.metrics).unwrap_or_default();
    info!(metrics = %metrics, output = %output_dir.display(), "analysis written");
    Ok(())
}

fn aggregate(input: &Path, output: &Path, config: AnalysisConfig) -> Result<()> {
    let loaded: Loaded<BatchEntry> = load_records(input)?;
    report_load(&loaded, "batch entries");

    let cross = CrossSessionAggregator::new(config).aggregate(&loaded.records);
    write_json(output, &cross)?;
    info!(output = %output.display(), "cross-session analysis written");
    Ok(())
}

fn print_prompts(config: &CliConfig, task: Option<&str>) -> Result<()> {
    let catalog = config.task_catalog();
    let filter = task
        .map(|t| t.parse::<TaskType>())
        .transpose()
        .context("invalid --task")?;

    for task_type in catalog.task_types() {
        if filter.is_some_and(|f| f != task_type) {
            continue;
        }
        println!("[{}]", task_type);
        for prompt in catalog.prompts(task_type) {
            println!("  - {}", prompt);
        }
    }
    Ok(())
}
