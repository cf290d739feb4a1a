//! Loading JSON records from a file or a directory tree.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

/// Outcome of loading a single file.
#[derive(Debug)]
pub struct LoadResult {
    /// Path to the file that was loaded.
    pub path: PathBuf,
    /// Status of the load attempt.
    pub status: LoadStatus,
}

/// Status of a single file load attempt.
#[derive(Debug, PartialEq)]
pub enum LoadStatus {
    /// File parsed; `records` items kept, `rejected` array items dropped.
    Loaded { records: usize, rejected: usize },
    /// File was skipped (dotfile, non-JSON, etc.).
    Skipped { reason: String },
    /// Read or parse error occurred.
    Failed { error: String },
}

/// Records from every readable file plus a per-file report.
#[derive(Debug)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub results: Vec<LoadResult>,
}

impl<T> Loaded<T> {
    pub fn failed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.status, LoadStatus::Failed { .. }))
            .count()
    }
}

/// Load records from `input`: a JSON file holding one object or an array of
/// objects, or a directory scanned recursively (sorted by path) for such
/// files. Per-file failures are reported, never fatal.
pub fn load_records<T: DeserializeOwned>(input: &Path) -> Result<Loaded<T>> {
    if !input.exists() {
        bail!("input not found: {}", input.display());
    }

    let mut files: Vec<PathBuf> = Vec::new();
    let mut results = Vec::new();

    if input.is_dir() {
        for entry in walkdir::WalkDir::new(input)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if let Some(reason) = skip_reason(path) {
                results.push(LoadResult {
                    path: path.to_path_buf(),
                    status: LoadStatus::Skipped { reason },
                });
                continue;
            }
            files.push(path.to_path_buf());
        }
        files.sort();
    } else {
        files.push(input.to_path_buf());
    }

    let mut records = Vec::new();
    for path in files {
        match load_file::<T>(&path) {
            Ok((mut items, rejected)) => {
                info!(path = %path.display(), records = items.len(), rejected, "loaded file");
                results.push(LoadResult {
                    path,
                    status: LoadStatus::Loaded {
                        records: items.len(),
                        rejected,
                    },
                });
                records.append(&mut items);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load file");
                results.push(LoadResult {
                    path,
                    status: LoadStatus::Failed {
                        error: format!("{e:#}"),
                    },
                });
            }
        }
    }

    Ok(Loaded { records, results })
}

fn skip_reason(path: &Path) -> Option<String> {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if name.starts_with('.') {
        return Some("dotfile".to_string());
    }
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if !is_json {
        return Some("not a JSON file".to_string());
    }
    None
}

/// Parse one file. Array items that fail to deserialize are dropped and
/// counted; a malformed top-level document fails the whole file.
fn load_file<T: DeserializeOwned>(path: &Path) -> Result<(Vec<T>, usize)> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("invalid JSON in {}", path.display()))?;

    match value {
        Value::Array(items) => {
            let mut records = Vec::with_capacity(items.len());
            let mut rejected = 0;
            for (idx, item) in items.into_iter().enumerate() {
                match serde_json::from_value(item) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        rejected += 1;
                        warn!(path = %path.display(), index = idx, error = %e, "skipping record");
                    }
                }
            }
            Ok((records, rejected))
        }
        other => {
            let record = serde_json::from_value(other)
                .with_context(|| format!("unexpected record shape in {}", path.display()))?;
            Ok((vec![record], 0))
        }
    }
}

/// Write `value` as pretty JSON, creating parent directories.
pub fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
