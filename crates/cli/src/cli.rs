use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Score, analyze and aggregate model evaluation sessions.
///
/// Input files are JSON. A session input may be a single object, an array
/// of objects, or a directory scanned recursively for `*.json` files.
#[derive(Parser, Debug)]
#[command(name = "tide", about = "Session analysis for model evaluation runs")]
pub struct CliArgs {
    /// Path to a TOML config file overriding analysis settings and prompts
    #[arg(long, global = true, env = "TIDE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score a raw transcript into a session record
    Score {
        /// Raw transcript JSON
        #[arg(long)]
        input: PathBuf,

        /// Where to write the scored session
        #[arg(long)]
        output: PathBuf,

        /// Override the transcript's model identifier
        #[arg(long)]
        model: Option<String>,
    },

    /// Analyze sessions and write batch entries plus the cross-session report
    Analyze {
        /// Session file or directory
        #[arg(long)]
        input: PathBuf,

        /// Output directory for all_sessions.json and cross_analysis.json
        #[arg(long)]
        output: PathBuf,
    },

    /// Aggregate previously analyzed batch entries
    Aggregate {
        /// Batch entry file or directory (e.g. checkpoints)
        #[arg(long)]
        input: PathBuf,

        /// Where to write the cross-session report
        #[arg(long)]
        output: PathBuf,
    },

    /// Print the configured prompt catalog
    Prompts {
        /// Only show one task type: concrete, internal or external
        #[arg(long)]
        task: Option<String>,
    },
}
