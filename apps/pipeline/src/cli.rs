use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "resume-pipeline")]
#[command(about = "Resume ingestion and vacancy matching pipeline", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the HTTP API (default).
    Serve,
    /// Consume fan-out messages for one unit.
    Worker {
        #[arg(value_enum)]
        unit: WorkerUnit,
        /// Target name to subscribe as; defaults to the configured target, then the unit name.
        #[arg(long)]
        target: Option<String>,
    },
    /// Run the extractor once on a storage event file ("-" for stdin).
    Extract {
        #[arg(long)]
        event: PathBuf,
    },
    /// Run the persister once on an extraction payload file.
    Persist {
        #[arg(long)]
        payload: PathBuf,
    },
    /// Run the matcher once. Without a payload the resume text is empty.
    Match {
        #[arg(long)]
        payload: Option<PathBuf>,
    },
    /// Run the batch matcher once against the latest stored resume.
    BatchMatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WorkerUnit {
    Persister,
    Matcher,
}

impl WorkerUnit {
    pub fn name(self) -> &'static str {
        match self {
            WorkerUnit::Persister => "persister",
            WorkerUnit::Matcher => "matcher",
        }
    }
}

/// Reads a whole input file, or stdin when the path is `-`.
pub fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read stdin")?;
        return Ok(input);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
