//! Developer CLI for the update engine.
//!
//! Diffs two snapshot files with the same rules the engine applies to
//! view-model state, and manages `engine.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use engine::Snapshot;
use engine::core::diff::diff;
use engine::exit_codes;
use engine::io::config::{EngineConfig, load_config, write_config};
use serde_json::Value;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "engine",
    version,
    about = "Component update engine tooling"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the fields of CURRENT that changed relative to ORIGINAL.
    ///
    /// Exits 0 when nothing changed and 2 when at least one field did.
    Diff {
        /// Snapshot before the action (JSON object).
        original: PathBuf,
        /// Snapshot after the action (JSON object).
        current: PathBuf,
    },
    /// Validate and print the effective engine config.
    Config {
        #[arg(long, default_value = "engine.toml")]
        path: PathBuf,
        /// Write the default config to PATH (overwrites).
        #[arg(long)]
        init: bool,
    },
}

fn main() {
    engine::logging::init("warn");
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Diff { original, current } => cmd_diff(&original, &current),
        Command::Config { path, init } => cmd_config(&path, init),
    }
}

fn cmd_diff(original: &Path, current: &Path) -> Result<i32> {
    let original = read_snapshot(original)?;
    let current = read_snapshot(current)?;
    let changes = diff(&original, &current);
    debug!(changed = changes.len(), "diff computed");

    println!("{}", serde_json::to_string_pretty(&changes)?);
    Ok(if changes.is_empty() {
        exit_codes::OK
    } else {
        exit_codes::CHANGED
    })
}

fn cmd_config(path: &Path, init: bool) -> Result<i32> {
    let cfg = if init {
        let cfg = EngineConfig::default();
        write_config(path, &cfg)?;
        cfg
    } else {
        load_config(path)?
    };
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config toml")?);
    Ok(exit_codes::OK)
}

fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read snapshot {}", path.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("parse snapshot {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => bail!("snapshot {} must be a JSON object", path.display()),
    }
}
