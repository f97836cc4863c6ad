//! Offline viability scoring: reads a chart payload JSON file, applies a
//! preset or config file plus parameter overrides, prints the series as JSON.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use agroclima_core::payload::store_from_json;
use agroclima_core::{compute_series, compute_year, presets, ScoringConfig};
use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "viability", about = "Score ensemble viability curves from a metrics payload")]
struct Args {
    /// Payload JSON file (corn viability or cover-crop feasibility shape).
    #[arg(short, long)]
    input: PathBuf,

    /// Built-in scoring config: corn_viability or cover_crop_feasibility.
    #[arg(short, long, default_value = presets::CORN_VIABILITY, conflicts_with = "config")]
    preset: String,

    /// Scoring config JSON file, used instead of a preset.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override a threshold parameter, e.g. `--set sowing=120`. Repeatable.
    #[arg(short = 's', long = "set", value_name = "NAME=VALUE")]
    overrides: Vec<String>,

    /// Only score this year.
    #[arg(short, long)]
    year: Option<i32>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,

    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(short, long)]
    verbose: bool,
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn parse_override(raw: &str) -> Result<(&str, f64)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("override {raw:?} is not NAME=VALUE"))?;
    let value: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("override {raw:?} has a non-numeric value"))?;
    Ok((name.trim(), value))
}

fn load_config(args: &Args) -> Result<ScoringConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = read(path)?;
            serde_json::from_str(&text)
                .with_context(|| format!("Invalid scoring config: {}", path.display()))?
        }
        None => presets::by_name(&args.preset)?,
    };
    for raw in &args.overrides {
        let (name, value) = parse_override(raw)?;
        config = config.with_parameter(name, value)?;
    }
    Ok(config)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    Ok(if pretty { serde_json::to_string_pretty(value)? } else { serde_json::to_string(value)? })
}

// ── Main ─────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let store = store_from_json(&read(&args.input)?)
        .with_context(|| format!("Cannot load metrics from {}", args.input.display()))?;
    let config = load_config(&args)?;
    info!(
        config = config.name(),
        years = store.years().len(),
        members = store.members().len(),
        "scoring"
    );

    let out = match args.year {
        Some(year) => {
            if !store.years().contains(&year) {
                bail!("year {year} is not in the dataset");
            }
            to_json(&compute_year(&store, &config, year), args.pretty)?
        }
        None => to_json(&compute_series(&store, &config), args.pretty)?,
    };
    println!("{out}");

    Ok(())
}
