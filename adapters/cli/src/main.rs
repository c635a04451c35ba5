#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Tilequest map through a scripted step loop.

mod config;
mod script;
mod session;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use script::Script;
use session::Session;

/// Loads a map, walks the actor through it and prints a summary.
#[derive(Debug, Parser)]
#[command(name = "tilequest", version, about)]
struct Args {
    /// Path to the map document in JSON format.
    map: PathBuf,
    /// Optional TOML file with `[actor]` and `[world]` settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Comma-separated inputs such as `R*30,D*4,E`.
    #[arg(long, default_value = "")]
    script: String,
}

/// Entry point for the Tilequest command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let script = Script::parse(&args.script).context("parsing --script")?;
    let map = fs::read_to_string(&args.map)
        .with_context(|| format!("reading map file {}", args.map.display()))?;

    let mut session = Session::load(&map, &config)?;
    info!(map = %args.map.display(), step_rate = config.step_rate, "session_started");
    let summary = session.run(&script);
    println!("{summary}");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
