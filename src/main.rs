//! realpolitik-history: replays moderator transcripts into turn histories.
//!
//! Each file is reconstructed independently; results are printed in
//! argument order and any failure makes the process exit non-zero.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rayon::prelude::*;

use realpolitik_history::config::ReplayConfig;
use realpolitik_history::protocol::encode_dfen;
use realpolitik_history::replay::{Reconstructor, World};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One line per turn state
    Summary,
    /// One JSON object per transcript
    Json,
}

#[derive(Parser)]
#[command(name = "realpolitik-history")]
#[command(about = "Reconstruct Diplomacy games from moderator transcripts")]
struct Cli {
    /// JSON config file (initial position, victory threshold, rule options)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Summary)]
    format: Format,

    /// Transcript files
    #[arg(required = true, value_name = "FILES")]
    files: Vec<PathBuf>,
}

fn reconstruct_file(reconstructor: &Reconstructor, path: &Path) -> Result<World> {
    let text = fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    reconstructor
        .reconstruct(&text)
        .with_context(|| format!("cannot reconstruct {}", path.display()))
}

fn render(path: &Path, world: &World, format: Format) -> Result<String> {
    match format {
        Format::Json => Ok(serde_json::to_string(&world.summary())?),
        Format::Summary => {
            let mut out = format!("{}:", path.display());
            for turn in &world.turns {
                let flags = match (turn.resolved, turn.ended) {
                    (_, true) => "ended",
                    (true, false) => "resolved",
                    (false, false) => "pending",
                };
                let owners = if turn.sc_owner_changed { " sc" } else { "" };
                out.push_str(&format!(
                    "\n  {:<26} {flags:<8}{owners:<3} {:>3} orders  {}",
                    turn.phase.to_string(),
                    turn.orders.len(),
                    encode_dfen(turn.phase, &turn.position)
                ));
            }
            Ok(out)
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match ReplayConfig::load(path).with_context(|| format!("config {}", path.display())) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: {e:#}");
                return ExitCode::FAILURE;
            }
        },
        None => ReplayConfig::default(),
    };
    let reconstructor = Reconstructor::new(config);

    let outputs: Vec<Result<String>> = cli
        .files
        .par_iter()
        .map(|path| {
            let world = reconstruct_file(&reconstructor, path)?;
            render(path, &world, cli.format)
        })
        .collect();

    let mut failed = 0;
    for output in outputs {
        match output {
            Ok(text) => println!("{text}"),
            Err(e) => {
                failed += 1;
                eprintln!("error: {e:#}");
            }
        }
    }
    if failed > 0 {
        log::warn!("{failed} of {} transcripts failed", cli.files.len());
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
