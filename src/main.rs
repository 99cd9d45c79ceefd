use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use knightfall::search::alphabeta::SearchParams;
use knightfall::search::eval::{EvalKind, EvalWeights};
use knightfall::uci::UciEngine;

#[derive(Parser, Debug)]
#[command(author, version, about = "Knightfall alpha-beta engine (UCI-style text protocol on stdin/stdout)")]
struct Args {
    /// Default search depth when `go` gives none
    #[arg(long)]
    depth: Option<u32>,

    /// JSON file with `search`, `weights` and `eval` sections
    #[arg(long)]
    config: Option<PathBuf>,

    /// Evaluator: standard, material or random
    #[arg(long)]
    eval: Option<EvalKind>,

    /// Seed for the random evaluator
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct EngineConfig {
    search: SearchParams,
    weights: EvalWeights,
    eval: EvalKind,
}

fn load_config(path: &PathBuf) -> Result<EngineConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    if let Some(d) = args.depth {
        cfg.search.depth = d;
    }
    if let Some(kind) = args.eval {
        cfg.eval = kind;
    }
    log::info!("starting with {:?} evaluator, {:?}", cfg.eval, cfg.search);

    let mut engine = UciEngine::new(cfg.eval.build(cfg.weights, args.seed), cfg.search);
    engine.run_loop()?;
    Ok(())
}
