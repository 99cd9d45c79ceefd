use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use knightfall::search::alphabeta::{SearchParams, Searcher};
use knightfall::search::eval::{EvalKind, EvalWeights};
use knightfall::Position;

#[derive(Parser, Debug)]
#[command(name = "knightfall-bench", version, about = "Benchmark Knightfall search speed")]
struct Args {
    /// FEN string or 'startpos'
    #[arg(long, default_value = "startpos")]
    fen: String,

    /// Threads
    #[arg(long, default_value_t = 1)]
    threads: usize,

    /// Movetime in milliseconds (ignored if depth is set)
    #[arg(long, default_value_t = 1000)]
    movetime: u64,

    /// Fixed search depth (overrides movetime when > 0)
    #[arg(long, default_value_t = 0)]
    depth: u32,

    /// Disable static-eval move ordering
    #[arg(long, default_value_t = false)]
    no_ordering: bool,

    /// Evaluator: standard, material or random
    #[arg(long, default_value = "standard")]
    eval: EvalKind,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let pos = if args.fen == "startpos" {
        Position::startpos()
    } else {
        Position::from_fen(&args.fen).with_context(|| format!("invalid FEN '{}'", args.fen))?
    };

    let mut p = SearchParams::default();
    p.threads = args.threads.max(1);
    p.order_moves = !args.no_ordering;
    if args.depth > 0 {
        p.depth = args.depth;
    } else {
        p.depth = 64;
        p.movetime = Some(Duration::from_millis(args.movetime));
    }
    let mut s = Searcher::with_params(args.eval.build(EvalWeights::default(), 0), p);

    let t0 = Instant::now();
    let res = if args.threads > 1 {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(args.threads).build().context("thread pool")?;
        pool.install(|| s.search_with_params(&pos, p))
    } else {
        s.search_with_params(&pos, p)
    };
    let dt = t0.elapsed();
    let nps = if dt.as_secs_f64() > 0.0 { res.nodes as f64 / dt.as_secs_f64() } else { 0.0 };
    println!(
        "bestmove={} score={} depth={} nodes={} elapsed={:.3}s nps={:.1}",
        res.bestmove_uci().unwrap_or_else(|| "(none)".to_string()),
        res.score,
        res.depth,
        res.nodes,
        dt.as_secs_f64(),
        nps
    );
    Ok(())
}
