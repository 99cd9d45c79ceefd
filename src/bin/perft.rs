use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use knightfall::perft::{perft, perft_divide, perft_parallel};
use knightfall::Position;

#[derive(clap::Parser, Debug)]
#[command(name = "perft", about = "Perft driver for Knightfall")]
struct Args {
    /// Search depth
    #[arg(value_name = "DEPTH")]
    depth: u32,
    /// FEN string or "startpos"
    #[arg(value_name = "FEN", default_value = "startpos")]
    fen: String,
    /// Print the leaf count under each root move
    #[arg(long, default_value_t = false)]
    divide: bool,
    /// Number of threads for root-split
    #[arg(long, default_value_t = 1)]
    threads: usize,
    /// Report elapsed time and NPS
    #[arg(long, default_value_t = false)]
    nps: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let base = if args.fen == "startpos" {
        Position::startpos()
    } else {
        Position::from_fen(&args.fen).with_context(|| format!("invalid FEN '{}'", args.fen))?
    };

    let t0 = Instant::now();
    let nodes = if args.divide {
        let split = perft_divide(&base, args.depth);
        for (mv, n) in &split {
            println!("{mv}: {n}");
        }
        split.iter().map(|(_, n)| n).sum()
    } else if args.threads > 1 {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(args.threads).build().context("thread pool")?;
        pool.install(|| perft_parallel(&base, args.depth))
    } else {
        perft(&base, args.depth)
    };
    let dt = t0.elapsed().as_secs_f64();

    if args.nps {
        println!("nodes: {nodes} elapsed: {:.3}s nps: {:.1}", dt, nodes as f64 / dt.max(f64::EPSILON));
    } else {
        println!("nodes: {nodes}");
    }
    Ok(())
}
