use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use knightfall::pgn::PgnTags;
use knightfall::search::eval::EvalKind;
use knightfall::selfplay::{play_game, GameConfig, PlayerConfig};
use knightfall::Position;

#[derive(Parser, Debug)]
#[command(name = "knightfall-selfplay", about = "Play engine-vs-engine games and write them as JSON lines or PGN")]
struct Args {
    #[arg(long, default_value_t = 1)]
    games: usize,
    /// JSON game configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    white_depth: Option<u32>,
    #[arg(long)]
    black_depth: Option<u32>,
    /// Evaluator for White: standard, material or random
    #[arg(long)]
    white_eval: Option<EvalKind>,
    #[arg(long)]
    black_eval: Option<EvalKind>,
    #[arg(long)]
    max_plies: Option<usize>,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Starting FEN (defaults to the initial position)
    #[arg(long)]
    fen: Option<String>,
    /// Output file; stdout when absent
    #[arg(long)]
    out: Option<PathBuf>,
    /// Also write every game as PGN to this file
    #[arg(long)]
    pgn: Option<PathBuf>,
}

fn player_name(p: &PlayerConfig) -> String {
    format!("knightfall {:?} depth {}", p.eval, p.depth).to_lowercase()
}

fn main() -> Result<()> {
    env_logger::init();
    let a = Args::parse();

    let mut cfg: GameConfig = match &a.config {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => GameConfig::default(),
    };
    if let Some(d) = a.white_depth {
        cfg.white.depth = d;
    }
    if let Some(d) = a.black_depth {
        cfg.black.depth = d;
    }
    if let Some(e) = a.white_eval {
        cfg.white.eval = e;
    }
    if let Some(e) = a.black_eval {
        cfg.black.eval = e;
    }
    if let Some(n) = a.max_plies {
        cfg.max_plies = n;
    }
    let start = match &a.fen {
        Some(fen) => Position::from_fen(fen).with_context(|| format!("invalid FEN '{fen}'"))?,
        None => Position::startpos(),
    };

    let mut out: Box<dyn Write> = match &a.out {
        Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| format!("creating {}", path.display()))?)),
        None => Box::new(std::io::stdout().lock()),
    };

    let mut pgn_out = match &a.pgn {
        Some(path) => Some(BufWriter::new(File::create(path).with_context(|| format!("creating {}", path.display()))?)),
        None => None,
    };

    let pb = ProgressBar::new(a.games as u64);
    pb.set_style(ProgressStyle::with_template("{bar:40} {pos}/{len} games {msg}").context("progress template")?);
    for gi in 0..a.games {
        let mut game_cfg = cfg.clone();
        game_cfg.white.seed = a.seed.wrapping_add(2 * gi as u64);
        game_cfg.black.seed = a.seed.wrapping_add(2 * gi as u64 + 1);
        let record = play_game(&start, &game_cfg);
        pb.println(format!("game {}: {} ({:?}) {}", gi + 1, record.result, record.termination, record.moves.join(" ")));
        serde_json::to_writer(&mut out, &record)?;
        writeln!(out)?;
        if let Some(w) = pgn_out.as_mut() {
            let tags = PgnTags {
                round: (gi + 1).to_string(),
                white: player_name(&game_cfg.white),
                black: player_name(&game_cfg.black),
                ..PgnTags::default()
            };
            let text = record.to_pgn(&tags).with_context(|| format!("rendering game {} as PGN", gi + 1))?;
            writeln!(w, "{text}")?;
        }
        pb.inc(1);
    }
    pb.finish_with_message("done");
    out.flush()?;
    if let Some(mut w) = pgn_out {
        w.flush()?;
    }
    Ok(())
}
