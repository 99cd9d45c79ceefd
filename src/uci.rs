//! Minimal UCI-style text front end.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use log::warn;

use crate::board::Position;
use crate::error::ChessResult;
use crate::legal::play_text;
use crate::search::alphabeta::{SearchParams, SearchResult, Searcher};
use crate::search::eval::{Evaluator, StandardEval};

pub struct UciEngine {
    pos: Position,
    searcher: Searcher<Box<dyn Evaluator>>,
    defaults: SearchParams,
}

impl Default for UciEngine {
    fn default() -> Self {
        Self::new(Box::new(StandardEval::default()), SearchParams::default())
    }
}

impl UciEngine {
    pub fn new(eval: Box<dyn Evaluator>, defaults: SearchParams) -> Self {
        Self { pos: Position::startpos(), searcher: Searcher::with_params(eval, defaults), defaults }
    }

    pub fn position(&self) -> &Position {
        &self.pos
    }

    fn cmd_uci(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "id name Knightfall {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(out, "id author Knightfall Team")?;
        writeln!(out, "uciok")
    }

    /// `startpos [moves ...]` or `fen <fields> [moves ...]`. On any error the current
    /// position is left untouched.
    fn cmd_position(&mut self, args: &str) {
        match parse_position(args) {
            Ok(p) => self.pos = p,
            Err(e) => warn!("ignoring 'position {args}': {e}"),
        }
    }

    fn cmd_go(&mut self, args: &str, out: &mut impl Write) -> io::Result<()> {
        let mut p = self.defaults;
        let mut tokens = args.split_whitespace();
        while let Some(tok) = tokens.next() {
            let value = tokens.next().unwrap_or("");
            let applied = match tok {
                "depth" => value.parse::<u32>().map(|d| p.depth = d).is_ok(),
                "movetime" => value.parse::<u64>().map(|t| p.movetime = Some(Duration::from_millis(t))).is_ok(),
                "nodes" => value.parse::<u64>().map(|n| p.max_nodes = Some(n)).is_ok(),
                _ => false,
            };
            if !applied {
                warn!("ignoring go argument '{tok} {value}'");
            }
        }
        let res = self.searcher.search_with_params(&self.pos, p);
        writeln!(out, "{}", info_line(&res, p.mate_score))?;
        match res.best_move {
            Some(m) => writeln!(out, "bestmove {m}"),
            None => writeln!(out, "bestmove 0000"),
        }
    }

    /// Handles one command line. Returns `false` on `quit`.
    pub fn handle_line(&mut self, line: &str, out: &mut impl Write) -> io::Result<bool> {
        let line = line.trim();
        match line {
            "" => {}
            "uci" => self.cmd_uci(out)?,
            "isready" => writeln!(out, "readyok")?,
            "ucinewgame" => self.pos = Position::startpos(),
            "quit" => return Ok(false),
            "d" => writeln!(out, "{}\nfen {}", self.pos, self.pos.to_fen())?,
            "go" => self.cmd_go("", out)?,
            "stop" => {}
            _ => {
                if let Some(rest) = line.strip_prefix("position ") {
                    self.cmd_position(rest);
                } else if let Some(rest) = line.strip_prefix("go ") {
                    self.cmd_go(rest, out)?;
                } else {
                    warn!("unknown command '{line}'");
                }
            }
        }
        out.flush()?;
        Ok(true)
    }

    pub fn run_loop(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        for line in stdin.lock().lines() {
            if !self.handle_line(&line?, &mut stdout)? {
                break;
            }
        }
        Ok(())
    }
}

fn info_line(res: &SearchResult, mate_score: i32) -> String {
    let score = match res.mate_in(mate_score) {
        Some(0) => "mate 0".to_string(),
        Some(plies) if plies > 0 => format!("mate {}", (plies + 1) / 2),
        Some(plies) => format!("mate -{}", (-plies + 1) / 2),
        None => format!("cp {}", res.score),
    };
    format!("info depth {} score {} nodes {} time {}", res.depth, score, res.nodes, res.elapsed.as_millis())
}

pub fn parse_position(args: &str) -> ChessResult<Position> {
    let (head, moves) = match args.split_once(" moves") {
        Some((h, m)) => (h.trim(), m.split_whitespace().collect::<Vec<_>>()),
        None => (args.trim(), Vec::new()),
    };
    let mut pos = if head == "startpos" {
        Position::startpos()
    } else if let Some(fen) = head.strip_prefix("fen ") {
        Position::from_fen(fen.trim())?
    } else {
        Position::from_fen(head)?
    };
    for m in moves {
        pos = play_text(&pos, m)?;
    }
    Ok(pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(engine: &mut UciEngine, lines: &[&str]) -> String {
        let mut out = Vec::new();
        for l in lines {
            engine.handle_line(l, &mut out).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn handshake() {
        let out = run(&mut UciEngine::default(), &["uci", "isready"]);
        assert!(out.contains("uciok"));
        assert!(out.ends_with("readyok\n"));
    }

    #[test]
    fn position_with_moves() {
        let mut e = UciEngine::default();
        run(&mut e, &["position startpos moves e2e4 e7e5 g1f3"]);
        assert_eq!(e.position().to_fen(), "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2");
    }

    #[test]
    fn bad_position_keeps_previous() {
        let mut e = UciEngine::default();
        run(&mut e, &["position startpos moves e2e4", "position startpos moves e2e5"]);
        assert_eq!(e.position().side_to_move(), crate::board::Color::Black);
    }

    #[test]
    fn go_reports_bestmove() {
        let mut e = UciEngine::default();
        let out = run(&mut e, &["position fen 4k3/8/8/8/8/8/8/4K2R w K - 0 1", "go depth 1"]);
        assert!(out.contains("info depth 1"), "{out}");
        assert!(out.lines().last().unwrap().starts_with("bestmove "), "{out}");
    }

    #[test]
    fn small_mate_score_reports_centipawns() {
        let defaults = SearchParams { depth: 2, mate_score: 1000, ..SearchParams::default() };
        let mut e = UciEngine::new(Box::new(StandardEval::default()), defaults);
        // white is up a queen, so the static score is large but not a mate
        let out = run(&mut e, &["position fen 4k3/8/8/8/8/8/8/3QK3 w - - 0 1", "go"]);
        assert!(out.contains(" score cp "), "{out}");
        assert!(!out.contains("mate"), "{out}");
    }

    #[test]
    fn out_of_range_depth_is_ignored() {
        // 2^32 + 1 would wrap to depth 1 if narrowed
        let defaults = SearchParams { depth: 2, ..SearchParams::default() };
        let mut e = UciEngine::new(Box::new(StandardEval::default()), defaults);
        let out = run(&mut e, &["position startpos", "go depth 4294967297"]);
        assert!(out.starts_with("info depth 2 "), "{out}");
        let out = run(&mut e, &["go depth -3"]);
        assert!(out.starts_with("info depth 2 "), "{out}");
    }

    #[test]
    fn no_moves_reports_null_move() {
        let mut e = UciEngine::default();
        let out = run(&mut e, &["position fen 7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", "go depth 2"]);
        assert!(out.ends_with("bestmove 0000\n"), "{out}");
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut e = UciEngine::default();
        assert!(!e.handle_line("quit", &mut Vec::new()).unwrap());
    }
}
