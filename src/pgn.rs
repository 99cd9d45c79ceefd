//! Standard algebraic notation and PGN export.

use std::fmt::Write;

use crate::board::{Color, Move, PieceKind, Position, STARTPOS_FEN};
use crate::error::ChessResult;
use crate::legal::{legal_moves, play, terminal_status, GameStatus};

fn file_char(file: u8) -> char {
    (b'a' + file) as char
}

fn rank_char(rank: u8) -> char {
    (b'1' + rank) as char
}

/// SAN text of `mv`, which must be legal in `pos`.
pub fn san(pos: &Position, mv: Move) -> String {
    let Some(piece) = pos.piece_at(mv.from) else {
        return mv.to_string();
    };
    let mut s = String::new();
    if piece.kind == PieceKind::King && mv.from.file().abs_diff(mv.to.file()) == 2 {
        s.push_str(if mv.to.file() > mv.from.file() { "O-O" } else { "O-O-O" });
    } else {
        let capture = pos.piece_at(mv.to).is_some() || (piece.kind == PieceKind::Pawn && pos.en_passant() == Some(mv.to));
        if piece.kind == PieceKind::Pawn {
            if capture {
                s.push(file_char(mv.from.file()));
            }
        } else {
            s.push(piece.kind.letter().to_ascii_uppercase());
            // other pieces of the same kind that can also reach the target
            let rivals: Vec<_> = legal_moves(pos)
                .into_iter()
                .filter(|m| m.to == mv.to && m.from != mv.from)
                .filter(|m| pos.piece_at(m.from) == Some(piece))
                .map(|m| m.from)
                .collect();
            if !rivals.is_empty() {
                let shares_file = rivals.iter().any(|r| r.file() == mv.from.file());
                let shares_rank = rivals.iter().any(|r| r.rank() == mv.from.rank());
                if !shares_file {
                    s.push(file_char(mv.from.file()));
                } else if !shares_rank {
                    s.push(rank_char(mv.from.rank()));
                } else {
                    s.push(file_char(mv.from.file()));
                    s.push(rank_char(mv.from.rank()));
                }
            }
        }
        if capture {
            s.push('x');
        }
        s.push_str(&mv.to.to_string());
        if let Some(k) = mv.promo {
            s.push('=');
            s.push(k.letter().to_ascii_uppercase());
        }
    }

    let next = pos.child(mv);
    if next.in_check(next.side_to_move()) {
        s.push(if terminal_status(&next) == GameStatus::Checkmate { '#' } else { '+' });
    }
    s
}

/// Header values for [`write_pgn`]. Unknown values use the PGN placeholder `?`.
#[derive(Clone, Debug)]
pub struct PgnTags {
    pub event: String,
    pub site: String,
    pub date: String,
    pub round: String,
    pub white: String,
    pub black: String,
}

impl Default for PgnTags {
    fn default() -> Self {
        Self {
            event: "Knightfall selfplay".into(),
            site: "?".into(),
            date: "????.??.??".into(),
            round: "?".into(),
            white: "?".into(),
            black: "?".into(),
        }
    }
}

/// Replays `moves` (coordinate text) from `start` and renders the game as PGN.
/// Fails on the first move that is not legal.
pub fn write_pgn(start: &Position, moves: &[String], result: &str, tags: &PgnTags) -> ChessResult<String> {
    let mut out = String::new();
    let mut tag = |name: &str, value: &str| {
        let _ = writeln!(out, "[{name} \"{}\"]", value.replace('\\', "\\\\").replace('"', "\\\""));
    };
    tag("Event", &tags.event);
    tag("Site", &tags.site);
    tag("Date", &tags.date);
    tag("Round", &tags.round);
    tag("White", &tags.white);
    tag("Black", &tags.black);
    tag("Result", result);
    let fen = start.to_fen();
    if fen != STARTPOS_FEN {
        tag("SetUp", "1");
        tag("FEN", &fen);
    }
    out.push('\n');

    let mut tokens = Vec::with_capacity(moves.len() * 3 / 2 + 1);
    let mut pos = start.clone();
    for (i, text) in moves.iter().enumerate() {
        let mv = Move::parse(text)?;
        let number = pos.fullmove_number();
        match pos.side_to_move() {
            Color::White => tokens.push(format!("{number}.")),
            Color::Black if i == 0 => tokens.push(format!("{number}...")),
            Color::Black => {}
        }
        let text = san(&pos, mv);
        pos = play(&pos, mv)?;
        tokens.push(text);
    }
    tokens.push(result.to_string());

    // movetext lines stay under 80 columns
    let mut line = String::new();
    for t in tokens {
        if !line.is_empty() && line.len() + 1 + t.len() > 79 {
            out.push_str(&line);
            out.push('\n');
            line.clear();
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&t);
    }
    out.push_str(&line);
    out.push('\n');
    Ok(out)
}
