//! Legal move filtering and game-end classification.
//!
//! Each pseudo-legal candidate is applied to a scratch copy and rejected if it leaves
//! the mover's own king attacked. This one mechanism covers pins, king steps into
//! attacked squares and evasions. Castling additionally needs the king's origin and
//! transit squares to be safe.

use serde::{Deserialize, Serialize};

use crate::attacks::is_attacked_by;
use crate::bitboard::Bitboard;
use crate::board::{Move, PieceKind, Position, Square};
use crate::error::{ChessError, ChessResult};
use crate::movegen;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    Ongoing,
    Checkmate,
    Stalemate,
}

fn is_castle(pos: &Position, mv: Move) -> bool {
    pos.piece_at(mv.from).is_some_and(|p| p.kind == PieceKind::King) && mv.from.file().abs_diff(mv.to.file()) == 2
}

/// True if `mv` (pseudo-legal in `pos`) does not leave the mover's king attacked.
pub(crate) fn is_legal(pos: &Position, mv: Move) -> bool {
    let us = pos.side_to_move();
    let them = us.other();
    if is_castle(pos, mv) {
        let step = if mv.to.file() > mv.from.file() { 1 } else { -1 };
        let transit = mv.from.offset(step, 0);
        if is_attacked_by(pos, mv.from, them) || transit.map_or(true, |t| is_attacked_by(pos, t, them)) {
            return false;
        }
    }
    let next = pos.child(mv);
    next.king_square(us).is_some_and(|k| !is_attacked_by(&next, k, them))
}

pub fn legal_moves_into(pos: &Position, out: &mut Vec<Move>) {
    let start = out.len();
    movegen::pseudo_legal_moves_into(pos, out);
    let mut keep = start;
    for i in start..out.len() {
        let mv = out[i];
        if is_legal(pos, mv) {
            out[keep] = mv;
            keep += 1;
        }
    }
    out.truncate(keep);
}

/// All legal moves for the side to move.
pub fn legal_moves(pos: &Position) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    legal_moves_into(pos, &mut moves);
    moves
}

/// Legal destinations of the piece on `sq`, which must belong to the side to move.
pub fn legal_moves_from(pos: &Position, sq: Square) -> ChessResult<Bitboard> {
    let piece = pos.piece_at(sq).ok_or_else(|| ChessError::EmptySquare(sq.to_string()))?;
    if piece.color != pos.side_to_move() {
        return Ok(Bitboard::EMPTY);
    }
    let mut moves = Vec::with_capacity(32);
    movegen::moves_from_into(pos, sq, &mut moves);
    Ok(moves.into_iter().filter(|&m| is_legal(pos, m)).fold(Bitboard::EMPTY, |bb, m| bb.with(m.to)))
}

pub fn has_legal_move(pos: &Position) -> bool {
    let mut moves = Vec::with_capacity(64);
    movegen::pseudo_legal_moves_into(pos, &mut moves);
    moves.into_iter().any(|m| is_legal(pos, m))
}

pub fn terminal_status(pos: &Position) -> GameStatus {
    if has_legal_move(pos) {
        GameStatus::Ongoing
    } else if pos.in_check(pos.side_to_move()) {
        GameStatus::Checkmate
    } else {
        GameStatus::Stalemate
    }
}

/// Plays `mv` if it is legal in `pos`.
pub fn play(pos: &Position, mv: Move) -> ChessResult<Position> {
    let next = pos.apply(mv)?;
    if next.in_check(pos.side_to_move()) || (is_castle(pos, mv) && !is_legal(pos, mv)) {
        return Err(ChessError::IllegalMove(mv.to_string()));
    }
    Ok(next)
}

/// Plays a move given as text (`e2e4`, `e7e8q`).
pub fn play_text(pos: &Position, text: &str) -> ChessResult<Position> {
    play(pos, Move::parse(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn pinned_piece_cannot_leave_the_pin_line() {
        // white bishop e2 pinned by rook e8 against king e1
        let pos = Position::from_fen("4r1k1/8/8/8/8/8/4B3/4K3 w - - 0 1").unwrap();
        assert!(legal_moves_from(&pos, sq("e2")).unwrap().is_empty());
        assert!(legal_moves(&pos).iter().all(|m| m.from != sq("e2")));
    }

    #[test]
    fn king_cannot_step_into_attack() {
        let pos = Position::from_fen("3r2k1/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let dests = legal_moves_from(&pos, sq("e1")).unwrap();
        assert!(!dests.contains(sq("d1")));
        assert!(!dests.contains(sq("d2")));
        assert!(dests.contains(sq("e2")));
    }

    #[test]
    fn cannot_castle_out_of_or_through_check() {
        // rook f8 covers f1: no kingside castle, queenside still fine
        let pos = Position::from_fen("5rk1/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let dests = legal_moves_from(&pos, sq("e1")).unwrap();
        assert!(!dests.contains(sq("g1")));
        assert!(dests.contains(sq("c1")));
        // in check: neither side
        let pos = Position::from_fen("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let dests = legal_moves_from(&pos, sq("e1")).unwrap();
        assert!(!dests.contains(sq("g1")));
        assert!(!dests.contains(sq("c1")));
        // b1 attacked does not stop queenside castling
        let pos = Position::from_fen("1r4k1/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        assert!(legal_moves_from(&pos, sq("e1")).unwrap().contains(sq("c1")));
    }

    #[test]
    fn play_rejects_self_check_and_accepts_legal() {
        let pos = Position::from_fen("4r1k1/8/8/8/8/8/4B3/4K3 w - - 0 1").unwrap();
        assert!(matches!(play_text(&pos, "e2d3"), Err(ChessError::IllegalMove(_))));
        assert!(play_text(&pos, "e1d1").is_ok());
        assert!(matches!(play_text(&pos, "a1a2"), Err(ChessError::InvalidMove { .. })));
    }

    #[test]
    fn status_is_ongoing_at_start() {
        assert_eq!(terminal_status(&Position::startpos()), GameStatus::Ongoing);
        assert_eq!(legal_moves(&Position::startpos()).len(), 20);
    }
}
