//! Attack detection: is a square attacked, and by which pieces.

use crate::bitboard::Bitboard;
use crate::board::{Color, PieceKind, Position, Square};
use crate::error::{ChessError, ChessResult};
use crate::movegen::{DIAGONAL, KING_STEPS, KNIGHT_JUMPS, ORTHOGONAL};

/// Nearest occupied square along a ray, if any.
fn first_piece(pos: &Position, from: Square, df: i8, dr: i8) -> Option<Square> {
    let occupied = pos.occupied();
    let mut cur = from;
    while let Some(next) = cur.offset(df, dr) {
        if occupied.contains(next) {
            return Some(next);
        }
        cur = next;
    }
    None
}

/// Every `attacker` piece that attacks `sq`. The square itself may be empty.
pub fn attackers(pos: &Position, sq: Square, attacker: Color) -> Bitboard {
    let mut out = Bitboard::EMPTY;
    let is = |s: Square, kinds: &[PieceKind]| {
        pos.piece_at(s).is_some_and(|p| p.color == attacker && kinds.contains(&p.kind))
    };

    for &(df, dr) in &ORTHOGONAL {
        if let Some(s) = first_piece(pos, sq, df, dr) {
            if is(s, &[PieceKind::Rook, PieceKind::Queen]) {
                out.set(s);
            }
        }
    }
    for &(df, dr) in &DIAGONAL {
        if let Some(s) = first_piece(pos, sq, df, dr) {
            if is(s, &[PieceKind::Bishop, PieceKind::Queen]) {
                out.set(s);
            }
        }
    }
    for &(df, dr) in &KNIGHT_JUMPS {
        if let Some(s) = sq.offset(df, dr) {
            if is(s, &[PieceKind::Knight]) {
                out.set(s);
            }
        }
    }
    for &(df, dr) in &KING_STEPS {
        if let Some(s) = sq.offset(df, dr) {
            if is(s, &[PieceKind::King]) {
                out.set(s);
            }
        }
    }
    // an attacking pawn stands one rank behind the target, seen from its own side
    for df in [-1, 1] {
        if let Some(s) = sq.offset(df, -attacker.forward()) {
            if is(s, &[PieceKind::Pawn]) {
                out.set(s);
            }
        }
    }
    out
}

pub fn is_attacked_by(pos: &Position, sq: Square, attacker: Color) -> bool {
    !attackers(pos, sq, attacker).is_empty()
}

/// Whether the piece on `sq` is attacked by the opposing side.
pub fn is_attacked(pos: &Position, sq: Square) -> ChessResult<bool> {
    let piece = pos.piece_at(sq).ok_or_else(|| ChessError::EmptySquare(sq.to_string()))?;
    Ok(is_attacked_by(pos, sq, piece.color.other()))
}

/// Pieces currently giving check to `color`'s king.
pub fn checkers(pos: &Position, color: Color) -> Bitboard {
    match pos.king_square(color) {
        Some(k) => attackers(pos, k, color.other()),
        None => Bitboard::EMPTY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn rook_attack_is_blocked_by_any_piece() {
        let pos = Position::from_fen("4k3/8/8/8/r3P2K/8/8/8 w - - 0 1").unwrap();
        assert!(!is_attacked(&pos, sq("h4")).unwrap());
        assert!(is_attacked(&pos, sq("e4")).unwrap());
    }

    #[test]
    fn pawn_attacks_point_forward_only() {
        // black pawn on d5 hits c4 and e4, never c6/e6
        let pos = Position::from_fen("4k3/8/8/3p4/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(is_attacked_by(&pos, sq("e4"), Color::Black));
        assert!(is_attacked_by(&pos, sq("c4"), Color::Black));
        assert!(!is_attacked_by(&pos, sq("e6"), Color::Black));
        assert!(!is_attacked_by(&pos, sq("d4"), Color::Black));
    }

    #[test]
    fn knight_and_king_adjacency() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/N3K3 w - - 0 1").unwrap();
        assert!(is_attacked_by(&pos, sq("b3"), Color::White));
        assert!(is_attacked_by(&pos, sq("d2"), Color::White));
        assert!(!is_attacked_by(&pos, sq("a8"), Color::White));
        // h-file knight must not wrap onto the a-file
        let pos = Position::from_fen("4k3/8/8/8/8/7N/8/4K3 w - - 0 1").unwrap();
        assert!(!is_attacked_by(&pos, sq("a2"), Color::White));
        assert!(!is_attacked_by(&pos, sq("a4"), Color::White));
    }

    #[test]
    fn checkers_lists_every_checking_piece() {
        // double check from rook e1 and knight f6
        let pos = Position::from_fen("4k3/8/5N2/8/8/8/8/4R1K1 b - - 0 1").unwrap();
        let c: Vec<String> = checkers(&pos, Color::Black).map(|s| s.to_string()).collect();
        assert_eq!(c.len(), 2);
        assert!(c.contains(&"e1".to_string()));
        assert!(c.contains(&"f6".to_string()));
        assert!(checkers(&pos, Color::White).is_empty());
    }

    #[test]
    fn empty_square_is_an_error() {
        let pos = Position::startpos();
        assert!(is_attacked(&pos, sq("e4")).is_err());
    }
}
