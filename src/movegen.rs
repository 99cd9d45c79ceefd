//! Pseudo-legal move generation.
//!
//! Every rule walks board coordinates through [`Square::offset`], which rejects any
//! step off the 8x8 grid. Moves produced here may still leave the mover's king
//! attacked; [`crate::legal`] filters those out.

use crate::bitboard::Bitboard;
use crate::board::{CastlingRights, Color, Move, Piece, PieceKind, Position, Square};
use crate::error::{ChessError, ChessResult};

/// Rook rays as (file, rank) steps.
pub const ORTHOGONAL: [(i8, i8); 4] = [(0, 1), (0, -1), (-1, 0), (1, 0)];
/// Bishop rays.
pub const DIAGONAL: [(i8, i8); 4] = [(-1, 1), (1, 1), (-1, -1), (1, -1)];
pub const KING_STEPS: [(i8, i8); 8] = [(0, 1), (0, -1), (-1, 0), (1, 0), (-1, 1), (1, 1), (-1, -1), (1, -1)];
pub const KNIGHT_JUMPS: [(i8, i8); 8] = [(-1, 2), (-2, 1), (1, 2), (2, 1), (-1, -2), (-2, -1), (1, -2), (2, -1)];

/// Ray squares from `from`: empty squares and the first enemy piece, stopping before
/// friendly pieces and at the edge.
fn slide(pos: &Position, from: Square, us: Color, dirs: &[(i8, i8)]) -> Bitboard {
    let own = pos.occupancy(us);
    let theirs = pos.occupancy(us.other());
    let mut out = Bitboard::EMPTY;
    for &(df, dr) in dirs {
        let mut cur = from;
        while let Some(next) = cur.offset(df, dr) {
            if own.contains(next) {
                break;
            }
            out.set(next);
            if theirs.contains(next) {
                break;
            }
            cur = next;
        }
    }
    out
}

/// Single-step targets (knight jumps, king steps) not holding a friendly piece.
fn step(pos: &Position, from: Square, us: Color, offsets: &[(i8, i8)]) -> Bitboard {
    let own = pos.occupancy(us);
    let mut out = Bitboard::EMPTY;
    for &(df, dr) in offsets {
        if let Some(to) = from.offset(df, dr) {
            if !own.contains(to) {
                out.set(to);
            }
        }
    }
    out
}

fn pawn(pos: &Position, from: Square, us: Color) -> Bitboard {
    let occupied = pos.occupied();
    let fwd = us.forward();
    let mut out = Bitboard::EMPTY;
    if let Some(one) = from.offset(0, fwd) {
        if !occupied.contains(one) {
            out.set(one);
            if from.rank() == us.pawn_home_rank() {
                if let Some(two) = one.offset(0, fwd) {
                    if !occupied.contains(two) {
                        out.set(two);
                    }
                }
            }
        }
    }
    // en passant only belongs to the side about to move
    let ep = pos.en_passant().filter(|_| pos.side_to_move() == us);
    let theirs = pos.occupancy(us.other());
    for df in [-1, 1] {
        if let Some(to) = from.offset(df, fwd) {
            if theirs.contains(to) || ep == Some(to) {
                out.set(to);
            }
        }
    }
    out
}

/// Castling targets (king's two-file step). Requires the right, the rook at home and
/// every square strictly between king and rook empty. Attack conditions are checked
/// by the legality filter.
fn castling(pos: &Position, from: Square, us: Color) -> Bitboard {
    let home_rank = if us == Color::White { 0 } else { 7 };
    let mut out = Bitboard::EMPTY;
    if Square::from_coords(4, home_rank) != Some(from) {
        return out;
    }
    let rights = pos.castling();
    let rook = Some(Piece::new(us, PieceKind::Rook));
    let sides = [
        (CastlingRights::kingside_bit(us), 7u8, &[5u8, 6][..], 6u8),
        (CastlingRights::queenside_bit(us), 0u8, &[1u8, 2, 3][..], 2u8),
    ];
    for (bit, rook_file, between, king_to) in sides {
        if !rights.has(bit) {
            continue;
        }
        if Square::from_coords(rook_file, home_rank).and_then(|s| pos.piece_at(s)) != rook {
            continue;
        }
        let clear = between
            .iter()
            .all(|&f| Square::from_coords(f, home_rank).is_some_and(|s| pos.piece_at(s).is_none()));
        if clear {
            if let Some(to) = Square::from_coords(king_to, home_rank) {
                out.set(to);
            }
        }
    }
    out
}

/// Pseudo-legal destinations of whatever stands on `sq`; empty for an empty square.
pub(crate) fn destinations(pos: &Position, sq: Square) -> Bitboard {
    let Some(piece) = pos.piece_at(sq) else {
        return Bitboard::EMPTY;
    };
    let us = piece.color;
    match piece.kind {
        PieceKind::Rook => slide(pos, sq, us, &ORTHOGONAL),
        PieceKind::Bishop => slide(pos, sq, us, &DIAGONAL),
        PieceKind::Queen => slide(pos, sq, us, &KING_STEPS),
        PieceKind::Knight => step(pos, sq, us, &KNIGHT_JUMPS),
        PieceKind::King => step(pos, sq, us, &KING_STEPS) | castling(pos, sq, us),
        PieceKind::Pawn => pawn(pos, sq, us),
    }
}

/// Pseudo-legal destination set of the piece on `sq`.
///
/// Asking about an empty square is a caller bug and reported as
/// [`ChessError::EmptySquare`].
pub fn pseudo_legal_destinations(pos: &Position, sq: Square) -> ChessResult<Bitboard> {
    if pos.piece_at(sq).is_none() {
        return Err(ChessError::EmptySquare(sq.to_string()));
    }
    Ok(destinations(pos, sq))
}

/// Appends the moves of the piece on `from` to `out`, expanding each promotion into
/// one move per promotion piece.
pub(crate) fn moves_from_into(pos: &Position, from: Square, out: &mut Vec<Move>) {
    let Some(piece) = pos.piece_at(from) else { return };
    for to in destinations(pos, from) {
        if piece.kind == PieceKind::Pawn && to.rank() == piece.color.promotion_rank() {
            for kind in PieceKind::PROMOTIONS {
                out.push(Move::with_promo(from, to, kind));
            }
        } else {
            out.push(Move::new(from, to));
        }
    }
}

pub fn pseudo_legal_moves_into(pos: &Position, out: &mut Vec<Move>) {
    for from in pos.occupancy(pos.side_to_move()) {
        moves_from_into(pos, from, out);
    }
}

/// All pseudo-legal moves for the side to move.
pub fn pseudo_legal_moves(pos: &Position) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    pseudo_legal_moves_into(pos, &mut moves);
    moves
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn names(bb: Bitboard) -> Vec<String> {
        let mut v: Vec<String> = bb.map(|s| s.to_string()).collect();
        v.sort();
        v
    }

    #[test]
    fn startpos_has_twenty_pseudo_legal_moves() {
        assert_eq!(pseudo_legal_moves(&Position::startpos()).len(), 20);
    }

    #[test]
    fn knight_in_corner_has_two_jumps() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/N3K3 w - - 0 1").unwrap();
        assert_eq!(names(destinations(&pos, sq("a1"))), vec!["b3", "c2"]);
    }

    #[test]
    fn rook_on_h_file_does_not_wrap_to_a_file() {
        let pos = Position::from_fen("4k3/8/8/8/7R/8/8/4K3 w - - 0 1").unwrap();
        let d = destinations(&pos, sq("h4"));
        assert_eq!(d.popcount(), 14);
        assert!(!d.contains(sq("a5")));
        assert!(d.contains(sq("a4")));
    }

    #[test]
    fn slider_stops_on_friend_and_captures_enemy() {
        let pos = Position::from_fen("4k3/8/8/3p4/8/8/8/B3K3 w - - 0 1").unwrap();
        // d5 is off the long diagonal
        let d = destinations(&pos, sq("a1"));
        assert_eq!(names(d), vec!["b2", "c3", "d4", "e5", "f6", "g7", "h8"]);
        let pos = Position::from_fen("4k3/8/8/8/3p4/8/1P6/B3K3 w - - 0 1").unwrap();
        assert!(destinations(&pos, sq("a1")).is_empty());
    }

    #[test]
    fn pawn_double_push_needs_both_squares_empty() {
        let pos = Position::from_fen("4k3/8/8/8/8/4n3/4P3/4K3 w - - 0 1").unwrap();
        assert!(destinations(&pos, sq("e2")).is_empty());
        let pos = Position::from_fen("4k3/8/8/8/4n3/8/4P3/4K3 w - - 0 1").unwrap();
        assert_eq!(names(destinations(&pos, sq("e2"))), vec!["e3"]);
    }

    #[test]
    fn promotion_expands_to_four_moves() {
        let pos = Position::from_fen("4k3/1P6/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let mut moves = Vec::new();
        moves_from_into(&pos, sq("b7"), &mut moves);
        assert_eq!(moves.len(), 4);
        let promos: Vec<_> = moves.iter().map(|m| m.promo).collect();
        assert_eq!(
            promos,
            vec![Some(PieceKind::Queen), Some(PieceKind::Rook), Some(PieceKind::Bishop), Some(PieceKind::Knight)]
        );
    }

    #[test]
    fn castling_needs_empty_path_and_rook() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let d = destinations(&pos, sq("e1"));
        assert!(d.contains(sq("g1")));
        assert!(d.contains(sq("c1")));
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/RN2K1NR w KQkq - 0 1").unwrap();
        let d = destinations(&pos, sq("e1"));
        assert!(!d.contains(sq("g1")));
        assert!(!d.contains(sq("c1")));
    }

    #[test]
    fn empty_square_query_is_an_error() {
        let pos = Position::startpos();
        assert_eq!(pseudo_legal_destinations(&pos, sq("e4")), Err(ChessError::EmptySquare("e4".into())));
    }
}
