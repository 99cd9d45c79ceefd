use std::fmt;

use crate::attacks::is_attacked_by;
use crate::bitboard::Bitboard;
use crate::error::{ChessError, ChessResult};
use crate::movegen;

use super::types::*;

/// A complete game position.
///
/// Positions are values: every move application returns a new `Position` and leaves the
/// original untouched, so search branches never share mutable state. The occupancy sets
/// always agree with the square array, and every position built through the public
/// constructors holds exactly one king per side.
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    squares: [Option<Piece>; 64],
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    occupancy: [Bitboard; 2],
    halfmove_clock: u32,
    fullmove_number: u32,
}

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

impl Position {
    pub fn startpos() -> Self {
        let mut squares = [None; 64];
        for (file, &kind) in BACK_RANK.iter().enumerate() {
            // index 0..8 is Black's back rank, 56..64 White's
            squares[file] = Some(Piece::new(Color::Black, kind));
            squares[8 + file] = Some(Piece::new(Color::Black, PieceKind::Pawn));
            squares[48 + file] = Some(Piece::new(Color::White, PieceKind::Pawn));
            squares[56 + file] = Some(Piece::new(Color::White, kind));
        }
        Self::assemble(squares, Color::White, CastlingRights::ALL, None, 0, 1)
    }

    /// Builds a position from its parts and checks the board invariants.
    pub fn from_parts(
        squares: [Option<Piece>; 64],
        side_to_move: Color,
        castling: CastlingRights,
        en_passant: Option<Square>,
        halfmove_clock: u32,
        fullmove_number: u32,
    ) -> ChessResult<Self> {
        let pos = Self::assemble(squares, side_to_move, castling, en_passant, halfmove_clock, fullmove_number.max(1));
        pos.validate()?;
        Ok(pos)
    }

    fn assemble(
        squares: [Option<Piece>; 64],
        side_to_move: Color,
        castling: CastlingRights,
        en_passant: Option<Square>,
        halfmove_clock: u32,
        fullmove_number: u32,
    ) -> Self {
        let mut occupancy = [Bitboard::EMPTY; 2];
        for sq in Square::all() {
            if let Some(p) = squares[sq.index() as usize] {
                occupancy[p.color.idx()].set(sq);
            }
        }
        Self { squares, side_to_move, castling, en_passant, occupancy, halfmove_clock, fullmove_number }
    }

    fn validate(&self) -> ChessResult<()> {
        for color in Color::BOTH {
            let kings = self.pieces(color, PieceKind::King).popcount();
            if kings != 1 {
                return Err(ChessError::KingCount { color: color.name(), found: kings });
            }
        }
        for sq in self.occupied() {
            if let Some(Piece { kind: PieceKind::Pawn, .. }) = self.piece_at(sq) {
                if sq.rank() == 0 || sq.rank() == 7 {
                    return Err(ChessError::InvalidPosition("pawn on first or last rank"));
                }
            }
        }
        for color in Color::BOTH {
            let home_rank = if color == Color::White { 0 } else { 7 };
            let king_home = Square::from_coords(4, home_rank).map(|s| self.piece_at(s)) == Some(Some(Piece::new(color, PieceKind::King)));
            for (bit, rook_file) in [(CastlingRights::kingside_bit(color), 7), (CastlingRights::queenside_bit(color), 0)] {
                if !self.castling.has(bit) {
                    continue;
                }
                let rook_home = Square::from_coords(rook_file, home_rank).map(|s| self.piece_at(s)) == Some(Some(Piece::new(color, PieceKind::Rook)));
                if !king_home || !rook_home {
                    return Err(ChessError::InvalidPosition("castling right without king and rook on their home squares"));
                }
            }
        }
        if let Some(ep) = self.en_passant {
            let us = self.side_to_move;
            // the target lies behind an enemy pawn that just double-pushed
            let expected_rank = if us == Color::White { 5 } else { 2 };
            let pusher = ep.offset(0, us.other().forward());
            let pawn_there = pusher.and_then(|s| self.piece_at(s)) == Some(Piece::new(us.other(), PieceKind::Pawn));
            if ep.rank() != expected_rank || self.piece_at(ep).is_some() || !pawn_there {
                return Err(ChessError::InvalidPosition("en-passant square does not follow a double pawn push"));
            }
        }
        if self.in_check(self.side_to_move.other()) {
            return Err(ChessError::InvalidPosition("side not to move is in check"));
        }
        Ok(())
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.index() as usize]
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn occupancy(&self, color: Color) -> Bitboard {
        self.occupancy[color.idx()]
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.occupancy[0] | self.occupancy[1]
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn squares(&self) -> &[Option<Piece>; 64] {
        &self.squares
    }

    /// Squares holding `color`'s pieces of the given kind.
    pub fn pieces(&self, color: Color, kind: PieceKind) -> Bitboard {
        let mut bb = Bitboard::EMPTY;
        for sq in self.occupancy(color) {
            if self.squares[sq.index() as usize].map(|p| p.kind) == Some(kind) {
                bb.set(sq);
            }
        }
        bb
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces(color, PieceKind::King).lsb()
    }

    pub fn in_check(&self, color: Color) -> bool {
        self.king_square(color).is_some_and(|k| is_attacked_by(self, k, color.other()))
    }

    /// Applies a move to a copy of this position.
    ///
    /// The move must move a piece of the side to move to one of that piece's
    /// pseudo-legal destinations, with a promotion selector exactly when a pawn reaches
    /// the last rank. Whether the mover's king is left attacked is not checked here; see
    /// [`crate::legal::play`] for that.
    pub fn apply(&self, mv: Move) -> ChessResult<Position> {
        let invalid = |reason| ChessError::InvalidMove { mv: mv.to_string(), reason };
        let piece = self.piece_at(mv.from).ok_or_else(|| invalid("origin square is empty"))?;
        if piece.color != self.side_to_move {
            return Err(invalid("piece does not belong to the side to move"));
        }
        if !movegen::destinations(self, mv.from).contains(mv.to) {
            return Err(invalid("destination is not reachable by this piece"));
        }
        if self.piece_at(mv.to).map(|p| p.kind) == Some(PieceKind::King) {
            return Err(invalid("a king cannot be captured"));
        }
        let promotes = piece.kind == PieceKind::Pawn && mv.to.rank() == piece.color.promotion_rank();
        match (promotes, mv.promo) {
            (true, Some(kind)) if PieceKind::PROMOTIONS.contains(&kind) => {}
            (false, None) => {}
            (true, _) => return Err(invalid("pawn reaching the last rank needs a promotion piece")),
            (false, Some(_)) => return Err(invalid("promotion piece on a non-promoting move")),
        }
        Ok(self.child(mv))
    }

    /// Move application without validation, for moves produced by the generator.
    pub(crate) fn child(&self, mv: Move) -> Position {
        let mut next = self.clone();
        let Some(piece) = self.piece_at(mv.from) else {
            debug_assert!(false, "child() called with empty origin {}", mv.from);
            return next;
        };
        let us = piece.color;
        let mut captured = self.piece_at(mv.to);

        next.remove(mv.from);
        match piece.kind {
            PieceKind::Pawn if Some(mv.to) == self.en_passant && mv.from.file() != mv.to.file() && captured.is_none() => {
                // the captured pawn sits behind the target square
                if let Some(victim) = mv.to.offset(0, -us.forward()) {
                    captured = next.remove(victim);
                }
            }
            PieceKind::King if mv.from.file().abs_diff(mv.to.file()) == 2 => {
                let (rook_from, rook_to) = if mv.to.file() > mv.from.file() { (7, 5) } else { (0, 3) };
                let rank = mv.from.rank();
                if let (Some(rf), Some(rt)) = (Square::from_coords(rook_from, rank), Square::from_coords(rook_to, rank)) {
                    if let Some(rook) = next.remove(rf) {
                        next.put(rt, rook);
                    }
                }
            }
            _ => {}
        }
        next.remove(mv.to);
        let placed = match (piece.kind, mv.promo) {
            (PieceKind::Pawn, Some(kind)) => Piece::new(us, kind),
            _ => piece,
        };
        next.put(mv.to, placed);

        next.castling.remove(castling_mask(mv.from) | castling_mask(mv.to));
        next.en_passant = if piece.kind == PieceKind::Pawn && mv.from.rank().abs_diff(mv.to.rank()) == 2 {
            mv.from.offset(0, us.forward())
        } else {
            None
        };
        next.halfmove_clock = if piece.kind == PieceKind::Pawn || captured.is_some() { 0 } else { self.halfmove_clock + 1 };
        if us == Color::Black {
            next.fullmove_number += 1;
        }
        next.side_to_move = us.other();
        next
    }

    fn put(&mut self, sq: Square, piece: Piece) {
        self.squares[sq.index() as usize] = Some(piece);
        self.occupancy[piece.color.idx()].set(sq);
    }

    fn remove(&mut self, sq: Square) -> Option<Piece> {
        let old = self.squares[sq.index() as usize].take();
        if let Some(p) = old {
            self.occupancy[p.color.idx()].clear(sq);
        }
        old
    }

    /// Zobrist key of this position.
    pub fn key(&self) -> u64 {
        crate::search::zobrist::compute(self)
    }
}

/// Rights lost when a piece leaves or lands on `sq`.
fn castling_mask(sq: Square) -> u8 {
    match sq.index() {
        60 => CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE, // e1
        63 => CastlingRights::WHITE_KINGSIDE,                                   // h1
        56 => CastlingRights::WHITE_QUEENSIDE,                                  // a1
        4 => CastlingRights::BLACK_KINGSIDE | CastlingRights::BLACK_QUEENSIDE,  // e8
        7 => CastlingRights::BLACK_KINGSIDE,                                    // h8
        0 => CastlingRights::BLACK_QUEENSIDE,                                   // a8
        _ => 0,
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..8u8 {
            write!(f, "{} ", 8 - row)?;
            for col in 0..8u8 {
                let c = self.squares[(row * 8 + col) as usize].map_or('.', Piece::to_char);
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h")?;
        write!(f, "{} to move", self.side_to_move.name())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position(\"{}\")", self.to_fen())
    }
}
