//! Forsyth-Edwards notation.

use crate::error::{ChessError, ChessResult};

use super::position::Position;
use super::types::*;

pub const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Parses the piece-placement field: eight ranks top to bottom separated by `/`,
/// digits for runs of empty squares, letters for pieces (uppercase = White).
pub fn parse_placement(text: &str) -> ChessResult<[Option<Piece>; 64]> {
    let mut squares = [None; 64];
    let ranks: Vec<&str> = text.split('/').collect();
    if ranks.len() != 8 {
        return Err(ChessError::BadPlacement(format!("expected 8 ranks, found {}", ranks.len())));
    }
    for (row, rank) in ranks.iter().enumerate() {
        let mut col = 0usize;
        for c in rank.chars() {
            if let Some(run) = c.to_digit(10) {
                if !(1..=8).contains(&run) {
                    return Err(ChessError::BadPlacement(format!("bad empty-run digit '{c}'")));
                }
                col += run as usize;
            } else {
                let piece = Piece::from_char(c)?;
                if col < 8 {
                    squares[row * 8 + col] = Some(piece);
                }
                col += 1;
            }
            if col > 8 {
                return Err(ChessError::BadPlacement(format!("rank '{rank}' is wider than 8 squares")));
            }
        }
        if col != 8 {
            return Err(ChessError::BadPlacement(format!("rank '{rank}' covers {col} squares")));
        }
    }
    Ok(squares)
}

/// Serializes a square array back into the placement field.
pub fn placement_string(squares: &[Option<Piece>; 64]) -> String {
    let mut out = String::with_capacity(72);
    for row in 0..8 {
        let mut empty = 0;
        for col in 0..8 {
            match squares[row * 8 + col] {
                Some(p) => {
                    if empty > 0 {
                        out.push(char::from(b'0' + empty));
                        empty = 0;
                    }
                    out.push(p.to_char());
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            out.push(char::from(b'0' + empty));
        }
        if row < 7 {
            out.push('/');
        }
    }
    out
}

fn parse_castling(text: &str) -> ChessResult<CastlingRights> {
    let mut rights = CastlingRights::NONE;
    if text == "-" {
        return Ok(rights);
    }
    for c in text.chars() {
        let bit = match c {
            'K' => CastlingRights::WHITE_KINGSIDE,
            'Q' => CastlingRights::WHITE_QUEENSIDE,
            'k' => CastlingRights::BLACK_KINGSIDE,
            'q' => CastlingRights::BLACK_QUEENSIDE,
            _ => return Err(ChessError::BadFenField { field: "castling", value: text.to_string() }),
        };
        rights.insert(bit);
    }
    Ok(rights)
}

impl Position {
    /// Parses a FEN string. Only the placement is mandatory; missing trailing fields
    /// default to `w - - 0 1`.
    pub fn from_fen(fen: &str) -> ChessResult<Position> {
        let mut fields = fen.split_whitespace();
        let placement = fields.next().ok_or_else(|| ChessError::BadPlacement("empty position string".into()))?;
        let squares = parse_placement(placement)?;
        let side = match fields.next() {
            None | Some("w") => Color::White,
            Some("b") => Color::Black,
            Some(other) => return Err(ChessError::BadFenField { field: "side to move", value: other.to_string() }),
        };
        let castling = match fields.next() {
            None => CastlingRights::NONE,
            Some(text) => parse_castling(text)?,
        };
        let en_passant = match fields.next() {
            None | Some("-") => None,
            Some(text) => Some(text.parse::<Square>()?),
        };
        let halfmove = parse_counter(fields.next(), "halfmove clock", 0)?;
        let fullmove = parse_counter(fields.next(), "fullmove number", 1)?;
        Position::from_parts(squares, side, castling, en_passant, halfmove, fullmove)
    }

    pub fn placement(&self) -> String {
        placement_string(self.squares())
    }

    pub fn to_fen(&self) -> String {
        let side = if self.side_to_move() == Color::White { "w" } else { "b" };
        let ep = self.en_passant().map_or_else(|| "-".to_string(), |s| s.to_string());
        format!(
            "{} {} {} {} {} {}",
            self.placement(),
            side,
            self.castling(),
            ep,
            self.halfmove_clock(),
            self.fullmove_number()
        )
    }
}

fn parse_counter(field: Option<&str>, name: &'static str, default: u32) -> ChessResult<u32> {
    match field {
        None => Ok(default),
        Some(text) => text.parse().map_err(|_| ChessError::BadFenField { field: name, value: text.to_string() }),
    }
}

impl std::str::FromStr for Position {
    type Err = ChessError;

    fn from_str(s: &str) -> ChessResult<Position> {
        Position::from_fen(s)
    }
}
