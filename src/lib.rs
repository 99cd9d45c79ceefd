//! Chess rules engine with an alpha-beta move searcher.

pub mod attacks;
pub mod bitboard;
pub mod board;
pub mod error;
pub mod legal;
pub mod movegen;
pub mod perft;
pub mod pgn;
pub mod search;
pub mod selfplay;
pub mod uci;

pub use board::{Color, Move, Piece, PieceKind, Position, Square};
pub use error::{ChessError, ChessResult};
pub use legal::{legal_moves, terminal_status, GameStatus};
pub use search::alphabeta::{choose_best_move, SearchParams, SearchResult, Searcher};
pub use search::eval::{Evaluator, MaterialEval, RandomEval, StandardEval};
