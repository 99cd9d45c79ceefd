pub mod fen;
pub mod position;
pub mod types;

pub use fen::{parse_placement, STARTPOS_FEN};
pub use position::Position;
pub use types::*;
