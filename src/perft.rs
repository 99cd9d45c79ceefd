//! Leaf counts of the legal move tree.

use rayon::prelude::*;

use crate::board::{Move, Position};
use crate::legal::legal_moves_into;

pub fn perft(pos: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut moves = Vec::with_capacity(64);
    legal_moves_into(pos, &mut moves);
    if depth == 1 {
        return moves.len() as u64;
    }
    moves.into_iter().map(|m| perft(&pos.child(m), depth - 1)).sum()
}

/// Per-root-move leaf counts, in generation order.
pub fn perft_divide(pos: &Position, depth: u32) -> Vec<(Move, u64)> {
    let mut moves = Vec::with_capacity(64);
    legal_moves_into(pos, &mut moves);
    moves.into_iter().map(|m| (m, perft(&pos.child(m), depth.saturating_sub(1)))).collect()
}

/// Root-split perft on the current rayon pool.
pub fn perft_parallel(pos: &Position, depth: u32) -> u64 {
    if depth <= 1 {
        return perft(pos, depth);
    }
    let mut moves = Vec::with_capacity(64);
    legal_moves_into(pos, &mut moves);
    moves.par_iter().map(|&m| perft(&pos.child(m), depth - 1)).sum()
}
