use std::sync::OnceLock;

use crate::board::{Color, Position};

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

// 12 piece types x 64 squares, then side, 16 castling masks, 8 en-passant files
const PIECE_KEYS: usize = 12 * 64;
const SIDE_KEY: usize = PIECE_KEYS;
const CASTLE_KEYS: usize = SIDE_KEY + 1;
const EP_KEYS: usize = CASTLE_KEYS + 16;
const TABLE_LEN: usize = EP_KEYS + 8;

static TABLE: OnceLock<[u64; TABLE_LEN]> = OnceLock::new();

fn table() -> &'static [u64; TABLE_LEN] {
    TABLE.get_or_init(|| {
        let mut t = [0u64; TABLE_LEN];
        let mut seed = 0xF00D_F00D_DEAD_BEEF;
        for v in t.iter_mut() {
            seed = splitmix64(seed);
            *v = seed;
        }
        t
    })
}

/// Hash of everything that makes two positions the same for repetition purposes:
/// placement, side to move, castling rights and en-passant file.
pub fn compute(pos: &Position) -> u64 {
    let t = table();
    let mut key = 0u64;
    for color in Color::BOTH {
        for sq in pos.occupancy(color) {
            if let Some(p) = pos.piece_at(sq) {
                let pi = color.idx() * 6 + p.kind.idx();
                key ^= t[pi * 64 + sq.index() as usize];
            }
        }
    }
    if pos.side_to_move() == Color::Black {
        key ^= t[SIDE_KEY];
    }
    key ^= t[CASTLE_KEYS + pos.castling().bits() as usize];
    if let Some(ep) = pos.en_passant() {
        key ^= t[EP_KEYS + ep.file() as usize];
    }
    key
}
