//! Static evaluation.
//!
//! Scores are White-positive integers ("eval units"). The search converts them to the
//! side-to-move view itself.

use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::board::{Color, PieceKind, Position};
use crate::movegen::destinations;

pub trait Evaluator: Send + Sync {
    /// Score of `pos`, positive when White stands better.
    fn evaluate(&self, pos: &Position) -> i32;
}

impl<E: Evaluator + ?Sized> Evaluator for &E {
    fn evaluate(&self, pos: &Position) -> i32 {
        (**self).evaluate(pos)
    }
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn evaluate(&self, pos: &Position) -> i32 {
        (**self).evaluate(pos)
    }
}

/// Weights of the material / mobility / space evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalWeights {
    pub pawn: f32,
    pub knight: f32,
    pub bishop: f32,
    pub rook: f32,
    pub queen: f32,
    pub material: f32,
    pub mobility: f32,
    pub space: f32,
    /// Mobility per knight destination.
    pub knight_mobility: f32,
    /// Sliders score `base ^ destinations`.
    pub bishop_mobility_base: f32,
    pub rook_mobility_base: f32,
    pub queen_mobility_base: f32,
    /// Multiplier applied before rounding to integer units.
    pub scale: f32,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            pawn: 10.0,
            knight: 30.0,
            bishop: 32.0,
            rook: 50.0,
            queen: 90.0,
            material: 0.75,
            mobility: 0.2,
            space: 0.05,
            knight_mobility: 0.875,
            bishop_mobility_base: 1.149,
            rook_mobility_base: 1.17,
            queen_mobility_base: 1.093,
            scale: 10.0,
        }
    }
}

impl EvalWeights {
    pub fn piece_value(&self, kind: PieceKind) -> f32 {
        match kind {
            PieceKind::Pawn => self.pawn,
            PieceKind::Knight => self.knight,
            PieceKind::Bishop => self.bishop,
            PieceKind::Rook => self.rook,
            PieceKind::Queen => self.queen,
            PieceKind::King => 0.0,
        }
    }

    /// White-positive material sum.
    pub fn material(&self, pos: &Position) -> f32 {
        let mut total = 0.0;
        for color in Color::BOTH {
            for sq in pos.occupancy(color) {
                if let Some(p) = pos.piece_at(sq) {
                    total += color.sign() as f32 * self.piece_value(p.kind);
                }
            }
        }
        total
    }

    /// Knights score linearly in their destination count, sliders exponentially.
    /// Pawns and kings are ignored.
    pub fn mobility(&self, pos: &Position) -> f32 {
        let mut total = 0.0;
        for color in Color::BOTH {
            for sq in pos.occupancy(color) {
                let Some(p) = pos.piece_at(sq) else { continue };
                let count = || destinations(pos, sq).popcount() as i32;
                let term = match p.kind {
                    PieceKind::Knight => self.knight_mobility * count() as f32,
                    PieceKind::Bishop => self.bishop_mobility_base.powi(count()),
                    PieceKind::Rook => self.rook_mobility_base.powi(count()),
                    PieceKind::Queen => self.queen_mobility_base.powi(count()),
                    PieceKind::Pawn | PieceKind::King => continue,
                };
                total += color.sign() as f32 * term;
            }
        }
        total
    }

    /// Pawn advancement: ranks travelled from each side's back rank.
    pub fn space(&self, pos: &Position) -> f32 {
        let mut total = 0i32;
        for sq in pos.pieces(Color::White, PieceKind::Pawn) {
            total += sq.rank() as i32;
        }
        for sq in pos.pieces(Color::Black, PieceKind::Pawn) {
            total -= 7 - sq.rank() as i32;
        }
        total as f32
    }
}

/// Material + mobility + space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StandardEval {
    pub weights: EvalWeights,
}

impl StandardEval {
    pub fn new(weights: EvalWeights) -> Self {
        Self { weights }
    }
}

impl Evaluator for StandardEval {
    fn evaluate(&self, pos: &Position) -> i32 {
        let w = &self.weights;
        let raw = w.material * w.material(pos) + w.mobility * w.mobility(pos) + w.space * w.space(pos);
        (raw * w.scale).round() as i32
    }
}

/// Material balance only.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MaterialEval {
    pub weights: EvalWeights,
}

impl Evaluator for MaterialEval {
    fn evaluate(&self, pos: &Position) -> i32 {
        let w = &self.weights;
        (w.material * w.material(pos) * w.scale).round() as i32
    }
}

/// Pseudo-random score in `-1000..=1000`, fixed per (seed, position).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RandomEval {
    pub seed: u64,
}

impl RandomEval {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Evaluator for RandomEval {
    fn evaluate(&self, pos: &Position) -> i32 {
        let mut rng = SmallRng::seed_from_u64(self.seed ^ pos.key());
        rng.gen_range(-1000..=1000)
    }
}

/// Evaluator selection for configuration files and command lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvalKind {
    #[default]
    Standard,
    Material,
    Random,
}

impl EvalKind {
    pub fn build(self, weights: EvalWeights, seed: u64) -> Box<dyn Evaluator> {
        match self {
            EvalKind::Standard => Box::new(StandardEval::new(weights)),
            EvalKind::Material => Box::new(MaterialEval { weights }),
            EvalKind::Random => Box::new(RandomEval::new(seed)),
        }
    }
}

impl FromStr for EvalKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(EvalKind::Standard),
            "material" => Ok(EvalKind::Material),
            "random" => Ok(EvalKind::Random),
            other => Err(format!("unknown evaluator '{other}' (expected standard, material or random)")),
        }
    }
}
