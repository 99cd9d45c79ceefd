//! Engine-vs-engine games.

use std::collections::HashMap;
use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::board::{Color, Position};
use crate::error::ChessResult;
use crate::legal::{terminal_status, GameStatus};
use crate::pgn::{write_pgn, PgnTags};
use crate::search::alphabeta::{SearchParams, Searcher};
use crate::search::eval::{EvalKind, EvalWeights, Evaluator};

/// Settings for one side.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub eval: EvalKind,
    pub depth: u32,
    /// Only used by the random evaluator.
    pub seed: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self { eval: EvalKind::Standard, depth: 3, seed: 0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub white: PlayerConfig,
    pub black: PlayerConfig,
    pub weights: EvalWeights,
    /// Shared search settings; `depth` is taken from each player.
    pub search: SearchParams,
    pub max_plies: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            white: PlayerConfig::default(),
            black: PlayerConfig::default(),
            weights: EvalWeights::default(),
            search: SearchParams::default(),
            max_plies: 300,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    #[serde(rename = "1-0")]
    WhiteWins,
    #[serde(rename = "0-1")]
    BlackWins,
    #[serde(rename = "1/2-1/2")]
    Draw,
    #[serde(rename = "*")]
    Unfinished,
}

impl GameResult {
    fn win_for(color: Color) -> Self {
        match color {
            Color::White => GameResult::WhiteWins,
            Color::Black => GameResult::BlackWins,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::Unfinished => "*",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    Checkmate,
    Stalemate,
    FiftyMoveRule,
    ThreefoldRepetition,
    PlyLimit,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub start_fen: String,
    pub moves: Vec<String>,
    pub result: GameResult,
    pub termination: Termination,
    pub final_fen: String,
}

impl GameRecord {
    /// The game as PGN with the seven standard tags.
    pub fn to_pgn(&self, tags: &PgnTags) -> ChessResult<String> {
        let start = Position::from_fen(&self.start_fen)?;
        write_pgn(&start, &self.moves, &self.result.to_string(), tags)
    }
}

fn player(config: &GameConfig, side: &PlayerConfig) -> Searcher<Box<dyn Evaluator>> {
    let params = SearchParams { depth: side.depth, ..config.search };
    Searcher::with_params(side.eval.build(config.weights, side.seed), params)
}

/// Plays one game from `start` until it is decided, drawn by rule, or hits the ply cap.
pub fn play_game(start: &Position, config: &GameConfig) -> GameRecord {
    let mut searchers = [player(config, &config.white), player(config, &config.black)];
    let mut pos = start.clone();
    let mut moves = Vec::new();
    let mut seen: HashMap<u64, u32> = HashMap::new();
    seen.insert(pos.key(), 1);

    let (result, termination) = loop {
        let stm = pos.side_to_move();
        match terminal_status(&pos) {
            GameStatus::Checkmate => break (GameResult::win_for(stm.other()), Termination::Checkmate),
            GameStatus::Stalemate => break (GameResult::Draw, Termination::Stalemate),
            GameStatus::Ongoing => {}
        }
        if pos.halfmove_clock() >= 100 {
            break (GameResult::Draw, Termination::FiftyMoveRule);
        }
        if moves.len() >= config.max_plies {
            break (GameResult::Unfinished, Termination::PlyLimit);
        }

        let searcher = &mut searchers[stm.idx()];
        let params = *searcher.params();
        let r = searcher.search_with_params(&pos, params);
        let Some(mv) = r.best_move else {
            break (GameResult::Draw, Termination::Stalemate);
        };
        debug!("{} {} plays {} ({})", pos.fullmove_number(), stm.name(), mv, r.score);
        pos = pos.child(mv);
        moves.push(mv.to_string());

        let count = seen.entry(pos.key()).or_insert(0);
        *count += 1;
        if *count >= 3 {
            break (GameResult::Draw, Termination::ThreefoldRepetition);
        }
    };

    GameRecord { start_fen: start.to_fen(), moves, result, termination, final_fen: pos.to_fen() }
}
