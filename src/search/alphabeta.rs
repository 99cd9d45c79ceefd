use std::time::{Duration, Instant};

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::board::{Move, Position};
use crate::legal::{has_legal_move, legal_moves_into};
use crate::search::eval::{Evaluator, StandardEval};

pub const MATE_SCORE: i32 = 100_000;
pub const STALEMATE_SCORE: i32 = 500;
/// Deepest ply a mate distance is decoded for.
pub const MAX_PLY: i32 = 256;
/// Smallest mate score that stays clear of static evaluations.
pub const MIN_MATE_SCORE: i32 = 10_000;
const INF: i32 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub depth: u32,
    /// Try children in order of their one-ply static score at interior nodes.
    pub order_moves: bool,
    pub max_nodes: Option<u64>,
    #[serde(with = "millis")]
    pub movetime: Option<Duration>,
    pub threads: usize,
    /// Score of being mated at the root; each ply of distance shaves one unit off.
    pub mate_score: i32,
    /// Score awarded to the stalemated side.
    pub stalemate_score: i32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            depth: 4,
            order_moves: true,
            max_nodes: None,
            movetime: None,
            threads: 1,
            mate_score: MATE_SCORE,
            stalemate_score: STALEMATE_SCORE,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => s.serialize_some(&(d.as_millis() as u64)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    /// From the side to move's point of view.
    pub score: i32,
    /// Deepest fully completed depth.
    pub depth: u32,
    pub nodes: u64,
    pub elapsed: Duration,
    /// The node or time budget ran out before the requested depth finished.
    pub stopped: bool,
}

impl SearchResult {
    pub fn bestmove_uci(&self) -> Option<String> {
        self.best_move.map(|m| m.to_string())
    }

    /// Plies to mate if the score is a mate score (positive: we mate).
    ///
    /// A mate cannot lie deeper than the completed depth, and a `mate_score` below
    /// [`MIN_MATE_SCORE`] overlaps ordinary evaluations, so neither is read as a mate.
    pub fn mate_in(&self, mate_score: i32) -> Option<i32> {
        if mate_score < MIN_MATE_SCORE {
            return None;
        }
        let dist = mate_score - self.score.abs();
        let horizon = (self.depth as i32).min(MAX_PLY);
        if (0..=horizon).contains(&dist) {
            Some(if self.score > 0 { dist } else { -dist })
        } else {
            None
        }
    }
}

pub struct Searcher<E: Evaluator = StandardEval> {
    eval: E,
    params: SearchParams,
    pub(crate) nodes: u64,
    node_limit: u64,
    deadline: Option<Instant>,
    stopped: bool,
}

impl Default for Searcher<StandardEval> {
    fn default() -> Self {
        Self::new(StandardEval::default())
    }
}

impl<E: Evaluator> Searcher<E> {
    pub fn new(eval: E) -> Self {
        Self::with_params(eval, SearchParams::default())
    }

    pub fn with_params(eval: E, params: SearchParams) -> Self {
        Self { eval, params, nodes: 0, node_limit: u64::MAX, deadline: None, stopped: false }
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    pub fn set_params(&mut self, params: SearchParams) {
        self.params = params;
    }

    pub fn evaluator(&self) -> &E {
        &self.eval
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Static score from the side to move's perspective.
    fn static_score(&self, pos: &Position) -> i32 {
        pos.side_to_move().sign() * self.eval.evaluate(pos)
    }

    /// Score of a node without legal moves, from the side to move's perspective.
    fn eval_terminal(&self, pos: &Position, ply: i32) -> i32 {
        terminal_score(&self.params, pos, ply)
    }

    fn out_of_budget(&mut self) -> bool {
        if self.stopped {
            return true;
        }
        if self.nodes >= self.node_limit {
            self.stopped = true;
        } else if let Some(dl) = self.deadline {
            if self.nodes & 1023 == 0 && Instant::now() >= dl {
                self.stopped = true;
            }
        }
        self.stopped
    }

    /// Legal children of `pos`, best-looking first when ordering is enabled.
    fn children(&self, pos: &Position, depth: u32) -> Vec<(Move, Position)> {
        let mut moves = Vec::with_capacity(64);
        legal_moves_into(pos, &mut moves);
        let mut kids: Vec<(Move, Position)> = moves.into_iter().map(|m| (m, pos.child(m))).collect();
        if self.params.order_moves && depth > 1 {
            // a child's static score is from the opponent's view, so lowest first
            kids.sort_by_cached_key(|(_, c)| self.static_score(c));
        }
        kids
    }

    fn alphabeta(&mut self, pos: &Position, depth: u32, mut alpha: i32, beta: i32, ply: i32) -> i32 {
        self.nodes += 1;
        if self.out_of_budget() {
            return self.static_score(pos);
        }
        if depth == 0 {
            return if has_legal_move(pos) { self.static_score(pos) } else { self.eval_terminal(pos, ply) };
        }
        let kids = self.children(pos, depth);
        if kids.is_empty() {
            return self.eval_terminal(pos, ply);
        }
        let mut best = -INF;
        for (_, child) in &kids {
            let score = -self.alphabeta(child, depth - 1, -beta, -alpha, ply + 1);
            if score > best {
                best = score;
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta || self.stopped {
                break;
            }
        }
        best
    }

    /// Fixed-depth search. Depth 0 is treated as 1.
    pub fn search_depth(&mut self, pos: &Position, depth: u32) -> SearchResult {
        let start = Instant::now();
        self.nodes = 0;
        self.stopped = false;
        let r = self.search_root(pos, depth.max(1), start);
        self.report(&r);
        r
    }

    /// Searches to `params.depth`. Without a node or time budget this is one fixed-depth
    /// search, same as [`Searcher::search_depth`]. With a budget the depths 1, 2, ... are
    /// searched in turn so that a stop mid-way still has the last completed depth's move.
    /// A partially searched iteration is only used when no earlier one completed.
    pub fn search_with_params(&mut self, pos: &Position, params: SearchParams) -> SearchResult {
        let start = Instant::now();
        self.params = params;
        self.nodes = 0;
        self.stopped = false;
        self.node_limit = params.max_nodes.unwrap_or(u64::MAX);
        self.deadline = params.movetime.map(|d| start + d);

        let budgeted = params.max_nodes.is_some() || params.movetime.is_some();
        let first = if budgeted { 1 } else { params.depth.max(1) };
        let mut best = self.search_root(pos, first, start);
        for d in first + 1..=params.depth {
            if best.stopped {
                break;
            }
            let r = self.search_root(pos, d, start);
            if r.stopped {
                best = SearchResult { nodes: r.nodes, elapsed: r.elapsed, stopped: true, ..best };
                break;
            }
            best = r;
        }
        self.node_limit = u64::MAX;
        self.deadline = None;
        self.report(&best);
        best
    }

    fn report(&self, r: &SearchResult) {
        info!(
            "depth {} score {} nodes {} time {}ms best {}{}",
            r.depth,
            r.score,
            r.nodes,
            r.elapsed.as_millis(),
            r.bestmove_uci().unwrap_or_else(|| "(none)".into()),
            if r.stopped { " (stopped)" } else { "" }
        );
    }

    fn search_root(&mut self, pos: &Position, depth: u32, start: Instant) -> SearchResult {
        let kids = self.children(pos, depth.max(2));
        if kids.is_empty() {
            return SearchResult {
                best_move: None,
                score: self.eval_terminal(pos, 0),
                depth,
                nodes: self.nodes,
                elapsed: start.elapsed(),
                stopped: false,
            };
        }
        if self.params.threads > 1 && depth > 1 {
            return self.search_root_parallel(kids, depth, start);
        }

        let mut alpha = -INF;
        let mut best: Option<(Move, i32)> = None;
        for (mv, child) in &kids {
            let score = -self.alphabeta(child, depth - 1, -INF, -alpha, 1);
            if self.stopped && best.is_some() {
                break;
            }
            debug!("root {mv} score {score}");
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((*mv, score));
            }
            alpha = alpha.max(score);
            if self.stopped {
                break;
            }
        }
        let (mv, score) = best.unwrap_or((kids[0].0, -INF));
        SearchResult {
            best_move: Some(mv),
            score,
            depth,
            nodes: self.nodes,
            elapsed: start.elapsed(),
            stopped: self.stopped,
        }
    }

    /// Searches every root move with a full window on the rayon pool. The node budget
    /// is split evenly between root moves; the deadline is shared.
    fn search_root_parallel(&mut self, kids: Vec<(Move, Position)>, depth: u32, start: Instant) -> SearchResult {
        let remaining = self.node_limit.saturating_sub(self.nodes);
        let share = if remaining == u64::MAX { u64::MAX } else { (remaining / kids.len() as u64).max(1) };
        let eval = &self.eval;
        let params = self.params;
        let deadline = self.deadline;
        let results: Vec<(Move, i32, u64, bool)> = kids
            .par_iter()
            .map(|(mv, child)| {
                let mut w = Searcher::with_params(eval, params);
                w.node_limit = share;
                w.deadline = deadline;
                let score = -w.alphabeta(child, depth - 1, -INF, INF, 1);
                (*mv, score, w.nodes, w.stopped)
            })
            .collect();

        let mut best: Option<(Move, i32)> = None;
        let mut stopped = false;
        for (mv, score, nodes, s) in results {
            self.nodes += nodes;
            stopped |= s;
            debug!("root {mv} score {score}");
            if best.map_or(true, |(_, bs)| score > bs) {
                best = Some((mv, score));
            }
        }
        self.stopped = stopped;
        let (mv, score) = best.unwrap_or((kids[0].0, -INF));
        SearchResult { best_move: Some(mv), score, depth, nodes: self.nodes, elapsed: start.elapsed(), stopped }
    }
}

fn terminal_score(params: &SearchParams, pos: &Position, ply: i32) -> i32 {
    if pos.in_check(pos.side_to_move()) {
        -(params.mate_score - ply)
    } else {
        params.stalemate_score
    }
}

/// Searches `pos` to `depth` plies with the standard evaluator and default settings.
pub fn choose_best_move(pos: &Position, depth: u32) -> SearchResult {
    Searcher::default().search_depth(pos, depth)
}

/// Exhaustive negamax without pruning or ordering. Returns each root move with its
/// score, in generation order, and the number of nodes visited.
pub fn minimax_root_scores<E: Evaluator>(
    pos: &Position,
    depth: u32,
    eval: &E,
    params: &SearchParams,
) -> (Vec<(Move, i32)>, u64) {
    let mut nodes = 0u64;
    let mut moves = Vec::with_capacity(64);
    legal_moves_into(pos, &mut moves);
    let scores = moves
        .into_iter()
        .map(|m| (m, -minimax_node(&pos.child(m), depth.max(1) - 1, 1, eval, params, &mut nodes)))
        .collect();
    (scores, nodes)
}

/// Reference search: same scores as [`Searcher::search_depth`] without pruning.
pub fn minimax<E: Evaluator>(pos: &Position, depth: u32, eval: &E, params: &SearchParams) -> SearchResult {
    let start = Instant::now();
    let (scores, nodes) = minimax_root_scores(pos, depth, eval, params);
    let mut best: Option<(Move, i32)> = None;
    for (m, s) in scores {
        if best.map_or(true, |(_, bs)| s > bs) {
            best = Some((m, s));
        }
    }
    let score = match best {
        Some((_, s)) => s,
        None => terminal_score(params, pos, 0),
    };
    SearchResult {
        best_move: best.map(|(m, _)| m),
        score,
        depth: depth.max(1),
        nodes,
        elapsed: start.elapsed(),
        stopped: false,
    }
}

fn minimax_node<E: Evaluator>(
    pos: &Position,
    depth: u32,
    ply: i32,
    eval: &E,
    params: &SearchParams,
    nodes: &mut u64,
) -> i32 {
    *nodes += 1;
    let mut moves = Vec::with_capacity(64);
    legal_moves_into(pos, &mut moves);
    if moves.is_empty() {
        return terminal_score(params, pos, ply);
    }
    if depth == 0 {
        return pos.side_to_move().sign() * eval.evaluate(pos);
    }
    moves
        .into_iter()
        .map(|m| -minimax_node(&pos.child(m), depth - 1, ply + 1, eval, params, nodes))
        .max()
        .unwrap_or(-INF)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::eval::MaterialEval;

    #[test]
    fn takes_the_hanging_queen() {
        let pos = Position::from_fen("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1").unwrap();
        let r = Searcher::new(MaterialEval::default()).search_depth(&pos, 2);
        assert_eq!(r.bestmove_uci().as_deref(), Some("d2d5"));
        assert!(r.score > 0);
    }

    #[test]
    fn depth_zero_is_clamped_to_one() {
        let pos = Position::startpos();
        let r = Searcher::default().search_depth(&pos, 0);
        assert_eq!(r.depth, 1);
        assert!(r.best_move.is_some());
        assert_eq!(r.nodes, 20);
    }

    #[test]
    fn mate_score_shrinks_with_distance() {
        let r = SearchResult {
            best_move: None,
            score: MATE_SCORE - 3,
            depth: 4,
            nodes: 0,
            elapsed: Duration::ZERO,
            stopped: false,
        };
        assert_eq!(r.mate_in(MATE_SCORE), Some(3));
        let r = SearchResult { score: 120, ..r };
        assert_eq!(r.mate_in(MATE_SCORE), None);
    }

    #[test]
    fn small_mate_score_does_not_turn_evals_into_mates() {
        let r = SearchResult {
            best_move: None,
            score: 300,
            depth: 4,
            nodes: 0,
            elapsed: Duration::ZERO,
            stopped: false,
        };
        assert_eq!(r.mate_in(1000), None);
        assert_eq!(SearchResult { score: 998, ..r.clone() }.mate_in(1000), None);
        // a distance beyond the searched depth is an evaluation, not a mate
        assert_eq!(SearchResult { score: MATE_SCORE - 5, ..r.clone() }.mate_in(MATE_SCORE), None);
        assert_eq!(SearchResult { score: -(MATE_SCORE - 2), ..r }.mate_in(MATE_SCORE), Some(-2));
    }

    #[test]
    fn params_read_from_partial_json() {
        let p: SearchParams = serde_json::from_str(r#"{"depth": 6, "movetime": 250}"#).unwrap();
        assert_eq!(p.depth, 6);
        assert_eq!(p.movetime, Some(Duration::from_millis(250)));
        assert!(p.order_moves);
        assert_eq!(p.stalemate_score, STALEMATE_SCORE);
    }
}
