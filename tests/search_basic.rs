use knightfall::legal::{legal_moves, play_text, terminal_status, GameStatus};
use knightfall::search::alphabeta::{choose_best_move, SearchParams, Searcher, MATE_SCORE, STALEMATE_SCORE};
use knightfall::search::eval::{Evaluator, MaterialEval, StandardEval};
use knightfall::Position;

fn pos(fen: &str) -> Position {
    Position::from_fen(fen).expect("valid fen")
}

#[test]
fn eval_startpos_is_zero() {
    let v = StandardEval::default().evaluate(&Position::startpos());
    assert_eq!(v, 0, "startpos not balanced: {v}");
}

#[test]
fn search_returns_legal_move_startpos() {
    let b = Position::startpos();
    let res = choose_best_move(&b, 1);
    let bm = res.best_move.expect("no move found at depth 1");
    assert!(legal_moves(&b).contains(&bm), "illegal best move {bm}");
    assert!(!res.stopped);
}

#[test]
fn search_prefers_winning_queen_capture() {
    // Qe2xd2 wins a queen
    let b = pos("k7/8/8/8/8/8/3qQ3/7K w - - 0 1");
    let res = Searcher::default().search_depth(&b, 1);
    let bm = res.bestmove_uci().expect("expected a best move");
    assert_eq!(bm, "e2d2", "expected Qe2xd2 as best move, got {bm}");
}

#[test]
fn finds_back_rank_mate_in_one() {
    let b = pos("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
    let res = choose_best_move(&b, 2);
    assert_eq!(res.bestmove_uci().as_deref(), Some("a1a8"));
    assert_eq!(res.score, MATE_SCORE - 1, "mate score should count one ply: {}", res.score);
    assert_eq!(res.mate_in(MATE_SCORE), Some(1));
}

#[test]
fn black_finds_fools_mate() {
    let b = ["f2f3", "e7e5", "g2g4"].iter().try_fold(Position::startpos(), |p, m| play_text(&p, m)).unwrap();
    let res = Searcher::new(MaterialEval::default()).search_depth(&b, 2);
    assert_eq!(res.bestmove_uci().as_deref(), Some("d8h4"));
    assert!(res.score > 90_000, "expected a mate score, got {}", res.score);
}

#[test]
fn checkmated_root_scores_as_mate() {
    let b = ["f2f3", "e7e5", "g2g4", "d8h4"].iter().try_fold(Position::startpos(), |p, m| play_text(&p, m)).unwrap();
    let res = choose_best_move(&b, 3);
    assert_eq!(res.best_move, None);
    assert_eq!(res.score, -MATE_SCORE);
}

#[test]
fn stalemated_root_scores_as_stalemate() {
    let b = pos("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
    let res = choose_best_move(&b, 3);
    assert_eq!(res.best_move, None);
    assert_eq!(res.score, STALEMATE_SCORE);
    assert!(res.mate_in(MATE_SCORE).is_none());
}

#[test]
fn stalemate_score_is_tunable() {
    let b = pos("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
    let mut p = SearchParams::default();
    p.stalemate_score = -25;
    let res = Searcher::default().search_with_params(&b, p);
    assert_eq!(res.score, -25);
}

#[test]
fn winning_side_avoids_stalemate() {
    // Qf7 stalemates; Qf8 mates
    let b = pos("7k/8/6K1/8/8/8/8/5Q2 w - - 0 1");
    let res = choose_best_move(&b, 2);
    let bm = res.bestmove_uci().unwrap();
    assert_ne!(bm, "f1f7", "engine walked into stalemate");
    let next = play_text(&b, &bm).unwrap();
    assert_ne!(terminal_status(&next), GameStatus::Stalemate, "{bm} stalemates");
}

#[test]
fn stalemate_score_decides_between_stalemate_and_play_on() {
    // no mate in one; Qc4, Qd5, Qe6 and Qf7 all stalemate
    let b = pos("7k/8/6K1/8/1P6/1Q6/8/8 w - - 0 1");
    let p = SearchParams { depth: 2, ..SearchParams::default() };

    let res = Searcher::default().search_with_params(&b, p);
    let bm = res.bestmove_uci().unwrap();
    let next = play_text(&b, &bm).unwrap();
    assert_eq!(terminal_status(&next), GameStatus::Ongoing, "{bm} ends the game");
    assert!(res.score > 0, "winning side should stay ahead: {}", res.score);
    assert_eq!(res.mate_in(MATE_SCORE), None);

    // a stalemate that costs the stalemated side more than the queen is worth is taken
    let res = Searcher::default().search_with_params(&b, SearchParams { stalemate_score: -5000, ..p });
    let bm = res.bestmove_uci().unwrap();
    let next = play_text(&b, &bm).unwrap();
    assert_eq!(terminal_status(&next), GameStatus::Stalemate, "{bm} does not stalemate");
    assert_eq!(res.score, 5000);
}
