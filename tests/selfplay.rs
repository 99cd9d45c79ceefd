use knightfall::legal::play_text;
use knightfall::search::eval::EvalKind;
use knightfall::selfplay::{play_game, GameConfig, GameResult, PlayerConfig, Termination};
use knightfall::Position;

fn pos(fen: &str) -> Position {
    Position::from_fen(fen).expect("valid fen")
}

#[test]
fn engine_delivers_back_rank_mate() {
    let cfg = GameConfig { white: PlayerConfig { depth: 2, ..PlayerConfig::default() }, ..GameConfig::default() };
    let rec = play_game(&pos("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1"), &cfg);
    assert_eq!(rec.moves, vec!["a1a8".to_string()]);
    assert_eq!(rec.result, GameResult::WhiteWins);
    assert_eq!(rec.termination, Termination::Checkmate);
}

#[test]
fn fifty_move_rule_ends_the_game() {
    let rec = play_game(&pos("4k3/8/8/8/8/8/8/R3K3 w - - 99 60"), &GameConfig::default());
    assert_eq!(rec.moves.len(), 1);
    assert_eq!(rec.result, GameResult::Draw);
    assert_eq!(rec.termination, Termination::FiftyMoveRule);
}

#[test]
fn bare_kings_never_produce_a_winner() {
    let mut cfg = GameConfig::default();
    cfg.white.depth = 1;
    cfg.black.depth = 1;
    cfg.max_plies = 30;
    let rec = play_game(&pos("4k3/8/8/8/8/8/8/4K3 w - - 0 1"), &cfg);
    assert!(matches!(rec.result, GameResult::Draw | GameResult::Unfinished), "{rec:?}");
    assert!(rec.moves.len() <= 30);
}

#[test]
fn random_players_produce_a_replayable_game() {
    let mut cfg = GameConfig::default();
    cfg.white = PlayerConfig { eval: EvalKind::Random, depth: 1, seed: 1 };
    cfg.black = PlayerConfig { eval: EvalKind::Random, depth: 1, seed: 2 };
    cfg.max_plies = 40;
    let start = Position::startpos();
    let rec = play_game(&start, &cfg);
    assert_eq!(rec.start_fen, start.to_fen());
    let end = rec.moves.iter().try_fold(start, |p, m| play_text(&p, m)).expect("recorded moves replay legally");
    assert_eq!(end.to_fen(), rec.final_fen);
    // same seeds, same game
    assert_eq!(play_game(&Position::startpos(), &cfg), rec);
}
