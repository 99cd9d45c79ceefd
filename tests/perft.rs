use knightfall::perft::{perft, perft_divide, perft_parallel};
use knightfall::Position;

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn pos(fen: &str) -> Position {
    Position::from_fen(fen).expect("valid fen")
}

#[test]
fn perft_startpos_small_depths() {
    let b = Position::startpos();
    assert_eq!(perft(&b, 1), 20);
    assert_eq!(perft(&b, 2), 400);
    assert_eq!(perft(&b, 3), 8902);
}

#[test]
fn perft_kiwipete_castling_and_pins() {
    let b = pos(KIWIPETE);
    assert_eq!(perft(&b, 1), 48);
    assert_eq!(perft(&b, 2), 2039);
}

#[test]
fn perft_endgame_with_en_passant_and_checks() {
    let b = pos("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1");
    assert_eq!(perft(&b, 1), 14);
    assert_eq!(perft(&b, 2), 191);
    assert_eq!(perft(&b, 3), 2812);
}

#[test]
fn perft_promotions_and_castling_rights() {
    let b = pos("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1");
    assert_eq!(perft(&b, 1), 6);
    assert_eq!(perft(&b, 2), 264);
    assert_eq!(perft(&b, 3), 9467);
}

#[test]
fn perft_underpromotion_position() {
    let b = pos("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8");
    assert_eq!(perft(&b, 1), 44);
    assert_eq!(perft(&b, 2), 1486);
}

#[test]
fn parallel_and_divide_agree_with_serial() {
    let b = pos(KIWIPETE);
    let serial = perft(&b, 2);
    assert_eq!(perft_parallel(&b, 2), serial);
    let split = perft_divide(&b, 2);
    assert_eq!(split.len(), 48);
    assert_eq!(split.iter().map(|(_, n)| *n).sum::<u64>(), serial);
}
