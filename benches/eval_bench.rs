use criterion::{black_box, criterion_group, criterion_main, Criterion};
use knightfall::search::eval::{Evaluator, MaterialEval, StandardEval};
use knightfall::Position;

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn bench_eval(c: &mut Criterion) {
    let start = Position::startpos();
    let kiwi = Position::from_fen(KIWIPETE).unwrap();
    let standard = StandardEval::default();
    let material = MaterialEval::default();
    c.bench_function("standard_eval_startpos", |ben| ben.iter(|| black_box(standard.evaluate(black_box(&start)))));
    c.bench_function("standard_eval_kiwipete", |ben| ben.iter(|| black_box(standard.evaluate(black_box(&kiwi)))));
    c.bench_function("material_eval_kiwipete", |ben| ben.iter(|| black_box(material.evaluate(black_box(&kiwi)))));
}

criterion_group!(benches, bench_eval);
criterion_main!(benches);
