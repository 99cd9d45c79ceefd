use criterion::{black_box, criterion_group, criterion_main, Criterion};
use knightfall::search::alphabeta::{SearchParams, Searcher};
use knightfall::Position;

fn bench_search(c: &mut Criterion) {
    let b = Position::startpos();
    let mut group = c.benchmark_group("search_depth_3_startpos");
    group.sample_size(10);
    for order_moves in [true, false] {
        let label = if order_moves { "ordered" } else { "unordered" };
        group.bench_function(label, |ben| {
            ben.iter(|| {
                let mut p = SearchParams::default();
                p.depth = 3;
                p.order_moves = order_moves;
                let mut s = Searcher::default();
                let r = s.search_with_params(black_box(&b), p);
                black_box(r.nodes)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
