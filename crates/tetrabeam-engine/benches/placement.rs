use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tetrabeam_engine::{
    BitBoard, Piece, PieceKind, PieceRotation, find_drop_row, generate_moves,
};

fn midgame_board() -> BitBoard {
    BitBoard::from_ascii(
        "
        ..........
        ....#.....
        ...###..#.
        #.#####.##
        ###.######
        ####.#####
        ",
    )
}

/// 1,000 drop resolutions per iteration: every (kind, rotation, column) on
/// two boards, repeated.
fn bench_find_drop_row(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_drop_row");
    for (name, board) in [("empty", BitBoard::EMPTY), ("midgame", midgame_board())] {
        group.bench_with_input(BenchmarkId::new("1000_calls", name), &board, |b, board| {
            b.iter(|| {
                let mut calls = 0;
                let mut acc = 0;
                while calls < 1000 {
                    for kind in PieceKind::ALL {
                        for rotation in PieceRotation::ALL {
                            for col in 0..BitBoard::WIDTH {
                                if calls == 1000 {
                                    break;
                                }
                                calls += 1;
                                acc += find_drop_row(black_box(board), kind, rotation, col)
                                    .unwrap_or(0);
                            }
                        }
                    }
                }
                acc
            });
        });
    }
    group.finish();
}

fn bench_generate_moves(c: &mut Criterion) {
    let board = midgame_board();
    let mut out = Vec::with_capacity(64);
    c.bench_function("generate_moves_midgame_all_kinds", |b| {
        b.iter(|| {
            let mut total = 0;
            for kind in PieceKind::ALL {
                out.clear();
                total += generate_moves(black_box(&board), &Piece::new(kind), false, &mut out);
            }
            total
        });
    });
}

criterion_group!(benches, bench_find_drop_row, bench_generate_moves);
criterion_main!(benches);
