use criterion::{criterion_group, Criterion};
use robdd::{DDManager, NodeID, VarID};

/// One variable per square, one queen per row, no attacking pair.
fn queens_board(man: &mut DDManager, n: usize) -> NodeID {
    man.create_variables(n * n);
    let square = |row: usize, col: usize| VarID((row * n + col) as u32);

    let and_acc = |man: &mut DDManager, acc: NodeID, x: NodeID| {
        man.reference(x);
        let next = man.and(acc, x);
        man.reference(next);
        man.dereference(x);
        man.dereference(acc);
        next
    };

    let mut board = man.one();

    for row in 0..n {
        let mut some_queen = man.zero();
        for col in 0..n {
            let x = man.ith_var(square(row, col));
            let next = man.or(some_queen, x);
            man.reference(next);
            man.dereference(some_queen);
            some_queen = next;
        }
        board = and_acc(man, board, some_queen);
        man.dereference(some_queen);
    }

    for row in 0..n {
        for col in 0..n {
            for other_row in row..n {
                for other_col in 0..n {
                    if (other_row, other_col) <= (row, col) {
                        continue;
                    }
                    let same_row = other_row == row;
                    let same_col = other_col == col;
                    let diagonal = row.abs_diff(other_row) == col.abs_diff(other_col);
                    if !(same_row || same_col || diagonal) {
                        continue;
                    }
                    let a = man.ith_var(square(row, col));
                    let b = man.ith_var(square(other_row, other_col));
                    let peaceful = man.nand(a, b);
                    board = and_acc(man, board, peaceful);
                }
            }
        }
    }

    board
}

pub fn queens_8_build(c: &mut Criterion) {
    c.bench_function("queens_8_build", |b| {
        b.iter(|| {
            let mut man = DDManager::default();
            queens_board(&mut man, 8)
        })
    });
}

pub fn queens_8_sat_count(c: &mut Criterion) {
    let mut man = DDManager::default();
    let board = queens_board(&mut man, 8);

    c.bench_function("queens_8_sat_count", |b| b.iter(|| man.sat_count(board)));
}

criterion_group!(queens, queens_8_build, queens_8_sat_count);
