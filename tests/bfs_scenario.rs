//! Frontier-based breadth-first search built from `assign` + `vxm`
//!
//! Exercises the masked-update loop the in-place `assign` exists for: the
//! depth vector doubles as the visited mask (explicit zero = unvisited), the
//! frontier advances through a `(LAND, LOR)` vector-matrix product gated by
//! `EQZERO`, and the loop stops when the frontier folds to zero.

#![cfg(feature = "cpu")]

mod common;

use common::{bin, ctx, sel};
use sparla::backend::cpu::CpuBackend;
use sparla::container::{Matrix, Vector};
use sparla::dtype::{DType, Value};
use sparla::op::{BinaryOpName, SelectOpName};

/// Depth vector of a BFS over `graph` from `source`: 1 at the source,
/// `d + 1` one hop past depth `d`, explicit 0 at unreached vertices.
fn bfs(graph: &Matrix<CpuBackend>, source: u32) -> (Vector<CpuBackend>, u32) {
    let ctx = graph.context();
    let n = graph.n_rows();

    // Dense zero depth vector: every vertex starts explicitly unvisited so
    // the EQZERO gate can see it.
    let keys: Vec<u32> = (0..n).collect();
    let depth = Vector::from_lists(ctx, n, &keys, &vec![0i32; n as usize]).unwrap();

    let mut front = Vector::new(ctx, DType::Int, n).unwrap();
    front.set(source, 1i32).unwrap();

    let land = bin(BinaryOpName::Land);
    let lor = bin(BinaryOpName::Lor);
    let second = bin(BinaryOpName::Second);
    let nqzero = sel(SelectOpName::NqZero);
    let eqzero = sel(SelectOpName::EqZero);

    let mut steps = 0u32;
    let mut current = 0i32;
    while front.count_nonzero().unwrap() > 0 {
        steps += 1;
        current += 1;
        // Stamp the frontier's depth, then advance into still-zero vertices.
        depth
            .assign(&front, Value::Int(current), second, nqzero)
            .unwrap();
        front = front.vxm(&depth, graph, land, lor, eqzero).unwrap();
    }
    (depth, steps)
}

#[test]
fn bfs_on_cycle_with_branch() {
    let ctx = ctx();
    // 0 -> 1 -> 2 -> 0, plus 2 <-> 3.
    let graph = Matrix::from_lists(
        &ctx,
        4,
        4,
        &[0, 1, 2, 2, 3],
        &[1, 2, 0, 3, 2],
        &[1i32, 1, 1, 1, 1],
    )
    .unwrap();

    let (depth, steps) = bfs(&graph, 0);
    assert_eq!(steps, 4, "traversal must terminate in four frontier steps");

    let (keys, values) = depth.read::<i32>().unwrap();
    assert_eq!(keys, vec![0, 1, 2, 3]);
    assert_eq!(values, vec![1, 2, 3, 4]);

    // Reached count and max depth via reductions.
    assert_eq!(depth.count_nonzero().unwrap(), 4);
    let max = depth.reduce(bin(BinaryOpName::Max), None).unwrap();
    assert_eq!(max.get::<i32>().unwrap(), 4);
}

#[test]
fn bfs_leaves_unreachable_vertices_at_zero() {
    let ctx = ctx();
    // 0 -> 1; vertex 2 is disconnected.
    let graph = Matrix::from_lists(&ctx, 3, 3, &[0], &[1], &[1i32]).unwrap();
    let (depth, steps) = bfs(&graph, 0);
    assert_eq!(steps, 2);
    assert_eq!(depth.count_nonzero().unwrap(), 2);
    assert_eq!(depth.get::<i32>(2).unwrap(), Some(0));
}
