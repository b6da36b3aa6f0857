//! Integration tests for the algebraic primitives: products, merges,
//! reductions, transforms, and masking behavior

#![cfg(feature = "cpu")]

mod common;

use common::{bin, ctx, sel, un};
use sparla::container::{Matrix, Vector};
use sparla::dtype::{DType, Value};
use sparla::error::Error;
use sparla::op::{BinaryOpName, SelectOpName, UnaryOpName};

#[test]
fn mxm_standard_semiring() {
    let ctx = ctx();
    // [[1, 2], [., 3]] x [[., 4], [5, .]] = [[10, 4], [15, .]]
    let a = Matrix::from_lists(&ctx, 2, 2, &[0, 0, 1], &[0, 1, 1], &[1i32, 2, 3]).unwrap();
    let b = Matrix::from_lists(&ctx, 2, 2, &[0, 1], &[1, 0], &[4i32, 5]).unwrap();
    let c = a.mxm(&b, bin(BinaryOpName::Mult), bin(BinaryOpName::Plus)).unwrap();
    let (rows, cols, values) = c.read::<i32>().unwrap();
    assert_eq!(rows, vec![0, 0, 1]);
    assert_eq!(cols, vec![0, 1, 0]);
    assert_eq!(values, vec![10, 4, 15]);
}

#[test]
fn mxm_rejects_inner_dimension_mismatch() {
    let ctx = ctx();
    let a = Matrix::new(&ctx, DType::Int, 2, 3).unwrap();
    let b = Matrix::new(&ctx, DType::Int, 2, 2).unwrap();
    assert!(matches!(
        a.mxm(&b, bin(BinaryOpName::Mult), bin(BinaryOpName::Plus)),
        Err(Error::DimensionMismatch { .. })
    ));
}

#[test]
fn eadd_pattern_is_union_with_passthrough() {
    let ctx = ctx();
    let a = Matrix::from_lists(&ctx, 2, 2, &[0, 1], &[0, 1], &[1i32, 2]).unwrap();
    let b = Matrix::from_lists(&ctx, 2, 2, &[0, 1], &[1, 1], &[10i32, 20]).unwrap();
    let c = a.eadd(&b, bin(BinaryOpName::Plus)).unwrap();
    let (rows, cols, values) = c.read::<i32>().unwrap();
    // Union of patterns; single-sided entries pass through untouched.
    assert_eq!(rows, vec![0, 0, 1]);
    assert_eq!(cols, vec![0, 1, 1]);
    assert_eq!(values, vec![1, 10, 22]);
}

#[test]
fn emult_pattern_is_intersection() {
    let ctx = ctx();
    let a = Matrix::from_lists(&ctx, 2, 2, &[0, 1], &[0, 1], &[1i32, 2]).unwrap();
    let b = Matrix::from_lists(&ctx, 2, 2, &[0, 1], &[1, 1], &[10i32, 20]).unwrap();
    let c = a.emult(&b, bin(BinaryOpName::Plus)).unwrap();
    let (rows, cols, values) = c.read::<i32>().unwrap();
    assert_eq!(rows, vec![1]);
    assert_eq!(cols, vec![1]);
    assert_eq!(values, vec![22]);
}

#[test]
fn eadd_emult_against_own_transpose() {
    let ctx = ctx();
    let m = Matrix::from_lists(&ctx, 2, 2, &[0, 0, 1], &[0, 1, 1], &[1i32, 2, 3]).unwrap();
    let mt = m.transposed(un(UnaryOpName::Identity)).unwrap();
    let mult = bin(BinaryOpName::Mult);

    let sum = m.eadd(&mt, mult).unwrap();
    let (rows, cols, values) = sum.read::<i32>().unwrap();
    assert_eq!(rows, vec![0, 0, 1, 1]);
    assert_eq!(cols, vec![0, 1, 0, 1]);
    assert_eq!(values, vec![1, 2, 2, 9]);

    let prod = m.emult(&mt, mult).unwrap();
    let (rows, cols, values) = prod.read::<i32>().unwrap();
    assert_eq!(rows, vec![0, 1]);
    assert_eq!(cols, vec![0, 1]);
    assert_eq!(values, vec![1, 9]);
}

#[test]
fn vector_eadd_emult() {
    let ctx = ctx();
    let u = Vector::from_lists(&ctx, 5, &[0, 2], &[1i32, 2]).unwrap();
    let v = Vector::from_lists(&ctx, 5, &[1, 2], &[10i32, 20]).unwrap();
    let sum = u.eadd(&v, bin(BinaryOpName::Plus)).unwrap();
    let (keys, values) = sum.read::<i32>().unwrap();
    assert_eq!(keys, vec![0, 1, 2]);
    assert_eq!(values, vec![1, 10, 22]);
    let prod = u.emult(&v, bin(BinaryOpName::Mult)).unwrap();
    let (keys, values) = prod.read::<i32>().unwrap();
    assert_eq!(keys, vec![2]);
    assert_eq!(values, vec![40]);
}

#[test]
fn vector_eadd_fdb_reports_changed_entries() {
    let ctx = ctx();
    let r = Vector::from_lists(&ctx, 5, &[0, 2], &[1i32, 2]).unwrap();
    let v = Vector::from_lists(&ctx, 5, &[1, 2], &[10i32, 20]).unwrap();
    let fdb = Vector::new(&ctx, DType::Int, 5).unwrap();
    r.eadd_fdb(&v, &fdb, bin(BinaryOpName::Plus)).unwrap();
    let (keys, values) = r.read::<i32>().unwrap();
    assert_eq!(keys, vec![0, 1, 2]);
    assert_eq!(values, vec![1, 10, 22]);
    // Key 0 kept its old value, so only the insert and the combine feed back.
    let (keys, values) = fdb.read::<i32>().unwrap();
    assert_eq!(keys, vec![1, 2]);
    assert_eq!(values, vec![10, 22]);
    // Stale feedback never survives a run with nothing to merge.
    let empty = Vector::new(&ctx, DType::Int, 5).unwrap();
    r.eadd_fdb(&empty, &fdb, bin(BinaryOpName::Plus)).unwrap();
    assert_eq!(fdb.n_values().unwrap(), 0);
    assert!(matches!(
        r.eadd_fdb(&Vector::new(&ctx, DType::Int, 4).unwrap(), &fdb, bin(BinaryOpName::Plus)),
        Err(Error::DimensionMismatch { .. })
    ));
}

#[test]
fn reduce_defaults_to_operator_neutral() {
    let ctx = ctx();
    let m = Matrix::from_lists(&ctx, 2, 2, &[0, 1], &[1, 0], &[3i32, 4]).unwrap();
    // A multiplicative fold must start from 1, not from the dtype zero.
    let prod = m.reduce(bin(BinaryOpName::Mult), None).unwrap();
    assert_eq!(prod.get::<i32>().unwrap(), 12);
    // MAX starts from the dtype minimum.
    let max = m.reduce(bin(BinaryOpName::Max), None).unwrap();
    assert_eq!(max.get::<i32>().unwrap(), 4);
    // An empty container folds to the init value itself.
    let empty = Matrix::new(&ctx, DType::Int, 2, 2).unwrap();
    let s = empty.reduce(bin(BinaryOpName::Mult), None).unwrap();
    assert_eq!(s.get::<i32>().unwrap(), 1);
}

#[test]
fn reduce_honors_explicit_init() {
    let ctx = ctx();
    let v = Vector::from_lists(&ctx, 3, &[0, 2], &[3i32, 4]).unwrap();
    let s = v.reduce(bin(BinaryOpName::Plus), Some(Value::Int(100))).unwrap();
    assert_eq!(s.get::<i32>().unwrap(), 107);
    assert!(matches!(
        v.reduce(bin(BinaryOpName::Plus), Some(Value::Float(0.0))),
        Err(Error::DTypeMismatch { .. })
    ));
}

#[test]
fn reduce_explicit_init_counts_once_above_parallel_threshold() {
    use sparla::backend::cpu::{CpuBackend, CpuConfig};
    use sparla::context::Context;

    let backend = CpuBackend::with_config(CpuConfig {
        parallel_threshold: 64,
    });
    let ctx = Context::new(backend);
    let n = 10_000u32;
    let keys: Vec<u32> = (0..n).collect();
    let values = vec![1i32; n as usize];
    let v = Vector::from_lists(&ctx, n, &keys, &values).unwrap();
    let s = v.reduce(bin(BinaryOpName::Plus), Some(Value::Int(100))).unwrap();
    assert_eq!(s.get::<i32>().unwrap(), 10_100);
}

#[test]
fn reduce_by_row_leaves_empty_rows_absent() {
    let ctx = ctx();
    let m = Matrix::from_lists(&ctx, 4, 3, &[0, 0, 3], &[0, 2, 1], &[1i32, 2, 7]).unwrap();
    let r = m.reduce_by_row(bin(BinaryOpName::Plus), None).unwrap();
    assert_eq!(r.n_rows(), 4);
    let (keys, values) = r.read::<i32>().unwrap();
    // Rows 1 and 2 have no entries, so they produce no output entry.
    assert_eq!(keys, vec![0, 3]);
    assert_eq!(values, vec![3, 7]);
    assert_eq!(r.get::<i32>(1).unwrap(), None);
}

#[test]
fn reduce_by_column() {
    let ctx = ctx();
    let m = Matrix::from_lists(&ctx, 2, 3, &[0, 1, 1], &[0, 0, 2], &[1i32, 2, 5]).unwrap();
    let r = m.reduce_by_column(bin(BinaryOpName::Plus), None).unwrap();
    let (keys, values) = r.read::<i32>().unwrap();
    assert_eq!(keys, vec![0, 2]);
    assert_eq!(values, vec![3, 5]);
    // An explicit init seeds every non-empty column.
    let r = m
        .reduce_by_column(bin(BinaryOpName::Plus), Some(Value::Int(100)))
        .unwrap();
    let (_, values) = r.read::<i32>().unwrap();
    assert_eq!(values, vec![103, 105]);
}

#[test]
fn transpose_is_an_involution() {
    let ctx = ctx();
    let ident = un(UnaryOpName::Identity);
    let m = Matrix::from_lists(&ctx, 2, 3, &[0, 0, 1], &[0, 2, 1], &[1i32, 2, 3]).unwrap();
    let back = m.transposed(ident).unwrap().transposed(ident).unwrap();
    assert_eq!(back.shape(), m.shape());
    assert_eq!(back.read::<i32>().unwrap(), m.read::<i32>().unwrap());
}

#[test]
fn transpose_applies_value_map() {
    let ctx = ctx();
    let m = Matrix::from_lists(&ctx, 2, 2, &[0], &[1], &[5i32]).unwrap();
    let t = m.transposed(un(UnaryOpName::Ainv)).unwrap();
    assert_eq!(t.get::<i32>(1, 0).unwrap(), Some(-5));
}

#[test]
fn extract_row_and_column() {
    let ctx = ctx();
    let m = Matrix::from_lists(&ctx, 2, 3, &[0, 0, 1], &[0, 2, 2], &[1i32, 2, 3]).unwrap();
    let ident = un(UnaryOpName::Identity);

    let row = m.extract_row(0, ident).unwrap();
    assert_eq!(row.n_rows(), 3);
    let (keys, values) = row.read::<i32>().unwrap();
    assert_eq!(keys, vec![0, 2]);
    assert_eq!(values, vec![1, 2]);

    let col = m.extract_column(2, ident).unwrap();
    assert_eq!(col.n_rows(), 2);
    let (keys, values) = col.read::<i32>().unwrap();
    assert_eq!(keys, vec![0, 1]);
    assert_eq!(values, vec![2, 3]);

    assert!(matches!(
        m.extract_row(2, ident),
        Err(Error::IndexOutOfRange { index: 2, size: 2 })
    ));
}

#[test]
fn kron_shape_and_placement() {
    let ctx = ctx();
    let a = Matrix::from_lists(&ctx, 2, 2, &[0, 1], &[1, 0], &[2i32, 3]).unwrap();
    let b = Matrix::from_lists(&ctx, 3, 1, &[1], &[0], &[5i32]).unwrap();
    let c = a.kron(&b, bin(BinaryOpName::Mult)).unwrap();
    assert_eq!(c.shape(), (6, 2));
    let (rows, cols, values) = c.read::<i32>().unwrap();
    // (0,1)x(1,0) -> (0*3+1, 1*1+0); (1,0)x(1,0) -> (1*3+1, 0).
    assert_eq!(rows, vec![1, 4]);
    assert_eq!(cols, vec![1, 0]);
    assert_eq!(values, vec![10, 15]);
}

#[test]
fn kronpow_base_cases() {
    let ctx = ctx();
    let a = Matrix::from_lists(&ctx, 2, 2, &[0, 1], &[1, 0], &[2i32, 3]).unwrap();
    let mult = bin(BinaryOpName::Mult);

    let id = a.kronpow(0, mult).unwrap();
    assert_eq!(id.shape(), (2, 2));
    let (rows, cols, values) = id.read::<i32>().unwrap();
    assert_eq!(rows, vec![0, 1]);
    assert_eq!(cols, vec![0, 1]);
    assert_eq!(values, vec![1, 1]);

    let same = a.kronpow(1, mult).unwrap();
    assert_eq!(same.read::<i32>().unwrap(), a.read::<i32>().unwrap());

    let sq = a.kronpow(2, mult).unwrap();
    assert_eq!(sq.shape(), (4, 4));
    assert_eq!(sq.n_values().unwrap(), 4);
    // Off-diagonal block: a[0][1] * a = [[., 4], [6, .]] placed at rows 0..2, cols 2..4.
    assert_eq!(sq.get::<i32>(0, 3).unwrap(), Some(4));
    assert_eq!(sq.get::<i32>(1, 2).unwrap(), Some(6));
}

#[test]
fn mxmt_mask_gates_every_output() {
    let ctx = ctx();
    let a = Matrix::from_lists(&ctx, 2, 2, &[0, 0, 1, 1], &[0, 1, 0, 1], &[1i32, 1, 1, 1])
        .unwrap();
    // All-zero mask plus a never-passing gate: nothing may be computed.
    let mask =
        Matrix::from_lists(&ctx, 2, 2, &[0, 0, 1, 1], &[0, 1, 0, 1], &[0i32, 0, 0, 0]).unwrap();
    let c = a
        .mxmt(
            &mask,
            &a,
            bin(BinaryOpName::Mult),
            bin(BinaryOpName::Plus),
            sel(SelectOpName::Never),
        )
        .unwrap();
    assert_eq!(c.n_values().unwrap(), 0);

    // With a passing gate every masked-in dot product appears.
    let c = a
        .mxmt(
            &mask,
            &a,
            bin(BinaryOpName::Mult),
            bin(BinaryOpName::Plus),
            sel(SelectOpName::EqZero),
        )
        .unwrap();
    assert_eq!(c.n_values().unwrap(), 4);
    assert_eq!(c.get::<i32>(0, 0).unwrap(), Some(2));
}

#[test]
fn mxv_absent_mask_rows_are_never_computed() {
    let ctx = ctx();
    let m = Matrix::from_lists(&ctx, 2, 2, &[0, 1], &[0, 0], &[2i32, 3]).unwrap();
    let v = Vector::from_lists(&ctx, 2, &[0], &[10i32]).unwrap();
    // Mask present only at row 1: row 0 stays absent even though it has a
    // nonempty dot product.
    let mask = Vector::from_lists(&ctx, 2, &[1], &[1i32]).unwrap();
    let r = m
        .mxv(
            &mask,
            &v,
            bin(BinaryOpName::Mult),
            bin(BinaryOpName::Plus),
            sel(SelectOpName::Always),
        )
        .unwrap();
    let (keys, values) = r.read::<i32>().unwrap();
    assert_eq!(keys, vec![1]);
    assert_eq!(values, vec![30]);
}

#[test]
fn map_preserves_pattern() {
    let ctx = ctx();
    let v = Vector::from_lists(&ctx, 5, &[1, 3], &[-2i32, 4]).unwrap();
    let r = v.map(un(UnaryOpName::Abs)).unwrap();
    let (keys, values) = r.read::<i32>().unwrap();
    assert_eq!(keys, vec![1, 3]);
    assert_eq!(values, vec![2, 4]);
}

#[test]
fn assign_is_the_only_in_place_mutator() {
    let ctx = ctx();
    let v = Vector::from_lists(&ctx, 4, &[0, 2], &[5i32, 6]).unwrap();
    let mask = Vector::from_lists(&ctx, 4, &[0, 1, 3], &[1i32, 1, 0]).unwrap();
    v.assign(
        &mask,
        Value::Int(9),
        bin(BinaryOpName::Second),
        sel(SelectOpName::NqZero),
    )
    .unwrap();
    let (keys, values) = v.read::<i32>().unwrap();
    // Index 0 overwritten, 1 inserted, 2 untouched, 3 gated out by value 0.
    assert_eq!(keys, vec![0, 1, 2]);
    assert_eq!(values, vec![9, 9, 6]);
}
