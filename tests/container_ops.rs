//! Integration tests for container construction, access, and validation

#![cfg(feature = "cpu")]

mod common;

use common::ctx;
use sparla::container::{Array, Matrix, Scalar, Vector};
use sparla::dtype::{DType, Value};
use sparla::error::Error;
use sparla::op::{self, BinaryOpName};

#[test]
fn scalar_set_get() {
    let ctx = ctx();
    let s = Scalar::from_element(&ctx, 42i32).unwrap();
    assert_eq!(s.dtype(), DType::Int);
    assert_eq!(s.get::<i32>().unwrap(), 42);
    s.set(7i32).unwrap();
    assert_eq!(s.get_value().unwrap(), Value::Int(7));
}

#[test]
fn scalar_rejects_foreign_dtype() {
    let ctx = ctx();
    let s = Scalar::from_element(&ctx, 1.5f32).unwrap();
    assert!(matches!(s.get::<i32>(), Err(Error::DTypeMismatch { .. })));
    assert!(matches!(s.set(3u32), Err(Error::DTypeMismatch { .. })));
}

#[test]
fn array_build_read_resize() {
    let ctx = ctx();
    let a = Array::from_slice(&ctx, &[1i32, 2, 3]).unwrap();
    assert_eq!(a.len().unwrap(), 3);
    assert_eq!(a.read::<i32>().unwrap(), vec![1, 2, 3]);
    a.set(1, 20i32).unwrap();
    assert_eq!(a.get::<i32>(1).unwrap(), 20);
    a.resize(5).unwrap();
    assert_eq!(a.read::<i32>().unwrap(), vec![1, 20, 3, 0, 0]);
    a.clear().unwrap();
    assert!(a.is_empty().unwrap());
}

#[test]
fn array_index_bounds() {
    let ctx = ctx();
    let a = Array::new(&ctx, DType::Float, 2).unwrap();
    assert!(matches!(
        a.get::<f32>(2),
        Err(Error::IndexOutOfRange { index: 2, size: 2 })
    ));
}

#[test]
fn vector_from_unsorted_lists_keeps_last_duplicate() {
    let ctx = ctx();
    let v = Vector::from_lists(&ctx, 10, &[5, 1, 5], &[10i32, 20, 30]).unwrap();
    assert_eq!(v.n_values().unwrap(), 2);
    assert_eq!(v.get::<i32>(1).unwrap(), Some(20));
    assert_eq!(v.get::<i32>(5).unwrap(), Some(30));
    assert_eq!(v.get::<i32>(7).unwrap(), None);
}

#[test]
fn vector_absent_is_not_zero() {
    let ctx = ctx();
    let v = Vector::new(&ctx, DType::Int, 4).unwrap();
    v.set(0, 0i32).unwrap();
    v.set(2, 9i32).unwrap();
    // Two stored entries, one of them an explicit zero.
    assert_eq!(v.n_values().unwrap(), 2);
    assert_eq!(v.count_nonzero().unwrap(), 1);
    assert_eq!(v.get::<i32>(1).unwrap(), None);
    v.clear().unwrap();
    assert_eq!(v.n_values().unwrap(), 0);
    assert_eq!(v.n_rows(), 4);
}

#[test]
fn vector_build_validates_keys() {
    let ctx = ctx();
    let v = Vector::new(&ctx, DType::Int, 4).unwrap();
    assert!(matches!(
        v.build(&[2, 1], &[1i32, 2]),
        Err(Error::InvalidArgument { .. })
    ));
    assert!(matches!(
        v.build(&[1, 1], &[1i32, 2]),
        Err(Error::InvalidArgument { .. })
    ));
    assert!(matches!(
        v.build(&[1, 4], &[1i32, 2]),
        Err(Error::IndexOutOfRange { index: 4, size: 4 })
    ));
    // Failed builds leave the container empty.
    assert_eq!(v.n_values().unwrap(), 0);
}

#[test]
fn matrix_from_lists_row_major_read() {
    let ctx = ctx();
    let m = Matrix::from_lists(&ctx, 3, 3, &[2, 0, 0], &[1, 2, 0], &[7i32, 3, 1]).unwrap();
    assert_eq!(m.shape(), (3, 3));
    assert_eq!(m.n_values().unwrap(), 3);
    let (rows, cols, values) = m.read::<i32>().unwrap();
    assert_eq!(rows, vec![0, 0, 2]);
    assert_eq!(cols, vec![0, 2, 1]);
    assert_eq!(values, vec![1, 3, 7]);
    assert_eq!(m.get::<i32>(2, 1).unwrap(), Some(7));
    assert_eq!(m.get::<i32>(1, 1).unwrap(), None);
}

#[test]
fn matrix_build_rejects_unsorted_triples() {
    let ctx = ctx();
    let m = Matrix::new(&ctx, DType::Int, 2, 2).unwrap();
    assert!(matches!(
        m.build(&[1, 0], &[0, 0], &[1i32, 2]),
        Err(Error::InvalidArgument { .. })
    ));
    assert!(matches!(
        m.build(&[0, 2], &[0, 0], &[1i32, 2]),
        Err(Error::IndexOutOfRange { index: 2, size: 2 })
    ));
}

#[test]
fn matrix_copy_is_independent() {
    let ctx = ctx();
    let m = Matrix::from_lists(&ctx, 2, 2, &[0], &[1], &[5i32]).unwrap();
    let c = m.copy().unwrap();
    m.set(0, 1, 9i32).unwrap();
    assert_eq!(c.get::<i32>(0, 1).unwrap(), Some(5));
}

#[test]
fn operator_catalog_lookup() {
    let plus = op::resolve_binary(BinaryOpName::Plus, DType::Int).unwrap();
    assert_eq!(plus.key(), "OpBinary_PLUS_INT");
    assert_eq!(plus.apply(Value::Int(2), Value::Int(3)), Value::Int(5));

    // Bitwise ops have no float instance.
    match op::resolve_binary(BinaryOpName::Band, DType::Float) {
        Err(Error::OperatorNotSupported { key }) => {
            assert_eq!(key, "OpBinary_BAND_FLOAT");
        }
        other => panic!("expected OperatorNotSupported, got {other:?}"),
    }
}

#[test]
fn generate_validates_density() {
    let ctx = ctx();
    let mut rng = rand::thread_rng();
    assert!(matches!(
        Vector::generate(&ctx, 8, 1.5, 0, 9, &mut rng),
        Err(Error::InvalidArgument { .. })
    ));
    let v = Vector::generate(&ctx, 64, 0.5, 1i32, 9, &mut rng).unwrap();
    assert!(v.n_values().unwrap() <= 64);
    let m = Matrix::generate(&ctx, 8, 8, 1.0, 1i32, 9, &mut rng).unwrap();
    assert_eq!(m.n_values().unwrap(), 64);
}

#[test]
fn generate_follows_the_bound_dtype() {
    let ctx = ctx();
    let mut rng = rand::thread_rng();
    let v = Vector::generate(&ctx, 16, 1.0, 0.0f32, 1.0, &mut rng).unwrap();
    assert_eq!(v.dtype(), DType::Float);
    assert_eq!(v.n_values().unwrap(), 16);
    let m = Matrix::generate(&ctx, 4, 4, 1.0, 1u32, 9, &mut rng).unwrap();
    assert_eq!(m.dtype(), DType::Uint);
    let (_, _, values) = m.read::<u32>().unwrap();
    assert!(values.iter().all(|&x| (1..=9).contains(&x)));
}
