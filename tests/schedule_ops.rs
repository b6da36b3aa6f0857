//! Integration tests for deferred execution through schedules

#![cfg(feature = "cpu")]

mod common;

use common::{bin, ctx, un};
use sparla::backend::Descriptor;
use sparla::container::{Matrix, Scalar, Vector};
use sparla::dtype::DType;
use sparla::error::Error;
use sparla::exec::{self, Schedule};
use sparla::op::{BinaryOpName, UnaryOpName};

#[test]
fn tasks_defer_until_submit() {
    let ctx = ctx();
    let a = Matrix::from_lists(&ctx, 2, 2, &[0, 1], &[1, 0], &[2i32, 3]).unwrap();
    let t = Matrix::new(&ctx, DType::Int, 2, 2).unwrap();
    let s = Scalar::new(&ctx, DType::Int).unwrap();

    let mut schedule = Schedule::new();
    schedule.step_task(exec::m_transpose(&t, &a, un(UnaryOpName::Identity)).unwrap());
    schedule.step_task(exec::m_reduce(&s, &t, bin(BinaryOpName::Plus), None).unwrap());
    assert_eq!(schedule.n_steps(), 2);

    // Nothing has run yet.
    assert_eq!(t.n_values().unwrap(), 0);

    schedule.submit().unwrap();
    assert_eq!(t.get::<i32>(0, 1).unwrap(), Some(3));
    assert_eq!(s.get::<i32>().unwrap(), 5);
}

#[test]
fn one_step_can_hold_independent_tasks() {
    let ctx = ctx();
    let m = Matrix::from_lists(&ctx, 2, 3, &[0, 0, 1], &[0, 2, 1], &[1i32, 2, 3]).unwrap();
    let by_row = Vector::new(&ctx, DType::Int, 2).unwrap();
    let by_col = Vector::new(&ctx, DType::Int, 3).unwrap();
    let plus = bin(BinaryOpName::Plus);

    let mut schedule = Schedule::new();
    schedule.step_tasks(vec![
        exec::m_reduce_by_row(&by_row, &m, plus, None).unwrap(),
        exec::m_reduce_by_column(&by_col, &m, plus, None).unwrap(),
    ]);
    schedule.submit().unwrap();

    assert_eq!(by_row.read::<i32>().unwrap(), (vec![0, 1], vec![3, 3]));
    assert_eq!(by_col.read::<i32>().unwrap(), (vec![0, 1, 2], vec![1, 3, 2]));
}

#[test]
fn task_survives_dropped_caller_handles() {
    let ctx = ctx();
    let out = Matrix::new(&ctx, DType::Int, 2, 2).unwrap();
    let task = {
        let a = Matrix::from_lists(&ctx, 2, 2, &[0], &[1], &[7i32]).unwrap();
        exec::m_transpose(&out, &a, un(UnaryOpName::Identity)).unwrap()
        // `a` drops here; the task keeps the operand alive.
    };
    assert_eq!(task.name(), "m_transpose");
    task.execute().unwrap();
    assert_eq!(out.get::<i32>(1, 0).unwrap(), Some(7));
}

#[test]
fn builder_failure_precedes_any_backend_work() {
    let ctx = ctx();
    let a = Matrix::new(&ctx, DType::Int, 2, 2).unwrap();
    let wrong = Matrix::new(&ctx, DType::Int, 3, 3).unwrap();
    let c = Matrix::from_lists(&ctx, 2, 2, &[0], &[0], &[1i32]).unwrap();
    assert!(matches!(
        exec::m_eadd(&c, &a, &wrong, bin(BinaryOpName::Plus)),
        Err(Error::DimensionMismatch { .. })
    ));
    // The output still holds its pre-call contents.
    assert_eq!(c.get::<i32>(0, 0).unwrap(), Some(1));
}

#[test]
fn descriptor_is_carried_on_the_task() {
    let ctx = ctx();
    let v = Vector::from_lists(&ctx, 3, &[0], &[1i32]).unwrap();
    let r = Vector::new(&ctx, DType::Int, 3).unwrap();
    let task = exec::v_map(&r, &v, un(UnaryOpName::Identity))
        .unwrap()
        .with_desc(Descriptor::new().with_label("copy-frontier"));
    assert_eq!(task.desc().label.as_deref(), Some("copy-frontier"));
    task.execute().unwrap();
    assert_eq!(r.n_values().unwrap(), 1);
}
