//! Shared helpers for integration tests

#![allow(dead_code)]

use sparla::backend::cpu::CpuBackend;
use sparla::context::Context;
use sparla::dtype::DType;
use sparla::op::{self, BinaryOp, BinaryOpName, SelectOp, SelectOpName, UnaryOp, UnaryOpName};

/// Fresh context over the reference CPU backend
pub fn ctx() -> Context<CpuBackend> {
    let _ = env_logger::builder().is_test(true).try_init();
    Context::new(CpuBackend::new())
}

/// Resolve a canonical INT binary operator
pub fn bin(name: BinaryOpName) -> &'static BinaryOp {
    op::resolve_binary(name, DType::Int).unwrap()
}

/// Resolve a canonical INT unary operator
pub fn un(name: UnaryOpName) -> &'static UnaryOp {
    op::resolve_unary(name, DType::Int).unwrap()
}

/// Resolve a canonical INT select operator
pub fn sel(name: SelectOpName) -> &'static SelectOp {
    op::resolve_select(name, DType::Int).unwrap()
}
