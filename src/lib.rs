//! # sparla
//!
//! **Operator-parametrized sparse linear algebra with pluggable compute backends.**
//!
//! sparla provides GraphBLAS-style sparse containers (scalars, arrays,
//! vectors, matrices) and the algebraic primitives over them - matrix
//! products, element-wise merges, reductions, transforms - every one
//! parametrized by operators drawn from a fixed catalog instead of
//! hard-wired `+` and `*`.
//!
//! ## Why sparla?
//!
//! - **Operators, not arithmetic**: `mxm` over `(MULT, PLUS)` is matrix
//!   multiplication; over `(LAND, LOR)` it is graph reachability
//! - **Sparse discipline**: absent is not zero; output patterns follow from
//!   input patterns, never from identity elements
//! - **Masked execution**: products and assignments compute only where a
//!   mask container passes a select gate
//! - **Pluggable backends**: containers and primitives run against any
//!   implementation of the [`backend::Backend`] trait
//! - **Deferred pipelines**: validated tasks compose into step-ordered
//!   [`exec::Schedule`]s
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sparla::prelude::*;
//!
//! let ctx = Context::new(CpuBackend::new());
//! let a = Matrix::from_lists(&ctx, 2, 2, &[0, 0, 1], &[0, 1, 1], &[1, 2, 3])?;
//! let b = Matrix::from_lists(&ctx, 2, 2, &[0, 1], &[1, 0], &[4, 5])?;
//!
//! let mult = resolve_binary(BinaryOpName::Mult, DType::Int)?;
//! let plus = resolve_binary(BinaryOpName::Plus, DType::Int)?;
//! let c = a.mxm(&b, mult, plus)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `cpu` (default): reference CPU backend
//! - `rayon` (default): multi-threaded CPU kernels

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod backend;
pub mod container;
pub mod context;
pub mod dtype;
pub mod error;
pub mod exec;
pub mod op;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::backend::{Backend, Descriptor, MemView};
    pub use crate::container::{Array, Matrix, Scalar, Vector};
    pub use crate::context::Context;
    pub use crate::dtype::{DType, Element, Value};
    pub use crate::error::{Error, Result, Status};
    pub use crate::exec::{Schedule, ScheduleTask};
    pub use crate::op::{
        resolve_binary, resolve_select, resolve_unary, BinaryOpName, SelectOpName, UnaryOpName,
    };

    #[cfg(feature = "cpu")]
    pub use crate::backend::cpu::CpuBackend;
}

/// Default backend based on enabled features
#[cfg(feature = "cpu")]
pub type DefaultBackend = backend::cpu::CpuBackend;
