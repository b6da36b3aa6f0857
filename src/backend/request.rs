//! Marshalled operation requests handed to a backend

use super::Backend;
use crate::container::{Matrix, Scalar, Vector};
use crate::context::Context;
use crate::dtype::Value;
use crate::op::{BinaryOp, SelectOp, UnaryOp};

/// One fully marshalled operation: output and operand containers, resolved
/// canonical operator instances, and the fold init value where applicable.
///
/// Requests hold shared ownership of their containers, so a request queued
/// in a schedule keeps every referenced resource alive until it runs.
/// Validation happens before a request is constructed; a backend may assume
/// shapes and dtypes are consistent.
#[derive(Clone, Debug)]
pub enum OpRequest<B: Backend> {
    /// `C = A (x) B` under (mult, add)
    Mxm {
        /// Output, shape `(A.rows, B.cols)`
        c: Matrix<B>,
        /// Left operand
        a: Matrix<B>,
        /// Right operand
        b: Matrix<B>,
        /// Pairwise multiply step
        mult: &'static BinaryOp,
        /// Accumulate step
        add: &'static BinaryOp,
        /// Fold start value
        init: Value,
    },
    /// `C = A (x) B^T`, computed only where the mask passes `select`
    MxmTMasked {
        /// Output, shape `(A.rows, B.rows)`
        c: Matrix<B>,
        /// Mask with `C`'s shape
        mask: Matrix<B>,
        /// Left operand
        a: Matrix<B>,
        /// Right operand, implicitly transposed
        b: Matrix<B>,
        /// Pairwise multiply step
        mult: &'static BinaryOp,
        /// Accumulate step
        add: &'static BinaryOp,
        /// Mask gate
        select: &'static SelectOp,
        /// Fold start value
        init: Value,
    },
    /// `r = M (x) v` (contraction over columns), masked
    MxvMasked {
        /// Output, length `M.rows`
        r: Vector<B>,
        /// Mask with `r`'s length
        mask: Vector<B>,
        /// Matrix operand
        m: Matrix<B>,
        /// Vector operand, length `M.cols`
        v: Vector<B>,
        /// Pairwise multiply step
        mult: &'static BinaryOp,
        /// Accumulate step
        add: &'static BinaryOp,
        /// Mask gate
        select: &'static SelectOp,
        /// Fold start value
        init: Value,
    },
    /// `r = v (x) M` (contraction over rows), masked
    VxmMasked {
        /// Output, length `M.cols`
        r: Vector<B>,
        /// Mask with `r`'s length
        mask: Vector<B>,
        /// Vector operand, length `M.rows`
        v: Vector<B>,
        /// Matrix operand
        m: Matrix<B>,
        /// Pairwise multiply step
        mult: &'static BinaryOp,
        /// Accumulate step
        add: &'static BinaryOp,
        /// Mask gate
        select: &'static SelectOp,
        /// Fold start value
        init: Value,
    },
    /// Element-wise union of matrix patterns
    MEadd {
        /// Output
        c: Matrix<B>,
        /// Left operand
        a: Matrix<B>,
        /// Right operand
        b: Matrix<B>,
        /// Combiner for both-present cells
        op: &'static BinaryOp,
    },
    /// Element-wise intersection of matrix patterns
    MEmult {
        /// Output
        c: Matrix<B>,
        /// Left operand
        a: Matrix<B>,
        /// Right operand
        b: Matrix<B>,
        /// Combiner for both-present cells
        op: &'static BinaryOp,
    },
    /// Element-wise union of vector patterns
    VEadd {
        /// Output
        r: Vector<B>,
        /// Left operand
        u: Vector<B>,
        /// Right operand
        v: Vector<B>,
        /// Combiner for both-present entries
        op: &'static BinaryOp,
    },
    /// Element-wise union merged into `r`, with changed entries echoed
    /// into a feedback vector
    VEaddFdb {
        /// Combined output
        r: Vector<B>,
        /// Vector merged into `r`
        v: Vector<B>,
        /// Receives the entries of `r` that changed
        fdb: Vector<B>,
        /// Combiner for both-present entries
        op: &'static BinaryOp,
    },
    /// Element-wise intersection of vector patterns
    VEmult {
        /// Output
        r: Vector<B>,
        /// Left operand
        u: Vector<B>,
        /// Right operand
        v: Vector<B>,
        /// Combiner for both-present entries
        op: &'static BinaryOp,
    },
    /// Fold all present matrix values into a scalar
    MReduce {
        /// Output
        s: Scalar<B>,
        /// Operand
        m: Matrix<B>,
        /// Fold operator
        op: &'static BinaryOp,
        /// Fold start value
        init: Value,
    },
    /// Fold all present vector values into a scalar
    VReduce {
        /// Output
        s: Scalar<B>,
        /// Operand
        v: Vector<B>,
        /// Fold operator
        op: &'static BinaryOp,
        /// Fold start value
        init: Value,
    },
    /// Fold each matrix row into one vector entry; empty rows stay absent
    MReduceByRow {
        /// Output, length `M.rows`
        r: Vector<B>,
        /// Operand
        m: Matrix<B>,
        /// Fold operator
        op: &'static BinaryOp,
        /// Fold start value
        init: Value,
    },
    /// Fold each matrix column into one vector entry; empty columns stay absent
    MReduceByColumn {
        /// Output, length `M.cols`
        r: Vector<B>,
        /// Operand
        m: Matrix<B>,
        /// Fold operator
        op: &'static BinaryOp,
        /// Fold start value
        init: Value,
    },
    /// `C = A^T` with a unary map applied to every value
    Transpose {
        /// Output, shape `(A.cols, A.rows)`
        c: Matrix<B>,
        /// Operand
        a: Matrix<B>,
        /// Value map (identity for a plain transpose)
        apply: &'static UnaryOp,
    },
    /// Project one matrix row into a vector
    ExtractRow {
        /// Output, length `A.cols`
        r: Vector<B>,
        /// Operand
        a: Matrix<B>,
        /// Row index
        index: u32,
        /// Value map
        apply: &'static UnaryOp,
    },
    /// Project one matrix column into a vector
    ExtractColumn {
        /// Output, length `A.rows`
        r: Vector<B>,
        /// Operand
        a: Matrix<B>,
        /// Column index
        index: u32,
        /// Value map
        apply: &'static UnaryOp,
    },
    /// Kronecker product
    Kron {
        /// Output, shape `(A.rows * B.rows, A.cols * B.cols)`
        c: Matrix<B>,
        /// Left operand
        a: Matrix<B>,
        /// Right operand
        b: Matrix<B>,
        /// Pairwise multiply step
        mult: &'static BinaryOp,
    },
    /// Elementwise unary transform, pattern preserved
    VMap {
        /// Output, same length as `v`
        r: Vector<B>,
        /// Operand
        v: Vector<B>,
        /// Value map
        apply: &'static UnaryOp,
    },
    /// Masked in-place assignment, the contract's sole in-place mutator
    VAssignMasked {
        /// Container updated in place
        r: Vector<B>,
        /// Mask with `r`'s length
        mask: Vector<B>,
        /// Right-hand side of the assignment
        value: Value,
        /// Combiner applied as `assign(old, value)`; an absent old entry
        /// receives `value` directly
        assign: &'static BinaryOp,
        /// Mask gate
        select: &'static SelectOp,
    },
}

impl<B: Backend> OpRequest<B> {
    /// Short operation name, used for logging and task labels
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mxm { .. } => "mxm",
            Self::MxmTMasked { .. } => "mxmT_masked",
            Self::MxvMasked { .. } => "mxv_masked",
            Self::VxmMasked { .. } => "vxm_masked",
            Self::MEadd { .. } => "m_eadd",
            Self::MEmult { .. } => "m_emult",
            Self::VEadd { .. } => "v_eadd",
            Self::VEaddFdb { .. } => "v_eadd_fdb",
            Self::VEmult { .. } => "v_emult",
            Self::MReduce { .. } => "m_reduce",
            Self::VReduce { .. } => "v_reduce",
            Self::MReduceByRow { .. } => "m_reduce_by_row",
            Self::MReduceByColumn { .. } => "m_reduce_by_column",
            Self::Transpose { .. } => "m_transpose",
            Self::ExtractRow { .. } => "m_extract_row",
            Self::ExtractColumn { .. } => "m_extract_column",
            Self::Kron { .. } => "m_kron",
            Self::VMap { .. } => "v_map",
            Self::VAssignMasked { .. } => "v_assign_masked",
        }
    }

    /// Context of the output container; every operand shares it
    pub fn context(&self) -> &Context<B> {
        match self {
            Self::Mxm { c, .. }
            | Self::MxmTMasked { c, .. }
            | Self::MEadd { c, .. }
            | Self::MEmult { c, .. }
            | Self::Transpose { c, .. }
            | Self::Kron { c, .. } => c.context(),
            Self::MxvMasked { r, .. }
            | Self::VxmMasked { r, .. }
            | Self::VEadd { r, .. }
            | Self::VEaddFdb { r, .. }
            | Self::VEmult { r, .. }
            | Self::MReduceByRow { r, .. }
            | Self::MReduceByColumn { r, .. }
            | Self::ExtractRow { r, .. }
            | Self::ExtractColumn { r, .. }
            | Self::VMap { r, .. }
            | Self::VAssignMasked { r, .. } => r.context(),
            Self::MReduce { s, .. } | Self::VReduce { s, .. } => s.context(),
        }
    }
}
