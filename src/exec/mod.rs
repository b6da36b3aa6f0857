//! Operation contract: validated task builders
//!
//! Every algebraic primitive enters the system through one builder here.
//! A builder checks shape agreement, dtype agreement between operands and
//! resolved operators, and index bounds, then packs the operands into an
//! [`OpRequest`] wrapped in a [`ScheduleTask`]. Nothing touches the backend
//! until the task runs, so a failed builder never mutates any container.
//!
//! Fold-carrying builders take `init: Option<Value>`; `None` falls back to
//! the accumulate operator's neutral element.

mod methods;
mod schedule;

pub use schedule::{Schedule, ScheduleTask};

use crate::backend::{Backend, OpRequest};
use crate::container::{Matrix, Scalar, Vector};
use crate::dtype::{DType, Value};
use crate::error::{Error, Result};
use crate::op::{BinaryOp, SelectOp, UnaryOp};

fn check_dtype(expected: DType, got: DType) -> Result<()> {
    if expected != got {
        return Err(Error::dtype_mismatch(expected, got));
    }
    Ok(())
}

fn check_vector_len<B: Backend>(v: &Vector<B>, expected: u32) -> Result<()> {
    if v.n_rows() != expected {
        return Err(Error::dimension_mismatch(&[expected], &[v.n_rows()]));
    }
    Ok(())
}

fn check_matrix_shape<B: Backend>(m: &Matrix<B>, rows: u32, cols: u32) -> Result<()> {
    if m.shape() != (rows, cols) {
        return Err(Error::dimension_mismatch(
            &[rows, cols],
            &[m.n_rows(), m.n_cols()],
        ));
    }
    Ok(())
}

fn resolve_init(init: Option<Value>, add: &'static BinaryOp) -> Result<Value> {
    match init {
        Some(v) => {
            check_dtype(add.dtype, v.dtype())?;
            Ok(v)
        }
        None => Ok(add.neutral),
    }
}

/// `C = A (x) B` under the `(mult, add)` semiring pair
pub fn mxm<B: Backend>(
    c: &Matrix<B>,
    a: &Matrix<B>,
    b: &Matrix<B>,
    mult: &'static BinaryOp,
    add: &'static BinaryOp,
    init: Option<Value>,
) -> Result<ScheduleTask<B>> {
    check_dtype(mult.dtype, a.dtype())?;
    check_dtype(mult.dtype, b.dtype())?;
    check_dtype(add.dtype, mult.dtype)?;
    check_dtype(c.dtype(), add.dtype)?;
    if a.n_cols() != b.n_rows() {
        return Err(Error::dimension_mismatch(&[a.n_cols()], &[b.n_rows()]));
    }
    check_matrix_shape(c, a.n_rows(), b.n_cols())?;
    let init = resolve_init(init, add)?;
    Ok(ScheduleTask::new(OpRequest::Mxm {
        c: c.clone(),
        a: a.clone(),
        b: b.clone(),
        mult,
        add,
        init,
    }))
}

/// `C = A (x) B^T` under `(mult, add)`, computed only where `select(mask)`
/// passes
pub fn mxmt_masked<B: Backend>(
    c: &Matrix<B>,
    mask: &Matrix<B>,
    a: &Matrix<B>,
    b: &Matrix<B>,
    mult: &'static BinaryOp,
    add: &'static BinaryOp,
    select: &'static SelectOp,
    init: Option<Value>,
) -> Result<ScheduleTask<B>> {
    check_dtype(mult.dtype, a.dtype())?;
    check_dtype(mult.dtype, b.dtype())?;
    check_dtype(add.dtype, mult.dtype)?;
    check_dtype(c.dtype(), add.dtype)?;
    check_dtype(select.dtype, mask.dtype())?;
    if a.n_cols() != b.n_cols() {
        return Err(Error::dimension_mismatch(&[a.n_cols()], &[b.n_cols()]));
    }
    check_matrix_shape(c, a.n_rows(), b.n_rows())?;
    check_matrix_shape(mask, c.n_rows(), c.n_cols())?;
    let init = resolve_init(init, add)?;
    Ok(ScheduleTask::new(OpRequest::MxmTMasked {
        c: c.clone(),
        mask: mask.clone(),
        a: a.clone(),
        b: b.clone(),
        mult,
        add,
        select,
        init,
    }))
}

/// `r = M (x) v` (contraction over columns), masked
pub fn mxv_masked<B: Backend>(
    r: &Vector<B>,
    mask: &Vector<B>,
    m: &Matrix<B>,
    v: &Vector<B>,
    mult: &'static BinaryOp,
    add: &'static BinaryOp,
    select: &'static SelectOp,
    init: Option<Value>,
) -> Result<ScheduleTask<B>> {
    check_dtype(mult.dtype, m.dtype())?;
    check_dtype(mult.dtype, v.dtype())?;
    check_dtype(add.dtype, mult.dtype)?;
    check_dtype(r.dtype(), add.dtype)?;
    check_dtype(select.dtype, mask.dtype())?;
    check_vector_len(v, m.n_cols())?;
    check_vector_len(r, m.n_rows())?;
    check_vector_len(mask, r.n_rows())?;
    let init = resolve_init(init, add)?;
    Ok(ScheduleTask::new(OpRequest::MxvMasked {
        r: r.clone(),
        mask: mask.clone(),
        m: m.clone(),
        v: v.clone(),
        mult,
        add,
        select,
        init,
    }))
}

/// `r = v (x) M` (contraction over rows), masked
pub fn vxm_masked<B: Backend>(
    r: &Vector<B>,
    mask: &Vector<B>,
    v: &Vector<B>,
    m: &Matrix<B>,
    mult: &'static BinaryOp,
    add: &'static BinaryOp,
    select: &'static SelectOp,
    init: Option<Value>,
) -> Result<ScheduleTask<B>> {
    check_dtype(mult.dtype, m.dtype())?;
    check_dtype(mult.dtype, v.dtype())?;
    check_dtype(add.dtype, mult.dtype)?;
    check_dtype(r.dtype(), add.dtype)?;
    check_dtype(select.dtype, mask.dtype())?;
    check_vector_len(v, m.n_rows())?;
    check_vector_len(r, m.n_cols())?;
    check_vector_len(mask, r.n_rows())?;
    let init = resolve_init(init, add)?;
    Ok(ScheduleTask::new(OpRequest::VxmMasked {
        r: r.clone(),
        mask: mask.clone(),
        v: v.clone(),
        m: m.clone(),
        mult,
        add,
        select,
        init,
    }))
}

/// `C = A (+) B`: union of patterns, `op` combines both-present cells
pub fn m_eadd<B: Backend>(
    c: &Matrix<B>,
    a: &Matrix<B>,
    b: &Matrix<B>,
    op: &'static BinaryOp,
) -> Result<ScheduleTask<B>> {
    check_dtype(op.dtype, a.dtype())?;
    check_dtype(op.dtype, b.dtype())?;
    check_dtype(c.dtype(), op.dtype)?;
    check_matrix_shape(a, c.n_rows(), c.n_cols())?;
    check_matrix_shape(b, c.n_rows(), c.n_cols())?;
    Ok(ScheduleTask::new(OpRequest::MEadd {
        c: c.clone(),
        a: a.clone(),
        b: b.clone(),
        op,
    }))
}

/// `C = A (.) B`: intersection of patterns, `op` combines each cell
pub fn m_emult<B: Backend>(
    c: &Matrix<B>,
    a: &Matrix<B>,
    b: &Matrix<B>,
    op: &'static BinaryOp,
) -> Result<ScheduleTask<B>> {
    check_dtype(op.dtype, a.dtype())?;
    check_dtype(op.dtype, b.dtype())?;
    check_dtype(c.dtype(), op.dtype)?;
    check_matrix_shape(a, c.n_rows(), c.n_cols())?;
    check_matrix_shape(b, c.n_rows(), c.n_cols())?;
    Ok(ScheduleTask::new(OpRequest::MEmult {
        c: c.clone(),
        a: a.clone(),
        b: b.clone(),
        op,
    }))
}

/// `r = u (+) v`: union of patterns, `op` combines both-present entries
pub fn v_eadd<B: Backend>(
    r: &Vector<B>,
    u: &Vector<B>,
    v: &Vector<B>,
    op: &'static BinaryOp,
) -> Result<ScheduleTask<B>> {
    check_dtype(op.dtype, u.dtype())?;
    check_dtype(op.dtype, v.dtype())?;
    check_dtype(r.dtype(), op.dtype)?;
    check_vector_len(u, r.n_rows())?;
    check_vector_len(v, r.n_rows())?;
    Ok(ScheduleTask::new(OpRequest::VEadd {
        r: r.clone(),
        u: u.clone(),
        v: v.clone(),
        op,
    }))
}

/// `r = r (+) v` with feedback: `fdb` is rebuilt to hold exactly the
/// entries of `r` that changed, each with its post-merge value
pub fn v_eadd_fdb<B: Backend>(
    r: &Vector<B>,
    v: &Vector<B>,
    fdb: &Vector<B>,
    op: &'static BinaryOp,
) -> Result<ScheduleTask<B>> {
    check_dtype(op.dtype, v.dtype())?;
    check_dtype(r.dtype(), op.dtype)?;
    check_dtype(fdb.dtype(), op.dtype)?;
    check_vector_len(v, r.n_rows())?;
    check_vector_len(fdb, r.n_rows())?;
    Ok(ScheduleTask::new(OpRequest::VEaddFdb {
        r: r.clone(),
        v: v.clone(),
        fdb: fdb.clone(),
        op,
    }))
}

/// `r = u (.) v`: intersection of patterns, `op` combines each entry
pub fn v_emult<B: Backend>(
    r: &Vector<B>,
    u: &Vector<B>,
    v: &Vector<B>,
    op: &'static BinaryOp,
) -> Result<ScheduleTask<B>> {
    check_dtype(op.dtype, u.dtype())?;
    check_dtype(op.dtype, v.dtype())?;
    check_dtype(r.dtype(), op.dtype)?;
    check_vector_len(u, r.n_rows())?;
    check_vector_len(v, r.n_rows())?;
    Ok(ScheduleTask::new(OpRequest::VEmult {
        r: r.clone(),
        u: u.clone(),
        v: v.clone(),
        op,
    }))
}

/// Fold every present matrix value into `s`
pub fn m_reduce<B: Backend>(
    s: &Scalar<B>,
    m: &Matrix<B>,
    op: &'static BinaryOp,
    init: Option<Value>,
) -> Result<ScheduleTask<B>> {
    check_dtype(op.dtype, m.dtype())?;
    check_dtype(s.dtype(), op.dtype)?;
    let init = resolve_init(init, op)?;
    Ok(ScheduleTask::new(OpRequest::MReduce {
        s: s.clone(),
        m: m.clone(),
        op,
        init,
    }))
}

/// Fold every present vector value into `s`
pub fn v_reduce<B: Backend>(
    s: &Scalar<B>,
    v: &Vector<B>,
    op: &'static BinaryOp,
    init: Option<Value>,
) -> Result<ScheduleTask<B>> {
    check_dtype(op.dtype, v.dtype())?;
    check_dtype(s.dtype(), op.dtype)?;
    let init = resolve_init(init, op)?;
    Ok(ScheduleTask::new(OpRequest::VReduce {
        s: s.clone(),
        v: v.clone(),
        op,
        init,
    }))
}

/// Fold each matrix row into one entry of `r`; empty rows stay absent
pub fn m_reduce_by_row<B: Backend>(
    r: &Vector<B>,
    m: &Matrix<B>,
    op: &'static BinaryOp,
    init: Option<Value>,
) -> Result<ScheduleTask<B>> {
    check_dtype(op.dtype, m.dtype())?;
    check_dtype(r.dtype(), op.dtype)?;
    check_vector_len(r, m.n_rows())?;
    let init = resolve_init(init, op)?;
    Ok(ScheduleTask::new(OpRequest::MReduceByRow {
        r: r.clone(),
        m: m.clone(),
        op,
        init,
    }))
}

/// Fold each matrix column into one entry of `r`; empty columns stay absent
pub fn m_reduce_by_column<B: Backend>(
    r: &Vector<B>,
    m: &Matrix<B>,
    op: &'static BinaryOp,
    init: Option<Value>,
) -> Result<ScheduleTask<B>> {
    check_dtype(op.dtype, m.dtype())?;
    check_dtype(r.dtype(), op.dtype)?;
    check_vector_len(r, m.n_cols())?;
    let init = resolve_init(init, op)?;
    Ok(ScheduleTask::new(OpRequest::MReduceByColumn {
        r: r.clone(),
        m: m.clone(),
        op,
        init,
    }))
}

/// `C = apply(A^T)`
pub fn m_transpose<B: Backend>(
    c: &Matrix<B>,
    a: &Matrix<B>,
    apply: &'static UnaryOp,
) -> Result<ScheduleTask<B>> {
    check_dtype(apply.dtype, a.dtype())?;
    check_dtype(c.dtype(), apply.dtype)?;
    check_matrix_shape(c, a.n_cols(), a.n_rows())?;
    Ok(ScheduleTask::new(OpRequest::Transpose {
        c: c.clone(),
        a: a.clone(),
        apply,
    }))
}

/// `r = apply(A[index, :])`
pub fn m_extract_row<B: Backend>(
    r: &Vector<B>,
    a: &Matrix<B>,
    index: u32,
    apply: &'static UnaryOp,
) -> Result<ScheduleTask<B>> {
    check_dtype(apply.dtype, a.dtype())?;
    check_dtype(r.dtype(), apply.dtype)?;
    check_vector_len(r, a.n_cols())?;
    if index >= a.n_rows() {
        return Err(Error::IndexOutOfRange {
            index,
            size: a.n_rows(),
        });
    }
    Ok(ScheduleTask::new(OpRequest::ExtractRow {
        r: r.clone(),
        a: a.clone(),
        index,
        apply,
    }))
}

/// `r = apply(A[:, index])`
pub fn m_extract_column<B: Backend>(
    r: &Vector<B>,
    a: &Matrix<B>,
    index: u32,
    apply: &'static UnaryOp,
) -> Result<ScheduleTask<B>> {
    check_dtype(apply.dtype, a.dtype())?;
    check_dtype(r.dtype(), apply.dtype)?;
    check_vector_len(r, a.n_rows())?;
    if index >= a.n_cols() {
        return Err(Error::IndexOutOfRange {
            index,
            size: a.n_cols(),
        });
    }
    Ok(ScheduleTask::new(OpRequest::ExtractColumn {
        r: r.clone(),
        a: a.clone(),
        index,
        apply,
    }))
}

/// `C = A (x) B`, the Kronecker product under `mult`
pub fn m_kron<B: Backend>(
    c: &Matrix<B>,
    a: &Matrix<B>,
    b: &Matrix<B>,
    mult: &'static BinaryOp,
) -> Result<ScheduleTask<B>> {
    check_dtype(mult.dtype, a.dtype())?;
    check_dtype(mult.dtype, b.dtype())?;
    check_dtype(c.dtype(), mult.dtype)?;
    let rows = a
        .n_rows()
        .checked_mul(b.n_rows())
        .ok_or_else(|| Error::invalid_argument("a", "Kronecker row count overflows u32"))?;
    let cols = a
        .n_cols()
        .checked_mul(b.n_cols())
        .ok_or_else(|| Error::invalid_argument("a", "Kronecker column count overflows u32"))?;
    check_matrix_shape(c, rows, cols)?;
    Ok(ScheduleTask::new(OpRequest::Kron {
        c: c.clone(),
        a: a.clone(),
        b: b.clone(),
        mult,
    }))
}

/// `r = apply(v)`, pattern preserved
pub fn v_map<B: Backend>(
    r: &Vector<B>,
    v: &Vector<B>,
    apply: &'static UnaryOp,
) -> Result<ScheduleTask<B>> {
    check_dtype(apply.dtype, v.dtype())?;
    check_dtype(r.dtype(), apply.dtype)?;
    check_vector_len(v, r.n_rows())?;
    Ok(ScheduleTask::new(OpRequest::VMap {
        r: r.clone(),
        v: v.clone(),
        apply,
    }))
}

/// In-place masked assignment: where `select(mask)` passes, `r[i]` becomes
/// `assign(r[i], value)`, or `value` at indices absent from `r`
pub fn v_assign_masked<B: Backend>(
    r: &Vector<B>,
    mask: &Vector<B>,
    value: Value,
    assign: &'static BinaryOp,
    select: &'static SelectOp,
) -> Result<ScheduleTask<B>> {
    check_dtype(assign.dtype, r.dtype())?;
    check_dtype(assign.dtype, value.dtype())?;
    check_dtype(select.dtype, mask.dtype())?;
    check_vector_len(mask, r.n_rows())?;
    Ok(ScheduleTask::new(OpRequest::VAssignMasked {
        r: r.clone(),
        mask: mask.clone(),
        value,
        assign,
        select,
    }))
}
