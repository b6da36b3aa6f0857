//! Immediate-mode convenience methods on containers
//!
//! Each method allocates the output container, builds the matching task
//! through the validated builders, runs it to completion, and returns the
//! output. Deferred pipelines go through [`super`]'s builders and a
//! [`super::Schedule`] instead.

use crate::backend::Backend;
use crate::container::{Matrix, Scalar, Vector};
use crate::dtype::Value;
use crate::error::{Error, Result};
use crate::op::{BinaryOp, SelectOp, UnaryOp};

impl<B: Backend> Matrix<B> {
    /// Matrix product `self (x) other` under `(mult, add)`
    pub fn mxm(
        &self,
        other: &Matrix<B>,
        mult: &'static BinaryOp,
        add: &'static BinaryOp,
    ) -> Result<Matrix<B>> {
        let c = Matrix::new(self.context(), add.dtype, self.n_rows(), other.n_cols())?;
        super::mxm(&c, self, other, mult, add, None)?.execute()?;
        Ok(c)
    }

    /// Masked product against a transposed right operand,
    /// `self (x) other^T` where `select(mask)` passes
    pub fn mxmt(
        &self,
        mask: &Matrix<B>,
        other: &Matrix<B>,
        mult: &'static BinaryOp,
        add: &'static BinaryOp,
        select: &'static SelectOp,
    ) -> Result<Matrix<B>> {
        let c = Matrix::new(self.context(), add.dtype, self.n_rows(), other.n_rows())?;
        super::mxmt_masked(&c, mask, self, other, mult, add, select, None)?.execute()?;
        Ok(c)
    }

    /// Masked matrix-vector product `self (x) v`
    pub fn mxv(
        &self,
        mask: &Vector<B>,
        v: &Vector<B>,
        mult: &'static BinaryOp,
        add: &'static BinaryOp,
        select: &'static SelectOp,
    ) -> Result<Vector<B>> {
        let r = Vector::new(self.context(), add.dtype, self.n_rows())?;
        super::mxv_masked(&r, mask, self, v, mult, add, select, None)?.execute()?;
        Ok(r)
    }

    /// Element-wise union with `other`
    pub fn eadd(&self, other: &Matrix<B>, op: &'static BinaryOp) -> Result<Matrix<B>> {
        let c = Matrix::new(self.context(), op.dtype, self.n_rows(), self.n_cols())?;
        super::m_eadd(&c, self, other, op)?.execute()?;
        Ok(c)
    }

    /// Element-wise intersection with `other`
    pub fn emult(&self, other: &Matrix<B>, op: &'static BinaryOp) -> Result<Matrix<B>> {
        let c = Matrix::new(self.context(), op.dtype, self.n_rows(), self.n_cols())?;
        super::m_emult(&c, self, other, op)?.execute()?;
        Ok(c)
    }

    /// Fold every present value into a scalar
    pub fn reduce(&self, op: &'static BinaryOp, init: Option<Value>) -> Result<Scalar<B>> {
        let s = Scalar::new(self.context(), op.dtype)?;
        super::m_reduce(&s, self, op, init)?.execute()?;
        Ok(s)
    }

    /// Fold each row into one vector entry
    pub fn reduce_by_row(
        &self,
        op: &'static BinaryOp,
        init: Option<Value>,
    ) -> Result<Vector<B>> {
        let r = Vector::new(self.context(), op.dtype, self.n_rows())?;
        super::m_reduce_by_row(&r, self, op, init)?.execute()?;
        Ok(r)
    }

    /// Fold each column into one vector entry
    pub fn reduce_by_column(
        &self,
        op: &'static BinaryOp,
        init: Option<Value>,
    ) -> Result<Vector<B>> {
        let r = Vector::new(self.context(), op.dtype, self.n_cols())?;
        super::m_reduce_by_column(&r, self, op, init)?.execute()?;
        Ok(r)
    }

    /// Transpose with a value map applied to every entry
    pub fn transposed(&self, apply: &'static UnaryOp) -> Result<Matrix<B>> {
        let c = Matrix::new(self.context(), apply.dtype, self.n_cols(), self.n_rows())?;
        super::m_transpose(&c, self, apply)?.execute()?;
        Ok(c)
    }

    /// Project one row into a vector
    pub fn extract_row(&self, index: u32, apply: &'static UnaryOp) -> Result<Vector<B>> {
        let r = Vector::new(self.context(), apply.dtype, self.n_cols())?;
        super::m_extract_row(&r, self, index, apply)?.execute()?;
        Ok(r)
    }

    /// Project one column into a vector
    pub fn extract_column(&self, index: u32, apply: &'static UnaryOp) -> Result<Vector<B>> {
        let r = Vector::new(self.context(), apply.dtype, self.n_rows())?;
        super::m_extract_column(&r, self, index, apply)?.execute()?;
        Ok(r)
    }

    /// Kronecker product `self (x) other` under `mult`
    pub fn kron(&self, other: &Matrix<B>, mult: &'static BinaryOp) -> Result<Matrix<B>> {
        let rows = self
            .n_rows()
            .checked_mul(other.n_rows())
            .ok_or_else(|| Error::invalid_argument("other", "Kronecker row count overflows u32"))?;
        let cols = self.n_cols().checked_mul(other.n_cols()).ok_or_else(|| {
            Error::invalid_argument("other", "Kronecker column count overflows u32")
        })?;
        let c = Matrix::new(self.context(), mult.dtype, rows, cols)?;
        super::m_kron(&c, self, other, mult)?.execute()?;
        Ok(c)
    }

    /// Repeated Kronecker product of `self` with itself.
    ///
    /// `exponent` 0 yields the identity-patterned matrix of `self`'s shape,
    /// 1 a copy of `self`, and larger values fold `kron` left to right.
    pub fn kronpow(&self, exponent: u32, mult: &'static BinaryOp) -> Result<Matrix<B>> {
        if exponent == 0 {
            let c = Matrix::new(self.context(), self.dtype(), self.n_rows(), self.n_cols())?;
            let one = self.dtype().one();
            for i in 0..self.n_rows().min(self.n_cols()) {
                c.set_value(i, i, one)?;
            }
            return Ok(c);
        }
        let mut acc = self.copy()?;
        for _ in 1..exponent {
            acc = acc.kron(self, mult)?;
        }
        Ok(acc)
    }
}

impl<B: Backend> Vector<B> {
    /// Masked vector-matrix product `self (x) m`
    pub fn vxm(
        &self,
        mask: &Vector<B>,
        m: &Matrix<B>,
        mult: &'static BinaryOp,
        add: &'static BinaryOp,
        select: &'static SelectOp,
    ) -> Result<Vector<B>> {
        let r = Vector::new(self.context(), add.dtype, m.n_cols())?;
        super::vxm_masked(&r, mask, self, m, mult, add, select, None)?.execute()?;
        Ok(r)
    }

    /// Element-wise union with `other`
    pub fn eadd(&self, other: &Vector<B>, op: &'static BinaryOp) -> Result<Vector<B>> {
        let r = Vector::new(self.context(), op.dtype, self.n_rows())?;
        super::v_eadd(&r, self, other, op)?.execute()?;
        Ok(r)
    }

    /// Element-wise intersection with `other`
    pub fn emult(&self, other: &Vector<B>, op: &'static BinaryOp) -> Result<Vector<B>> {
        let r = Vector::new(self.context(), op.dtype, self.n_rows())?;
        super::v_emult(&r, self, other, op)?.execute()?;
        Ok(r)
    }

    /// In-place union with `other`, rebuilding `fdb` with the entries of
    /// `self` that changed
    pub fn eadd_fdb(
        &self,
        other: &Vector<B>,
        fdb: &Vector<B>,
        op: &'static BinaryOp,
    ) -> Result<()> {
        super::v_eadd_fdb(self, other, fdb, op)?.execute()
    }

    /// Fold every present value into a scalar
    pub fn reduce(&self, op: &'static BinaryOp, init: Option<Value>) -> Result<Scalar<B>> {
        let s = Scalar::new(self.context(), op.dtype)?;
        super::v_reduce(&s, self, op, init)?.execute()?;
        Ok(s)
    }

    /// Map every present value through `apply`
    pub fn map(&self, apply: &'static UnaryOp) -> Result<Vector<B>> {
        let r = Vector::new(self.context(), apply.dtype, self.n_rows())?;
        super::v_map(&r, self, apply)?.execute()?;
        Ok(r)
    }

    /// In-place masked assignment of `value` under `(assign, select)`
    pub fn assign(
        &self,
        mask: &Vector<B>,
        value: Value,
        assign: &'static BinaryOp,
        select: &'static SelectOp,
    ) -> Result<()> {
        super::v_assign_masked(self, mask, value, assign, select)?.execute()
    }
}
