//! Scalar container: a 1x1 typed value

use super::RawContainer;
use crate::backend::Backend;
use crate::context::Context;
use crate::dtype::{DType, Element, Value};
use crate::error::{Error, Result};
use std::sync::Arc;

/// A typed single-value container, backed by a backend resource so it can
/// serve as an operation output (reduction results) or operand (assign
/// right-hand sides, fold inits).
pub struct Scalar<B: Backend> {
    raw: Arc<RawContainer<B>>,
}

impl<B: Backend> Clone for Scalar<B> {
    fn clone(&self) -> Self {
        Self {
            raw: Arc::clone(&self.raw),
        }
    }
}

impl<B: Backend> std::fmt::Debug for Scalar<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Scalar<{}>", self.dtype())
    }
}

impl<B: Backend> Scalar<B> {
    /// Create a scalar holding the type's zero
    pub fn new(ctx: &Context<B>, dtype: DType) -> Result<Self> {
        Self::from_value(ctx, dtype.zero())
    }

    /// Create a scalar holding `value`
    pub fn from_value(ctx: &Context<B>, value: Value) -> Result<Self> {
        let dtype = value.dtype();
        ctx.type_info(dtype)?;
        let handle = ctx.backend().make_scalar(dtype, value)?;
        Ok(Self {
            raw: RawContainer::new(ctx.clone(), handle, dtype),
        })
    }

    /// Create a scalar from a typed element
    pub fn from_element<T: Element>(ctx: &Context<B>, value: T) -> Result<Self> {
        Self::from_value(ctx, value.into_value())
    }

    /// Element type
    pub fn dtype(&self) -> DType {
        self.raw.dtype()
    }

    /// Read the value
    pub fn get_value(&self) -> Result<Value> {
        self.raw.ctx().backend().scalar_get(self.raw.handle())
    }

    /// Read the value as a typed element
    pub fn get<T: Element>(&self) -> Result<T> {
        super::check_element_dtype::<T>(self.dtype())?;
        let value = self.get_value()?;
        T::from_value(value).ok_or_else(|| Error::dtype_mismatch(T::DTYPE, value.dtype()))
    }

    /// Overwrite the value
    pub fn set_value(&self, value: Value) -> Result<()> {
        if value.dtype() != self.dtype() {
            return Err(Error::dtype_mismatch(value.dtype(), self.dtype()));
        }
        self.raw.ctx().backend().scalar_set(self.raw.handle(), value)
    }

    /// Overwrite the value with a typed element
    pub fn set<T: Element>(&self, value: T) -> Result<()> {
        super::check_element_dtype::<T>(self.dtype())?;
        self.set_value(value.into_value())
    }

    /// Owning context
    pub fn context(&self) -> &Context<B> {
        self.raw.ctx()
    }

    pub(crate) fn handle(&self) -> crate::backend::Handle {
        self.raw.handle()
    }
}
