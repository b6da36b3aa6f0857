//! Array container: a dense, resizable 1-D sequence

use super::RawContainer;
use crate::backend::{Backend, MemView};
use crate::context::Context;
use crate::dtype::{DType, Element, Value};
use crate::error::{Error, Result};
use std::sync::Arc;

/// A dense 1-D sequence of one fixed dtype.
///
/// Arrays are the raw-value staging area of the data model: bulk inputs for
/// building sparse containers and bulk read-back targets. They carry no
/// sparsity and no pattern, only `len` elements.
pub struct Array<B: Backend> {
    raw: Arc<RawContainer<B>>,
}

impl<B: Backend> Clone for Array<B> {
    fn clone(&self) -> Self {
        Self {
            raw: Arc::clone(&self.raw),
        }
    }
}

impl<B: Backend> std::fmt::Debug for Array<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Array<{}>", self.dtype())
    }
}

impl<B: Backend> Array<B> {
    /// Create an array of `len` zero elements
    pub fn new(ctx: &Context<B>, dtype: DType, len: u32) -> Result<Self> {
        ctx.type_info(dtype)?;
        let handle = ctx.backend().make_array(dtype, len)?;
        Ok(Self {
            raw: RawContainer::new(ctx.clone(), handle, dtype),
        })
    }

    /// Create an array from a typed slice
    pub fn from_slice<T: Element>(ctx: &Context<B>, values: &[T]) -> Result<Self> {
        let array = Self::new(ctx, T::DTYPE, values.len() as u32)?;
        array.build(values)?;
        Ok(array)
    }

    /// Element type
    pub fn dtype(&self) -> DType {
        self.raw.dtype()
    }

    /// Current number of elements
    pub fn len(&self) -> Result<u32> {
        self.raw.ctx().backend().array_len(self.raw.handle())
    }

    /// True if the array holds no elements
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Read one element
    pub fn get<T: Element>(&self, index: u32) -> Result<T> {
        super::check_element_dtype::<T>(self.dtype())?;
        let value = self.raw.ctx().backend().array_get(self.raw.handle(), index)?;
        T::from_value(value).ok_or_else(|| Error::dtype_mismatch(T::DTYPE, value.dtype()))
    }

    /// Write one element
    pub fn set<T: Element>(&self, index: u32, value: T) -> Result<()> {
        super::check_element_dtype::<T>(self.dtype())?;
        self.raw
            .ctx()
            .backend()
            .array_set(self.raw.handle(), index, value.into_value())
    }

    /// Read one element as a runtime value
    pub fn get_value(&self, index: u32) -> Result<Value> {
        self.raw.ctx().backend().array_get(self.raw.handle(), index)
    }

    /// Resize, zero-filling any new elements
    pub fn resize(&self, len: u32) -> Result<()> {
        self.raw.ctx().backend().array_resize(self.raw.handle(), len)
    }

    /// Drop all elements
    pub fn clear(&self) -> Result<()> {
        self.raw.ctx().backend().array_clear(self.raw.handle())
    }

    /// Replace contents from a typed slice
    pub fn build<T: Element>(&self, values: &[T]) -> Result<()> {
        super::check_element_dtype::<T>(self.dtype())?;
        let info = self.raw.ctx().type_info(self.dtype())?;
        let bytes = super::encode_slice(info, values);
        self.raw.ctx().backend().array_build(self.raw.handle(), &bytes)
    }

    /// Read back all elements as a typed vec
    pub fn read<T: Element>(&self) -> Result<Vec<T>> {
        self.read_view()?.decode()
    }

    /// Read back the backend-owned value view
    pub fn read_view(&self) -> Result<MemView> {
        self.raw.ctx().backend().array_read(self.raw.handle())
    }

    /// Owning context
    pub fn context(&self) -> &Context<B> {
        self.raw.ctx()
    }

    pub(crate) fn handle(&self) -> crate::backend::Handle {
        self.raw.handle()
    }
}
