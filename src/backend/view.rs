//! Backend-owned memory views returned by bulk reads

use crate::dtype::{self, DType, Element};
use crate::error::{Error, Result};
use std::sync::Arc;

/// An immutable view over backend-owned packed element memory.
///
/// Views returned by `read` calls must not be assumed mutable; this type
/// only hands out shared access. Cloning is cheap (shared buffer).
#[derive(Clone, Debug)]
pub struct MemView {
    bytes: Arc<[u8]>,
    dtype: DType,
    mutable: bool,
}

impl MemView {
    /// Wrap a buffer of packed `dtype` elements
    pub(crate) fn new(bytes: Vec<u8>, dtype: DType, mutable: bool) -> Self {
        Self {
            bytes: bytes.into(),
            dtype,
            mutable,
        }
    }

    /// Element dtype of the viewed buffer
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Number of elements in the view
    pub fn len(&self) -> usize {
        self.bytes.len() / self.dtype.size_in_bytes()
    }

    /// True if the view holds no elements
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the backend marked this memory as writable
    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// Raw packed bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decode the view into owned typed values
    ///
    /// # Errors
    ///
    /// `DTypeMismatch` if `T` does not match the view's dtype.
    pub fn decode<T: Element>(&self) -> Result<Vec<T>> {
        if T::DTYPE != self.dtype {
            return Err(Error::dtype_mismatch(T::DTYPE, self.dtype));
        }
        let info = dtype::info(self.dtype);
        let mut out = Vec::with_capacity(self.len());
        for i in 0..self.len() {
            let value = (info.get)(&self.bytes, i);
            // Accessor variants always match the view dtype checked above.
            match T::from_value(value) {
                Some(v) => out.push(v),
                None => return Err(Error::dtype_mismatch(T::DTYPE, value.dtype())),
            }
        }
        Ok(out)
    }
}
