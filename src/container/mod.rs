//! Typed containers: Scalar, Array, Vector, Matrix
//!
//! Containers are thin typed handles over backend-owned storage. Each owns
//! exactly one backend resource for its lifetime; dropping the last clone
//! releases the resource exactly once. The sparse containers expose their
//! contents only as validated (keys, values) lists and single entries; the
//! storage format behind them belongs to the backend.

mod array;
mod matrix;
mod scalar;
mod vector;

pub use array::Array;
pub use matrix::Matrix;
pub use scalar::Scalar;
pub use vector::Vector;

use crate::backend::{Backend, Handle};
use crate::context::Context;
use crate::dtype::{DType, Element, TypeInfo};
use crate::error::{Error, Result};
use std::sync::Arc;

/// Shared ownership of one backend resource; releases it on final drop.
pub(crate) struct RawContainer<B: Backend> {
    ctx: Context<B>,
    handle: Handle,
    dtype: DType,
}

impl<B: Backend> RawContainer<B> {
    pub(crate) fn new(ctx: Context<B>, handle: Handle, dtype: DType) -> Arc<Self> {
        Arc::new(Self { ctx, handle, dtype })
    }

    pub(crate) fn ctx(&self) -> &Context<B> {
        &self.ctx
    }

    pub(crate) fn handle(&self) -> Handle {
        self.handle
    }

    pub(crate) fn dtype(&self) -> DType {
        self.dtype
    }
}

impl<B: Backend> Drop for RawContainer<B> {
    fn drop(&mut self) {
        self.ctx.backend().release(self.handle);
    }
}

/// Check a typed API call against the container's dtype
pub(crate) fn check_element_dtype<T: Element>(container_dtype: DType) -> Result<()> {
    if T::DTYPE != container_dtype {
        return Err(Error::dtype_mismatch(T::DTYPE, container_dtype));
    }
    Ok(())
}

/// Encode a typed slice into a packed value buffer through the accessors
pub(crate) fn encode_slice<T: Element>(info: &TypeInfo, values: &[T]) -> Vec<u8> {
    let mut buf = vec![0u8; values.len() * info.size];
    for (i, v) in values.iter().enumerate() {
        (info.set)(&mut buf, i, v.into_value());
    }
    buf
}

/// Validate a sparse key list: strictly increasing (unique) and in range
pub(crate) fn check_keys_sorted_unique(keys: &[u32], bound: u32) -> Result<()> {
    for (i, &key) in keys.iter().enumerate() {
        if key >= bound {
            return Err(Error::IndexOutOfRange {
                index: key,
                size: bound,
            });
        }
        if i > 0 && keys[i - 1] >= key {
            return Err(Error::invalid_argument(
                "keys",
                format!("not sorted-unique at position {}", i),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_validation() {
        assert!(check_keys_sorted_unique(&[0, 2, 5], 6).is_ok());
        assert!(check_keys_sorted_unique(&[], 0).is_ok());
        assert!(matches!(
            check_keys_sorted_unique(&[0, 2, 2], 6),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            check_keys_sorted_unique(&[0, 6], 6),
            Err(Error::IndexOutOfRange { index: 6, size: 6 })
        ));
    }
}
