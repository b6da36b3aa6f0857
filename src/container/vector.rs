//! Vector container: a sparse 1-D collection of keyed entries

use super::RawContainer;
use crate::backend::{Backend, MemView};
use crate::context::Context;
use crate::dtype::{DType, Element, Value};
use crate::error::{Error, Result};
use rand::distributions::uniform::SampleUniform;
use rand::Rng;
use std::sync::Arc;

/// A sparse vector of logical size `n`.
///
/// Only stored entries exist; every other index is absent, which is distinct
/// from holding an explicit zero. The logical size is fixed at creation.
pub struct Vector<B: Backend> {
    raw: Arc<RawContainer<B>>,
    n: u32,
}

impl<B: Backend> Clone for Vector<B> {
    fn clone(&self) -> Self {
        Self {
            raw: Arc::clone(&self.raw),
            n: self.n,
        }
    }
}

impl<B: Backend> std::fmt::Debug for Vector<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Vector<{}>({})", self.dtype(), self.n)
    }
}

impl<B: Backend> Vector<B> {
    /// Create an empty vector of logical size `n`
    pub fn new(ctx: &Context<B>, dtype: DType, n: u32) -> Result<Self> {
        ctx.type_info(dtype)?;
        let handle = ctx.backend().make_vector(dtype, n)?;
        Ok(Self {
            raw: RawContainer::new(ctx.clone(), handle, dtype),
            n,
        })
    }

    /// Create a vector from parallel key/value slices.
    ///
    /// Keys need not be sorted; duplicates keep the last value given.
    pub fn from_lists<T: Element>(
        ctx: &Context<B>,
        n: u32,
        keys: &[u32],
        values: &[T],
    ) -> Result<Self> {
        if keys.len() != values.len() {
            return Err(Error::invalid_argument(
                "keys",
                format!("{} keys but {} values", keys.len(), values.len()),
            ));
        }
        let vector = Self::new(ctx, T::DTYPE, n)?;
        let mut entries = std::collections::BTreeMap::new();
        for (&k, &v) in keys.iter().zip(values.iter()) {
            entries.insert(k, v);
        }
        let sorted_keys: Vec<u32> = entries.keys().copied().collect();
        let sorted_values: Vec<T> = entries.values().copied().collect();
        vector.build(&sorted_keys, &sorted_values)?;
        Ok(vector)
    }

    /// Create a vector with entries at every index, each present with
    /// probability `density` and a value drawn uniformly from `lo..=hi`.
    pub fn generate<T, R>(
        ctx: &Context<B>,
        n: u32,
        density: f64,
        lo: T,
        hi: T,
        rng: &mut R,
    ) -> Result<Self>
    where
        T: Element + SampleUniform + PartialOrd,
        R: Rng,
    {
        if !(0.0..=1.0).contains(&density) {
            return Err(Error::invalid_argument(
                "density",
                format!("{density} is outside [0, 1]"),
            ));
        }
        let vector = Self::new(ctx, T::DTYPE, n)?;
        let mut keys = Vec::new();
        let mut values = Vec::new();
        for i in 0..n {
            if rng.gen_bool(density) {
                keys.push(i);
                values.push(rng.gen_range(lo..=hi));
            }
        }
        vector.build(&keys, &values)?;
        Ok(vector)
    }

    /// Element type
    pub fn dtype(&self) -> DType {
        self.raw.dtype()
    }

    /// Logical size
    pub fn n_rows(&self) -> u32 {
        self.n
    }

    /// Number of stored entries
    pub fn n_values(&self) -> Result<u32> {
        self.raw.ctx().backend().vector_count(self.raw.handle())
    }

    /// Number of stored entries holding a non-zero value
    pub fn count_nonzero(&self) -> Result<u32> {
        self.raw
            .ctx()
            .backend()
            .vector_count_nonzero(self.raw.handle())
    }

    /// Insert or overwrite one entry
    pub fn set<T: Element>(&self, index: u32, value: T) -> Result<()> {
        self.set_value(index, value.into_value())
    }

    /// Insert or overwrite one entry from a runtime value
    pub fn set_value(&self, index: u32, value: Value) -> Result<()> {
        if value.dtype() != self.dtype() {
            return Err(Error::dtype_mismatch(self.dtype(), value.dtype()));
        }
        self.check_index(index)?;
        self.raw
            .ctx()
            .backend()
            .vector_set(self.raw.handle(), index, value)
    }

    /// Read one entry; `None` if the index is absent
    pub fn get<T: Element>(&self, index: u32) -> Result<Option<T>> {
        super::check_element_dtype::<T>(self.dtype())?;
        Ok(self.get_value(index)?.and_then(T::from_value))
    }

    /// Read one entry as a runtime value; `None` if the index is absent
    pub fn get_value(&self, index: u32) -> Result<Option<Value>> {
        self.check_index(index)?;
        self.raw.ctx().backend().vector_get(self.raw.handle(), index)
    }

    /// Drop all entries, keeping the logical size
    pub fn clear(&self) -> Result<()> {
        self.raw.ctx().backend().vector_clear(self.raw.handle())
    }

    /// Replace contents from sorted unique keys and their values.
    ///
    /// Keys must be strictly increasing and below the logical size.
    pub fn build<T: Element>(&self, keys: &[u32], values: &[T]) -> Result<()> {
        super::check_element_dtype::<T>(self.dtype())?;
        if keys.len() != values.len() {
            return Err(Error::invalid_argument(
                "keys",
                format!("{} keys but {} values", keys.len(), values.len()),
            ));
        }
        super::check_keys_sorted_unique(keys, self.n)?;
        let info = self.raw.ctx().type_info(self.dtype())?;
        let bytes = super::encode_slice(info, values);
        self.raw
            .ctx()
            .backend()
            .vector_build(self.raw.handle(), keys, &bytes)
    }

    /// Read back all entries as sorted (keys, values)
    pub fn read<T: Element>(&self) -> Result<(Vec<u32>, Vec<T>)> {
        let (keys, values) = self.read_views()?;
        Ok((keys.decode()?, values.decode()?))
    }

    /// Read back the backend-owned (keys, values) views
    pub fn read_views(&self) -> Result<(MemView, MemView)> {
        self.raw.ctx().backend().vector_read(self.raw.handle())
    }

    /// Owning context
    pub fn context(&self) -> &Context<B> {
        self.raw.ctx()
    }

    pub(crate) fn handle(&self) -> crate::backend::Handle {
        self.raw.handle()
    }

    fn check_index(&self, index: u32) -> Result<()> {
        if index >= self.n {
            return Err(Error::IndexOutOfRange {
                index,
                size: self.n,
            });
        }
        Ok(())
    }
}
