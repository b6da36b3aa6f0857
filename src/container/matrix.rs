//! Matrix container: a sparse 2-D collection of keyed entries

use super::RawContainer;
use crate::backend::{Backend, MemView};
use crate::context::Context;
use crate::dtype::{DType, Element, Value};
use crate::error::{Error, Result};
use rand::distributions::uniform::SampleUniform;
use rand::Rng;
use std::sync::Arc;

/// A sparse matrix of fixed shape `(n_rows, n_cols)`.
///
/// Only stored entries exist; every other coordinate is absent, which is
/// distinct from holding an explicit zero.
pub struct Matrix<B: Backend> {
    raw: Arc<RawContainer<B>>,
    n_rows: u32,
    n_cols: u32,
}

impl<B: Backend> Clone for Matrix<B> {
    fn clone(&self) -> Self {
        Self {
            raw: Arc::clone(&self.raw),
            n_rows: self.n_rows,
            n_cols: self.n_cols,
        }
    }
}

impl<B: Backend> std::fmt::Debug for Matrix<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Matrix<{}>({}x{})",
            self.dtype(),
            self.n_rows,
            self.n_cols
        )
    }
}

impl<B: Backend> Matrix<B> {
    /// Create an empty matrix of shape `(n_rows, n_cols)`
    pub fn new(ctx: &Context<B>, dtype: DType, n_rows: u32, n_cols: u32) -> Result<Self> {
        ctx.type_info(dtype)?;
        let handle = ctx.backend().make_matrix(dtype, n_rows, n_cols)?;
        Ok(Self {
            raw: RawContainer::new(ctx.clone(), handle, dtype),
            n_rows,
            n_cols,
        })
    }

    /// Create a matrix from parallel row/col/value slices.
    ///
    /// Triples need not be sorted; duplicate coordinates keep the last value
    /// given.
    pub fn from_lists<T: Element>(
        ctx: &Context<B>,
        n_rows: u32,
        n_cols: u32,
        rows: &[u32],
        cols: &[u32],
        values: &[T],
    ) -> Result<Self> {
        if rows.len() != cols.len() || rows.len() != values.len() {
            return Err(Error::invalid_argument(
                "rows",
                format!(
                    "{} rows, {} cols, {} values",
                    rows.len(),
                    cols.len(),
                    values.len()
                ),
            ));
        }
        let matrix = Self::new(ctx, T::DTYPE, n_rows, n_cols)?;
        let mut triples = std::collections::BTreeMap::new();
        for ((&r, &c), &v) in rows.iter().zip(cols.iter()).zip(values.iter()) {
            triples.insert((r, c), v);
        }
        let sr: Vec<u32> = triples.keys().map(|&(r, _)| r).collect();
        let sc: Vec<u32> = triples.keys().map(|&(_, c)| c).collect();
        let sv: Vec<T> = triples.values().copied().collect();
        matrix.build(&sr, &sc, &sv)?;
        Ok(matrix)
    }

    /// Create a matrix with an entry at every coordinate with probability
    /// `density` and a value drawn uniformly from `lo..=hi`.
    pub fn generate<T, R>(
        ctx: &Context<B>,
        n_rows: u32,
        n_cols: u32,
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
        let matrix = Self::new(ctx, T::DTYPE, n_rows, n_cols)?;
        let mut rows = Vec::new();
        let mut cols = Vec::new();
        let mut values = Vec::new();
        for r in 0..n_rows {
            for c in 0..n_cols {
                if rng.gen_bool(density) {
                    rows.push(r);
                    cols.push(c);
                    values.push(rng.gen_range(lo..=hi));
                }
            }
        }
        matrix.build(&rows, &cols, &values)?;
        Ok(matrix)
    }

    /// Element type
    pub fn dtype(&self) -> DType {
        self.raw.dtype()
    }

    /// Number of rows
    pub fn n_rows(&self) -> u32 {
        self.n_rows
    }

    /// Number of columns
    pub fn n_cols(&self) -> u32 {
        self.n_cols
    }

    /// Shape as `(n_rows, n_cols)`
    pub fn shape(&self) -> (u32, u32) {
        (self.n_rows, self.n_cols)
    }

    /// Number of stored entries
    pub fn n_values(&self) -> Result<u32> {
        self.raw.ctx().backend().matrix_count(self.raw.handle())
    }

    /// Insert or overwrite one entry
    pub fn set<T: Element>(&self, row: u32, col: u32, value: T) -> Result<()> {
        self.set_value(row, col, value.into_value())
    }

    /// Insert or overwrite one entry from a runtime value
    pub fn set_value(&self, row: u32, col: u32, value: Value) -> Result<()> {
        if value.dtype() != self.dtype() {
            return Err(Error::dtype_mismatch(self.dtype(), value.dtype()));
        }
        self.check_coords(row, col)?;
        self.raw
            .ctx()
            .backend()
            .matrix_set(self.raw.handle(), row, col, value)
    }

    /// Read one entry; `None` if the coordinate is absent
    pub fn get<T: Element>(&self, row: u32, col: u32) -> Result<Option<T>> {
        super::check_element_dtype::<T>(self.dtype())?;
        Ok(self.get_value(row, col)?.and_then(T::from_value))
    }

    /// Read one entry as a runtime value; `None` if the coordinate is absent
    pub fn get_value(&self, row: u32, col: u32) -> Result<Option<Value>> {
        self.check_coords(row, col)?;
        self.raw
            .ctx()
            .backend()
            .matrix_get(self.raw.handle(), row, col)
    }

    /// Drop all entries, keeping the shape
    pub fn clear(&self) -> Result<()> {
        self.raw.ctx().backend().matrix_clear(self.raw.handle())
    }

    /// Replace contents from row-major sorted unique triples.
    ///
    /// `(row, col)` pairs must be strictly increasing in row-major order and
    /// inside the shape.
    pub fn build<T: Element>(&self, rows: &[u32], cols: &[u32], values: &[T]) -> Result<()> {
        super::check_element_dtype::<T>(self.dtype())?;
        if rows.len() != cols.len() || rows.len() != values.len() {
            return Err(Error::invalid_argument(
                "rows",
                format!(
                    "{} rows, {} cols, {} values",
                    rows.len(),
                    cols.len(),
                    values.len()
                ),
            ));
        }
        check_triples_sorted_unique(rows, cols, self.n_rows, self.n_cols)?;
        let info = self.raw.ctx().type_info(self.dtype())?;
        let bytes = super::encode_slice(info, values);
        self.raw
            .ctx()
            .backend()
            .matrix_build(self.raw.handle(), rows, cols, &bytes)
    }

    /// Read back all entries as row-major sorted (rows, cols, values)
    pub fn read<T: Element>(&self) -> Result<(Vec<u32>, Vec<u32>, Vec<T>)> {
        let (rows, cols, values) = self.read_views()?;
        Ok((rows.decode()?, cols.decode()?, values.decode()?))
    }

    /// Read back the backend-owned (row keys, col keys, values) views
    pub fn read_views(&self) -> Result<(MemView, MemView, MemView)> {
        self.raw.ctx().backend().matrix_read(self.raw.handle())
    }

    /// Create a new matrix holding the same entries
    pub fn copy(&self) -> Result<Self> {
        let out = Self::new(self.context(), self.dtype(), self.n_rows, self.n_cols)?;
        let (rows, cols, values) = self.read_views()?;
        let rk: Vec<u32> = rows.decode()?;
        let ck: Vec<u32> = cols.decode()?;
        self.raw
            .ctx()
            .backend()
            .matrix_build(out.handle(), &rk, &ck, values.as_bytes())?;
        Ok(out)
    }

    /// Owning context
    pub fn context(&self) -> &Context<B> {
        self.raw.ctx()
    }

    pub(crate) fn handle(&self) -> crate::backend::Handle {
        self.raw.handle()
    }

    fn check_coords(&self, row: u32, col: u32) -> Result<()> {
        if row >= self.n_rows {
            return Err(Error::IndexOutOfRange {
                index: row,
                size: self.n_rows,
            });
        }
        if col >= self.n_cols {
            return Err(Error::IndexOutOfRange {
                index: col,
                size: self.n_cols,
            });
        }
        Ok(())
    }
}

fn check_triples_sorted_unique(
    rows: &[u32],
    cols: &[u32],
    n_rows: u32,
    n_cols: u32,
) -> Result<()> {
    for i in 0..rows.len() {
        if rows[i] >= n_rows {
            return Err(Error::IndexOutOfRange {
                index: rows[i],
                size: n_rows,
            });
        }
        if cols[i] >= n_cols {
            return Err(Error::IndexOutOfRange {
                index: cols[i],
                size: n_cols,
            });
        }
        if i > 0 && (rows[i - 1], cols[i - 1]) >= (rows[i], cols[i]) {
            return Err(Error::invalid_argument(
                "rows",
                "triples must be row-major sorted and unique".to_string(),
            ));
        }
    }
    Ok(())
}
