//! Reference CPU backend
//!
//! Containers live in a handle arena behind one mutex; every operation
//! clones the input entry lists out of the arena, computes a fresh result
//! through the kernels in [`kernels`], and commits it to the output entry
//! only at the end. A failing request therefore never leaves a partially
//! written output, and output-aliases-input requests are safe.

mod kernels;

use super::{Backend, Handle, MemView, OpRequest};
use crate::dtype::{self, DType, Value};
use crate::error::{Error, Result, Status};
use kernels::{MEntry, VEntry};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Tuning knobs of the CPU backend
#[derive(Clone, Debug)]
pub struct CpuConfig {
    /// Entry count above which data-parallel kernels split work across the
    /// rayon pool
    pub parallel_threshold: usize,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: 4096,
        }
    }
}

enum Storage {
    Scalar(Value),
    Array(Vec<Value>),
    Vector { n: u32, entries: Vec<VEntry> },
    Matrix { entries: Vec<MEntry> },
}

struct Entry {
    refs: u32,
    dtype: DType,
    /// Declared shape: `[n]` for vectors, `[rows, cols]` for matrices
    shape: [u32; 2],
    storage: Storage,
}

#[derive(Default)]
struct CpuState {
    next_handle: Handle,
    entries: HashMap<Handle, Entry>,
}

impl CpuState {
    fn insert(&mut self, dtype: DType, shape: [u32; 2], storage: Storage) -> Handle {
        self.next_handle += 1;
        let handle = self.next_handle;
        self.entries.insert(
            handle,
            Entry {
                refs: 1,
                dtype,
                shape,
                storage,
            },
        );
        handle
    }

    fn entry(&self, handle: Handle) -> std::result::Result<&Entry, Status> {
        self.entries.get(&handle).ok_or(Status::InvalidState)
    }

    fn entry_mut(&mut self, handle: Handle) -> std::result::Result<&mut Entry, Status> {
        self.entries.get_mut(&handle).ok_or(Status::InvalidState)
    }

    fn scalar(&self, handle: Handle) -> std::result::Result<Value, Status> {
        match self.entry(handle)?.storage {
            Storage::Scalar(v) => Ok(v),
            _ => Err(Status::InvalidState),
        }
    }

    fn vector(&self, handle: Handle) -> std::result::Result<&Vec<VEntry>, Status> {
        match &self.entry(handle)?.storage {
            Storage::Vector { entries, .. } => Ok(entries),
            _ => Err(Status::InvalidState),
        }
    }

    fn matrix(&self, handle: Handle) -> std::result::Result<&Vec<MEntry>, Status> {
        match &self.entry(handle)?.storage {
            Storage::Matrix { entries } => Ok(entries),
            _ => Err(Status::InvalidState),
        }
    }

    fn matrix_shape(&self, handle: Handle) -> std::result::Result<(u32, u32), Status> {
        let entry = self.entry(handle)?;
        match entry.storage {
            Storage::Matrix { .. } => Ok((entry.shape[0], entry.shape[1])),
            _ => Err(Status::InvalidState),
        }
    }

    fn put_scalar(&mut self, handle: Handle, value: Value) -> std::result::Result<(), Status> {
        match &mut self.entry_mut(handle)?.storage {
            Storage::Scalar(slot) => {
                *slot = value;
                Ok(())
            }
            _ => Err(Status::InvalidState),
        }
    }

    fn put_vector(
        &mut self,
        handle: Handle,
        new: Vec<VEntry>,
    ) -> std::result::Result<(), Status> {
        match &mut self.entry_mut(handle)?.storage {
            Storage::Vector { entries, .. } => {
                *entries = new;
                Ok(())
            }
            _ => Err(Status::InvalidState),
        }
    }

    fn put_matrix(
        &mut self,
        handle: Handle,
        new: Vec<MEntry>,
    ) -> std::result::Result<(), Status> {
        match &mut self.entry_mut(handle)?.storage {
            Storage::Matrix { entries } => {
                *entries = new;
                Ok(())
            }
            _ => Err(Status::InvalidState),
        }
    }
}

/// The reference backend: sorted entry lists behind a handle arena.
///
/// Always available; no device discovery is involved. Clones share the same
/// arena, so containers can move freely between clones of one backend.
#[derive(Clone)]
pub struct CpuBackend {
    state: Arc<Mutex<CpuState>>,
    config: CpuConfig,
}

impl CpuBackend {
    /// Create a backend with default tuning
    pub fn new() -> Self {
        Self::with_config(CpuConfig::default())
    }

    /// Create a backend with explicit tuning
    pub fn with_config(config: CpuConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(CpuState::default())),
            config,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CpuState> {
        // A poisoned lock only means another thread panicked mid-request;
        // the commit discipline keeps the arena itself consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn exec(&self, request: &OpRequest<Self>) -> std::result::Result<(), Status> {
        let mut state = self.lock();
        let threshold = self.config.parallel_threshold;
        match request {
            OpRequest::Mxm {
                c,
                a,
                b,
                mult,
                add,
                init,
            } => {
                let a_e = state.matrix(a.handle())?.clone();
                let b_e = state.matrix(b.handle())?.clone();
                let out = kernels::mxm(&a_e, &b_e, *mult, *add, *init, threshold);
                state.put_matrix(c.handle(), out)
            }
            OpRequest::MxmTMasked {
                c,
                mask,
                a,
                b,
                mult,
                add,
                select,
                init,
            } => {
                let mask_e = state.matrix(mask.handle())?.clone();
                let a_e = state.matrix(a.handle())?.clone();
                let b_e = state.matrix(b.handle())?.clone();
                let out = kernels::mxmt_masked(&mask_e, &a_e, &b_e, *mult, *add, *select, *init);
                state.put_matrix(c.handle(), out)
            }
            OpRequest::MxvMasked {
                r,
                mask,
                m,
                v,
                mult,
                add,
                select,
                init,
            } => {
                let mask_e = state.vector(mask.handle())?.clone();
                let m_e = state.matrix(m.handle())?.clone();
                let v_e = state.vector(v.handle())?.clone();
                let out = kernels::mxv_masked(&mask_e, &m_e, &v_e, *mult, *add, *select, *init);
                state.put_vector(r.handle(), out)
            }
            OpRequest::VxmMasked {
                r,
                mask,
                v,
                m,
                mult,
                add,
                select,
                init,
            } => {
                let mask_e = state.vector(mask.handle())?.clone();
                let v_e = state.vector(v.handle())?.clone();
                let m_e = state.matrix(m.handle())?.clone();
                let out = kernels::vxm_masked(&mask_e, &v_e, &m_e, *mult, *add, *select, *init);
                state.put_vector(r.handle(), out)
            }
            OpRequest::MEadd { c, a, b, op } => {
                let a_e = state.matrix(a.handle())?.clone();
                let b_e = state.matrix(b.handle())?.clone();
                state.put_matrix(c.handle(), kernels::m_union(&a_e, &b_e, *op))
            }
            OpRequest::MEmult { c, a, b, op } => {
                let a_e = state.matrix(a.handle())?.clone();
                let b_e = state.matrix(b.handle())?.clone();
                state.put_matrix(c.handle(), kernels::m_intersection(&a_e, &b_e, *op))
            }
            OpRequest::VEadd { r, u, v, op } => {
                let u_e = state.vector(u.handle())?.clone();
                let v_e = state.vector(v.handle())?.clone();
                state.put_vector(r.handle(), kernels::v_union(&u_e, &v_e, *op))
            }
            OpRequest::VEaddFdb { r, v, fdb, op } => {
                let r_e = state.vector(r.handle())?.clone();
                let v_e = state.vector(v.handle())?.clone();
                let (merged, changed) = kernels::v_eadd_fdb(&r_e, &v_e, *op);
                state.put_vector(r.handle(), merged)?;
                state.put_vector(fdb.handle(), changed)
            }
            OpRequest::VEmult { r, u, v, op } => {
                let u_e = state.vector(u.handle())?.clone();
                let v_e = state.vector(v.handle())?.clone();
                state.put_vector(r.handle(), kernels::v_intersection(&u_e, &v_e, *op))
            }
            OpRequest::MReduce { s, m, op, init } => {
                let values: Vec<Value> =
                    state.matrix(m.handle())?.iter().map(|&(_, _, v)| v).collect();
                state.put_scalar(s.handle(), self.fold(&values, *op, *init))
            }
            OpRequest::VReduce { s, v, op, init } => {
                let values: Vec<Value> =
                    state.vector(v.handle())?.iter().map(|&(_, v)| v).collect();
                state.put_scalar(s.handle(), self.fold(&values, *op, *init))
            }
            OpRequest::MReduceByRow { r, m, op, init } => {
                let m_e = state.matrix(m.handle())?.clone();
                state.put_vector(r.handle(), kernels::reduce_by_row(&m_e, *op, *init))
            }
            OpRequest::MReduceByColumn { r, m, op, init } => {
                let m_e = state.matrix(m.handle())?.clone();
                state.put_vector(r.handle(), kernels::reduce_by_column(&m_e, *op, *init))
            }
            OpRequest::Transpose { c, a, apply } => {
                let a_e = state.matrix(a.handle())?.clone();
                state.put_matrix(c.handle(), kernels::transpose(&a_e, *apply))
            }
            OpRequest::ExtractRow { r, a, index, apply } => {
                let a_e = state.matrix(a.handle())?.clone();
                state.put_vector(r.handle(), kernels::extract_row(&a_e, *index, *apply))
            }
            OpRequest::ExtractColumn { r, a, index, apply } => {
                let a_e = state.matrix(a.handle())?.clone();
                state.put_vector(r.handle(), kernels::extract_column(&a_e, *index, *apply))
            }
            OpRequest::Kron { c, a, b, mult } => {
                let a_e = state.matrix(a.handle())?.clone();
                let b_e = state.matrix(b.handle())?.clone();
                let (b_rows, b_cols) = state.matrix_shape(b.handle())?;
                state.put_matrix(c.handle(), kernels::kron(&a_e, &b_e, b_rows, b_cols, *mult))
            }
            OpRequest::VMap { r, v, apply } => {
                let v_e = state.vector(v.handle())?.clone();
                state.put_vector(r.handle(), kernels::v_map(&v_e, *apply))
            }
            OpRequest::VAssignMasked {
                r,
                mask,
                value,
                assign,
                select,
            } => {
                let r_e = state.vector(r.handle())?.clone();
                let mask_e = state.vector(mask.handle())?.clone();
                let out = kernels::assign_masked(&r_e, &mask_e, *value, *assign, *select);
                state.put_vector(r.handle(), out)
            }
        }
    }

    fn fold(&self, values: &[Value], op: &'static crate::op::BinaryOp, init: Value) -> Value {
        #[cfg(feature = "rayon")]
        if values.len() >= self.config.parallel_threshold {
            return kernels::reduce_par(values, op, init);
        }
        kernels::reduce(values.iter().copied(), op, init)
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CpuBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuBackend")
            .field("config", &self.config)
            .finish()
    }
}

fn encode_values(dtype: DType, values: &[Value]) -> Vec<u8> {
    let info = dtype::info(dtype);
    let mut buf = vec![0u8; values.len() * info.size];
    for (i, &v) in values.iter().enumerate() {
        (info.set)(&mut buf, i, v);
    }
    buf
}

fn decode_values(dtype: DType, bytes: &[u8]) -> Result<Vec<Value>> {
    let info = dtype::info(dtype);
    if bytes.len() % info.size != 0 {
        return Err(Error::invalid_argument(
            "values",
            format!("{} bytes is not a multiple of {}", bytes.len(), info.size),
        ));
    }
    let len = bytes.len() / info.size;
    Ok((0..len).map(|i| (info.get)(bytes, i)).collect())
}

fn encode_keys(keys: &[u32]) -> Vec<u8> {
    encode_values(
        DType::Uint,
        &keys.iter().map(|&k| Value::Uint(k)).collect::<Vec<_>>(),
    )
}

impl Backend for CpuBackend {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn make_scalar(&self, dtype: DType, init: Value) -> Result<Handle> {
        Ok(self
            .lock()
            .insert(dtype, [0, 0], Storage::Scalar(init)))
    }

    fn make_array(&self, dtype: DType, len: u32) -> Result<Handle> {
        let values = vec![dtype.zero(); len as usize];
        Ok(self
            .lock()
            .insert(dtype, [len, 0], Storage::Array(values)))
    }

    fn make_vector(&self, dtype: DType, n: u32) -> Result<Handle> {
        Ok(self.lock().insert(
            dtype,
            [n, 0],
            Storage::Vector {
                n,
                entries: Vec::new(),
            },
        ))
    }

    fn make_matrix(&self, dtype: DType, n_rows: u32, n_cols: u32) -> Result<Handle> {
        Ok(self.lock().insert(
            dtype,
            [n_rows, n_cols],
            Storage::Matrix {
                entries: Vec::new(),
            },
        ))
    }

    fn retain(&self, handle: Handle) -> Result<()> {
        let mut state = self.lock();
        let entry = state.entry_mut(handle).map_err(Error::from)?;
        entry.refs += 1;
        Ok(())
    }

    fn release(&self, handle: Handle) {
        let mut state = self.lock();
        let dead = match state.entries.get_mut(&handle) {
            Some(entry) => {
                entry.refs -= 1;
                entry.refs == 0
            }
            None => false,
        };
        if dead {
            state.entries.remove(&handle);
        }
    }

    fn scalar_get(&self, handle: Handle) -> Result<Value> {
        self.lock().scalar(handle).map_err(Error::from)
    }

    fn scalar_set(&self, handle: Handle, value: Value) -> Result<()> {
        self.lock().put_scalar(handle, value).map_err(Error::from)
    }

    fn array_len(&self, handle: Handle) -> Result<u32> {
        let state = self.lock();
        match &state.entry(handle).map_err(Error::from)?.storage {
            Storage::Array(values) => Ok(values.len() as u32),
            _ => Err(Status::InvalidState.into()),
        }
    }

    fn array_get(&self, handle: Handle, index: u32) -> Result<Value> {
        let state = self.lock();
        match &state.entry(handle).map_err(Error::from)?.storage {
            Storage::Array(values) => {
                values
                    .get(index as usize)
                    .copied()
                    .ok_or(Error::IndexOutOfRange {
                        index,
                        size: values.len() as u32,
                    })
            }
            _ => Err(Status::InvalidState.into()),
        }
    }

    fn array_set(&self, handle: Handle, index: u32, value: Value) -> Result<()> {
        let mut state = self.lock();
        match &mut state.entry_mut(handle).map_err(Error::from)?.storage {
            Storage::Array(values) => {
                let size = values.len() as u32;
                match values.get_mut(index as usize) {
                    Some(slot) => {
                        *slot = value;
                        Ok(())
                    }
                    None => Err(Error::IndexOutOfRange { index, size }),
                }
            }
            _ => Err(Status::InvalidState.into()),
        }
    }

    fn array_resize(&self, handle: Handle, len: u32) -> Result<()> {
        let mut state = self.lock();
        let entry = state.entry_mut(handle).map_err(Error::from)?;
        let zero = entry.dtype.zero();
        match &mut entry.storage {
            Storage::Array(values) => {
                values.resize(len as usize, zero);
                entry.shape[0] = len;
                Ok(())
            }
            _ => Err(Status::InvalidState.into()),
        }
    }

    fn array_clear(&self, handle: Handle) -> Result<()> {
        self.array_resize(handle, 0)
    }

    fn array_build(&self, handle: Handle, values: &[u8]) -> Result<()> {
        let mut state = self.lock();
        let dtype = state.entry(handle).map_err(Error::from)?.dtype;
        let decoded = decode_values(dtype, values)?;
        let entry = state.entry_mut(handle).map_err(Error::from)?;
        match &mut entry.storage {
            Storage::Array(slot) => {
                entry.shape[0] = decoded.len() as u32;
                *slot = decoded;
                Ok(())
            }
            _ => Err(Status::InvalidState.into()),
        }
    }

    fn array_read(&self, handle: Handle) -> Result<MemView> {
        let state = self.lock();
        let entry = state.entry(handle).map_err(Error::from)?;
        match &entry.storage {
            Storage::Array(values) => Ok(MemView::new(
                encode_values(entry.dtype, values),
                entry.dtype,
                false,
            )),
            _ => Err(Status::InvalidState.into()),
        }
    }

    fn vector_set(&self, handle: Handle, index: u32, value: Value) -> Result<()> {
        let mut state = self.lock();
        match &mut state.entry_mut(handle).map_err(Error::from)?.storage {
            Storage::Vector { entries, .. } => {
                match entries.binary_search_by_key(&index, |&(k, _)| k) {
                    Ok(pos) => entries[pos].1 = value,
                    Err(pos) => entries.insert(pos, (index, value)),
                }
                Ok(())
            }
            _ => Err(Status::InvalidState.into()),
        }
    }

    fn vector_get(&self, handle: Handle, index: u32) -> Result<Option<Value>> {
        let state = self.lock();
        let entries = state.vector(handle).map_err(Error::from)?;
        Ok(entries
            .binary_search_by_key(&index, |&(k, _)| k)
            .ok()
            .map(|pos| entries[pos].1))
    }

    fn vector_clear(&self, handle: Handle) -> Result<()> {
        self.lock().put_vector(handle, Vec::new()).map_err(Error::from)
    }

    fn vector_count(&self, handle: Handle) -> Result<u32> {
        Ok(self.lock().vector(handle).map_err(Error::from)?.len() as u32)
    }

    fn vector_count_nonzero(&self, handle: Handle) -> Result<u32> {
        Ok(self
            .lock()
            .vector(handle)
            .map_err(Error::from)?
            .iter()
            .filter(|&&(_, v)| !v.is_zero())
            .count() as u32)
    }

    fn vector_build(&self, handle: Handle, keys: &[u32], values: &[u8]) -> Result<()> {
        let mut state = self.lock();
        let dtype = state.entry(handle).map_err(Error::from)?.dtype;
        let decoded = decode_values(dtype, values)?;
        if decoded.len() != keys.len() {
            return Err(Error::invalid_argument(
                "values",
                format!("{} keys but {} values", keys.len(), decoded.len()),
            ));
        }
        let entries = keys.iter().copied().zip(decoded).collect();
        state.put_vector(handle, entries).map_err(Error::from)
    }

    fn vector_read(&self, handle: Handle) -> Result<(MemView, MemView)> {
        let state = self.lock();
        let entry = state.entry(handle).map_err(Error::from)?;
        match &entry.storage {
            Storage::Vector { entries, .. } => {
                let keys: Vec<u32> = entries.iter().map(|&(k, _)| k).collect();
                let values: Vec<Value> = entries.iter().map(|&(_, v)| v).collect();
                Ok((
                    MemView::new(encode_keys(&keys), DType::Uint, false),
                    MemView::new(encode_values(entry.dtype, &values), entry.dtype, false),
                ))
            }
            _ => Err(Status::InvalidState.into()),
        }
    }

    fn matrix_set(&self, handle: Handle, row: u32, col: u32, value: Value) -> Result<()> {
        let mut state = self.lock();
        match &mut state.entry_mut(handle).map_err(Error::from)?.storage {
            Storage::Matrix { entries } => {
                match entries.binary_search_by_key(&(row, col), |&(r, c, _)| (r, c)) {
                    Ok(pos) => entries[pos].2 = value,
                    Err(pos) => entries.insert(pos, (row, col, value)),
                }
                Ok(())
            }
            _ => Err(Status::InvalidState.into()),
        }
    }

    fn matrix_get(&self, handle: Handle, row: u32, col: u32) -> Result<Option<Value>> {
        let state = self.lock();
        let entries = state.matrix(handle).map_err(Error::from)?;
        Ok(entries
            .binary_search_by_key(&(row, col), |&(r, c, _)| (r, c))
            .ok()
            .map(|pos| entries[pos].2))
    }

    fn matrix_clear(&self, handle: Handle) -> Result<()> {
        self.lock().put_matrix(handle, Vec::new()).map_err(Error::from)
    }

    fn matrix_count(&self, handle: Handle) -> Result<u32> {
        Ok(self.lock().matrix(handle).map_err(Error::from)?.len() as u32)
    }

    fn matrix_build(
        &self,
        handle: Handle,
        rows: &[u32],
        cols: &[u32],
        values: &[u8],
    ) -> Result<()> {
        let mut state = self.lock();
        let dtype = state.entry(handle).map_err(Error::from)?.dtype;
        let decoded = decode_values(dtype, values)?;
        if decoded.len() != rows.len() || rows.len() != cols.len() {
            return Err(Error::invalid_argument(
                "values",
                format!(
                    "{} rows, {} cols, {} values",
                    rows.len(),
                    cols.len(),
                    decoded.len()
                ),
            ));
        }
        let entries = rows
            .iter()
            .zip(cols.iter())
            .zip(decoded)
            .map(|((&r, &c), v)| (r, c, v))
            .collect();
        state.put_matrix(handle, entries).map_err(Error::from)
    }

    fn matrix_read(&self, handle: Handle) -> Result<(MemView, MemView, MemView)> {
        let state = self.lock();
        let entry = state.entry(handle).map_err(Error::from)?;
        match &entry.storage {
            Storage::Matrix { entries } => {
                let rows: Vec<u32> = entries.iter().map(|&(r, _, _)| r).collect();
                let cols: Vec<u32> = entries.iter().map(|&(_, c, _)| c).collect();
                let values: Vec<Value> = entries.iter().map(|&(_, _, v)| v).collect();
                Ok((
                    MemView::new(encode_keys(&rows), DType::Uint, false),
                    MemView::new(encode_keys(&cols), DType::Uint, false),
                    MemView::new(encode_values(entry.dtype, &values), entry.dtype, false),
                ))
            }
            _ => Err(Status::InvalidState.into()),
        }
    }

    fn dispatch(&self, request: &OpRequest<Self>) -> Status {
        match self.exec(request) {
            Ok(()) => Status::Ok,
            Err(status) => {
                log::debug!("cpu dispatch {} failed: {:?}", request.name(), status);
                status
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_lifecycle() {
        let backend = CpuBackend::new();
        let h = backend.make_scalar(DType::Int, Value::Int(7)).unwrap();
        assert_eq!(backend.scalar_get(h).unwrap(), Value::Int(7));
        backend.retain(h).unwrap();
        backend.release(h);
        // Still alive after one release of two refs.
        assert_eq!(backend.scalar_get(h).unwrap(), Value::Int(7));
        backend.release(h);
        assert!(backend.scalar_get(h).is_err());
        // Releasing a dead handle is a no-op.
        backend.release(h);
    }

    #[test]
    fn test_vector_storage_roundtrip() {
        let backend = CpuBackend::new();
        let h = backend.make_vector(DType::Float, 10).unwrap();
        backend.vector_set(h, 3, Value::Float(1.5)).unwrap();
        backend.vector_set(h, 1, Value::Float(0.0)).unwrap();
        assert_eq!(backend.vector_count(h).unwrap(), 2);
        assert_eq!(backend.vector_count_nonzero(h).unwrap(), 1);
        assert_eq!(backend.vector_get(h, 3).unwrap(), Some(Value::Float(1.5)));
        assert_eq!(backend.vector_get(h, 4).unwrap(), None);
        let (keys, values) = backend.vector_read(h).unwrap();
        assert_eq!(keys.decode::<u32>().unwrap(), vec![1, 3]);
        assert_eq!(values.decode::<f32>().unwrap(), vec![0.0, 1.5]);
        backend.release(h);
    }

    #[test]
    fn test_wrong_storage_kind_is_invalid_state() {
        let backend = CpuBackend::new();
        let h = backend.make_vector(DType::Int, 4).unwrap();
        assert!(matches!(
            backend.scalar_get(h),
            Err(Error::Backend(Status::InvalidState))
        ));
        backend.release(h);
    }
}
