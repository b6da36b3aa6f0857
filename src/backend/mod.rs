//! Compute backend call surface
//!
//! A backend owns all container storage and executes operation requests
//! against it. The contract layer talks to it through a deliberately narrow
//! surface: container lifecycle, raw build/read marshalling, and a single
//! [`Backend::dispatch`] entry taking a fully marshalled [`OpRequest`].
//! Storage formats are backend-private; the contract only guarantees pattern
//! correctness of what goes in and comes out.

#[cfg(feature = "cpu")]
pub mod cpu;

mod descriptor;
mod request;
mod view;

pub use descriptor::Descriptor;
pub use request::OpRequest;
pub use view::MemView;

use crate::dtype::{DType, Value};
use crate::error::{Result, Status};

/// Opaque identifier of one backend-side container resource.
///
/// Every container exclusively owns one handle; the backend reference-counts
/// the underlying resource and frees it when the count reaches zero.
pub type Handle = u64;

/// Trait implemented by compute backends (CPU, OpenCL, CUDA, ...).
///
/// All methods are synchronous: a call returns only after the backend has
/// completed (or rejected) the request. Lifecycle and marshalling methods
/// report rich [`crate::error::Error`]s; `dispatch` reports the raw
/// [`Status`] taxonomy, surfaced verbatim to callers.
///
/// A failed `dispatch` must not have mutated the request's output container.
pub trait Backend: Clone + Send + Sync + 'static {
    /// Human-readable backend name
    fn name(&self) -> &'static str;

    // ------------------------------------------------------------------
    // Container lifecycle
    // ------------------------------------------------------------------

    /// Allocate a scalar resource holding `init`
    fn make_scalar(&self, dtype: DType, init: Value) -> Result<Handle>;

    /// Allocate a dense array resource of `len` zero elements
    fn make_array(&self, dtype: DType, len: u32) -> Result<Handle>;

    /// Allocate an empty sparse vector resource of logical size `n`
    fn make_vector(&self, dtype: DType, n: u32) -> Result<Handle>;

    /// Allocate an empty sparse matrix resource of shape `(n_rows, n_cols)`
    fn make_matrix(&self, dtype: DType, n_rows: u32, n_cols: u32) -> Result<Handle>;

    /// Increment the reference count of a live resource
    fn retain(&self, handle: Handle) -> Result<()>;

    /// Decrement the reference count, freeing the resource at zero.
    /// Releasing an unknown handle is a no-op.
    fn release(&self, handle: Handle);

    // ------------------------------------------------------------------
    // Scalar access
    // ------------------------------------------------------------------

    /// Read the scalar value
    fn scalar_get(&self, handle: Handle) -> Result<Value>;

    /// Overwrite the scalar value
    fn scalar_set(&self, handle: Handle, value: Value) -> Result<()>;

    // ------------------------------------------------------------------
    // Array access
    // ------------------------------------------------------------------

    /// Current number of elements
    fn array_len(&self, handle: Handle) -> Result<u32>;

    /// Read one element
    fn array_get(&self, handle: Handle, index: u32) -> Result<Value>;

    /// Write one element
    fn array_set(&self, handle: Handle, index: u32, value: Value) -> Result<()>;

    /// Resize, zero-filling new elements
    fn array_resize(&self, handle: Handle, len: u32) -> Result<()>;

    /// Drop all elements
    fn array_clear(&self, handle: Handle) -> Result<()>;

    /// Replace contents from a packed little-endian value buffer
    fn array_build(&self, handle: Handle, values: &[u8]) -> Result<()>;

    /// Read back the packed value buffer
    fn array_read(&self, handle: Handle) -> Result<MemView>;

    // ------------------------------------------------------------------
    // Vector access
    // ------------------------------------------------------------------

    /// Insert or overwrite one entry
    fn vector_set(&self, handle: Handle, index: u32, value: Value) -> Result<()>;

    /// Read one entry; `None` if the index is absent from the pattern
    fn vector_get(&self, handle: Handle, index: u32) -> Result<Option<Value>>;

    /// Drop all entries (the logical size is unchanged)
    fn vector_clear(&self, handle: Handle) -> Result<()>;

    /// Number of stored entries
    fn vector_count(&self, handle: Handle) -> Result<u32>;

    /// Number of stored entries with a non-zero value
    fn vector_count_nonzero(&self, handle: Handle) -> Result<u32>;

    /// Replace contents from sorted unique keys and a packed value buffer.
    /// Key validity is the contract layer's responsibility.
    fn vector_build(&self, handle: Handle, keys: &[u32], values: &[u8]) -> Result<()>;

    /// Read back (keys, values) as backend-owned views
    fn vector_read(&self, handle: Handle) -> Result<(MemView, MemView)>;

    // ------------------------------------------------------------------
    // Matrix access
    // ------------------------------------------------------------------

    /// Insert or overwrite one entry
    fn matrix_set(&self, handle: Handle, row: u32, col: u32, value: Value) -> Result<()>;

    /// Read one entry; `None` if (row, col) is absent from the pattern
    fn matrix_get(&self, handle: Handle, row: u32, col: u32) -> Result<Option<Value>>;

    /// Drop all entries (the shape is unchanged)
    fn matrix_clear(&self, handle: Handle) -> Result<()>;

    /// Number of stored entries
    fn matrix_count(&self, handle: Handle) -> Result<u32>;

    /// Replace contents from row-major sorted unique triples.
    /// Key validity is the contract layer's responsibility.
    fn matrix_build(&self, handle: Handle, rows: &[u32], cols: &[u32], values: &[u8])
        -> Result<()>;

    /// Read back (row keys, col keys, values) as backend-owned views
    fn matrix_read(&self, handle: Handle) -> Result<(MemView, MemView, MemView)>;

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    /// Execute one marshalled operation request.
    ///
    /// Local precondition checks (shape and dtype agreement) happen before
    /// this call; the backend only sees requests whose operands are
    /// consistent, and reports its own failures through the status code.
    fn dispatch(&self, request: &OpRequest<Self>) -> Status;
}
