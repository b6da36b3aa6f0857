//! Type registry: accessor bindings between typed values and raw buffers
//!
//! Each built-in dtype has one immutable [`TypeInfo`] descriptor carrying its
//! byte layout and the get/set accessor functions used to marshal values in
//! and out of backend-owned byte buffers. The [`TypeRegistry`] is populated
//! once at context construction, before any container is created; looking up
//! an unregistered dtype fails with [`Error::UnknownType`].

use super::{DType, Value, DTYPE_COUNT};
use crate::error::{Error, Result};

/// Immutable descriptor of one element kind.
///
/// `get`/`set` operate on a packed little-endian buffer of `size`-byte
/// elements; index bounds are the caller's responsibility, value variants
/// must match `dtype` (validated at the contract layer before marshalling).
pub struct TypeInfo {
    /// The dtype this descriptor belongs to
    pub dtype: DType,
    /// One-letter short code
    pub code: char,
    /// Size of one packed element in bytes
    pub size: usize,
    /// The type's zero value
    pub zero: Value,
    /// Decode the element at `index` of a packed buffer
    pub get: fn(buf: &[u8], index: usize) -> Value,
    /// Encode `value` into the element at `index` of a packed buffer
    pub set: fn(buf: &mut [u8], index: usize, value: Value),
}

impl std::fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeInfo")
            .field("dtype", &self.dtype)
            .field("code", &self.code)
            .field("size", &self.size)
            .finish()
    }
}

fn get_bool(buf: &[u8], index: usize) -> Value {
    Value::Bool(buf[index] != 0)
}

fn set_bool(buf: &mut [u8], index: usize, value: Value) {
    match value {
        Value::Bool(v) => buf[index] = v as u8,
        other => unreachable!("BOOL accessor applied to {:?}", other.dtype()),
    }
}

fn get_int(buf: &[u8], index: usize) -> Value {
    Value::Int(bytemuck::pod_read_unaligned(&buf[index * 4..index * 4 + 4]))
}

fn set_int(buf: &mut [u8], index: usize, value: Value) {
    match value {
        Value::Int(v) => buf[index * 4..index * 4 + 4].copy_from_slice(bytemuck::bytes_of(&v)),
        other => unreachable!("INT accessor applied to {:?}", other.dtype()),
    }
}

fn get_uint(buf: &[u8], index: usize) -> Value {
    Value::Uint(bytemuck::pod_read_unaligned(&buf[index * 4..index * 4 + 4]))
}

fn set_uint(buf: &mut [u8], index: usize, value: Value) {
    match value {
        Value::Uint(v) => buf[index * 4..index * 4 + 4].copy_from_slice(bytemuck::bytes_of(&v)),
        other => unreachable!("UINT accessor applied to {:?}", other.dtype()),
    }
}

fn get_float(buf: &[u8], index: usize) -> Value {
    Value::Float(bytemuck::pod_read_unaligned(&buf[index * 4..index * 4 + 4]))
}

fn set_float(buf: &mut [u8], index: usize, value: Value) {
    match value {
        Value::Float(v) => buf[index * 4..index * 4 + 4].copy_from_slice(bytemuck::bytes_of(&v)),
        other => unreachable!("FLOAT accessor applied to {:?}", other.dtype()),
    }
}

static BOOL_INFO: TypeInfo = TypeInfo {
    dtype: DType::Bool,
    code: 'B',
    size: 1,
    zero: Value::Bool(false),
    get: get_bool,
    set: set_bool,
};

static INT_INFO: TypeInfo = TypeInfo {
    dtype: DType::Int,
    code: 'I',
    size: 4,
    zero: Value::Int(0),
    get: get_int,
    set: set_int,
};

static UINT_INFO: TypeInfo = TypeInfo {
    dtype: DType::Uint,
    code: 'U',
    size: 4,
    zero: Value::Uint(0),
    get: get_uint,
    set: set_uint,
};

static FLOAT_INFO: TypeInfo = TypeInfo {
    dtype: DType::Float,
    code: 'F',
    size: 4,
    zero: Value::Float(0.0),
    get: get_float,
    set: set_float,
};

/// Descriptors of the fixed built-in type set, in registration order
pub static BUILT_IN: [&TypeInfo; DTYPE_COUNT] =
    [&BOOL_INFO, &INT_INFO, &UINT_INFO, &FLOAT_INFO];

/// Accessor descriptor for a built-in dtype, bypassing registration checks.
/// Backend internals use this; contract-layer code goes through the registry.
pub(crate) fn info(dtype: DType) -> &'static TypeInfo {
    BUILT_IN[dtype as usize]
}

/// Registry of type accessor bindings.
///
/// Registration is idempotent and total across the built-in set; there is no
/// way to add types beyond it.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    slots: [Option<&'static TypeInfo>; DTYPE_COUNT],
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with all built-in types registered
    pub fn with_built_in() -> Self {
        let mut registry = Self::new();
        for info in BUILT_IN {
            registry.register(info);
        }
        registry
    }

    /// Bind the accessor functions for one type. Idempotent.
    pub fn register(&mut self, info: &'static TypeInfo) {
        self.slots[info.dtype as usize] = Some(info);
    }

    /// Look up the accessors for a dtype
    ///
    /// # Errors
    ///
    /// `UnknownType` if the dtype was never registered.
    pub fn lookup(&self, dtype: DType) -> Result<&'static TypeInfo> {
        self.slots[dtype as usize].ok_or(Error::UnknownType { dtype })
    }
}
