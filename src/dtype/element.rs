//! Element trait mapping Rust types to runtime dtypes

use super::{DType, Value};

/// Trait for Rust types that can be elements of a sparla container.
///
/// This connects Rust's type system to the runtime [`DType`] system: typed
/// container APIs (`Vector::build(&[u32], &[T])`, `Scalar::get::<T>()`, ...)
/// are generic over `Element` and are checked against the container's dtype
/// at call time.
pub trait Element: Copy + Send + Sync + PartialEq + std::fmt::Debug + 'static {
    /// The corresponding runtime dtype
    const DTYPE: DType;

    /// Wrap into a runtime value
    fn into_value(self) -> Value;

    /// Unwrap from a runtime value; `None` if the variant does not match
    fn from_value(value: Value) -> Option<Self>;
}

impl Element for bool {
    const DTYPE: DType = DType::Bool;

    #[inline]
    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    #[inline]
    fn from_value(value: Value) -> Option<Self> {
        value.as_bool()
    }
}

impl Element for i32 {
    const DTYPE: DType = DType::Int;

    #[inline]
    fn into_value(self) -> Value {
        Value::Int(self)
    }

    #[inline]
    fn from_value(value: Value) -> Option<Self> {
        value.as_int()
    }
}

impl Element for u32 {
    const DTYPE: DType = DType::Uint;

    #[inline]
    fn into_value(self) -> Value {
        Value::Uint(self)
    }

    #[inline]
    fn from_value(value: Value) -> Option<Self> {
        value.as_uint()
    }
}

impl Element for f32 {
    const DTYPE: DType = DType::Float;

    #[inline]
    fn into_value(self) -> Value {
        Value::Float(self)
    }

    #[inline]
    fn from_value(value: Value) -> Option<Self> {
        value.as_float()
    }
}
