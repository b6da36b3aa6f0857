//! Element type system for sparla containers
//!
//! Every container is parametrized by exactly one [`DType`] for its entire
//! lifetime. The set of types is fixed: accelerator backends rely on the
//! byte layouts being known up front, so no dynamic user types are supported.

mod element;
mod registry;
mod value;

pub use element::Element;
pub(crate) use registry::info;
pub use registry::{TypeInfo, TypeRegistry, BUILT_IN};
pub use value::Value;

use std::fmt;

/// Element types supported by sparla containers
///
/// Using a runtime enum (rather than making every container generic over the
/// element type) keeps operator resolution and backend dispatch uniform: the
/// backend sees a small closed set of layouts it has kernels for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DType {
    /// Logical type, stored as one byte (0 or 1)
    Bool = 0,
    /// 32-bit signed integer
    Int = 1,
    /// 32-bit unsigned integer
    Uint = 2,
    /// 32-bit IEEE 754 floating point
    Float = 3,
}

/// Number of distinct dtypes; sizes internal lookup tables
pub(crate) const DTYPE_COUNT: usize = 4;

impl DType {
    /// Size of one element in bytes
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::Bool => 1,
            Self::Int | Self::Uint | Self::Float => 4,
        }
    }

    /// One-letter short code used in labels and debug output
    #[inline]
    pub const fn code(self) -> char {
        match self {
            Self::Bool => 'B',
            Self::Int => 'I',
            Self::Uint => 'U',
            Self::Float => 'F',
        }
    }

    /// Upper-case name used in canonical operator keys (e.g. `INT`)
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "BOOL",
            Self::Int => "INT",
            Self::Uint => "UINT",
            Self::Float => "FLOAT",
        }
    }

    /// The zero value of this type
    #[inline]
    pub const fn zero(self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::Int => Value::Int(0),
            Self::Uint => Value::Uint(0),
            Self::Float => Value::Float(0.0),
        }
    }

    /// The one value of this type
    #[inline]
    pub const fn one(self) -> Value {
        match self {
            Self::Bool => Value::Bool(true),
            Self::Int => Value::Int(1),
            Self::Uint => Value::Uint(1),
            Self::Float => Value::Float(1.0),
        }
    }

    /// True for the integral types (Int, Uint)
    #[inline]
    pub const fn is_integral(self) -> bool {
        matches!(self, Self::Int | Self::Uint)
    }

    /// All built-in dtypes, in registration order
    pub const ALL: [DType; DTYPE_COUNT] = [Self::Bool, Self::Int, Self::Uint, Self::Float];

    /// Parse the upper-case name used in operator keys
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "BOOL" => Some(Self::Bool),
            "INT" => Some(Self::Int),
            "UINT" => Some(Self::Uint),
            "FLOAT" => Some(Self::Float),
            _ => None,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_sizes() {
        assert_eq!(DType::Bool.size_in_bytes(), 1);
        assert_eq!(DType::Int.size_in_bytes(), 4);
        assert_eq!(DType::Uint.size_in_bytes(), 4);
        assert_eq!(DType::Float.size_in_bytes(), 4);
    }

    #[test]
    fn test_dtype_codes() {
        assert_eq!(DType::Bool.code(), 'B');
        assert_eq!(DType::Int.code(), 'I');
        assert_eq!(DType::Uint.code(), 'U');
        assert_eq!(DType::Float.code(), 'F');
    }

    #[test]
    fn test_dtype_names_round_trip() {
        for dtype in DType::ALL {
            assert_eq!(DType::from_name(dtype.name()), Some(dtype));
        }
        assert_eq!(DType::from_name("COMPLEX"), None);
    }

    #[test]
    fn test_dtype_zero() {
        assert_eq!(DType::Int.zero(), Value::Int(0));
        assert_eq!(DType::Float.zero(), Value::Float(0.0));
        assert_eq!(DType::Bool.zero(), Value::Bool(false));
    }
}
