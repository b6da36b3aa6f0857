//! Runtime scalar value, the unit of exchange with backend kernels

use super::DType;
use std::fmt;

/// A single typed value.
///
/// `Value` is what crosses the contract/backend boundary for scalar reads and
/// writes, reduction init values and masked-assign right-hand sides. Operator
/// function pointers consume and produce `Value`s; operand dtypes are
/// validated at the contract layer before any operator is applied.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Value {
    /// Logical value
    Bool(bool),
    /// 32-bit signed integer
    Int(i32),
    /// 32-bit unsigned integer
    Uint(u32),
    /// 32-bit float
    Float(f32),
}

impl Value {
    /// The dtype of this value
    #[inline]
    pub const fn dtype(self) -> DType {
        match self {
            Self::Bool(_) => DType::Bool,
            Self::Int(_) => DType::Int,
            Self::Uint(_) => DType::Uint,
            Self::Float(_) => DType::Float,
        }
    }

    /// True if this is the zero value of its type
    #[inline]
    pub fn is_zero(self) -> bool {
        match self {
            Self::Bool(v) => !v,
            Self::Int(v) => v == 0,
            Self::Uint(v) => v == 0,
            Self::Float(v) => v == 0.0,
        }
    }

    /// Extract a bool, if that is the stored variant
    #[inline]
    pub const fn as_bool(self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Extract an i32, if that is the stored variant
    #[inline]
    pub const fn as_int(self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Extract a u32, if that is the stored variant
    #[inline]
    pub const fn as_uint(self) -> Option<u32> {
        match self {
            Self::Uint(v) => Some(v),
            _ => None,
        }
    }

    /// Extract an f32, if that is the stored variant
    #[inline]
    pub const fn as_float(self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Uint(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Uint(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_dtype() {
        assert_eq!(Value::Int(3).dtype(), DType::Int);
        assert_eq!(Value::Float(0.5).dtype(), DType::Float);
    }

    #[test]
    fn test_value_zero() {
        assert!(Value::Uint(0).is_zero());
        assert!(Value::Bool(false).is_zero());
        assert!(!Value::Float(-1.0).is_zero());
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Int(7).as_int(), Some(7));
        assert_eq!(Value::Int(7).as_float(), None);
    }
}
