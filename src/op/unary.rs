//! Unary operators: `T -> T` elementwise transforms

use crate::dtype::{DType, Value};
use crate::error::{Error, Result};
use std::fmt;

/// Names of the built-in unary operators
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOpName {
    /// Pass-through
    Identity,
    /// Additive inverse
    Ainv,
    /// Absolute value
    Abs,
    /// Constant one
    One,
    /// Logical not (non-zero is true)
    Lnot,
    /// Bitwise not
    Bnot,
}

impl UnaryOpName {
    /// Upper-case name used in canonical operator keys
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Identity => "IDENTITY",
            Self::Ainv => "AINV",
            Self::Abs => "ABS",
            Self::One => "ONE",
            Self::Lnot => "LNOT",
            Self::Bnot => "BNOT",
        }
    }

    /// Parse the upper-case name used in operator keys
    pub fn from_str_name(name: &str) -> Option<Self> {
        Some(match name {
            "IDENTITY" => Self::Identity,
            "AINV" => Self::Ainv,
            "ABS" => Self::Abs,
            "ONE" => Self::One,
            "LNOT" => Self::Lnot,
            "BNOT" => Self::Bnot,
            _ => return None,
        })
    }
}

/// A named, pure, total unary operator bound to one dtype.
///
/// Used by value-applying transforms: map, transpose-with-apply and
/// extraction-with-apply. One canonical `&'static` instance per
/// (name, dtype) pair.
pub struct UnaryOp {
    /// Operator name
    pub name: UnaryOpName,
    /// Argument and result dtype
    pub dtype: DType,
    f: fn(Value) -> Value,
}

impl UnaryOp {
    /// Apply the operator
    #[inline]
    pub fn apply(&self, v: Value) -> Value {
        (self.f)(v)
    }

    /// Canonical lookup key, e.g. `OpUnary_IDENTITY_FLOAT`
    pub fn key(&self) -> String {
        format!("OpUnary_{}_{}", self.name.as_str(), self.dtype.name())
    }
}

impl fmt::Debug for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnaryOp({})", self.key())
    }
}

fn identity(v: Value) -> Value {
    v
}

fn ainv(v: Value) -> Value {
    match v {
        Value::Int(x) => Value::Int(x.wrapping_neg()),
        Value::Float(x) => Value::Float(-x),
        _ => unreachable!("AINV applied to mismatched operand"),
    }
}

fn abs(v: Value) -> Value {
    match v {
        Value::Int(x) => Value::Int(x.wrapping_abs()),
        Value::Float(x) => Value::Float(x.abs()),
        _ => unreachable!("ABS applied to mismatched operand"),
    }
}

fn one(v: Value) -> Value {
    match v {
        Value::Bool(_) => Value::Bool(true),
        Value::Int(_) => Value::Int(1),
        Value::Uint(_) => Value::Uint(1),
        Value::Float(_) => Value::Float(1.0),
    }
}

fn lnot(v: Value) -> Value {
    match v {
        Value::Bool(x) => Value::Bool(!x),
        Value::Int(x) => Value::Int((x == 0) as i32),
        Value::Uint(x) => Value::Uint((x == 0) as u32),
        _ => unreachable!("LNOT applied to mismatched operand"),
    }
}

fn bnot(v: Value) -> Value {
    match v {
        Value::Int(x) => Value::Int(!x),
        Value::Uint(x) => Value::Uint(!x),
        _ => unreachable!("BNOT applied to mismatched operand"),
    }
}

macro_rules! un_op {
    ($name:ident, $dtype:ident, $f:ident) => {
        UnaryOp {
            name: UnaryOpName::$name,
            dtype: DType::$dtype,
            f: $f,
        }
    };
}

static CATALOG: &[UnaryOp] = &[
    un_op!(Identity, Bool, identity),
    un_op!(Identity, Int, identity),
    un_op!(Identity, Uint, identity),
    un_op!(Identity, Float, identity),
    un_op!(One, Bool, one),
    un_op!(One, Int, one),
    un_op!(One, Uint, one),
    un_op!(One, Float, one),
    un_op!(Ainv, Int, ainv),
    un_op!(Ainv, Float, ainv),
    un_op!(Abs, Int, abs),
    un_op!(Abs, Float, abs),
    un_op!(Lnot, Bool, lnot),
    un_op!(Lnot, Int, lnot),
    un_op!(Lnot, Uint, lnot),
    un_op!(Bnot, Int, bnot),
    un_op!(Bnot, Uint, bnot),
];

/// Resolve the canonical unary operator for a (name, dtype) pair
///
/// # Errors
///
/// `OperatorNotSupported` if the combination is not registered, e.g.
/// `AINV` over `UINT`.
pub fn resolve_unary(name: UnaryOpName, dtype: DType) -> Result<&'static UnaryOp> {
    CATALOG
        .iter()
        .find(|op| op.name == name && op.dtype == dtype)
        .ok_or_else(|| Error::OperatorNotSupported {
            key: format!("OpUnary_{}_{}", name.as_str(), dtype.name()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_all_types() {
        for dtype in DType::ALL {
            let op = resolve_unary(UnaryOpName::Identity, dtype).unwrap();
            assert_eq!(op.apply(dtype.zero()), dtype.zero());
        }
    }

    #[test]
    fn test_ainv_not_for_uint() {
        assert!(resolve_unary(UnaryOpName::Ainv, DType::Uint).is_err());
        let op = resolve_unary(UnaryOpName::Ainv, DType::Int).unwrap();
        assert_eq!(op.apply(Value::Int(3)), Value::Int(-3));
    }

    #[test]
    fn test_lnot_int() {
        let op = resolve_unary(UnaryOpName::Lnot, DType::Int).unwrap();
        assert_eq!(op.apply(Value::Int(0)), Value::Int(1));
        assert_eq!(op.apply(Value::Int(9)), Value::Int(0));
    }

    #[test]
    fn test_key_format() {
        let op = resolve_unary(UnaryOpName::One, DType::Float).unwrap();
        assert_eq!(op.key(), "OpUnary_ONE_FLOAT");
    }
}
