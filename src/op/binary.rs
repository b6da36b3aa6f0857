//! Binary operators: `T x T -> T` folds and product steps

use crate::dtype::{DType, Value};
use crate::error::{Error, Result};
use std::fmt;

/// Names of the built-in binary operators
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOpName {
    /// Addition
    Plus,
    /// Subtraction
    Minus,
    /// Multiplication
    Mult,
    /// Division (integer division by zero yields zero)
    Div,
    /// Squared difference, `(a - b)^2`
    MinusPow2,
    /// Left argument
    First,
    /// Right argument
    Second,
    /// Constant one
    One,
    /// Minimum
    Min,
    /// Maximum
    Max,
    /// Bitwise or
    Bor,
    /// Bitwise and
    Band,
    /// Bitwise xor
    Bxor,
    /// Logical or (non-zero is true)
    Lor,
    /// Logical and (non-zero is true)
    Land,
}

impl BinaryOpName {
    /// Upper-case name used in canonical operator keys
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plus => "PLUS",
            Self::Minus => "MINUS",
            Self::Mult => "MULT",
            Self::Div => "DIV",
            Self::MinusPow2 => "MINUS_POW2",
            Self::First => "FIRST",
            Self::Second => "SECOND",
            Self::One => "ONE",
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::Bor => "BOR",
            Self::Band => "BAND",
            Self::Bxor => "BXOR",
            Self::Lor => "LOR",
            Self::Land => "LAND",
        }
    }

    /// Parse the upper-case name used in operator keys
    pub fn from_str_name(name: &str) -> Option<Self> {
        Some(match name {
            "PLUS" => Self::Plus,
            "MINUS" => Self::Minus,
            "MULT" => Self::Mult,
            "DIV" => Self::Div,
            "MINUS_POW2" => Self::MinusPow2,
            "FIRST" => Self::First,
            "SECOND" => Self::Second,
            "ONE" => Self::One,
            "MIN" => Self::Min,
            "MAX" => Self::Max,
            "BOR" => Self::Bor,
            "BAND" => Self::Band,
            "BXOR" => Self::Bxor,
            "LOR" => Self::Lor,
            "LAND" => Self::Land,
            _ => return None,
        })
    }
}

/// A named, pure, total binary operator bound to one dtype.
///
/// Instances are immutable and stateless; the catalog holds exactly one
/// canonical instance per (name, dtype) pair, handed out as `&'static`.
pub struct BinaryOp {
    /// Operator name
    pub name: BinaryOpName,
    /// Argument and result dtype
    pub dtype: DType,
    /// Identity element of the fold, where one exists; the dtype's zero
    /// otherwise. Reductions and products default their `init` to this.
    pub neutral: Value,
    f: fn(Value, Value) -> Value,
}

impl BinaryOp {
    /// Apply the operator. Operand dtypes must match `self.dtype`; the
    /// contract layer validates this before any kernel runs.
    #[inline]
    pub fn apply(&self, a: Value, b: Value) -> Value {
        (self.f)(a, b)
    }

    /// Canonical lookup key, e.g. `OpBinary_PLUS_INT`
    pub fn key(&self) -> String {
        format!("OpBinary_{}_{}", self.name.as_str(), self.dtype.name())
    }
}

impl fmt::Debug for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BinaryOp({})", self.key())
    }
}

fn plus(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Value::Int(x.wrapping_add(y)),
        (Value::Uint(x), Value::Uint(y)) => Value::Uint(x.wrapping_add(y)),
        (Value::Float(x), Value::Float(y)) => Value::Float(x + y),
        _ => unreachable!("PLUS applied to mismatched operands"),
    }
}

fn minus(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Value::Int(x.wrapping_sub(y)),
        (Value::Uint(x), Value::Uint(y)) => Value::Uint(x.wrapping_sub(y)),
        (Value::Float(x), Value::Float(y)) => Value::Float(x - y),
        _ => unreachable!("MINUS applied to mismatched operands"),
    }
}

fn mult(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Value::Int(x.wrapping_mul(y)),
        (Value::Uint(x), Value::Uint(y)) => Value::Uint(x.wrapping_mul(y)),
        (Value::Float(x), Value::Float(y)) => Value::Float(x * y),
        _ => unreachable!("MULT applied to mismatched operands"),
    }
}

fn div(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Value::Int(if y == 0 { 0 } else { x.wrapping_div(y) }),
        (Value::Uint(x), Value::Uint(y)) => Value::Uint(if y == 0 { 0 } else { x / y }),
        (Value::Float(x), Value::Float(y)) => Value::Float(x / y),
        _ => unreachable!("DIV applied to mismatched operands"),
    }
}

fn minus_pow2(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => {
            let d = x.wrapping_sub(y);
            Value::Int(d.wrapping_mul(d))
        }
        (Value::Uint(x), Value::Uint(y)) => {
            let d = x.wrapping_sub(y);
            Value::Uint(d.wrapping_mul(d))
        }
        (Value::Float(x), Value::Float(y)) => Value::Float((x - y) * (x - y)),
        _ => unreachable!("MINUS_POW2 applied to mismatched operands"),
    }
}

fn first(a: Value, _b: Value) -> Value {
    a
}

fn second(_a: Value, b: Value) -> Value {
    b
}

fn one(a: Value, _b: Value) -> Value {
    match a {
        Value::Bool(_) => Value::Bool(true),
        Value::Int(_) => Value::Int(1),
        Value::Uint(_) => Value::Uint(1),
        Value::Float(_) => Value::Float(1.0),
    }
}

fn min(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Value::Int(x.min(y)),
        (Value::Uint(x), Value::Uint(y)) => Value::Uint(x.min(y)),
        (Value::Float(x), Value::Float(y)) => Value::Float(x.min(y)),
        _ => unreachable!("MIN applied to mismatched operands"),
    }
}

fn max(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Value::Int(x.max(y)),
        (Value::Uint(x), Value::Uint(y)) => Value::Uint(x.max(y)),
        (Value::Float(x), Value::Float(y)) => Value::Float(x.max(y)),
        _ => unreachable!("MAX applied to mismatched operands"),
    }
}

fn bor(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Value::Int(x | y),
        (Value::Uint(x), Value::Uint(y)) => Value::Uint(x | y),
        _ => unreachable!("BOR applied to mismatched operands"),
    }
}

fn band(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Value::Int(x & y),
        (Value::Uint(x), Value::Uint(y)) => Value::Uint(x & y),
        _ => unreachable!("BAND applied to mismatched operands"),
    }
}

fn bxor(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Value::Int(x ^ y),
        (Value::Uint(x), Value::Uint(y)) => Value::Uint(x ^ y),
        _ => unreachable!("BXOR applied to mismatched operands"),
    }
}

fn lor(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => Value::Bool(x || y),
        (Value::Int(x), Value::Int(y)) => Value::Int((x != 0 || y != 0) as i32),
        (Value::Uint(x), Value::Uint(y)) => Value::Uint((x != 0 || y != 0) as u32),
        _ => unreachable!("LOR applied to mismatched operands"),
    }
}

fn land(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => Value::Bool(x && y),
        (Value::Int(x), Value::Int(y)) => Value::Int((x != 0 && y != 0) as i32),
        (Value::Uint(x), Value::Uint(y)) => Value::Uint((x != 0 && y != 0) as u32),
        _ => unreachable!("LAND applied to mismatched operands"),
    }
}

macro_rules! bin_op {
    ($name:ident, $dtype:ident, $neutral:expr, $f:ident) => {
        BinaryOp {
            name: BinaryOpName::$name,
            dtype: DType::$dtype,
            neutral: $neutral,
            f: $f,
        }
    };
}

/// Canonical binary operator instances, one per registered (name, dtype)
static CATALOG: &[BinaryOp] = &[
    // Arithmetic over INT, UINT, FLOAT
    bin_op!(Plus, Int, Value::Int(0), plus),
    bin_op!(Plus, Uint, Value::Uint(0), plus),
    bin_op!(Plus, Float, Value::Float(0.0), plus),
    bin_op!(Minus, Int, Value::Int(0), minus),
    bin_op!(Minus, Uint, Value::Uint(0), minus),
    bin_op!(Minus, Float, Value::Float(0.0), minus),
    bin_op!(Mult, Int, Value::Int(1), mult),
    bin_op!(Mult, Uint, Value::Uint(1), mult),
    bin_op!(Mult, Float, Value::Float(1.0), mult),
    bin_op!(Div, Int, Value::Int(0), div),
    bin_op!(Div, Uint, Value::Uint(0), div),
    bin_op!(Div, Float, Value::Float(0.0), div),
    bin_op!(MinusPow2, Int, Value::Int(0), minus_pow2),
    bin_op!(MinusPow2, Uint, Value::Uint(0), minus_pow2),
    bin_op!(MinusPow2, Float, Value::Float(0.0), minus_pow2),
    bin_op!(Min, Int, Value::Int(i32::MAX), min),
    bin_op!(Min, Uint, Value::Uint(u32::MAX), min),
    bin_op!(Min, Float, Value::Float(f32::INFINITY), min),
    bin_op!(Max, Int, Value::Int(i32::MIN), max),
    bin_op!(Max, Uint, Value::Uint(0), max),
    bin_op!(Max, Float, Value::Float(f32::NEG_INFINITY), max),
    // Selection over all types
    bin_op!(First, Bool, Value::Bool(false), first),
    bin_op!(First, Int, Value::Int(0), first),
    bin_op!(First, Uint, Value::Uint(0), first),
    bin_op!(First, Float, Value::Float(0.0), first),
    bin_op!(Second, Bool, Value::Bool(false), second),
    bin_op!(Second, Int, Value::Int(0), second),
    bin_op!(Second, Uint, Value::Uint(0), second),
    bin_op!(Second, Float, Value::Float(0.0), second),
    bin_op!(One, Bool, Value::Bool(false), one),
    bin_op!(One, Int, Value::Int(0), one),
    bin_op!(One, Uint, Value::Uint(0), one),
    bin_op!(One, Float, Value::Float(0.0), one),
    // Bitwise over the integral types only
    bin_op!(Bor, Int, Value::Int(0), bor),
    bin_op!(Bor, Uint, Value::Uint(0), bor),
    bin_op!(Band, Int, Value::Int(-1), band),
    bin_op!(Band, Uint, Value::Uint(u32::MAX), band),
    bin_op!(Bxor, Int, Value::Int(0), bxor),
    bin_op!(Bxor, Uint, Value::Uint(0), bxor),
    // Logical over BOOL and the integral types
    bin_op!(Lor, Bool, Value::Bool(false), lor),
    bin_op!(Lor, Int, Value::Int(0), lor),
    bin_op!(Lor, Uint, Value::Uint(0), lor),
    bin_op!(Land, Bool, Value::Bool(true), land),
    bin_op!(Land, Int, Value::Int(1), land),
    bin_op!(Land, Uint, Value::Uint(1), land),
];

/// Resolve the canonical binary operator for a (name, dtype) pair
///
/// # Errors
///
/// `OperatorNotSupported` if the combination is not registered, e.g.
/// bitwise operators over `FLOAT`.
pub fn resolve_binary(name: BinaryOpName, dtype: DType) -> Result<&'static BinaryOp> {
    CATALOG
        .iter()
        .find(|op| op.name == name && op.dtype == dtype)
        .ok_or_else(|| Error::OperatorNotSupported {
            key: format!("OpBinary_{}_{}", name.as_str(), dtype.name()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_canonical_instance() {
        let a = resolve_binary(BinaryOpName::Plus, DType::Int).unwrap();
        let b = resolve_binary(BinaryOpName::Plus, DType::Int).unwrap();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.key(), "OpBinary_PLUS_INT");
    }

    #[test]
    fn test_bitwise_undefined_for_float() {
        let err = resolve_binary(BinaryOpName::Band, DType::Float).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::OperatorNotSupported { ref key } if key == "OpBinary_BAND_FLOAT"
        ));
    }

    #[test]
    fn test_neutral_elements() {
        let cases = [
            (BinaryOpName::Plus, DType::Int, Value::Int(0)),
            (BinaryOpName::Mult, DType::Float, Value::Float(1.0)),
            (BinaryOpName::Min, DType::Uint, Value::Uint(u32::MAX)),
            (BinaryOpName::Max, DType::Float, Value::Float(f32::NEG_INFINITY)),
            (BinaryOpName::Lor, DType::Bool, Value::Bool(false)),
            (BinaryOpName::Land, DType::Bool, Value::Bool(true)),
        ];
        for (name, dtype, neutral) in cases {
            let op = resolve_binary(name, dtype).unwrap();
            assert_eq!(op.neutral, neutral, "{}", op.key());
        }
    }

    #[test]
    fn test_neutral_is_identity() {
        for name in [
            BinaryOpName::Plus,
            BinaryOpName::Mult,
            BinaryOpName::Min,
            BinaryOpName::Max,
        ] {
            let op = resolve_binary(name, DType::Int).unwrap();
            assert_eq!(op.apply(op.neutral, Value::Int(17)), Value::Int(17));
        }
    }

    #[test]
    fn test_apply_semantics() {
        let land = resolve_binary(BinaryOpName::Land, DType::Int).unwrap();
        assert_eq!(land.apply(Value::Int(5), Value::Int(3)), Value::Int(1));
        assert_eq!(land.apply(Value::Int(5), Value::Int(0)), Value::Int(0));

        let div = resolve_binary(BinaryOpName::Div, DType::Uint).unwrap();
        assert_eq!(div.apply(Value::Uint(7), Value::Uint(0)), Value::Uint(0));

        let mp2 = resolve_binary(BinaryOpName::MinusPow2, DType::Int).unwrap();
        assert_eq!(mp2.apply(Value::Int(2), Value::Int(5)), Value::Int(9));
    }
}
