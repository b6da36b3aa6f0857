//! Select operators: `T -> BOOL` predicates that gate mask entries

use crate::dtype::{DType, Value};
use crate::error::{Error, Result};
use std::fmt;

/// Names of the built-in select operators.
///
/// All predicates compare against the type's zero; `BOOL` treats `false`
/// as zero.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SelectOpName {
    /// `v == 0`
    EqZero,
    /// `v != 0`
    NqZero,
    /// `v > 0`
    GtZero,
    /// `v >= 0`
    GeZero,
    /// `v < 0`
    LtZero,
    /// `v <= 0`
    LeZero,
    /// Constant true
    Always,
    /// Constant false
    Never,
}

impl SelectOpName {
    /// Upper-case name used in canonical operator keys
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EqZero => "EQZERO",
            Self::NqZero => "NQZERO",
            Self::GtZero => "GTZERO",
            Self::GeZero => "GEZERO",
            Self::LtZero => "LTZERO",
            Self::LeZero => "LEZERO",
            Self::Always => "ALWAYS",
            Self::Never => "NEVER",
        }
    }

    /// Parse the upper-case name used in operator keys
    pub fn from_str_name(name: &str) -> Option<Self> {
        Some(match name {
            "EQZERO" => Self::EqZero,
            "NQZERO" => Self::NqZero,
            "GTZERO" => Self::GtZero,
            "GEZERO" => Self::GeZero,
            "LTZERO" => Self::LtZero,
            "LEZERO" => Self::LeZero,
            "ALWAYS" => Self::Always,
            "NEVER" => Self::Never,
            _ => return None,
        })
    }
}

/// A named, pure, total unary predicate bound to one dtype.
///
/// Select operators filter the entries of a mask container: an output
/// position is evaluated only if the predicate holds for the mask value
/// stored there. One canonical `&'static` instance per (name, dtype) pair.
pub struct SelectOp {
    /// Operator name
    pub name: SelectOpName,
    /// Argument dtype
    pub dtype: DType,
    f: fn(Value) -> bool,
}

impl SelectOp {
    /// Apply the predicate
    #[inline]
    pub fn test(&self, v: Value) -> bool {
        (self.f)(v)
    }

    /// Canonical lookup key, e.g. `OpSelect_EQZERO_INT`
    pub fn key(&self) -> String {
        format!("OpSelect_{}_{}", self.name.as_str(), self.dtype.name())
    }
}

impl fmt::Debug for SelectOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SelectOp({})", self.key())
    }
}

fn eq_zero(v: Value) -> bool {
    v.is_zero()
}

fn nq_zero(v: Value) -> bool {
    !v.is_zero()
}

fn gt_zero(v: Value) -> bool {
    match v {
        Value::Bool(x) => x,
        Value::Int(x) => x > 0,
        Value::Uint(x) => x > 0,
        Value::Float(x) => x > 0.0,
    }
}

fn ge_zero(v: Value) -> bool {
    match v {
        Value::Bool(_) => true,
        Value::Int(x) => x >= 0,
        Value::Uint(_) => true,
        Value::Float(x) => x >= 0.0,
    }
}

fn lt_zero(v: Value) -> bool {
    match v {
        Value::Bool(_) => false,
        Value::Int(x) => x < 0,
        Value::Uint(_) => false,
        Value::Float(x) => x < 0.0,
    }
}

fn le_zero(v: Value) -> bool {
    match v {
        Value::Bool(x) => !x,
        Value::Int(x) => x <= 0,
        Value::Uint(x) => x == 0,
        Value::Float(x) => x <= 0.0,
    }
}

fn always(_v: Value) -> bool {
    true
}

fn never(_v: Value) -> bool {
    false
}

macro_rules! sel_ops_for {
    ($dtype:ident) => {
        [
            SelectOp { name: SelectOpName::EqZero, dtype: DType::$dtype, f: eq_zero },
            SelectOp { name: SelectOpName::NqZero, dtype: DType::$dtype, f: nq_zero },
            SelectOp { name: SelectOpName::GtZero, dtype: DType::$dtype, f: gt_zero },
            SelectOp { name: SelectOpName::GeZero, dtype: DType::$dtype, f: ge_zero },
            SelectOp { name: SelectOpName::LtZero, dtype: DType::$dtype, f: lt_zero },
            SelectOp { name: SelectOpName::LeZero, dtype: DType::$dtype, f: le_zero },
            SelectOp { name: SelectOpName::Always, dtype: DType::$dtype, f: always },
            SelectOp { name: SelectOpName::Never, dtype: DType::$dtype, f: never },
        ]
    };
}

static CATALOG_BOOL: [SelectOp; 8] = sel_ops_for!(Bool);
static CATALOG_INT: [SelectOp; 8] = sel_ops_for!(Int);
static CATALOG_UINT: [SelectOp; 8] = sel_ops_for!(Uint);
static CATALOG_FLOAT: [SelectOp; 8] = sel_ops_for!(Float);

/// Resolve the canonical select operator for a (name, dtype) pair
pub fn resolve_select(name: SelectOpName, dtype: DType) -> Result<&'static SelectOp> {
    let catalog: &'static [SelectOp; 8] = match dtype {
        DType::Bool => &CATALOG_BOOL,
        DType::Int => &CATALOG_INT,
        DType::Uint => &CATALOG_UINT,
        DType::Float => &CATALOG_FLOAT,
    };
    catalog
        .iter()
        .find(|op| op.name == name)
        .ok_or_else(|| Error::OperatorNotSupported {
            key: format!("OpSelect_{}_{}", name.as_str(), dtype.name()),
        })
}
