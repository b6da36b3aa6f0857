//! Operator catalog: unary, binary and select operators
//!
//! Operators are named, pure, total functions bound to specific dtypes.
//! The catalog holds exactly one canonical `&'static` instance per
//! (kind, name, dtype) tuple, resolved either through the typed
//! `resolve_*` functions or through the string front door [`resolve_key`],
//! whose key format `{kind}_{NAME}_{TYPE}` (e.g. `OpBinary_PLUS_INT`)
//! matches the link-level naming convention of native backends.

mod binary;
mod select;
mod unary;

pub use binary::{resolve_binary, BinaryOp, BinaryOpName};
pub use select::{resolve_select, SelectOp, SelectOpName};
pub use unary::{resolve_unary, UnaryOp, UnaryOpName};

use crate::dtype::DType;
use crate::error::{Error, Result};

/// The three operator kinds of the contract
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// `T -> T` transform
    Unary,
    /// `T x T -> T` fold / product step
    Binary,
    /// `T -> BOOL` mask predicate
    Select,
}

impl OpKind {
    /// Key prefix for this kind
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unary => "OpUnary",
            Self::Binary => "OpBinary",
            Self::Select => "OpSelect",
        }
    }
}

/// A resolved operator of any kind
#[derive(Copy, Clone, Debug)]
pub enum OpRef {
    /// A unary operator
    Unary(&'static UnaryOp),
    /// A binary operator
    Binary(&'static BinaryOp),
    /// A select operator
    Select(&'static SelectOp),
}

impl OpRef {
    /// The operator kind
    pub const fn kind(self) -> OpKind {
        match self {
            Self::Unary(_) => OpKind::Unary,
            Self::Binary(_) => OpKind::Binary,
            Self::Select(_) => OpKind::Select,
        }
    }

    /// The operator's argument dtype
    pub const fn dtype(self) -> DType {
        match self {
            Self::Unary(op) => op.dtype,
            Self::Binary(op) => op.dtype,
            Self::Select(op) => op.dtype,
        }
    }

    /// Canonical lookup key
    pub fn key(self) -> String {
        match self {
            Self::Unary(op) => op.key(),
            Self::Binary(op) => op.key(),
            Self::Select(op) => op.key(),
        }
    }
}

/// Resolve an operator from its canonical string key.
///
/// # Errors
///
/// `OperatorNotSupported` for malformed keys and for combinations the
/// catalog does not provide.
pub fn resolve_key(key: &str) -> Result<OpRef> {
    let not_supported = || Error::OperatorNotSupported {
        key: key.to_string(),
    };

    let (kind, rest) = key.split_once('_').ok_or_else(not_supported)?;
    // Type name is the last segment; operator names may carry underscores
    // of their own (MINUS_POW2).
    let (name, type_name) = rest.rsplit_once('_').ok_or_else(not_supported)?;
    let dtype = DType::from_name(type_name).ok_or_else(not_supported)?;

    match kind {
        "OpUnary" => {
            let op_name = UnaryOpName::from_str_name(name).ok_or_else(not_supported)?;
            Ok(OpRef::Unary(resolve_unary(op_name, dtype)?))
        }
        "OpBinary" => {
            let op_name = BinaryOpName::from_str_name(name).ok_or_else(not_supported)?;
            Ok(OpRef::Binary(resolve_binary(op_name, dtype)?))
        }
        "OpSelect" => {
            let op_name = SelectOpName::from_str_name(name).ok_or_else(not_supported)?;
            Ok(OpRef::Select(resolve_select(op_name, dtype)?))
        }
        _ => Err(not_supported()),
    }
}
