//! Error types and backend status codes for sparla

use crate::dtype::DType;
use thiserror::Error;

/// Result type alias using sparla's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Status codes reported by a compute backend.
///
/// The numeric values are part of the backend call surface and are stable:
/// a backend written against a different host language must report the same
/// codes for the same conditions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Status {
    /// Operation completed
    Ok = 0,
    /// Unspecified backend failure
    Error = 1,
    /// No acceleration device is available
    NoAcceleration = 2,
    /// Requested compute platform does not exist
    PlatformNotFound = 3,
    /// Requested device does not exist on the platform
    DeviceNotFound = 4,
    /// A handle referenced released or foreign storage
    InvalidState = 5,
    /// Backend rejected an argument
    InvalidArgument = 6,
    /// Requested value is not present
    NoValue = 7,
    /// Backend has no kernel for the requested combination
    NotImplemented = 1024,
}

impl Status {
    /// True if the status signals success
    #[inline]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Convert a status into a `Result`, mapping failures onto the
    /// corresponding [`Error`] variant
    pub fn ok_or_err(self) -> Result<()> {
        match self {
            Self::Ok => Ok(()),
            other => Err(Error::from(other)),
        }
    }
}

/// Errors that can occur in sparla operations
///
/// Local precondition violations (`DimensionMismatch`, `DTypeMismatch`,
/// `IndexOutOfRange`, ...) are raised before any backend dispatch.
/// Backend-reported failures are surfaced verbatim, with no retry.
#[derive(Error, Debug)]
pub enum Error {
    /// Shape mismatch between operands of one operation
    #[error("Dimension mismatch: expected {expected:?}, got {got:?}")]
    DimensionMismatch {
        /// Expected shape
        expected: Vec<u32>,
        /// Actual shape
        got: Vec<u32>,
    },

    /// Element type mismatch between operands
    #[error("DType mismatch: {lhs:?} vs {rhs:?}")]
    DTypeMismatch {
        /// Left-hand side dtype
        lhs: DType,
        /// Right-hand side dtype
        rhs: DType,
    },

    /// Index outside declared container bounds
    #[error("Index {index} out of range for dimension of size {size}")]
    IndexOutOfRange {
        /// The invalid index
        index: u32,
        /// Size of the dimension
        size: u32,
    },

    /// Operator catalog lookup failed for a (kind, name, type) tuple
    #[error("Operator not supported: {key}")]
    OperatorNotSupported {
        /// Canonical lookup key, e.g. `OpBinary_BAND_FLOAT`
        key: String,
    },

    /// Type was never registered with the type registry
    #[error("Unknown type {dtype:?}: not registered")]
    UnknownType {
        /// The unregistered dtype
        dtype: DType,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// No acceleration device is available
    #[error("No acceleration available")]
    NoAcceleration,

    /// Requested compute platform was not found
    #[error("Platform not found")]
    PlatformNotFound,

    /// Requested compute device was not found
    #[error("Device not found")]
    DeviceNotFound,

    /// Backend has no kernel for the requested combination
    #[error("Not implemented: {feature}")]
    NotImplemented {
        /// Description of the missing kernel or feature
        feature: &'static str,
    },

    /// Backend-reported failure, surfaced unchanged
    #[error("Backend error: status {0:?}")]
    Backend(Status),
}

impl Error {
    /// Create a dimension mismatch error
    pub fn dimension_mismatch(expected: &[u32], got: &[u32]) -> Self {
        Self::DimensionMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create a dtype mismatch error
    pub fn dtype_mismatch(lhs: DType, rhs: DType) -> Self {
        Self::DTypeMismatch { lhs, rhs }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }
}

impl From<Status> for Error {
    fn from(status: Status) -> Self {
        match status {
            Status::NoAcceleration => Self::NoAcceleration,
            Status::PlatformNotFound => Self::PlatformNotFound,
            Status::DeviceNotFound => Self::DeviceNotFound,
            Status::NotImplemented => Self::NotImplemented {
                feature: "backend kernel",
            },
            other => Self::Backend(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_stable() {
        assert_eq!(Status::Ok as u32, 0);
        assert_eq!(Status::InvalidArgument as u32, 6);
        assert_eq!(Status::NotImplemented as u32, 1024);
    }

    #[test]
    fn test_status_to_result() {
        assert!(Status::Ok.ok_or_err().is_ok());
        assert!(matches!(
            Status::DeviceNotFound.ok_or_err(),
            Err(Error::DeviceNotFound)
        ));
        assert!(matches!(
            Status::InvalidState.ok_or_err(),
            Err(Error::Backend(Status::InvalidState))
        ));
    }
}
