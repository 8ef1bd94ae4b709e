//! Error types shared across the workspace.
//!
//! Each concern defines its own typed error and converts into
//! [`SmartHomeError`] via `#[from]`. A well-formed operation whose
//! precondition is unmet is **not** an error; see
//! [`Outcome`](crate::device::Outcome).

use crate::device::DeviceKind;
use crate::id::ParseUidError;

/// Top-level error for every fallible smarthome operation.
#[derive(Debug, thiserror::Error)]
pub enum SmartHomeError {
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("invalid operation")]
    InvalidOperation(#[from] OperationError),

    #[error("permission denied")]
    PermissionDenied(#[from] PermissionError),

    #[error("invalid identifier")]
    InvalidId(#[from] ParseUidError),
}

/// An id did not resolve to any device, room, or user.
#[derive(Debug, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A domain invariant was violated at construction time.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,
}

/// Operation text could not be parsed, or does not apply to the device.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    #[error("unknown operation {0:?}")]
    UnknownOperation(String),

    #[error("operation {0:?} requires an argument")]
    MissingArgument(&'static str),

    #[error("operation {0:?} takes no argument")]
    UnexpectedArgument(&'static str),

    #[error("invalid argument {value:?} for operation {operation:?}")]
    InvalidArgument {
        operation: &'static str,
        value: String,
    },

    #[error("operation {operation:?} is not supported by {kind} devices")]
    Unsupported {
        operation: &'static str,
        kind: DeviceKind,
    },

    #[error("unknown device kind {0:?}")]
    UnknownDeviceKind(String),
}

/// The acting user's access level does not allow the operation.
#[derive(Debug, thiserror::Error)]
#[error("user {user} ({level}) may not run {operation:?}")]
pub struct PermissionError {
    pub user: String,
    pub level: &'static str,
    pub operation: &'static str,
}
