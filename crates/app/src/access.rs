//! Access policy: which access levels may run which operations.
//!
//! | Level | Allowed |
//! |-------|---------|
//! | `Admin`, `Resident` | every operation |
//! | `Guest` | everything except security operations |
//! | `Unknown` | nothing |
//!
//! Powering a security device off disarms it and clears its alarm, so
//! `turn_off` and `toggle` count as security operations on those devices.

use smarthome_domain::device::DeviceKind;
use smarthome_domain::error::PermissionError;
use smarthome_domain::operation::Operation;
use smarthome_domain::user::{AccessLevel, User};

/// Whether `operation` changes the state of an alarm unit of kind `kind`.
#[must_use]
pub fn is_security_sensitive(kind: DeviceKind, operation: &Operation) -> bool {
    operation.is_security()
        || (kind == DeviceKind::Security
            && matches!(operation, Operation::TurnOff | Operation::Toggle))
}

/// Whether `level` may run `operation` against a device of kind `kind`.
#[must_use]
pub fn permits(level: AccessLevel, kind: DeviceKind, operation: &Operation) -> bool {
    match level {
        AccessLevel::Admin | AccessLevel::Resident => true,
        AccessLevel::Guest => !is_security_sensitive(kind, operation),
        AccessLevel::Unknown => false,
    }
}

/// Check that `user` may run `operation` against a device of kind `kind`.
///
/// # Errors
///
/// Returns [`PermissionError`] naming the user, their level, and the
/// operation when the policy denies it.
pub fn authorize(
    user: &User,
    kind: DeviceKind,
    operation: &Operation,
) -> Result<(), PermissionError> {
    if permits(user.access_level(), kind, operation) {
        return Ok(());
    }
    Err(PermissionError {
        user: user.id().to_string(),
        level: user.access_level().as_str(),
        operation: operation.name(),
    })
}
