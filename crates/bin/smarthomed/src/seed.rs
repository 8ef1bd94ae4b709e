//! Build the configured home inside a controller.
//!
//! Devices are created first, then rooms, then users, each in file order,
//! so identifiers follow the declaration order of the file. Assignments and
//! operations refer to entries by name; an operation that fails is recorded
//! in the report instead of aborting the run.

use std::collections::HashMap;

use serde::Serialize;
use smarthome_app::SmartHomeController;
use smarthome_domain::device::Outcome;
use smarthome_domain::error::{NotFoundError, SmartHomeError};
use smarthome_domain::id::Uid;

use crate::config::Config;

/// Identifiers issued for each configured name, and operation results.
#[derive(Debug, Default)]
pub struct Seeded {
    pub devices: HashMap<String, Uid>,
    pub rooms: HashMap<String, Uid>,
    pub users: HashMap<String, Uid>,
    pub operations: Vec<OperationRecord>,
}

#[derive(Debug, Serialize)]
pub struct OperationRecord {
    pub user: Uid,
    pub device: Uid,
    pub op: String,
    #[serde(flatten)]
    pub result: OperationResult,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationResult {
    Outcome(Outcome),
    Error(String),
}

/// Create everything `config` declares in `controller`.
///
/// # Errors
///
/// Returns an error when a device, room, or user cannot be created (unknown
/// device kind, empty name) or when a name does not resolve.
#[tracing::instrument(skip_all)]
pub fn apply(controller: &mut SmartHomeController, config: &Config) -> Result<Seeded, SmartHomeError> {
    let mut seeded = Seeded::default();

    for device in &config.devices {
        let id = controller.add_device(
            &device.name,
            device.location(),
            &device.kind,
            device.params(),
        )?;
        seeded.devices.insert(device.name.clone(), id);
    }
    for room in &config.rooms {
        let id = controller.add_room(&room.name)?;
        seeded.rooms.insert(room.name.clone(), id);
    }
    for user in &config.users {
        let id = controller.register_user(&user.name, user.level)?;
        seeded.users.insert(user.name.clone(), id);
    }

    for assignment in &config.assignments {
        let device = lookup(&seeded.devices, "Device", &assignment.device)?;
        let room = lookup(&seeded.rooms, "Room", &assignment.room)?;
        controller.assign_device_to_room(&device, &room)?;
    }

    for operation in &config.operations {
        let user = lookup(&seeded.users, "User", &operation.user)?;
        let device = lookup(&seeded.devices, "Device", &operation.device)?;
        let result = match controller.execute_device_operation(&user, &device, &operation.op) {
            Ok(outcome) => OperationResult::Outcome(outcome),
            Err(err) => OperationResult::Error(error_message(&err)),
        };
        seeded.operations.push(OperationRecord {
            user,
            device,
            op: operation.op.clone(),
            result,
        });
    }

    tracing::info!(
        devices = seeded.devices.len(),
        rooms = seeded.rooms.len(),
        users = seeded.users.len(),
        operations = seeded.operations.len(),
        "home seeded"
    );
    Ok(seeded)
}

fn lookup(ids: &HashMap<String, Uid>, entity: &'static str, name: &str) -> Result<Uid, NotFoundError> {
    ids.get(name).copied().ok_or_else(|| NotFoundError {
        entity,
        id: name.to_string(),
    })
}

/// The top-level message followed by its source, e.g.
/// `"permission denied: user U-002 (GUEST) may not run \"arm\""`.
fn error_message(err: &SmartHomeError) -> String {
    match std::error::Error::source(err) {
        Some(source) => format!("{err}: {source}"),
        None => err.to_string(),
    }
}
