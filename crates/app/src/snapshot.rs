//! Serializable view of the whole home, borrowed from the controller.

use serde::Serialize;
use smarthome_domain::device::{Device, SmartDevice};
use smarthome_domain::id::Uid;
use smarthome_domain::registry::DeviceRegistry;
use smarthome_domain::room::Room;
use smarthome_domain::user::User;

#[derive(Debug, Serialize)]
pub struct HomeSnapshot<'a> {
    pub devices: Vec<DeviceSnapshot<'a>>,
    pub rooms: Vec<RoomSnapshot<'a>>,
    pub users: Vec<&'a User>,
}

#[derive(Debug, Serialize)]
pub struct DeviceSnapshot<'a> {
    pub device: &'a Device,
    pub status: String,
    /// Rooms that reference this device.
    pub rooms: Vec<Uid>,
}

#[derive(Debug, Serialize)]
pub struct RoomSnapshot<'a> {
    pub id: Uid,
    pub name: &'a str,
    pub devices: &'a [Uid],
    /// References whose device is no longer registered.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stale: Vec<Uid>,
}

impl<'a> HomeSnapshot<'a> {
    pub fn capture(
        devices: &'a DeviceRegistry,
        rooms: impl Iterator<Item = &'a Room>,
        users: impl Iterator<Item = &'a User>,
    ) -> Self {
        let rooms: Vec<&Room> = rooms.collect();
        Self {
            devices: devices
                .iter()
                .map(|device| DeviceSnapshot {
                    device,
                    status: device.status(),
                    rooms: rooms
                        .iter()
                        .filter(|room| room.contains(&device.id()))
                        .map(|room| room.id())
                        .collect(),
                })
                .collect(),
            rooms: rooms
                .iter()
                .map(|room| RoomSnapshot {
                    id: room.id(),
                    name: room.name(),
                    devices: room.references(),
                    stale: room.stale_references(devices),
                })
                .collect(),
            users: users.collect(),
        }
    }
}
