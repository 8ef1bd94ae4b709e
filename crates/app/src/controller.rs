//! Smart home controller: the aggregate root.
//!
//! The controller owns every device (through a [`DeviceRegistry`]), every
//! room, and every user. Rooms reference devices by [`Uid`]; the controller
//! resolves ids on each call, so a device removed from the registry can no
//! longer be reached from anywhere.
//!
//! Construct one explicitly with [`SmartHomeController::new`] and pass it
//! around, or share the lazily-created process-wide instance returned by
//! [`SmartHomeController::instance`].

use std::sync::{Mutex, OnceLock, PoisonError};

use smarthome_domain::device::{Device, DeviceKind, DeviceParams, Outcome, SmartDevice};
use smarthome_domain::error::{NotFoundError, SmartHomeError, ValidationError};
use smarthome_domain::id::{ROOM_PREFIX, USER_PREFIX, Uid, UidGenerator};
use smarthome_domain::location::Location;
use smarthome_domain::operation::Operation;
use smarthome_domain::registry::{DeviceRegistry, Registry};
use smarthome_domain::room::Room;
use smarthome_domain::user::{AccessLevel, User};

use crate::access;
use crate::snapshot::HomeSnapshot;

static INSTANCE: OnceLock<Mutex<SmartHomeController>> = OnceLock::new();

/// Aggregate root composing devices, rooms, and users.
#[derive(Debug, Default)]
pub struct SmartHomeController {
    ids: UidGenerator,
    devices: DeviceRegistry,
    rooms: Registry<Room>,
    users: Registry<User>,
}

impl SmartHomeController {
    /// An empty controller whose first identifier is `*-001`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide controller, created on first call.
    ///
    /// Every call returns the same instance.
    pub fn instance() -> &'static Mutex<Self> {
        INSTANCE.get_or_init(|| {
            tracing::debug!("creating process-wide smart home controller");
            Mutex::new(Self::new())
        })
    }

    /// Lock the process-wide controller and run `f` against it.
    ///
    /// A poisoned lock is recovered: the controller holds no invariant that
    /// a panicking caller could leave half-updated across fields.
    pub fn with_instance<R>(f: impl FnOnce(&mut Self) -> R) -> R {
        let mut guard = Self::instance()
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// The generator every identifier of this controller is drawn from.
    #[must_use]
    pub fn ids(&self) -> &UidGenerator {
        &self.ids
    }

    // -- devices ------------------------------------------------------------

    /// Create a device from a runtime kind tag (`"light"`, `"ThermostatDevice"`, …).
    ///
    /// # Errors
    ///
    /// Returns [`SmartHomeError::InvalidOperation`] for an unknown kind and
    /// [`SmartHomeError::Validation`] for an empty name. No device is
    /// created and no identifier is consumed in either case.
    #[tracing::instrument(skip(self, location, params))]
    pub fn add_device(
        &mut self,
        name: &str,
        location: Location,
        kind: &str,
        params: DeviceParams,
    ) -> Result<Uid, SmartHomeError> {
        let kind: DeviceKind = kind.parse()?;
        self.add_typed_device(kind, name, location, params)
    }

    /// Create a device of a known kind.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHomeError::Validation`] for an empty name.
    #[tracing::instrument(skip(self, location, params), fields(kind = %kind))]
    pub fn add_typed_device(
        &mut self,
        kind: DeviceKind,
        name: &str,
        location: Location,
        params: DeviceParams,
    ) -> Result<Uid, SmartHomeError> {
        let device = Device::builder()
            .name(name)
            .location(location)
            .params(params)
            .build(kind, &self.ids)?;
        let id = device.id();
        self.devices.add(device);
        tracing::info!(device = %id, "device added");
        Ok(id)
    }

    #[must_use]
    pub fn devices(&self) -> &DeviceRegistry {
        &self.devices
    }

    #[must_use]
    pub fn find_device_by_id(&self, id: &Uid) -> Option<&Device> {
        self.devices.find_by_id(id)
    }

    #[must_use]
    pub fn find_device_by_id_mut(&mut self, id: &Uid) -> Option<&mut Device> {
        self.devices.find_by_id_mut(id)
    }

    /// Drop a device and forget every room reference to it.
    #[tracing::instrument(skip_all, fields(device = %id))]
    pub fn remove_device(&mut self, id: &Uid) -> bool {
        if !self.devices.remove_by_id(id) {
            return false;
        }
        for room in self.rooms.iter_mut() {
            room.remove_reference(id);
        }
        tracing::info!("device removed");
        true
    }

    // -- rooms --------------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`SmartHomeError::Validation`] for an empty name.
    #[tracing::instrument(skip(self))]
    pub fn add_room(&mut self, name: &str) -> Result<Uid, SmartHomeError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        let room = Room::new(self.ids.next(ROOM_PREFIX), name)?;
        let id = room.id();
        self.rooms.add(room);
        tracing::info!(room = %id, "room added");
        Ok(id)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    #[must_use]
    pub fn find_room_by_id(&self, id: &Uid) -> Option<&Room> {
        self.rooms.find_by_id(id)
    }

    #[must_use]
    pub fn find_room_by_id_mut(&mut self, id: &Uid) -> Option<&mut Room> {
        self.rooms.find_by_id_mut(id)
    }

    /// Reference a device from a room. The device stays owned by the
    /// controller. Returns `false` when the room already referenced it.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHomeError::NotFound`] when either id does not resolve.
    #[tracing::instrument(skip_all, fields(device = %device_id, room = %room_id))]
    pub fn assign_device_to_room(
        &mut self,
        device_id: &Uid,
        room_id: &Uid,
    ) -> Result<bool, SmartHomeError> {
        let device = self
            .devices
            .find_by_id(device_id)
            .ok_or_else(|| not_found("Device", device_id))?;
        let room = self
            .rooms
            .find_by_id_mut(room_id)
            .ok_or_else(|| not_found("Room", room_id))?;
        let added = room.add_reference(device);
        if added {
            tracing::info!("device assigned to room");
        } else {
            tracing::debug!("device already assigned to room");
        }
        Ok(added)
    }

    /// Drop a room's reference to a device. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHomeError::NotFound`] when the room does not resolve.
    #[tracing::instrument(skip_all, fields(device = %device_id, room = %room_id))]
    pub fn unassign_device_from_room(
        &mut self,
        device_id: &Uid,
        room_id: &Uid,
    ) -> Result<bool, SmartHomeError> {
        let room = self
            .rooms
            .find_by_id_mut(room_id)
            .ok_or_else(|| not_found("Room", room_id))?;
        Ok(room.remove_reference(device_id))
    }

    /// Turn off every light in a room. Returns how many were turned off.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHomeError::NotFound`] when the room does not resolve.
    #[tracing::instrument(skip_all, fields(room = %room_id))]
    pub fn turn_off_all_lights_in_room(&mut self, room_id: &Uid) -> Result<usize, SmartHomeError> {
        let room = self
            .rooms
            .find_by_id(room_id)
            .ok_or_else(|| not_found("Room", room_id))?;
        let stale = room.stale_references(&self.devices);
        if !stale.is_empty() {
            tracing::warn!(count = stale.len(), "room holds stale device references");
        }
        let count = room.turn_off_all_lights(&mut self.devices);
        tracing::info!(count, "lights turned off");
        Ok(count)
    }

    // -- users --------------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`SmartHomeError::Validation`] for an empty name.
    #[tracing::instrument(skip(self), fields(level = %level))]
    pub fn register_user(&mut self, name: &str, level: AccessLevel) -> Result<Uid, SmartHomeError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        let user = User::new(self.ids.next(USER_PREFIX), name, level)?;
        let id = user.id();
        self.users.add(user);
        tracing::info!(user = %id, "user registered");
        Ok(id)
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.iter()
    }

    #[must_use]
    pub fn find_user_by_id(&self, id: &Uid) -> Option<&User> {
        self.users.find_by_id(id)
    }

    // -- operations ---------------------------------------------------------

    /// Run `operation` (e.g. `"turn_on"`, `"set_brightness:80"`) against a
    /// device on behalf of a user.
    ///
    /// Ids are resolved, the text is parsed, and the access policy is checked
    /// before anything is mutated. A well-formed operation whose
    /// precondition is unmet returns [`Outcome::Ignored`].
    ///
    /// # Errors
    ///
    /// - [`SmartHomeError::NotFound`] when the user or device does not resolve
    /// - [`SmartHomeError::InvalidOperation`] for malformed text or an
    ///   operation the device variant does not support
    /// - [`SmartHomeError::PermissionDenied`] when the user's access level
    ///   forbids the operation
    #[tracing::instrument(skip(self), fields(user = %user_id, device = %device_id))]
    pub fn execute_device_operation(
        &mut self,
        user_id: &Uid,
        device_id: &Uid,
        operation: &str,
    ) -> Result<Outcome, SmartHomeError> {
        let user = self
            .users
            .find_by_id(user_id)
            .ok_or_else(|| not_found("User", user_id))?;
        let device = self
            .devices
            .find_by_id_mut(device_id)
            .ok_or_else(|| not_found("Device", device_id))?;

        let operation: Operation = operation.parse().inspect_err(|err| {
            tracing::warn!(%err, "rejected malformed operation");
        })?;
        access::authorize(user, device.kind(), &operation).inspect_err(|err| {
            tracing::warn!(%err, "operation denied");
        })?;

        let outcome = device.apply(&operation).inspect_err(|err| {
            tracing::warn!(%err, "operation not supported");
        })?;
        if outcome.is_applied() {
            tracing::info!(%operation, "operation applied");
        } else {
            tracing::debug!(%operation, "operation ignored");
        }
        Ok(outcome)
    }

    // -- reporting ----------------------------------------------------------

    /// One line per device: description and status.
    #[must_use]
    pub fn devices_summary(&self) -> Vec<String> {
        self.devices
            .iter()
            .map(|device| format!("{} [Status: {}]", device.describe(), device.status()))
            .collect()
    }

    /// A header line per room followed by one indented line per reference.
    #[must_use]
    pub fn rooms_summary(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for room in self.rooms.iter() {
            lines.push(format!(
                "Room '{}' (ID: {}): {} device(s)",
                room.name(),
                room.id(),
                room.count()
            ));
            lines.extend(
                room.summary(&self.devices)
                    .into_iter()
                    .map(|line| format!("  - {line}")),
            );
        }
        lines
    }

    #[must_use]
    pub fn snapshot(&self) -> HomeSnapshot<'_> {
        HomeSnapshot::capture(&self.devices, self.rooms.iter(), self.users.iter())
    }
}

fn not_found(entity: &'static str, id: &Uid) -> NotFoundError {
    NotFoundError {
        entity,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smarthome_domain::error::OperationError;

    fn light_params(brightness: i64) -> DeviceParams {
        DeviceParams {
            brightness: Some(brightness),
            ..DeviceParams::default()
        }
    }

    /// A home with one light, one thermostat, one alarm, one room, and an admin.
    struct Home {
        controller: SmartHomeController,
        light: Uid,
        thermostat: Uid,
        alarm: Uid,
        room: Uid,
        admin: Uid,
    }

    fn home() -> Home {
        let mut controller = SmartHomeController::new();
        let light = controller
            .add_device("Ceiling Light", Location::new("Living Room"), "light", light_params(0))
            .unwrap();
        let thermostat = controller
            .add_device(
                "Main Thermostat",
                Location::new("Living Room"),
                "ThermostatDevice",
                DeviceParams::default(),
            )
            .unwrap();
        let alarm = controller
            .add_device(
                "Smoke Detector",
                Location::new("Kitchen"),
                "security",
                DeviceParams::default(),
            )
            .unwrap();
        let room = controller.add_room("Living Room").unwrap();
        let admin = controller
            .register_user("AliceAdmin", AccessLevel::Admin)
            .unwrap();
        Home {
            controller,
            light,
            thermostat,
            alarm,
            room,
            admin,
        }
    }

    #[test]
    fn should_return_same_instance_on_every_call() {
        let first = SmartHomeController::instance();
        let second = SmartHomeController::instance();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn should_share_state_through_process_wide_instance() {
        let id = SmartHomeController::with_instance(|controller| controller.add_room("Shared"))
            .unwrap();
        let found = SmartHomeController::with_instance(|controller| {
            controller.find_room_by_id(&id).map(|room| room.name().to_string())
        });
        assert_eq!(found.as_deref(), Some("Shared"));
    }

    #[test]
    fn should_draw_ids_from_one_counter() {
        let h = home();
        assert_eq!(h.light.to_string(), "L-001");
        assert_eq!(h.thermostat.to_string(), "T-002");
        assert_eq!(h.alarm.to_string(), "S-003");
        assert_eq!(h.room.to_string(), "R-004");
        assert_eq!(h.admin.to_string(), "U-005");
    }

    #[test]
    fn should_fail_without_consuming_id_when_kind_unknown() {
        let mut controller = SmartHomeController::new();
        let result = controller.add_device(
            "Toaster",
            Location::new("Kitchen"),
            "toaster",
            DeviceParams::default(),
        );
        assert!(matches!(
            result,
            Err(SmartHomeError::InvalidOperation(
                OperationError::UnknownDeviceKind(_)
            ))
        ));
        assert!(controller.devices().is_empty());
        assert_eq!(controller.ids().current(), 0);
    }

    #[test]
    fn should_reject_empty_room_and_user_names() {
        let mut controller = SmartHomeController::new();
        assert!(matches!(
            controller.add_room(""),
            Err(SmartHomeError::Validation(ValidationError::EmptyName))
        ));
        assert!(matches!(
            controller.register_user("", AccessLevel::Guest),
            Err(SmartHomeError::Validation(ValidationError::EmptyName))
        ));
        assert_eq!(controller.ids().current(), 0);
    }

    #[test]
    fn should_find_devices_rooms_and_users() {
        let h = home();
        assert_eq!(
            h.controller.find_device_by_id(&h.light).unwrap().name(),
            "Ceiling Light"
        );
        assert_eq!(
            h.controller.find_room_by_id(&h.room).unwrap().name(),
            "Living Room"
        );
        assert_eq!(
            h.controller.find_user_by_id(&h.admin).unwrap().access_level(),
            AccessLevel::Admin
        );
        assert!(h.controller.find_device_by_id(&h.room).is_none());
    }

    #[test]
    fn should_assign_device_to_room() {
        let mut h = home();
        assert!(h.controller.assign_device_to_room(&h.light, &h.room).unwrap());
        assert!(!h.controller.assign_device_to_room(&h.light, &h.room).unwrap());

        let room = h.controller.find_room_by_id(&h.room).unwrap();
        assert_eq!(room.count(), 1);
        assert!(h.controller.find_device_by_id(&h.light).is_some());
    }

    #[test]
    fn should_fail_assignment_when_either_id_missing() {
        let mut h = home();
        let missing = Uid::from_parts('X', 99);
        assert!(matches!(
            h.controller.assign_device_to_room(&missing, &h.room),
            Err(SmartHomeError::NotFound(_))
        ));
        assert!(matches!(
            h.controller.assign_device_to_room(&h.light, &missing),
            Err(SmartHomeError::NotFound(_))
        ));
    }

    #[test]
    fn should_unassign_device_from_room() {
        let mut h = home();
        h.controller.assign_device_to_room(&h.light, &h.room).unwrap();
        assert!(h.controller.unassign_device_from_room(&h.light, &h.room).unwrap());
        assert!(!h.controller.unassign_device_from_room(&h.light, &h.room).unwrap());
        assert!(h.controller.find_device_by_id(&h.light).is_some());
    }

    #[test]
    fn should_prune_room_references_when_device_removed() {
        let mut h = home();
        h.controller.assign_device_to_room(&h.light, &h.room).unwrap();
        h.controller.assign_device_to_room(&h.thermostat, &h.room).unwrap();

        assert!(h.controller.remove_device(&h.light));
        assert!(h.controller.find_device_by_id(&h.light).is_none());
        let room = h.controller.find_room_by_id(&h.room).unwrap();
        assert_eq!(room.references(), [h.thermostat]);
        assert!(!h.controller.remove_device(&h.light));
    }

    #[test]
    fn should_turn_off_all_lights_in_room() {
        let mut h = home();
        h.controller.assign_device_to_room(&h.light, &h.room).unwrap();
        h.controller.assign_device_to_room(&h.thermostat, &h.room).unwrap();
        h.controller
            .execute_device_operation(&h.admin, &h.light, "turn_on")
            .unwrap();

        assert_eq!(h.controller.turn_off_all_lights_in_room(&h.room).unwrap(), 1);
        assert!(!h.controller.find_device_by_id(&h.light).unwrap().is_on());
        assert!(h.controller.find_device_by_id(&h.thermostat).unwrap().is_on());
    }

    #[test]
    fn should_turn_on_light_and_set_brightness() {
        let mut h = home();
        let outcome = h
            .controller
            .execute_device_operation(&h.admin, &h.light, "turn_on")
            .unwrap();
        assert_eq!(outcome, Outcome::Applied);
        let light = h.controller.find_device_by_id(&h.light).unwrap();
        assert_eq!(light.status(), "ON, Brightness: 50%, Color: White");

        h.controller
            .execute_device_operation(&h.admin, &h.light, "set_brightness:80")
            .unwrap();
        let light = h.controller.find_device_by_id(&h.light).unwrap();
        assert_eq!(light.as_light().unwrap().brightness(), 80);
    }

    #[test]
    fn should_report_ignored_when_arming_powered_off_alarm() {
        let mut h = home();
        h.controller
            .execute_device_operation(&h.admin, &h.alarm, "turn_off")
            .unwrap();
        let outcome = h
            .controller
            .execute_device_operation(&h.admin, &h.alarm, "arm")
            .unwrap();
        assert_eq!(outcome, Outcome::Ignored);
        let alarm = h.controller.find_device_by_id(&h.alarm).unwrap();
        assert!(!alarm.as_security().unwrap().is_armed());
    }

    #[test]
    fn should_fail_when_user_or_device_missing() {
        let mut h = home();
        let missing = Uid::from_parts('U', 404);
        assert!(matches!(
            h.controller.execute_device_operation(&missing, &h.light, "turn_on"),
            Err(SmartHomeError::NotFound(NotFoundError { entity: "User", .. }))
        ));
        assert!(matches!(
            h.controller.execute_device_operation(&h.admin, &missing, "turn_on"),
            Err(SmartHomeError::NotFound(NotFoundError {
                entity: "Device",
                ..
            }))
        ));
    }

    #[test]
    fn should_fail_without_mutation_when_operation_malformed() {
        let mut h = home();
        for text in ["dance", "set_brightness:lots", "set_brightness", "turn_on:now"] {
            let result = h.controller.execute_device_operation(&h.admin, &h.light, text);
            assert!(
                matches!(result, Err(SmartHomeError::InvalidOperation(_))),
                "{text:?}"
            );
        }
        assert!(!h.controller.find_device_by_id(&h.light).unwrap().is_on());
    }

    #[test]
    fn should_fail_when_operation_unsupported_by_variant() {
        let mut h = home();
        let result = h
            .controller
            .execute_device_operation(&h.admin, &h.thermostat, "arm");
        assert!(matches!(
            result,
            Err(SmartHomeError::InvalidOperation(OperationError::Unsupported {
                operation: "arm",
                kind: DeviceKind::Thermostat,
            }))
        ));
    }

    #[test]
    fn should_set_thermostat_target() {
        let mut h = home();
        h.controller
            .execute_device_operation(&h.admin, &h.thermostat, "set_target:19.5")
            .unwrap();
        let thermostat = h.controller.find_device_by_id(&h.thermostat).unwrap();
        assert!((thermostat.as_thermostat().unwrap().target() - 19.5).abs() < f64::EPSILON);
    }

    #[test]
    fn should_deny_guest_security_operations() {
        let mut h = home();
        let guest = h
            .controller
            .register_user("GuestGary", AccessLevel::Guest)
            .unwrap();

        let result = h.controller.execute_device_operation(&guest, &h.alarm, "arm");
        assert!(matches!(result, Err(SmartHomeError::PermissionDenied(_))));
        let alarm = h.controller.find_device_by_id(&h.alarm).unwrap();
        assert!(!alarm.as_security().unwrap().is_armed());

        let outcome = h
            .controller
            .execute_device_operation(&guest, &h.light, "turn_on")
            .unwrap();
        assert_eq!(outcome, Outcome::Applied);
    }

    #[test]
    fn should_deny_guest_disarming_through_power_operations() {
        let mut h = home();
        let guest = h
            .controller
            .register_user("GuestGary", AccessLevel::Guest)
            .unwrap();
        h.controller
            .execute_device_operation(&h.admin, &h.alarm, "arm")
            .unwrap();
        h.controller
            .execute_device_operation(&h.admin, &h.alarm, "trigger_alarm")
            .unwrap();

        for text in ["turn_off", "toggle"] {
            let result = h.controller.execute_device_operation(&guest, &h.alarm, text);
            assert!(
                matches!(result, Err(SmartHomeError::PermissionDenied(_))),
                "{text:?}"
            );
        }
        let alarm = h.controller.find_device_by_id(&h.alarm).unwrap();
        assert!(alarm.is_on());
        assert!(alarm.as_security().unwrap().is_armed());
        assert!(alarm.as_security().unwrap().is_alarm_triggered());

        let outcome = h
            .controller
            .execute_device_operation(&guest, &h.light, "toggle")
            .unwrap();
        assert_eq!(outcome, Outcome::Applied);
    }

    #[test]
    fn should_summarize_devices_and_rooms() {
        let mut h = home();
        h.controller.assign_device_to_room(&h.light, &h.room).unwrap();

        let devices = h.controller.devices_summary();
        assert_eq!(devices.len(), 3);
        assert!(devices[0].starts_with("Device Info: Light - Ceiling Light (ID: L-001)"));
        assert!(devices[0].ends_with("[Status: OFF, Brightness: 0%, Color: White]"));

        let rooms = h.controller.rooms_summary();
        assert_eq!(rooms[0], "Room 'Living Room' (ID: R-004): 1 device(s)");
        assert!(rooms[1].starts_with("  - Device Info: Light - Ceiling Light"));
    }
}
