//! Room: a named grouping of devices for display and bulk operations.
//!
//! A room never owns its devices. It stores their [`Uid`] keys and resolves
//! them through the [`DeviceRegistry`] on every access. When the registry
//! drops a device, the room keeps the key; such *stale* keys resolve to
//! nothing, are skipped by every bulk operation, and can be listed or
//! pruned explicitly.

use serde::Serialize;

use crate::device::{Device, LightDevice, SmartDevice};
use crate::error::{SmartHomeError, ValidationError};
use crate::id::Uid;
use crate::registry::{DeviceRegistry, Identified};

/// A room holding non-owning device keys.
#[derive(Debug, Clone, Serialize)]
pub struct Room {
    id: Uid,
    name: String,
    devices: Vec<Uid>,
}

impl Room {
    /// # Errors
    ///
    /// Returns [`SmartHomeError::Validation`] when `name` is empty.
    pub fn new(id: Uid, name: impl Into<String>) -> Result<Self, SmartHomeError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(Self {
            id,
            name,
            devices: Vec::new(),
        })
    }

    #[must_use]
    pub fn id(&self) -> Uid {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reference `device` from this room. Returns `false` if it already was.
    pub fn add_reference(&mut self, device: &Device) -> bool {
        self.add_reference_id(device.id())
    }

    /// Reference a device by key. Returns `false` for a duplicate.
    pub fn add_reference_id(&mut self, id: Uid) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.devices.push(id);
        true
    }

    /// Forget every reference to `id`. The device itself is untouched.
    pub fn remove_reference(&mut self, id: &Uid) -> bool {
        let before = self.devices.len();
        self.devices.retain(|existing| existing != id);
        self.devices.len() != before
    }

    #[must_use]
    pub fn contains(&self, id: &Uid) -> bool {
        self.devices.contains(id)
    }

    /// Number of references, stale ones included.
    #[must_use]
    pub fn count(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn references(&self) -> &[Uid] {
        &self.devices
    }

    /// Live devices referenced by this room, in reference order.
    pub fn devices<'a>(&'a self, registry: &'a DeviceRegistry) -> impl Iterator<Item = &'a Device> {
        self.devices.iter().filter_map(|id| registry.find_by_id(id))
    }

    /// Keys whose device the registry no longer holds.
    #[must_use]
    pub fn stale_references(&self, registry: &DeviceRegistry) -> Vec<Uid> {
        self.devices
            .iter()
            .filter(|id| !registry.contains(id))
            .copied()
            .collect()
    }

    /// Drop stale keys. Returns how many were removed.
    pub fn prune(&mut self, registry: &DeviceRegistry) -> usize {
        let before = self.devices.len();
        self.devices.retain(|id| registry.contains(id));
        let pruned = before - self.devices.len();
        if pruned > 0 {
            tracing::warn!(room = %self.id, pruned, "pruned stale device references");
        }
        pruned
    }

    /// Apply `op` to every light referenced by this room.
    ///
    /// Non-light devices and stale keys are skipped. Returns the number of
    /// lights visited.
    pub fn for_each_light<F>(&self, registry: &mut DeviceRegistry, mut op: F) -> usize
    where
        F: FnMut(&mut LightDevice),
    {
        let mut visited = 0;
        for id in &self.devices {
            if let Some(light) = registry.find_by_id_mut(id).and_then(Device::as_light_mut) {
                op(light);
                visited += 1;
            }
        }
        visited
    }

    /// Turn off every light in the room. Returns how many were turned off.
    pub fn turn_off_all_lights(&self, registry: &mut DeviceRegistry) -> usize {
        self.for_each_light(registry, SmartDevice::turn_off)
    }

    /// One line per reference: description and status, or a stale marker.
    #[must_use]
    pub fn summary(&self, registry: &DeviceRegistry) -> Vec<String> {
        self.devices
            .iter()
            .map(|id| match registry.find_by_id(id) {
                Some(device) => format!("{} [Status: {}]", device.describe(), device.status()),
                None => format!("<stale reference {id}>"),
            })
            .collect()
    }
}

impl Identified for Room {
    fn uid(&self) -> Uid {
        self.id
    }
}
