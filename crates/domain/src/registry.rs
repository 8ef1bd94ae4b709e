//! Registry: the collection that owns values outright.
//!
//! A [`Registry`] holds exclusive ownership of everything added to it.
//! Removing a value drops it immediately; dropping the registry drops every
//! value it still holds, each exactly once. Other collections (rooms, the
//! controller's lookups) hold only [`Uid`] keys and resolve them here on
//! every access, so a removed value can never be reached through a stale
//! handle.

use crate::device::{Device, SmartDevice};
use crate::id::Uid;

/// Anything that carries a [`Uid`].
pub trait Identified {
    fn uid(&self) -> Uid;
}

/// Owning, insertion-ordered collection of identified values.
#[derive(Debug)]
pub struct Registry<T> {
    items: Vec<T>,
}

/// The registry that owns every device.
pub type DeviceRegistry = Registry<Device>;

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Identified> Registry<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `item`.
    pub fn add(&mut self, item: T) {
        self.items.push(item);
    }

    /// Take ownership of `item` if present; `None` is a no-op.
    pub fn add_optional(&mut self, item: Option<T>) {
        if let Some(item) = item {
            self.add(item);
        }
    }

    /// First value with `id`, in insertion order.
    #[must_use]
    pub fn find_by_id(&self, id: &Uid) -> Option<&T> {
        self.items.iter().find(|item| item.uid() == *id)
    }

    #[must_use]
    pub fn find_by_id_mut(&mut self, id: &Uid) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.uid() == *id)
    }

    #[must_use]
    pub fn contains(&self, id: &Uid) -> bool {
        self.find_by_id(id).is_some()
    }

    /// Detach the first value with `id` and hand ownership to the caller.
    pub fn take_by_id(&mut self, id: &Uid) -> Option<T> {
        let index = self.items.iter().position(|item| item.uid() == *id)?;
        Some(self.items.remove(index))
    }

    /// Detach and drop the first value with `id`. Returns whether one was found.
    pub fn remove_by_id(&mut self, id: &Uid) -> bool {
        self.take_by_id(id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut()
    }
}

impl Registry<Device> {
    /// One [`describe`](SmartDevice::describe) line per device, in insertion order.
    #[must_use]
    pub fn summary(&self) -> Vec<String> {
        self.items.iter().map(SmartDevice::describe).collect()
    }
}
