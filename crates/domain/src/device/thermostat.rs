//! Thermostat: stores a current reading and a target, both in Celsius.
//!
//! There is no regulation loop: the current temperature only changes when a
//! new reading is recorded.

use serde::Serialize;

use super::{DeviceCore, SmartDevice};
use crate::id::Uid;
use crate::location::Location;

pub const DEFAULT_TARGET_TEMPERATURE: f64 = 22.0;
pub const DEFAULT_CURRENT_TEMPERATURE: f64 = 20.0;

/// A climate-control device. Powered on (regulating) at construction.
#[derive(Debug, Serialize)]
pub struct ThermostatDevice {
    #[serde(flatten)]
    core: DeviceCore,
    current_celsius: f64,
    target_celsius: f64,
}

impl ThermostatDevice {
    #[must_use]
    pub fn new(
        id: Uid,
        name: impl Into<String>,
        location: Location,
        target_celsius: f64,
        current_celsius: f64,
    ) -> Self {
        let mut core = DeviceCore::new(id, name, location);
        core.is_on = true;
        Self {
            core,
            current_celsius,
            target_celsius,
        }
    }

    #[must_use]
    pub fn target(&self) -> f64 {
        self.target_celsius
    }

    #[must_use]
    pub fn current(&self) -> f64 {
        self.current_celsius
    }

    /// Store a new target. Not clamped.
    pub fn set_target(&mut self, celsius: f64) {
        self.target_celsius = celsius;
        self.core.touch();
    }

    /// Record a new temperature reading.
    pub fn record_reading(&mut self, celsius: f64) {
        self.current_celsius = celsius;
        self.core.touch();
    }
}

impl SmartDevice for ThermostatDevice {
    fn core(&self) -> &DeviceCore {
        &self.core
    }

    fn turn_on(&mut self) {
        self.core.set_on(true);
    }

    fn turn_off(&mut self) {
        self.core.set_on(false);
    }

    fn describe(&self) -> String {
        format!(
            "Device Info: Thermostat - {} (ID: {}) at {}. Current Temp: {:.1}C, Target Temp: {:.1}C",
            self.core.name(),
            self.core.id(),
            self.core.location(),
            self.current_celsius,
            self.target_celsius
        )
    }

    fn status(&self) -> String {
        let power = if self.core.is_on() { "ON" } else { "OFF" };
        format!(
            "{power}, Current: {:.1}C, Target: {:.1}C",
            self.current_celsius, self.target_celsius
        )
    }
}
