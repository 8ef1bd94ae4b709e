//! Light: dimmable, coloured lighting.
//!
//! Brightness and power are coupled: a brightness of 0 means the light is
//! off, any positive brightness means it is on. Turning the light off keeps
//! the last brightness so that turning it back on restores it.

use serde::Serialize;

use super::{DeviceCore, SmartDevice};
use crate::id::Uid;
use crate::location::Location;

/// Brightness set by [`turn_on`](SmartDevice::turn_on) when the light was fully dimmed.
pub const DEFAULT_BRIGHTNESS: u8 = 50;

/// Colour used when none is given at construction.
pub const DEFAULT_COLOR: &str = "White";

const MAX_BRIGHTNESS: u8 = 100;

/// A dimmable light.
#[derive(Debug, Serialize)]
pub struct LightDevice {
    #[serde(flatten)]
    core: DeviceCore,
    brightness: u8,
    color: String,
}

impl LightDevice {
    /// The light starts on iff `brightness` (after clamping) is positive.
    #[must_use]
    pub fn new(
        id: Uid,
        name: impl Into<String>,
        location: Location,
        brightness: i64,
        color: impl Into<String>,
    ) -> Self {
        let brightness = clamp_brightness(brightness);
        let mut core = DeviceCore::new(id, name, location);
        core.is_on = brightness > 0;
        Self {
            core,
            brightness,
            color: color.into(),
        }
    }

    #[must_use]
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Clamp `value` to `0..=100`; 0 powers the light off, anything else on.
    pub fn set_brightness(&mut self, value: i64) {
        self.brightness = clamp_brightness(value);
        self.core.set_on(self.brightness > 0);
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.color = color.into();
        self.core.touch();
    }
}

impl SmartDevice for LightDevice {
    fn core(&self) -> &DeviceCore {
        &self.core
    }

    fn turn_on(&mut self) {
        if self.brightness == 0 {
            self.brightness = DEFAULT_BRIGHTNESS;
        }
        self.core.set_on(true);
    }

    fn turn_off(&mut self) {
        self.core.set_on(false);
    }

    fn describe(&self) -> String {
        format!(
            "Device Info: Light - {} (ID: {}) at {}. Color: {}, Brightness: {}%",
            self.core.name(),
            self.core.id(),
            self.core.location(),
            self.color,
            self.brightness
        )
    }

    fn status(&self) -> String {
        let power = if self.core.is_on() { "ON" } else { "OFF" };
        format!(
            "{power}, Brightness: {}%, Color: {}",
            self.brightness, self.color
        )
    }
}

fn clamp_brightness(value: i64) -> u8 {
    u8::try_from(value.clamp(0, i64::from(MAX_BRIGHTNESS))).unwrap_or(MAX_BRIGHTNESS)
}
