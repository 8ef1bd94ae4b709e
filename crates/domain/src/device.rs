//! Device: a controllable smart-home appliance.
//!
//! Every device shares a [`DeviceCore`] (identity, name, location, power
//! state) and adds variant-specific state. The variants form a closed set,
//! [`Device`], so bulk operations match on the variant (or use the
//! `as_*` capability queries) instead of downcasting.
//!
//! | Variant | Prefix | Powered at construction |
//! |---------|--------|-------------------------|
//! | [`LightDevice`] | `L` | only when brightness > 0 |
//! | [`ThermostatDevice`] | `T` | yes |
//! | [`SecurityDevice`] | `S` | yes (standby) |

mod light;
mod security;
mod thermostat;

pub use light::{DEFAULT_BRIGHTNESS, DEFAULT_COLOR, LightDevice};
pub use security::SecurityDevice;
pub use thermostat::{DEFAULT_CURRENT_TEMPERATURE, DEFAULT_TARGET_TEMPERATURE, ThermostatDevice};

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{OperationError, SmartHomeError, ValidationError};
use crate::id::{LIGHT_PREFIX, SECURITY_PREFIX, THERMOSTAT_PREFIX, Uid, UidGenerator};
use crate::location::Location;
use crate::operation::Operation;
use crate::registry::Identified;

/// UTC timestamp used for `last_changed`.
pub type Timestamp = DateTime<Utc>;

/// Result of a well-formed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The state change took place.
    Applied,
    /// A precondition was unmet (e.g. arming a powered-off alarm); nothing changed.
    Ignored,
}

impl Outcome {
    #[must_use]
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// The closed set of device variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Light,
    Thermostat,
    Security,
}

impl DeviceKind {
    /// Identifier prefix baked into devices of this kind.
    #[must_use]
    pub fn prefix(self) -> char {
        match self {
            Self::Light => LIGHT_PREFIX,
            Self::Thermostat => THERMOSTAT_PREFIX,
            Self::Security => SECURITY_PREFIX,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Thermostat => "thermostat",
            Self::Security => "security",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceKind {
    type Err = OperationError;

    /// Accepts the lower-case kind names, their aliases, and the
    /// `LightDevice`-style type names, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" | "lighting" | "lightdevice" => Ok(Self::Light),
            "thermostat" | "climate" | "thermostatdevice" => Ok(Self::Thermostat),
            "security" | "securitydevice" => Ok(Self::Security),
            _ => Err(OperationError::UnknownDeviceKind(s.to_string())),
        }
    }
}

/// State common to every device variant.
#[derive(Debug, Serialize)]
pub struct DeviceCore {
    id: Uid,
    name: String,
    location: Location,
    is_on: bool,
    last_changed: Timestamp,
}

impl DeviceCore {
    /// A powered-off core.
    #[must_use]
    pub fn new(id: Uid, name: impl Into<String>, location: Location) -> Self {
        Self {
            id,
            name: name.into(),
            location,
            is_on: false,
            last_changed: Utc::now(),
        }
    }

    #[must_use]
    pub fn id(&self) -> Uid {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    #[must_use]
    pub fn last_changed(&self) -> Timestamp {
        self.last_changed
    }

    pub(crate) fn set_on(&mut self, on: bool) {
        self.is_on = on;
        self.touch();
    }

    pub(crate) fn touch(&mut self) {
        self.last_changed = Utc::now();
    }
}

/// Capabilities shared by every device variant.
pub trait SmartDevice {
    fn core(&self) -> &DeviceCore;

    fn turn_on(&mut self);

    fn turn_off(&mut self);

    /// Stable one-line description: identity, location, variant settings.
    fn describe(&self) -> String;

    /// Current power and variant state.
    fn status(&self) -> String;

    fn id(&self) -> Uid {
        self.core().id()
    }

    fn name(&self) -> &str {
        self.core().name()
    }

    fn location(&self) -> &Location {
        self.core().location()
    }

    fn is_on(&self) -> bool {
        self.core().is_on()
    }

    fn last_changed(&self) -> Timestamp {
        self.core().last_changed()
    }
}

/// Optional construction parameters, interpreted per variant.
///
/// Fields that do not apply to the chosen variant are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeviceParams {
    /// Initial light brightness (clamped to `0..=100`).
    pub brightness: Option<i64>,
    /// Initial light colour.
    pub color: Option<String>,
    /// Initial thermostat target, in Celsius.
    pub target_temperature: Option<f64>,
    /// Initial thermostat reading, in Celsius.
    pub current_temperature: Option<f64>,
}

/// A device of any variant.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Device {
    Light(LightDevice),
    Thermostat(ThermostatDevice),
    Security(SecurityDevice),
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        match self {
            Self::Light(_) => DeviceKind::Light,
            Self::Thermostat(_) => DeviceKind::Thermostat,
            Self::Security(_) => DeviceKind::Security,
        }
    }

    #[must_use]
    pub fn as_light(&self) -> Option<&LightDevice> {
        match self {
            Self::Light(light) => Some(light),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_light_mut(&mut self) -> Option<&mut LightDevice> {
        match self {
            Self::Light(light) => Some(light),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_thermostat(&self) -> Option<&ThermostatDevice> {
        match self {
            Self::Thermostat(thermostat) => Some(thermostat),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_thermostat_mut(&mut self) -> Option<&mut ThermostatDevice> {
        match self {
            Self::Thermostat(thermostat) => Some(thermostat),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_security(&self) -> Option<&SecurityDevice> {
        match self {
            Self::Security(security) => Some(security),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_security_mut(&mut self) -> Option<&mut SecurityDevice> {
        match self {
            Self::Security(security) => Some(security),
            _ => None,
        }
    }

    /// Run `operation` against this device.
    ///
    /// The variant check happens before any mutation, so an unsupported
    /// operation leaves the device untouched.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::Unsupported`] when the operation does not
    /// apply to this variant.
    pub fn apply(&mut self, operation: &Operation) -> Result<Outcome, OperationError> {
        let kind = self.kind();
        let outcome = match (self, operation) {
            (device, Operation::TurnOn) => {
                device.turn_on();
                Outcome::Applied
            }
            (device, Operation::TurnOff) => {
                device.turn_off();
                Outcome::Applied
            }
            (device, Operation::Toggle) => {
                if device.is_on() {
                    device.turn_off();
                } else {
                    device.turn_on();
                }
                Outcome::Applied
            }
            (Self::Light(light), Operation::SetBrightness(value)) => {
                light.set_brightness(*value);
                Outcome::Applied
            }
            (Self::Light(light), Operation::SetColor(color)) => {
                light.set_color(color.clone());
                Outcome::Applied
            }
            (Self::Thermostat(thermostat), Operation::SetTarget(celsius)) => {
                thermostat.set_target(*celsius);
                Outcome::Applied
            }
            (Self::Security(security), Operation::Arm) => security.arm(),
            (Self::Security(security), Operation::Disarm) => security.disarm(),
            (Self::Security(security), Operation::TriggerAlarm) => security.trigger_alarm(),
            (Self::Security(security), Operation::ResetAlarm) => security.reset_alarm(),
            (_, operation) => {
                return Err(OperationError::Unsupported {
                    operation: operation.name(),
                    kind,
                });
            }
        };
        Ok(outcome)
    }

    fn inner(&self) -> &dyn SmartDevice {
        match self {
            Self::Light(light) => light,
            Self::Thermostat(thermostat) => thermostat,
            Self::Security(security) => security,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn SmartDevice {
        match self {
            Self::Light(light) => light,
            Self::Thermostat(thermostat) => thermostat,
            Self::Security(security) => security,
        }
    }
}

impl SmartDevice for Device {
    fn core(&self) -> &DeviceCore {
        self.inner().core()
    }

    fn turn_on(&mut self) {
        self.inner_mut().turn_on();
    }

    fn turn_off(&mut self) {
        self.inner_mut().turn_off();
    }

    fn describe(&self) -> String {
        self.inner().describe()
    }

    fn status(&self) -> String {
        self.inner().status()
    }
}

impl Identified for Device {
    fn uid(&self) -> Uid {
        self.id()
    }
}

impl From<LightDevice> for Device {
    fn from(value: LightDevice) -> Self {
        Self::Light(value)
    }
}

impl From<ThermostatDevice> for Device {
    fn from(value: ThermostatDevice) -> Self {
        Self::Thermostat(value)
    }
}

impl From<SecurityDevice> for Device {
    fn from(value: SecurityDevice) -> Self {
        Self::Security(value)
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    name: Option<String>,
    location: Option<Location>,
    params: DeviceParams,
}

impl DeviceBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub fn params(mut self, params: DeviceParams) -> Self {
        self.params = params;
        self
    }

    /// Validate, draw an identifier for `kind` from `ids`, and build the device.
    ///
    /// No identifier is consumed when validation fails.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHomeError::Validation`] if `name` is missing or empty.
    pub fn build(self, kind: DeviceKind, ids: &UidGenerator) -> Result<Device, SmartHomeError> {
        let name = self.name.unwrap_or_default();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        let location = self.location.unwrap_or_else(|| Location::new(""));
        let params = self.params;
        let id = ids.next(kind.prefix());

        let device = match kind {
            DeviceKind::Light => LightDevice::new(
                id,
                name,
                location,
                params.brightness.unwrap_or(0),
                params.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            )
            .into(),
            DeviceKind::Thermostat => ThermostatDevice::new(
                id,
                name,
                location,
                params
                    .target_temperature
                    .unwrap_or(DEFAULT_TARGET_TEMPERATURE),
                params
                    .current_temperature
                    .unwrap_or(DEFAULT_CURRENT_TEMPERATURE),
            )
            .into(),
            DeviceKind::Security => SecurityDevice::new(id, name, location).into(),
        };
        Ok(device)
    }
}
