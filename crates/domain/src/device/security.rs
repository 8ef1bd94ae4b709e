//! Security: an alarm unit that can be armed and triggered.
//!
//! Arming requires power; triggering requires power and an armed unit.
//! Unmet preconditions are reported as [`Outcome::Ignored`], never as
//! errors. Powering off disarms the unit and clears any alarm.

use serde::Serialize;

use super::{DeviceCore, Outcome, SmartDevice};
use crate::id::Uid;
use crate::location::Location;

/// An alarm unit. Powered on (standby), disarmed, and quiet at construction.
#[derive(Debug, Serialize)]
pub struct SecurityDevice {
    #[serde(flatten)]
    core: DeviceCore,
    is_armed: bool,
    alarm_triggered: bool,
}

impl SecurityDevice {
    #[must_use]
    pub fn new(id: Uid, name: impl Into<String>, location: Location) -> Self {
        let mut core = DeviceCore::new(id, name, location);
        core.is_on = true;
        Self {
            core,
            is_armed: false,
            alarm_triggered: false,
        }
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.is_armed
    }

    #[must_use]
    pub fn is_alarm_triggered(&self) -> bool {
        self.alarm_triggered
    }

    /// Arm the unit if it is powered on.
    pub fn arm(&mut self) -> Outcome {
        if !self.core.is_on() {
            tracing::debug!(device = %self.core.id(), "cannot arm, device is powered off");
            return Outcome::Ignored;
        }
        self.is_armed = true;
        self.core.touch();
        Outcome::Applied
    }

    pub fn disarm(&mut self) -> Outcome {
        self.is_armed = false;
        self.core.touch();
        Outcome::Applied
    }

    /// Raise the alarm if the unit is powered on and armed.
    pub fn trigger_alarm(&mut self) -> Outcome {
        if !(self.core.is_on() && self.is_armed) {
            tracing::debug!(
                device = %self.core.id(),
                is_on = self.core.is_on(),
                is_armed = self.is_armed,
                "cannot trigger alarm"
            );
            return Outcome::Ignored;
        }
        self.alarm_triggered = true;
        self.core.touch();
        Outcome::Applied
    }

    pub fn reset_alarm(&mut self) -> Outcome {
        self.alarm_triggered = false;
        self.core.touch();
        Outcome::Applied
    }
}

impl SmartDevice for SecurityDevice {
    fn core(&self) -> &DeviceCore {
        &self.core
    }

    fn turn_on(&mut self) {
        self.core.set_on(true);
    }

    fn turn_off(&mut self) {
        self.is_armed = false;
        self.alarm_triggered = false;
        self.core.set_on(false);
    }

    fn describe(&self) -> String {
        format!(
            "Device Info: Security - {} (ID: {}) at {}. Armed: {}, Alarm Triggered: {}",
            self.core.name(),
            self.core.id(),
            self.core.location(),
            yes_no(self.is_armed),
            yes_no(self.alarm_triggered)
        )
    }

    fn status(&self) -> String {
        if !self.core.is_on() {
            return "OFF".to_string();
        }
        format!(
            "ON (Standby), Armed: {}, Alarm Triggered: {}",
            yes_no(self.is_armed),
            yes_no(self.alarm_triggered)
        )
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> SecurityDevice {
        SecurityDevice::new(
            Uid::from_parts('S', 3),
            "Kitchen Smoke Detector",
            Location::new("Kitchen"),
        )
    }

    #[test]
    fn should_start_on_disarmed_and_quiet() {
        let device = detector();
        assert!(device.is_on());
        assert!(!device.is_armed());
        assert!(!device.is_alarm_triggered());
    }

    #[test]
    fn should_arm_trigger_reset_and_disarm_in_sequence() {
        let mut device = detector();
        assert_eq!(device.arm(), Outcome::Applied);
        assert!(device.is_armed());

        assert_eq!(device.trigger_alarm(), Outcome::Applied);
        assert!(device.is_alarm_triggered());

        device.reset_alarm();
        device.disarm();
        assert!(!device.is_armed());
        assert!(!device.is_alarm_triggered());
        assert!(device.is_on());
    }

    #[test]
    fn should_ignore_arm_when_powered_off() {
        let mut device = detector();
        device.turn_off();
        assert_eq!(device.arm(), Outcome::Ignored);
        assert!(!device.is_armed());
    }

    #[test]
    fn should_ignore_trigger_when_disarmed() {
        let mut device = detector();
        assert_eq!(device.trigger_alarm(), Outcome::Ignored);
        assert!(!device.is_alarm_triggered());
    }

    #[test]
    fn should_disarm_and_clear_alarm_when_powered_off() {
        let mut device = detector();
        device.arm();
        device.trigger_alarm();

        device.turn_off();
        assert!(!device.is_on());
        assert!(!device.is_armed());
        assert!(!device.is_alarm_triggered());
    }

    #[test]
    fn should_stay_disarmed_when_powered_back_on() {
        let mut device = detector();
        device.arm();
        device.turn_off();
        device.turn_on();
        assert!(device.is_on());
        assert!(!device.is_armed());
    }

    #[test]
    fn should_always_allow_disarm_and_reset() {
        let mut device = detector();
        device.turn_off();
        assert_eq!(device.disarm(), Outcome::Applied);
        assert_eq!(device.reset_alarm(), Outcome::Applied);
    }

    #[test]
    fn should_describe_armed_and_alarm_flags() {
        let mut device = detector();
        device.arm();
        assert_eq!(
            device.describe(),
            "Device Info: Security - Kitchen Smoke Detector (ID: S-003) at Kitchen. \
             Armed: Yes, Alarm Triggered: No"
        );
    }

    #[test]
    fn should_report_off_only_when_powered_off() {
        let mut device = detector();
        assert_eq!(
            device.status(),
            "ON (Standby), Armed: No, Alarm Triggered: No"
        );
        device.turn_off();
        assert_eq!(device.status(), "OFF");
    }
}
