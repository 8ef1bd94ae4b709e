//! Operation: the text command language accepted by the controller.
//!
//! Commands are a bare tag (`turn_on`) or a tag and one argument separated
//! by a colon (`set_brightness:80`). Parsing is total over the closed set
//! below; anything else is an [`OperationError`].
//!
//! | Command | Applies to |
//! |---------|------------|
//! | `turn_on`, `turn_off`, `toggle` | every device |
//! | `set_brightness:<integer>`, `set_color:<text>` | lights |
//! | `set_target:<float>` | thermostats |
//! | `arm`, `disarm`, `trigger_alarm`, `reset_alarm` | security devices |

use std::fmt;
use std::str::FromStr;

use crate::error::OperationError;

/// A parsed device command.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    TurnOn,
    TurnOff,
    Toggle,
    /// Brightness before clamping to `0..=100`.
    SetBrightness(i64),
    SetColor(String),
    /// Target temperature in Celsius.
    SetTarget(f64),
    Arm,
    Disarm,
    TriggerAlarm,
    ResetAlarm,
}

impl Operation {
    /// The command tag, without argument.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::TurnOn => "turn_on",
            Self::TurnOff => "turn_off",
            Self::Toggle => "toggle",
            Self::SetBrightness(_) => "set_brightness",
            Self::SetColor(_) => "set_color",
            Self::SetTarget(_) => "set_target",
            Self::Arm => "arm",
            Self::Disarm => "disarm",
            Self::TriggerAlarm => "trigger_alarm",
            Self::ResetAlarm => "reset_alarm",
        }
    }

    /// Whether the command changes the state of an alarm unit.
    #[must_use]
    pub fn is_security(&self) -> bool {
        matches!(
            self,
            Self::Arm | Self::Disarm | Self::TriggerAlarm | Self::ResetAlarm
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetBrightness(value) => write!(f, "{}:{value}", self.name()),
            Self::SetColor(color) => write!(f, "{}:{color}", self.name()),
            Self::SetTarget(celsius) => write!(f, "{}:{celsius}", self.name()),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for Operation {
    type Err = OperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (tag, argument) = match s.split_once(':') {
            Some((tag, argument)) => (tag.trim(), Some(argument.trim())),
            None => (s, None),
        };

        let operation = match tag {
            "turn_on" => no_argument(Self::TurnOn, argument)?,
            "turn_off" => no_argument(Self::TurnOff, argument)?,
            "toggle" => no_argument(Self::Toggle, argument)?,
            "arm" => no_argument(Self::Arm, argument)?,
            "disarm" => no_argument(Self::Disarm, argument)?,
            "trigger_alarm" => no_argument(Self::TriggerAlarm, argument)?,
            "reset_alarm" => no_argument(Self::ResetAlarm, argument)?,
            "set_brightness" => {
                let value = required("set_brightness", argument)?;
                Self::SetBrightness(value.parse().map_err(|_| invalid("set_brightness", value))?)
            }
            "set_color" => Self::SetColor(required("set_color", argument)?.to_string()),
            "set_target" => {
                let value = required("set_target", argument)?;
                let celsius: f64 = value.parse().map_err(|_| invalid("set_target", value))?;
                if !celsius.is_finite() {
                    return Err(invalid("set_target", value));
                }
                Self::SetTarget(celsius)
            }
            _ => return Err(OperationError::UnknownOperation(s.to_string())),
        };
        Ok(operation)
    }
}

fn no_argument(operation: Operation, argument: Option<&str>) -> Result<Operation, OperationError> {
    match argument {
        None => Ok(operation),
        Some(_) => Err(OperationError::UnexpectedArgument(operation.name())),
    }
}

fn required<'a>(
    operation: &'static str,
    argument: Option<&'a str>,
) -> Result<&'a str, OperationError> {
    argument
        .filter(|a| !a.is_empty())
        .ok_or(OperationError::MissingArgument(operation))
}

fn invalid(operation: &'static str, value: &str) -> OperationError {
    OperationError::InvalidArgument {
        operation,
        value: value.to_string(),
    }
}
