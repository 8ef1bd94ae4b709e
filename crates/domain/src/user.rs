//! User: someone who runs operations against devices.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SmartHomeError, ValidationError};
use crate::id::Uid;
use crate::registry::Identified;

/// How much a user is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Guest,
    Resident,
    Admin,
    #[default]
    #[serde(other)]
    Unknown,
}

impl AccessLevel {
    /// Display name (`"ADMIN"`, …).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Guest => "GUEST",
            Self::Resident => "RESIDENT",
            Self::Admin => "ADMIN",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    id: Uid,
    name: String,
    access_level: AccessLevel,
}

impl User {
    /// # Errors
    ///
    /// Returns [`SmartHomeError::Validation`] when `name` is empty.
    pub fn new(
        id: Uid,
        name: impl Into<String>,
        access_level: AccessLevel,
    ) -> Result<Self, SmartHomeError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(Self {
            id,
            name,
            access_level,
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

    #[must_use]
    pub fn access_level(&self) -> AccessLevel {
        self.access_level
    }
}

impl Identified for User {
    fn uid(&self) -> Uid {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_every_level_to_display_name() {
        assert_eq!(AccessLevel::Guest.to_string(), "GUEST");
        assert_eq!(AccessLevel::Resident.to_string(), "RESIDENT");
        assert_eq!(AccessLevel::Admin.to_string(), "ADMIN");
        assert_eq!(AccessLevel::Unknown.to_string(), "UNKNOWN");
    }

    #[test]
    fn should_default_to_unknown() {
        assert_eq!(AccessLevel::default(), AccessLevel::Unknown);
    }

    #[test]
    fn should_fall_back_to_unknown_when_deserializing_unrecognised_level() {
        let level: AccessLevel = serde_json::from_str("\"superuser\"").unwrap();
        assert_eq!(level, AccessLevel::Unknown);
        let level: AccessLevel = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(level, AccessLevel::Admin);
    }

    #[test]
    fn should_build_user_with_level() {
        let user = User::new(Uid::from_parts('U', 8), "AliceAdmin", AccessLevel::Admin).unwrap();
        assert_eq!(user.id().to_string(), "U-008");
        assert_eq!(user.name(), "AliceAdmin");
        assert_eq!(user.access_level(), AccessLevel::Admin);
    }

    #[test]
    fn should_reject_empty_name() {
        let result = User::new(Uid::from_parts('U', 1), " ", AccessLevel::Guest);
        assert!(matches!(
            result,
            Err(SmartHomeError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_copy_identity_when_cloned() {
        let user = User::new(Uid::from_parts('U', 2), "Bob", AccessLevel::Resident).unwrap();
        let copy = user.clone();
        assert_eq!(copy, user);
    }
}
