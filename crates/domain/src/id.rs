//! Human-readable identifiers: a category letter plus a sequence number.
//!
//! Identifiers render as `"<letter>-<sequence>"` with the sequence
//! zero-padded to three digits (`L-001`, `R-012`). Sequence numbers come
//! from a [`UidGenerator`] whose counter is shared by every prefix, so two
//! identifiers drawn from the same generator never share a sequence number
//! unless the generator is [`reset`](UidGenerator::reset) in between.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

/// Identifier prefix for light devices.
pub const LIGHT_PREFIX: char = 'L';
/// Identifier prefix for thermostat devices.
pub const THERMOSTAT_PREFIX: char = 'T';
/// Identifier prefix for security devices.
pub const SECURITY_PREFIX: char = 'S';
/// Identifier prefix for rooms.
pub const ROOM_PREFIX: char = 'R';
/// Identifier prefix for users.
pub const USER_PREFIX: char = 'U';

static GLOBAL: UidGenerator = UidGenerator::new();

/// An immutable `{prefix, sequence}` identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Uid {
    prefix: char,
    sequence: u32,
}

impl Uid {
    /// Build an identifier from its parts without touching any counter.
    #[must_use]
    pub const fn from_parts(prefix: char, sequence: u32) -> Self {
        Self { prefix, sequence }
    }

    /// Draw the next identifier from the process-wide generator.
    #[must_use]
    pub fn next(prefix: char) -> Self {
        GLOBAL.next(prefix)
    }

    /// Reset the process-wide generator; the next id uses `start + 1`.
    ///
    /// Identifiers issued before the reset may collide with those issued
    /// after it. Meant for reproducible tests and demos only.
    pub fn reset_counter(start: u32) {
        GLOBAL.reset(start);
    }

    #[must_use]
    pub fn prefix(self) -> char {
        self.prefix
    }

    #[must_use]
    pub fn sequence(self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:03}", self.prefix, self.sequence)
    }
}

/// Text that is not of the canonical form `<letter>-<digits>`, with the
/// digits zero-padded to exactly three when the sequence is below 1000.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0:?} is not a valid identifier (expected e.g. \"L-001\")")]
pub struct ParseUidError(String);

impl FromStr for Uid {
    type Err = ParseUidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseUidError(s.to_string());

        let mut chars = s.chars();
        let prefix = chars.next().ok_or_else(invalid)?;
        if !prefix.is_alphabetic() || chars.next() != Some('-') {
            return Err(invalid());
        }
        let digits = chars.as_str();
        if digits.len() < 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        // zero padding only up to three digits
        if digits.len() > 3 && digits.starts_with('0') {
            return Err(invalid());
        }
        let sequence = digits.parse().map_err(|_| invalid())?;
        Ok(Self { prefix, sequence })
    }
}

impl TryFrom<String> for Uid {
    type Error = ParseUidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Uid> for String {
    fn from(value: Uid) -> Self {
        value.to_string()
    }
}

/// Monotonic sequence source shared by every prefix.
#[derive(Debug, Default)]
pub struct UidGenerator {
    counter: AtomicU32,
}

impl UidGenerator {
    /// A generator whose first identifier has sequence `1`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counter: AtomicU32::new(0),
        }
    }

    /// Increment the counter and build an identifier from the new value.
    ///
    /// The prefix is never validated. Past `u32::MAX` the sequence wraps
    /// around to `0`.
    pub fn next(&self, prefix: char) -> Uid {
        let sequence = self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        Uid { prefix, sequence }
    }

    /// Set the counter so that the next identifier uses `start + 1`.
    pub fn reset(&self, start: u32) {
        self.counter.store(start, Ordering::Relaxed);
    }

    /// The sequence number of the most recently issued identifier.
    #[must_use]
    pub fn current(&self) -> u32 {
        self.counter.load(Ordering::Relaxed)
    }
}
