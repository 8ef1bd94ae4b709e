//! # smarthome-domain
//!
//! Pure domain model for the smarthome controller.
//!
//! ## Responsibilities
//! - Foundational types: human-readable identifiers, error conventions
//! - Define **Devices** (lights, thermostats, security units) as a closed set
//! - Define the **Registry**, the only collection that owns devices
//! - Define **Rooms**, which reference devices by key without owning them
//! - Define **Users** and their access levels
//! - Define **Operations** (the `turn_on` / `set_brightness:80` command language)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies** and performs no IO.

pub mod error;
pub mod id;

pub mod device;
pub mod location;
pub mod operation;
pub mod registry;
pub mod room;
pub mod user;
