//! # smarthome-app
//!
//! Application layer: the controller that composes devices, rooms, and users.
//!
//! ## Responsibilities
//! - [`SmartHomeController`](controller::SmartHomeController): the aggregate
//!   root. Owns the device registry, the rooms, and the users; resolves ids
//!   before dispatching operations.
//! - The process-wide controller instance, created lazily on first access.
//! - The [`access`] policy deciding which users may run which operations.
//! - Serialisable [`snapshot`]s of the whole home.
//!
//! ## Dependency rule
//! Depends on `smarthome-domain` only. Never performs IO.

pub mod access;
pub mod controller;
pub mod snapshot;

pub use controller::SmartHomeController;
