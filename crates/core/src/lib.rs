//! Domain logic for the bandobast duty-deployment service.
//!
//! Everything stateful goes through repository traits so the storage
//! backend stays swappable; realtime fan-out goes through the
//! [`events::Broadcaster`] trait so services stay transport-agnostic.

pub mod alerts;
pub mod auth;
pub mod duties;
pub mod errors;
pub mod events;
pub mod geo;
pub mod maintenance;
pub mod notifications;
pub mod officers;
pub mod stats;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{DatabaseError, Error, Result};
