//! Duty lifecycle: assignment, clock-in/out, checkout approval,
//! live location tracking and geofence supervision.

mod geofence;
mod model;
mod repository;
mod roster;
mod service;

pub use geofence::*;
pub use model::*;
pub use repository::*;
pub use roster::*;
pub use service::*;
