//! Panic alerts: trigger, acknowledge, live listing.

mod model;
mod repository;
mod service;

pub use model::*;
pub use repository::*;
pub use service::*;
