//! SQLite persistence for duty assignments.

mod model;
mod repository;

pub use model::DutyDB;
pub use repository::DutyRepository;
