//! SQLite persistence for officer accounts.

mod model;
mod repository;

pub use model::OfficerDB;
pub use repository::OfficerRepository;
