//! SQLite persistence for panic alerts.

mod model;
mod repository;

pub use model::PanicAlertDB;
pub use repository::PanicAlertRepository;
