//! Officer identity, ranks and status.

mod model;
mod repository;

pub use model::*;
pub use repository::*;
