//! SQLite persistence for the bandobast service.
//!
//! Reads run on pooled connections; every write funnels through a
//! single [`WriteHandle`] so SQLite never sees two writers at once.

pub mod alerts;
mod convert;
pub mod db;
pub mod duties;
pub mod errors;
pub mod notifications;
pub mod officers;
pub mod schema;

#[cfg(test)]
pub(crate) mod test_support;

pub use db::write_actor::spawn_writer;
pub use db::{create_pool, get_connection, init, run_migrations, DbPool, WriteHandle};
pub use errors::StorageError;
