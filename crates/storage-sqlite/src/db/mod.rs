//! Pool construction, migrations and the serialized write path.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::info;

use bandobast_core::{DatabaseError, Error, Result};

use crate::errors::StorageError;

pub mod write_actor;

pub use write_actor::WriteHandle;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

const DB_FILENAME: &str = "bandobast.db";

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Per-connection pragmas. WAL lets readers proceed while the writer
/// thread holds its transaction; the busy timeout covers the brief
/// windows where they still collide.
#[derive(Debug)]
struct ConnectionOptions;

impl diesel::r2d2::CustomizeConnection<SqliteConnection, diesel::r2d2::Error>
    for ConnectionOptions
{
    fn on_acquire(
        &self,
        conn: &mut SqliteConnection,
    ) -> std::result::Result<(), diesel::r2d2::Error> {
        conn.batch_execute(
            "PRAGMA busy_timeout = 5000; \
             PRAGMA journal_mode = WAL; \
             PRAGMA synchronous = NORMAL; \
             PRAGMA foreign_keys = ON;",
        )
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Resolve the database file inside `app_data_dir`, creating the
/// directory if needed, and return its path.
pub fn init(app_data_dir: &str) -> std::result::Result<String, StorageError> {
    let dir = Path::new(app_data_dir);
    if !dir.exists() {
        fs::create_dir_all(dir)
            .map_err(|err| StorageError::Internal(format!("Failed to create db dir: {err}")))?;
    }
    let db_path = dir.join(DB_FILENAME);
    Ok(db_path.to_string_lossy().into_owned())
}

pub fn create_pool(db_path: &str) -> std::result::Result<Arc<DbPool>, StorageError> {
    let manager = ConnectionManager::<SqliteConnection>::new(db_path);
    let pool = Pool::builder()
        .max_size(10)
        .connection_customizer(Box::new(ConnectionOptions))
        .build(manager)
        .map_err(|err| StorageError::Internal(format!("Failed to build pool: {err}")))?;
    Ok(Arc::new(pool))
}

pub fn run_migrations(db_path: &str) -> std::result::Result<(), StorageError> {
    let mut conn = SqliteConnection::establish(db_path)
        .map_err(|err| StorageError::Migration(format!("Failed to open {db_path}: {err}")))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| StorageError::Migration(err.to_string()))?;
    for migration in &applied {
        info!("Applied migration {migration}");
    }
    Ok(())
}

/// Checkout a pooled connection for a read, already mapped onto the
/// domain error type.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection> {
    pool.get()
        .map_err(|err| Error::Database(DatabaseError::Pool(err.to_string())))
}
