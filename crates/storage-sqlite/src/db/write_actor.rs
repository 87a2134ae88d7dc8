//! Single-threaded write actor. SQLite allows one writer at a time;
//! funnelling every mutation through one thread keeps writes globally
//! ordered and spares callers from `SQLITE_BUSY` retry loops.

use diesel::SqliteConnection;
use log::{debug, error};
use tokio::sync::{mpsc, oneshot};

use bandobast_core::{DatabaseError, Error, Result};

use super::DbPool;

type WriteJob = Box<dyn FnOnce(&mut SqliteConnection) + Send + 'static>;

/// Handle to the writer thread. Cloning is cheap; all clones feed the
/// same queue.
#[derive(Clone)]
pub struct WriteHandle {
    sender: mpsc::UnboundedSender<WriteJob>,
}

impl WriteHandle {
    /// Run `job` on the writer thread and await its result.
    pub async fn exec<F, R>(&self, job: F) -> Result<R>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(Box::new(move |conn| {
                if reply.send(job(conn)).is_err() {
                    debug!("Write completed but the caller went away");
                }
            }))
            .map_err(|_| {
                Error::Database(DatabaseError::Internal(
                    "Writer thread is no longer running".to_string(),
                ))
            })?;

        response.await.map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "Writer thread dropped the job".to_string(),
            ))
        })?
    }
}

/// Spawn the writer thread. The thread drains jobs until every
/// `WriteHandle` clone has been dropped.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (sender, mut receiver) = mpsc::unbounded_channel::<WriteJob>();

    std::thread::spawn(move || {
        debug!("SQLite writer thread started");
        while let Some(job) = receiver.blocking_recv() {
            match pool.get() {
                Ok(mut conn) => job(&mut conn),
                // The job is dropped along with its reply channel, so
                // the caller sees a recv error rather than a hang.
                Err(err) => error!("Discarding write, no connection available: {err}"),
            }
        }
        debug!("SQLite writer thread stopped");
    });

    WriteHandle { sender }
}
