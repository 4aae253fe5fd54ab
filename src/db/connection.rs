use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc},
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::{anyhow, Context, Result};
use log::{error, info, warn};
use rusqlite::{Connection, Transaction};
use tokio::sync::oneshot;

use super::migrations::run_migrations;

/// Work queued for the schedule thread. Closing the channel stops the thread.
type Job = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the SQLite database lives.
#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    Memory,
}

impl Location {
    fn open(&self) -> Result<Connection> {
        let conn = match self {
            Location::File(path) => Connection::open(path),
            Location::Memory => Connection::open_in_memory(),
        };
        conn.with_context(|| format!("failed to open schedule database {self}"))
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::File(path) => write!(f, "{}", path.display()),
            Location::Memory => f.write_str(":memory:"),
        }
    }
}

/// Owns the job queue and the thread draining it. Dropping the last handle closes the
/// queue and waits for jobs already sent to finish.
struct Worker {
    jobs: Option<mpsc::Sender<Job>>,
    thread: Option<JoinHandle<()>>,
}

impl Drop for Worker {
    fn drop(&mut self) {
        drop(self.jobs.take());
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                error!("Schedule database thread panicked");
            }
        }
    }
}

/// Pragmas every schedule connection needs. Entries reference projects, so foreign
/// keys must be enforced; WAL only applies to files.
fn configure(conn: &Connection, location: &Location) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")
        .context("failed to enable foreign keys")?;
    conn.busy_timeout(BUSY_TIMEOUT)
        .context("failed to set busy timeout")?;
    if let Location::File(_) = location {
        if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
            warn!("Schedule database stays in rollback journal mode: {err}");
        }
    }
    Ok(())
}

fn prepare(location: &Location) -> Result<Connection> {
    let mut conn = location.open()?;
    configure(&conn, location)?;
    run_migrations(&mut conn).context("failed to migrate schedule database")?;
    Ok(conn)
}

/// Handle to the schedule database.
///
/// All SQLite work runs on one dedicated thread. Callers hand it closures through
/// [`Database::execute`] and await the reply, so the handle is cheap to clone and safe
/// to share across tasks.
#[derive(Clone)]
pub struct Database {
    worker: Arc<Worker>,
    location: Arc<Location>,
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }
        Self::spawn(Location::File(db_path))
    }

    /// Private database that disappears with the handle. Used by tests and dry runs.
    pub fn in_memory() -> Result<Self> {
        Self::spawn(Location::Memory)
    }

    fn spawn(location: Location) -> Result<Self> {
        let (jobs_tx, jobs_rx) = mpsc::channel::<Job>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<()>>(1);
        let thread_location = location.clone();

        let thread = thread::Builder::new()
            .name("crewboard-db".into())
            .spawn(move || {
                let mut conn = match prepare(&thread_location) {
                    Ok(conn) => {
                        let _ = ready_tx.send(Ok(()));
                        conn
                    }
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };

                for job in jobs_rx {
                    job(&mut conn);
                }
                info!("Schedule database thread for {thread_location} stopped");
            })
            .context("failed to spawn schedule database thread")?;

        let worker = Worker {
            jobs: Some(jobs_tx),
            thread: Some(thread),
        };
        ready_rx
            .recv()
            .context("schedule database thread exited during startup")??;

        info!("Schedule database ready at {location}");
        Ok(Self {
            worker: Arc::new(worker),
            location: Arc::new(location),
        })
    }

    /// File backing this database, `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        match self.location.as_ref() {
            Location::File(path) => Some(path.as_path()),
            Location::Memory => None,
        }
    }

    /// Runs `task` on the database thread and returns its result.
    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job = Box::new(move |conn| {
            // the caller may have been cancelled; the work itself already ran
            let _ = reply_tx.send(task(conn));
        });

        self.worker
            .jobs
            .as_ref()
            .ok_or_else(|| anyhow!("schedule database is shut down"))?
            .send(job)
            .map_err(|_| anyhow!("schedule database thread is gone"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("schedule database thread dropped the request"))?
    }

    /// Like [`Database::execute`], inside one transaction. Any error rolls back every
    /// statement `task` ran; `what` names the write in the commit error.
    pub async fn transact<F, T>(&self, what: &'static str, task: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.execute(move |conn| {
            let tx = conn
                .transaction()
                .with_context(|| format!("failed to begin {what}"))?;
            let value = task(&tx)?;
            tx.commit().with_context(|| format!("failed to commit {what}"))?;
            Ok(value)
        })
        .await
    }
}
