use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use rusqlite::Connection;
use tokio::sync::oneshot;

use super::migrations::run_migrations;

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Execute(DbTask),
    Shutdown,
}

struct DatabaseInner {
    sender: mpsc::Sender<DbCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl DatabaseInner {
    fn take_worker(&self) -> Option<JoinHandle<()>> {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.take()
    }

    fn shutdown(&self, handle: JoinHandle<()>) {
        if let Err(err) = self.sender.send(DbCommand::Shutdown) {
            error!("Failed to send shutdown to DB thread: {err}");
        }
        if let Err(join_err) = handle.join() {
            error!("Failed to join DB thread: {join_err:?}");
        }
    }
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        if let Some(handle) = self.take_worker() {
            self.shutdown(handle);
        }
    }
}

/// SQLite store owned by a dedicated worker thread.
///
/// All statements run on that thread; callers hand it closures and await the
/// reply, so concurrent callers are serialized without a connection pool.
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

type ReadySender = mpsc::Sender<Result<()>>;

/// Opens and migrates the store, reports readiness, then serves commands
/// until shutdown or until every sender is gone.
fn run_worker(path: &Path, ready_tx: ReadySender, commands: mpsc::Receiver<DbCommand>) {
    let mut conn = match open_connection(path) {
        Ok(conn) => conn,
        Err(err) => {
            let _ = ready_tx.send(Err(err));
            return;
        }
    };
    if ready_tx.send(Ok(())).is_err() {
        error!("DB initialization receiver dropped before ready signal");
        return;
    }

    for command in commands.iter() {
        match command {
            DbCommand::Execute(task) => task(&mut conn),
            DbCommand::Shutdown => break,
        }
    }
    info!("Database thread shutting down");
}

fn open_connection(path: &Path) -> Result<Connection> {
    let mut conn = Connection::open(path).context("failed to open SQLite database")?;
    if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
        error!("Failed to enable WAL mode: {err}");
    }
    run_migrations(&mut conn).context("failed to run database migrations")?;
    Ok(conn)
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let (command_tx, command_rx) = mpsc::channel::<DbCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let path_for_thread = db_path.clone();

        let worker = thread::Builder::new()
            .name("calls-sensor-db".into())
            .spawn(move || run_worker(&path_for_thread, ready_tx, command_rx))
            .context("failed to spawn database worker thread")?;

        ready_rx
            .recv()
            .context("database worker exited before signaling readiness")??;

        info!("Database initialized at {}", db_path.display());

        Ok(Self {
            inner: Arc::new(DatabaseInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
        })
    }

    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.inner.sender.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = DbCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                error!("DB caller dropped before receiving result");
            }
        }));

        sender
            .send(command)
            .map_err(|err| anyhow!("failed to send command to DB thread: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("database thread terminated unexpectedly"))?
    }

    /// Stops the worker thread. Every later call fails.
    pub async fn shutdown(&self) -> Result<()> {
        let Some(handle) = self.inner.take_worker() else {
            return Ok(());
        };

        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || inner.shutdown(handle))
            .await
            .context("database shutdown worker join failed")
    }
}
