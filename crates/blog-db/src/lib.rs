pub mod migrations;
pub mod models;
pub mod queries;
pub mod store;

use anyhow::Result;
use blog_types::StoreError;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;

pub use store::SqliteStore;

pub const DEFAULT_READER_POOL_SIZE: usize = 4;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Which kind of connection an operation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// SQLite pool with a reader/writer split: one writer connection with
/// foreign keys enforced, plus read-only connections handed out round-robin.
pub struct Database {
    writer: Mutex<Connection>,
    readers: Vec<Mutex<Connection>>,
    reader_idx: AtomicUsize,
}

impl Database {
    pub fn open(path: &Path, reader_count: usize) -> Result<Self> {
        let writer = Connection::open(path)?;
        writer.busy_timeout(BUSY_TIMEOUT)?;
        let mode: String =
            writer.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        writer.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run(&writer)?;

        let reader_count = reader_count.max(1);
        let mut readers = Vec::with_capacity(reader_count);
        for _ in 0..reader_count {
            let conn = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            conn.busy_timeout(BUSY_TIMEOUT)?;
            readers.push(Mutex::new(conn));
        }

        info!(
            "Database opened at {} (journal_mode={}, 1 writer + {} readers)",
            path.display(),
            mode,
            reader_count
        );
        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            reader_idx: AtomicUsize::new(0),
        })
    }

    pub fn reader_count(&self) -> usize {
        self.readers.len()
    }

    fn reader(&self) -> usize {
        self.reader_idx.fetch_add(1, Ordering::Relaxed) % self.readers.len()
    }

    fn conn_for(&self, access: Access) -> &Mutex<Connection> {
        match access {
            Access::Write => &self.writer,
            Access::Read => &self.readers[self.reader()],
        }
    }

    /// Runs `f` with exclusive use of one pooled connection. The connection
    /// goes back to the pool when the guard drops, on every exit path.
    pub fn with_access<F, T>(&self, access: Access, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = self
            .conn_for(access)
            .lock()
            .map_err(|e| StoreError::Backend(format!("connection lock poisoned: {}", e)))?;
        f(&conn).map_err(classify)
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        self.with_access(Access::Read, f)
    }

    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        self.with_access(Access::Write, f)
    }
}

/// Maps a raw SQLite failure onto the store error taxonomy. Missing rows are
/// handled by the callers, which know which entity they were looking for.
pub fn classify(err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, msg)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            StoreError::ForeignKeyViolation(
                msg.clone()
                    .unwrap_or_else(|| "FOREIGN KEY constraint failed".to_string()),
            )
        }
        _ => StoreError::Backend(err.to_string()),
    }
}
