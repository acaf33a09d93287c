use std::sync::Mutex;

use rusqlite::Connection;

use crate::db;
use crate::error::Result;

/// Owns every persisted row. Thread-safe: wraps the connection in a
/// `Mutex`, the same single-node pattern the session and memory stores use
/// upstream.
pub struct Store {
    pub(crate) conn: Mutex<Connection>,
}

impl Store {
    /// Wrap an already-open connection and run migrations on it.
    pub fn new(conn: Connection) -> Result<Self> {
        db::init_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open (and create if absent) a file-backed store at `path`.
    pub fn open(path: &str) -> Result<Self> {
        Self::new(Connection::open(path)?)
    }

    /// Open a private in-memory store. Used by tests and by deployments
    /// that don't need persistence across restarts.
    pub fn open_in_memory() -> Result<Self> {
        Self::new(Connection::open_in_memory()?)
    }
}
