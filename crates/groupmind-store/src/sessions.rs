use chrono::Utc;
use tracing::instrument;

use groupmind_core::types::SessionId;

use crate::error::{Result, StoreError};
use crate::store::Store;
use crate::types::Session;

impl Store {
    /// Return the session for `id`, creating it with `target_id` if absent.
    /// Creating a session touches no other table and makes no network call.
    #[instrument(skip(self), fields(session_id = %id))]
    pub fn get_or_create_session(&self, id: &SessionId, target_id: i64) -> Result<Session> {
        if let Some(session) = self.get_session(id)? {
            return Ok(session);
        }

        let now = Utc::now();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO sessions (id, target_id, created_at, updated_at, compressed_context)
             VALUES (?1, ?2, ?3, ?3, NULL)",
            rusqlite::params![id.as_str(), target_id, now.to_rfc3339()],
        )?;
        drop(conn);

        self.get_session(id)?
            .ok_or_else(|| StoreError::SessionNotFound(id.as_str().to_string()))
    }

    #[instrument(skip(self), fields(session_id = %id))]
    pub fn get_session(&self, id: &SessionId) -> Result<Option<Session>> {
        let conn = self.conn.lock().unwrap();
        match conn.query_row(
            "SELECT id, target_id, created_at, updated_at, compressed_context
             FROM sessions WHERE id = ?1",
            rusqlite::params![id.as_str()],
            row_to_session,
        ) {
            Ok(s) => Ok(Some(s)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Bump `updated_at` to now. Called on every inbound message so the
    /// session survives LRU eviction preference.
    #[instrument(skip(self), fields(session_id = %id))]
    pub fn touch_session(&self, id: &SessionId) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE sessions SET updated_at = ?1 WHERE id = ?2",
            rusqlite::params![Utc::now().to_rfc3339(), id.as_str()],
        )?;
        Ok(())
    }

    pub fn set_compressed_context(&self, id: &SessionId, context: Option<&str>) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE sessions SET compressed_context = ?1, updated_at = ?2 WHERE id = ?3",
            rusqlite::params![context, Utc::now().to_rfc3339(), id.as_str()],
        )?;
        Ok(())
    }

    /// Delete all messages for this session and clear its compressed
    /// context, but keep the session row itself (identity survives).
    #[instrument(skip(self), fields(session_id = %id))]
    pub fn reset_session(&self, id: &SessionId) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM messages WHERE session_id = ?1",
            rusqlite::params![id.as_str()],
        )?;
        conn.execute(
            "UPDATE sessions SET compressed_context = NULL, updated_at = ?1 WHERE id = ?2",
            rusqlite::params![Utc::now().to_rfc3339(), id.as_str()],
        )?;
        Ok(())
    }
}

fn row_to_session(row: &rusqlite::Row<'_>) -> rusqlite::Result<Session> {
    let id_str: String = row.get(0)?;
    let created_at: String = row.get(2)?;
    let updated_at: String = row.get(3)?;
    Ok(Session {
        id: SessionId(id_str),
        target_id: row.get(1)?,
        created_at: created_at
            .parse()
            .unwrap_or_else(|_| chrono::Utc::now()),
        updated_at: updated_at
            .parse()
            .unwrap_or_else(|_| chrono::Utc::now()),
        compressed_context: row.get(4)?,
    })
}
