use chrono::Utc;
use tracing::instrument;

use groupmind_core::types::{SessionId, UserId};

use crate::error::Result;
use crate::store::Store;
use crate::types::Expression;

impl Store {
    #[instrument(skip(self, situation, style, example), fields(session_id = %session_id, user_id))]
    pub fn save_expression(
        &self,
        session_id: &SessionId,
        user_id: UserId,
        user_name: &str,
        situation: &str,
        style: &str,
        example: &str,
    ) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO expressions (session_id, user_id, user_name, situation, style, example, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                session_id.as_str(),
                user_id,
                user_name,
                situation,
                style,
                example,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    #[instrument(skip(self), fields(session_id = %session_id, limit))]
    pub fn get_expressions(&self, session_id: &SessionId, limit: usize) -> Result<Vec<Expression>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, session_id, user_id, user_name, situation, style, example, created_at
             FROM expressions
             WHERE session_id = ?1
             ORDER BY created_at DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(
            rusqlite::params![session_id.as_str(), limit as i64],
            row_to_expression,
        )?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    #[instrument(skip(self), fields(session_id = %session_id))]
    pub fn get_expression_count(&self, session_id: &SessionId) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM expressions WHERE session_id = ?1",
            rusqlite::params![session_id.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Delete the oldest expressions for a session so no more than
    /// `keep_count` remain, oldest by `created_at` first.
    #[instrument(skip(self), fields(session_id = %session_id, keep_count))]
    pub fn delete_oldest_expressions(&self, session_id: &SessionId, keep_count: usize) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM expressions
             WHERE session_id = ?1 AND id NOT IN (
                 SELECT id FROM expressions
                 WHERE session_id = ?1
                 ORDER BY created_at DESC
                 LIMIT ?2
             )",
            rusqlite::params![session_id.as_str(), keep_count as i64],
        )?;
        Ok(())
    }
}

fn row_to_expression(row: &rusqlite::Row<'_>) -> rusqlite::Result<Expression> {
    let session_id: String = row.get(1)?;
    let created_at: String = row.get(7)?;
    Ok(Expression {
        id: row.get(0)?,
        session_id: SessionId(session_id),
        user_id: row.get(2)?,
        user_name: row.get(3)?,
        situation: row.get(4)?,
        style: row.get(5)?,
        example: row.get(6)?,
        created_at: created_at.parse().unwrap_or_else(|_| chrono::Utc::now()),
    })
}
