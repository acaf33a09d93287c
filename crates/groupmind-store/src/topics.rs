use chrono::Utc;
use tracing::instrument;

use groupmind_core::types::SessionId;

use crate::error::Result;
use crate::store::Store;
use crate::types::Topic;

impl Store {
    /// Insert a newly-identified topic.
    #[instrument(skip(self, keywords), fields(session_id = %session_id))]
    pub fn save_topic(
        &self,
        session_id: &SessionId,
        title: &str,
        keywords: &[String],
        summary: &str,
    ) -> Result<i64> {
        let now = Utc::now();
        let keywords_json = serde_json::to_string(keywords)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO topics (session_id, title, keywords, summary, message_count, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)",
            rusqlite::params![session_id.as_str(), title, keywords_json, summary, now.to_rfc3339()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Retained topics for a session, most-recently-updated first, capped
    /// at `limit`.
    #[instrument(skip(self), fields(session_id = %session_id, limit))]
    pub fn get_topics(&self, session_id: &SessionId, limit: usize) -> Result<Vec<Topic>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, session_id, title, keywords, summary, message_count, created_at, updated_at
             FROM topics
             WHERE session_id = ?1
             ORDER BY updated_at DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(
            rusqlite::params![session_id.as_str(), limit as i64],
            row_to_topic,
        )?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Merge new evidence into an existing topic: bump `message_count`,
    /// replace the summary, refresh `updated_at`.
    #[instrument(skip(self, summary))]
    pub fn update_topic(&self, topic_id: i64, summary: &str, message_count_delta: u32) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE topics
             SET summary = ?1, message_count = message_count + ?2, updated_at = ?3
             WHERE id = ?4",
            rusqlite::params![summary, message_count_delta, Utc::now().to_rfc3339(), topic_id],
        )?;
        Ok(())
    }

    /// Evict topics past the retention cap for a session, oldest
    /// `updated_at` first.
    #[instrument(skip(self), fields(session_id = %session_id, keep))]
    pub fn trim_topics(&self, session_id: &SessionId, keep: usize) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM topics
             WHERE session_id = ?1 AND id NOT IN (
                 SELECT id FROM topics
                 WHERE session_id = ?1
                 ORDER BY updated_at DESC
                 LIMIT ?2
             )",
            rusqlite::params![session_id.as_str(), keep as i64],
        )?;
        Ok(())
    }
}

fn row_to_topic(row: &rusqlite::Row<'_>) -> rusqlite::Result<Topic> {
    let session_id: String = row.get(1)?;
    let keywords_json: String = row.get(3)?;
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;
    Ok(Topic {
        id: row.get(0)?,
        session_id: SessionId(session_id),
        title: row.get(2)?,
        keywords: serde_json::from_str(&keywords_json).unwrap_or_default(),
        summary: row.get(4)?,
        message_count: row.get::<_, i64>(5)? as u32,
        created_at: created_at.parse().unwrap_or_else(|_| chrono::Utc::now()),
        updated_at: updated_at.parse().unwrap_or_else(|_| chrono::Utc::now()),
    })
}
