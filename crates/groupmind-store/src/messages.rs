use chrono::{DateTime, Utc};
use tracing::instrument;

use groupmind_core::types::{MessageRole, SessionId, UserId};

use crate::error::Result;
use crate::store::Store;
use crate::types::{Message, NewMessage};

impl Store {
    /// Persist an immutable message. Messages are never updated or deleted
    /// except in bulk via `reset_session`.
    #[instrument(skip(self, msg), fields(session_id = %msg.session_id))]
    pub fn save_message(&self, msg: &NewMessage) -> Result<i64> {
        let now = Utc::now();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO messages
             (session_id, role, content, user_id, user_name, user_role, user_title,
              group_id, group_name, timestamp, message_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            rusqlite::params![
                msg.session_id.as_str(),
                msg.role.to_string(),
                msg.content,
                msg.user_id,
                msg.user_name,
                msg.user_role.map(|r| r.to_string()),
                msg.user_title,
                msg.group_id,
                msg.group_name,
                now.to_rfc3339(),
                msg.message_id,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Most recent `limit` messages for a session, oldest first (ready to
    /// hand straight to a prompt builder). `before` restricts to messages
    /// strictly older than the given timestamp, for pagination.
    #[instrument(skip(self), fields(session_id = %session_id, limit))]
    pub fn get_messages(
        &self,
        session_id: &SessionId,
        limit: usize,
        before: Option<DateTime<Utc>>,
    ) -> Result<Vec<Message>> {
        let conn = self.conn.lock().unwrap();
        let mut rows: Vec<Message> = match before {
            Some(ts) => {
                let mut stmt = conn.prepare(
                    "SELECT id, session_id, role, content, user_id, user_name, user_role,
                            user_title, group_id, group_name, timestamp, message_id
                     FROM messages
                     WHERE session_id = ?1 AND timestamp < ?2
                     ORDER BY timestamp DESC
                     LIMIT ?3",
                )?;
                stmt.query_map(
                    rusqlite::params![session_id.as_str(), ts.to_rfc3339(), limit as i64],
                    row_to_message,
                )?
                .filter_map(|r| r.ok())
                .collect()
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT id, session_id, role, content, user_id, user_name, user_role,
                            user_title, group_id, group_name, timestamp, message_id
                     FROM messages
                     WHERE session_id = ?1
                     ORDER BY timestamp DESC
                     LIMIT ?2",
                )?;
                stmt.query_map(
                    rusqlite::params![session_id.as_str(), limit as i64],
                    row_to_message,
                )?
                .filter_map(|r| r.ok())
                .collect()
            }
        };
        rows.reverse();
        Ok(rows)
    }

    /// Every message authored by `user_id`, optionally narrowed to one
    /// session, newest first (used for cross-group "what has this user
    /// said" queries, relying on the dual-write into the user's personal
    /// session).
    #[instrument(skip(self), fields(user_id = %user_id, limit))]
    pub fn get_messages_by_user(
        &self,
        user_id: UserId,
        session_id: Option<&SessionId>,
        limit: usize,
    ) -> Result<Vec<Message>> {
        let conn = self.conn.lock().unwrap();
        let rows: Vec<Message> = match session_id {
            Some(sid) => {
                let mut stmt = conn.prepare(
                    "SELECT id, session_id, role, content, user_id, user_name, user_role,
                            user_title, group_id, group_name, timestamp, message_id
                     FROM messages
                     WHERE user_id = ?1 AND session_id = ?2
                     ORDER BY timestamp DESC
                     LIMIT ?3",
                )?;
                stmt.query_map(
                    rusqlite::params![user_id, sid.as_str(), limit as i64],
                    row_to_message,
                )?
                .filter_map(|r| r.ok())
                .collect()
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT id, session_id, role, content, user_id, user_name, user_role,
                            user_title, group_id, group_name, timestamp, message_id
                     FROM messages
                     WHERE user_id = ?1
                     ORDER BY timestamp DESC
                     LIMIT ?2",
                )?;
                stmt.query_map(rusqlite::params![user_id, limit as i64], row_to_message)?
                    .filter_map(|r| r.ok())
                    .collect()
            }
        };
        Ok(rows)
    }

    /// Substring search over message content within a session, newest
    /// first. Used by the memory retrieval ReAct loop's `search_chat_history`
    /// tool.
    #[instrument(skip(self), fields(session_id = %session_id, limit))]
    pub fn search_messages(
        &self,
        session_id: &SessionId,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<Message>> {
        let conn = self.conn.lock().unwrap();
        let pattern = format!("%{}%", keyword.replace('%', "\\%").replace('_', "\\_"));
        let mut stmt = conn.prepare(
            "SELECT id, session_id, role, content, user_id, user_name, user_role,
                    user_title, group_id, group_name, timestamp, message_id
             FROM messages
             WHERE session_id = ?1 AND content LIKE ?2 ESCAPE '\\'
             ORDER BY timestamp DESC
             LIMIT ?3",
        )?;
        let rows = stmt.query_map(
            rusqlite::params![session_id.as_str(), pattern, limit as i64],
            row_to_message,
        )?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let session_id: String = row.get(1)?;
    let role_str: String = row.get(2)?;
    let user_role_str: Option<String> = row.get(6)?;
    let timestamp: String = row.get(10)?;
    Ok(Message {
        id: row.get(0)?,
        session_id: SessionId(session_id),
        role: role_str.parse().unwrap_or(MessageRole::User),
        content: row.get(3)?,
        user_id: row.get(4)?,
        user_name: row.get(5)?,
        user_role: user_role_str.and_then(|s| s.parse().ok()),
        user_title: row.get(7)?,
        group_id: row.get(8)?,
        group_name: row.get(9)?,
        timestamp: timestamp.parse().unwrap_or_else(|_| chrono::Utc::now()),
        message_id: row.get(11)?,
    })
}
