use chrono::Utc;
use tracing::instrument;

use groupmind_core::types::Emotion;

use crate::error::Result;
use crate::store::Store;
use crate::types::Emoji;

impl Store {
    /// Register a sticker file. Idempotent — re-scanning the sticker
    /// directory on every startup must not duplicate rows.
    #[instrument(skip(self, description))]
    pub fn save_emoji(&self, file_name: &str, description: &str, emotion: Emotion) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO emojis (file_name, description, emotion, usage_count, created_at)
             VALUES (?1, ?2, ?3, 0, ?4)",
            rusqlite::params![file_name, description, emotion.to_string(), Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    #[instrument(skip(self), fields(emotion = %emotion, limit))]
    pub fn get_by_emotion(&self, emotion: Emotion, limit: usize) -> Result<Vec<Emoji>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, file_name, description, emotion, usage_count, created_at
             FROM emojis
             WHERE emotion = ?1
             ORDER BY usage_count DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(
            rusqlite::params![emotion.to_string(), limit as i64],
            row_to_emoji,
        )?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    pub fn get_all_emojis(&self) -> Result<Vec<Emoji>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, file_name, description, emotion, usage_count, created_at FROM emojis",
        )?;
        let rows = stmt.query_map([], row_to_emoji)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    pub fn increment_emoji_usage(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE emojis SET usage_count = usage_count + 1 WHERE id = ?1",
            rusqlite::params![id],
        )?;
        Ok(())
    }
}

fn row_to_emoji(row: &rusqlite::Row<'_>) -> rusqlite::Result<Emoji> {
    let emotion_str: String = row.get(3)?;
    let created_at: String = row.get(5)?;
    Ok(Emoji {
        id: row.get(0)?,
        file_name: row.get(1)?,
        description: row.get(2)?,
        emotion: emotion_str.parse().unwrap_or(Emotion::Neutral),
        usage_count: row.get::<_, i64>(4)? as u64,
        created_at: created_at.parse().unwrap_or_else(|_| chrono::Utc::now()),
    })
}
