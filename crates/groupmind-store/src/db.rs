use rusqlite::Connection;

use crate::error::Result;

/// Initialise every table and index the store needs. Safe to call on every
/// startup (uses `IF NOT EXISTS` throughout) and switches the connection to
/// WAL mode so readers never block the writer.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    create_sessions_table(conn)?;
    create_messages_table(conn)?;
    create_topics_table(conn)?;
    create_expressions_table(conn)?;
    create_emojis_table(conn)?;
    Ok(())
}

fn create_sessions_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS sessions (
            id                  TEXT PRIMARY KEY,
            target_id           INTEGER NOT NULL,
            created_at          TEXT NOT NULL,
            updated_at          TEXT NOT NULL,
            compressed_context  TEXT
        );",
    )?;
    Ok(())
}

fn create_messages_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS messages (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id  TEXT NOT NULL,
            role        TEXT NOT NULL,
            content     TEXT NOT NULL,
            user_id     INTEGER,
            user_name   TEXT,
            user_role   TEXT,
            user_title  TEXT,
            group_id    INTEGER,
            group_name  TEXT,
            timestamp   TEXT NOT NULL,
            message_id  INTEGER
        );
        CREATE INDEX IF NOT EXISTS idx_messages_session
            ON messages(session_id, timestamp DESC);
        CREATE INDEX IF NOT EXISTS idx_messages_user
            ON messages(user_id, timestamp DESC);
        CREATE INDEX IF NOT EXISTS idx_messages_session_content
            ON messages(session_id, content);",
    )?;
    Ok(())
}

fn create_topics_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS topics (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id      TEXT NOT NULL,
            title           TEXT NOT NULL,
            keywords        TEXT NOT NULL,
            summary         TEXT NOT NULL,
            message_count   INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_topics_session
            ON topics(session_id, updated_at DESC);",
    )?;
    Ok(())
}

fn create_expressions_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS expressions (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id  TEXT NOT NULL,
            user_id     INTEGER NOT NULL,
            user_name   TEXT NOT NULL,
            situation   TEXT NOT NULL,
            style       TEXT NOT NULL,
            example     TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_expressions_session
            ON expressions(session_id, created_at);",
    )?;
    Ok(())
}

fn create_emojis_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS emojis (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            file_name       TEXT NOT NULL UNIQUE,
            description     TEXT NOT NULL,
            emotion         TEXT NOT NULL,
            usage_count     INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_emojis_emotion
            ON emojis(emotion);",
    )?;
    Ok(())
}
