use rusqlite::Connection;

/// Initialize the database schema. Idempotent, run once at startup.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- License keys
        -- Timestamps are unix seconds (UTC). expires_at NULL = never expires.
        CREATE TABLE IF NOT EXISTS keys (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            key_text TEXT NOT NULL UNIQUE,
            package TEXT,
            duration_days INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            expires_at INTEGER,
            active INTEGER NOT NULL DEFAULT 1
        );
        CREATE INDEX IF NOT EXISTS idx_keys_created ON keys(created_at DESC, id DESC);
        "#,
    )?;
    Ok(())
}
