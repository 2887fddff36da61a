use rusqlite::{Connection, OptionalExtension};
use anyhow::{Context, Result};

/// Key/value repository over the `storage` table
///
/// Values are opaque text documents replaced wholesale on every write.
pub struct StorageRepo;

impl StorageRepo {
    /// Get the value stored under `key`
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM storage WHERE key = ?1",
            [key],
            |row| row.get(0),
        )
        .optional()
        .with_context(|| format!("Failed to read storage key '{}'", key))
    }

    /// Store `value` under `key`, replacing any previous value
    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO storage (key, value, modified_ts) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, modified_ts = excluded.modified_ts",
            rusqlite::params![key, value, now],
        )
        .with_context(|| format!("Failed to write storage key '{}'", key))?;
        log::debug!("Wrote {} bytes to storage key '{}'", value.len(), key);
        Ok(())
    }
}
