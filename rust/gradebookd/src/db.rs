use anyhow::Context;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

pub const DB_FILE_NAME: &str = "gradebook.sqlite3";

/// Narrow key/value seam over persisted JSON blobs. Everything above this
/// trait is unaware of how the blobs are stored.
pub trait KvStore {
    fn get_json(&self, key: &str) -> anyhow::Result<Option<serde_json::Value>>;
    fn set_json(&self, key: &str, value: &serde_json::Value) -> anyhow::Result<()>;
    fn remove(&self, key: &str) -> anyhow::Result<()>;
}

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)
        .with_context(|| format!("failed to create workspace {}", workspace.to_string_lossy()))?;
    let db_path = workspace.join(DB_FILE_NAME);
    let conn = Connection::open(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.to_string_lossy()))?;
    init_schema(&conn)?;
    Ok(conn)
}

#[cfg(test)]
pub fn open_in_memory() -> anyhow::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store(
            key TEXT PRIMARY KEY,
            value_json TEXT NOT NULL,
            updated_at TEXT
        )",
        [],
    )?;
    Ok(())
}

impl KvStore for Connection {
    fn get_json(&self, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
        let raw: Option<String> = self
            .query_row(
                "SELECT value_json FROM kv_store WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        // Unparseable text is surfaced as a string so loaders can fall back.
        Ok(Some(
            serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw)),
        ))
    }

    fn set_json(&self, key: &str, value: &serde_json::Value) -> anyhow::Result<()> {
        let text = serde_json::to_string(value)?;
        let now = chrono::Utc::now().to_rfc3339();
        self.execute(
            "INSERT INTO kv_store(key, value_json, updated_at) VALUES(?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json, updated_at = excluded.updated_at",
            (key, text, now),
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.execute("DELETE FROM kv_store WHERE key = ?", [key])?;
        Ok(())
    }
}
