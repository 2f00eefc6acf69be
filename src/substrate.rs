use std::collections::HashMap;
use std::path::Path;

use rusqlite::{Connection, OptionalExtension};

/// A write to the durable substrate made by another process (or another
/// connection) sharing the same workspace.
#[derive(Debug, Clone)]
pub struct ExternalChange {
    pub key: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

/// Key-value persistence shared across every process that has the same
/// workspace open. `poll_external` reports writes made by *other* handles
/// only; a handle is never notified of its own `set` calls.
pub trait Substrate {
    fn get(&mut self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
    fn poll_external(&mut self) -> anyhow::Result<Vec<ExternalChange>>;
}

/// SQLite-backed substrate: a single `kv` table, one row per collection key.
///
/// External writes are detected with the `data_version` pragma, which moves
/// only when a different connection modifies the database. The shadow map
/// holds the last value this handle observed per key so a version bump can be
/// turned into per-key `(old, new)` diffs.
pub struct SqliteSubstrate {
    conn: Connection,
    shadow: HashMap<String, String>,
    data_version: i64,
}

impl SqliteSubstrate {
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(workspace)?;
        let db_path = workspace.join("erp.sqlite3");
        let conn = Connection::open(db_path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv(
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        let data_version = read_data_version(&conn)?;
        Ok(Self {
            conn,
            shadow: HashMap::new(),
            data_version,
        })
    }

    fn snapshot(&self) -> anyhow::Result<HashMap<String, String>> {
        let mut stmt = self.conn.prepare("SELECT key, value FROM kv")?;
        let rows = stmt
            .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows.into_iter().collect())
    }
}

fn read_data_version(conn: &Connection) -> anyhow::Result<i64> {
    Ok(conn.query_row("PRAGMA data_version", [], |r| r.get(0))?)
}

impl Substrate for SqliteSubstrate {
    fn get(&mut self, key: &str) -> anyhow::Result<Option<String>> {
        let value: Option<String> = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?", [key], |r| r.get(0))
            .optional()?;
        match &value {
            Some(v) => {
                self.shadow.insert(key.to_string(), v.clone());
            }
            None => {
                self.shadow.remove(key);
            }
        }
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.conn.execute(
            "INSERT INTO kv(key, value) VALUES(?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            (key, value),
        )?;
        // Own writes never show up in poll_external.
        self.shadow.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn poll_external(&mut self) -> anyhow::Result<Vec<ExternalChange>> {
        let version = read_data_version(&self.conn)?;
        if version == self.data_version {
            return Ok(Vec::new());
        }
        let current = self.snapshot()?;

        let mut changes = Vec::new();
        for (key, new_value) in &current {
            if self.shadow.get(key) != Some(new_value) {
                changes.push(ExternalChange {
                    key: key.clone(),
                    old_value: self.shadow.get(key).cloned(),
                    new_value: Some(new_value.clone()),
                });
            }
        }
        for key in self.shadow.keys() {
            if !current.contains_key(key) {
                changes.push(ExternalChange {
                    key: key.clone(),
                    old_value: self.shadow.get(key).cloned(),
                    new_value: None,
                });
            }
        }
        changes.sort_by(|a, b| a.key.cmp(&b.key));

        self.shadow = current;
        self.data_version = version;
        Ok(changes)
    }
}
