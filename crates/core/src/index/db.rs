//! Index database connection and note metadata operations.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use crate::host::{CapabilityError, UidIndex};

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("cannot create index directory `{path}`: {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },
}

/// One note's metadata row.
#[derive(Debug, Clone)]
pub struct IndexedNote {
    pub path: String,
    pub title: Option<String>,
    /// RFC 3339 modification timestamp.
    pub modified: String,
    pub frontmatter_json: String,
    pub content_hash: String,
}

/// Vault metadata index handle.
#[derive(Debug)]
pub struct NoteIndex {
    conn: Connection,
}

impl NoteIndex {
    /// Open or create an index database at the given path.
    pub fn open(path: &Path) -> Result<Self, IndexError> {
        if let Some(parent) = path.parent() {
            // Connection::open fails opaquely when the directory is missing
            std::fs::create_dir_all(parent).map_err(|e| IndexError::CreateDir {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// In-memory database, for tests.
    pub fn open_in_memory() -> Result<Self, IndexError> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Insert or update a note row keyed by path.
    pub fn upsert(&self, note: &IndexedNote) -> Result<(), IndexError> {
        self.conn.execute(
            "INSERT INTO notes (path, title, modified_at, frontmatter_json, content_hash)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(path) DO UPDATE SET
                title = excluded.title,
                modified_at = excluded.modified_at,
                frontmatter_json = excluded.frontmatter_json,
                content_hash = excluded.content_hash",
            params![
                note.path,
                note.title,
                note.modified,
                note.frontmatter_json,
                note.content_hash,
            ],
        )?;
        Ok(())
    }

    pub fn remove(&self, path: &str) -> Result<(), IndexError> {
        self.conn.execute("DELETE FROM notes WHERE path = ?1", params![path])?;
        Ok(())
    }

    pub fn all_paths(&self) -> Result<Vec<String>, IndexError> {
        let mut stmt = self.conn.prepare("SELECT path FROM notes ORDER BY path")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    pub fn content_hash(&self, path: &str) -> Result<Option<String>, IndexError> {
        Ok(self
            .conn
            .query_row(
                "SELECT content_hash FROM notes WHERE path = ?1",
                params![path],
                |row| row.get(0),
            )
            .optional()?)
    }

    pub fn note_count(&self) -> Result<u64, IndexError> {
        Ok(self.conn.query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?)
    }

    /// All `(path, frontmatter_json)` pairs.
    pub fn frontmatter_rows(&self) -> Result<Vec<(String, String)>, IndexError> {
        let mut stmt =
            self.conn.prepare("SELECT path, frontmatter_json FROM notes ORDER BY path")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// First note whose frontmatter unique-id field holds `uid`. The field
    /// may be a scalar or a sequence of values.
    pub fn find_uid(&self, uid_key: &str, uid: &str) -> Result<Option<String>, IndexError> {
        for (path, json) in self.frontmatter_rows()? {
            let Ok(value) = serde_json::from_str::<serde_json::Value>(&json) else {
                continue;
            };
            if json_field_holds(&value, uid_key, uid) {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }
}

fn json_field_holds(frontmatter: &serde_json::Value, key: &str, expected: &str) -> bool {
    match frontmatter.get(key) {
        Some(serde_json::Value::Array(items)) => {
            items.iter().any(|item| json_scalar_eq(item, expected))
        }
        Some(value) => json_scalar_eq(value, expected),
        None => false,
    }
}

fn json_scalar_eq(value: &serde_json::Value, expected: &str) -> bool {
    match value {
        serde_json::Value::String(s) => s == expected,
        serde_json::Value::Number(n) => n.to_string() == expected,
        _ => false,
    }
}

impl UidIndex for NoteIndex {
    fn path_for_uid(&self, uid_key: &str, uid: &str) -> Result<Option<String>, CapabilityError> {
        self.find_uid(uid_key, uid).map_err(|e| CapabilityError(e.to_string()))
    }
}

fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS notes (
            id INTEGER PRIMARY KEY,
            path TEXT NOT NULL UNIQUE,
            title TEXT,
            modified_at TEXT NOT NULL,
            frontmatter_json TEXT NOT NULL,
            content_hash TEXT NOT NULL
         );
         CREATE INDEX IF NOT EXISTS idx_notes_path ON notes(path);",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(path: &str, frontmatter_json: &str) -> IndexedNote {
        IndexedNote {
            path: path.to_string(),
            title: None,
            modified: "2026-08-26T00:00:00Z".to_string(),
            frontmatter_json: frontmatter_json.to_string(),
            content_hash: "h".to_string(),
        }
    }

    #[test]
    fn upsert_is_keyed_by_path() {
        let index = NoteIndex::open_in_memory().unwrap();
        index.upsert(&note("a.md", "{}")).unwrap();
        index.upsert(&note("a.md", r#"{"uid":"x"}"#)).unwrap();
        assert_eq!(index.note_count().unwrap(), 1);
    }

    #[test]
    fn find_uid_matches_scalar_field() {
        let index = NoteIndex::open_in_memory().unwrap();
        index.upsert(&note("a.md", r#"{"uid":"20260826"}"#)).unwrap();
        index.upsert(&note("b.md", r#"{"uid":"other"}"#)).unwrap();

        assert_eq!(index.find_uid("uid", "20260826").unwrap().as_deref(), Some("a.md"));
        assert_eq!(index.find_uid("uid", "missing").unwrap(), None);
    }

    #[test]
    fn find_uid_matches_sequence_and_numbers() {
        let index = NoteIndex::open_in_memory().unwrap();
        index.upsert(&note("a.md", r#"{"uid":["x","y"]}"#)).unwrap();
        index.upsert(&note("b.md", r#"{"uid":42}"#)).unwrap();

        assert_eq!(index.find_uid("uid", "y").unwrap().as_deref(), Some("a.md"));
        assert_eq!(index.find_uid("uid", "42").unwrap().as_deref(), Some("b.md"));
    }

    #[test]
    fn open_reports_the_directory_when_it_cannot_be_created() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = NoteIndex::open(&blocker.join("index.sqlite")).unwrap_err();
        match err {
            IndexError::CreateDir { path, .. } => {
                assert_eq!(path, blocker.display().to_string());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn remove_deletes_the_row() {
        let index = NoteIndex::open_in_memory().unwrap();
        index.upsert(&note("a.md", "{}")).unwrap();
        index.remove("a.md").unwrap();
        assert!(index.all_paths().unwrap().is_empty());
    }
}
