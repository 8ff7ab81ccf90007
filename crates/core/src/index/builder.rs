//! Index refresh from the vault walker.

use std::collections::HashSet;
use std::fs;
use std::hash::{DefaultHasher, Hash, Hasher};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::frontmatter;
use crate::vault::walker::{VaultWalker, VaultWalkerError};

use super::db::{IndexError, IndexedNote, NoteIndex};

#[derive(Debug, Error)]
pub enum IndexBuildError {
    #[error(transparent)]
    Walk(#[from] VaultWalkerError),

    #[error(transparent)]
    Db(#[from] IndexError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshStats {
    pub indexed: usize,
    pub removed: usize,
}

/// Bring the index up to date with the files on disk. Unchanged files
/// (same content hash) are skipped; rows for deleted files are dropped.
pub fn refresh(index: &NoteIndex, walker: &VaultWalker) -> Result<RefreshStats, IndexBuildError> {
    let mut stats = RefreshStats::default();
    let mut seen = HashSet::new();

    for file in walker.walk()? {
        let path = file.relative_path.to_string_lossy().replace('\\', "/");
        seen.insert(path.clone());

        let content = fs::read_to_string(&file.absolute_path).map_err(|e| {
            IndexBuildError::Io { path: path.clone(), source: e }
        })?;

        let hash = content_hash(&content);
        if index.content_hash(&path)?.as_deref() == Some(hash.as_str()) {
            continue;
        }

        let parsed = frontmatter::parse(&content).ok();
        let frontmatter_json = parsed
            .as_ref()
            .and_then(|doc| doc.frontmatter.as_ref())
            .map_or_else(|| "{}".to_string(), |fm| frontmatter::fields_to_json(fm).to_string());

        index.upsert(&IndexedNote {
            title: title_of(&content, &path),
            modified: DateTime::<Utc>::from(file.modified).to_rfc3339(),
            path,
            frontmatter_json,
            content_hash: hash,
        })?;
        stats.indexed += 1;
    }

    for stale in index.all_paths()? {
        if !seen.contains(&stale) {
            index.remove(&stale)?;
            stats.removed += 1;
        }
    }

    debug!(indexed = stats.indexed, removed = stats.removed, "index refreshed");
    Ok(stats)
}

fn content_hash(content: &str) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// First level-one heading, falling back to the file stem.
fn title_of(content: &str, path: &str) -> Option<String> {
    content
        .lines()
        .find_map(|line| line.strip_prefix("# ").map(|t| t.trim().to_string()))
        .or_else(|| {
            path.rsplit('/').next().and_then(|name| {
                name.strip_suffix(".md").map(ToString::to_string)
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn refresh_indexes_new_files_and_drops_deleted_ones() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), "---\nuid: x\n---\n# Alpha\n").unwrap();
        fs::write(dir.path().join("b.md"), "# Beta\n").unwrap();

        let walker = VaultWalker::new(dir.path()).unwrap();
        let index = NoteIndex::open_in_memory().unwrap();

        let stats = refresh(&index, &walker).unwrap();
        assert_eq!(stats, RefreshStats { indexed: 2, removed: 0 });
        assert_eq!(index.find_uid("uid", "x").unwrap().as_deref(), Some("a.md"));

        fs::remove_file(dir.path().join("a.md")).unwrap();
        let stats = refresh(&index, &walker).unwrap();
        assert_eq!(stats.removed, 1);
        assert_eq!(index.find_uid("uid", "x").unwrap(), None);
    }

    #[test]
    fn refresh_skips_unchanged_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), "# Alpha\n").unwrap();

        let walker = VaultWalker::new(dir.path()).unwrap();
        let index = NoteIndex::open_in_memory().unwrap();

        assert_eq!(refresh(&index, &walker).unwrap().indexed, 1);
        assert_eq!(refresh(&index, &walker).unwrap().indexed, 0);
    }

    #[test]
    fn title_prefers_first_heading() {
        assert_eq!(title_of("# Hello\nbody", "x.md").as_deref(), Some("Hello"));
        assert_eq!(title_of("no heading", "notes/x.md").as_deref(), Some("x"));
    }
}
