//! Vault metadata index backing uid targeting and reindexing.

pub mod builder;
pub mod db;

pub use builder::{IndexBuildError, RefreshStats, refresh};
pub use db::{IndexError, IndexedNote, NoteIndex};

use std::path::{Path, PathBuf};

/// Location of the index database, relative to the vault root. Hidden, so
/// walkers and listings never see it.
#[must_use]
pub fn index_path(vault_root: &Path) -> PathBuf {
    vault_root.join(".mduri").join("index.sqlite")
}
