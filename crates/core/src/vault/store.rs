//! Filesystem implementation of the note store capability.

use std::fs;
use std::path::{Component, Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

use crate::host::{NoteStore, StoreError};

/// Folder trashed entries move into, relative to the vault root. Hidden,
/// so walkers and listings never see it.
pub const TRASH_FOLDER: &str = ".trash";

/// Note store over one vault root on disk. Paths are vault-relative and
/// `/`-separated.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: &Path) -> Result<Self, StoreError> {
        let root = root.canonicalize().map_err(|e| StoreError::Io {
            path: root.display().to_string(),
            source: e,
        })?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a vault-relative path to an absolute one, refusing anything
    /// that could step outside the root.
    fn resolve(&self, path: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(path.trim_end_matches('/'));
        let escapes = relative.components().any(|c| {
            matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_))
        });
        if escapes {
            return Err(StoreError::OutsideRoot(path.to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn io(path: &str, source: std::io::Error) -> StoreError {
        StoreError::Io { path: path.to_string(), source }
    }

    fn relative_display(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn list(&self, want_dirs: bool) -> Result<Vec<String>, StoreError> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        {
            let entry =
                entry.map_err(|e| StoreError::OutsideRoot(format!("walk failed: {e}")))?;
            if entry.depth() == 0 {
                continue;
            }
            let is_dir = entry.file_type().is_dir();
            if is_dir == want_dirs && (want_dirs || entry.file_type().is_file()) {
                entries.push(self.relative_display(entry.path()));
            }
        }
        entries.sort();
        Ok(entries)
    }
}

impl NoteStore for FsStore {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok_and(|p| p.is_file())
    }

    fn folder_exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok_and(|p| p.is_dir())
    }

    fn read(&self, path: &str) -> Result<String, StoreError> {
        let absolute = self.resolve(path)?;
        if !absolute.is_file() {
            return Err(StoreError::NotFound(path.to_string()));
        }
        fs::read_to_string(&absolute).map_err(|e| Self::io(path, e))
    }

    fn write(&self, path: &str, content: &str) -> Result<(), StoreError> {
        let absolute = self.resolve(path)?;
        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent).map_err(|e| Self::io(path, e))?;
        }
        fs::write(&absolute, content).map_err(|e| Self::io(path, e))
    }

    fn delete(&self, path: &str) -> Result<(), StoreError> {
        let absolute = self.resolve(path)?;
        if !absolute.is_file() {
            return Err(StoreError::NotFound(path.to_string()));
        }
        fs::remove_file(&absolute).map_err(|e| Self::io(path, e))
    }

    fn trash(&self, path: &str) -> Result<(), StoreError> {
        let absolute = self.resolve(path)?;
        if !absolute.is_file() {
            return Err(StoreError::NotFound(path.to_string()));
        }
        let target = self.root.join(TRASH_FOLDER).join(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| Self::io(path, e))?;
        }
        fs::rename(&absolute, &target).map_err(|e| Self::io(path, e))
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), StoreError> {
        let source = self.resolve(from)?;
        if !source.is_file() {
            return Err(StoreError::NotFound(from.to_string()));
        }
        let target = self.resolve(to)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| Self::io(to, e))?;
        }
        fs::rename(&source, &target).map_err(|e| Self::io(from, e))
    }

    fn create_folder(&self, path: &str) -> Result<(), StoreError> {
        let absolute = self.resolve(path)?;
        fs::create_dir_all(&absolute).map_err(|e| Self::io(path, e))
    }

    fn delete_folder(&self, path: &str) -> Result<(), StoreError> {
        let absolute = self.resolve(path)?;
        if !absolute.is_dir() {
            return Err(StoreError::NotFound(path.to_string()));
        }
        fs::remove_dir_all(&absolute).map_err(|e| Self::io(path, e))
    }

    fn trash_folder(&self, path: &str) -> Result<(), StoreError> {
        let absolute = self.resolve(path)?;
        if !absolute.is_dir() {
            return Err(StoreError::NotFound(path.to_string()));
        }
        let target = self.root.join(TRASH_FOLDER).join(path.trim_end_matches('/'));
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| Self::io(path, e))?;
        }
        fs::rename(&absolute, &target).map_err(|e| Self::io(path, e))
    }

    fn rename_folder(&self, from: &str, to: &str) -> Result<(), StoreError> {
        let source = self.resolve(from)?;
        if !source.is_dir() {
            return Err(StoreError::NotFound(from.to_string()));
        }
        let target = self.resolve(to)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| Self::io(to, e))?;
        }
        fs::rename(&source, &target).map_err(|e| Self::io(from, e))
    }

    fn list_files(&self) -> Result<Vec<String>, StoreError> {
        self.list(false)
    }

    fn list_folders(&self) -> Result<Vec<String>, StoreError> {
        self.list(true)
    }

    /// Numbered-rename policy: `test.md` yields `test 1.md`; when numbered
    /// siblings exist, the highest suffix plus one.
    fn available_path(&self, path: &str) -> String {
        if !self.exists(path) {
            return path.to_string();
        }

        let (dir, file) = match path.rsplit_once('/') {
            Some((dir, file)) => (dir, file),
            None => ("", path),
        };
        let (stem, extension) = match file.rsplit_once('.') {
            Some((stem, ext)) => (stem, ext),
            None => (file, ""),
        };

        let pattern = format!(
            "^{} (\\d+)\\.{}$",
            regex::escape(stem),
            regex::escape(extension)
        );
        let highest = Regex::new(&pattern)
            .ok()
            .and_then(|re| {
                let absolute_dir = self.resolve(dir).ok()?;
                let entries = fs::read_dir(absolute_dir).ok()?;
                entries
                    .filter_map(Result::ok)
                    .filter_map(|entry| {
                        let name = entry.file_name();
                        let name = name.to_string_lossy();
                        re.captures(&name)?.get(1)?.as_str().parse::<u64>().ok()
                    })
                    .max()
            })
            .unwrap_or(0);

        let numbered = format!("{stem} {}.{extension}", highest + 1);
        if dir.is_empty() { numbered } else { format!("{dir}/{numbered}") }
    }
}
