//! Capability traits the core needs from its host environment.
//!
//! The dispatcher and every handler receive one [`Capabilities`] bundle at
//! construction time instead of reaching a process-wide accessor, so any
//! collaborator can be swapped for a fake in tests.

use thiserror::Error;

use crate::periodic::PeriodicSet;
use crate::search::Rows;
use crate::targeting::VaultResolver;
use crate::template::{TemplateContext, TemplateError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("path escapes the vault root: {0}")]
    OutsideRoot(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Opaque failure from a host collaborator.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct CapabilityError(pub String);

/// The document storage backend. Paths are vault-relative, `/`-separated,
/// already sanitized by the parameter validator.
pub trait NoteStore {
    fn exists(&self, path: &str) -> bool;
    fn folder_exists(&self, path: &str) -> bool;
    fn read(&self, path: &str) -> Result<String, StoreError>;
    /// Write `content` to `path`, creating parent folders as needed.
    fn write(&self, path: &str, content: &str) -> Result<(), StoreError>;
    fn delete(&self, path: &str) -> Result<(), StoreError>;
    fn trash(&self, path: &str) -> Result<(), StoreError>;
    fn rename(&self, from: &str, to: &str) -> Result<(), StoreError>;
    fn create_folder(&self, path: &str) -> Result<(), StoreError>;
    fn delete_folder(&self, path: &str) -> Result<(), StoreError>;
    fn trash_folder(&self, path: &str) -> Result<(), StoreError>;
    fn rename_folder(&self, from: &str, to: &str) -> Result<(), StoreError>;
    fn list_files(&self) -> Result<Vec<String>, StoreError>;
    fn list_folders(&self) -> Result<Vec<String>, StoreError>;
    /// A path not currently taken, following the numbered-rename policy:
    /// the highest existing ` N` suffix plus one.
    fn available_path(&self, path: &str) -> String;
}

/// Lookup of a note by its frontmatter unique-id field.
pub trait UidIndex {
    fn path_for_uid(&self, uid_key: &str, uid: &str) -> Result<Option<String>, CapabilityError>;
}

/// Local UI notices. Messages arrive already branded.
pub trait Notices {
    fn show(&self, message: &str);
}

/// Fire-and-forget delivery of a constructed callback URL.
pub trait CallbackTransport {
    fn deliver(&self, url: &str);
}

/// The interactive surface of the host: opening and focusing documents.
pub trait Workspace {
    fn open_note(&self, path: &str) -> Result<(), CapabilityError>;
    /// The note currently focused in the host, if any.
    fn active_note(&self) -> Option<String>;
    fn open_vault(&self) -> Result<(), CapabilityError>;
    fn close_vault(&self) -> Result<(), CapabilityError>;
    fn open_settings(&self) -> Result<(), CapabilityError>;
    fn open_search(&self, query: &str) -> Result<(), CapabilityError>;
}

pub trait TemplateProvider {
    fn available(&self) -> bool;
    fn render(&self, name: &str, ctx: &TemplateContext) -> Result<String, TemplateError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInfo {
    pub id: String,
    pub name: String,
}

/// Runner for host-registered commands (`command/list`, `command/execute`).
pub trait CommandRunner {
    fn available(&self) -> bool;
    fn list(&self) -> Vec<CommandInfo>;
    fn run(&self, id: &str) -> Result<(), CapabilityError>;
}

/// Optional external full-text search provider (the omnisearch namespace).
pub trait SearchProvider {
    fn available(&self) -> bool;
    fn query(&self, query: &str) -> Result<Rows, CapabilityError>;
}

/// Named wait constants. The settle delay after template-driven note
/// creation is a known race-condition workaround for cooperating features
/// that react to file creation asynchronously, not a correctness guarantee.
#[derive(Debug, Clone)]
pub struct Delays {
    pub settle_after_create_ms: u64,
}

impl Default for Delays {
    fn default() -> Self {
        Self { settle_after_create_ms: 200 }
    }
}

#[derive(Debug, Clone)]
pub struct VaultIdentity {
    pub name: String,
    pub root: String,
}

/// Everything a dispatched call may touch, injected once at startup.
pub struct Capabilities {
    pub vault: VaultIdentity,
    pub store: Box<dyn NoteStore>,
    pub index: Box<dyn UidIndex>,
    pub workspace: Box<dyn Workspace>,
    pub notices: Box<dyn Notices>,
    pub transport: Box<dyn CallbackTransport>,
    pub templates: Box<dyn TemplateProvider>,
    pub commands: Box<dyn CommandRunner>,
    pub search: Box<dyn SearchProvider>,
    pub periodic: PeriodicSet,
    pub uid_key: String,
    pub delays: Delays,
}

impl Capabilities {
    /// The note targeting resolver over this bundle.
    #[must_use]
    pub fn resolver(&self) -> VaultResolver<'_> {
        VaultResolver {
            store: self.store.as_ref(),
            index: self.index.as_ref(),
            periodic: &self.periodic,
            uid_key: &self.uid_key,
        }
    }
}
