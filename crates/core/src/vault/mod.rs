//! Filesystem-backed vault: note store and markdown file discovery.

pub mod store;
pub mod walker;

pub use store::FsStore;
pub use walker::{VaultWalker, WalkedFile};
