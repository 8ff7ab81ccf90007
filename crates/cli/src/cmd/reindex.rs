//! The `reindex` command: bring one vault's metadata index up to date.

use std::path::Path;

use color_eyre::Result;
use color_eyre::eyre::eyre;

use mduri_core::config::ConfigLoader;
use mduri_core::index::{NoteIndex, index_path, refresh};
use mduri_core::vault::VaultWalker;

use crate::logging;

pub fn run(config: Option<&Path>, vault: Option<&str>) -> Result<()> {
    let cfg = ConfigLoader::load(config)?;
    logging::init(&cfg);

    let name = vault
        .map(ToString::to_string)
        .or_else(|| cfg.default_vault.clone())
        .ok_or_else(|| eyre!("no vault named and no default_vault is configured"))?;
    let vault = cfg.vault(&name).ok_or_else(|| eyre!("vault not found: {name}"))?;

    let index = NoteIndex::open(&index_path(&vault.root))?;
    let walker = VaultWalker::new(&vault.root)?;
    let stats = refresh(&index, &walker)?;

    println!("OK   reindex {name}");
    println!("root: {}", vault.root.display());
    println!("indexed: {}", stats.indexed);
    println!("removed: {}", stats.removed);
    Ok(())
}
