use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::host::Delays;
use crate::periodic::PeriodicSet;

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub version: u32,
    pub default_vault: Option<String>,
    pub vaults: HashMap<String, VaultEntry>,
    #[serde(default)]
    pub frontmatter: FrontmatterConfig,
    #[serde(default)]
    pub delays: DelaysConfig,
    #[serde(default)]
    pub security: SecurityPolicy,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Host commands runnable through `command/execute`, id to shell line.
    #[serde(default)]
    pub commands: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct VaultEntry {
    pub root: String,
    /// Optional; a vault without one has no template provider.
    pub templates_dir: Option<String>,
    /// Enabled periodic-note kinds, keyed `daily`/`weekly`/... .
    #[serde(default)]
    pub periodic: HashMap<String, PeriodicEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PeriodicEntry {
    pub folder: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FrontmatterConfig {
    #[serde(default = "default_uid_key")]
    pub uid_key: String,
}

impl Default for FrontmatterConfig {
    fn default() -> Self {
        Self { uid_key: default_uid_key() }
    }
}

fn default_uid_key() -> String {
    "uid".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DelaysConfig {
    #[serde(default = "default_settle_ms")]
    pub settle_after_create_ms: u64,
}

impl Default for DelaysConfig {
    fn default() -> Self {
        Self { settle_after_create_ms: default_settle_ms() }
    }
}

fn default_settle_ms() -> u64 {
    200
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct SecurityPolicy {
    #[serde(default)]
    pub allow_shell: bool,
    #[serde(default)]
    pub allow_http: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_level: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file_level: None, file: None }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// One vault with every path expanded.
#[derive(Debug, Clone)]
pub struct ResolvedVault {
    pub name: String,
    pub root: PathBuf,
    pub templates_dir: Option<PathBuf>,
    pub periodic: PeriodicSet,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config_path: PathBuf,
    pub default_vault: Option<String>,
    pub vaults: HashMap<String, ResolvedVault>,
    pub uid_key: String,
    pub delays: Delays,
    pub security: SecurityPolicy,
    pub logging: LoggingConfig,
    pub commands: HashMap<String, String>,
}

impl ResolvedConfig {
    #[must_use]
    pub fn vault(&self, name: &str) -> Option<&ResolvedVault> {
        self.vaults.get(name)
    }
}
