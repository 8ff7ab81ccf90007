use std::path::{Path, PathBuf};
use std::{env, fs};

use dirs::home_dir;
use shellexpand::full;
use thiserror::Error;

use crate::host::Delays;
use crate::periodic::{PeriodKind, PeriodicKindConfig, PeriodicSet};

use super::types::{ConfigFile, LoggingConfig, ResolvedConfig, ResolvedVault, VaultEntry};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found at {0}")]
    NotFound(String),

    #[error("failed to read config file {0}: {1}")]
    ReadError(String, #[source] std::io::Error),

    #[error("failed to parse TOML in {0}: {1}")]
    ParseError(String, #[source] toml::de::Error),

    #[error("version {0} is unsupported (expected 1)")]
    BadVersion(u32),

    #[error("no vaults defined in config")]
    NoVaults,

    #[error("unknown periodic note kind `{kind}` in vault `{vault}`")]
    UnknownPeriodKind { vault: String, kind: String },

    #[error("home directory not available to expand '~'")]
    NoHome,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(config_path: Option<&Path>) -> Result<ResolvedConfig, ConfigError> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => default_config_path(),
        };

        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let s = fs::read_to_string(&path)
            .map_err(|e| ConfigError::ReadError(path.display().to_string(), e))?;

        let cf: ConfigFile = toml::from_str(&s)
            .map_err(|e| ConfigError::ParseError(path.display().to_string(), e))?;

        if cf.version != 1 {
            return Err(ConfigError::BadVersion(cf.version));
        }
        if cf.vaults.is_empty() {
            return Err(ConfigError::NoVaults);
        }

        let mut vaults = std::collections::HashMap::new();
        for (name, entry) in &cf.vaults {
            vaults.insert(name.clone(), Self::resolve_vault(name, entry)?);
        }

        let logging = Self::resolve_logging(&cf.logging)?;

        Ok(ResolvedConfig {
            config_path: path,
            default_vault: cf.default_vault,
            vaults,
            uid_key: cf.frontmatter.uid_key,
            delays: Delays { settle_after_create_ms: cf.delays.settle_after_create_ms },
            security: cf.security,
            logging,
            commands: cf.commands,
        })
    }

    fn resolve_vault(name: &str, entry: &VaultEntry) -> Result<ResolvedVault, ConfigError> {
        let root = expand_path(&entry.root)?;
        let sub = |s: &str| s.replace("{{vault_root}}", &root.to_string_lossy());

        let templates_dir = match &entry.templates_dir {
            Some(dir) => Some(expand_path(&sub(dir))?),
            None => None,
        };

        let mut periodic = PeriodicSet::new();
        for (kind_name, kind_entry) in &entry.periodic {
            let kind = PeriodKind::parse(kind_name).ok_or_else(|| {
                ConfigError::UnknownPeriodKind {
                    vault: name.to_string(),
                    kind: kind_name.clone(),
                }
            })?;
            periodic = periodic.with(
                kind,
                PeriodicKindConfig {
                    folder: kind_entry.folder.clone(),
                    format: kind_entry.format.clone(),
                },
            );
        }

        Ok(ResolvedVault { name: name.to_string(), root, templates_dir, periodic })
    }

    fn resolve_logging(log_cfg: &LoggingConfig) -> Result<LoggingConfig, ConfigError> {
        if let Some(ref file) = log_cfg.file {
            let expanded = expand_path(&file.to_string_lossy())?;
            Ok(LoggingConfig {
                level: log_cfg.level.clone(),
                file_level: log_cfg.file_level.clone(),
                file: Some(expanded),
            })
        } else {
            Ok(log_cfg.clone())
        }
    }
}

pub fn default_config_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join("mduri").join("config.toml");
    }
    let home = home_dir().unwrap_or_else(|| PathBuf::from("~"));
    home.join(".config").join("mduri").join("config.toml")
}

fn expand_path(input: &str) -> Result<PathBuf, ConfigError> {
    let expanded = full(input).map_err(|_| ConfigError::NoHome)?;
    Ok(PathBuf::from(expanded.to_string()))
}
