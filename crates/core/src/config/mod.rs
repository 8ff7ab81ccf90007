//! TOML configuration: vault registry, periodic-note formats, delays,
//! security policy, logging.

pub mod loader;
pub mod types;

pub use loader::{ConfigError, ConfigLoader, default_config_path};
pub use types::{LoggingConfig, ResolvedConfig, ResolvedVault, SecurityPolicy};
