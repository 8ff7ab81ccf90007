//! The `doctor` command: configuration sanity report.

use std::path::Path;
use std::process;

use color_eyre::Result;

use mduri_core::config::{ConfigLoader, ResolvedConfig, default_config_path};
use mduri_core::periodic::PeriodKind;

pub fn run(config: Option<&Path>) -> Result<()> {
    match ConfigLoader::load(config) {
        Ok(cfg) => {
            println!("OK   mdu doctor");
            print_report(&cfg);
            Ok(())
        }
        Err(e) => {
            println!("FAIL mdu doctor");
            println!("{e}");
            if config.is_none() {
                println!("looked for: {}", default_config_path().display());
            }
            process::exit(1);
        }
    }
}

fn print_report(cfg: &ResolvedConfig) {
    println!("config: {}", cfg.config_path.display());
    println!("default_vault: {}", cfg.default_vault.as_deref().unwrap_or("(none)"));
    println!("frontmatter.uid_key: {}", cfg.uid_key);
    println!("security.allow_shell: {}", cfg.security.allow_shell);
    println!("security.allow_http:  {}", cfg.security.allow_http);
    println!("commands: {}", cfg.commands.len());

    let mut names: Vec<&String> = cfg.vaults.keys().collect();
    names.sort();
    for name in names {
        let Some(vault) = cfg.vault(name) else { continue };
        let root_state = if vault.root.is_dir() { "" } else { "  (missing)" };
        println!("vault {name}:");
        println!("  root: {}{root_state}", vault.root.display());
        if let Some(ref templates) = vault.templates_dir {
            let state = if templates.is_dir() { "" } else { "  (missing)" };
            println!("  templates_dir: {}{state}", templates.display());
        }
        let kinds: Vec<&str> = PeriodKind::ALL
            .into_iter()
            .filter(|k| vault.periodic.enabled(*k))
            .map(PeriodKind::as_str)
            .collect();
        if !kinds.is_empty() {
            println!("  periodic: {}", kinds.join(", "));
        }
    }
}
