//! The `call` command: parse one request URI, dispatch it, report.

use std::path::Path;
use std::process;

use color_eyre::Result;
use tracing::debug;

use mduri_core::config::{ConfigLoader, ResolvedConfig, ResolvedVault};
use mduri_core::dispatch::{Dispatcher, OpenStep, ProcessingResult, reject};
use mduri_core::error::ErrorCode;
use mduri_core::host::{CallbackTransport, Capabilities, VaultIdentity};
use mduri_core::index::{NoteIndex, index_path, refresh};
use mduri_core::outcome::HandlerOutcome;
use mduri_core::routes::registry;
use mduri_core::template::FsTemplates;
use mduri_core::uri;
use mduri_core::vault::{FsStore, VaultWalker};

use crate::host::{
    HttpTransport, NoSearch, PrintTransport, ShellCommands, TerminalNotices, TerminalWorkspace,
};
use crate::logging;

pub fn run(config: Option<&Path>, raw_uri: &str, fire: bool) -> Result<()> {
    let cfg = ConfigLoader::load(config)?;
    logging::init(&cfg);

    let mut input = uri::parse(raw_uri)?;
    let transport = transport(&cfg, fire)?;

    // Vault selection happens before dispatch; the dispatcher can only
    // report errors it can see, so a bad vault is rejected here, over the
    // same transport a dispatched failure would use.
    let vault_name = match input.params.get("vault") {
        Some(name) if !name.is_empty() => name.clone(),
        _ => match &cfg.default_vault {
            Some(name) => {
                input.params.insert("vault".to_string(), name.clone());
                name.clone()
            }
            None => {
                reject(
                    &input,
                    ErrorCode::BadRequest,
                    "vault: required parameter missing and no default_vault is configured",
                    &TerminalNotices,
                    transport.as_ref(),
                );
                process::exit(1);
            }
        },
    };

    let Some(vault) = cfg.vault(&vault_name) else {
        reject(
            &input,
            ErrorCode::NotFound,
            &format!("vault not found: {vault_name}"),
            &TerminalNotices,
            transport.as_ref(),
        );
        process::exit(1);
    };

    let caps = capabilities(&cfg, vault, transport)?;
    let dispatcher = Dispatcher::new(registry()?, caps);
    let result = dispatcher.dispatch(input);
    report(&result);

    if result.outcome.is_success() {
        Ok(())
    } else {
        process::exit(1);
    }
}

fn transport(cfg: &ResolvedConfig, fire: bool) -> Result<Box<dyn CallbackTransport>> {
    if !fire {
        return Ok(Box::new(PrintTransport));
    }
    if cfg.security.allow_http {
        Ok(Box::new(HttpTransport::new()?))
    } else {
        eprintln!("security.allow_http is off; printing callbacks instead");
        Ok(Box::new(PrintTransport))
    }
}

fn capabilities(
    cfg: &ResolvedConfig,
    vault: &ResolvedVault,
    transport: Box<dyn CallbackTransport>,
) -> Result<Capabilities> {
    let store = FsStore::new(&vault.root)?;
    let index = NoteIndex::open(&index_path(&vault.root))?;
    let walker = VaultWalker::new(&vault.root)?;
    let stats = refresh(&index, &walker)?;
    debug!(indexed = stats.indexed, removed = stats.removed, "index refreshed before dispatch");

    Ok(Capabilities {
        vault: VaultIdentity { name: vault.name.clone(), root: vault.root.display().to_string() },
        store: Box::new(store),
        index: Box::new(index),
        workspace: Box::new(TerminalWorkspace::new(vault.root.clone(), cfg.config_path.clone())),
        notices: Box::new(TerminalNotices),
        transport,
        templates: Box::new(FsTemplates::new(vault.templates_dir.clone())),
        commands: Box::new(ShellCommands::new(cfg.commands.clone(), cfg.security.allow_shell)),
        search: Box::new(NoSearch),
        periodic: vault.periodic.clone(),
        uid_key: cfg.uid_key.clone(),
        delays: cfg.delays.clone(),
    })
}

fn report(result: &ProcessingResult) {
    let route = if result.input.route_path.is_empty() {
        "(root)"
    } else {
        result.input.route_path.as_str()
    };
    match &result.outcome {
        HandlerOutcome::Success { .. } => println!("OK   {route}"),
        HandlerOutcome::Failure { code, message } => println!("FAIL {route} ({code}: {message})"),
    }
    match &result.open {
        OpenStep::NotApplicable | OpenStep::Opened { .. } => {}
        OpenStep::Failed { path, message } => eprintln!("open failed for {path}: {message}"),
    }
}
