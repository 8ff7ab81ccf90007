//! Terminal implementations of the core capability traits.
//!
//! A graphical host would open documents and show toasts; in a terminal the
//! equivalents are spawning `$EDITOR`, printing, and writing to stderr.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use tracing::warn;

use mduri_core::host::{
    CallbackTransport, CapabilityError, CommandInfo, CommandRunner, Notices, SearchProvider,
    Workspace,
};
use mduri_core::search::Rows;

/// Notices land on stderr, already branded by the dispatcher.
pub struct TerminalNotices;

impl Notices for TerminalNotices {
    fn show(&self, message: &str) {
        eprintln!("{message}");
    }
}

/// The default transport: print the constructed URL instead of firing it,
/// so scripts can capture results from stdout.
pub struct PrintTransport;

impl CallbackTransport for PrintTransport {
    fn deliver(&self, url: &str) {
        println!("callback: {url}");
    }
}

/// HTTP delivery behind `--fire`. Failures are logged, never surfaced to
/// the caller; callbacks are fire-and-forget.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client })
    }
}

impl CallbackTransport for HttpTransport {
    fn deliver(&self, url: &str) {
        if let Err(e) = self.client.get(url).send() {
            warn!(%url, error = %e, "callback delivery failed");
        }
    }
}

/// Workspace over one vault root. Opening a note spawns `$EDITOR` when set
/// and prints the path otherwise; the other surfaces only print.
pub struct TerminalWorkspace {
    vault_root: PathBuf,
    config_path: PathBuf,
}

impl TerminalWorkspace {
    #[must_use]
    pub fn new(vault_root: PathBuf, config_path: PathBuf) -> Self {
        Self { vault_root, config_path }
    }
}

impl Workspace for TerminalWorkspace {
    fn open_note(&self, path: &str) -> Result<(), CapabilityError> {
        let absolute = self.vault_root.join(path);
        if let Ok(editor) = env::var("EDITOR") {
            let status = Command::new(&editor)
                .arg(&absolute)
                .status()
                .map_err(|e| CapabilityError(format!("failed to launch {editor}: {e}")))?;
            if !status.success() {
                return Err(CapabilityError(format!("{editor} exited with {status}")));
            }
        } else {
            println!("open: {}", absolute.display());
        }
        Ok(())
    }

    fn active_note(&self) -> Option<String> {
        env::var("MDURI_ACTIVE_NOTE").ok().filter(|v| !v.is_empty())
    }

    fn open_vault(&self) -> Result<(), CapabilityError> {
        println!("open: {}", self.vault_root.display());
        Ok(())
    }

    fn close_vault(&self) -> Result<(), CapabilityError> {
        println!("close: {}", self.vault_root.display());
        Ok(())
    }

    fn open_settings(&self) -> Result<(), CapabilityError> {
        println!("open: {}", self.config_path.display());
        Ok(())
    }

    fn open_search(&self, query: &str) -> Result<(), CapabilityError> {
        println!("search: {query}");
        Ok(())
    }
}

/// Shell-backed command runner over the `[commands]` config table, gated
/// by `security.allow_shell`.
pub struct ShellCommands {
    commands: HashMap<String, String>,
    allowed: bool,
}

impl ShellCommands {
    #[must_use]
    pub fn new(commands: HashMap<String, String>, allowed: bool) -> Self {
        Self { commands, allowed }
    }
}

impl CommandRunner for ShellCommands {
    fn available(&self) -> bool {
        self.allowed && !self.commands.is_empty()
    }

    fn list(&self) -> Vec<CommandInfo> {
        let mut infos: Vec<CommandInfo> = self
            .commands
            .iter()
            .map(|(id, line)| CommandInfo { id: id.clone(), name: line.clone() })
            .collect();
        infos.sort_by(|a, b| a.id.cmp(&b.id));
        infos
    }

    fn run(&self, id: &str) -> Result<(), CapabilityError> {
        let line = self
            .commands
            .get(id)
            .ok_or_else(|| CapabilityError(format!("unknown command: {id}")))?;
        let status = Command::new("sh")
            .arg("-c")
            .arg(line)
            .status()
            .map_err(|e| CapabilityError(format!("failed to run `{line}`: {e}")))?;
        if status.success() {
            Ok(())
        } else {
            Err(CapabilityError(format!("`{id}` exited with {status}")))
        }
    }
}

/// No external full-text engine is wired into the terminal host yet, so
/// the omnisearch namespace reports failed-dependency.
pub struct NoSearch;

impl SearchProvider for NoSearch {
    fn available(&self) -> bool {
        false
    }

    fn query(&self, _query: &str) -> Result<Rows, CapabilityError> {
        Err(CapabilityError("no search provider".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_commands_list_sorted_by_id() {
        let mut table = HashMap::new();
        table.insert("sync".to_string(), "git pull".to_string());
        table.insert("backup".to_string(), "tar cf backup.tar .".to_string());

        let runner = ShellCommands::new(table, true);
        assert!(runner.available());
        let ids: Vec<String> = runner.list().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["backup".to_string(), "sync".to_string()]);
    }

    #[test]
    fn shell_commands_unavailable_without_permission_or_table() {
        let mut table = HashMap::new();
        table.insert("sync".to_string(), "git pull".to_string());
        assert!(!ShellCommands::new(table, false).available());
        assert!(!ShellCommands::new(HashMap::new(), true).available());
    }
}
