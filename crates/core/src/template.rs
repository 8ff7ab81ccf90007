//! Template lookup and `{{var}}` rendering for `note/create?template=`.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::host::TemplateProvider;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("no templates directory is configured")]
    NotConfigured,

    #[error("template not found: {0}")]
    NotFound(String),

    #[error("failed to read template {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Variables available to a template at render time.
#[derive(Debug, Clone)]
pub struct TemplateContext {
    pub vault: String,
    pub now: DateTime<Local>,
}

impl TemplateContext {
    #[must_use]
    pub fn new(vault: impl Into<String>) -> Self {
        Self { vault: vault.into(), now: Local::now() }
    }
}

/// Filesystem-backed template provider. A vault without a configured
/// templates directory reports unavailable.
#[derive(Debug, Clone, Default)]
pub struct FsTemplates {
    dir: Option<PathBuf>,
}

impl FsTemplates {
    #[must_use]
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }
}

impl TemplateProvider for FsTemplates {
    fn available(&self) -> bool {
        self.dir.as_ref().is_some_and(|d| d.is_dir())
    }

    fn render(&self, name: &str, ctx: &TemplateContext) -> Result<String, TemplateError> {
        let dir = self.dir.as_ref().ok_or(TemplateError::NotConfigured)?;
        let mut path = dir.join(name);
        if path.extension().is_none() {
            path.set_extension("md");
        }
        if !path.is_file() {
            return Err(TemplateError::NotFound(name.to_string()));
        }
        let raw = fs::read_to_string(&path)
            .map_err(|e| TemplateError::Io { path: path.display().to_string(), source: e })?;
        Ok(render(&raw, ctx))
    }
}

/// Substitute the known `{{var}}` placeholders. Unknown placeholders are
/// left untouched so the result stays inspectable.
#[must_use]
pub fn render(input: &str, ctx: &TemplateContext) -> String {
    input
        .replace("{{date}}", &ctx.now.format("%Y-%m-%d").to_string())
        .replace("{{time}}", &ctx.now.format("%H:%M").to_string())
        .replace("{{datetime}}", &ctx.now.format("%Y-%m-%d %H:%M").to_string())
        .replace("{{vault}}", &ctx.vault)
}
