//! The `note` namespace: reading, creating, and editing markdown notes.
//!
//! The creation and editing helpers are shared with the periodic-note
//! namespaces, which resolve their path from the calendar instead of a
//! targeting parameter.

use std::thread;
use std::time::Duration;

use regex::Regex;

use crate::error::ErrorCode;
use crate::frontmatter;
use crate::host::Capabilities;
use crate::markdown::{self, InsertPosition, MarkdownError};
use crate::outcome::HandlerOutcome;
use crate::params::{FieldKind, ParamSchema, Params, TargetingMode, optional, required};
use crate::template::{TemplateContext, TemplateError};

use super::{Namespace, resolved_target, store_failure};

/// Fixed success message when a search-and-replace pattern matched nothing.
pub(crate) const NOTHING_REPLACED: &str = "Search pattern not found, nothing replaced";

pub(super) fn namespace() -> Namespace {
    Namespace::new("note")
        .route("get", ParamSchema::read().targeting(TargetingMode::Soft).silent(), get)
        .route(
            "open",
            ParamSchema::new().targeting(TargetingMode::Strict).silent_forced(),
            open,
        )
        .route("create", create_schema(), create)
        .route("append", edit_schema(), append)
        .route("prepend", edit_schema(), prepend)
        .route("delete", ParamSchema::new().targeting(TargetingMode::Strict), delete)
        .route("trash", ParamSchema::new().targeting(TargetingMode::Strict), trash)
        .route(
            "rename",
            ParamSchema::new()
                .targeting(TargetingMode::Strict)
                .field(required("new-filename", FieldKind::NotePath))
                .silent(),
            rename,
        )
        .route("search-string-and-replace", replace_schema(), search_string_and_replace)
        .route("search-regex-and-replace", replace_schema(), search_regex_and_replace)
}

pub(crate) fn create_schema() -> ParamSchema {
    ParamSchema::new()
        .field(required("file", FieldKind::NotePath))
        .field(optional("content", FieldKind::Text))
        .field(optional("template", FieldKind::Text))
        .field(optional("if-exists", FieldKind::Choice(&["overwrite", "skip", ""])).or(""))
        .exclusive("content", "template")
        .silent()
}

pub(crate) fn periodic_create_schema() -> ParamSchema {
    ParamSchema::new()
        .field(optional("content", FieldKind::Text))
        .field(optional("template", FieldKind::Text))
        .field(optional("if-exists", FieldKind::Choice(&["overwrite", "skip", ""])).or(""))
        .exclusive("content", "template")
        .silent()
}

fn edit_schema() -> ParamSchema {
    edit_fields(ParamSchema::new().targeting(TargetingMode::Soft))
}

pub(crate) fn periodic_edit_schema() -> ParamSchema {
    edit_fields(ParamSchema::new())
}

fn edit_fields(schema: ParamSchema) -> ParamSchema {
    schema
        .field(required("content", FieldKind::Text))
        .field(optional("below-headline", FieldKind::Text))
        .field(optional("ensure-newline", FieldKind::MercifulBool))
        .field(optional("create-if-needed", FieldKind::MercifulBool))
        .silent()
}

fn replace_schema() -> ParamSchema {
    ParamSchema::new()
        .targeting(TargetingMode::Strict)
        .field(required("search", FieldKind::NonEmptyText))
        .field(required("replace", FieldKind::Text))
        .silent()
}

pub(crate) fn periodic_replace_schema() -> ParamSchema {
    ParamSchema::new()
        .field(required("search", FieldKind::NonEmptyText))
        .field(required("replace", FieldKind::Text))
        .silent()
}

fn get(caps: &Capabilities, params: &Params) -> HandlerOutcome {
    let target = match resolved_target(params) {
        Ok(target) => target,
        Err(outcome) => return outcome,
    };
    if !target.exists {
        return HandlerOutcome::failure(
            ErrorCode::NotFound,
            format!("note not found: {}", target.path),
        );
    }
    read_outcome(caps, &target.path)
}

fn open(_caps: &Capabilities, params: &Params) -> HandlerOutcome {
    let target = match resolved_target(params) {
        Ok(target) => target,
        Err(outcome) => return outcome,
    };
    HandlerOutcome::success().with("filepath", target.path.clone()).processed(target.path)
}

fn create(caps: &Capabilities, params: &Params) -> HandlerOutcome {
    let Some(path) = params.str("file") else {
        return HandlerOutcome::failure(ErrorCode::HandlerError, "missing `file` after validation");
    };
    create_at(caps, path, params)
}

fn append(caps: &Capabilities, params: &Params) -> HandlerOutcome {
    let target = match resolved_target(params) {
        Ok(target) => target,
        Err(outcome) => return outcome,
    };
    edit_at(caps, &target.path, target.exists, params, EditMode::Append)
}

fn prepend(caps: &Capabilities, params: &Params) -> HandlerOutcome {
    let target = match resolved_target(params) {
        Ok(target) => target,
        Err(outcome) => return outcome,
    };
    edit_at(caps, &target.path, target.exists, params, EditMode::Prepend)
}

fn delete(caps: &Capabilities, params: &Params) -> HandlerOutcome {
    let target = match resolved_target(params) {
        Ok(target) => target,
        Err(outcome) => return outcome,
    };
    match caps.store.delete(&target.path) {
        Ok(()) => HandlerOutcome::success().with("filepath", target.path),
        Err(e) => store_failure(&e),
    }
}

fn trash(caps: &Capabilities, params: &Params) -> HandlerOutcome {
    let target = match resolved_target(params) {
        Ok(target) => target,
        Err(outcome) => return outcome,
    };
    match caps.store.trash(&target.path) {
        Ok(()) => HandlerOutcome::success().with("filepath", target.path),
        Err(e) => store_failure(&e),
    }
}

fn rename(caps: &Capabilities, params: &Params) -> HandlerOutcome {
    let target = match resolved_target(params) {
        Ok(target) => target,
        Err(outcome) => return outcome,
    };
    let Some(new_path) = params.str("new-filename") else {
        return HandlerOutcome::failure(
            ErrorCode::HandlerError,
            "missing `new-filename` after validation",
        );
    };
    match caps.store.rename(&target.path, new_path) {
        Ok(()) => HandlerOutcome::success().with("filepath", new_path).processed(new_path),
        Err(e) => store_failure(&e),
    }
}

fn search_string_and_replace(caps: &Capabilities, params: &Params) -> HandlerOutcome {
    let target = match resolved_target(params) {
        Ok(target) => target,
        Err(outcome) => return outcome,
    };
    replace_at(caps, &target.path, params, PatternKind::Literal)
}

fn search_regex_and_replace(caps: &Capabilities, params: &Params) -> HandlerOutcome {
    let target = match resolved_target(params) {
        Ok(target) => target,
        Err(outcome) => return outcome,
    };
    replace_at(caps, &target.path, params, PatternKind::Regex)
}

/// Read a note into the standard four-key result record.
pub(crate) fn read_outcome(caps: &Capabilities, path: &str) -> HandlerOutcome {
    let content = match caps.store.read(path) {
        Ok(content) => content,
        Err(e) => return store_failure(&e),
    };
    let (body, front) = match frontmatter::parse(&content) {
        Ok(doc) => {
            let yaml = doc
                .frontmatter
                .as_ref()
                .map(frontmatter::frontmatter_to_yaml)
                .unwrap_or_default();
            (doc.body, yaml)
        }
        Err(_) => (content.clone(), String::new()),
    };
    HandlerOutcome::success()
        .with("body", body)
        .with("content", content)
        .with("filepath", path)
        .with("frontMatter", front)
        .processed(path)
}

/// Create a note at `path` honoring `if-exists`, `content`/`template`.
pub(crate) fn create_at(caps: &Capabilities, path: &str, params: &Params) -> HandlerOutcome {
    let from_template = params.str("template").is_some();
    let body = match initial_content(caps, params) {
        Ok(body) => body,
        Err(outcome) => return outcome,
    };

    let final_path = if caps.store.exists(path) {
        match params.str("if-exists").unwrap_or("") {
            "overwrite" => path.to_string(),
            "skip" => {
                return HandlerOutcome::success().with("filepath", path).processed(path);
            }
            _ => caps.store.available_path(path),
        }
    } else {
        path.to_string()
    };

    if let Err(e) = caps.store.write(&final_path, &body) {
        return store_failure(&e);
    }
    if from_template {
        // Cooperating features react to template-driven creation
        // asynchronously; give them a moment to settle before reporting.
        thread::sleep(Duration::from_millis(caps.delays.settle_after_create_ms));
    }
    HandlerOutcome::success().with("filepath", final_path.clone()).processed(final_path)
}

fn initial_content(caps: &Capabilities, params: &Params) -> Result<String, HandlerOutcome> {
    let Some(name) = params.str("template") else {
        return Ok(params.str("content").unwrap_or_default().to_string());
    };
    if !caps.templates.available() {
        return Err(HandlerOutcome::failure(
            ErrorCode::PreconditionFailed,
            "no templates directory is configured",
        ));
    }
    let ctx = TemplateContext::new(caps.vault.name.clone());
    caps.templates.render(name, &ctx).map_err(|e| {
        let code = match &e {
            TemplateError::NotFound(_) => ErrorCode::NotFound,
            TemplateError::NotConfigured => ErrorCode::PreconditionFailed,
            TemplateError::Io { .. } => ErrorCode::HandlerError,
        };
        HandlerOutcome::failure(code, e.to_string())
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EditMode {
    Append,
    Prepend,
}

/// Append or prepend `content` at `path`, optionally inside the section
/// below a headline.
pub(crate) fn edit_at(
    caps: &Capabilities,
    path: &str,
    exists: bool,
    params: &Params,
    mode: EditMode,
) -> HandlerOutcome {
    let Some(fragment) = params.str("content") else {
        return HandlerOutcome::failure(ErrorCode::HandlerError, "missing `content` after validation");
    };
    if !exists && !params.flag("create-if-needed") {
        return HandlerOutcome::failure(ErrorCode::NotFound, format!("note not found: {path}"));
    }

    let current = if exists {
        match caps.store.read(path) {
            Ok(content) => content,
            Err(e) => return store_failure(&e),
        }
    } else {
        String::new()
    };

    let ensure_newline = params.flag("ensure-newline");
    let updated = if let Some(headline) = params.str("below-headline") {
        let position = match mode {
            EditMode::Append => InsertPosition::End,
            EditMode::Prepend => InsertPosition::Begin,
        };
        match markdown::insert_below_headline(&current, headline, fragment, position) {
            Ok(updated) => updated,
            Err(MarkdownError::HeadlineNotFound(headline)) => {
                return HandlerOutcome::failure(
                    ErrorCode::NotFound,
                    format!("headline not found: {headline}"),
                );
            }
        }
    } else {
        match mode {
            EditMode::Append => append_text(&current, fragment, ensure_newline),
            EditMode::Prepend => prepend_text(&current, fragment, ensure_newline),
        }
    };

    match caps.store.write(path, &updated) {
        Ok(()) => HandlerOutcome::success().with("filepath", path).processed(path),
        Err(e) => store_failure(&e),
    }
}

fn append_text(current: &str, fragment: &str, ensure_newline: bool) -> String {
    let mut out = current.to_string();
    if ensure_newline && !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(fragment);
    if ensure_newline && !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Prepending keeps existing frontmatter on top; the fragment lands at the
/// start of the body.
fn prepend_text(current: &str, fragment: &str, ensure_newline: bool) -> String {
    let mut piece = fragment.to_string();
    if ensure_newline && !piece.ends_with('\n') {
        piece.push('\n');
    }
    match frontmatter::parse(current) {
        Ok(doc) if doc.frontmatter.is_some() => {
            let merged = frontmatter::ParsedDocument {
                frontmatter: doc.frontmatter,
                body: format!("{piece}{}", doc.body),
            };
            frontmatter::serialize(&merged)
        }
        _ => format!("{piece}{current}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PatternKind {
    Literal,
    Regex,
}

/// Search-and-replace inside an existing note. A pattern that matches
/// nothing is a success with a fixed message, not an error.
pub(crate) fn replace_at(
    caps: &Capabilities,
    path: &str,
    params: &Params,
    kind: PatternKind,
) -> HandlerOutcome {
    let (Some(search), Some(replacement)) = (params.str("search"), params.str("replace")) else {
        return HandlerOutcome::failure(
            ErrorCode::HandlerError,
            "missing `search`/`replace` after validation",
        );
    };
    let content = match caps.store.read(path) {
        Ok(content) => content,
        Err(e) => return store_failure(&e),
    };

    let updated = match kind {
        PatternKind::Literal => {
            if !content.contains(search) {
                return HandlerOutcome::success().with("message", NOTHING_REPLACED);
            }
            content.replace(search, replacement)
        }
        PatternKind::Regex => {
            let re = match Regex::new(search) {
                Ok(re) => re,
                Err(e) => {
                    return HandlerOutcome::failure(
                        ErrorCode::InvalidInput,
                        format!("invalid search pattern: {e}"),
                    );
                }
            };
            if !re.is_match(&content) {
                return HandlerOutcome::success().with("message", NOTHING_REPLACED);
            }
            re.replace_all(&content, replacement).into_owned()
        }
    };

    match caps.store.write(path, &updated) {
        Ok(()) => HandlerOutcome::success().with("filepath", path).processed(path),
        Err(e) => store_failure(&e),
    }
}
