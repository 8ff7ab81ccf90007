//! The `file` namespace: operations on arbitrary vault files.
//!
//! Unlike `note`, these routes take a raw `file` path parameter (any
//! extension) instead of the note targeting triple.

use crate::error::ErrorCode;
use crate::host::Capabilities;
use crate::outcome::HandlerOutcome;
use crate::params::{FieldKind, ParamSchema, Params, required};

use super::{Namespace, store_failure};

pub(super) fn namespace() -> Namespace {
    Namespace::new("file")
        .route("list", ParamSchema::read(), list)
        .route("get-active", ParamSchema::read(), get_active)
        .route(
            "open",
            ParamSchema::new().field(required("file", FieldKind::FilePath)).silent_forced(),
            open,
        )
        .route("delete", file_schema(), delete)
        .route("trash", file_schema(), trash)
        .route(
            "rename",
            file_schema().field(required("new-filename", FieldKind::FilePath)).silent(),
            rename,
        )
}

fn file_schema() -> ParamSchema {
    ParamSchema::new().field(required("file", FieldKind::FilePath))
}

fn list(caps: &Capabilities, _params: &Params) -> HandlerOutcome {
    match caps.store.list_files() {
        Ok(files) => HandlerOutcome::success().with("files", files),
        Err(e) => store_failure(&e),
    }
}

fn get_active(caps: &Capabilities, _params: &Params) -> HandlerOutcome {
    match caps.workspace.active_note() {
        Some(path) => HandlerOutcome::success().with("filepath", path),
        None => HandlerOutcome::failure(ErrorCode::NotAllowed, "no file is currently active"),
    }
}

fn open(caps: &Capabilities, params: &Params) -> HandlerOutcome {
    match existing(caps, params) {
        Ok(path) => HandlerOutcome::success().with("filepath", path.clone()).processed(path),
        Err(outcome) => outcome,
    }
}

fn delete(caps: &Capabilities, params: &Params) -> HandlerOutcome {
    let path = match existing(caps, params) {
        Ok(path) => path,
        Err(outcome) => return outcome,
    };
    match caps.store.delete(&path) {
        Ok(()) => HandlerOutcome::success().with("filepath", path),
        Err(e) => store_failure(&e),
    }
}

fn trash(caps: &Capabilities, params: &Params) -> HandlerOutcome {
    let path = match existing(caps, params) {
        Ok(path) => path,
        Err(outcome) => return outcome,
    };
    match caps.store.trash(&path) {
        Ok(()) => HandlerOutcome::success().with("filepath", path),
        Err(e) => store_failure(&e),
    }
}

fn rename(caps: &Capabilities, params: &Params) -> HandlerOutcome {
    let path = match existing(caps, params) {
        Ok(path) => path,
        Err(outcome) => return outcome,
    };
    let Some(new_path) = params.str("new-filename") else {
        return HandlerOutcome::failure(
            ErrorCode::HandlerError,
            "missing `new-filename` after validation",
        );
    };
    match caps.store.rename(&path, new_path) {
        Ok(()) => HandlerOutcome::success().with("filepath", new_path).processed(new_path),
        Err(e) => store_failure(&e),
    }
}

fn existing(caps: &Capabilities, params: &Params) -> Result<String, HandlerOutcome> {
    let Some(path) = params.str("file") else {
        return Err(HandlerOutcome::failure(
            ErrorCode::HandlerError,
            "missing `file` after validation",
        ));
    };
    if !caps.store.exists(path) {
        return Err(HandlerOutcome::failure(
            ErrorCode::NotFound,
            format!("file not found: {path}"),
        ));
    }
    Ok(path.to_string())
}
