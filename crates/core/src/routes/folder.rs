//! The `folder` namespace.

use crate::error::ErrorCode;
use crate::host::Capabilities;
use crate::outcome::HandlerOutcome;
use crate::params::{FieldKind, ParamSchema, Params, required};

use super::{Namespace, store_failure};

pub(super) fn namespace() -> Namespace {
    Namespace::new("folder")
        .route("list", ParamSchema::read(), list)
        .route("create", folder_schema(), create)
        .route(
            "rename",
            folder_schema().field(required("new-foldername", FieldKind::FolderPath)),
            rename,
        )
        .route("delete", folder_schema(), delete)
        .route("trash", folder_schema(), trash)
}

fn folder_schema() -> ParamSchema {
    ParamSchema::new().field(required("folder", FieldKind::FolderPath))
}

fn list(caps: &Capabilities, _params: &Params) -> HandlerOutcome {
    match caps.store.list_folders() {
        Ok(folders) => HandlerOutcome::success().with("folders", folders),
        Err(e) => store_failure(&e),
    }
}

fn create(caps: &Capabilities, params: &Params) -> HandlerOutcome {
    let Some(path) = params.str("folder") else {
        return missing_param();
    };
    match caps.store.create_folder(path) {
        Ok(()) => HandlerOutcome::success().with("folderpath", path),
        Err(e) => store_failure(&e),
    }
}

fn rename(caps: &Capabilities, params: &Params) -> HandlerOutcome {
    let (Some(path), Some(new_path)) = (params.str("folder"), params.str("new-foldername"))
    else {
        return missing_param();
    };
    if let Err(outcome) = require_exists(caps, path) {
        return outcome;
    }
    match caps.store.rename_folder(path, new_path) {
        Ok(()) => HandlerOutcome::success().with("folderpath", new_path),
        Err(e) => store_failure(&e),
    }
}

fn delete(caps: &Capabilities, params: &Params) -> HandlerOutcome {
    let Some(path) = params.str("folder") else {
        return missing_param();
    };
    if let Err(outcome) = require_exists(caps, path) {
        return outcome;
    }
    match caps.store.delete_folder(path) {
        Ok(()) => HandlerOutcome::success().with("folderpath", path),
        Err(e) => store_failure(&e),
    }
}

fn trash(caps: &Capabilities, params: &Params) -> HandlerOutcome {
    let Some(path) = params.str("folder") else {
        return missing_param();
    };
    if let Err(outcome) = require_exists(caps, path) {
        return outcome;
    }
    match caps.store.trash_folder(path) {
        Ok(()) => HandlerOutcome::success().with("folderpath", path),
        Err(e) => store_failure(&e),
    }
}

fn require_exists(caps: &Capabilities, path: &str) -> Result<(), HandlerOutcome> {
    if caps.store.folder_exists(path) {
        Ok(())
    } else {
        Err(HandlerOutcome::failure(ErrorCode::NotFound, format!("folder not found: {path}")))
    }
}

fn missing_param() -> HandlerOutcome {
    HandlerOutcome::failure(ErrorCode::HandlerError, "missing folder parameter after validation")
}
