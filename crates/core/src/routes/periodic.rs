//! The periodic-note namespaces (`daily-note` … `yearly-note`).
//!
//! One namespace per kind; the kind is implied by the namespace prefix, so
//! these routes carry no targeting parameter. Creation and editing reuse the
//! `note` namespace helpers.

use chrono::Local;

use crate::error::ErrorCode;
use crate::host::Capabilities;
use crate::outcome::HandlerOutcome;
use crate::params::{ParamSchema, Params};
use crate::periodic::{PeriodKind, PeriodicError};

use super::note::{
    EditMode, PatternKind, create_at, edit_at, periodic_create_schema, periodic_edit_schema,
    periodic_replace_schema, read_outcome, replace_at,
};
use super::{Namespace, store_failure};

pub(super) fn namespace(kind: PeriodKind) -> Namespace {
    Namespace::new(kind.namespace())
        .route("list", ParamSchema::read(), move |caps, params| list(caps, params, kind))
        .route("get-current", ParamSchema::read().silent(), move |caps, params| {
            get_current(caps, params, kind)
        })
        .route("get-most-recent", ParamSchema::read().silent(), move |caps, params| {
            get_most_recent(caps, params, kind)
        })
        .route("open-current", ParamSchema::new().silent_forced(), move |caps, params| {
            open_current(caps, params, kind)
        })
        .route("open-most-recent", ParamSchema::new().silent_forced(), move |caps, params| {
            open_most_recent(caps, params, kind)
        })
        .route("create", periodic_create_schema(), move |caps, params| {
            create(caps, params, kind)
        })
        .route("append", periodic_edit_schema(), move |caps, params| {
            edit(caps, params, kind, EditMode::Append)
        })
        .route("prepend", periodic_edit_schema(), move |caps, params| {
            edit(caps, params, kind, EditMode::Prepend)
        })
        .route("search-string-and-replace", periodic_replace_schema(), move |caps, params| {
            replace(caps, params, kind, PatternKind::Literal)
        })
        .route("search-regex-and-replace", periodic_replace_schema(), move |caps, params| {
            replace(caps, params, kind, PatternKind::Regex)
        })
}

fn list(caps: &Capabilities, _params: &Params, kind: PeriodKind) -> HandlerOutcome {
    let Some(config) = caps.periodic.config(kind) else {
        return disabled(kind);
    };
    let folder = config.folder.trim_matches('/').to_string();
    let files = match caps.store.list_files() {
        Ok(files) => files,
        Err(e) => return store_failure(&e),
    };
    let notes: Vec<String> = files
        .into_iter()
        .filter(|path| path.ends_with(".md"))
        .filter(|path| {
            if folder.is_empty() {
                !path.contains('/')
            } else {
                path.strip_prefix(&folder).is_some_and(|rest| rest.starts_with('/'))
            }
        })
        .collect();
    HandlerOutcome::success().with("notes", notes)
}

fn get_current(caps: &Capabilities, _params: &Params, kind: PeriodKind) -> HandlerOutcome {
    let path = match current_path(caps, kind) {
        Ok(path) => path,
        Err(outcome) => return outcome,
    };
    if !caps.store.exists(&path) {
        return missing(kind, &path);
    }
    read_outcome(caps, &path)
}

fn get_most_recent(caps: &Capabilities, _params: &Params, kind: PeriodKind) -> HandlerOutcome {
    match most_recent_path(caps, kind) {
        Ok(Some(path)) => read_outcome(caps, &path),
        Ok(None) => none_found(kind),
        Err(outcome) => outcome,
    }
}

fn open_current(caps: &Capabilities, _params: &Params, kind: PeriodKind) -> HandlerOutcome {
    let path = match current_path(caps, kind) {
        Ok(path) => path,
        Err(outcome) => return outcome,
    };
    if !caps.store.exists(&path) {
        return missing(kind, &path);
    }
    HandlerOutcome::success().with("filepath", path.clone()).processed(path)
}

fn open_most_recent(caps: &Capabilities, _params: &Params, kind: PeriodKind) -> HandlerOutcome {
    match most_recent_path(caps, kind) {
        Ok(Some(path)) => HandlerOutcome::success().with("filepath", path.clone()).processed(path),
        Ok(None) => none_found(kind),
        Err(outcome) => outcome,
    }
}

fn create(caps: &Capabilities, params: &Params, kind: PeriodKind) -> HandlerOutcome {
    match current_path(caps, kind) {
        Ok(path) => create_at(caps, &path, params),
        Err(outcome) => outcome,
    }
}

fn edit(caps: &Capabilities, params: &Params, kind: PeriodKind, mode: EditMode) -> HandlerOutcome {
    let path = match current_path(caps, kind) {
        Ok(path) => path,
        Err(outcome) => return outcome,
    };
    let exists = caps.store.exists(&path);
    edit_at(caps, &path, exists, params, mode)
}

fn replace(
    caps: &Capabilities,
    params: &Params,
    kind: PeriodKind,
    pattern: PatternKind,
) -> HandlerOutcome {
    let path = match current_path(caps, kind) {
        Ok(path) => path,
        Err(outcome) => return outcome,
    };
    if !caps.store.exists(&path) {
        return missing(kind, &path);
    }
    replace_at(caps, &path, params, pattern)
}

fn current_path(caps: &Capabilities, kind: PeriodKind) -> Result<String, HandlerOutcome> {
    caps.periodic.path_for(kind, Local::now().date_naive()).map_err(|e| periodic_failure(&e))
}

fn most_recent_path(
    caps: &Capabilities,
    kind: PeriodKind,
) -> Result<Option<String>, HandlerOutcome> {
    let today = Local::now().date_naive();
    caps.periodic
        .most_recent(kind, today, &|path| caps.store.exists(path))
        .map_err(|e| periodic_failure(&e))
}

fn periodic_failure(error: &PeriodicError) -> HandlerOutcome {
    let code = match error {
        PeriodicError::Disabled(_) => ErrorCode::PreconditionFailed,
        PeriodicError::BadFormat { .. } => ErrorCode::HandlerError,
    };
    HandlerOutcome::failure(code, error.to_string())
}

fn disabled(kind: PeriodKind) -> HandlerOutcome {
    periodic_failure(&PeriodicError::Disabled(kind))
}

fn missing(kind: PeriodKind, path: &str) -> HandlerOutcome {
    HandlerOutcome::failure(
        ErrorCode::NotFound,
        format!("no current {kind} note exists at {path}"),
    )
}

fn none_found(kind: PeriodKind) -> HandlerOutcome {
    HandlerOutcome::failure(ErrorCode::NotFound, format!("no {kind} note found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::{Recorder, caps, params};
    use tempfile::TempDir;

    fn today_path(bundle: &Capabilities) -> String {
        bundle.periodic.path_for(PeriodKind::Daily, Local::now().date_naive()).unwrap()
    }

    fn read_params(bundle: &Capabilities) -> Params {
        params(
            bundle,
            &ParamSchema::read().silent(),
            &[("x-success", "https://cb.example/ok"), ("x-error", "https://cb.example/err")],
        )
    }

    #[test]
    fn disabled_kind_reports_412() {
        let dir = TempDir::new().unwrap();
        let bundle = caps(dir.path(), &Recorder::default());
        let p = read_params(&bundle);
        assert!(matches!(
            get_current(&bundle, &p, PeriodKind::Weekly),
            HandlerOutcome::Failure { code: ErrorCode::PreconditionFailed, .. }
        ));
    }

    #[test]
    fn get_current_missing_note_is_a_404() {
        let dir = TempDir::new().unwrap();
        let bundle = caps(dir.path(), &Recorder::default());
        let p = read_params(&bundle);
        assert!(matches!(
            get_current(&bundle, &p, PeriodKind::Daily),
            HandlerOutcome::Failure { code: ErrorCode::NotFound, .. }
        ));
    }

    #[test]
    fn create_writes_todays_note() {
        let dir = TempDir::new().unwrap();
        let bundle = caps(dir.path(), &Recorder::default());
        let p = params(&bundle, &periodic_create_schema(), &[("content", "# Today\n")]);
        assert!(create(&bundle, &p, PeriodKind::Daily).is_success());
        assert_eq!(bundle.store.read(&today_path(&bundle)).unwrap(), "# Today\n");
    }

    #[test]
    fn append_with_create_if_needed_starts_the_note() {
        let dir = TempDir::new().unwrap();
        let bundle = caps(dir.path(), &Recorder::default());
        let p = params(
            &bundle,
            &periodic_edit_schema(),
            &[("content", "- entry"), ("create-if-needed", "yes")],
        );
        assert!(edit(&bundle, &p, PeriodKind::Daily, EditMode::Append).is_success());
        assert_eq!(bundle.store.read(&today_path(&bundle)).unwrap(), "- entry");
    }

    #[test]
    fn most_recent_finds_an_older_note() {
        let dir = TempDir::new().unwrap();
        let bundle = caps(dir.path(), &Recorder::default());
        let yesterday = Local::now().date_naive().pred_opt().unwrap();
        let older = bundle.periodic.path_for(PeriodKind::Daily, yesterday).unwrap();
        bundle.store.write(&older, "old\n").unwrap();

        let p = read_params(&bundle);
        match get_most_recent(&bundle, &p, PeriodKind::Daily) {
            HandlerOutcome::Success { result, .. } => {
                assert!(matches!(
                    result.get("filepath"),
                    Some(crate::outcome::ResultValue::Text(path)) if path == &older
                ));
            }
            HandlerOutcome::Failure { .. } => panic!("expected success"),
        }
    }

    #[test]
    fn list_is_scoped_to_the_kind_folder() {
        let dir = TempDir::new().unwrap();
        let bundle = caps(dir.path(), &Recorder::default());
        bundle.store.write("daily/2026-08-25.md", "x").unwrap();
        bundle.store.write("daily/2026-08-26.md", "x").unwrap();
        bundle.store.write("other/2026-08-26.md", "x").unwrap();

        let p = read_params(&bundle);
        match list(&bundle, &p, PeriodKind::Daily) {
            HandlerOutcome::Success { result, .. } => {
                assert!(matches!(
                    result.get("notes"),
                    Some(crate::outcome::ResultValue::Items(items)) if items.len() == 2
                ));
            }
            HandlerOutcome::Failure { .. } => panic!("expected success"),
        }
    }
}
