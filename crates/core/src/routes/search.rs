//! The `search` and `omnisearch` namespaces.
//!
//! `search` runs the built-in substring engine over the store. `omnisearch`
//! goes through the optional external provider and reports failed-dependency
//! when none is wired up.

use crate::error::ErrorCode;
use crate::host::Capabilities;
use crate::outcome::HandlerOutcome;
use crate::params::{FieldKind, ParamSchema, Params, required};
use crate::search::{normalize_rows, search_store};

use super::{Namespace, capability_failure, store_failure};

const PROVIDER_UNAVAILABLE: &str = "no external search provider is available";

pub(super) fn namespace() -> Namespace {
    Namespace::new("search")
        .route("all-notes", query_schema(ParamSchema::read()), all_notes)
        .route("open", query_schema(ParamSchema::new()), open)
}

pub(super) fn omnisearch() -> Namespace {
    Namespace::new("omnisearch")
        .route("all-notes", query_schema(ParamSchema::read()), omnisearch_all_notes)
        .route("open", query_schema(ParamSchema::new()), omnisearch_open)
}

fn query_schema(schema: ParamSchema) -> ParamSchema {
    schema.field(required("query", FieldKind::NonEmptyText))
}

fn all_notes(caps: &Capabilities, params: &Params) -> HandlerOutcome {
    let Some(query) = params.str("query") else {
        return missing_query();
    };
    match search_store(caps.store.as_ref(), query) {
        Ok(hits) => {
            let rendered: Vec<String> =
                hits.into_iter().map(|h| format!("{}:{}: {}", h.path, h.line, h.snippet)).collect();
            HandlerOutcome::success().with("hits", rendered)
        }
        Err(e) => store_failure(&e),
    }
}

fn open(caps: &Capabilities, params: &Params) -> HandlerOutcome {
    let Some(query) = params.str("query") else {
        return missing_query();
    };
    match caps.workspace.open_search(query) {
        Ok(()) => HandlerOutcome::success().with("query", query),
        Err(e) => capability_failure(&e),
    }
}

fn omnisearch_all_notes(caps: &Capabilities, params: &Params) -> HandlerOutcome {
    let Some(query) = params.str("query") else {
        return missing_query();
    };
    if !caps.search.available() {
        return HandlerOutcome::failure(ErrorCode::FailedDependency, PROVIDER_UNAVAILABLE);
    }
    match caps.search.query(query) {
        Ok(rows) => {
            let rendered: Vec<String> =
                normalize_rows(rows).into_iter().map(|row| row.join(": ")).collect();
            HandlerOutcome::success().with("hits", rendered)
        }
        Err(e) => HandlerOutcome::failure(ErrorCode::FailedDependency, e.to_string()),
    }
}

fn omnisearch_open(caps: &Capabilities, params: &Params) -> HandlerOutcome {
    let Some(query) = params.str("query") else {
        return missing_query();
    };
    if !caps.search.available() {
        return HandlerOutcome::failure(ErrorCode::FailedDependency, PROVIDER_UNAVAILABLE);
    }
    match caps.workspace.open_search(query) {
        Ok(()) => HandlerOutcome::success().with("query", query),
        Err(e) => capability_failure(&e),
    }
}

fn missing_query() -> HandlerOutcome {
    HandlerOutcome::failure(ErrorCode::HandlerError, "missing `query` after validation")
}
