//! The `command` namespace: listing and running host-registered commands.

use std::thread;
use std::time::Duration;

use crate::error::ErrorCode;
use crate::host::Capabilities;
use crate::outcome::HandlerOutcome;
use crate::params::{FieldKind, ParamSchema, Params, optional, required};

use super::{Namespace, capability_failure};

const RUNNER_UNAVAILABLE: &str = "no command runner is available";

pub(super) fn namespace() -> Namespace {
    Namespace::new("command")
        .route("list", ParamSchema::read(), list)
        .route(
            "execute",
            ParamSchema::new()
                .field(required("commands", FieldKind::CommaList))
                .field(optional("pause-in-secs", FieldKind::Number).or("0.2")),
            execute,
        )
}

fn list(caps: &Capabilities, _params: &Params) -> HandlerOutcome {
    if !caps.commands.available() {
        return HandlerOutcome::failure(ErrorCode::FailedDependency, RUNNER_UNAVAILABLE);
    }
    let commands: Vec<String> =
        caps.commands.list().into_iter().map(|c| format!("{}: {}", c.id, c.name)).collect();
    HandlerOutcome::success().with("commands", commands)
}

fn execute(caps: &Capabilities, params: &Params) -> HandlerOutcome {
    if !caps.commands.available() {
        return HandlerOutcome::failure(ErrorCode::FailedDependency, RUNNER_UNAVAILABLE);
    }
    let Some(ids) = params.list("commands") else {
        return HandlerOutcome::failure(
            ErrorCode::HandlerError,
            "missing `commands` after validation",
        );
    };
    if ids.is_empty() {
        return HandlerOutcome::failure(ErrorCode::InvalidInput, "`commands` names no command");
    }

    let known = caps.commands.list();
    if let Some(unknown) = ids.iter().find(|id| !known.iter().any(|c| &c.id == *id)) {
        return HandlerOutcome::failure(
            ErrorCode::NotFound,
            format!("unknown command: {unknown}"),
        );
    }

    let pause = params.number("pause-in-secs").unwrap_or(0.2).max(0.0);
    for (position, id) in ids.iter().enumerate() {
        if position > 0 && pause > 0.0 {
            thread::sleep(Duration::from_secs_f64(pause));
        }
        if let Err(e) = caps.commands.run(id) {
            return capability_failure(&e);
        }
    }
    HandlerOutcome::success().with("commands", ids.to_vec())
}
