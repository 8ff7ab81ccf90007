//! The per-call dispatcher: validate, invoke, deliver the callback, open
//! the processed file.
//!
//! Handlers never see raw input and never deliver callbacks themselves; the
//! dispatcher owns both ends so every call gets at most one callback and at
//! most one open attempt.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{debug, warn};

use crate::BRAND;
use crate::callback::{failure_url, success_url};
use crate::error::ErrorCode;
use crate::host::{CallbackTransport, Capabilities, Notices};
use crate::outcome::HandlerOutcome;
use crate::params::{Params, ValidationFailure, merciful_bool};
use crate::routes::{RouteDefinition, RouteRegistry};
use crate::uri::CallInput;

/// What the callback stage did for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackStep {
    /// The caller supplied no URL for this outcome kind.
    NotApplicable,
    Delivered { url: String },
}

/// What the open-after-success stage did for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenStep {
    NotApplicable,
    Opened { path: String },
    Failed { path: String, message: String },
}

/// Everything one call produced, for logging and the host's exit status.
#[derive(Debug)]
pub struct ProcessingResult {
    pub input: CallInput,
    pub outcome: HandlerOutcome,
    pub callback: CallbackStep,
    pub open: OpenStep,
}

pub struct Dispatcher {
    registry: RouteRegistry,
    caps: Capabilities,
}

impl Dispatcher {
    #[must_use]
    pub fn new(registry: RouteRegistry, caps: Capabilities) -> Self {
        Self { registry, caps }
    }

    #[must_use]
    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    /// Run one call through the full pipeline.
    pub fn dispatch(&self, input: CallInput) -> ProcessingResult {
        debug!(route = %input.route_path, "dispatching");

        let Some(route) = self.registry.lookup(&input.route_path) else {
            let message = format!("no route at `{}`", input.route_path);
            return self.terminal(input, ErrorCode::NotFound, message);
        };

        let params = match route.schema.validate(&input.params, &self.caps.resolver()) {
            Ok(params) => params,
            Err(ValidationFailure::Issues(issues)) => {
                let message =
                    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ");
                return self.terminal(input, ErrorCode::BadRequest, message);
            }
            // A resolution-time failure travels like a handler failure:
            // callback only, no local notice.
            Err(ValidationFailure::Typed { code, message }) => {
                let outcome = HandlerOutcome::failure(code, message);
                let callback = self.deliver(&input.params, &outcome);
                return ProcessingResult {
                    input,
                    outcome,
                    callback,
                    open: OpenStep::NotApplicable,
                };
            }
        };

        let outcome = self.invoke(route, &params, &input.params);
        let callback = self.deliver(&input.params, &outcome);
        let open = self.open_after_success(&params, &outcome);
        ProcessingResult { input, outcome, callback, open }
    }

    /// A failure before any handler ran: notice plus best-effort `x-error`.
    fn terminal(
        &self,
        input: CallInput,
        code: ErrorCode,
        message: String,
    ) -> ProcessingResult {
        let callback = reject(
            &input,
            code,
            &message,
            self.caps.notices.as_ref(),
            self.caps.transport.as_ref(),
        );
        ProcessingResult {
            outcome: HandlerOutcome::failure(code, message),
            input,
            callback,
            open: OpenStep::NotApplicable,
        }
    }

    fn invoke(
        &self,
        route: &RouteDefinition,
        params: &Params,
        raw: &HashMap<String, String>,
    ) -> HandlerOutcome {
        match catch_unwind(AssertUnwindSafe(|| (route.handler)(&self.caps, params))) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = format!("handler error: {}", panic_message(payload.as_ref()));
                warn!(route = route.segment, %message, "handler panicked");
                show_notice(self.caps.notices.as_ref(), &message, raw);
                HandlerOutcome::failure(ErrorCode::HandlerError, message)
            }
        }
    }

    /// At most one callback per call, matching the outcome variant.
    fn deliver(&self, raw: &HashMap<String, String>, outcome: &HandlerOutcome) -> CallbackStep {
        match outcome {
            HandlerOutcome::Success { result, .. } => match raw.get("x-success") {
                Some(base) => {
                    let url = success_url(base, result, raw);
                    self.caps.transport.deliver(&url);
                    debug!(%url, "success callback delivered");
                    CallbackStep::Delivered { url }
                }
                None => CallbackStep::NotApplicable,
            },
            HandlerOutcome::Failure { code, message } => {
                deliver_failure(raw, *code, message, self.caps.transport.as_ref())
            }
        }
    }

    fn open_after_success(&self, params: &Params, outcome: &HandlerOutcome) -> OpenStep {
        let Some(path) = outcome.processed_path() else {
            return OpenStep::NotApplicable;
        };
        if params.flag("silent") {
            return OpenStep::NotApplicable;
        }
        match self.caps.workspace.open_note(path) {
            Ok(()) => OpenStep::Opened { path: path.to_string() },
            Err(e) => OpenStep::Failed { path: path.to_string(), message: e.to_string() },
        }
    }
}

/// Report a failure without dispatching. Host glue uses this for errors the
/// dispatcher can never see, like a vault name missing from configuration.
pub fn reject(
    input: &CallInput,
    code: ErrorCode,
    message: &str,
    notices: &dyn Notices,
    transport: &dyn CallbackTransport,
) -> CallbackStep {
    show_notice(notices, message, &input.params);
    deliver_failure(&input.params, code, message, transport)
}

fn deliver_failure(
    raw: &HashMap<String, String>,
    code: ErrorCode,
    message: &str,
    transport: &dyn CallbackTransport,
) -> CallbackStep {
    match raw.get("x-error") {
        Some(base) => {
            let url = failure_url(base, code, message, raw);
            transport.deliver(&url);
            debug!(%url, "failure callback delivered");
            CallbackStep::Delivered { url }
        }
        None => CallbackStep::NotApplicable,
    }
}

/// Branded local notice, suppressible with `hide-ui-notice-on-error`. The
/// flag is read mercifully from the raw input because validation may not
/// have produced a params bag.
fn show_notice(notices: &dyn Notices, message: &str, raw: &HashMap<String, String>) {
    if merciful_bool(raw.get("hide-ui-notice-on-error").map(String::as_str)) {
        return;
    }
    notices.show(&format!("{BRAND} {message}"));
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
