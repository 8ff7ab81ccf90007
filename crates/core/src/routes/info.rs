//! The `info` and `settings` namespaces.

use crate::host::Capabilities;
use crate::outcome::HandlerOutcome;
use crate::params::{ParamSchema, Params};
use crate::version;

use super::{Namespace, capability_failure};

pub(super) fn namespace() -> Namespace {
    Namespace::new("info").route("get", ParamSchema::read(), get)
}

pub(super) fn settings() -> Namespace {
    Namespace::new("settings").route("open", ParamSchema::new(), open_settings)
}

fn get(caps: &Capabilities, _params: &Params) -> HandlerOutcome {
    HandlerOutcome::success()
        .with("name", "mduri")
        .with("platform", std::env::consts::OS)
        .with("vault", caps.vault.name.clone())
        .with("version", version())
}

fn open_settings(caps: &Capabilities, _params: &Params) -> HandlerOutcome {
    match caps.workspace.open_settings() {
        Ok(()) => HandlerOutcome::success(),
        Err(e) => capability_failure(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::ResultValue;
    use crate::routes::testing::{Recorder, caps, params};
    use tempfile::TempDir;

    #[test]
    fn get_reports_name_version_platform_and_vault() {
        let dir = TempDir::new().unwrap();
        let bundle = caps(dir.path(), &Recorder::default());
        let p = params(
            &bundle,
            &ParamSchema::read(),
            &[("x-success", "https://cb.example/ok"), ("x-error", "https://cb.example/err")],
        );
        match get(&bundle, &p) {
            HandlerOutcome::Success { result, .. } => {
                assert!(matches!(
                    result.get("name"),
                    Some(ResultValue::Text(name)) if name == "mduri"
                ));
                assert!(matches!(
                    result.get("version"),
                    Some(ResultValue::Text(v)) if v == version()
                ));
                assert!(result.contains_key("platform"));
                assert!(result.contains_key("vault"));
            }
            HandlerOutcome::Failure { .. } => panic!("expected success"),
        }
    }
}
