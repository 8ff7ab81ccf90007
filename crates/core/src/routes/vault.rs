//! The `vault` namespace.

use crate::host::Capabilities;
use crate::outcome::HandlerOutcome;
use crate::params::{ParamSchema, Params};

use super::{Namespace, capability_failure, store_failure};

pub(super) fn namespace() -> Namespace {
    Namespace::new("vault")
        .route("open", ParamSchema::new(), open)
        .route("close", ParamSchema::new(), close)
        .route("info", ParamSchema::read(), info)
}

fn open(caps: &Capabilities, _params: &Params) -> HandlerOutcome {
    match caps.workspace.open_vault() {
        Ok(()) => HandlerOutcome::success().with("vault", caps.vault.name.clone()),
        Err(e) => capability_failure(&e),
    }
}

fn close(caps: &Capabilities, _params: &Params) -> HandlerOutcome {
    match caps.workspace.close_vault() {
        Ok(()) => HandlerOutcome::success().with("vault", caps.vault.name.clone()),
        Err(e) => capability_failure(&e),
    }
}

fn info(caps: &Capabilities, _params: &Params) -> HandlerOutcome {
    let note_count = match caps.store.list_files() {
        Ok(files) => files.iter().filter(|f| f.ends_with(".md")).count(),
        Err(e) => return store_failure(&e),
    };
    HandlerOutcome::success()
        .with("name", caps.vault.name.clone())
        .with("noteCount", note_count.to_string())
        .with("root", caps.vault.root.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::ResultValue;
    use crate::routes::testing::{Recorder, caps, params};
    use tempfile::TempDir;

    #[test]
    fn info_reports_name_root_and_note_count() {
        let dir = TempDir::new().unwrap();
        let bundle = caps(dir.path(), &Recorder::default());
        bundle.store.write("a.md", "x").unwrap();
        bundle.store.write("pic.png", "x").unwrap();

        let p = params(
            &bundle,
            &ParamSchema::read(),
            &[("x-success", "https://cb.example/ok"), ("x-error", "https://cb.example/err")],
        );
        match info(&bundle, &p) {
            HandlerOutcome::Success { result, .. } => {
                assert!(matches!(
                    result.get("name"),
                    Some(ResultValue::Text(name)) if name == "main"
                ));
                assert!(matches!(
                    result.get("noteCount"),
                    Some(ResultValue::Text(count)) if count == "1"
                ));
            }
            HandlerOutcome::Failure { .. } => panic!("expected success"),
        }
    }

    #[test]
    fn open_and_close_report_the_vault_name() {
        let dir = TempDir::new().unwrap();
        let bundle = caps(dir.path(), &Recorder::default());
        let p = params(&bundle, &ParamSchema::new(), &[]);
        assert!(open(&bundle, &p).is_success());
        assert!(close(&bundle, &p).is_success());
    }
}
