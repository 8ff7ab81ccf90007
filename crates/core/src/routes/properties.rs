//! The `note-properties` namespace: frontmatter as a JSON record.

use std::collections::HashMap;

use crate::error::ErrorCode;
use crate::frontmatter::{self, Frontmatter, ParsedDocument};
use crate::host::Capabilities;
use crate::outcome::HandlerOutcome;
use crate::params::{FieldKind, ParamSchema, Params, TargetingMode, optional, required};

use super::{Namespace, resolved_target, store_failure};

pub(super) fn namespace() -> Namespace {
    Namespace::new("note-properties")
        .route(
            "get",
            ParamSchema::read().targeting(TargetingMode::Strict),
            get,
        )
        .route(
            "set",
            ParamSchema::new()
                .targeting(TargetingMode::Strict)
                .field(required("properties", FieldKind::Json))
                .field(optional("mode", FieldKind::Choice(&["update", "overwrite"])).or("update")),
            set,
        )
        .route("clear", ParamSchema::new().targeting(TargetingMode::Strict), clear)
        .route(
            "remove-keys",
            ParamSchema::new()
                .targeting(TargetingMode::Strict)
                .field(required("keys", FieldKind::CommaList)),
            remove_keys,
        )
}

fn get(caps: &Capabilities, params: &Params) -> HandlerOutcome {
    let (_, doc) = match load(caps, params) {
        Ok(loaded) => loaded,
        Err(outcome) => return outcome,
    };
    let json = doc
        .frontmatter
        .as_ref()
        .map_or_else(|| serde_json::json!({}), frontmatter::fields_to_json);
    HandlerOutcome::success().with("properties", json.to_string())
}

fn set(caps: &Capabilities, params: &Params) -> HandlerOutcome {
    let Some(properties) = params.json("properties") else {
        return HandlerOutcome::failure(
            ErrorCode::HandlerError,
            "missing `properties` after validation",
        );
    };
    if !properties.is_object() {
        return HandlerOutcome::failure(
            ErrorCode::InvalidInput,
            "`properties` must be a JSON object",
        );
    }
    let incoming = frontmatter::fields_from_json(properties);

    rewrite(caps, params, |fields| match params.str("mode") {
        Some("overwrite") => incoming.clone(),
        _ => {
            let mut merged = fields.clone();
            merged.extend(incoming.clone());
            merged
        }
    })
}

fn clear(caps: &Capabilities, params: &Params) -> HandlerOutcome {
    rewrite(caps, params, |_| HashMap::new())
}

fn remove_keys(caps: &Capabilities, params: &Params) -> HandlerOutcome {
    let Some(keys) = params.list("keys") else {
        return HandlerOutcome::failure(ErrorCode::HandlerError, "missing `keys` after validation");
    };
    let keys = keys.to_vec();
    rewrite(caps, params, move |fields| {
        let mut remaining = fields.clone();
        for key in &keys {
            remaining.remove(key);
        }
        remaining
    })
}

fn load(
    caps: &Capabilities,
    params: &Params,
) -> Result<(String, ParsedDocument), HandlerOutcome> {
    let target = resolved_target(params)?;
    let content = caps.store.read(&target.path).map_err(|e| store_failure(&e))?;
    let doc = frontmatter::parse(&content)
        .unwrap_or_else(|_| ParsedDocument { frontmatter: None, body: content });
    Ok((target.path, doc))
}

/// Load the target, transform its frontmatter fields, write it back.
fn rewrite(
    caps: &Capabilities,
    params: &Params,
    transform: impl Fn(&HashMap<String, serde_yaml::Value>) -> HashMap<String, serde_yaml::Value>,
) -> HandlerOutcome {
    let (path, doc) = match load(caps, params) {
        Ok(loaded) => loaded,
        Err(outcome) => return outcome,
    };
    let current = doc.frontmatter.as_ref().map(|fm| fm.fields.clone()).unwrap_or_default();
    let fields = transform(&current);

    let updated = ParsedDocument {
        frontmatter: if fields.is_empty() { None } else { Some(Frontmatter { fields }) },
        body: doc.body,
    };
    match caps.store.write(&path, &frontmatter::serialize(&updated)) {
        Ok(()) => HandlerOutcome::success().with("filepath", path.clone()).processed(path),
        Err(e) => store_failure(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::ResultValue;
    use crate::routes::testing::{Recorder, caps, params};
    use tempfile::TempDir;

    fn fixture() -> (TempDir, Capabilities) {
        let dir = TempDir::new().unwrap();
        let bundle = caps(dir.path(), &Recorder::default());
        bundle.store.write("n.md", "---\ntitle: T\ncount: 1\n---\n\nbody\n").unwrap();
        (dir, bundle)
    }

    #[test]
    fn get_returns_properties_as_json() {
        let (_dir, bundle) = fixture();
        let schema = ParamSchema::read().targeting(TargetingMode::Strict);
        let p = params(
            &bundle,
            &schema,
            &[
                ("file", "n.md"),
                ("x-success", "https://cb.example/ok"),
                ("x-error", "https://cb.example/err"),
            ],
        );
        match get(&bundle, &p) {
            HandlerOutcome::Success { result, .. } => {
                let Some(ResultValue::Text(json)) = result.get("properties") else {
                    panic!("expected properties text");
                };
                let value: serde_json::Value = serde_json::from_str(json).unwrap();
                assert_eq!(value["title"], "T");
                assert_eq!(value["count"], 1);
            }
            HandlerOutcome::Failure { .. } => panic!("expected success"),
        }
    }

    #[test]
    fn set_update_merges_and_overwrite_replaces() {
        let (_dir, bundle) = fixture();
        let schema = ParamSchema::new()
            .targeting(TargetingMode::Strict)
            .field(required("properties", FieldKind::Json))
            .field(optional("mode", FieldKind::Choice(&["update", "overwrite"])).or("update"));

        let p = params(&bundle, &schema, &[("file", "n.md"), ("properties", r#"{"tags":["a"]}"#)]);
        assert!(set(&bundle, &p).is_success());
        let content = bundle.store.read("n.md").unwrap();
        assert!(content.contains("title: T"));
        assert!(content.contains("tags:"));

        let p = params(
            &bundle,
            &schema,
            &[("file", "n.md"), ("properties", r#"{"only":"this"}"#), ("mode", "overwrite")],
        );
        assert!(set(&bundle, &p).is_success());
        let content = bundle.store.read("n.md").unwrap();
        assert!(!content.contains("title"));
        assert!(content.contains("only: this"));
    }

    #[test]
    fn set_rejects_a_non_object_payload() {
        let (_dir, bundle) = fixture();
        let schema = ParamSchema::new()
            .targeting(TargetingMode::Strict)
            .field(required("properties", FieldKind::Json))
            .field(optional("mode", FieldKind::Choice(&["update", "overwrite"])).or("update"));
        let p = params(&bundle, &schema, &[("file", "n.md"), ("properties", "[1,2]")]);
        assert!(matches!(
            set(&bundle, &p),
            HandlerOutcome::Failure { code: ErrorCode::InvalidInput, .. }
        ));
    }

    #[test]
    fn clear_strips_the_whole_block() {
        let (_dir, bundle) = fixture();
        let schema = ParamSchema::new().targeting(TargetingMode::Strict);
        let p = params(&bundle, &schema, &[("file", "n.md")]);
        assert!(clear(&bundle, &p).is_success());
        let content = bundle.store.read("n.md").unwrap();
        assert!(!content.contains("---"));
        assert!(content.contains("body"));
    }

    #[test]
    fn remove_keys_drops_only_the_named_keys() {
        let (_dir, bundle) = fixture();
        let schema = ParamSchema::new()
            .targeting(TargetingMode::Strict)
            .field(required("keys", FieldKind::CommaList));
        let p = params(&bundle, &schema, &[("file", "n.md"), ("keys", "count, missing")]);
        assert!(remove_keys(&bundle, &p).is_success());
        let content = bundle.store.read("n.md").unwrap();
        assert!(content.contains("title: T"));
        assert!(!content.contains("count"));
    }
}
