//! The `tags` namespace: tag collection across the whole vault.
//!
//! Tags come from two places: the frontmatter `tags` field and inline
//! `#tag` tokens in note bodies.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::frontmatter;
use crate::host::Capabilities;
use crate::outcome::HandlerOutcome;
use crate::params::{ParamSchema, Params};

use super::{Namespace, store_failure};

pub(super) fn namespace() -> Namespace {
    Namespace::new("tags").route("list", ParamSchema::read(), list)
}

fn inline_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(^|\s)#([A-Za-z][A-Za-z0-9_/-]*)").unwrap_or_else(|_| unreachable!())
    })
}

fn list(caps: &Capabilities, _params: &Params) -> HandlerOutcome {
    let files = match caps.store.list_files() {
        Ok(files) => files,
        Err(e) => return store_failure(&e),
    };

    let mut tags = BTreeSet::new();
    for path in files.into_iter().filter(|p| p.ends_with(".md")) {
        let content = match caps.store.read(&path) {
            Ok(content) => content,
            Err(e) => return store_failure(&e),
        };
        collect_tags(&content, &mut tags);
    }

    HandlerOutcome::success().with("tags", tags.into_iter().collect::<Vec<_>>())
}

fn collect_tags(content: &str, tags: &mut BTreeSet<String>) {
    let (body, frontmatter) = match frontmatter::parse(content) {
        Ok(doc) => (doc.body, doc.frontmatter),
        Err(_) => (content.to_string(), None),
    };

    if let Some(fm) = frontmatter {
        match fm.fields.get("tags") {
            Some(serde_yaml::Value::Sequence(items)) => {
                for item in items {
                    if let serde_yaml::Value::String(tag) = item {
                        tags.insert(tag.clone());
                    }
                }
            }
            Some(serde_yaml::Value::String(tag)) => {
                tags.insert(tag.clone());
            }
            _ => {}
        }
    }

    for capture in inline_tag_pattern().captures_iter(&body) {
        if let Some(tag) = capture.get(2) {
            tags.insert(tag.as_str().to_string());
        }
    }
}
