//! Namespaced route registry.
//!
//! Routes are declared per namespace and composed by an explicit builder.
//! Duplicate full paths are a build-time error so a misconfigured registry
//! never reaches dispatch. Every namespace gets an automatic zero-argument
//! `hello` route at its root.

mod command;
mod file;
mod folder;
mod info;
mod note;
mod periodic;
mod properties;
mod search;
mod tags;
mod vault;

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::host::Capabilities;
use crate::outcome::HandlerOutcome;
use crate::params::{ParamSchema, Params};
use crate::periodic::PeriodKind;
use crate::uri::normalize_path;
use crate::{BRAND, version};

pub type Handler = Box<dyn Fn(&Capabilities, &Params) -> HandlerOutcome + Send + Sync>;

pub struct RouteDefinition {
    pub segment: &'static str,
    pub schema: ParamSchema,
    pub handler: Handler,
}

/// One namespace and the routes declared under it.
pub struct Namespace {
    prefix: &'static str,
    routes: Vec<RouteDefinition>,
}

impl Namespace {
    #[must_use]
    pub fn new(prefix: &'static str) -> Self {
        Self { prefix, routes: Vec::new() }
    }

    #[must_use]
    pub fn route<H>(mut self, segment: &'static str, schema: ParamSchema, handler: H) -> Self
    where
        H: Fn(&Capabilities, &Params) -> HandlerOutcome + Send + Sync + 'static,
    {
        self.routes.push(RouteDefinition { segment, schema, handler: Box::new(handler) });
        self
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate route path: `{0}`")]
    DuplicatePath(String),
}

/// The built registry: normalized full path to route definition.
pub struct RouteRegistry {
    routes: HashMap<String, RouteDefinition>,
}

impl RouteRegistry {
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&RouteDefinition> {
        self.routes.get(&normalize_path(path))
    }

    /// All full paths, sorted, for listings and startup logging.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    /// Sorted `(path, definition)` pairs.
    #[must_use]
    pub fn entries(&self) -> Vec<(&str, &RouteDefinition)> {
        let mut entries: Vec<_> =
            self.routes.iter().map(|(path, def)| (path.as_str(), def)).collect();
        entries.sort_unstable_by_key(|(path, _)| *path);
        entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    namespaces: Vec<Namespace>,
}

impl RegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn namespace(mut self, namespace: Namespace) -> Self {
        self.namespaces.push(namespace);
        self
    }

    /// Build the registry, prepending the automatic `hello` route to each
    /// namespace and failing on the first duplicate full path.
    pub fn build(self) -> Result<RouteRegistry, RegistryError> {
        let mut routes = HashMap::new();
        for namespace in self.namespaces {
            let hello = RouteDefinition {
                segment: "",
                schema: ParamSchema::new(),
                handler: Box::new(hello),
            };
            for definition in std::iter::once(hello).chain(namespace.routes) {
                let full =
                    normalize_path(&format!("{}/{}", namespace.prefix, definition.segment));
                if routes.contains_key(&full) {
                    return Err(RegistryError::DuplicatePath(full));
                }
                routes.insert(full, definition);
            }
        }

        let registry = RouteRegistry { routes };
        for path in registry.paths() {
            debug!(route = path, "registered");
        }
        Ok(registry)
    }
}

/// Map a store refusal onto the taxonomy: missing targets are 404,
/// everything else the store rejects is a bad request.
pub(crate) fn store_failure(error: &crate::host::StoreError) -> HandlerOutcome {
    use crate::error::ErrorCode;
    use crate::host::StoreError;
    match error {
        StoreError::NotFound(path) => {
            HandlerOutcome::failure(ErrorCode::NotFound, format!("not found: {path}"))
        }
        other => HandlerOutcome::failure(ErrorCode::BadRequest, other.to_string()),
    }
}

/// Map a workspace/runner fault onto the internal-error code.
pub(crate) fn capability_failure(error: &crate::host::CapabilityError) -> HandlerOutcome {
    HandlerOutcome::failure(crate::error::ErrorCode::HandlerError, error.to_string())
}

/// The resolved target a targeting route is guaranteed to carry. A missing
/// one is a registry/schema mismatch, reported as an internal fault.
pub(crate) fn resolved_target(
    params: &Params,
) -> Result<crate::targeting::ResolvedTarget, HandlerOutcome> {
    params.target().cloned().ok_or_else(|| {
        HandlerOutcome::failure(
            crate::error::ErrorCode::HandlerError,
            "route is not configured for note targeting",
        )
    })
}

/// The automatic namespace root route.
fn hello(caps: &Capabilities, _params: &Params) -> HandlerOutcome {
    caps.notices.show(&format!("{BRAND} Hello, the mduri host is listening."));
    HandlerOutcome::success()
        .with("message", format!("Hello from mduri v{}", version()))
        .with("version", version())
}

/// The full shipped route table.
pub fn registry() -> Result<RouteRegistry, RegistryError> {
    let mut builder = RegistryBuilder::new()
        .namespace(Namespace::new(""))
        .namespace(vault::namespace())
        .namespace(file::namespace())
        .namespace(folder::namespace())
        .namespace(note::namespace())
        .namespace(properties::namespace())
        .namespace(tags::namespace())
        .namespace(command::namespace())
        .namespace(search::namespace())
        .namespace(search::omnisearch())
        .namespace(info::namespace())
        .namespace(info::settings());
    for kind in PeriodKind::ALL {
        builder = builder.namespace(periodic::namespace(kind));
    }
    builder.build()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamSchema;

    fn noop(_: &Capabilities, _: &Params) -> HandlerOutcome {
        HandlerOutcome::success()
    }

    #[test]
    fn shipped_registry_builds() {
        let registry = registry().unwrap();
        assert!(registry.lookup("note/get").is_some());
        assert!(registry.lookup("daily-note/get-current").is_some());
        assert!(registry.lookup("yearly-note/append").is_some());
        assert!(registry.lookup("nope/nothing").is_none());
    }

    #[test]
    fn every_namespace_has_a_hello_route() {
        let registry = registry().unwrap();
        for prefix in
            ["", "vault", "file", "folder", "note", "note-properties", "tags", "command",
             "search", "omnisearch", "info", "settings", "daily-note", "weekly-note",
             "monthly-note", "quarterly-note", "yearly-note"]
        {
            assert!(registry.lookup(prefix).is_some(), "missing hello for `{prefix}`");
        }
    }

    #[test]
    fn lookup_normalizes_the_requested_path() {
        let registry = registry().unwrap();
        assert!(registry.lookup("/note/get/").is_some());
        assert!(registry.lookup("note//get").is_some());
    }

    #[test]
    fn duplicate_paths_fail_at_build_time() {
        let result = RegistryBuilder::new()
            .namespace(
                Namespace::new("note")
                    .route("get", ParamSchema::new(), noop)
                    .route("get", ParamSchema::new(), noop),
            )
            .build();
        assert!(matches!(result, Err(RegistryError::DuplicatePath(path)) if path == "note/get"));
    }

    #[test]
    fn paths_are_sorted() {
        let registry = registry().unwrap();
        let paths = registry.paths();
        let mut sorted = paths.clone();
        sorted.sort_unstable();
        assert_eq!(paths, sorted);
    }
}
