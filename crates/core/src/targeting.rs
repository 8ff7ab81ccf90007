//! Note targeting: resolving one of `file`/`uid`/`periodic-note` to exactly
//! one note path.

use std::collections::HashMap;

use chrono::Local;
use thiserror::Error;

use crate::error::ErrorCode;
use crate::host::{NoteStore, UidIndex};
use crate::params::sanitize;
use crate::periodic::{PeriodKind, PeriodicError, PeriodicSet};

/// Fixed message for the exactly-one-of refinement.
pub const FAULTY_TARGETING: &str =
    "Exactly one of the parameters `file`, `uid` and `periodic-note` must be provided";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKey {
    File,
    Uid,
    PeriodicNote,
}

impl TargetKey {
    pub const ALL: [TargetKey; 3] = [Self::File, Self::Uid, Self::PeriodicNote];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Uid => "uid",
            Self::PeriodicNote => "periodic-note",
        }
    }
}

/// The single canonical target of a note-targeting route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub source: TargetKey,
    pub path: String,
    pub exists: bool,
}

#[derive(Debug, Error)]
pub enum TargetingError {
    /// Reported as a field-level validation issue.
    #[error("{0}")]
    Invalid(String),

    /// Only knowable at resolution time; surfaces as a typed failure
    /// outcome, not a validation error.
    #[error("{message}")]
    Unavailable { code: ErrorCode, message: String },
}

/// The cross-field refinement: exactly one targeting key must be present in
/// the raw input. Zero or multiple fail with the fixed message.
pub fn exactly_one_targeting(
    raw: &HashMap<String, String>,
) -> Result<(TargetKey, String), String> {
    let mut found = None;
    let mut count = 0;
    for key in TargetKey::ALL {
        if let Some(value) = raw.get(key.as_str()) {
            count += 1;
            found = Some((key, value.clone()));
        }
    }
    match (count, found) {
        (1, Some(hit)) => Ok(hit),
        _ => Err(FAULTY_TARGETING.to_string()),
    }
}

pub trait TargetResolver {
    fn resolve(&self, key: TargetKey, value: &str) -> Result<ResolvedTarget, TargetingError>;
}

/// Resolver over the capability bundle of one vault.
pub struct VaultResolver<'a> {
    pub store: &'a dyn NoteStore,
    pub index: &'a dyn UidIndex,
    pub periodic: &'a PeriodicSet,
    pub uid_key: &'a str,
}

impl TargetResolver for VaultResolver<'_> {
    fn resolve(&self, key: TargetKey, value: &str) -> Result<ResolvedTarget, TargetingError> {
        match key {
            TargetKey::File => {
                let path = sanitize::note_path(value);
                if path.is_empty() {
                    return Err(TargetingError::Invalid("`file` must name a note".to_string()));
                }
                let exists = self.store.exists(&path);
                Ok(ResolvedTarget { source: key, path, exists })
            }
            TargetKey::Uid => {
                let found =
                    self.index.path_for_uid(self.uid_key, value).map_err(|e| {
                        TargetingError::Unavailable {
                            code: ErrorCode::HandlerError,
                            message: format!("uid lookup failed: {e}"),
                        }
                    })?;
                // An unmatched uid cannot yield a creatable path, so it
                // fails even in soft mode.
                let path = found.ok_or_else(|| {
                    TargetingError::Invalid(format!(
                        "no note with `{}` = `{value}`",
                        self.uid_key
                    ))
                })?;
                let exists = self.store.exists(&path);
                Ok(ResolvedTarget { source: key, path, exists })
            }
            TargetKey::PeriodicNote => {
                let kind = PeriodKind::parse(value).ok_or_else(|| {
                    TargetingError::Invalid(format!("unknown periodic note kind: `{value}`"))
                })?;
                let today = Local::now().date_naive();
                let path = self.periodic.path_for(kind, today).map_err(|e| match e {
                    PeriodicError::Disabled(_) => TargetingError::Unavailable {
                        code: ErrorCode::PreconditionFailed,
                        message: e.to_string(),
                    },
                    PeriodicError::BadFormat { .. } => TargetingError::Unavailable {
                        code: ErrorCode::HandlerError,
                        message: e.to_string(),
                    },
                })?;
                let exists = self.store.exists(&path);
                Ok(ResolvedTarget { source: key, path, exists })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{CapabilityError, StoreError};
    use crate::periodic::PeriodicKindConfig;

    struct FakeStore {
        existing: Vec<String>,
    }

    impl NoteStore for FakeStore {
        fn exists(&self, path: &str) -> bool {
            self.existing.iter().any(|p| p == path)
        }
        fn folder_exists(&self, _path: &str) -> bool {
            false
        }
        fn read(&self, path: &str) -> Result<String, StoreError> {
            Err(StoreError::NotFound(path.to_string()))
        }
        fn write(&self, _path: &str, _content: &str) -> Result<(), StoreError> {
            Ok(())
        }
        fn delete(&self, _path: &str) -> Result<(), StoreError> {
            Ok(())
        }
        fn trash(&self, _path: &str) -> Result<(), StoreError> {
            Ok(())
        }
        fn rename(&self, _from: &str, _to: &str) -> Result<(), StoreError> {
            Ok(())
        }
        fn create_folder(&self, _path: &str) -> Result<(), StoreError> {
            Ok(())
        }
        fn delete_folder(&self, _path: &str) -> Result<(), StoreError> {
            Ok(())
        }
        fn trash_folder(&self, _path: &str) -> Result<(), StoreError> {
            Ok(())
        }
        fn rename_folder(&self, _from: &str, _to: &str) -> Result<(), StoreError> {
            Ok(())
        }
        fn list_files(&self) -> Result<Vec<String>, StoreError> {
            Ok(self.existing.clone())
        }
        fn list_folders(&self) -> Result<Vec<String>, StoreError> {
            Ok(vec![])
        }
        fn available_path(&self, path: &str) -> String {
            path.to_string()
        }
    }

    struct FakeIndex {
        uid: String,
        path: String,
    }

    impl UidIndex for FakeIndex {
        fn path_for_uid(
            &self,
            _uid_key: &str,
            uid: &str,
        ) -> Result<Option<String>, CapabilityError> {
            Ok((uid == self.uid).then(|| self.path.clone()))
        }
    }

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn zero_targeting_keys_fail_with_fixed_message() {
        let err = exactly_one_targeting(&raw(&[("vault", "main")])).unwrap_err();
        assert_eq!(err, FAULTY_TARGETING);
    }

    #[test]
    fn two_targeting_keys_fail_with_fixed_message() {
        let err =
            exactly_one_targeting(&raw(&[("file", "a.md"), ("uid", "x")])).unwrap_err();
        assert_eq!(err, FAULTY_TARGETING);
    }

    #[test]
    fn one_targeting_key_is_accepted() {
        let (key, value) = exactly_one_targeting(&raw(&[("file", "a.md")])).unwrap();
        assert_eq!(key, TargetKey::File);
        assert_eq!(value, "a.md");
    }

    fn resolver_fixture<'a>(
        store: &'a FakeStore,
        index: &'a FakeIndex,
        periodic: &'a PeriodicSet,
    ) -> VaultResolver<'a> {
        VaultResolver { store, index, periodic, uid_key: "uid" }
    }

    #[test]
    fn file_targeting_sanitizes_and_checks_existence() {
        let store = FakeStore { existing: vec!["notes/a.md".into()] };
        let index = FakeIndex { uid: String::new(), path: String::new() };
        let periodic = PeriodicSet::new();
        let resolver = resolver_fixture(&store, &index, &periodic);

        let target = resolver.resolve(TargetKey::File, "/notes/a").unwrap();
        assert_eq!(target.path, "notes/a.md");
        assert!(target.exists);
    }

    #[test]
    fn uid_targeting_resolves_through_the_index() {
        let store = FakeStore { existing: vec!["zettel/x.md".into()] };
        let index = FakeIndex { uid: "20260826".into(), path: "zettel/x.md".into() };
        let periodic = PeriodicSet::new();
        let resolver = resolver_fixture(&store, &index, &periodic);

        let target = resolver.resolve(TargetKey::Uid, "20260826").unwrap();
        assert_eq!(target.source, TargetKey::Uid);
        assert_eq!(target.path, "zettel/x.md");

        let miss = resolver.resolve(TargetKey::Uid, "other").unwrap_err();
        assert!(matches!(miss, TargetingError::Invalid(_)));
    }

    #[test]
    fn disabled_periodic_kind_is_a_typed_failure() {
        let store = FakeStore { existing: vec![] };
        let index = FakeIndex { uid: String::new(), path: String::new() };
        let periodic = PeriodicSet::new();
        let resolver = resolver_fixture(&store, &index, &periodic);

        let err = resolver.resolve(TargetKey::PeriodicNote, "daily").unwrap_err();
        assert!(matches!(
            err,
            TargetingError::Unavailable { code: ErrorCode::PreconditionFailed, .. }
        ));
    }

    #[test]
    fn enabled_periodic_kind_resolves_todays_path() {
        let store = FakeStore { existing: vec![] };
        let index = FakeIndex { uid: String::new(), path: String::new() };
        let periodic = PeriodicSet::new().with(
            PeriodKind::Daily,
            PeriodicKindConfig { folder: "daily".into(), format: "%Y-%m-%d".into() },
        );
        let resolver = resolver_fixture(&store, &index, &periodic);

        let target = resolver.resolve(TargetKey::PeriodicNote, "daily").unwrap();
        assert!(target.path.starts_with("daily/"));
        assert!(target.path.ends_with(".md"));
        assert!(!target.exists);
    }
}
