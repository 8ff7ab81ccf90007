//! Tagged-union result model shared by every handler and the dispatcher.

use std::collections::BTreeMap;

use crate::error::ErrorCode;

/// A single value in a success outcome's result record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultValue {
    Text(String),
    /// Array values are JSON-stringified when encoded onto a callback URL.
    Items(Vec<String>),
}

impl From<String> for ResultValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for ResultValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<String>> for ResultValue {
    fn from(value: Vec<String>) -> Self {
        Self::Items(value)
    }
}

/// Outcome of one handler invocation. Exactly one variant, no partial states.
///
/// The result record is a `BTreeMap` so callback encoding sees the keys in
/// lexicographic order without a separate sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    Success {
        result: BTreeMap<String, ResultValue>,
        /// The note/file path the handler touched, used by the dispatcher's
        /// open-after-success step.
        processed_path: Option<String>,
    },
    Failure {
        code: ErrorCode,
        message: String,
    },
}

impl HandlerOutcome {
    /// An empty success outcome.
    #[must_use]
    pub fn success() -> Self {
        Self::Success { result: BTreeMap::new(), processed_path: None }
    }

    #[must_use]
    pub fn failure(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Failure { code, message: message.into() }
    }

    /// Add a key to the result record. No-op on the failure variant.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ResultValue>) -> Self {
        if let Self::Success { ref mut result, .. } = self {
            result.insert(key.into(), value.into());
        }
        self
    }

    /// Record the path the handler touched. No-op on the failure variant.
    #[must_use]
    pub fn processed(mut self, path: impl Into<String>) -> Self {
        if let Self::Success { ref mut processed_path, .. } = self {
            *processed_path = Some(path.into());
        }
        self
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[must_use]
    pub fn processed_path(&self) -> Option<&str> {
        match self {
            Self::Success { processed_path, .. } => processed_path.as_deref(),
            Self::Failure { .. } => None,
        }
    }
}
