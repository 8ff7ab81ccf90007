//! Declarative per-route parameter schemas and validation.
//!
//! A [`ParamSchema`] lists the fields a route accepts, how each raw string
//! is coerced, and which cross-field refinements apply. Validation either
//! produces a typed [`Params`] bag or a list of field-level issues the
//! dispatcher flattens into one message.

pub mod sanitize;

use std::collections::HashMap;
use std::fmt;

use crate::error::ErrorCode;
use crate::targeting::{ResolvedTarget, TargetResolver, TargetingError, exactly_one_targeting};

/// Coercion rule for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    NonEmptyText,
    /// Absence, `""` and `"false"` are false; any other string is true.
    MercifulBool,
    /// Never honored as true, regardless of caller input.
    AlwaysFalseBool,
    Number,
    /// Split on `,` into an ordered sequence of trimmed strings.
    CommaList,
    NotePath,
    FilePath,
    FolderPath,
    /// Must parse as a well-formed absolute URL.
    Url,
    /// Parsed from a string; parse failures are validation errors.
    Json,
    /// Value must be one of the listed literals.
    Choice(&'static [&'static str]),
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<&'static str>,
}

#[must_use]
pub fn required(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, kind, required: true, default: None }
}

#[must_use]
pub fn optional(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, kind, required: false, default: None }
}

impl FieldSpec {
    /// Value used when the parameter is absent.
    #[must_use]
    pub fn or(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }
}

/// Note-targeting refinement mode for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetingMode {
    #[default]
    None,
    /// Exactly one targeting key; the resolved path may not exist yet.
    Soft,
    /// Exactly one targeting key; the resolved path must exist.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallbackUrls {
    Optional,
    Required,
}

/// One field-level validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub path: Vec<String>,
    pub message: String,
}

impl Issue {
    #[must_use]
    pub fn field(name: &str, message: impl Into<String>) -> Self {
        Self { path: vec![name.to_string()], message: message.into() }
    }

    /// An issue spanning the whole call rather than one field.
    #[must_use]
    pub fn call(message: impl Into<String>) -> Self {
        Self { path: vec![], message: message.into() }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path.join("."), self.message)
        }
    }
}

/// Why validation did not produce a `Params` bag.
#[derive(Debug)]
pub enum ValidationFailure {
    /// Schema violations, terminal at the dispatcher (code 400).
    Issues(Vec<Issue>),
    /// A failure only knowable at resolution time (e.g. a disabled
    /// periodic-note kind); delivered like a handler failure.
    Typed { code: ErrorCode, message: String },
}

/// A coerced field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Bool(bool),
    Number(f64),
    List(Vec<String>),
    Json(serde_json::Value),
}

/// Validated, typed parameter bag handed to a handler.
#[derive(Debug, Clone, Default)]
pub struct Params {
    values: HashMap<&'static str, Value>,
    target: Option<ResolvedTarget>,
}

impl Params {
    #[must_use]
    pub fn str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(Value::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Boolean fields default to false when absent.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(Value::Bool(true)))
    }

    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.values.get(name) {
            Some(Value::Number(n)) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn list(&self, name: &str) -> Option<&[String]> {
        match self.values.get(name) {
            Some(Value::List(items)) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn json(&self, name: &str) -> Option<&serde_json::Value> {
        match self.values.get(name) {
            Some(Value::Json(v)) => Some(v),
            _ => None,
        }
    }

    /// The resolved note target, present on note-targeting routes.
    #[must_use]
    pub fn target(&self) -> Option<&ResolvedTarget> {
        self.target.as_ref()
    }
}

/// Declarative description of the parameters one route accepts.
#[derive(Debug, Clone)]
pub struct ParamSchema {
    fields: Vec<FieldSpec>,
    targeting: TargetingMode,
    callbacks: CallbackUrls,
    exclusive: Vec<[&'static str; 2]>,
}

impl ParamSchema {
    /// Schema with the reserved base fields; callback URLs optional.
    #[must_use]
    pub fn new() -> Self {
        Self::with_callbacks(CallbackUrls::Optional)
    }

    /// Schema for read-oriented routes: `x-success`/`x-error` required.
    #[must_use]
    pub fn read() -> Self {
        Self::with_callbacks(CallbackUrls::Required)
    }

    fn with_callbacks(callbacks: CallbackUrls) -> Self {
        let url = |name| match callbacks {
            CallbackUrls::Required => required(name, FieldKind::Url),
            CallbackUrls::Optional => optional(name, FieldKind::Url),
        };
        Self {
            fields: vec![
                required("action", FieldKind::Text),
                required("vault", FieldKind::NonEmptyText),
                optional("debug-mode", FieldKind::MercifulBool),
                optional("hide-ui-notice-on-error", FieldKind::MercifulBool),
                optional("x-source", FieldKind::Text),
                optional("call-id", FieldKind::Text),
                url("x-success"),
                url("x-error"),
            ],
            targeting: TargetingMode::None,
            callbacks,
            exclusive: vec![],
        }
    }

    #[must_use]
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    #[must_use]
    pub fn targeting(mut self, mode: TargetingMode) -> Self {
        self.targeting = mode;
        self
    }

    /// Declare two fields mutually exclusive.
    #[must_use]
    pub fn exclusive(mut self, a: &'static str, b: &'static str) -> Self {
        self.exclusive.push([a, b]);
        self
    }

    /// `silent` suppresses open-after-success.
    #[must_use]
    pub fn silent(self) -> Self {
        self.field(optional("silent", FieldKind::MercifulBool))
    }

    /// `silent` accepted but never honored; used on routes whose whole
    /// point is opening a document.
    #[must_use]
    pub fn silent_forced(self) -> Self {
        self.field(optional("silent", FieldKind::AlwaysFalseBool))
    }

    /// Names of required fields, for diagnostics and route listings.
    #[must_use]
    pub fn required_names(&self) -> Vec<&'static str> {
        self.fields.iter().filter(|f| f.required).map(|f| f.name).collect()
    }

    #[must_use]
    pub fn targeting_mode(&self) -> TargetingMode {
        self.targeting
    }

    /// Validate and coerce a raw parameter mapping.
    pub fn validate(
        &self,
        raw: &HashMap<String, String>,
        resolver: &dyn TargetResolver,
    ) -> Result<Params, ValidationFailure> {
        let mut issues = Vec::new();
        let mut values = HashMap::new();

        for spec in &self.fields {
            let raw_value = raw.get(spec.name).map(String::as_str).or(spec.default);
            match coerce(spec, raw_value) {
                Ok(Some(value)) => {
                    values.insert(spec.name, value);
                }
                Ok(None) => {}
                Err(message) => issues.push(Issue::field(spec.name, message)),
            }
        }

        for [a, b] in &self.exclusive {
            if raw.contains_key(*a) && raw.contains_key(*b) {
                issues.push(Issue::call(format!("only one of `{a}` and `{b}` may be provided")));
            }
        }

        let mut target = None;
        if self.targeting != TargetingMode::None {
            match exactly_one_targeting(raw) {
                Err(message) => issues.push(Issue::call(message)),
                // Resolution touches the store; skip it when the call is
                // already known to be invalid.
                Ok((key, value)) if issues.is_empty() => {
                    match resolver.resolve(key, &value) {
                        Ok(resolved) => {
                            if self.targeting == TargetingMode::Strict && !resolved.exists {
                                issues.push(Issue::field(
                                    key.as_str(),
                                    format!("targeted note does not exist: {}", resolved.path),
                                ));
                            } else {
                                target = Some(resolved);
                            }
                        }
                        Err(TargetingError::Invalid(message)) => {
                            issues.push(Issue::field(key.as_str(), message));
                        }
                        Err(TargetingError::Unavailable { code, message }) => {
                            return Err(ValidationFailure::Typed { code, message });
                        }
                    }
                }
                Ok(_) => {}
            }
        }

        if issues.is_empty() {
            Ok(Params { values, target })
        } else {
            Err(ValidationFailure::Issues(issues))
        }
    }
}

impl Default for ParamSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// The merciful boolean rule, also applied by the dispatcher to raw input.
#[must_use]
pub fn merciful_bool(value: Option<&str>) -> bool {
    !matches!(value, None | Some("") | Some("false"))
}

fn is_absolute_url(value: &str) -> bool {
    value.split_once("://").is_some_and(|(scheme, rest)| {
        !scheme.is_empty()
            && scheme.chars().all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c))
            && !rest.is_empty()
    })
}

/// Coerce one raw value per its field kind. `Ok(None)` means the optional
/// field is simply absent.
fn coerce(spec: &FieldSpec, raw: Option<&str>) -> Result<Option<Value>, String> {
    match spec.kind {
        FieldKind::MercifulBool => return Ok(Some(Value::Bool(merciful_bool(raw)))),
        FieldKind::AlwaysFalseBool => return Ok(Some(Value::Bool(false))),
        _ => {}
    }

    let Some(raw) = raw else {
        return if spec.required {
            Err("required parameter missing".to_string())
        } else {
            Ok(None)
        };
    };

    match spec.kind {
        FieldKind::Text => Ok(Some(Value::Text(raw.to_string()))),
        FieldKind::NonEmptyText => {
            if raw.is_empty() {
                Err("must not be empty".to_string())
            } else {
                Ok(Some(Value::Text(raw.to_string())))
            }
        }
        FieldKind::Number => raw
            .parse::<f64>()
            .map(|n| Some(Value::Number(n)))
            .map_err(|_| format!("`{raw}` is not a number")),
        FieldKind::CommaList => {
            let items = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect();
            Ok(Some(Value::List(items)))
        }
        FieldKind::NotePath => non_empty_path(sanitize::note_path(raw)),
        FieldKind::FilePath => non_empty_path(sanitize::file_path(raw)),
        FieldKind::FolderPath => non_empty_path(sanitize::folder_path(raw)),
        FieldKind::Url => {
            if is_absolute_url(raw) {
                Ok(Some(Value::Text(raw.to_string())))
            } else {
                Err(format!("`{raw}` is not a well-formed absolute URL"))
            }
        }
        FieldKind::Json => serde_json::from_str(raw)
            .map(|v| Some(Value::Json(v)))
            .map_err(|e| format!("invalid JSON: {e}")),
        FieldKind::Choice(allowed) => {
            if allowed.contains(&raw) {
                Ok(Some(Value::Text(raw.to_string())))
            } else {
                Err(format!("must be one of {}", allowed.join(", ")))
            }
        }
        FieldKind::MercifulBool | FieldKind::AlwaysFalseBool => unreachable!(),
    }
}

fn non_empty_path(path: String) -> Result<Option<Value>, String> {
    if path.is_empty() {
        Err("does not name a usable path".to_string())
    } else {
        Ok(Some(Value::Text(path)))
    }
}
