//! Canonical error taxonomy shared by every handler and the dispatcher.
//!
//! The numeric values travel across the callback boundary (`error-code=<n>`),
//! so they are fixed protocol constants, not implementation details.

use std::fmt;

/// Error codes with canonical numeric values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Schema validation failed, or the store refused a write.
    BadRequest,
    /// Target note/file/folder/vault does not exist.
    NotFound,
    /// Target exists but a required precondition was not met.
    NotAllowed,
    /// Value well-formed but semantically rejected (e.g. a bad regex).
    InvalidInput,
    /// Policy violation, e.g. note already exists.
    Conflict,
    /// A required optional capability is not enabled.
    PreconditionFailed,
    /// An external provider the route depends on is unavailable.
    FailedDependency,
    /// Unexpected fault from a handler, or an internal invariant violation.
    HandlerError,
}

impl ErrorCode {
    /// Canonical numeric value used on the wire.
    #[must_use]
    pub fn code(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::NotAllowed => 405,
            Self::InvalidInput => 406,
            Self::Conflict => 409,
            Self::PreconditionFailed => 412,
            Self::FailedDependency => 424,
            Self::HandlerError => 500,
        }
    }

    /// Canonical message string.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::BadRequest => "bad request",
            Self::NotFound => "not found",
            Self::NotAllowed => "not allowed",
            Self::InvalidInput => "invalid input",
            Self::Conflict => "conflict",
            Self::PreconditionFailed => "precondition failed",
            Self::FailedDependency => "failed dependency",
            Self::HandlerError => "handler error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.label())
    }
}
