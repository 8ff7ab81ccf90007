//! Parsing of `mduri://` request URIs into a raw call.

use std::collections::HashMap;

use thiserror::Error;

/// Scheme the host registers for.
pub const SCHEME: &str = "mduri";

/// The raw request: a route path plus a flat string-to-string parameter
/// mapping. Repeated query keys are not supported; the last one wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallInput {
    pub route_path: String,
    pub params: HashMap<String, String>,
}

#[derive(Debug, Error)]
pub enum UriError {
    #[error("empty URI")]
    Empty,

    #[error("unsupported scheme `{0}`, expected `{SCHEME}`")]
    BadScheme(String),
}

/// Normalize a route path: single separator, no leading or trailing
/// separator, case-sensitive beyond that.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    path.split('/').filter(|segment| !segment.is_empty()).collect::<Vec<_>>().join("/")
}

/// Parse a request URI. The scheme prefix is optional so the CLI also
/// accepts bare `namespace/segment?query` strings.
pub fn parse(input: &str) -> Result<CallInput, UriError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UriError::Empty);
    }

    let rest = match input.split_once("://") {
        Some((scheme, rest)) if scheme == SCHEME => rest,
        Some((scheme, _)) => return Err(UriError::BadScheme(scheme.to_string())),
        None => input,
    };

    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };

    let mut params = HashMap::new();
    if let Some(query) = query {
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            params.insert(decode_component(key), decode_component(value));
        }
    }

    Ok(CallInput { route_path: normalize_path(path), params })
}

/// Query-string decoding: `+` means space, then percent-decode. Undecodable
/// sequences pass through untouched.
fn decode_component(raw: &str) -> String {
    let plus_decoded = raw.replace('+', " ");
    match urlencoding::decode(&plus_decoded) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => plus_decoded,
    }
}
