//! Outbound callback URL construction.
//!
//! Encoding is part of the wire protocol and must stay byte-exact: result
//! keys are kebab-cased under the `result-` prefix in lexicographic order,
//! failures carry `error-code` then `error-message`, and an `input-` echo
//! block trails the result block.

use std::collections::BTreeMap;
use std::collections::HashMap;

use crate::error::ErrorCode;
use crate::outcome::ResultValue;
use crate::params::merciful_bool;

/// Prefix for result keys on success callbacks.
pub const RESULT_PREFIX: &str = "result";
/// Prefix for the input echo block.
pub const INPUT_PREFIX: &str = "input";

/// Parameters never echoed back, even in debug mode.
const NEVER_ECHOED: [&str; 3] = ["debug-mode", "x-success", "x-error"];

/// Build the success callback URL for `base`.
#[must_use]
pub fn success_url(
    base: &str,
    result: &BTreeMap<String, ResultValue>,
    raw: &HashMap<String, String>,
) -> String {
    let mut url = base.to_string();
    for (key, value) in result {
        let encoded = match value {
            ResultValue::Text(text) => urlencoding::encode(text).into_owned(),
            ResultValue::Items(items) => {
                let json = serde_json::to_string(items).unwrap_or_default();
                urlencoding::encode(&json).into_owned()
            }
        };
        push_pair(&mut url, &prefixed(RESULT_PREFIX, key), &encoded);
    }
    push_echo_block(&mut url, raw);
    finalize(url)
}

/// Build the failure callback URL for `base`. Two fixed-order parameters,
/// then the echo block.
#[must_use]
pub fn failure_url(
    base: &str,
    code: ErrorCode,
    message: &str,
    raw: &HashMap<String, String>,
) -> String {
    let mut url = base.to_string();
    push_pair(&mut url, "error-code", &code.code().to_string());
    push_pair(&mut url, "error-message", &urlencoding::encode(message));
    push_echo_block(&mut url, raw);
    finalize(url)
}

/// Echo block: everything except the debug flag and both callback URLs when
/// debug mode was requested, otherwise only the call identifier.
fn push_echo_block(url: &mut String, raw: &HashMap<String, String>) {
    if merciful_bool(raw.get("debug-mode").map(String::as_str)) {
        let mut keys: Vec<&String> =
            raw.keys().filter(|k| !NEVER_ECHOED.contains(&k.as_str())).collect();
        keys.sort();
        for key in keys {
            if let Some(value) = raw.get(key) {
                push_pair(url, &prefixed(INPUT_PREFIX, key), &urlencoding::encode(value));
            }
        }
    } else if let Some(call_id) = raw.get("call-id") {
        push_pair(url, &prefixed(INPUT_PREFIX, "call-id"), &urlencoding::encode(call_id));
    }
}

fn prefixed(prefix: &str, key: &str) -> String {
    format!("{prefix}-{}", kebab_case(key))
}

/// camelCase to kebab-case; keys already containing hyphens pass through.
fn kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 2);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn push_pair(url: &mut String, key: &str, encoded_value: &str) {
    url.push(if url.contains('?') { '&' } else { '?' });
    url.push_str(key);
    url.push('=');
    url.push_str(encoded_value);
}

/// Final encoding fix-up: the intermediate encoding convention produces `+`
/// where a literal space is intended, so every `+` becomes `%20`.
fn finalize(url: String) -> String {
    url.replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    fn result(pairs: &[(&str, ResultValue)]) -> BTreeMap<String, ResultValue> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect()
    }

    #[test]
    fn camel_case_keys_become_kebab_case() {
        let result = result(&[("pluginVersion", ResultValue::Text("1.2.3".into()))]);
        let url = success_url("https://cb.example/ok", &result, &raw(&[]));
        assert_eq!(url, "https://cb.example/ok?result-plugin-version=1.2.3");
    }

    #[test]
    fn result_keys_are_lexicographically_ordered() {
        let result = result(&[
            ("zebra", ResultValue::Text("z".into())),
            ("alpha", ResultValue::Text("a".into())),
            ("mid", ResultValue::Text("m".into())),
        ]);
        let url = success_url("https://cb.example/ok", &result, &raw(&[]));
        insta::assert_snapshot!(
            url,
            @"https://cb.example/ok?result-alpha=a&result-mid=m&result-zebra=z"
        );
    }

    #[test]
    fn array_values_are_json_stringified() {
        let result =
            result(&[("tags", ResultValue::Items(vec!["a".into(), "b c".into()]))]);
        let url = success_url("https://cb.example/ok", &result, &raw(&[]));
        insta::assert_snapshot!(
            url,
            @r#"https://cb.example/ok?result-tags=%5B%22a%22%2C%22b%20c%22%5D"#
        );
    }

    #[test]
    fn failure_carries_code_then_message() {
        let url = failure_url(
            "https://cb.example/err",
            ErrorCode::NotFound,
            "note not found",
            &raw(&[]),
        );
        insta::assert_snapshot!(
            url,
            @"https://cb.example/err?error-code=404&error-message=note%20not%20found"
        );
    }

    #[test]
    fn call_id_is_echoed_without_debug_mode() {
        let url = failure_url(
            "https://cb.example/err",
            ErrorCode::BadRequest,
            "bad",
            &raw(&[("call-id", "42"), ("vault", "main")]),
        );
        assert!(url.contains("input-call-id=42"));
        assert!(!url.contains("input-vault"));
    }

    #[test]
    fn debug_mode_echoes_everything_except_stripped_keys() {
        let input = raw(&[
            ("debug-mode", "yes"),
            ("vault", "main"),
            ("action", "note get"),
            ("x-success", "https://cb.example/ok"),
            ("x-error", "https://cb.example/err"),
        ]);
        let url = success_url("https://cb.example/ok", &result(&[]), &input);
        insta::assert_snapshot!(
            url,
            @"https://cb.example/ok?input-action=note%20get&input-vault=main"
        );
    }

    #[test]
    fn base_url_with_existing_query_continues_with_ampersand() {
        let result = result(&[("ok", ResultValue::Text("1".into()))]);
        let url = success_url("https://cb.example/ok?id=7", &result, &raw(&[]));
        assert_eq!(url, "https://cb.example/ok?id=7&result-ok=1");
    }

    #[test]
    fn literal_plus_is_rewritten_to_percent_twenty() {
        let url = success_url("https://cb.example/a+b", &result(&[]), &raw(&[]));
        assert_eq!(url, "https://cb.example/a%20b");
    }
}
