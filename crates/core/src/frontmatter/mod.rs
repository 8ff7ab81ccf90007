//! YAML frontmatter parsing, serialization, and modification.

mod parser;
mod serializer;

pub use parser::{FrontmatterParseError, parse};
pub use serializer::{frontmatter_to_yaml, serialize};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// Parsed YAML frontmatter of a markdown document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Frontmatter {
    #[serde(flatten)]
    pub fields: HashMap<String, Value>,
}

impl Frontmatter {
    /// Whether the unique-id field holds `uid`, either as a scalar or as a
    /// member of a sequence.
    #[must_use]
    pub fn uid_matches(&self, uid_key: &str, uid: &str) -> bool {
        match self.fields.get(uid_key) {
            Some(Value::Sequence(items)) => items.iter().any(|item| scalar_eq(item, uid)),
            Some(value) => scalar_eq(value, uid),
            None => false,
        }
    }
}

fn scalar_eq(value: &Value, expected: &str) -> bool {
    match value {
        Value::String(s) => s == expected,
        Value::Number(n) => n.to_string() == expected,
        _ => false,
    }
}

/// Result of splitting frontmatter from markdown.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub frontmatter: Option<Frontmatter>,
    /// The markdown body (everything after frontmatter).
    pub body: String,
}

/// Convert the fields map to a JSON object, for the index and the
/// note-properties routes.
#[must_use]
pub fn fields_to_json(frontmatter: &Frontmatter) -> serde_json::Value {
    serde_json::to_value(&frontmatter.fields).unwrap_or(serde_json::Value::Null)
}

/// Convert a JSON object back into frontmatter fields. Non-object input
/// yields an empty map.
#[must_use]
pub fn fields_from_json(value: &serde_json::Value) -> HashMap<String, Value> {
    let Some(object) = value.as_object() else {
        return HashMap::new();
    };
    object
        .iter()
        .filter_map(|(k, v)| serde_yaml::to_value(v).ok().map(|yaml| (k.clone(), yaml)))
        .collect()
}
