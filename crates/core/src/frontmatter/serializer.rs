//! Frontmatter serialization back to markdown.

use std::collections::HashMap;

use serde_yaml::Value;

use super::{Frontmatter, ParsedDocument};

/// Serialize a parsed document back to a markdown string. Fields are
/// emitted sorted so repeated writes stay stable.
#[must_use]
pub fn serialize(doc: &ParsedDocument) -> String {
    if let Some(fm) = &doc.frontmatter
        && !fm.fields.is_empty()
    {
        let yaml = serialize_fields(&fm.fields);
        return format!("---\n{yaml}---\n\n{}", doc.body);
    }
    doc.body.clone()
}

/// Serialize a frontmatter struct to a YAML string without delimiters.
#[must_use]
pub fn frontmatter_to_yaml(fm: &Frontmatter) -> String {
    serialize_fields(&fm.fields)
}

fn serialize_fields(fields: &HashMap<String, Value>) -> String {
    let mut keys: Vec<_> = fields.keys().collect();
    keys.sort();

    let mut mapping = serde_yaml::Mapping::new();
    for key in keys {
        if let Some(value) = fields.get(key) {
            mapping.insert(Value::String(key.clone()), value.clone());
        }
    }
    serde_yaml::to_string(&mapping).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::parse;

    #[test]
    fn serialize_document_without_frontmatter() {
        let doc = ParsedDocument { frontmatter: None, body: "# Hello\n\nWorld".to_string() };
        assert_eq!(serialize(&doc), "# Hello\n\nWorld");
    }

    #[test]
    fn serialize_document_with_frontmatter() {
        let mut fields = HashMap::new();
        fields.insert("title".to_string(), Value::String("Test".to_string()));

        let doc = ParsedDocument {
            frontmatter: Some(Frontmatter { fields }),
            body: "# Content".to_string(),
        };

        let result = serialize(&doc);
        assert!(result.starts_with("---\n"));
        assert!(result.contains("title: Test"));
        assert!(result.ends_with("---\n\n# Content"));
    }

    #[test]
    fn empty_frontmatter_serializes_to_bare_body() {
        let doc = ParsedDocument {
            frontmatter: Some(Frontmatter::default()),
            body: "body".to_string(),
        };
        assert_eq!(serialize(&doc), "body");
    }

    #[test]
    fn roundtrip_frontmatter() {
        let original = "---\ntitle: Hello\ncount: 42\n---\n\n# Body";
        let parsed = parse(original).unwrap();
        let serialized = serialize(&parsed);

        let reparsed = parse(&serialized).unwrap();
        let fm = reparsed.frontmatter.unwrap();
        assert_eq!(fm.fields.get("title").and_then(|v| v.as_str()), Some("Hello"));
        assert_eq!(fm.fields.get("count").and_then(serde_yaml::Value::as_i64), Some(42));
    }
}
