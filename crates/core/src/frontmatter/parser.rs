//! Frontmatter parsing from markdown documents.

use thiserror::Error;

use super::{Frontmatter, ParsedDocument};

#[derive(Debug, Error)]
pub enum FrontmatterParseError {
    #[error("invalid YAML frontmatter: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
}

/// Parse frontmatter from markdown content.
///
/// Frontmatter is delimited by `---` at the start of the document. A
/// document without an opening delimiter, or without a closing one, is
/// treated as having no frontmatter at all.
pub fn parse(content: &str) -> Result<ParsedDocument, FrontmatterParseError> {
    let trimmed = content.trim_start();
    if !trimmed.starts_with("---") {
        return Ok(ParsedDocument { frontmatter: None, body: content.to_string() });
    }

    let after_first = &trimmed[3..];
    let after_newline = after_first
        .strip_prefix('\n')
        .or_else(|| after_first.strip_prefix("\r\n"))
        .unwrap_or(after_first);

    let Some(end_pos) = find_closing_delimiter(after_newline) else {
        return Ok(ParsedDocument { frontmatter: None, body: content.to_string() });
    };

    let yaml_content = &after_newline[..end_pos];
    let after_closing = &after_newline[end_pos + 3..];
    let body = after_closing
        .strip_prefix('\n')
        .or_else(|| after_closing.strip_prefix("\r\n"))
        .unwrap_or(after_closing)
        .to_string();

    let frontmatter: Frontmatter = if yaml_content.trim().is_empty() {
        Frontmatter::default()
    } else {
        serde_yaml::from_str(yaml_content.trim())?
    };

    Ok(ParsedDocument { frontmatter: Some(frontmatter), body })
}

/// Byte position of the closing `---` line.
fn find_closing_delimiter(content: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.trim() == "---" {
            let pos: usize = content.lines().take(i).map(|l| l.len() + 1).sum();
            return Some(pos);
        }
    }
    None
}
