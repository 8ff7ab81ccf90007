//! Headline-targeted insertion into markdown documents.
//!
//! Parsing goes through comrak for reliable heading detection, but the
//! insertion itself is string-based so the original formatting (wikilinks,
//! spacing) survives untouched.

use comrak::nodes::{NodeValue, Sourcepos};
use comrak::{Arena, Options, parse_document};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarkdownError {
    #[error("headline not found: {0}")]
    HeadlineNotFound(String),
}

/// Where inside the matched section to insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    /// Right below the headline, before existing section content.
    Begin,
    /// At the end of the section, before the next same-or-higher heading.
    End,
}

#[derive(Debug)]
struct SectionBounds {
    /// Byte offset after the heading line.
    content_start: usize,
    /// Byte offset before the next heading of same or higher level, or EOF.
    content_end: usize,
}

/// Insert `fragment` into the section opened by the heading whose text
/// equals `headline` (trimmed, exact match).
pub fn insert_below_headline(
    input: &str,
    headline: &str,
    fragment: &str,
    position: InsertPosition,
) -> Result<String, MarkdownError> {
    let bounds = find_section_bounds(input, headline)?;

    if fragment.trim().is_empty() {
        return Ok(input.to_string());
    }

    let insert_point = match position {
        InsertPosition::Begin => bounds.content_start,
        InsertPosition::End => {
            let section = &input[bounds.content_start..bounds.content_end];
            bounds.content_start + content_end_before_blanks(section)
        }
    };

    let mut result = String::with_capacity(input.len() + fragment.len() + 2);
    result.push_str(&input[..insert_point]);
    if !result.is_empty() && !result.ends_with('\n') {
        result.push('\n');
    }
    result.push_str(fragment);
    if !fragment.ends_with('\n') {
        result.push('\n');
    }
    result.push_str(&input[insert_point..]);
    Ok(result)
}

fn find_section_bounds(input: &str, headline: &str) -> Result<SectionBounds, MarkdownError> {
    let arena = Arena::new();
    let options = default_options();
    let root = parse_document(&arena, input, &options);

    let mut headings: Vec<(u8, String, Sourcepos)> = Vec::new();
    for node in root.descendants() {
        if let NodeValue::Heading(ref heading) = node.data.borrow().value {
            let title = collect_text(node);
            let sourcepos = node.data.borrow().sourcepos;
            headings.push((heading.level, title, sourcepos));
        }
    }

    let (level, _, pos) = headings
        .iter()
        .find(|(_, title, _)| title.trim() == headline.trim())
        .ok_or_else(|| MarkdownError::HeadlineNotFound(headline.to_string()))?;

    let content_start = line_end_offset(input, pos.end.line);
    let content_end = headings
        .iter()
        .filter(|(next_level, _, next_pos)| {
            next_pos.start.line > pos.start.line && next_level <= level
        })
        .map(|(_, _, next_pos)| line_start_offset(input, next_pos.start.line))
        .min()
        .unwrap_or(input.len());

    Ok(SectionBounds { content_start, content_end })
}

/// Byte offset at the end of `line_num` (after its newline if present).
fn line_end_offset(input: &str, line_num: usize) -> usize {
    let mut current_line = 1;
    for (i, ch) in input.char_indices() {
        if ch == '\n' {
            if current_line == line_num {
                return i + 1;
            }
            current_line += 1;
        }
    }
    input.len()
}

/// Byte offset at the start of `line_num`.
fn line_start_offset(input: &str, line_num: usize) -> usize {
    if line_num <= 1 {
        return 0;
    }
    let mut current_line = 1;
    for (i, ch) in input.char_indices() {
        if ch == '\n' {
            current_line += 1;
            if current_line == line_num {
                return i + 1;
            }
        }
    }
    input.len()
}

/// End of actual section content, before trailing blank lines, relative to
/// the section start.
fn content_end_before_blanks(section: &str) -> usize {
    let bytes = section.as_bytes();
    let mut end = bytes.len();
    while end > 0
        && (bytes[end - 1] == b'\n' || bytes[end - 1] == b' ' || bytes[end - 1] == b'\t')
    {
        end -= 1;
    }
    if end < bytes.len()
        && let Some(newline) = bytes[end..].iter().position(|&b| b == b'\n')
    {
        return end + newline + 1;
    }
    end
}

fn default_options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.tasklist = true;
    options.parse.smart = false;
    options
}

fn collect_text<'a>(node: &'a comrak::nodes::AstNode<'a>) -> String {
    let mut text = String::new();
    for child in node.descendants() {
        if let NodeValue::Text(ref t) = child.data.borrow().value {
            text.push_str(t);
        }
    }
    text
}
