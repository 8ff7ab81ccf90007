//! Path sanitization for caller-supplied file and folder parameters.
//!
//! Callers hand us query-string values, not trusted paths. Sanitization
//! collapses separators, drops `.`/`..` segments so a path can never escape
//! the vault root, and strips the characters the note store refuses.

/// Extension appended to note paths that do not already carry it.
pub const NOTE_EXTENSION: &str = "md";

const DISALLOWED: &[char] = &[':', '#', '^', '[', ']', '|'];

fn clean_segments(input: &str) -> Vec<String> {
    input
        .replace('\\', "/")
        .split('/')
        .map(|segment| segment.replace(DISALLOWED, "-").trim().to_string())
        .filter(|segment| !segment.is_empty() && segment != "." && segment != "..")
        .collect()
}

/// Sanitize a generic file path (any extension allowed).
#[must_use]
pub fn file_path(input: &str) -> String {
    clean_segments(input).join("/")
}

/// Sanitize a note path, appending the note extension when missing.
#[must_use]
pub fn note_path(input: &str) -> String {
    let mut path = file_path(input);
    if !path.is_empty() && !path.ends_with(&format!(".{NOTE_EXTENSION}")) {
        path.push('.');
        path.push_str(NOTE_EXTENSION);
    }
    path
}

/// Sanitize a folder path. Folders carry a trailing separator and no
/// extension requirement.
#[must_use]
pub fn folder_path(input: &str) -> String {
    let joined = clean_segments(input).join("/");
    if joined.is_empty() { joined } else { format!("{joined}/") }
}
