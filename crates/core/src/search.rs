//! Full-text search over the vault, plus row normalization for external
//! search providers.

use crate::host::{NoteStore, StoreError};

/// One match inside a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub path: String,
    /// 1-based line number of the match.
    pub line: usize,
    pub snippet: String,
}

/// Case-sensitive substring search over every note in the store.
pub fn search_store(store: &dyn NoteStore, query: &str) -> Result<Vec<SearchHit>, StoreError> {
    let mut hits = Vec::new();
    for path in store.list_files()? {
        if !path.ends_with(".md") {
            continue;
        }
        let content = store.read(&path)?;
        for (number, line) in content.lines().enumerate() {
            if line.contains(query) {
                hits.push(SearchHit {
                    path: path.clone(),
                    line: number + 1,
                    snippet: line.trim().to_string(),
                });
            }
        }
    }
    Ok(hits)
}

/// Row data from an external search provider.
///
/// Providers return logically equivalent results at two different
/// dimensionalities depending on the query shape. Consumers must go through
/// [`normalize_rows`] before processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rows {
    Flat(Vec<Vec<String>>),
    Nested(Vec<Vec<Vec<String>>>),
}

/// Normalize provider rows to a fixed two-dimensional shape.
#[must_use]
pub fn normalize_rows(rows: Rows) -> Vec<Vec<String>> {
    match rows {
        Rows::Flat(rows) => rows,
        Rows::Nested(groups) => groups.into_iter().flatten().collect(),
    }
}
