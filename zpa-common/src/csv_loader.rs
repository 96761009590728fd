//! CSV loading into ordered row mappings
//!
//! No schema is enforced here; callers look columns up by name and must
//! tolerate missing ones.

use crate::{Error, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// One CSV row: column name → trimmed value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: HashMap<String, String>,
}

impl Row {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Value of `column`, or `None` when the column is absent or empty
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Read `path` into rows, preserving file order
///
/// # Errors
/// - `Error::Io` if the file is missing or unreadable
/// - `Error::Parse` on broken framing: unbalanced quotes, ragged rows,
///   invalid UTF-8
pub fn load_rows(path: &Path) -> Result<Vec<Row>> {
    let bytes = std::fs::read(path)?;
    let content = String::from_utf8(bytes)
        .map_err(|e| Error::Parse(format!("{}: invalid UTF-8: {}", path.display(), e)))?;

    let rows = parse_rows(&content)
        .map_err(|e| match e {
            Error::Parse(msg) => Error::Parse(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;

    info!("Loaded {} records from {}", rows.len(), path.display());
    Ok(rows)
}

/// Parse CSV text (first line is the header) into rows
pub fn parse_rows(content: &str) -> Result<Vec<Row>> {
    let content = content.trim_start_matches('\u{feff}');

    // Escaped quotes are doubled, so well-formed input always has an even count
    if content.bytes().filter(|b| *b == b'"').count() % 2 != 0 {
        return Err(Error::Parse("unbalanced quotes".to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(Row::from_pairs(
            headers.iter().cloned().zip(record.iter().map(str::to_string)),
        ));
    }

    Ok(rows)
}
