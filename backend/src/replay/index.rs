//! Persisted mapping from table name to recorded canonical keys.
//!
//! The index is a JSON object of arrays:
//!
//! ```json
//! {
//!   "koi": [
//!     "format=ipac&select=*&table=koi&where=kepid%3D10601284"
//!   ]
//! }
//! ```
//!
//! A key's position in its table's array is the index of its fixture file.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorContext, QueryError, QueryResult};

/// Table name -> ordered canonical keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixtureIndex {
    tables: BTreeMap<String, Vec<String>>,
}

impl FixtureIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the index at `path`. A missing file yields an empty index.
    pub fn load(path: &Path) -> QueryResult<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(QueryError::io(path, e).with_operation("load_index")),
        };

        serde_json::from_str(&content).map_err(|e| QueryError::Parse {
            message: format!("Malformed fixture index: {}", e),
            context: ErrorContext::new("load_index").with_details(path.display().to_string()),
        })
    }

    /// Write the complete index to `path`, tables sorted by name and indented
    /// by two spaces.
    pub fn save(&self, path: &Path) -> QueryResult<()> {
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        fs::write(path, content).map_err(|e| QueryError::io(path, e).with_operation("save_index"))
    }

    /// Position of `key` within `table`, if recorded.
    pub fn position(&self, table: &str, key: &str) -> Option<usize> {
        self.tables
            .get(table)
            .and_then(|keys| keys.iter().position(|k| k == key))
    }

    /// Append `key` to `table` and return its new position. A key that is
    /// already recorded keeps its existing position.
    pub fn append(&mut self, table: &str, key: impl Into<String>) -> usize {
        let key = key.into();
        let keys = self.tables.entry(table.to_string()).or_default();
        if let Some(existing) = keys.iter().position(|k| *k == key) {
            return existing;
        }
        keys.push(key);
        keys.len() - 1
    }

    /// Recorded keys for `table`, in fixture order.
    pub fn keys(&self, table: &str) -> &[String] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Names of all tables with at least one entry.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty_index() {
        let dir = TempDir::new().unwrap();
        let index = FixtureIndex::load(&dir.path().join("responses.json")).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.keys("koi"), &[] as &[String]);
    }

    #[test]
    fn test_append_assigns_sequential_positions() {
        let mut index = FixtureIndex::new();
        assert_eq!(index.append("koi", "a=1"), 0);
        assert_eq!(index.append("koi", "a=2"), 1);
        assert_eq!(index.append("tce", "a=1"), 0);
        assert_eq!(index.append("koi", "a=1"), 0);
        assert_eq!(index.position("koi", "a=2"), Some(1));
        assert_eq!(index.position("koi", "a=3"), None);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_save_is_sorted_and_indented() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("responses.json");

        let mut index = FixtureIndex::new();
        index.append("tce", "x=1");
        index.append("koi", "y=2");
        index.save(&path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "{\n  \"koi\": [\n    \"y=2\"\n  ],\n  \"tce\": [\n    \"x=1\"\n  ]\n}\n"
        );

        let reloaded = FixtureIndex::load(&path).unwrap();
        assert_eq!(reloaded, index);
        assert_eq!(reloaded.tables().collect::<Vec<_>>(), vec!["koi", "tce"]);
    }

    #[test]
    fn test_malformed_index_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("responses.json");
        fs::write(&path, "{\"koi\": \"not a list\"}").unwrap();

        let err = FixtureIndex::load(&path).unwrap_err();
        assert!(matches!(err, QueryError::Parse { .. }));
    }
}
