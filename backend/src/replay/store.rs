//! Fixture directory layout.

use std::fs;
use std::path::PathBuf;

use super::index::FixtureIndex;
use crate::config::ReplaySettings;
use crate::error::{QueryError, QueryResult};

/// A directory of recorded response bodies plus their index.
///
/// ```text
/// <root>/responses.json        table -> [canonical key, ...]
/// <root>/koi_expect_0.txt      body for responses.json["koi"][0]
/// <root>/koi_expect_1.txt
/// ```
///
/// Construct one store per test session and lend it to every
/// [`ReplayTransport`](super::ReplayTransport) that needs it.
#[derive(Debug, Clone)]
pub struct FixtureStore {
    root: PathBuf,
    index_file: String,
}

impl FixtureStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index_file: ReplaySettings::default().index_file,
        }
    }

    pub fn from_settings(root: impl Into<PathBuf>, settings: &ReplaySettings) -> Self {
        Self {
            root: root.into(),
            index_file: settings.index_file.clone(),
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(&self.index_file)
    }

    /// Path of the fixture at `index` within `table`.
    pub fn fixture_path(&self, table: &str, index: usize) -> PathBuf {
        self.root.join(format!("{}_expect_{}.txt", table, index))
    }

    pub fn load_index(&self) -> QueryResult<FixtureIndex> {
        FixtureIndex::load(&self.index_path())
    }

    pub fn save_index(&self, index: &FixtureIndex) -> QueryResult<()> {
        self.ensure_root()?;
        index.save(&self.index_path())
    }

    pub fn read_fixture(&self, table: &str, index: usize) -> QueryResult<String> {
        let path = self.fixture_path(table, index);
        fs::read_to_string(&path).map_err(|e| {
            QueryError::io(&path, e)
                .with_operation("read_fixture")
                .with_table(table)
        })
    }

    pub fn write_fixture(&self, table: &str, index: usize, body: &str) -> QueryResult<PathBuf> {
        self.ensure_root()?;
        let path = self.fixture_path(table, index);
        fs::write(&path, body).map_err(|e| {
            QueryError::io(&path, e)
                .with_operation("write_fixture")
                .with_table(table)
        })?;
        Ok(path)
    }

    fn ensure_root(&self) -> QueryResult<()> {
        fs::create_dir_all(&self.root).map_err(|e| QueryError::io(&self.root, e))
    }
}
