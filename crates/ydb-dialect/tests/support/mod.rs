//! In-memory scheme client for migrator tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use ydb_dialect::driver::{
    Connector, DirectoryEntry, ExecOptions, SchemeClient, TableDescription,
};
use ydb_dialect::Config;

#[derive(Debug, thiserror::Error)]
#[error("fake driver: {0}")]
pub struct FakeError(pub String);

/// Records scheme queries and serves tables and directories registered by
/// the test.
#[derive(Debug)]
pub struct FakeClient {
    database: String,
    executed: Mutex<Vec<(String, ExecOptions)>>,
    tables: Mutex<BTreeMap<String, TableDescription>>,
    directories: Mutex<BTreeMap<String, Vec<DirectoryEntry>>>,
    fail_on: Mutex<Option<String>>,
}

impl FakeClient {
    pub fn new(database: &str) -> Self {
        Self {
            database: database.to_string(),
            executed: Mutex::new(Vec::new()),
            tables: Mutex::new(BTreeMap::new()),
            directories: Mutex::new(BTreeMap::new()),
            fail_on: Mutex::new(None),
        }
    }

    /// Registers a live table at `path` and lists it in its directory.
    pub fn add_table(&self, path: &str, description: TableDescription) {
        let (directory, name) = path.rsplit_once('/').unwrap();
        self.add_entry(directory, DirectoryEntry::table(name));
        self.tables.lock().unwrap().insert(path.to_string(), description);
    }

    pub fn add_entry(&self, directory: &str, entry: DirectoryEntry) {
        self.directories
            .lock()
            .unwrap()
            .entry(directory.to_string())
            .or_default()
            .push(entry);
    }

    /// Makes every scheme query containing `pattern` fail.
    pub fn fail_on(&self, pattern: &str) {
        *self.fail_on.lock().unwrap() = Some(pattern.to_string());
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .unwrap()
            .iter()
            .map(|(query, _)| query.clone())
            .collect()
    }

    pub fn all_idempotent(&self) -> bool {
        self.executed.lock().unwrap().iter().all(|(_, o)| o.idempotent)
    }
}

impl SchemeClient for FakeClient {
    type Error = FakeError;

    fn database_name(&self) -> &str {
        &self.database
    }

    async fn execute_scheme_query(&self, query: &str, options: ExecOptions) -> Result<(), FakeError> {
        if let Some(pattern) = self.fail_on.lock().unwrap().as_deref() {
            if query.contains(pattern) {
                return Err(FakeError(format!("rejected: {query}")));
            }
        }
        self.executed
            .lock()
            .unwrap()
            .push((query.to_string(), options));
        Ok(())
    }

    async fn describe_table(&self, path: &str) -> Result<TableDescription, FakeError> {
        self.tables
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| FakeError(format!("path not found: {path}")))
    }

    async fn list_directory(&self, path: &str) -> Result<Vec<DirectoryEntry>, FakeError> {
        Ok(self
            .directories
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_default())
    }
}

/// Connects a [`FakeClient`] to the database named by the DSN.
pub struct FakeConnector;

impl Connector for FakeConnector {
    type Client = FakeClient;
    type Error = FakeError;

    async fn connect(&self, config: &Config) -> Result<FakeClient, FakeError> {
        config
            .database()
            .map(FakeClient::new)
            .ok_or_else(|| FakeError(format!("no database in dsn '{}'", config.dsn)))
    }
}

pub fn table(name: &str) -> TableDescription {
    TableDescription {
        name: name.to_string(),
        ..TableDescription::default()
    }
}
