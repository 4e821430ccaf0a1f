//! Dialect configuration.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;

/// Connection and migration settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Connection string, e.g. `grpc://localhost:2136/local`.
    pub dsn: String,
    /// Directory under the database in which tables live.
    pub table_path_prefix: String,
    pub max_open_conns: Option<u32>,
    pub max_idle_conns: Option<u32>,
    pub conn_max_idle_time: Option<Duration>,
    /// Create indexes with separate statements after CREATE TABLE instead
    /// of declaring them inline.
    pub create_index_after_create_table: bool,
    /// Appended verbatim to CREATE TABLE.
    pub table_options: Option<String>,
}

impl Config {
    /// Creates a configuration for `dsn`.
    #[must_use]
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            ..Self::default()
        }
    }

    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// The file cannot be read or is not a valid configuration.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Sets the table path prefix.
    #[must_use]
    pub fn table_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_path_prefix = prefix.into();
        self
    }

    /// Sets the maximum number of open connections.
    #[must_use]
    pub const fn max_open_conns(mut self, n: u32) -> Self {
        self.max_open_conns = Some(n);
        self
    }

    /// Sets the maximum number of idle connections.
    #[must_use]
    pub const fn max_idle_conns(mut self, n: u32) -> Self {
        self.max_idle_conns = Some(n);
        self
    }

    /// Sets how long a connection may stay idle.
    #[must_use]
    pub const fn conn_max_idle_time(mut self, d: Duration) -> Self {
        self.conn_max_idle_time = Some(d);
        self
    }

    /// Creates indexes after the table instead of inline.
    #[must_use]
    pub const fn create_index_after_create_table(mut self, enabled: bool) -> Self {
        self.create_index_after_create_table = enabled;
        self
    }

    /// Sets the CREATE TABLE options suffix.
    #[must_use]
    pub fn table_options(mut self, options: impl Into<String>) -> Self {
        self.table_options = Some(options.into());
        self
    }

    /// Returns the database path named by the DSN, if any.
    ///
    /// `grpc://localhost:2136/local?token=x` names `/local`.
    #[must_use]
    pub fn database(&self) -> Option<&str> {
        let rest = self.dsn.split_once("://").map_or(self.dsn.as_str(), |(_, r)| r);
        let rest = rest.split(['?', '#']).next().unwrap_or_default();
        let database = &rest[rest.find('/')?..];
        (database.len() > 1).then_some(database)
    }
}
