//! The driver seam.
//!
//! The dialect does not talk to YDB itself. Scheme queries, table
//! descriptions and directory listings go through a [`SchemeClient`]
//! provided by the application, and [`Connector`] opens one from a
//! [`Config`].

use ydb_sql_core::types::YdbType;

use crate::config::Config;

/// Options for a scheme query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecOptions {
    /// The query may be retried safely.
    pub idempotent: bool,
}

impl ExecOptions {
    /// Options for an idempotent query.
    #[must_use]
    pub const fn idempotent() -> Self {
        Self { idempotent: true }
    }
}

/// Kind of a scheme entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Table,
    Directory,
    /// Topics, coordination nodes and everything else.
    Other,
}

/// A child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub entry_type: EntryType,
}

impl DirectoryEntry {
    #[must_use]
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry_type: EntryType::Table,
        }
    }

    #[must_use]
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry_type: EntryType::Directory,
        }
    }
}

/// A column of a live table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescription {
    pub name: String,
    /// Column type as reported by YDB, usually `Optional<...>`.
    pub ydb_type: YdbType,
}

/// A secondary index of a live table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDescription {
    pub name: String,
    pub columns: Vec<String>,
}

/// Description of a live table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableDescription {
    pub name: String,
    pub columns: Vec<ColumnDescription>,
    pub primary_key: Vec<String>,
    pub indexes: Vec<IndexDescription>,
}

impl TableDescription {
    /// Finds a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDescription> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns whether an index with this name exists.
    #[must_use]
    pub fn has_index(&self, name: &str) -> bool {
        self.indexes.iter().any(|i| i.name == name)
    }
}

/// Schema operations of a YDB driver.
#[allow(async_fn_in_trait)]
pub trait SchemeClient {
    /// Driver error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Path of the database the client is connected to, e.g. `/local`.
    fn database_name(&self) -> &str;

    /// Runs a DDL statement.
    async fn execute_scheme_query(&self, query: &str, options: ExecOptions) -> Result<(), Self::Error>;

    /// Describes the table at an absolute path.
    async fn describe_table(&self, path: &str) -> Result<TableDescription, Self::Error>;

    /// Lists the children of a directory.
    async fn list_directory(&self, path: &str) -> Result<Vec<DirectoryEntry>, Self::Error>;

    /// Returns whether a table exists at an absolute path.
    ///
    /// The default lists the parent directory and looks for a table entry.
    async fn is_table_exists(&self, path: &str) -> Result<bool, Self::Error> {
        let (directory, name) = match path.rsplit_once('/') {
            Some(("", name)) => ("/", name),
            Some((directory, name)) => (directory, name),
            None => (self.database_name(), path),
        };
        let entries = self.list_directory(directory).await?;
        Ok(entries
            .iter()
            .any(|e| e.entry_type == EntryType::Table && e.name == name))
    }
}

/// Opens a [`SchemeClient`] for a configuration.
#[allow(async_fn_in_trait)]
pub trait Connector {
    type Client: SchemeClient;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Connects using the DSN and pool settings of `config`.
    async fn connect(&self, config: &Config) -> Result<Self::Client, Self::Error>;
}
