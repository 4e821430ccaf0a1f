//! YDB dialect for ORMs.
//!
//! `ydb-dialect` plugs YDB into an ORM's dialect seam:
//! - Backtick quoting of identifiers and table paths
//! - `$N` bind variables and typed, declared parameters
//! - INSERT as batch `UPSERT ... FROM AS_TABLE($values)` and parameterized SELECT
//! - A migrator running DDL through the application's YDB driver
//!
//! # Architecture
//!
//! - **Driver** - [`driver::SchemeClient`], implemented by the application
//!   over its YDB SDK
//! - **Dialect** - [`YdbDialect`], the hooks and clause builders
//! - **Migrator** - schema changes on [`YdbDialect`], planned by
//!   `ydb_sql_core::migrations`
//! - **Config** - [`Config`], connection and migration settings
//!
//! # Example
//!
//! ```rust,ignore
//! use ydb_dialect::prelude::*;
//! use ydb_sql_derive::Model;
//!
//! #[derive(Model)]
//! #[model(table = "users")]
//! struct User {
//!     #[field(primary_key, not_null)]
//!     id: String,
//!     email: Option<String>,
//! }
//!
//! let config = Config::new("grpc://localhost:2136/local").table_path_prefix("app");
//! let dialect = YdbDialect::connect(&connector, config).await?;
//! dialect.auto_migrate_model::<User>().await?;
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Print CREATE TABLE for a schema file
//! ydb-dialect --prefix /local/app create-table --schema user.json
//!
//! # Print the statements of an index rename
//! ydb-dialect rename-index --schema user.json --from idx_a --to idx_b
//! ```

pub mod config;
pub mod dialect;
pub mod driver;
pub mod error;
pub mod migrator;
pub mod registry;

pub use config::Config;
pub use dialect::YdbDialect;
pub use error::{Error, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::dialect::YdbDialect;
    pub use crate::driver::{
        ColumnDescription, Connector, DirectoryEntry, EntryType, ExecOptions, IndexDescription,
        SchemeClient, TableDescription,
    };
    pub use crate::error::{Error, Result};
    pub use crate::registry::{
        ClauseRegistry, CREATE_CLAUSES, DELETE_CLAUSES, QUERY_CLAUSES, UPDATE_CLAUSES,
    };
    pub use ydb_sql_core::schema::{Field, FieldKind, Index, Model, ModelSchema};
    pub use ydb_sql_core::statement::{col, Clause, Statement, Value};
}
