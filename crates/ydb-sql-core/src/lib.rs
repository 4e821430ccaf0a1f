//! # ydb-sql-core
//!
//! YQL generation for YDB: identifier quoting, type mapping, value
//! encoding, clause building and schema change planning.
//!
//! This crate provides:
//! - A model schema description, usually produced by `#[derive(Model)]`
//! - Mapping of field kinds to YDB column types and back
//! - Typed encoding of runtime values into YDB parameters
//! - INSERT (as batch `UPSERT`) and SELECT builders with named parameters
//! - DDL for tables, columns and global secondary indexes
//!
//! ## Building queries
//!
//! Literals never end up in the query text; every value is bound to a
//! declared parameter:
//!
//! ```rust
//! use ydb_sql_core::{col, Clause, QueryBuilder, Select, Statement, Where};
//!
//! let user_input = "'; DROP TABLE users; --";
//! let mut stmt = Statement::new("users").clause(Clause::Where(Where {
//!     exprs: vec![col("name").eq(user_input)],
//! }));
//! QueryBuilder::new("")
//!     .build_select(&Select { columns: vec!["id".into()] }, &mut stmt)
//!     .unwrap();
//!
//! assert_eq!(
//!     stmt.sql,
//!     "DECLARE $arg0 AS Utf8; SELECT `id` FROM `users` WHERE `name`=$arg0"
//! );
//! assert_eq!(stmt.vars.len(), 1);
//! ```
//!
//! ## Planning schema changes
//!
//! ```rust
//! use ydb_sql_core::migrations::MigrationPlanner;
//! use ydb_sql_core::schema::{Field, FieldKind, Index, ModelSchema};
//!
//! let schema = ModelSchema::new("User", "users")
//!     .field(Field::new("id", FieldKind::String).primary_key().not_null())
//!     .field(Field::new("email", FieldKind::String))
//!     .index(Index::new("idx_users_email", ["email"]));
//!
//! let sql = MigrationPlanner::new("/local").create_index(&schema, "idx_users_email").unwrap();
//! assert_eq!(
//!     sql,
//!     "ALTER TABLE `/local/users` ADD INDEX `idx_users_email` GLOBAL ON (`email`);"
//! );
//! ```

pub mod builder;
pub mod error;
pub mod migrations;
pub mod path;
pub mod quote;
pub mod schema;
pub mod statement;
pub mod types;
pub mod value;

pub use builder::QueryBuilder;
pub use error::{DialectError, ErrorKind, Result, UnsupportedOperation};
pub use migrations::{CreateTableOptions, MigrationPlanner, RenameIndexPlan};
pub use quote::{quote, quote_path};
pub use schema::{Field, FieldKind, Index, Model, ModelSchema, SchemaCache};
pub use statement::{col, Clause, Expr, Insert, Param, Select, Statement, Value, Values, Where};
pub use types::{ColumnType, YdbType};
pub use value::TypedValue;
