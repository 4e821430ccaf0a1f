//! Clause builders.
//!
//! [`QueryBuilder`] turns INSERT and SELECT clauses of a [`Statement`] into
//! YQL text and named parameters. Every table and column name goes through
//! the identifier quoter and every literal through the value encoder.
//!
//! # Example
//!
//! ```rust
//! use ydb_sql_core::builder::QueryBuilder;
//! use ydb_sql_core::statement::{col, Clause, Select, Statement, Where};
//!
//! let mut stmt = Statement::new("users").clause(Clause::Where(Where {
//!     exprs: vec![col("id").eq("u1")],
//! }));
//! let select = Select { columns: vec!["id".into(), "name".into()] };
//! QueryBuilder::new("/local").build_select(&select, &mut stmt).unwrap();
//!
//! assert_eq!(
//!     stmt.sql,
//!     "DECLARE $arg0 AS Utf8; SELECT `id`,`name` FROM `/local/users` WHERE `id`=$arg0"
//! );
//! ```

mod declare;
mod insert;
mod pool;
mod select;

pub use declare::{declare_section, declare_to};
pub use insert::VALUES_PARAM;
pub use pool::{BufferPool, PooledBuffer};

use crate::error::{DialectError, Result};
use crate::path::table_path;
use crate::schema::ModelSchema;
use crate::statement::{Clause, Statement, Value};
use crate::types::YdbType;
use crate::value::{encode, encode_field, TypedValue};

/// Builds YQL for statement clauses under a table path prefix.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    table_path_prefix: String,
    buffers: BufferPool,
}

impl QueryBuilder {
    /// Creates a builder for tables under `table_path_prefix`.
    #[must_use]
    pub fn new(table_path_prefix: impl Into<String>) -> Self {
        Self {
            table_path_prefix: table_path_prefix.into(),
            buffers: BufferPool::new(),
        }
    }

    /// Shares an existing buffer pool.
    #[must_use]
    pub fn with_buffers(mut self, buffers: BufferPool) -> Self {
        self.buffers = buffers;
        self
    }

    #[must_use]
    pub fn table_path_prefix(&self) -> &str {
        &self.table_path_prefix
    }

    /// Full path of `table` under the prefix.
    #[must_use]
    pub fn table_path(&self, table: &str) -> String {
        table_path(&self.table_path_prefix, table)
    }

    /// Builds one clause into `stmt`.
    ///
    /// # Errors
    ///
    /// VALUES and WHERE are consumed by INSERT and SELECT and cannot be
    /// built on their own; otherwise see [`Self::build_insert`] and
    /// [`Self::build_select`].
    pub fn build_clause(&self, clause: &Clause, stmt: &mut Statement) -> Result<()> {
        match clause {
            Clause::Insert(insert) => self.build_insert(insert, stmt),
            Clause::Select(select) => self.build_select(select, stmt),
            Clause::Values(_) | Clause::Where(_) => Err(DialectError::UnrecognizedExpression(
                format!("standalone {} clause", clause.name()),
            )),
        }
    }
}

/// Encodes a value for `column`, using the field serializer when the schema
/// knows the column.
fn encode_cell(schema: Option<&ModelSchema>, column: &str, value: &Value) -> Result<TypedValue> {
    match schema.and_then(|s| s.look_up_field(column)) {
        Some(field) => encode_field(field, value),
        None => encode(value),
    }
}

/// Brings the values of one column to a common type.
///
/// When any value is optional all of them are wrapped as optional.
/// Returns the common type and the adjusted values.
fn unify_column(column: &str, cells: Vec<TypedValue>) -> Result<(YdbType, Vec<TypedValue>)> {
    let mut base: Option<YdbType> = None;
    let mut optional = false;
    for cell in &cells {
        let ty = cell.ydb_type();
        let (inner, stripped) = ty.strip_optional();
        optional |= stripped;
        match &base {
            None => base = Some(inner.clone()),
            Some(expected) if expected == inner => {}
            Some(expected) => {
                return Err(DialectError::TypeMismatch {
                    column: column.to_string(),
                    expected: expected.yql(),
                    found: inner.yql(),
                });
            }
        }
    }

    let Some(base) = base else {
        return Err(DialectError::EmptyInList(column.to_string()));
    };
    if optional {
        let cells = cells.into_iter().map(TypedValue::into_optional).collect();
        Ok((base.optional(), cells))
    } else {
        Ok((base, cells))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::{Insert, Values, Where};

    #[test]
    fn test_table_path() {
        assert_eq!(QueryBuilder::new("/x/y").table_path("t"), "/x/y/t");
        assert_eq!(QueryBuilder::default().table_path("t"), "t");
    }

    #[test]
    fn test_build_clause_dispatch() {
        let builder = QueryBuilder::new("");
        let mut stmt = Statement::new("t");
        builder
            .build_clause(&Clause::Insert(Insert::default()), &mut stmt)
            .unwrap();
        assert_eq!(stmt.sql, "UPSERT INTO `t`");

        let err = builder
            .build_clause(&Clause::Where(Where::default()), &mut stmt)
            .unwrap_err();
        assert!(matches!(err, DialectError::UnrecognizedExpression(_)));
        let err = builder
            .build_clause(&Clause::Values(Values::default()), &mut stmt)
            .unwrap_err();
        assert!(err.to_string().contains("VALUES"));
    }

    #[test]
    fn test_unify_column() {
        let (ty, cells) = unify_column(
            "n",
            vec![TypedValue::Int64(1), TypedValue::Null(YdbType::Int64)],
        )
        .unwrap();
        assert_eq!(ty, YdbType::Int64.optional());
        assert_eq!(cells[0], TypedValue::Optional(Box::new(TypedValue::Int64(1))));

        let (ty, _) = unify_column("n", vec![TypedValue::Bool(true)]).unwrap();
        assert_eq!(ty, YdbType::Bool);

        assert!(unify_column("n", vec![TypedValue::Bool(true), TypedValue::Int8(1)]).is_err());
    }
}
