//! Statement model exchanged with the ORM.
//!
//! A [`Statement`] carries the target table, the model schema when known,
//! the parsed clauses, and the output buffers (SQL text and declared
//! parameters) that clause builders append to.

mod expr;
mod value;

pub use expr::{col, Column, CompareOp, Expr};
pub use value::{SoftDelete, ToValue, Value};

use std::collections::HashMap;
use std::sync::Arc;

use crate::schema::ModelSchema;
use crate::value::TypedValue;

/// A named, typed query parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Name including the leading `$`.
    pub name: String,
    pub value: TypedValue,
}

impl Param {
    #[must_use]
    pub fn new(name: impl Into<String>, value: TypedValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// `INSERT [modifier] INTO` clause.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Insert {
    /// Optional keyword between INSERT and INTO, kept verbatim.
    pub modifier: Option<String>,
}

/// Rows of a multi-row insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Values {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Values {
    /// Creates an empty VALUES clause for the given columns.
    #[must_use]
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row.
    #[must_use]
    pub fn row(mut self, row: Vec<Value>) -> Self {
        self.rows.push(row);
        self
    }
}

/// Projection of a SELECT.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Select {
    /// Requested columns; empty selects every schema column.
    pub columns: Vec<String>,
}

/// Conjunction of predicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Where {
    pub exprs: Vec<Expr>,
}

/// A parsed clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Insert(Insert),
    Values(Values),
    Select(Select),
    Where(Where),
}

impl Clause {
    /// Registry name of the clause.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Insert(_) => "INSERT",
            Self::Values(_) => "VALUES",
            Self::Select(_) => "SELECT",
            Self::Where(_) => "WHERE",
        }
    }
}

/// A statement under construction.
#[derive(Debug, Clone, Default)]
pub struct Statement {
    /// Base table name, without path prefix.
    pub table: String,
    pub schema: Option<Arc<ModelSchema>>,
    clauses: HashMap<&'static str, Clause>,
    /// Accumulated query text.
    pub sql: String,
    /// Accumulated parameters, in declaration order.
    pub vars: Vec<Param>,
}

impl Statement {
    /// Creates a statement against `table`.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    /// Creates a statement against the table of `schema`.
    #[must_use]
    pub fn for_schema(schema: Arc<ModelSchema>) -> Self {
        Self {
            table: schema.table.clone(),
            schema: Some(schema),
            ..Self::default()
        }
    }

    /// Adds a clause, replacing one with the same name.
    #[must_use]
    pub fn clause(mut self, clause: Clause) -> Self {
        self.add_clause(clause);
        self
    }

    /// Adds a clause, replacing one with the same name.
    pub fn add_clause(&mut self, clause: Clause) {
        self.clauses.insert(clause.name(), clause);
    }

    /// Returns the clause registered under `name`.
    #[must_use]
    pub fn get_clause(&self, name: &str) -> Option<&Clause> {
        self.clauses.get(name)
    }

    /// Returns the VALUES clause, if any.
    #[must_use]
    pub fn values(&self) -> Option<&Values> {
        match self.clauses.get("VALUES") {
            Some(Clause::Values(values)) => Some(values),
            _ => None,
        }
    }

    /// Returns the WHERE clause, if any.
    #[must_use]
    pub fn where_clause(&self) -> Option<&Where> {
        match self.clauses.get("WHERE") {
            Some(Clause::Where(w)) => Some(w),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, FieldKind};

    #[test]
    fn test_clause_lookup() {
        let stmt = Statement::new("users")
            .clause(Clause::Insert(Insert::default()))
            .clause(Clause::Values(Values::new(["id"]).row(vec!["a".into()])));
        assert!(stmt.get_clause("INSERT").is_some());
        assert_eq!(stmt.values().map(|v| v.rows.len()), Some(1));
        assert!(stmt.where_clause().is_none());
    }

    #[test]
    fn test_later_clause_replaces_earlier() {
        let stmt = Statement::new("users")
            .clause(Clause::Where(Where {
                exprs: vec![col("a").eq(1)],
            }))
            .clause(Clause::Where(Where::default()));
        assert_eq!(stmt.where_clause().map(|w| w.exprs.len()), Some(0));
    }

    #[test]
    fn test_for_schema_uses_table() {
        let schema = ModelSchema::new("User", "users")
            .field(Field::new("id", FieldKind::String).primary_key());
        let stmt = Statement::for_schema(Arc::new(schema));
        assert_eq!(stmt.table, "users");
        assert!(stmt.schema.is_some());
    }
}
