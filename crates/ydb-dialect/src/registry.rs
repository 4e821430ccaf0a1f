//! Clause builder registry.
//!
//! The host ORM renders a statement by walking a list of clause names and
//! handing each present clause to the builder registered under that name.

use std::collections::HashMap;

use ydb_sql_core::builder::QueryBuilder;
use ydb_sql_core::error::{DialectError, Result};
use ydb_sql_core::statement::{Clause, Statement};

/// Clauses rendered for INSERT statements.
pub const CREATE_CLAUSES: &[&str] = &["INSERT"];
/// Clauses rendered for SELECT statements.
pub const QUERY_CLAUSES: &[&str] = &["SELECT"];
/// Clauses rendered for UPDATE statements.
pub const UPDATE_CLAUSES: &[&str] = &["UPDATE", "SET", "WHERE", "ORDER BY", "LIMIT"];
/// Clauses rendered for DELETE statements.
pub const DELETE_CLAUSES: &[&str] = &["DELETE", "FROM", "WHERE", "ORDER BY", "LIMIT"];

/// Renders one clause into a statement.
pub type ClauseBuilderFn = fn(&QueryBuilder, &Clause, &mut Statement) -> Result<()>;

/// Clause builders keyed by clause name.
#[derive(Debug, Clone)]
pub struct ClauseRegistry {
    builders: HashMap<&'static str, ClauseBuilderFn>,
}

impl Default for ClauseRegistry {
    fn default() -> Self {
        let mut builders: HashMap<&'static str, ClauseBuilderFn> = HashMap::new();
        builders.insert("INSERT", insert_builder);
        builders.insert("SELECT", select_builder);
        Self { builders }
    }
}

impl ClauseRegistry {
    /// Creates the registry with the INSERT and SELECT builders.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the builder registered for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ClauseBuilderFn> {
        self.builders.get(name).copied()
    }

    /// Registered clause names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.builders.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Renders the clauses named in `names` that are present on `stmt`.
    ///
    /// Built clauses are separated by a space. Names absent from the
    /// statement are skipped.
    ///
    /// # Errors
    ///
    /// A present clause without a registered builder, or the builder's own
    /// error.
    pub fn build(&self, builder: &QueryBuilder, stmt: &mut Statement, names: &[&str]) -> Result<()> {
        for name in names {
            let Some(clause) = stmt.get_clause(name).cloned() else {
                continue;
            };
            let build = self.get(name).ok_or_else(|| {
                DialectError::UnrecognizedExpression(format!("no builder for {name} clause"))
            })?;
            if !stmt.sql.is_empty() {
                stmt.sql.push(' ');
            }
            build(builder, &clause, stmt)?;
        }
        Ok(())
    }
}

fn insert_builder(builder: &QueryBuilder, clause: &Clause, stmt: &mut Statement) -> Result<()> {
    match clause {
        Clause::Insert(insert) => builder.build_insert(insert, stmt),
        other => Err(mismatched("INSERT", other)),
    }
}

fn select_builder(builder: &QueryBuilder, clause: &Clause, stmt: &mut Statement) -> Result<()> {
    match clause {
        Clause::Select(select) => builder.build_select(select, stmt),
        other => Err(mismatched("SELECT", other)),
    }
}

fn mismatched(expected: &str, clause: &Clause) -> DialectError {
    DialectError::UnrecognizedExpression(format!(
        "{} clause passed to the {expected} builder",
        clause.name()
    ))
}
