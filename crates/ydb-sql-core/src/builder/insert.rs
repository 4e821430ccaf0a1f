//! INSERT clause rendered as YDB `UPSERT`.
//!
//! With a VALUES clause the rows are bound as a single
//! `List<Struct<...>>` parameter named `$values` and read back through
//! `AS_TABLE`, so a batch of any size is one statement with one parameter.

use super::declare::declare_to;
use super::{encode_cell, unify_column, QueryBuilder};
use crate::error::{DialectError, Result};
use crate::quote::quote_path_to;
use crate::statement::{Insert, Param, Statement, Values};
use crate::value::TypedValue;

/// Name of the parameter carrying the batch rows.
pub const VALUES_PARAM: &str = "$values";

impl QueryBuilder {
    /// Builds an INSERT clause into `stmt`.
    ///
    /// With a VALUES clause the statement parameters are replaced by the
    /// single `$values` list. Without one only the
    /// `UPSERT [modifier] INTO <table>` head is written.
    ///
    /// # Errors
    ///
    /// Empty or ragged VALUES, values that cannot be encoded, and columns
    /// whose values disagree on their type.
    pub fn build_insert(&self, insert: &Insert, stmt: &mut Statement) -> Result<()> {
        let path = self.table_path(&stmt.table);
        let Some(values) = stmt.values() else {
            let mut buf = self.buffers.acquire();
            buf.push_str("UPSERT ");
            if let Some(modifier) = insert.modifier.as_deref().filter(|m| !m.is_empty()) {
                buf.push_str(modifier);
                buf.push(' ');
            }
            buf.push_str("INTO ");
            quote_path_to(&mut buf, &path);
            stmt.sql.push_str(&buf);
            return Ok(());
        };

        let param = Param::new(VALUES_PARAM, rows_value(stmt, values, &path)?);

        let mut buf = self.buffers.acquire();
        declare_to(&mut buf, std::slice::from_ref(&param));
        buf.push_str("UPSERT INTO ");
        quote_path_to(&mut buf, &path);
        buf.push_str(" (");
        write_column_list(&mut buf, &values.columns);
        buf.push_str(") SELECT ");
        write_column_list(&mut buf, &values.columns);
        buf.push_str(" FROM AS_TABLE(");
        buf.push_str(VALUES_PARAM);
        buf.push_str(");");

        stmt.sql.push_str(&buf);
        stmt.vars = vec![param];
        Ok(())
    }
}

fn rows_value(stmt: &Statement, values: &Values, path: &str) -> Result<TypedValue> {
    if values.columns.is_empty() || values.rows.is_empty() {
        return Err(DialectError::EmptyValues(path.to_string()));
    }
    let width = values.columns.len();
    for (row, cells) in values.rows.iter().enumerate() {
        if cells.len() != width {
            return Err(DialectError::RowArity {
                row,
                expected: width,
                found: cells.len(),
            });
        }
    }

    let schema = stmt.schema.as_deref();
    let mut columns: Vec<Vec<TypedValue>> = Vec::with_capacity(width);
    for (index, column) in values.columns.iter().enumerate() {
        let cells = values
            .rows
            .iter()
            .map(|row| encode_cell(schema, column, &row[index]))
            .collect::<Result<Vec<_>>>()?;
        columns.push(unify_column(column, cells)?.1);
    }

    let mut rows: Vec<TypedValue> = Vec::with_capacity(values.rows.len());
    let mut column_iters: Vec<_> = columns.into_iter().map(Vec::into_iter).collect();
    for _ in 0..values.rows.len() {
        let members = values
            .columns
            .iter()
            .zip(column_iters.iter_mut())
            .filter_map(|(name, cells)| cells.next().map(|cell| (name.clone(), cell)))
            .collect();
        rows.push(TypedValue::Struct(members));
    }

    let row_type = rows[0].ydb_type();
    Ok(TypedValue::List(row_type, rows))
}

/// Writes the columns as whole identifiers, matching the struct member
/// names of `$values`.
fn write_column_list(out: &mut String, columns: &[String]) {
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        quote_path_to(out, column);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::schema::{Field, FieldKind, ModelSchema};
    use crate::statement::{Clause, Value};
    use crate::types::YdbType;

    fn builder() -> QueryBuilder {
        QueryBuilder::new("/local/app")
    }

    #[test]
    fn test_batch_upsert() {
        let mut stmt = Statement::new("users").clause(Clause::Values(
            Values::new(["id", "age"])
                .row(vec!["a".into(), 1i64.into()])
                .row(vec!["b".into(), 2i64.into()]),
        ));
        builder().build_insert(&Insert::default(), &mut stmt).unwrap();
        assert_eq!(
            stmt.sql,
            "DECLARE $values AS List<Struct<'id':Utf8,'age':Int64>>; \
             UPSERT INTO `/local/app/users` (`id`,`age`) \
             SELECT `id`,`age` FROM AS_TABLE($values);"
        );
        assert_eq!(stmt.vars.len(), 1);
        assert_eq!(stmt.vars[0].name, "$values");
        match &stmt.vars[0].value {
            TypedValue::List(_, rows) => assert_eq!(rows.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_dotted_column_matches_struct_member() {
        let mut stmt = Statement::new("t").clause(Clause::Values(
            Values::new(["a.b", "odd`name"]).row(vec![1i32.into(), "x".into()]),
        ));
        builder().build_insert(&Insert::default(), &mut stmt).unwrap();
        assert_eq!(
            stmt.sql,
            "DECLARE $values AS List<Struct<'a.b':Int32,'odd`name':Utf8>>; \
             UPSERT INTO `/local/app/t` (`a.b`,`odd``name`) \
             SELECT `a.b`,`odd``name` FROM AS_TABLE($values);"
        );
    }

    #[test]
    fn test_batch_replaces_existing_vars() {
        let mut stmt = Statement::new("t").clause(Clause::Values(
            Values::new(["id"]).row(vec!["x".into()]),
        ));
        stmt.vars.push(Param::new("$stale", TypedValue::Bool(true)));
        builder().build_insert(&Insert::default(), &mut stmt).unwrap();
        assert_eq!(stmt.vars.len(), 1);
        assert_eq!(stmt.vars[0].name, VALUES_PARAM);
    }

    #[test]
    fn test_nullable_column_promoted_to_optional() {
        let schema = ModelSchema::new("User", "users")
            .field(Field::new("id", FieldKind::String).primary_key().not_null())
            .field(Field::new("nick", FieldKind::String));
        let mut stmt = Statement::for_schema(Arc::new(schema)).clause(Clause::Values(
            Values::new(["id", "nick"])
                .row(vec!["a".into(), Value::Null])
                .row(vec!["b".into(), "bee".into()]),
        ));
        builder().build_insert(&Insert::default(), &mut stmt).unwrap();
        assert!(stmt
            .sql
            .starts_with("DECLARE $values AS List<Struct<'id':Utf8,'nick':Optional<Utf8>>>; "));
        assert_eq!(
            stmt.vars[0].value.ydb_type(),
            YdbType::Struct(vec![
                ("id".into(), YdbType::Utf8),
                ("nick".into(), YdbType::Utf8.optional()),
            ])
            .list()
        );
    }

    #[test]
    fn test_mixed_types_rejected() {
        let mut stmt = Statement::new("t").clause(Clause::Values(
            Values::new(["n"]).row(vec![1i64.into()]).row(vec!["x".into()]),
        ));
        let err = builder().build_insert(&Insert::default(), &mut stmt).unwrap_err();
        assert!(matches!(err, DialectError::TypeMismatch { .. }));
    }

    #[test]
    fn test_empty_and_ragged_values() {
        let mut stmt = Statement::new("t").clause(Clause::Values(Values::new(["id"])));
        assert!(matches!(
            builder().build_insert(&Insert::default(), &mut stmt),
            Err(DialectError::EmptyValues(_))
        ));

        let mut stmt = Statement::new("t").clause(Clause::Values(
            Values::new(["a", "b"]).row(vec![1i32.into()]),
        ));
        assert!(matches!(
            builder().build_insert(&Insert::default(), &mut stmt),
            Err(DialectError::RowArity { row: 0, expected: 2, found: 1 })
        ));
    }

    #[test]
    fn test_unsupported_value_fails() {
        let mut stmt = Statement::new("t").clause(Clause::Values(
            Values::new(["n"]).row(vec![Value::Int128(1)]),
        ));
        assert!(matches!(
            builder().build_insert(&Insert::default(), &mut stmt),
            Err(DialectError::UnsupportedValue(_))
        ));
    }

    #[test]
    fn test_plain_insert_becomes_upsert() {
        let mut stmt = Statement::new("events");
        QueryBuilder::new("")
            .build_insert(&Insert::default(), &mut stmt)
            .unwrap();
        assert_eq!(stmt.sql, "UPSERT INTO `events`");

        let mut stmt = Statement::new("events");
        let insert = Insert {
            modifier: Some("OR REVERT".into()),
        };
        builder().build_insert(&insert, &mut stmt).unwrap();
        assert_eq!(stmt.sql, "UPSERT OR REVERT INTO `/local/app/events`");
    }
}
