//! SELECT clause with a parameterized WHERE.

use super::declare::declare_to;
use super::{encode_cell, unify_column, QueryBuilder};
use crate::error::{DialectError, Result};
use crate::quote::{quote_path_to, quote_to};
use crate::statement::{Expr, Param, Select, Statement};
use crate::value::TypedValue;

impl QueryBuilder {
    /// Builds a SELECT clause, and the statement's WHERE clause if present,
    /// into `stmt`.
    ///
    /// Each predicate binds one parameter `$argN`, numbered from the current
    /// length of `stmt.vars`. The DECLARE section for the new parameters is
    /// written ahead of the SELECT and the parameters are appended to
    /// `stmt.vars`.
    ///
    /// # Errors
    ///
    /// Predicates other than comparisons, LIKE and IN, values that cannot be
    /// encoded, and empty or mixed-type IN lists.
    pub fn build_select(&self, select: &Select, stmt: &mut Statement) -> Result<()> {
        let path = self.table_path(&stmt.table);
        let schema = stmt.schema.as_deref();

        let mut params: Vec<Param> = Vec::new();
        let mut predicate = self.buffers.acquire();
        if let Some(where_clause) = stmt.where_clause() {
            let start = stmt.vars.len();
            for (i, expr) in where_clause.exprs.iter().enumerate() {
                if i > 0 {
                    predicate.push_str(" AND ");
                }
                let name = format!("$arg{}", start + i);
                let value = match expr {
                    Expr::Compare { column, op, value } => {
                        quote_to(&mut predicate, column);
                        predicate.push_str(op.as_sql());
                        encode_cell(schema, column, value)?
                    }
                    Expr::In { column, values } => {
                        if values.is_empty() {
                            return Err(DialectError::EmptyInList(column.clone()));
                        }
                        quote_to(&mut predicate, column);
                        predicate.push_str(" IN ");
                        let cells = values
                            .iter()
                            .map(|v| encode_cell(schema, column, v))
                            .collect::<Result<Vec<_>>>()?;
                        let (element, cells) = unify_column(column, cells)?;
                        TypedValue::List(element, cells)
                    }
                    other @ (Expr::Or(_) | Expr::Not(_) | Expr::Raw { .. }) => {
                        return Err(DialectError::UnrecognizedExpression(other.to_string()));
                    }
                };
                predicate.push_str(&name);
                params.push(Param::new(name, value));
            }
        }

        let mut buf = self.buffers.acquire();
        declare_to(&mut buf, &params);
        buf.push_str("SELECT ");
        if select.columns.is_empty() {
            match schema.filter(|s| !s.fields.is_empty()) {
                Some(schema) => write_columns(&mut buf, schema.db_names()),
                None => buf.push('*'),
            }
        } else {
            write_columns(&mut buf, select.columns.iter().map(String::as_str));
        }
        buf.push_str(" FROM ");
        quote_path_to(&mut buf, &path);
        if !predicate.is_empty() {
            buf.push_str(" WHERE ");
            buf.push_str(&predicate);
        }
        drop(predicate);

        stmt.sql.push_str(&buf);
        stmt.vars.extend(params);
        Ok(())
    }
}

fn write_columns<'a>(out: &mut String, columns: impl IntoIterator<Item = &'a str>) {
    for (i, column) in columns.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        quote_to(out, column);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::schema::{Field, FieldKind, ModelSchema};
    use crate::statement::{col, Clause, Where};
    use crate::types::YdbType;

    fn statement(exprs: Vec<Expr>) -> Statement {
        Statement::new("users").clause(Clause::Where(Where { exprs }))
    }

    fn select(columns: &[&str]) -> Select {
        Select {
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    #[test]
    fn test_select_without_where() {
        let mut stmt = Statement::new("users");
        QueryBuilder::new("/db")
            .build_select(&select(&["id", "name"]), &mut stmt)
            .unwrap();
        assert_eq!(stmt.sql, "SELECT `id`,`name` FROM `/db/users`");
        assert!(stmt.vars.is_empty());
    }

    #[test]
    fn test_select_all_operators() {
        let mut stmt = statement(vec![
            col("a").eq(1i64),
            col("b").not_eq(2i64),
            col("c").gt(3i64),
            col("d").gt_eq(4i64),
            col("e").lt(5i64),
            col("f").lt_eq(6i64),
            col("g").like("x%"),
        ]);
        QueryBuilder::new("")
            .build_select(&select(&["a"]), &mut stmt)
            .unwrap();
        assert_eq!(
            stmt.sql,
            "DECLARE $arg0 AS Int64; DECLARE $arg1 AS Int64; DECLARE $arg2 AS Int64; \
             DECLARE $arg3 AS Int64; DECLARE $arg4 AS Int64; DECLARE $arg5 AS Int64; \
             DECLARE $arg6 AS Utf8; \
             SELECT `a` FROM `users` WHERE `a`=$arg0 AND `b`!=$arg1 AND `c`>$arg2 \
             AND `d`>=$arg3 AND `e`<$arg4 AND `f`<=$arg5 AND `g` LIKE $arg6"
        );
        assert_eq!(stmt.vars.len(), 7);
    }

    #[test]
    fn test_param_numbering_starts_at_var_count() {
        let mut stmt = statement(vec![col("a").eq("x"), col("b").eq("y")]);
        stmt.vars.push(Param::new("$p0", TypedValue::Bool(true)));
        stmt.vars.push(Param::new("$p1", TypedValue::Bool(false)));
        QueryBuilder::new("")
            .build_select(&select(&["a"]), &mut stmt)
            .unwrap();
        let names: Vec<&str> = stmt.vars.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["$p0", "$p1", "$arg2", "$arg3"]);
        assert!(stmt.sql.contains("`a`=$arg2 AND `b`=$arg3"));
        assert_eq!(stmt.sql.matches("DECLARE").count(), 2);
    }

    #[test]
    fn test_in_binds_list() {
        let mut stmt = statement(vec![col("id").in_list(vec!["a", "b"])]);
        QueryBuilder::new("")
            .build_select(&select(&["id"]), &mut stmt)
            .unwrap();
        assert_eq!(
            stmt.sql,
            "DECLARE $arg0 AS List<Utf8>; SELECT `id` FROM `users` WHERE `id` IN $arg0"
        );
        assert_eq!(stmt.vars[0].value.ydb_type(), YdbType::Utf8.list());
    }

    #[test]
    fn test_in_errors() {
        let mut stmt = statement(vec![col("id").in_list(Vec::<i32>::new())]);
        assert!(matches!(
            QueryBuilder::new("").build_select(&select(&["id"]), &mut stmt),
            Err(DialectError::EmptyInList(_))
        ));

        let mut stmt = statement(vec![Expr::In {
            column: "id".into(),
            values: vec![1i32.into(), "x".into()],
        }]);
        assert!(matches!(
            QueryBuilder::new("").build_select(&select(&["id"]), &mut stmt),
            Err(DialectError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_unrecognized_predicates() {
        for expr in [
            col("a").eq(1).or(col("b").eq(2)),
            col("a").eq(1).not(),
            Expr::raw("a = 1", vec![]),
        ] {
            let mut stmt = statement(vec![expr]);
            let err = QueryBuilder::new("")
                .build_select(&select(&["a"]), &mut stmt)
                .unwrap_err();
            assert!(matches!(err, DialectError::UnrecognizedExpression(_)));
            assert!(stmt.sql.is_empty());
        }
    }

    #[test]
    fn test_schema_columns_and_serializer() {
        let schema = ModelSchema::new("Doc", "docs")
            .field(Field::new("id", FieldKind::String).primary_key().not_null())
            .field(Field::new("body", FieldKind::Custom("Body".into())).type_tag("json"));
        let mut stmt = Statement::for_schema(Arc::new(schema))
            .clause(Clause::Where(Where {
                exprs: vec![col("body").eq(json!({"k": 1}))],
            }));
        QueryBuilder::new("")
            .build_select(&Select::default(), &mut stmt)
            .unwrap();
        assert_eq!(
            stmt.sql,
            "DECLARE $arg0 AS Json; SELECT `id`,`body` FROM `docs` WHERE `body`=$arg0"
        );
    }

    #[test]
    fn test_select_star_without_schema() {
        let mut stmt = Statement::new("t");
        QueryBuilder::new("")
            .build_select(&Select::default(), &mut stmt)
            .unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM `t`");
    }
}
