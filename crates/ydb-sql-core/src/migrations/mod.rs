//! Schema change statements.
//!
//! [`MigrationPlanner`] renders the DDL for table, column and index changes
//! of a [`ModelSchema`]. It only produces text; executing it against a
//! database is left to the caller.
//!
//! # Example
//!
//! ```rust
//! use ydb_sql_core::migrations::{CreateTableOptions, MigrationPlanner};
//! use ydb_sql_core::schema::{Field, FieldKind, ModelSchema};
//!
//! let schema = ModelSchema::new("Note", "notes")
//!     .field(Field::new("id", FieldKind::String).primary_key().not_null())
//!     .field(Field::new("payload", FieldKind::String));
//!
//! let planner = MigrationPlanner::new("/local");
//! let sql = planner
//!     .create_table(&schema, &CreateTableOptions::default())
//!     .unwrap();
//! assert_eq!(
//!     sql,
//!     "CREATE TABLE `/local/notes` (\n\t`id` Utf8,\n\t`payload` Utf8,\n\tPRIMARY KEY (`id`)\n);"
//! );
//! ```

mod column;

pub use column::{check_field_constraints, full_data_type_of};

use crate::builder::BufferPool;
use crate::error::{DialectError, Result};
use crate::path::table_path;
use crate::quote::{quote_path_to, quote_to};
use crate::schema::{Index, ModelSchema};
use crate::types::data_type_of;

/// Options for CREATE TABLE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTableOptions {
    /// Appended verbatim after the closing parenthesis.
    pub table_options: Option<String>,
    /// Declare the model indexes inside CREATE TABLE.
    pub inline_indexes: bool,
}

impl Default for CreateTableOptions {
    fn default() -> Self {
        Self {
            table_options: None,
            inline_indexes: true,
        }
    }
}

impl CreateTableOptions {
    /// Sets the table options suffix.
    #[must_use]
    pub fn table_options(mut self, options: impl Into<String>) -> Self {
        self.table_options = Some(options.into());
        self
    }

    /// Leaves indexes out of CREATE TABLE.
    #[must_use]
    pub const fn without_indexes(mut self) -> Self {
        self.inline_indexes = false;
        self
    }
}

/// The two statements of an index rename.
///
/// YDB has no in-place rename, so the index is recreated under the new name
/// and the old one dropped afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameIndexPlan {
    /// Adds the index under its new name.
    pub create: String,
    /// Drops the index under its old name.
    pub drop: String,
}

/// Plans DDL statements for tables under a path prefix.
#[derive(Debug, Clone, Default)]
pub struct MigrationPlanner {
    table_path_prefix: String,
    buffers: BufferPool,
}

impl MigrationPlanner {
    /// Creates a planner for tables under `table_path_prefix`.
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

    /// Full path of the model table under the prefix.
    #[must_use]
    pub fn table_path(&self, schema: &ModelSchema) -> String {
        table_path(&self.table_path_prefix, &schema.table)
    }

    /// Generates CREATE TABLE for the model.
    ///
    /// Fields marked to skip migration are left out. Column types are
    /// written without NOT NULL, but every column is still checked against
    /// the constraints YDB supports.
    ///
    /// # Errors
    ///
    /// Declared CHECK or FOREIGN KEY constraints, unsupported field
    /// constraints or kinds, a model without a primary key and indexes over
    /// unknown fields.
    pub fn create_table(&self, schema: &ModelSchema, options: &CreateTableOptions) -> Result<String> {
        if !schema.constraints.is_empty() {
            return Err(DialectError::ConstraintsNotSupported {
                model: schema.name.clone(),
                count: schema.constraints.len(),
            });
        }

        let mut buf = self.buffers.acquire();
        buf.push_str("CREATE TABLE ");
        quote_path_to(&mut buf, &self.table_path(schema));
        buf.push_str(" (");

        let mut first = true;
        for field in schema.migratable_fields() {
            check_field_constraints(schema, field)?;
            let data_type = data_type_of(field)?;
            if !first {
                buf.push(',');
            }
            first = false;
            buf.push_str("\n\t");
            quote_to(&mut buf, &field.db_name);
            buf.push(' ');
            buf.push_str(&data_type);
        }

        let primary: Vec<&str> = schema
            .primary_fields()
            .map(|f| f.db_name.as_str())
            .collect();
        if primary.is_empty() {
            return Err(DialectError::MissingPrimaryKey(schema.name.clone()));
        }
        if !first {
            buf.push(',');
        }
        buf.push_str("\n\tPRIMARY KEY (");
        write_column_list(&mut buf, primary);
        buf.push(')');

        if options.inline_indexes {
            for index in &schema.indexes {
                let columns = index_columns(schema, index)?;
                buf.push_str(",\n\tINDEX ");
                quote_to(&mut buf, &index.name);
                buf.push_str(" GLOBAL ON (");
                write_column_list(&mut buf, columns);
                buf.push(')');
            }
        }

        buf.push_str("\n)");
        if let Some(table_options) = &options.table_options {
            buf.push_str(table_options);
        }
        buf.push(';');
        Ok(buf.to_string())
    }

    /// Generates DROP TABLE for the model.
    #[must_use]
    pub fn drop_table(&self, schema: &ModelSchema) -> String {
        let mut buf = self.buffers.acquire();
        buf.push_str("DROP TABLE ");
        quote_path_to(&mut buf, &self.table_path(schema));
        buf.push(';');
        buf.to_string()
    }

    /// Generates ADD COLUMN for the field named `name`.
    ///
    /// Returns `None` for fields excluded from migrations.
    ///
    /// # Errors
    ///
    /// Unknown fields, unsupported constraints and unmappable kinds.
    pub fn add_column(&self, schema: &ModelSchema, name: &str) -> Result<Option<String>> {
        let field = schema
            .look_up_field(name)
            .ok_or_else(|| DialectError::FieldNotFound(name.to_string()))?;
        if field.ignore_migration {
            return Ok(None);
        }
        let data_type = full_data_type_of(schema, field)?;

        let mut buf = self.alter_table(schema);
        buf.push_str(" ADD COLUMN ");
        quote_to(&mut buf, &field.db_name);
        buf.push(' ');
        buf.push_str(&data_type);
        buf.push(';');
        Ok(Some(buf.to_string()))
    }

    /// Generates DROP COLUMN. Logical field names resolve to their column
    /// name; anything else is taken as a column name.
    #[must_use]
    pub fn drop_column(&self, schema: &ModelSchema, name: &str) -> String {
        let column = schema
            .look_up_field(name)
            .map_or(name, |f| f.db_name.as_str());

        let mut buf = self.alter_table(schema);
        buf.push_str(" DROP COLUMN ");
        quote_to(&mut buf, column);
        buf.push(';');
        buf.to_string()
    }

    /// Generates ADD INDEX for the model index named `name`.
    ///
    /// # Errors
    ///
    /// [`DialectError::IndexNotFound`] when the model declares no such index.
    pub fn create_index(&self, schema: &ModelSchema, name: &str) -> Result<String> {
        let index = find_index(schema, name)?;
        self.add_index_sql(schema, &index.name, index)
    }

    /// Generates DROP INDEX for the model index named `name`.
    ///
    /// # Errors
    ///
    /// [`DialectError::IndexNotFound`] when the model declares no such index.
    pub fn drop_index(&self, schema: &ModelSchema, name: &str) -> Result<String> {
        let index = find_index(schema, name)?;
        Ok(self.drop_index_sql(schema, &index.name))
    }

    /// Plans renaming index `old` to `new`.
    ///
    /// # Errors
    ///
    /// [`DialectError::IndexNotFound`] when the model declares no index `old`.
    pub fn rename_index(&self, schema: &ModelSchema, old: &str, new: &str) -> Result<RenameIndexPlan> {
        let index = find_index(schema, old)?;
        Ok(RenameIndexPlan {
            create: self.add_index_sql(schema, new, index)?,
            drop: self.drop_index_sql(schema, old),
        })
    }

    fn alter_table(&self, schema: &ModelSchema) -> crate::builder::PooledBuffer<'_> {
        let mut buf = self.buffers.acquire();
        buf.push_str("ALTER TABLE ");
        quote_path_to(&mut buf, &self.table_path(schema));
        buf
    }

    fn add_index_sql(&self, schema: &ModelSchema, name: &str, index: &Index) -> Result<String> {
        let columns = index_columns(schema, index)?;
        let mut buf = self.alter_table(schema);
        buf.push_str(" ADD INDEX ");
        quote_to(&mut buf, name);
        buf.push_str(" GLOBAL ON (");
        write_column_list(&mut buf, columns);
        buf.push_str(");");
        Ok(buf.to_string())
    }

    fn drop_index_sql(&self, schema: &ModelSchema, name: &str) -> String {
        let mut buf = self.alter_table(schema);
        buf.push_str(" DROP INDEX ");
        quote_to(&mut buf, name);
        buf.push(';');
        buf.to_string()
    }
}

fn find_index<'a>(schema: &'a ModelSchema, name: &str) -> Result<&'a Index> {
    schema
        .look_index(name)
        .ok_or_else(|| DialectError::IndexNotFound(name.to_string()))
}

/// Resolves the index fields to column names.
fn index_columns<'a>(schema: &'a ModelSchema, index: &'a Index) -> Result<Vec<&'a str>> {
    index
        .fields
        .iter()
        .map(|name| {
            schema
                .look_up_field(name)
                .map(|f| f.db_name.as_str())
                .ok_or_else(|| DialectError::FieldNotFound(name.clone()))
        })
        .collect()
}

fn write_column_list<'a>(out: &mut String, columns: impl IntoIterator<Item = &'a str>) {
    for (i, column) in columns.into_iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        quote_to(out, column);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Constraint, ConstraintKind, Field, FieldKind};

    fn notes() -> ModelSchema {
        ModelSchema::new("Note", "t")
            .field(Field::new("id", FieldKind::String).primary_key().not_null())
            .field(Field::new("payload", FieldKind::String))
    }

    fn events() -> ModelSchema {
        ModelSchema::new("Event", "events")
            .field(Field::new("tenant", FieldKind::String).primary_key())
            .field(Field::new("id", FieldKind::Uint).size(64).primary_key())
            .field(Field::new("kind", FieldKind::String))
            .field(Field::new("created_at", FieldKind::Time).db_name("created"))
            .field(Field::new("scratch", FieldKind::Custom("Scratch".into())).ignore_migration())
            .index(Index::new("idx_kind", ["kind", "created_at"]))
    }

    #[test]
    fn test_create_table_with_prefix() {
        let sql = MigrationPlanner::new("/x/y")
            .create_table(&notes(), &CreateTableOptions::default())
            .unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE `/x/y/t` (\n\t`id` Utf8,\n\t`payload` Utf8,\n\tPRIMARY KEY (`id`)\n);"
        );
    }

    #[test]
    fn test_create_table_with_indexes_and_options() {
        let options = CreateTableOptions::default().table_options(" WITH (AUTO_PARTITIONING_BY_LOAD = ENABLED)");
        let sql = MigrationPlanner::new("")
            .create_table(&events(), &options)
            .unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE `events` (\n\
             \t`tenant` Utf8,\n\
             \t`id` Uint64,\n\
             \t`kind` Utf8,\n\
             \t`created` Timestamp,\n\
             \tPRIMARY KEY (`tenant`, `id`),\n\
             \tINDEX `idx_kind` GLOBAL ON (`kind`, `created`)\n\
             ) WITH (AUTO_PARTITIONING_BY_LOAD = ENABLED);"
        );
    }

    #[test]
    fn test_create_table_without_inline_indexes() {
        let sql = MigrationPlanner::new("")
            .create_table(&events(), &CreateTableOptions::default().without_indexes())
            .unwrap();
        assert!(!sql.contains("INDEX"));
        assert!(sql.ends_with("PRIMARY KEY (`tenant`, `id`)\n);"));
    }

    #[test]
    fn test_create_table_errors() {
        let planner = MigrationPlanner::new("");
        let options = CreateTableOptions::default();

        let schema = ModelSchema::new("Bare", "bare").field(Field::new("x", FieldKind::Bool));
        assert!(matches!(
            planner.create_table(&schema, &options),
            Err(DialectError::MissingPrimaryKey(m)) if m == "Bare"
        ));

        let schema = notes().constraint(Constraint {
            name: "chk".into(),
            kind: ConstraintKind::Check {
                expression: "payload <> ''".into(),
            },
        });
        let err = planner.create_table(&schema, &options).unwrap_err();
        assert!(err.is_unsupported());

        let schema = notes().field(Field::new("flag", FieldKind::Bool).not_null());
        let err = planner.create_table(&schema, &options).unwrap_err();
        assert!(err.to_string().contains("field flag"));

        let schema = notes().field(Field::new("span", FieldKind::Duration));
        assert!(matches!(
            planner.create_table(&schema, &options),
            Err(DialectError::UnsupportedDataType(_))
        ));

        let schema = notes().index(Index::new("idx_missing", ["nope"]));
        assert!(matches!(
            planner.create_table(&schema, &options),
            Err(DialectError::FieldNotFound(_))
        ));
    }

    #[test]
    fn test_drop_table() {
        assert_eq!(MigrationPlanner::new("/x/y").drop_table(&notes()), "DROP TABLE `/x/y/t`;");
    }

    #[test]
    fn test_add_column() {
        let planner = MigrationPlanner::new("");
        assert_eq!(
            planner.add_column(&notes(), "payload").unwrap().as_deref(),
            Some("ALTER TABLE `t` ADD COLUMN `payload` Utf8;")
        );
        assert_eq!(
            planner.add_column(&events(), "created_at").unwrap().as_deref(),
            Some("ALTER TABLE `events` ADD COLUMN `created` Timestamp;")
        );
        assert_eq!(planner.add_column(&events(), "scratch").unwrap(), None);
        assert!(planner.add_column(&notes(), "nope").unwrap_err().is_not_found());
    }

    #[test]
    fn test_add_column_uses_prefix() {
        assert_eq!(
            MigrationPlanner::new("/db")
                .add_column(&notes(), "payload")
                .unwrap()
                .as_deref(),
            Some("ALTER TABLE `/db/t` ADD COLUMN `payload` Utf8;")
        );
    }

    #[test]
    fn test_drop_column() {
        let planner = MigrationPlanner::new("");
        assert_eq!(
            planner.drop_column(&events(), "created_at"),
            "ALTER TABLE `events` DROP COLUMN `created`;"
        );
        assert_eq!(
            planner.drop_column(&events(), "legacy"),
            "ALTER TABLE `events` DROP COLUMN `legacy`;"
        );
    }

    #[test]
    fn test_index_statements() {
        let planner = MigrationPlanner::new("/db");
        assert_eq!(
            planner.create_index(&events(), "idx_kind").unwrap(),
            "ALTER TABLE `/db/events` ADD INDEX `idx_kind` GLOBAL ON (`kind`, `created`);"
        );
        assert_eq!(
            planner.drop_index(&events(), "idx_kind").unwrap(),
            "ALTER TABLE `/db/events` DROP INDEX `idx_kind`;"
        );
        let err = planner.create_index(&events(), "idx_nope").unwrap_err();
        assert!(err.is_not_found());
        assert!(planner.drop_index(&events(), "idx_nope").is_err());
    }

    #[test]
    fn test_rename_index() {
        let plan = MigrationPlanner::new("")
            .rename_index(&events(), "idx_kind", "idx_kind_created")
            .unwrap();
        assert_eq!(
            plan.create,
            "ALTER TABLE `events` ADD INDEX `idx_kind_created` GLOBAL ON (`kind`, `created`);"
        );
        assert_eq!(plan.drop, "ALTER TABLE `events` DROP INDEX `idx_kind`;");

        assert!(matches!(
            MigrationPlanner::new("").rename_index(&events(), "idx_nope", "x"),
            Err(DialectError::IndexNotFound(_))
        ));
    }

    #[test]
    fn test_buffers_are_returned() {
        let pool = BufferPool::new();
        let planner = MigrationPlanner::new("").with_buffers(pool.clone());
        planner.drop_table(&notes());
        let _ = planner.create_table(&ModelSchema::new("Bare", "bare"), &CreateTableOptions::default());
        assert!(pool.idle() >= 1);
    }
}
