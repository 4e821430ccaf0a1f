//! Driver-backed schema migrations.
//!
//! Statements come from the [`MigrationPlanner`] and run as idempotent
//! scheme queries through the [`SchemeClient`]. Driver failures are wrapped
//! with the operation and the source location; nothing is retried.
//!
//! [`MigrationPlanner`]: ydb_sql_core::migrations::MigrationPlanner

use tracing::{debug, info, warn};
use ydb_sql_core::error::{DialectError, UnsupportedOperation};
use ydb_sql_core::migrations::CreateTableOptions;
use ydb_sql_core::path::join_path;
use ydb_sql_core::schema::{Model, ModelSchema};
use ydb_sql_core::types::{data_type_of, type_by_ydb_type, ColumnType};

use crate::dialect::YdbDialect;
use crate::driver::{EntryType, ExecOptions, SchemeClient, TableDescription};
use crate::error::{Error, Result};

impl<C: SchemeClient> YdbDialect<C> {
    /// Brings the table of `M` in line with its schema.
    ///
    /// # Errors
    ///
    /// See [`Self::auto_migrate`].
    pub async fn auto_migrate_model<M: Model>(&self) -> Result<()> {
        let schema = self.schema_of::<M>();
        self.auto_migrate(&schema).await
    }

    /// Brings the table in line with `schema`.
    ///
    /// A missing table is created. Otherwise columns absent from the live
    /// table are added and missing indexes created. Columns whose live type
    /// differs from the declared one are rejected since YDB cannot alter
    /// column types. Every statement is planned and every column checked
    /// before the first one runs.
    ///
    /// # Errors
    ///
    /// Driver failures, planning errors and
    /// [`UnsupportedOperation::AlterColumn`] on type drift.
    pub async fn auto_migrate(&self, schema: &ModelSchema) -> Result<()> {
        info!(model = %schema.name, table = %schema.table, "Auto-migrating model");
        if !self.has_table(schema).await? {
            return self.create_table(schema).await;
        }

        let description = self.describe(schema).await?;
        let mut missing = Vec::new();
        for field in schema.migratable_fields() {
            let Some(column) = description.column(&field.db_name) else {
                missing.push(field);
                continue;
            };
            let (live, _) = type_by_ydb_type(field, &column.ydb_type, &[])?;
            let declared = data_type_of(field)?;
            if live.database_type_name() != declared {
                warn!(
                    column = %field.db_name,
                    live = %live.database_type_name(),
                    declared = %declared,
                    "Column type changed"
                );
                return Err(DialectError::Unsupported(UnsupportedOperation::AlterColumn).into());
            }
        }

        // plan everything before the first statement runs
        let mut queries = Vec::new();
        for field in missing {
            if let Some(query) = self.planner.add_column(schema, &field.name)? {
                queries.push(("add column", query));
            }
        }
        for index in &schema.indexes {
            if !description.has_index(&index.name) {
                queries.push(("create index", self.planner.create_index(schema, &index.name)?));
            }
        }

        for (operation, query) in &queries {
            info!(table = %schema.table, operation = %operation, "Applying schema change");
            self.exec(operation, query).await?;
        }
        Ok(())
    }

    /// Creates the table for `schema`.
    ///
    /// Indexes are declared inline, or created one by one afterwards when
    /// the configuration asks for it.
    ///
    /// # Errors
    ///
    /// Planning errors and driver failures.
    pub async fn create_table(&self, schema: &ModelSchema) -> Result<()> {
        let after = self.config.create_index_after_create_table;
        let options = CreateTableOptions {
            table_options: self.config.table_options.clone(),
            inline_indexes: !after,
        };
        let query = self.planner.create_table(schema, &options)?;
        info!(table = %self.planner.table_path(schema), "Creating table");
        self.exec("create table", &query).await?;

        if after {
            for index in &schema.indexes {
                self.create_index(schema, &index.name).await?;
            }
        }
        Ok(())
    }

    /// Drops the table for `schema` if it exists.
    ///
    /// # Errors
    ///
    /// Driver failures.
    pub async fn drop_table(&self, schema: &ModelSchema) -> Result<()> {
        if !self.has_table(schema).await? {
            debug!(table = %schema.table, "Table does not exist, skipping drop");
            return Ok(());
        }
        info!(table = %self.planner.table_path(schema), "Dropping table");
        self.exec("drop table", &self.planner.drop_table(schema)).await
    }

    /// Returns whether the table for `schema` exists.
    ///
    /// # Errors
    ///
    /// Driver failures.
    pub async fn has_table(&self, schema: &ModelSchema) -> Result<bool> {
        let path = self.planner.table_path(schema);
        self.client
            .is_table_exists(&path)
            .await
            .map_err(|e| Error::driver(format!("check table {path}"), e))
    }

    /// Lists every table under the prefix, descending into directories.
    ///
    /// Names are relative to the prefix, e.g. `audit/events`.
    ///
    /// # Errors
    ///
    /// Driver failures.
    pub async fn get_tables(&self) -> Result<Vec<String>> {
        let mut tables = Vec::new();
        let mut pending = vec![String::new()];
        while let Some(relative) = pending.pop() {
            let path = join_path(&[&self.table_path_prefix, &relative]);
            let entries = self
                .client
                .list_directory(&path)
                .await
                .map_err(|e| Error::driver(format!("list directory {path}"), e))?;
            for entry in entries {
                let child = join_path(&[&relative, &entry.name]);
                match entry.entry_type {
                    EntryType::Table => tables.push(child),
                    EntryType::Directory => pending.push(child),
                    EntryType::Other => {}
                }
            }
        }
        tables.sort();
        Ok(tables)
    }

    /// Adds the column of field `name`. Fields excluded from migrations are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Unknown fields, unsupported constraints and driver failures.
    pub async fn add_column(&self, schema: &ModelSchema, name: &str) -> Result<()> {
        let Some(query) = self.planner.add_column(schema, name)? else {
            debug!(field = %name, "Field ignored by migrations, skipping");
            return Ok(());
        };
        info!(table = %schema.table, field = %name, "Adding column");
        self.exec("add column", &query).await
    }

    /// Drops the column of field `name`, or the column `name`.
    ///
    /// # Errors
    ///
    /// Driver failures.
    pub async fn drop_column(&self, schema: &ModelSchema, name: &str) -> Result<()> {
        info!(table = %schema.table, column = %name, "Dropping column");
        self.exec("drop column", &self.planner.drop_column(schema, name))
            .await
    }

    /// Column types of the live table, in schema field order.
    ///
    /// Fields without a live column are left out.
    ///
    /// # Errors
    ///
    /// Driver failures and unmappable live types.
    pub async fn column_types(&self, schema: &ModelSchema) -> Result<Vec<ColumnType>> {
        let description = self.describe(schema).await?;
        let mut columns = Vec::new();
        for field in &schema.fields {
            if let Some(column) = description.column(&field.db_name) {
                let (column_type, _) = type_by_ydb_type(field, &column.ydb_type, &[])?;
                columns.push(column_type);
            }
        }
        Ok(columns)
    }

    /// Creates the model index `name`.
    ///
    /// # Errors
    ///
    /// Unknown indexes and driver failures.
    pub async fn create_index(&self, schema: &ModelSchema, name: &str) -> Result<()> {
        let query = self.planner.create_index(schema, name)?;
        info!(table = %schema.table, index = %name, "Creating index");
        self.exec("create index", &query).await
    }

    /// Drops the model index `name`.
    ///
    /// # Errors
    ///
    /// Unknown indexes and driver failures.
    pub async fn drop_index(&self, schema: &ModelSchema, name: &str) -> Result<()> {
        let query = self.planner.drop_index(schema, name)?;
        info!(table = %schema.table, index = %name, "Dropping index");
        self.exec("drop index", &query).await
    }

    /// Returns whether the live table has an index `name`.
    ///
    /// # Errors
    ///
    /// Driver failures.
    pub async fn has_index(&self, schema: &ModelSchema, name: &str) -> Result<bool> {
        Ok(self.describe(schema).await?.has_index(name))
    }

    /// Renames index `old` to `new`.
    ///
    /// Runs in two steps: the index is created under the new name, then the
    /// old one is dropped.
    ///
    /// # Errors
    ///
    /// Unknown indexes and driver failures. When only the drop fails the
    /// error is [`Error::PartialRename`] and both indexes exist.
    pub async fn rename_index(&self, schema: &ModelSchema, old: &str, new: &str) -> Result<()> {
        let plan = self.planner.rename_index(schema, old, new)?;
        info!(table = %schema.table, old = %old, new = %new, "Renaming index");
        self.exec("rename index (create)", &plan.create).await?;
        if let Err(err) = self.exec("rename index (drop)", &plan.drop).await {
            warn!(index = %new, "Index created but dropping the old one failed");
            return Err(Error::PartialRename {
                table: self.planner.table_path(schema),
                old: old.to_string(),
                new: new.to_string(),
                source: Box::new(err),
            });
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Always, YDB cannot alter column types.
    pub fn alter_column(&self, _schema: &ModelSchema, _field: &str) -> Result<()> {
        unsupported(UnsupportedOperation::AlterColumn)
    }

    /// # Errors
    ///
    /// Always.
    pub fn migrate_column(&self, _schema: &ModelSchema, _field: &str, _live: &ColumnType) -> Result<()> {
        unsupported(UnsupportedOperation::MigrateColumn)
    }

    /// # Errors
    ///
    /// Always.
    pub fn rename_column(&self, _schema: &ModelSchema, _old: &str, _new: &str) -> Result<()> {
        unsupported(UnsupportedOperation::RenameColumn)
    }

    /// # Errors
    ///
    /// Always.
    pub fn rename_table(&self, _old: &str, _new: &str) -> Result<()> {
        unsupported(UnsupportedOperation::RenameTable)
    }

    /// # Errors
    ///
    /// Always.
    pub fn has_column(&self, _schema: &ModelSchema, _field: &str) -> Result<bool> {
        unsupported(UnsupportedOperation::HasColumn)
    }

    /// # Errors
    ///
    /// Always.
    pub fn create_view(&self, _name: &str, _query: &str) -> Result<()> {
        unsupported(UnsupportedOperation::CreateView)
    }

    /// # Errors
    ///
    /// Always.
    pub fn drop_view(&self, _name: &str) -> Result<()> {
        unsupported(UnsupportedOperation::DropView)
    }

    /// # Errors
    ///
    /// Always.
    pub fn create_constraint(&self, _schema: &ModelSchema, _name: &str) -> Result<()> {
        unsupported(UnsupportedOperation::CreateConstraint)
    }

    /// # Errors
    ///
    /// Always.
    pub fn drop_constraint(&self, _schema: &ModelSchema, _name: &str) -> Result<()> {
        unsupported(UnsupportedOperation::DropConstraint)
    }

    /// # Errors
    ///
    /// Always.
    pub fn has_constraint(&self, _schema: &ModelSchema, _name: &str) -> Result<bool> {
        unsupported(UnsupportedOperation::HasConstraint)
    }

    /// # Errors
    ///
    /// Always.
    pub fn get_indexes(&self, _schema: &ModelSchema) -> Result<Vec<String>> {
        unsupported(UnsupportedOperation::GetIndexes)
    }

    /// # Errors
    ///
    /// Always.
    pub fn get_type_aliases(&self, _database_type_name: &str) -> Result<Vec<String>> {
        unsupported(UnsupportedOperation::GetTypeAliases)
    }

    /// # Errors
    ///
    /// Always.
    pub fn table_type(&self, _schema: &ModelSchema) -> Result<String> {
        unsupported(UnsupportedOperation::TableType)
    }

    /// # Errors
    ///
    /// Always, YDB has no savepoints.
    pub fn save_point(&self, _name: &str) -> Result<()> {
        unsupported(UnsupportedOperation::SavePoint)
    }

    /// # Errors
    ///
    /// Always, YDB has no savepoints.
    pub fn rollback_to(&self, _name: &str) -> Result<()> {
        unsupported(UnsupportedOperation::RollbackTo)
    }

    async fn describe(&self, schema: &ModelSchema) -> Result<TableDescription> {
        let path = self.planner.table_path(schema);
        self.client
            .describe_table(&path)
            .await
            .map_err(|e| Error::driver(format!("describe table {path}"), e))
    }

    async fn exec(&self, operation: &str, query: &str) -> Result<()> {
        debug!(sql = %query, "Executing scheme query");
        self.client
            .execute_scheme_query(query, ExecOptions::idempotent())
            .await
            .map_err(|e| Error::driver(operation, e))
    }
}

fn unsupported<T>(operation: UnsupportedOperation) -> Result<T> {
    Err(DialectError::Unsupported(operation).into())
}
