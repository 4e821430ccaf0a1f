//! The YDB dialect facade.
//!
//! [`YdbDialect`] bundles the hooks an ORM needs from a SQL dialect:
//! naming, quoting, bind variables, type names, clause builders and the
//! driver-backed migrator in [`crate::migrator`].

use std::sync::{Arc, LazyLock};

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use regex::{Captures, Regex};
use tracing::{debug, info};
use ydb_sql_core::builder::{BufferPool, QueryBuilder};
use ydb_sql_core::migrations::MigrationPlanner;
use ydb_sql_core::path::join_path;
use ydb_sql_core::schema::{Field, Model, ModelSchema, SchemaCache};
use ydb_sql_core::statement::{Statement, Value};
use ydb_sql_core::{quote, types};

use crate::config::Config;
use crate::driver::{Connector, SchemeClient};
use crate::error::{Error, Result};
use crate::registry::ClauseRegistry;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(\d+)|\?").expect("Invalid placeholder regex"));

/// YDB dialect over a scheme client.
pub struct YdbDialect<C: SchemeClient> {
    pub(crate) client: C,
    pub(crate) config: Config,
    pub(crate) table_path_prefix: String,
    pub(crate) schemas: SchemaCache,
    pub(crate) builder: QueryBuilder,
    pub(crate) planner: MigrationPlanner,
    pub(crate) registry: ClauseRegistry,
}

impl<C: SchemeClient> YdbDialect<C> {
    /// Opens a client with `connector` and builds the dialect over it.
    ///
    /// # Errors
    ///
    /// [`Error::Driver`] when the connection fails.
    pub async fn connect<K>(connector: &K, config: Config) -> Result<Self>
    where
        K: Connector<Client = C>,
    {
        let client = connector
            .connect(&config)
            .await
            .map_err(|e| Error::driver("connect", e))?;
        Ok(Self::new(client, config))
    }

    /// Builds the dialect over an open client.
    ///
    /// Tables live under the configured prefix inside the client's
    /// database.
    #[must_use]
    pub fn new(client: C, config: Config) -> Self {
        let table_path_prefix = join_path(&[client.database_name(), &config.table_path_prefix]);
        info!(
            database = %client.database_name(),
            prefix = %table_path_prefix,
            "Initializing ydb dialect"
        );
        let buffers = BufferPool::new();
        Self {
            builder: QueryBuilder::new(table_path_prefix.clone()).with_buffers(buffers.clone()),
            planner: MigrationPlanner::new(table_path_prefix.clone()).with_buffers(buffers),
            registry: ClauseRegistry::new(),
            schemas: SchemaCache::new(),
            table_path_prefix,
            client,
            config,
        }
    }

    /// Returns the dialect name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        "ydb"
    }

    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Absolute directory holding the tables.
    #[must_use]
    pub fn table_path_prefix(&self) -> &str {
        &self.table_path_prefix
    }

    /// Absolute path of `table`.
    #[must_use]
    pub fn table_path(&self, table: &str) -> String {
        self.builder.table_path(table)
    }

    /// Name of the connected database.
    #[must_use]
    pub fn current_database(&self) -> &str {
        self.client.database_name()
    }

    #[must_use]
    pub const fn query_builder(&self) -> &QueryBuilder {
        &self.builder
    }

    #[must_use]
    pub const fn planner(&self) -> &MigrationPlanner {
        &self.planner
    }

    /// Returns the schema of `M`, parsed once and cached.
    #[must_use]
    pub fn schema_of<M: Model>(&self) -> Arc<ModelSchema> {
        self.schemas.get_or_parse::<M>()
    }

    /// Appends the quoted identifier to `out`.
    pub fn quote_to(&self, out: &mut String, identifier: &str) {
        quote::quote_to(out, identifier);
    }

    /// Returns the quoted identifier.
    #[must_use]
    pub fn quote(&self, identifier: &str) -> String {
        quote::quote(identifier)
    }

    /// Appends the next bind variable, `$N` with N the number of variables
    /// already on the statement.
    pub fn bind_var_to(&self, out: &mut String, stmt: &Statement) {
        out.push('$');
        out.push_str(&stmt.vars.len().to_string());
    }

    /// YQL type name of a field.
    ///
    /// # Errors
    ///
    /// Field kinds without a YDB type.
    pub fn data_type_of(&self, field: &Field) -> Result<String> {
        Ok(types::data_type_of(field)?)
    }

    /// Column type with `NOT NULL` when allowed.
    ///
    /// # Errors
    ///
    /// Unsupported field constraints and field kinds.
    pub fn full_data_type_of(&self, schema: &ModelSchema, field: &Field) -> Result<String> {
        Ok(ydb_sql_core::migrations::full_data_type_of(schema, field)?)
    }

    /// Default value expression of a field.
    #[must_use]
    pub const fn default_value_of(&self, _field: &Field) -> &'static str {
        "DEFAULT"
    }

    /// Returns `sql` with the `?` and `$N` placeholders replaced by the
    /// inlined `vars`. For logging only.
    ///
    /// `?` placeholders take the variables in order, `$N` takes the N-th.
    /// Placeholders without a variable are left untouched.
    #[must_use]
    pub fn explain(&self, sql: &str, vars: &[Value]) -> String {
        let mut next = 0;
        PLACEHOLDER
            .replace_all(sql, |caps: &Captures<'_>| {
                let index = match caps.get(1) {
                    Some(n) => n.as_str().parse::<usize>().ok(),
                    None => {
                        next += 1;
                        Some(next - 1)
                    }
                };
                index
                    .and_then(|i| vars.get(i))
                    .map_or_else(|| caps[0].to_string(), Value::to_inline)
            })
            .into_owned()
    }

    /// Current UTC time rounded to `precision` fractional digits of a
    /// second.
    #[must_use]
    pub fn now_func(&self, precision: u32) -> DateTime<Utc> {
        round_to_precision(Utc::now(), precision)
    }

    /// The clause builders of this dialect.
    #[must_use]
    pub const fn clause_builders(&self) -> &ClauseRegistry {
        &self.registry
    }

    /// Renders the clauses named in `names` into `stmt`.
    ///
    /// # Errors
    ///
    /// See [`ClauseRegistry::build`].
    pub fn build(&self, stmt: &mut Statement, names: &[&str]) -> Result<()> {
        self.registry.build(&self.builder, stmt, names)?;
        debug!(sql = %stmt.sql, vars = stmt.vars.len(), "Built statement");
        Ok(())
    }
}

/// Rounds `t` to the nearest multiple of 10^-`precision` seconds.
///
/// Precisions of nine digits and more leave `t` unchanged.
#[must_use]
pub fn round_to_precision(t: DateTime<Utc>, precision: u32) -> DateTime<Utc> {
    if precision >= 9 {
        return t;
    }
    let step = TimeDelta::nanoseconds(10_i64.pow(9 - precision));
    t.duration_round(step).unwrap_or(t)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Timelike};

    use super::*;

    #[test]
    fn test_round_to_precision() {
        let t = Utc
            .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        assert_eq!(round_to_precision(t, 0).nanosecond(), 0);
        assert_eq!(round_to_precision(t, 3).nanosecond(), 123_000_000);
        assert_eq!(round_to_precision(t, 6).nanosecond(), 123_457_000);
        assert_eq!(round_to_precision(t, 9), t);

        let late = t.with_nanosecond(600_000_000).unwrap();
        assert_eq!(round_to_precision(late, 0).second(), 1);
    }
}
