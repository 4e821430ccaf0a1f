//! ydb-dialect CLI
//!
//! Prints the YQL for schema changes of a model schema file.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use ydb_dialect::Config;
use ydb_sql_core::migrations::{CreateTableOptions, MigrationPlanner};
use ydb_sql_core::path::join_path;
use ydb_sql_core::quote::quote;
use ydb_sql_core::schema::ModelSchema;

/// YQL generation for YDB schema changes.
#[derive(Parser)]
#[command(name = "ydb-dialect")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Connection string; its database path is put in front of the prefix.
    #[arg(long, env = "YDB_CONNECTION_STRING")]
    dsn: Option<String>,

    /// Table path prefix.
    #[arg(short, long, env = "YDB_TABLE_PATH_PREFIX", default_value = "")]
    prefix: String,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print CREATE TABLE.
    CreateTable {
        /// Model schema JSON file.
        #[arg(short, long)]
        schema: PathBuf,

        /// Appended verbatim after the column list.
        #[arg(long)]
        table_options: Option<String>,

        /// Leave indexes out and print them as separate statements.
        #[arg(long)]
        separate_indexes: bool,
    },

    /// Print DROP TABLE.
    DropTable {
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// Print ADD COLUMN for a field.
    AddColumn {
        #[arg(short, long)]
        schema: PathBuf,

        /// Field or column name.
        #[arg(short, long)]
        column: String,
    },

    /// Print DROP COLUMN.
    DropColumn {
        #[arg(short, long)]
        schema: PathBuf,

        /// Field or column name.
        #[arg(short, long)]
        column: String,
    },

    /// Print ADD INDEX for a declared index.
    CreateIndex {
        #[arg(short, long)]
        schema: PathBuf,

        #[arg(short, long)]
        index: String,
    },

    /// Print DROP INDEX for a declared index.
    DropIndex {
        #[arg(short, long)]
        schema: PathBuf,

        #[arg(short, long)]
        index: String,
    },

    /// Print the two statements of an index rename.
    RenameIndex {
        #[arg(short, long)]
        schema: PathBuf,

        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,
    },

    /// Print a quoted identifier.
    Quote {
        identifier: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let database = cli
        .dsn
        .as_deref()
        .map(Config::new)
        .and_then(|config| config.database().map(str::to_string))
        .unwrap_or_default();
    let prefix = join_path(&[&database, &cli.prefix]);
    debug!(prefix = %prefix, "Resolved table path prefix");
    let planner = MigrationPlanner::new(prefix);

    match cli.command {
        Commands::CreateTable {
            schema,
            table_options,
            separate_indexes,
        } => {
            let schema = load_schema(&schema)?;
            let mut options = CreateTableOptions::default();
            if let Some(table_options) = table_options {
                options = options.table_options(table_options);
            }
            if separate_indexes {
                options = options.without_indexes();
            }
            println!("{}", planner.create_table(&schema, &options)?);
            if separate_indexes {
                for index in &schema.indexes {
                    println!("{}", planner.create_index(&schema, &index.name)?);
                }
            }
        }

        Commands::DropTable { schema } => {
            let schema = load_schema(&schema)?;
            println!("{}", planner.drop_table(&schema));
        }

        Commands::AddColumn { schema, column } => {
            let schema = load_schema(&schema)?;
            match planner.add_column(&schema, &column)? {
                Some(sql) => println!("{sql}"),
                None => debug!(field = %column, "Field ignored by migrations"),
            }
        }

        Commands::DropColumn { schema, column } => {
            let schema = load_schema(&schema)?;
            println!("{}", planner.drop_column(&schema, &column));
        }

        Commands::CreateIndex { schema, index } => {
            let schema = load_schema(&schema)?;
            println!("{}", planner.create_index(&schema, &index)?);
        }

        Commands::DropIndex { schema, index } => {
            let schema = load_schema(&schema)?;
            println!("{}", planner.drop_index(&schema, &index)?);
        }

        Commands::RenameIndex { schema, from, to } => {
            let schema = load_schema(&schema)?;
            let plan = planner.rename_index(&schema, &from, &to)?;
            println!("{}", plan.create);
            println!("{}", plan.drop);
        }

        Commands::Quote { identifier } => {
            println!("{}", quote(&identifier));
        }
    }

    Ok(())
}

fn load_schema(path: &Path) -> ydb_dialect::Result<ModelSchema> {
    debug!(path = %path.display(), "Loading model schema");
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
