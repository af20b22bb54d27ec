use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use schema_util_core::{SchemaConfig, SchemaUtility};
use schema_util_sqlite::SqliteExecutor;

#[derive(Debug, Parser)]
#[command(name = "schema-util")]
#[command(about = "Inspect and adjust table schemas in a SQLite database")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Report whether a table exists.
    TableExists(TableArgs),
    /// Report whether a table has a column.
    ColumnExists(ColumnArgs),
    /// Report whether a table has a primary key.
    HasPrimaryKey(TableArgs),
    /// Drop a table if it exists.
    DropTable(DropTableArgs),
    /// Add a nullable varchar column unless it already exists.
    AddColumn(AddColumnArgs),
    /// Add a primary key unless the table already has one.
    AddPrimaryKey(ColumnArgs),
    /// Drop the primary key if the table has one.
    DropPrimaryKey(TableArgs),
    /// Drop a column if it exists.
    DropColumn(ColumnArgs),
}

#[derive(Debug, Args)]
struct DatabaseArgs {
    /// Database file path.
    #[arg(long)]
    db: PathBuf,
    /// YAML configuration file (table prefix, foreign key handling, exists probe).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct TableArgs {
    #[command(flatten)]
    database: DatabaseArgs,
    /// Table name, without the configured prefix.
    #[arg(long)]
    table: String,
}

#[derive(Debug, Args)]
struct ColumnArgs {
    #[command(flatten)]
    database: DatabaseArgs,
    /// Table name, without the configured prefix.
    #[arg(long)]
    table: String,
    /// Column name.
    #[arg(long)]
    column: String,
}

#[derive(Debug, Args)]
struct DropTableArgs {
    #[command(flatten)]
    database: DatabaseArgs,
    /// Table name, without the configured prefix.
    #[arg(long)]
    table: String,
    /// Only drop a temporary table of that name.
    #[arg(long)]
    temporary: bool,
}

#[derive(Debug, Args)]
struct AddColumnArgs {
    #[command(flatten)]
    database: DatabaseArgs,
    /// Table name, without the configured prefix.
    #[arg(long)]
    table: String,
    /// Column name.
    #[arg(long)]
    column: String,
    /// Maximum varchar length.
    #[arg(long, default_value_t = 255)]
    length: u32,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::TableExists(args) => run_table_exists(args),
        Command::ColumnExists(args) => run_column_exists(args),
        Command::HasPrimaryKey(args) => run_has_primary_key(args),
        Command::DropTable(args) => run_drop_table(args),
        Command::AddColumn(args) => run_add_column(args),
        Command::AddPrimaryKey(args) => run_add_primary_key(args),
        Command::DropPrimaryKey(args) => run_drop_primary_key(args),
        Command::DropColumn(args) => run_drop_column(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// probes
// ---------------------------------------------------------------------------

fn run_table_exists(args: TableArgs) -> Result<(), String> {
    let (mut exec, config) = open(&args.database)?;
    let mut schema = utility(&mut exec, config)?;
    let table = schema.table_name(&args.table);
    let exists = schema
        .table_exists(&table)
        .map_err(|e| format!("Table check failed: {e}"))?;
    println!("{}", yes_no(exists));
    Ok(())
}

fn run_column_exists(args: ColumnArgs) -> Result<(), String> {
    let (mut exec, config) = open(&args.database)?;
    let mut schema = utility(&mut exec, config)?;
    let table = schema.table_name(&args.table);
    let exists = schema
        .column_exists(&table, &args.column)
        .map_err(|e| format!("Column check failed: {e}"))?;
    println!("{}", yes_no(exists));
    Ok(())
}

fn run_has_primary_key(args: TableArgs) -> Result<(), String> {
    let (mut exec, config) = open(&args.database)?;
    let mut schema = utility(&mut exec, config)?;
    let table = schema.table_name(&args.table);
    let exists = schema
        .has_primary_key(&table)
        .map_err(|e| format!("Primary key check failed: {e}"))?;
    println!("{}", yes_no(exists));
    Ok(())
}

// ---------------------------------------------------------------------------
// changes
// ---------------------------------------------------------------------------

fn run_drop_table(args: DropTableArgs) -> Result<(), String> {
    let (mut exec, config) = open(&args.database)?;
    let mut schema = utility(&mut exec, config)?;
    let table = schema.table_name(&args.table);
    schema
        .drop_table_if_exists(&table, args.temporary)
        .map_err(|e| format!("Drop table failed: {e}"))?;
    println!(
        "Dropped {}table '{table}' if it existed.",
        if args.temporary { "temporary " } else { "" }
    );
    Ok(())
}

fn run_add_column(args: AddColumnArgs) -> Result<(), String> {
    let (mut exec, config) = open(&args.database)?;
    let mut schema = utility(&mut exec, config)?;
    let table = schema.table_name(&args.table);
    let added = schema
        .add_varchar_column(&table, &args.column, args.length)
        .map_err(|e| format!("Add column failed: {e}"))?;
    if added {
        println!(
            "Added column '{}' varchar({}) to '{table}'.",
            args.column, args.length
        );
    } else {
        println!("Column '{}' already exists on '{table}'.", args.column);
    }
    Ok(())
}

fn run_add_primary_key(args: ColumnArgs) -> Result<(), String> {
    let (mut exec, config) = open(&args.database)?;
    let mut schema = utility(&mut exec, config)?;
    let table = schema.table_name(&args.table);
    let added = schema
        .add_primary_key(&table, &args.column)
        .map_err(|e| format!("Add primary key failed: {e}"))?;
    if added {
        println!("Added primary key ({}) to '{table}'.", args.column);
    } else {
        println!("Table '{table}' already has a primary key.");
    }
    Ok(())
}

fn run_drop_primary_key(args: TableArgs) -> Result<(), String> {
    let (mut exec, config) = open(&args.database)?;
    let mut schema = utility(&mut exec, config)?;
    let table = schema.table_name(&args.table);
    let dropped = schema
        .drop_primary_key(&table)
        .map_err(|e| format!("Drop primary key failed: {e}"))?;
    if dropped {
        println!("Dropped primary key from '{table}'.");
    } else {
        println!("Table '{table}' has no primary key.");
    }
    Ok(())
}

fn run_drop_column(args: ColumnArgs) -> Result<(), String> {
    let (mut exec, config) = open(&args.database)?;
    let mut schema = utility(&mut exec, config)?;
    let table = schema.table_name(&args.table);
    let dropped = schema
        .drop_column(&table, &args.column)
        .map_err(|e| format!("Drop column failed: {e}"))?;
    if dropped {
        println!("Dropped column '{}' from '{table}'.", args.column);
    } else {
        println!("Column '{}' does not exist on '{table}'.", args.column);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Opens the database and loads the configuration, if one was given.
fn open(args: &DatabaseArgs) -> Result<(SqliteExecutor, SchemaConfig), String> {
    let exec = SqliteExecutor::open(&args.db)
        .map_err(|e| format!("Failed to open database '{}': {e}", args.db.display()))?;
    let config = match &args.config {
        Some(path) => SchemaConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))?,
        None => SchemaConfig::default(),
    };
    Ok((exec, config))
}

fn utility(
    exec: &mut SqliteExecutor,
    config: SchemaConfig,
) -> Result<SchemaUtility<'_, SqliteExecutor>, String> {
    SchemaUtility::with_config(exec, config).map_err(|e| format!("Invalid configuration: {e}"))
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
