//! Integration tests running `SchemaUtility` against a real SQLite engine.

use schema_util_core::{ExistsProbe, Executor, SchemaConfig, SchemaError, SchemaUtility};
use schema_util_sqlite::SqliteExecutor;

/// Opens an in-memory database and runs setup SQL on it.
fn setup(sql: &str) -> SqliteExecutor {
    let exec = SqliteExecutor::open_in_memory().unwrap();
    exec.connection().execute_batch(sql).unwrap();
    exec
}

fn column_names(exec: &SqliteExecutor, table: &str) -> Vec<String> {
    let mut stmt = exec
        .connection()
        .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")
        .unwrap();
    stmt.query_map([table], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}

#[test]
fn table_exists_follows_create_and_drop() {
    let mut exec = SqliteExecutor::open_in_memory().unwrap();

    for is_temporary_table in [true, false] {
        SchemaUtility::new(&mut exec)
            .drop_table_if_exists("CHEESE2", is_temporary_table)
            .unwrap();
        assert!(!SchemaUtility::new(&mut exec).table_exists("CHEESE2").unwrap());

        assert!(exec.execute("CREATE TABLE CHEESE2( `column` int );").is_success());
        assert!(SchemaUtility::new(&mut exec).table_exists("CHEESE2").unwrap());

        SchemaUtility::new(&mut exec)
            .drop_table_if_exists("CHEESE2", false)
            .unwrap();
        assert!(!SchemaUtility::new(&mut exec).table_exists("CHEESE2").unwrap());
    }
}

#[test]
fn drop_table_if_exists_twice_is_silent() {
    let mut exec = SqliteExecutor::open_in_memory().unwrap();
    let mut schema = SchemaUtility::new(&mut exec);

    schema.drop_table_if_exists("CHEESE2", false).unwrap();
    schema.drop_table_if_exists("CHEESE2", false).unwrap();
    schema.drop_table_if_exists("CHEESE2", true).unwrap();
    schema.drop_table_if_exists("CHEESE2", true).unwrap();
    assert!(!schema.table_exists("CHEESE2").unwrap());
}

#[test]
fn temporary_drop_only_removes_temporary_table() {
    let mut exec = setup("CREATE TABLE shared (c int); CREATE TEMPORARY TABLE scratch (c int);");
    let mut schema = SchemaUtility::new(&mut exec);

    assert!(schema.table_exists("scratch").unwrap());
    schema.drop_table_if_exists("scratch", true).unwrap();
    assert!(!schema.table_exists("scratch").unwrap());

    schema.drop_table_if_exists("shared", true).unwrap();
    assert!(schema.table_exists("shared").unwrap());
}

#[test]
fn probes_restore_error_toggles() {
    let mut exec = SqliteExecutor::open_in_memory().unwrap();
    assert!(!SchemaUtility::new(&mut exec).table_exists("missing").unwrap());

    // Visible and unsuppressed again once the probe is finished.
    assert!(exec.set_error_visibility(true));
    assert!(!exec.set_error_suppression(false));
    assert_eq!(exec.last_error(), Some("Table 'missing' doesn't exist"));
}

#[test]
fn column_exists_on_real_table() {
    let mut exec = setup("CREATE TABLE wp_rates (id INTEGER PRIMARY KEY, region TEXT);");
    let mut schema = SchemaUtility::new(&mut exec);

    assert!(schema.column_exists("wp_rates", "region").unwrap());
    assert!(!schema.column_exists("wp_rates", "zip").unwrap());
    assert!(!schema.column_exists("no_table", "region").unwrap());
}

#[test]
fn add_varchar_column_to_missing_table() {
    let mut exec = SqliteExecutor::open_in_memory().unwrap();
    let err = SchemaUtility::new(&mut exec)
        .add_varchar_column("missing_table", "col", 50)
        .unwrap_err();
    assert!(matches!(err, SchemaError::TableNotFound { .. }));
}

#[test]
fn add_varchar_column_once() {
    let mut exec = setup("CREATE TABLE wp_rates (id INTEGER PRIMARY KEY);");
    {
        let mut schema = SchemaUtility::new(&mut exec);
        assert!(schema.add_varchar_column("wp_rates", "region", 50).unwrap());
        assert!(!schema.add_varchar_column("wp_rates", "region", 50).unwrap());
        assert!(!schema.add_varchar_column("wp_rates", "`region`", 80).unwrap());
    }

    assert_eq!(column_names(&exec, "wp_rates"), vec!["id", "region"]);

    exec.connection()
        .execute("INSERT INTO wp_rates (id) VALUES (1)", [])
        .unwrap();
    let region: String = exec
        .connection()
        .query_row("SELECT region FROM wp_rates WHERE id = 1", [], |row| row.get(0))
        .unwrap();
    assert_eq!(region, "");
}

#[test]
fn drop_column_when_present() {
    let mut exec = setup("CREATE TABLE wp_rates (id INTEGER PRIMARY KEY, legacy TEXT, region TEXT);");
    {
        let mut schema = SchemaUtility::new(&mut exec);
        assert!(schema.drop_column("wp_rates", "legacy").unwrap());
        assert!(!schema.drop_column("wp_rates", "legacy").unwrap());
        assert!(matches!(
            schema.drop_column("gone", "legacy"),
            Err(SchemaError::TableNotFound { .. })
        ));
    }
    assert_eq!(column_names(&exec, "wp_rates"), vec!["id", "region"]);
}

#[test]
fn primary_key_detection() {
    let mut exec = setup(
        "CREATE TABLE keyed (id INTEGER PRIMARY KEY); CREATE TABLE heap (id INTEGER);",
    );
    let mut schema = SchemaUtility::new(&mut exec);

    assert!(schema.has_primary_key("keyed").unwrap());
    assert!(!schema.has_primary_key("heap").unwrap());
    assert!(!schema.has_primary_key("absent").unwrap());
}

#[test]
fn primary_key_changes_skip_when_already_in_state() {
    let mut exec = setup(
        "CREATE TABLE keyed (id INTEGER PRIMARY KEY); CREATE TABLE heap (id INTEGER);",
    );
    let mut schema = SchemaUtility::new(&mut exec);

    assert!(!schema.add_primary_key("keyed", "id").unwrap());
    assert!(!schema.drop_primary_key("heap").unwrap());
}

#[test]
fn primary_key_changes_surface_engine_errors() {
    let mut exec = setup(
        "CREATE TABLE keyed (id INTEGER PRIMARY KEY); CREATE TABLE heap (id INTEGER);",
    );
    let mut schema = SchemaUtility::new(&mut exec);

    let err = schema.add_primary_key("heap", "id").unwrap_err();
    match err {
        SchemaError::SchemaMutation { statement, message } => {
            assert_eq!(statement, "ALTER TABLE `heap` ADD PRIMARY KEY (`id`);");
            assert!(message.contains("primary key"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(matches!(
        schema.drop_primary_key("keyed"),
        Err(SchemaError::SchemaMutation { .. })
    ));
}

#[test]
fn show_tables_like_probe_matches_exact_name() {
    let config = SchemaConfig {
        exists_probe: ExistsProbe::ShowTablesLike,
        ..Default::default()
    };
    let mut exec = setup("CREATE TABLE wpXrates (c int); CREATE TEMPORARY TABLE scratch (c int);");
    let mut schema = SchemaUtility::with_config(&mut exec, config).unwrap();

    assert!(schema.table_exists("wpXrates").unwrap());
    assert!(!schema.table_exists("wp_rates").unwrap());
    assert!(!schema.table_exists("WPXRATES").unwrap());
    assert!(!schema.table_exists("scratch").unwrap());
}

#[test]
fn drop_table_with_foreign_key_checks_disabled() {
    let ddl = "
        CREATE TABLE parent (id INTEGER PRIMARY KEY);
        CREATE TABLE child (id INTEGER PRIMARY KEY, parent_id INTEGER REFERENCES parent(id));
        INSERT INTO parent (id) VALUES (1);
        INSERT INTO child (id, parent_id) VALUES (1, 1);
    ";

    let mut exec = setup(ddl);
    let err = SchemaUtility::new(&mut exec)
        .drop_table_if_exists("parent", false)
        .unwrap_err();
    assert!(matches!(err, SchemaError::SchemaMutation { .. }));

    let config = SchemaConfig {
        disable_foreign_key_checks: true,
        ..Default::default()
    };
    let mut schema = SchemaUtility::with_config(&mut exec, config).unwrap();
    schema.drop_table_if_exists("parent", false).unwrap();
    assert!(!schema.table_exists("parent").unwrap());

    let enforced: i64 = exec
        .connection()
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enforced, 1);
}

#[test]
#[allow(deprecated)]
fn deprecated_drop_still_drops() {
    let mut exec = setup("CREATE TABLE CHEESE2 (c int);");
    let mut schema = SchemaUtility::new(&mut exec);
    schema.maybe_drop_old_table("CHEESE2").unwrap();
    assert!(!schema.table_exists("CHEESE2").unwrap());
}

#[test]
fn file_database_persists_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("site.db");

    {
        let mut exec = SqliteExecutor::open(&path).unwrap();
        assert!(exec.execute("CREATE TABLE wp_rates (id INTEGER PRIMARY KEY);").is_success());
        assert!(SchemaUtility::new(&mut exec)
            .add_varchar_column("wp_rates", "region", 50)
            .unwrap());
    }

    let mut exec = SqliteExecutor::open(&path).unwrap();
    let mut schema = SchemaUtility::new(&mut exec);
    assert!(schema.table_exists("wp_rates").unwrap());
    assert!(schema.column_exists("wp_rates", "region").unwrap());
}
