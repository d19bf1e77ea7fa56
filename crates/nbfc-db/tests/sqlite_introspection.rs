use nbfc_db::{create_pool, DbError, DbRuntimeSettings, Dialect, SqlDatabase};

fn seeded_database(dir: &tempfile::TempDir) -> SqlDatabase {
    let path = dir.path().join("nbfc.db");
    let url = format!("sqlite://{}", path.display());
    let db = SqlDatabase::connect(&url, DbRuntimeSettings::default()).expect("connect");

    let conn = db.sqlite_pool().expect("sqlite pool").get().unwrap();
    conn.execute_batch(
        "CREATE TABLE loan_leads (
            id TEXT PRIMARY KEY,
            product_type TEXT,
            loan_amount_requested REAL,
            lead_source TEXT,
            status TEXT DEFAULT 'new'
        );
        CREATE TABLE customers (
            id TEXT PRIMARY KEY,
            full_name TEXT,
            cibil_score INTEGER
        );
        INSERT INTO loan_leads VALUES ('L1', 'HL', 2500000.0, 'DSA', 'new');
        INSERT INTO loan_leads VALUES ('L2', 'PL', 300000.0, 'CHATBOT', 'rejected');
        INSERT INTO loan_leads VALUES ('L3', 'BL', 900000.0, 'BRANCH', 'new');
        INSERT INTO loan_leads VALUES ('L4', 'HL', 4100000.0, 'REFERRAL', 'approved');
        INSERT INTO customers VALUES ('C1', 'Asha Rao', 782);",
    )
    .unwrap();
    db
}

#[tokio::test]
async fn lists_tables_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    let db = seeded_database(&dir);

    assert_eq!(db.dialect(), Dialect::Sqlite);
    assert_eq!(
        db.table_names().await.unwrap(),
        vec!["customers".to_string(), "loan_leads".to_string()]
    );
}

#[tokio::test]
async fn table_info_has_ddl_and_three_sample_rows() {
    let dir = tempfile::tempdir().unwrap();
    let db = seeded_database(&dir);

    let info = db.table_info("loan_leads").await.unwrap();
    assert!(info.starts_with("CREATE TABLE loan_leads"), "got: {info}");
    assert!(info.contains("3 rows from loan_leads table:"));
    assert!(info.contains("id\tproduct_type\tloan_amount_requested\tlead_source\tstatus"));
    assert!(info.contains("L1\tHL"));
    assert!(!info.contains("L4"), "only three sample rows expected");
}

#[tokio::test]
async fn table_info_names_missing_tables() {
    let dir = tempfile::tempdir().unwrap();
    let db = seeded_database(&dir);

    match db.table_info("customers, loan_accounts").await {
        Err(DbError::UnknownTables(names)) => assert_eq!(names, "loan_accounts"),
        other => panic!("expected UnknownTables, got {:?}", other),
    }
}

#[tokio::test]
async fn run_returns_rows_and_truncates() {
    let dir = tempfile::tempdir().unwrap();
    let db = seeded_database(&dir);

    let result = db
        .run(
            "SELECT id, status FROM loan_leads WHERE status = 'new' ORDER BY id;",
            10,
        )
        .await
        .unwrap();
    assert!(!result.truncated);
    assert_eq!(result.rows.len(), 2);
    assert_eq!(result.rows[0]["id"], "L1");
    assert_eq!(result.rows[1]["id"], "L3");

    let capped = db.run("SELECT id FROM loan_leads ORDER BY id", 2).await.unwrap();
    assert!(capped.truncated);
    assert_eq!(capped.rows.len(), 2);
}

#[tokio::test]
async fn run_rejects_writes() {
    let dir = tempfile::tempdir().unwrap();
    let db = seeded_database(&dir);

    let err = db
        .run("UPDATE loan_leads SET status = 'approved'", 10)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::ReadOnly(_)));

    let still_new = db
        .run("SELECT COUNT(*) AS n FROM loan_leads WHERE status = 'new'", 10)
        .await
        .unwrap();
    assert_eq!(still_new.rows[0]["n"], 2);
}

#[tokio::test]
async fn sql_errors_surface_as_sqlite_errors() {
    let pool = create_pool(":memory:", DbRuntimeSettings::default()).unwrap();
    let db = SqlDatabase::from_sqlite_pool(pool);

    let err = db.run("SELECT missing_column FROM nowhere", 5).await.unwrap_err();
    assert!(matches!(err, DbError::Sqlite(_)));
}
