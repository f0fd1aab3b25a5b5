use ledger_db::Db;
use rusqlite::Connection;

#[test]
fn migrate_records_applied_names_and_is_repeatable() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("migrate.sqlite");

    let mut db = Db::open(&db_path).expect("open db");
    db.migrate().expect("first migrate");
    db.add_table_time("2024-01-01", 2, 600, 7).expect("add time");
    db.migrate().expect("second migrate");

    assert_eq!(
        db.applied_migrations().expect("applied"),
        vec!["0001_init".to_string()]
    );
    let record = db
        .usage_record("2024-01-01")
        .expect("read")
        .expect("record");
    assert_eq!(record.total_time(2), Some(600));
}

#[test]
fn migrate_adopts_database_created_before_tracking() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("legacy.sqlite");
    {
        let conn = Connection::open(&db_path).expect("open conn");
        let migration = include_str!("../migrations/0001_init.sql");
        conn.execute_batch(migration).expect("migrate 0001");
        conn.execute(
            "INSERT INTO usage_day (date, created_at) VALUES ('2023-12-31', '2023-12-31T08:00:00Z')",
            [],
        )
        .expect("insert day");
    }

    let mut db = Db::open(&db_path).expect("open db");
    db.migrate().expect("migrate");

    assert_eq!(
        db.applied_migrations().expect("applied"),
        vec!["0001_init".to_string()]
    );
    assert_eq!(
        db.list_usage_days().expect("days"),
        vec!["2023-12-31".to_string()]
    );
}
