// Integration tests for the ledger schema bootstrap

use rusqlite::Connection;
use sqlmig_store::bootstrap::{apply_bootstrap, compute_checksum, get_steps, BOOTSTRAP_TABLE};

fn table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

#[test]
fn test_bootstrap_creates_ledger_tables() {
    let mut conn = Connection::open_in_memory().unwrap();

    apply_bootstrap(&mut conn).unwrap();

    let tables = table_names(&conn);
    assert!(tables.contains(&"schema_migrations".to_string()));
    assert!(tables.contains(&BOOTSTRAP_TABLE.to_string()));
}

#[test]
fn test_bootstrap_records_every_step_once() {
    let mut conn = Connection::open_in_memory().unwrap();

    apply_bootstrap(&mut conn).unwrap();
    apply_bootstrap(&mut conn).unwrap();

    let count: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM {}", BOOTSTRAP_TABLE),
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count as usize, get_steps().len());
}

#[test]
fn test_bootstrap_stores_checksums() {
    let mut conn = Connection::open_in_memory().unwrap();
    apply_bootstrap(&mut conn).unwrap();

    for step in get_steps() {
        let stored: String = conn
            .query_row(
                &format!("SELECT checksum FROM {} WHERE step_id = ?1", BOOTSTRAP_TABLE),
                [step.id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(stored, compute_checksum(step.sql));
    }
}

#[test]
fn test_bootstrap_detects_edited_step() {
    let mut conn = Connection::open_in_memory().unwrap();
    apply_bootstrap(&mut conn).unwrap();

    conn.execute(
        &format!(
            "UPDATE {} SET checksum = 'tampered' WHERE step_id = '001_ledger_table'",
            BOOTSTRAP_TABLE
        ),
        [],
    )
    .unwrap();

    let err = apply_bootstrap(&mut conn).unwrap_err();
    assert_eq!(err.op(), Some("ledger_bootstrap_checksum"));
    assert!(err.message().contains("001_ledger_table"));
}
