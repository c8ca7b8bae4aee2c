use picodb::database::MEMORY_DB_NAME;
use picodb::{Database, StatementKind};

#[test]
fn test_transaction_lifecycle() {
    let mut db = Database::open(MEMORY_DB_NAME).unwrap();
    assert!(!db.in_transaction());

    // BEGIN
    let result = db.execute("BEGIN").unwrap();
    assert_eq!(result.kind, StatementKind::Begin);
    assert!(db.in_transaction());

    // COMMIT
    db.execute("COMMIT;").unwrap();
    assert!(!db.in_transaction());

    // BEGIN & ROLLBACK
    db.execute("begin transaction").unwrap();
    assert!(db.in_transaction());
    db.execute("ROLLBACK").unwrap();
    assert!(!db.in_transaction());
}

#[test]
fn test_rollback_keeps_data() {
    let mut db = Database::open(MEMORY_DB_NAME).unwrap();

    db.execute("BEGIN").unwrap();
    db.execute("CREATE TABLE t").unwrap();
    db.execute("INSERT INTO t VALUES ('kept')").unwrap();
    db.execute("ROLLBACK").unwrap();

    // The flag is the only transactional state; nothing is undone.
    assert_eq!(db.table_count(), 1);
    let outcome = db.execute("SELECT * FROM t").unwrap();
    assert_eq!(outcome.rows_streamed, 1);
}

#[test]
fn test_commit_without_begin() {
    let mut db = Database::open(MEMORY_DB_NAME).unwrap();
    db.execute("COMMIT").unwrap();
    assert!(!db.in_transaction());
}
