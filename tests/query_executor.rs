use rusqlite::{Connection, ErrorCode};
use sqlite_access::{
    is_error_payload, AccessError, ErrorKind, Result, SqlAccess, SqlQuery, SqliteAccess,
    SqliteConfig,
};
use tempfile::NamedTempFile;

// Helper function to create a temporary file-based database with one user
fn create_temp_db() -> (SqliteAccess, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let conn = Connection::open(temp_file.path()).unwrap();
    initialize_schema(&conn).unwrap();
    (SqliteAccess::open(temp_file.path()), temp_file)
}

// Initialize the database schema
fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE Users (
            Username TEXT PRIMARY KEY,
            Email TEXT UNIQUE NOT NULL,
            Admin TEXT NOT NULL DEFAULT 'n'
        );
        INSERT INTO Users (Username, Email, Admin) VALUES ('alice', 'a@x.com', 'n');
        CREATE TABLE Readings (
            Id INTEGER PRIMARY KEY,
            Value REAL,
            Note TEXT
        );
        INSERT INTO Readings (Value, Note) VALUES (1.5, NULL), (2.0, 'ok');
        "#,
    )
}

fn user_query(username: &str) -> SqlQuery {
    SqlQuery::new("SELECT Username, Admin FROM Users WHERE Username = ?").with_value(username)
}

#[test]
fn test_select_returns_header_and_text_rows() -> Result<()> {
    let (db, _file) = create_temp_db();

    let users = db.run_query(&user_query("alice"))?;
    assert_eq!(
        users.as_rows(),
        &[
            vec!["Username".to_string(), "Admin".to_string()],
            vec!["alice".to_string(), "n".to_string()],
        ]
    );
    Ok(())
}

#[test]
fn test_empty_result_is_header_only() -> Result<()> {
    let (db, _file) = create_temp_db();

    let users = db.run_query(&user_query("nobody"))?;
    assert_eq!(users.as_rows().len(), 1);
    assert_eq!(users.header().len(), 2);
    assert!(users.is_empty());
    Ok(())
}

#[test]
fn test_every_cell_is_text() -> Result<()> {
    let (db, _file) = create_temp_db();

    let readings = db.run_query(&SqlQuery::new(
        "SELECT Id, Value, Note FROM Readings ORDER BY Id",
    ))?;
    assert_eq!(readings.header(), &["Id", "Value", "Note"]);
    assert_eq!(
        readings.data(),
        &[
            vec!["1".to_string(), "1.5".to_string(), "NULL".to_string()],
            vec!["2".to_string(), "2.0".to_string(), "ok".to_string()],
        ]
    );
    for row in readings.data() {
        assert_eq!(row.len(), readings.header().len());
    }
    Ok(())
}

#[test]
fn test_insert_is_visible_to_next_read() -> Result<()> {
    let (db, _file) = create_temp_db();

    let outcome = db.run_update(
        &SqlQuery::new("INSERT INTO Users (Username, Email, Admin) VALUES (?, ?, ?)")
            .with_value("bob")
            .with_value("b@x.com")
            .with_value("n"),
    )?;
    assert_eq!(outcome.last_insert_rowid, 2);
    assert_eq!(outcome.changes, 1);

    let bob = db.run_query(&user_query("bob"))?;
    assert_eq!(bob.first_row(), Some(&["bob".to_string(), "n".to_string()][..]));
    Ok(())
}

#[test]
fn test_update_reports_changed_rows() -> Result<()> {
    let (db, _file) = create_temp_db();

    let outcome = db.run_update(
        &SqlQuery::new("UPDATE Users SET Admin = ? WHERE Username = ?")
            .with_value("y")
            .with_value("alice"),
    )?;
    assert_eq!(outcome.changes, 1);
    assert_eq!(outcome.last_insert_rowid, 0);

    let alice = db.run_query(&user_query("alice"))?;
    assert_eq!(alice.column("Admin"), Some(vec!["y"]));
    Ok(())
}

#[test]
fn test_missing_table_is_an_error_value() {
    let (db, _file) = create_temp_db();

    let err = db
        .run_query(&SqlQuery::new("SELECT * FROM NoSuchTable"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Statement);
    let payload = err.legacy_payload("run_query");
    assert!(is_error_payload(&payload));
    assert!(payload.contains("no such table: NoSuchTable"));
}

#[test]
fn test_arity_mismatch_is_rejected() -> Result<()> {
    let (db, _file) = create_temp_db();

    let too_few = SqlQuery::new("SELECT Username FROM Users WHERE Username = ? AND Admin = ?")
        .with_value("alice");
    assert_eq!(db.run_query(&too_few).unwrap_err().kind(), ErrorKind::Statement);

    let too_many = user_query("alice").with_value("extra");
    assert_eq!(db.run_query(&too_many).unwrap_err().kind(), ErrorKind::Statement);

    let short_insert = SqlQuery::new("INSERT INTO Users (Username, Email, Admin) VALUES (?, ?, ?)")
        .with_value("carol")
        .with_value("c@x.com");
    assert_eq!(db.run_update(&short_insert).unwrap_err().kind(), ErrorKind::Statement);
    assert!(db.run_query(&user_query("carol"))?.is_empty());
    Ok(())
}

#[test]
fn test_constraint_violation_leaves_data_unchanged() -> Result<()> {
    let (db, _file) = create_temp_db();

    let duplicate_email = SqlQuery::new("INSERT INTO Users (Username, Email) VALUES (?, ?)")
        .with_value("mallory")
        .with_value("a@x.com");
    let err = db.run_update(&duplicate_email).unwrap_err();
    assert!(matches!(
        &err,
        AccessError::Statement(e) if e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation)
    ));

    let count = db.run_query(&SqlQuery::new("SELECT count(*) AS n FROM Users"))?;
    assert_eq!(count.column("n"), Some(vec!["1"]));
    Ok(())
}

#[test]
fn test_values_are_bound_not_spliced() -> Result<()> {
    let (db, _file) = create_temp_db();

    let injected = db.run_query(&user_query("alice' OR '1'='1"))?;
    assert!(injected.is_empty());
    Ok(())
}

#[test]
fn test_connections_released_on_every_path() -> Result<()> {
    let (db, file) = create_temp_db();

    db.run_query(&user_query("alice"))?;
    assert_eq!(db.open_connections(), 0);
    db.run_query(&SqlQuery::new("SELEKT nonsense")).unwrap_err();
    assert_eq!(db.open_connections(), 0);
    db.run_update(
        &SqlQuery::new("UPDATE Users SET Email = ? WHERE Username = ?")
            .with_value("alice@x.com")
            .with_value("alice"),
    )?;
    db.run_update(&SqlQuery::new("INSERT INTO Nowhere VALUES (1)"))
        .unwrap_err();
    assert_eq!(db.open_connections(), 0);

    // Nothing still holds a lock or an open transaction on the file.
    let probe = Connection::open(file.path()).unwrap();
    probe.execute_batch("BEGIN EXCLUSIVE; COMMIT;").unwrap();
    Ok(())
}

#[test]
fn test_locked_database_fails_immediately() {
    let (db, file) = create_temp_db();

    let holder = Connection::open(file.path()).unwrap();
    holder.execute_batch("BEGIN EXCLUSIVE;").unwrap();

    let err = db
        .run_update(
            &SqlQuery::new("INSERT INTO Users (Username, Email) VALUES (?, ?)")
                .with_value("dave")
                .with_value("d@x.com"),
        )
        .unwrap_err();
    assert!(matches!(
        &err,
        AccessError::Statement(e) if e.sqlite_error_code() == Some(ErrorCode::DatabaseBusy)
    ));
    assert_eq!(db.open_connections(), 0);

    holder.execute_batch("ROLLBACK;").unwrap();
}

#[test]
fn test_unopenable_target_is_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let db = SqliteAccess::open(dir.path().join("missing").join("app.db"));

    let err = db.run_query(&SqlQuery::new("SELECT 1")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert_eq!(db.open_connections(), 0);
}

#[test]
fn test_non_database_file_is_connection_error() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), vec![b'x'; 4096]).unwrap();
    let db = SqliteAccess::new(SqliteConfig::new(file.path()));

    let err = db.run_query(&SqlQuery::new("SELECT * FROM Users")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
}

#[test]
fn test_shared_memory_fixture() -> Result<()> {
    let db = SqliteAccess::shared_memory("query_executor_fixture")?;
    db.run_update(&SqlQuery::new(
        "CREATE TABLE Location (LocationName TEXT, Latitude REAL, Longitude REAL)",
    ))?;
    db.run_update(
        &SqlQuery::new("INSERT INTO Location VALUES (?, ?, ?)")
            .with_value("Leeds")
            .with_value(53.8)
            .with_value(-1.55),
    )?;

    let clone = db.clone();
    let location = clone.run_query(
        &SqlQuery::new("SELECT Latitude, Longitude FROM Location WHERE LocationName = ?")
            .with_value("Leeds"),
    )?;
    assert_eq!(location.first_row(), Some(&["53.8".to_string(), "-1.55".to_string()][..]));
    Ok(())
}
