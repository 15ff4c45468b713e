/*!
 * Tests for the SQLite storage engine: ingestion, schema and query execution
 */

use anyhow::Result;
use rusqlite::types::Value;

use lang2sql::database::ingest::{ingest_directory, load_table, parse_csv_content};
use lang2sql::database::schema::create_table_sketch;
use lang2sql::database::{DatabaseConnection, SchemaProvider};
use lang2sql::errors::{QueryError, SchemaError};
use lang2sql::translation::ColumnSchema;

use crate::common::{self, TEST_TABLE};

#[test]
fn test_ingestDirectory_withTwoCsvFiles_shouldConcatenateRows() -> Result<()> {
    let dir = common::create_crime_data_dir()?;
    let db = DatabaseConnection::new_in_memory()?;

    let report = db.execute(|conn| ingest_directory(conn, dir.path(), TEST_TABLE))?;

    assert_eq!(report.table, TEST_TABLE);
    assert_eq!(report.files.len(), 2);
    assert_eq!(report.rows, 5);
    assert!(report.files[0].ends_with("chicago_crimes_2023.csv"));

    let count = common::run_sql(&db, "SELECT COUNT(*) FROM chicago_crime")?;
    assert_eq!(count.rows[0][0], Value::Integer(5));
    Ok(())
}

#[test]
fn test_ingestDirectory_shouldInferDeclaredTypes() -> Result<()> {
    let (_dir, db) = common::crime_database()?;

    let columns = db.describe_table(TEST_TABLE)?;

    assert_eq!(
        columns,
        vec![
            ColumnSchema::new("ID", "BIGINT"),
            ColumnSchema::new("Case Number", "VARCHAR"),
            ColumnSchema::new("Date", "TIMESTAMP"),
            ColumnSchema::new("Primary Type", "VARCHAR"),
            ColumnSchema::new("Arrest", "BOOLEAN"),
            ColumnSchema::new("District", "BIGINT"),
        ]
    );
    Ok(())
}

#[test]
fn test_ingestDirectory_shouldNormalizeTimestampsAndNulls() -> Result<()> {
    let (_dir, db) = common::crime_database()?;

    let result = common::run_sql(
        &db,
        "SELECT \"Date\", \"Arrest\", \"District\" FROM chicago_crime WHERE \"ID\" = 12000002",
    )?;

    assert_eq!(
        result.rows[0],
        vec![
            Value::Text("2024-03-02 18:45:00".to_string()),
            Value::Integer(0),
            Value::Null,
        ]
    );
    Ok(())
}

#[test]
fn test_ingestDirectory_calledTwice_shouldReplaceTable() -> Result<()> {
    let dir = common::create_crime_data_dir()?;
    let db = DatabaseConnection::new_in_memory()?;

    db.execute(|conn| ingest_directory(conn, dir.path(), TEST_TABLE))?;
    let report = db.execute(|conn| ingest_directory(conn, dir.path(), TEST_TABLE))?;

    assert_eq!(report.rows, 5);
    let count = common::run_sql(&db, "SELECT COUNT(*) FROM chicago_crime")?;
    assert_eq!(count.rows[0][0], Value::Integer(5));
    Ok(())
}

#[test]
fn test_ingestDirectory_withNoCsvFiles_shouldFail() -> Result<()> {
    let dir = common::create_temp_dir()?;
    common::create_test_file(dir.path(), "readme.txt", "nothing here")?;
    let db = DatabaseConnection::new_in_memory()?;

    assert!(db.execute(|conn| ingest_directory(conn, dir.path(), TEST_TABLE)).is_err());
    assert!(db.execute(|conn| ingest_directory(conn, dir.path().join("missing"), TEST_TABLE)).is_err());
    Ok(())
}

#[test]
fn test_ingestDirectory_withDifferentHeaders_shouldUnionColumns() -> Result<()> {
    let dir = common::create_temp_dir()?;
    common::create_test_file(dir.path(), "a.csv", "id,name\n1,alpha\n")?;
    common::create_test_file(dir.path(), "b.csv", "id,score\n2,9.5\n")?;
    let db = DatabaseConnection::new_in_memory()?;

    let report = db.execute(|conn| ingest_directory(conn, dir.path(), "people"))?;

    let names: Vec<&str> = report.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "name", "score"]);

    let result = common::run_sql(&db, "SELECT name, score FROM people ORDER BY id")?;
    assert_eq!(result.rows[0], vec![Value::Text("alpha".to_string()), Value::Null]);
    assert_eq!(result.rows[1], vec![Value::Null, Value::Real(9.5)]);
    Ok(())
}

#[test]
fn test_describeTable_withUnknownTable_shouldBeNotFound() -> Result<()> {
    let (_dir, db) = common::crime_database()?;

    let err = db.describe_table("crimes").unwrap_err();

    assert!(matches!(err, SchemaError::NotFound(ref t) if t == "crimes"));
    Ok(())
}

#[test]
fn test_parseCsvContent_withEmptyInput_shouldFail() -> Result<()> {
    assert!(parse_csv_content("").is_err());
    Ok(())
}

#[test]
fn test_loadTable_withQuoteInHeader_shouldKeepNameVerbatim() -> Result<()> {
    let db = DatabaseConnection::new_in_memory()?;
    let data = parse_csv_content("\"say \"\"hi\"\"\",n\nx,1\n")?;

    db.execute(|conn| load_table(conn, "quotes", &data))?;

    let columns = db.describe_table("quotes")?;
    assert_eq!(columns[0].name, "say \"hi\"");
    Ok(())
}

#[test]
fn test_createTableSketch_shouldMatchPromptFormat() {
    let columns = vec![
        ColumnSchema::new("case_id", "INT"),
        ColumnSchema::new("date", "DATE"),
    ];
    assert_eq!(
        create_table_sketch("chicago_crime", &columns),
        "CREATE TABLE chicago_crime (case_id INT, date DATE)"
    );
}

#[test]
fn test_executeQuery_withQuotedColumnNames_shouldRun() -> Result<()> {
    let (_dir, db) = common::crime_database()?;

    let result = common::run_sql(
        &db,
        "SELECT \"Primary Type\", COUNT(*) AS n FROM chicago_crime GROUP BY \"Primary Type\" ORDER BY n DESC, \"Primary Type\"",
    )?;

    assert_eq!(result.columns, vec!["Primary Type", "n"]);
    assert_eq!(
        result.rows[0],
        vec![Value::Text("THEFT".to_string()), Value::Integer(3)]
    );
    Ok(())
}

#[test]
fn test_executeQuery_withUnquotedSpacedColumn_shouldFail() -> Result<()> {
    let (_dir, db) = common::crime_database()?;

    let err = common::run_sql(&db, "SELECT Primary Type FROM chicago_crime").unwrap_err();

    assert!(matches!(err, QueryError::UnknownIdentifier(_) | QueryError::Malformed(_)));
    Ok(())
}

#[test]
fn test_databaseConnection_onDisk_shouldPersistBetweenOpens() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("db").join("crimes.db");
    let data_dir = common::create_crime_data_dir()?;

    {
        let db = DatabaseConnection::new(&path)?;
        db.execute(|conn| ingest_directory(conn, data_dir.path(), TEST_TABLE))?;
    }

    let reopened = DatabaseConnection::new(&path)?;
    assert_eq!(reopened.describe_table(TEST_TABLE)?.len(), 6);
    Ok(())
}
