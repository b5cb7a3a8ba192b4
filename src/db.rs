use crate::error::Result;
use crate::models::Record;
use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Row};
use serde_json::Value;
use std::path::Path;

/// Runs read-only queries against a database file
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run `sql` with positional integer parameters and return every row
    async fn query(&self, path: &Path, sql: &str, params: &[i64]) -> Result<Vec<Record>>;

    /// Column names of `table`, empty if the table does not exist
    async fn table_columns(&self, path: &Path, table: &str) -> Result<Vec<String>>;
}

/// SQLite executor opening a fresh read-only connection per call
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteExecutor;

impl SqliteExecutor {
    fn open(path: &Path) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }

    pub fn query_blocking(path: &Path, sql: &str, params: &[i64]) -> Result<Vec<Record>> {
        let conn = Self::open(path)?;
        let mut stmt = conn.prepare(sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), |row| {
            record_from_row(row, &names)
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| e.into())
    }

    pub fn table_columns_blocking(path: &Path, table: &str) -> Result<Vec<String>> {
        let conn = Self::open(path)?;
        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
        let names = stmt.query_map([table], |row| row.get::<_, String>(0))?;
        names
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| e.into())
    }
}

#[async_trait]
impl QueryExecutor for SqliteExecutor {
    async fn query(&self, path: &Path, sql: &str, params: &[i64]) -> Result<Vec<Record>> {
        let path = path.to_path_buf();
        let sql = sql.to_string();
        let params = params.to_vec();
        tokio::task::spawn_blocking(move || Self::query_blocking(&path, &sql, &params)).await?
    }

    async fn table_columns(&self, path: &Path, table: &str) -> Result<Vec<String>> {
        let path = path.to_path_buf();
        let table = table.to_string();
        tokio::task::spawn_blocking(move || Self::table_columns_blocking(&path, &table)).await?
    }
}

fn record_from_row(row: &Row, names: &[String]) -> std::result::Result<Record, rusqlite::Error> {
    let mut record = Record::new();
    for (idx, name) in names.iter().enumerate() {
        let value = match row.get_ref(idx)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(n) => Value::from(n),
            ValueRef::Real(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ValueRef::Text(text) => Value::String(String::from_utf8_lossy(text).into_owned()),
            // Blobs have no JSON form
            ValueRef::Blob(_) => Value::Null,
        };
        record.insert(name.clone(), value);
    }
    Ok(record)
}
