//! SQLite database client implementation.
//!
//! Provides the `SqliteClient` struct that implements the `DatabaseClient`
//! trait for local SQLite database files using sqlx.

use crate::db::{ColumnInfo, DatabaseClient, QueryResult, Row, Value};
use crate::error::{Result, SqlchatError};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column as SqlxColumn, Row as SqlxRow, TypeInfo};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Query timeout in seconds.
const QUERY_TIMEOUT_SECS: u64 = 30;

/// Maximum rows to return from a query.
const MAX_ROWS: usize = 200;

/// SQLite database client.
#[derive(Debug)]
pub struct SqliteClient {
    pool: SqlitePool,
}

impl SqliteClient {
    /// Opens the SQLite database at the given path.
    ///
    /// The file must already exist; sqlchat never creates databases.
    pub async fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SqlchatError::database(format!(
                "Database file not found: {}",
                path.display()
            )));
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(|e| SqlchatError::database(format!("Failed to open database: {e}")))?;

        info!("Opened database at {}", path.display());

        Ok(Self { pool })
    }

    /// Creates a new SqliteClient from an existing connection pool.
    ///
    /// This is primarily useful for testing.
    #[allow(dead_code)]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DatabaseClient for SqliteClient {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        let start = Instant::now();

        let result = tokio::time::timeout(
            Duration::from_secs(QUERY_TIMEOUT_SECS),
            sqlx::query(sql).fetch_all(&self.pool),
        )
        .await
        .map_err(|_| {
            SqlchatError::database(format!("Query timed out after {QUERY_TIMEOUT_SECS} seconds"))
        })?
        .map_err(|e| SqlchatError::database(e.to_string()))?;

        let execution_time = start.elapsed();
        debug!("Query returned {} rows in {:?}", result.len(), execution_time);

        let columns: Vec<ColumnInfo> = result
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
                    .collect()
            })
            .unwrap_or_default();

        let was_truncated = result.len() > MAX_ROWS;
        let rows: Vec<Row> = result
            .iter()
            .take(MAX_ROWS)
            .map(convert_row)
            .collect::<Result<_>>()?;

        let row_count = rows.len();

        Ok(QueryResult {
            columns,
            rows,
            execution_time,
            row_count,
            was_truncated,
        })
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let rows = sqlx::query_scalar::<_, String>(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
             ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SqlchatError::database(format!("Failed to list tables: {e}")))?;

        Ok(rows)
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// Converts a sqlx row to our Value-based row representation.
fn convert_row(row: &SqliteRow) -> Result<Row> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value based on its declared SQLite type.
///
/// SQLite columns are dynamically typed, so the declared type is a hint;
/// unknown types fall back to text.
fn convert_value(row: &SqliteRow, index: usize, type_name: &str) -> Result<Value> {
    let value = match type_name.to_uppercase().as_str() {
        "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .map(Value::from)
            .map_err(|e| SqlchatError::database(e.to_string()))?,
        "INTEGER" | "INT" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .map(Value::from)
            .map_err(|e| SqlchatError::database(e.to_string()))?,
        "REAL" | "FLOAT" | "DOUBLE" | "NUMERIC" => row
            .try_get::<Option<f64>, _>(index)
            .map(Value::from)
            .map_err(|e| SqlchatError::database(e.to_string()))?,
        "BLOB" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .map(Value::from)
            .map_err(|e| SqlchatError::database(e.to_string()))?,
        _ => row
            .try_get::<Option<String>, _>(index)
            .map(Value::from)
            .map_err(|e| SqlchatError::database(e.to_string()))?,
    };

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn in_memory_client() -> SqliteClient {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        SqliteClient::from_pool(pool)
    }

    #[tokio::test]
    async fn test_execute_simple_select() {
        let client = in_memory_client().await;

        let result = client
            .execute_query("SELECT 1 AS num, 'hello' AS greeting")
            .await
            .unwrap();

        assert_eq!(result.columns.len(), 2);
        assert_eq!(result.columns[0].name, "num");
        assert_eq!(result.row_count, 1);
        assert_eq!(result.rows[0][0], Value::Int(1));
        assert_eq!(result.rows[0][1], Value::String("hello".to_string()));
    }

    #[tokio::test]
    async fn test_execute_query_error() {
        let client = in_memory_client().await;

        let result = client.execute_query("SELECT * FROM no_such_table").await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .starts_with("Database error:"));
    }

    #[tokio::test]
    async fn test_list_tables() {
        let client = in_memory_client().await;

        client
            .execute_query("CREATE TABLE patients (name TEXT, sugar INTEGER)")
            .await
            .unwrap();
        client
            .execute_query("CREATE TABLE visits (id INTEGER)")
            .await
            .unwrap();

        let tables = client.list_tables().await.unwrap();
        assert_eq!(tables, vec!["patients".to_string(), "visits".to_string()]);
    }

    #[tokio::test]
    async fn test_null_values() {
        let client = in_memory_client().await;

        let result = client.execute_query("SELECT NULL AS nothing").await.unwrap();
        assert_eq!(result.rows[0][0], Value::Null);
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let result = SqliteClient::open(Path::new("/nonexistent/missing.db")).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_truncation() {
        let client = in_memory_client().await;

        client
            .execute_query("CREATE TABLE numbers (n INTEGER)")
            .await
            .unwrap();
        client
            .execute_query(
                "WITH RECURSIVE seq(n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM seq LIMIT 500) \
                 INSERT INTO numbers SELECT n FROM seq",
            )
            .await
            .unwrap();

        let result = client.execute_query("SELECT n FROM numbers").await.unwrap();
        assert!(result.was_truncated);
        assert_eq!(result.row_count, MAX_ROWS);
    }
}
