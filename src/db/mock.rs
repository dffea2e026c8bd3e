//! Mock database clients for testing.
//!
//! Provides in-memory implementations for tests and headless mode.

use super::{ColumnInfo, DatabaseClient, QueryResult, Row, Value};
use crate::error::{Result, SqlchatError};
use async_trait::async_trait;
use std::time::Duration;

/// A mock database client that returns predefined results.
pub struct MockDatabaseClient {
    tables: Vec<String>,
    /// Custom result mappings (substring of the SQL -> rows).
    canned_results: Vec<(String, Vec<Row>)>,
}

impl MockDatabaseClient {
    /// Creates a new mock database client with a single sample table.
    pub fn new() -> Self {
        Self {
            tables: vec!["patients".to_string()],
            canned_results: Vec::new(),
        }
    }

    /// Sets the table names returned by `list_tables`.
    pub fn with_tables(mut self, tables: Vec<String>) -> Self {
        self.tables = tables;
        self
    }

    /// Adds a canned result: when the SQL contains `pattern`, return `rows`.
    pub fn with_result(mut self, pattern: impl Into<String>, rows: Vec<Row>) -> Self {
        self.canned_results.push((pattern.into(), rows));
        self
    }
}

impl Default for MockDatabaseClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        for (pattern, rows) in &self.canned_results {
            if sql.contains(pattern.as_str()) {
                let columns = rows
                    .first()
                    .map(|row| {
                        (0..row.len())
                            .map(|i| ColumnInfo::new(format!("col{i}"), "TEXT"))
                            .collect()
                    })
                    .unwrap_or_default();
                let mut result = QueryResult::with_data(columns, rows.clone());
                result.execution_time = Duration::from_millis(1);
                return Ok(result);
            }
        }

        // Default: a single-row echo of the query
        let columns = vec![ColumnInfo::new("result", "TEXT")];
        let rows = vec![vec![Value::String(format!("mock result for: {sql}"))]];
        let mut result = QueryResult::with_data(columns, rows);
        result.execution_time = Duration::from_millis(1);
        Ok(result)
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self.tables.clone())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A database client where every operation fails.
///
/// Used to test error paths without a real database.
#[derive(Debug, Default)]
pub struct FailingDatabaseClient;

impl FailingDatabaseClient {
    /// Creates a new failing database client.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn execute_query(&self, _sql: &str) -> Result<QueryResult> {
        Err(SqlchatError::database("database is unavailable"))
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        Err(SqlchatError::database("database is unavailable"))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_default_result() {
        let client = MockDatabaseClient::new();
        let result = client.execute_query("SELECT 1").await.unwrap();
        assert_eq!(result.row_count, 1);
        assert!(result.rows[0][0]
            .to_display_string()
            .contains("mock result for"));
    }

    #[tokio::test]
    async fn test_mock_canned_result() {
        let client = MockDatabaseClient::new().with_result(
            "FROM patients",
            vec![vec![Value::String("Alice".to_string()), Value::Int(180)]],
        );

        let result = client
            .execute_query("SELECT name, sugar FROM patients")
            .await
            .unwrap();
        assert_eq!(result.to_compact_text(), "Alice,180");
    }

    #[tokio::test]
    async fn test_mock_list_tables() {
        let client = MockDatabaseClient::new().with_tables(vec!["a".into(), "b".into()]);
        assert_eq!(client.list_tables().await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_failing_client() {
        let client = FailingDatabaseClient::new();
        assert!(client.execute_query("SELECT 1").await.is_err());
        assert!(client.list_tables().await.is_err());
    }
}
