use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One row of a query result, keyed by column name
pub type ResultRow = serde_json::Map<String, serde_json::Value>;

/// Column description from schema introspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
    pub is_primary_key: bool,
    pub default: Option<String>,
}

impl ColumnInfo {
    /// Whether the declared type holds text, for LIKE-style searching
    pub fn is_textual(&self) -> bool {
        let declared = self.data_type.to_lowercase();
        declared.contains("char") || declared.contains("text")
    }
}

/// Schema descriptor for a single table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<ColumnInfo>,
}

/// Rows returned by a successful statement
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<ResultRow>,
    pub row_count: usize,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<ResultRow>) -> Self {
        let row_count = rows.len();
        Self {
            columns,
            rows,
            row_count,
        }
    }
}

/// Outcome of running one SQL statement.
///
/// Ordinary SQL problems (syntax, constraints, missing tables) are a `Failed` value, not
/// an error, because the repair loop needs to read the message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Succeeded(QueryResult),
    Failed {
        error_message: String,
        error_class: String,
    },
}

impl ExecutionOutcome {
    pub fn failed(error_message: impl Into<String>, error_class: impl Into<String>) -> Self {
        Self::Failed {
            error_message: error_message.into(),
            error_class: error_class.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}

/// Infrastructure-level gateway failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("Database unreachable: {0}")]
    Connectivity(String),

    #[error("Table not found: {table}")]
    NotFound { table: String },

    #[error("Schema introspection failed: {0}")]
    Introspection(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),
}

impl GatewayError {
    pub fn not_found(table: impl Into<String>) -> Self {
        Self::NotFound {
            table: table.into(),
        }
    }
}

/// Access to one relational backend.
///
/// Connection liveness is the implementor's concern; callers assume every call either
/// succeeds or reports a well-defined failure.
#[async_trait]
pub trait DatabaseGateway: Send + Sync {
    async fn list_tables(&self) -> Result<Vec<String>, GatewayError>;

    async fn get_schema(&self, table_name: &str) -> Result<TableSchema, GatewayError>;

    /// Run a statement. `Err` is reserved for connectivity problems.
    async fn execute(&self, sql: &str) -> Result<ExecutionOutcome, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_textual_column_detection() {
        let mut column = ColumnInfo {
            name: "email".to_string(),
            data_type: "VARCHAR(255)".to_string(),
            nullable: true,
            is_primary_key: false,
            default: None,
        };
        assert!(column.is_textual());
        column.data_type = "INTEGER".to_string();
        assert!(!column.is_textual());
    }

    #[test]
    fn test_column_type_serializes_as_type() {
        let column = ColumnInfo {
            name: "id".to_string(),
            data_type: "INTEGER".to_string(),
            nullable: false,
            is_primary_key: true,
            default: None,
        };
        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(json["type"], "INTEGER");
    }

    #[test]
    fn test_query_result_counts_rows() {
        let mut row = ResultRow::new();
        row.insert("n".to_string(), serde_json::json!(3));
        let result = QueryResult::new(vec!["n".to_string()], vec![row]);
        assert_eq!(result.row_count, 1);
    }
}
