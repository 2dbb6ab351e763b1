//! SQLite gateway over an `sqlx` connection pool.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Executor, Row, TypeInfo, ValueRef};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::gateway::{
    ColumnInfo, DatabaseGateway, ExecutionOutcome, GatewayError, QueryResult, ResultRow,
    TableSchema,
};
use crate::config::DatabaseConfig;
use crate::logging::log_database_operation;

#[derive(Debug, Clone)]
pub struct SqliteGateway {
    pool: SqlitePool,
}

impl SqliteGateway {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self, GatewayError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| GatewayError::Connectivity(e.to_string()))?;

        info!(
            url = %config.url,
            max_connections = config.max_connections,
            "Connected to SQLite database"
        );
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Column names of a statement without running it; empty when the statement
    /// cannot be described
    async fn describe_columns(&self, sql: &str) -> Vec<String> {
        match self.pool.describe(sql).await {
            Ok(described) => described
                .columns()
                .iter()
                .map(|column| column.name().to_string())
                .collect(),
            Err(e) => {
                warn!(error = %e, "Could not describe result columns");
                Vec::new()
            }
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("SQLite pool closed");
    }
}

pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn is_connectivity_error(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

fn error_class(error: &sqlx::Error) -> &'static str {
    match error {
        sqlx::Error::Database(_) => "DatabaseError",
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => "DecodeError",
        sqlx::Error::ColumnNotFound(_) | sqlx::Error::ColumnIndexOutOfBounds { .. } => {
            "ColumnError"
        }
        sqlx::Error::Protocol(_) => "ProtocolError",
        _ => "Error",
    }
}

fn sql_error_message(error: &sqlx::Error) -> String {
    match error {
        sqlx::Error::Database(db_error) => db_error.message().to_string(),
        other => other.to_string(),
    }
}

fn decode_value(row: &SqliteRow, index: usize) -> Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let storage_class = raw.type_info().name().to_string();
    let value = match storage_class.as_str() {
        "INTEGER" | "BOOLEAN" => Value::from(row.try_get_unchecked::<i64, _>(index)?),
        "REAL" | "NUMERIC" => Value::from(row.try_get_unchecked::<f64, _>(index)?),
        "BLOB" => {
            let bytes = row.try_get_unchecked::<Vec<u8>, _>(index)?;
            Value::String(format!("<{} bytes>", bytes.len()))
        }
        _ => Value::String(row.try_get_unchecked::<String, _>(index)?),
    };
    Ok(value)
}

fn row_to_json(row: &SqliteRow) -> Result<ResultRow, sqlx::Error> {
    let mut object = ResultRow::new();
    for (index, column) in row.columns().iter().enumerate() {
        object.insert(column.name().to_string(), decode_value(row, index)?);
    }
    Ok(object)
}

#[async_trait]
impl DatabaseGateway for SqliteGateway {
    async fn list_tables(&self) -> Result<Vec<String>, GatewayError> {
        sqlx::query_scalar::<_, String>(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
             ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::Connectivity(e.to_string()))
    }

    async fn get_schema(&self, table_name: &str) -> Result<TableSchema, GatewayError> {
        let pragma = format!("PRAGMA table_info({})", quote_identifier(table_name));
        let rows = sqlx::query(&pragma)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                if is_connectivity_error(&e) {
                    GatewayError::Connectivity(e.to_string())
                } else {
                    GatewayError::Introspection(format!("{table_name}: {e}"))
                }
            })?;

        if rows.is_empty() {
            return Err(GatewayError::not_found(table_name));
        }

        let columns = rows
            .iter()
            .map(|row| -> Result<ColumnInfo, sqlx::Error> {
                let not_null: i64 = row.try_get_unchecked("notnull")?;
                let primary_key_position: i64 = row.try_get_unchecked("pk")?;
                Ok(ColumnInfo {
                    name: row.try_get_unchecked("name")?,
                    data_type: row.try_get_unchecked("type")?,
                    nullable: not_null == 0,
                    is_primary_key: primary_key_position > 0,
                    default: row.try_get_unchecked("dflt_value")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| GatewayError::Introspection(format!("{table_name}: {e}")))?;

        Ok(TableSchema {
            table_name: table_name.to_string(),
            columns,
        })
    }

    async fn execute(&self, sql: &str) -> Result<ExecutionOutcome, GatewayError> {
        let started = Instant::now();
        let rows = match sqlx::query(sql).fetch_all(&self.pool).await {
            Ok(rows) => rows,
            Err(e) if is_connectivity_error(&e) => {
                return Err(GatewayError::Connectivity(e.to_string()));
            }
            Err(e) => {
                debug!(error = %e, "Statement failed");
                return Ok(ExecutionOutcome::failed(
                    sql_error_message(&e),
                    error_class(&e),
                ));
            }
        };

        let columns: Vec<String> = match rows.first() {
            Some(row) => row
                .columns()
                .iter()
                .map(|column| column.name().to_string())
                .collect(),
            None => self.describe_columns(sql).await,
        };

        let decoded = match rows.iter().map(row_to_json).collect::<Result<Vec<_>, _>>() {
            Ok(decoded) => decoded,
            Err(e) => {
                return Ok(ExecutionOutcome::failed(e.to_string(), error_class(&e)));
            }
        };

        log_database_operation(
            "execute",
            None,
            "success",
            Some(started.elapsed().as_millis() as u64),
            Some(&format!("{} rows", decoded.len())),
        );

        Ok(ExecutionOutcome::Succeeded(QueryResult::new(columns, decoded)))
    }
}
