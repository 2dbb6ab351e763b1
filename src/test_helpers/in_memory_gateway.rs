use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::database::{
    ColumnInfo, DatabaseGateway, ExecutionOutcome, GatewayError, QueryResult, ResultRow,
    TableSchema,
};

#[derive(Debug, Default)]
struct GatewayState {
    tables: Vec<String>,
    schemas: HashMap<String, TableSchema>,
    outcomes: VecDeque<ExecutionOutcome>,
    last_outcome: Option<ExecutionOutcome>,
    executed: Vec<String>,
    schema_calls: HashMap<String, usize>,
    unreachable: bool,
}

/// Gateway over a fixed catalog with scripted execution outcomes.
///
/// Outcomes are consumed in order; once the queue is empty the last one repeats, and
/// with nothing scripted every statement succeeds with no rows.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    state: Arc<Mutex<GatewayState>>,
}

fn column(name: &str, data_type: &str, is_primary_key: bool) -> ColumnInfo {
    ColumnInfo {
        name: name.to_string(),
        data_type: data_type.to_string(),
        nullable: !is_primary_key,
        is_primary_key,
        default: None,
    }
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with `customers`, `orders` and `products`
    pub fn retail() -> Self {
        Self::new()
            .with_table(TableSchema {
                table_name: "customers".to_string(),
                columns: vec![
                    column("customer_id", "INTEGER", true),
                    column("name", "TEXT", false),
                    column("city", "TEXT", false),
                ],
            })
            .with_table(TableSchema {
                table_name: "orders".to_string(),
                columns: vec![
                    column("order_id", "INTEGER", true),
                    column("customer_id", "INTEGER", false),
                    column("total", "REAL", false),
                    column("order_date", "TEXT", false),
                ],
            })
            .with_table(TableSchema {
                table_name: "products".to_string(),
                columns: vec![
                    column("product_id", "INTEGER", true),
                    column("name", "TEXT", false),
                    column("price", "REAL", false),
                ],
            })
    }

    pub fn with_table(self, schema: TableSchema) -> Self {
        {
            let mut state = self.state.lock();
            if !state.tables.contains(&schema.table_name) {
                state.tables.push(schema.table_name.clone());
            }
            state.schemas.insert(schema.table_name.clone(), schema);
        }
        self
    }

    /// Queue a success; columns come from the first row's keys
    pub fn succeed_with(self, rows: Vec<serde_json::Value>) -> Self {
        let rows: Vec<ResultRow> = rows
            .into_iter()
            .filter_map(|row| match row {
                serde_json::Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        let columns = rows
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default();
        self.push_outcome(ExecutionOutcome::Succeeded(QueryResult::new(columns, rows)))
    }

    /// Queue an SQL failure with the engine's message
    pub fn fail_with(self, message: impl Into<String>) -> Self {
        self.push_outcome(ExecutionOutcome::failed(message, "OperationalError"))
    }

    pub fn push_outcome(self, outcome: ExecutionOutcome) -> Self {
        self.state.lock().outcomes.push_back(outcome);
        self
    }

    /// Every call fails with a connectivity error while set
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().unreachable = unreachable;
    }

    pub fn unreachable(self) -> Self {
        self.set_unreachable(true);
        self
    }

    /// Number of `get_schema` calls for `table`
    pub fn schema_calls(&self, table: &str) -> usize {
        self.state
            .lock()
            .schema_calls
            .get(table)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_schema_calls(&self) -> usize {
        self.state.lock().schema_calls.values().sum()
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.state.lock().executed.clone()
    }

    fn check_reachable(state: &GatewayState) -> Result<(), GatewayError> {
        if state.unreachable {
            Err(GatewayError::Connectivity("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DatabaseGateway for InMemoryGateway {
    async fn list_tables(&self) -> Result<Vec<String>, GatewayError> {
        let state = self.state.lock();
        Self::check_reachable(&state)?;
        Ok(state.tables.clone())
    }

    async fn get_schema(&self, table_name: &str) -> Result<TableSchema, GatewayError> {
        let mut state = self.state.lock();
        Self::check_reachable(&state)?;
        *state
            .schema_calls
            .entry(table_name.to_string())
            .or_insert(0) += 1;
        state
            .schemas
            .get(table_name)
            .cloned()
            .ok_or_else(|| GatewayError::not_found(table_name))
    }

    async fn execute(&self, sql: &str) -> Result<ExecutionOutcome, GatewayError> {
        let mut state = self.state.lock();
        Self::check_reachable(&state)?;
        state.executed.push(sql.to_string());

        let outcome = match state.outcomes.pop_front() {
            Some(outcome) => outcome,
            None => state
                .last_outcome
                .clone()
                .unwrap_or_else(|| ExecutionOutcome::Succeeded(QueryResult::default())),
        };
        state.last_outcome = Some(outcome.clone());
        Ok(outcome)
    }
}
