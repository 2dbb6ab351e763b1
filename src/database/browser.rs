//! # Table Browser
//!
//! Read-only helpers for exploring the database directly: row counts, samples, and
//! paginated, searchable table views. Built purely on [`DatabaseGateway`], so it works
//! with any backend the workflow can use.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::gateway::{
    DatabaseGateway, ExecutionOutcome, GatewayError, QueryResult, ResultRow, TableSchema,
};
use super::sqlite::quote_identifier;
use crate::error::{AnalystError, Result};

/// Largest page the browser will return
pub const MAX_PAGE_SIZE: u32 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    pub name: String,
    pub row_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total_rows: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl Pagination {
    pub fn new(page: u32, page_size: u32, total_rows: u64) -> Self {
        let total_pages = total_rows.div_ceil(u64::from(page_size));
        Self {
            page,
            page_size,
            total_rows,
            total_pages,
            has_next: u64::from(page) < total_pages,
            has_previous: page > 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePage {
    pub table_name: String,
    pub columns: Vec<String>,
    pub data: Vec<ResultRow>,
    pub pagination: Pagination,
}

#[derive(Clone)]
pub struct TableBrowser {
    gateway: Arc<dyn DatabaseGateway>,
}

impl TableBrowser {
    pub fn new(gateway: Arc<dyn DatabaseGateway>) -> Self {
        Self { gateway }
    }

    async fn ensure_known_table(&self, table_name: &str) -> Result<()> {
        let tables = self.gateway.list_tables().await?;
        if tables.iter().any(|t| t == table_name) {
            Ok(())
        } else {
            Err(GatewayError::not_found(table_name).into())
        }
    }

    async fn run(&self, sql: &str) -> Result<QueryResult> {
        match self.gateway.execute(sql).await? {
            ExecutionOutcome::Succeeded(result) => Ok(result),
            ExecutionOutcome::Failed { error_message, .. } => {
                Err(GatewayError::QueryFailed(error_message).into())
            }
        }
    }

    async fn count(&self, sql: &str) -> Result<u64> {
        let result = self.run(sql).await?;
        Ok(result
            .rows
            .first()
            .and_then(|row| row.get("count"))
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0))
    }

    /// Total rows in a table; 0 if the count query itself fails
    pub async fn table_count(&self, table_name: &str) -> Result<u64> {
        let sql = format!(
            "SELECT COUNT(*) AS count FROM {}",
            quote_identifier(table_name)
        );
        match self.count(&sql).await {
            Ok(count) => Ok(count),
            Err(AnalystError::DatabaseError(GatewayError::QueryFailed(_))) => Ok(0),
            Err(other) => Err(other),
        }
    }

    pub async fn all_tables(&self) -> Result<Vec<TableSummary>> {
        let tables = self.gateway.list_tables().await?;
        let mut summaries = Vec::with_capacity(tables.len());
        for name in tables {
            let row_count = self.table_count(&name).await?;
            summaries.push(TableSummary { name, row_count });
        }
        Ok(summaries)
    }

    pub async fn table_schema(&self, table_name: &str) -> Result<TableSchema> {
        Ok(self.gateway.get_schema(table_name).await?)
    }

    pub async fn sample_rows(&self, table_name: &str, limit: u32) -> Result<Vec<ResultRow>> {
        self.ensure_known_table(table_name).await?;
        let sql = format!(
            "SELECT * FROM {} LIMIT {limit}",
            quote_identifier(table_name)
        );
        Ok(self.run(&sql).await?.rows)
    }

    /// One page of a table, optionally filtered by a substring match over text columns
    pub async fn table_data(
        &self,
        table_name: &str,
        page: u32,
        page_size: u32,
        search: Option<&str>,
    ) -> Result<TablePage> {
        if page == 0 {
            return Err(AnalystError::validation("page must be at least 1"));
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(AnalystError::validation(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        self.ensure_known_table(table_name).await?;

        let quoted = quote_identifier(table_name);
        let filter = match search.map(str::trim).filter(|term| !term.is_empty()) {
            Some(term) => {
                let schema = self.gateway.get_schema(table_name).await?;
                search_clause(&schema.columns, term)
            }
            None => String::new(),
        };

        let offset = u64::from(page - 1) * u64::from(page_size);
        let data = self
            .run(&format!(
                "SELECT * FROM {quoted}{filter} LIMIT {page_size} OFFSET {offset}"
            ))
            .await?;
        let total_rows = self
            .count(&format!("SELECT COUNT(*) AS count FROM {quoted}{filter}"))
            .await?;

        Ok(TablePage {
            table_name: table_name.to_string(),
            columns: data.columns,
            data: data.rows,
            pagination: Pagination::new(page, page_size, total_rows),
        })
    }
}

fn search_clause(columns: &[super::gateway::ColumnInfo], term: &str) -> String {
    let escaped = term.replace('\'', "''");
    let conditions: Vec<String> = columns
        .iter()
        .filter(|column| column.is_textual())
        .map(|column| format!("{} LIKE '%{escaped}%'", quote_identifier(&column.name)))
        .collect();

    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" OR "))
    }
}
