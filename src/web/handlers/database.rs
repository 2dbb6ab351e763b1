//! # Database Viewer Handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::database::{ColumnInfo, TablePage, TableSummary};
use crate::web::errors::ApiResult;
use crate::web::state::AppState;

const DEFAULT_PAGE_SIZE: u32 = 50;

#[derive(Debug, Serialize, Deserialize)]
pub struct TablesResponse {
    pub tables: Vec<TableSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TableSchemaResponse {
    pub table_name: String,
    pub schema: Vec<ColumnInfo>,
}

#[derive(Debug, Deserialize)]
pub struct TableDataParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
}

/// GET /api/database/tables
pub async fn list_tables(State(state): State<AppState>) -> ApiResult<Json<TablesResponse>> {
    let tables = state.browser().all_tables().await?;
    Ok(Json(TablesResponse { tables }))
}

/// GET /api/database/table/:table_name
pub async fn table_schema(
    State(state): State<AppState>,
    Path(table_name): Path<String>,
) -> ApiResult<Json<TableSchemaResponse>> {
    let schema = state.browser().table_schema(&table_name).await?;
    Ok(Json(TableSchemaResponse {
        table_name,
        schema: schema.columns,
    }))
}

/// GET /api/database/data/:table_name?page&page_size&search
pub async fn table_data(
    State(state): State<AppState>,
    Path(table_name): Path<String>,
    Query(params): Query<TableDataParams>,
) -> ApiResult<Json<TablePage>> {
    let page = state
        .browser()
        .table_data(
            &table_name,
            params.page.unwrap_or(1),
            params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            params.search.as_deref(),
        )
        .await?;
    Ok(Json(page))
}
