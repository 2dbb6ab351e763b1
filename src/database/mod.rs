//! # Database Access
//!
//! - [`DatabaseGateway`]: list tables, describe a table, run a statement
//! - [`SqliteGateway`]: the `sqlx`-backed SQLite implementation
//! - [`TableBrowser`]: row counts and paginated views built on any gateway

pub mod browser;
pub mod gateway;
pub mod sqlite;

pub use browser::{Pagination, TableBrowser, TablePage, TableSummary};
pub use gateway::{
    ColumnInfo, DatabaseGateway, ExecutionOutcome, GatewayError, QueryResult, ResultRow,
    TableSchema,
};
pub use sqlite::SqliteGateway;
