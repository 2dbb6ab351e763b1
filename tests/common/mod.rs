//! Shared fixtures for integration tests.
#![allow(dead_code)]

pub mod strategies;

use sql_analyst::cache::{Clock, ManualClock, SchemaCache};
use sql_analyst::database::SqliteGateway;
use sql_analyst::llm::TokenTrackingClient;
use sql_analyst::orchestration::{WorkflowOrchestrator, WorkflowSettings};
use sql_analyst::test_helpers::{InMemoryGateway, ScriptedProvider};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;

/// Orchestrator over the given doubles with default cache limits (30 min, 20 questions)
pub fn orchestrator(provider: &ScriptedProvider, gateway: &InMemoryGateway) -> WorkflowOrchestrator {
    orchestrator_with_cache(provider, gateway, Arc::new(SchemaCache::new(30, 20)))
}

pub fn orchestrator_with_cache(
    provider: &ScriptedProvider,
    gateway: &InMemoryGateway,
    cache: Arc<SchemaCache>,
) -> WorkflowOrchestrator {
    WorkflowOrchestrator::new(
        Arc::new(TokenTrackingClient::new(Arc::new(provider.clone()))),
        Arc::new(gateway.clone()),
        cache,
        WorkflowSettings::default(),
    )
}

/// Cache driven by a manual clock, returned together with the clock
pub fn manual_cache(ttl_minutes: u32, max_questions: u32) -> (Arc<SchemaCache>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let cache = Arc::new(SchemaCache::with_clock(
        ttl_minutes,
        max_questions,
        clock.clone() as Arc<dyn Clock>,
    ));
    (cache, clock)
}

/// In-memory SQLite with a small retail catalog.
///
/// One connection only: every pooled connection to `sqlite::memory:` would otherwise
/// see its own empty database.
pub async fn seeded_sqlite() -> SqliteGateway {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");

    for statement in [
        "CREATE TABLE customers (
            customer_id INTEGER PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            city TEXT,
            signup_date TEXT DEFAULT CURRENT_DATE
        )",
        "CREATE TABLE orders (
            order_id INTEGER PRIMARY KEY,
            customer_id INTEGER NOT NULL REFERENCES customers(customer_id),
            total REAL NOT NULL,
            notes BLOB
        )",
        "INSERT INTO customers (customer_id, name, city) VALUES
            (1, 'Ada Lovelace', 'London'),
            (2, 'Grace Hopper', 'New York'),
            (3, 'Katherine Johnson', 'Hampton'),
            (4, 'Margaret O''Neil', 'London')",
        "INSERT INTO orders (order_id, customer_id, total, notes) VALUES
            (10, 1, 25.5, NULL),
            (11, 1, 10.0, x'DEADBEEF'),
            (12, 2, 99.99, NULL)",
    ] {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .expect("seed statement");
    }

    SqliteGateway::new(pool)
}
