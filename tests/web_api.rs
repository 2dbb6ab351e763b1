//! HTTP routes driven through the router without binding a socket.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sql_analyst::config::AnalystConfig;
use sql_analyst::test_helpers::ScriptedProvider;
use sql_analyst::web::{create_app, AppState};
use sql_analyst::AnalystSystem;
use std::sync::Arc;
use tower::ServiceExt;

async fn app(provider: ScriptedProvider) -> Router {
    let system = AnalystSystem::from_parts(
        Arc::new(provider),
        Arc::new(common::seeded_sqlite().await),
        AnalystConfig::for_test(),
    );
    create_app(AppState::new(Arc::new(system)))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn health_reports_system_status() {
    let app = app(ScriptedProvider::new()).await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["system"]["model"], AnalystConfig::for_test().llm.model);
    assert_eq!(body["system"]["cached_tables"], 0);
}

#[tokio::test]
async fn ask_answers_against_real_sqlite() {
    let provider = ScriptedProvider::new()
        .reply("customers", 20)
        .reply("```sql\nSELECT COUNT(*) AS n FROM customers\n```", 60)
        .reply("There are 4 customers.", 30);
    let app = app(provider).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/ask",
        Some(json!({"question": "How many customers are there?"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "There are 4 customers.");
    assert_eq!(body["sql"], "SELECT COUNT(*) AS n FROM customers");
    assert_eq!(body["results"]["rows"], json!([{"n": 4}]));
    assert_eq!(body["results"]["row_count"], 1);
    assert_eq!(body["tokens_used"], 110);
    assert_eq!(body["stage"], "done");
    assert_eq!(body["error"], Value::Null);
}

#[tokio::test]
async fn ask_failure_is_reported_in_body() {
    let provider = ScriptedProvider::new()
        .reply("orders", 10)
        .reply("SELECT nope FROM orders", 10)
        .reply("SELECT still_nope FROM orders", 10)
        .reply("SELECT never FROM orders", 10);
    let app = app(provider).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/ask",
        Some(json!({"question": "orders?"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"], "failed");
    assert_eq!(body["error_category"], "execution");
    assert_eq!(body["sql_attempts"], 2);
    assert!(body["error"]
        .as_str()
        .is_some_and(|e| e.contains("no such column")));
}

#[tokio::test]
async fn blank_question_is_bad_request() {
    let app = app(ScriptedProvider::new()).await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/ask",
        Some(json!({"question": "   "})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn stats_and_reset() {
    let provider = ScriptedProvider::new()
        .reply("customers", 20)
        .reply("SELECT 1 AS one", 20)
        .reply("One.", 20);
    let app = app(provider).await;
    send(
        &app,
        Method::POST,
        "/api/ask",
        Some(json!({"question": "one?"})),
    )
    .await;

    let (status, stats) = send(&app, Method::GET, "/api/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["session_total"], 60);
    assert_eq!(stats["questions_asked"], 3);
    assert_eq!(stats["cached_tables"], json!(["customers"]));

    let (status, body) = send(&app, Method::POST, "/api/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Session reset successfully");

    let (_, stats) = send(&app, Method::GET, "/api/stats", None).await;
    assert_eq!(stats["session_total"], 0);
    assert_eq!(stats["cached_tables"], json!([]));
}

#[tokio::test]
async fn database_viewer_routes() {
    let app = app(ScriptedProvider::new()).await;

    let (status, body) = send(&app, Method::GET, "/api/database/tables", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["tables"],
        json!([
            {"name": "customers", "row_count": 4},
            {"name": "orders", "row_count": 3}
        ])
    );

    let (status, body) = send(&app, Method::GET, "/api/database/table/orders", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["table_name"], "orders");
    assert_eq!(body["schema"][0]["name"], "order_id");
    assert_eq!(body["schema"][0]["type"], "INTEGER");

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/database/data/customers?page=2&page_size=2&search=",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["pagination"]["total_pages"], 2);
    assert_eq!(body["pagination"]["has_previous"], true);
}

#[tokio::test]
async fn unknown_table_is_not_found() {
    let app = app(ScriptedProvider::new()).await;

    let (status, body) = send(&app, Method::GET, "/api/database/table/ghosts", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = send(&app, Method::GET, "/api/database/data/ghosts", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_page_is_bad_request() {
    let app = app(ScriptedProvider::new()).await;
    let (status, _) = send(
        &app,
        Method::GET,
        "/api/database/data/customers?page=0",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
