//! Concurrent questions sharing one ledger and one schema cache.

mod common;

use serde_json::json;
use sql_analyst::orchestration::WorkflowStage;
use sql_analyst::test_helpers::{InMemoryGateway, ScriptedProvider};
use std::sync::Arc;
use tokio::task::JoinSet;

const QUESTIONS: usize = 8;
const TOKENS_PER_CALL: u64 = 10;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_questions_keep_ledger_consistent() {
    // Every call gets the same reply shape, so the interleaving does not matter
    let mut provider = ScriptedProvider::new();
    for _ in 0..QUESTIONS {
        provider = provider
            .reply("customers", TOKENS_PER_CALL)
            .reply("SELECT 1", TOKENS_PER_CALL)
            .reply("customers", TOKENS_PER_CALL);
    }
    let gateway = InMemoryGateway::retail().succeed_with(vec![json!({"1": 1})]);
    let orchestrator = Arc::new(common::orchestrator(&provider, &gateway));

    let mut tasks = JoinSet::new();
    for i in 0..QUESTIONS {
        let orchestrator = Arc::clone(&orchestrator);
        tasks.spawn(async move { orchestrator.ask(&format!("question {i}")).await });
    }

    let mut per_question_total = 0;
    while let Some(joined) = tasks.join_next().await {
        let response = joined.unwrap();
        assert_eq!(response.tokens_used, response.tokens_breakdown.values().sum::<u64>());
        per_question_total += response.tokens_used;
    }

    let stats = orchestrator.get_stats();
    assert_eq!(stats.questions_asked, (QUESTIONS * 3) as u64);
    assert_eq!(stats.session_total, per_question_total);
    assert_eq!(provider.remaining(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_questions_share_cached_schemas() {
    // Identical replies: whichever stage pops one, analysis still names `orders`
    let mut provider = ScriptedProvider::new();
    for _ in 0..QUESTIONS {
        provider = provider
            .reply("orders", 5)
            .reply("orders", 5)
            .reply("orders", 5);
    }
    let gateway = InMemoryGateway::retail().succeed_with(vec![json!({"1": 1})]);
    let orchestrator = Arc::new(common::orchestrator(&provider, &gateway));

    // Warm the cache so the concurrent batch should never hit the gateway for schemas
    let first = orchestrator.ask("warm up").await;
    assert_eq!(first.stage, WorkflowStage::Done);

    let mut tasks = JoinSet::new();
    for i in 1..QUESTIONS {
        let orchestrator = Arc::clone(&orchestrator);
        tasks.spawn(async move { orchestrator.ask(&format!("question {i}")).await });
    }

    while let Some(joined) = tasks.join_next().await {
        let response = joined.unwrap();
        assert_eq!(response.stage, WorkflowStage::Done);
        assert_eq!(response.cache_hits, 1);
        assert_eq!(response.cache_misses, 0);
    }

    assert_eq!(gateway.schema_calls("orders"), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn reset_during_questions_does_not_poison_state() {
    let mut provider = ScriptedProvider::new();
    for _ in 0..QUESTIONS {
        provider = provider
            .reply("products", 3)
            .reply("products", 3)
            .reply("products", 3);
    }
    let gateway = InMemoryGateway::retail().succeed_with(vec![json!({"1": 1})]);
    let orchestrator = Arc::new(common::orchestrator(&provider, &gateway));

    let mut tasks = JoinSet::new();
    for i in 0..QUESTIONS {
        let orchestrator = Arc::clone(&orchestrator);
        tasks.spawn(async move {
            if i % 3 == 0 {
                orchestrator.reset();
            }
            orchestrator.ask(&format!("question {i}")).await
        });
    }
    while let Some(joined) = tasks.join_next().await {
        assert!(joined.unwrap().stage.is_terminal());
    }

    orchestrator.reset();
    let stats = orchestrator.get_stats();
    assert_eq!(stats.session_total, 0);
    assert!(stats.cached_tables.is_empty());
}
