//! Property-based checks of the workflow invariants.

mod common;

use common::strategies::{
    execution_sequence_strategy, sql_body_strategy, table_name_strategy, token_count_strategy,
};
use proptest::prelude::*;
use serde_json::json;
use sql_analyst::constants::MAX_SQL_REPAIR_ATTEMPTS;
use sql_analyst::orchestration::sql_text::{parse_table_names, strip_code_fence};
use sql_analyst::orchestration::WorkflowStage;
use sql_analyst::test_helpers::{InMemoryGateway, ScriptedProvider};
use std::collections::HashSet;

/// Walk the scripted outcomes the way the repair loop consumes them
fn expected_outcome(executions: &[bool]) -> (WorkflowStage, u32, usize) {
    let mut attempts = 0;
    let mut index = 0;
    loop {
        let succeeded = executions
            .get(index)
            .or_else(|| executions.last())
            .copied()
            .unwrap_or(true);
        index += 1;
        if succeeded {
            return (WorkflowStage::Done, attempts, index);
        }
        if attempts < MAX_SQL_REPAIR_ATTEMPTS {
            attempts += 1;
        } else {
            return (WorkflowStage::Failed, attempts, index);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn repair_loop_is_bounded_and_tokens_add_up(
        executions in execution_sequence_strategy(),
        tokens in prop::collection::vec(token_count_strategy(), 5),
    ) {
        let mut provider = ScriptedProvider::new().reply("orders", tokens[0]);
        for charge in &tokens[1..] {
            provider = provider.reply("SELECT total FROM orders", *charge);
        }
        let mut gateway = InMemoryGateway::retail();
        for succeeded in &executions {
            gateway = if *succeeded {
                gateway.succeed_with(vec![json!({"total": 1.5})])
            } else {
                gateway.fail_with("database is locked")
            };
        }

        let orchestrator = common::orchestrator(&provider, &gateway);
        let state = tokio_test::block_on(orchestrator.run("sum the orders"));
        let (stage, attempts, executed) = expected_outcome(&executions);

        prop_assert_eq!(state.current_stage, stage);
        prop_assert_eq!(state.sql_attempts, attempts);
        prop_assert!(state.sql_attempts <= MAX_SQL_REPAIR_ATTEMPTS);
        prop_assert_eq!(gateway.executed_sql().len(), executed);
        prop_assert_eq!(state.tokens_used, state.breakdown_total());
        prop_assert_eq!(orchestrator.get_stats().session_total, state.tokens_used);
        for transition in &state.stage_history {
            prop_assert_eq!(transition.tokens_used, transition.breakdown_total);
        }
    }

    #[test]
    fn fenced_sql_is_unwrapped(body in sql_body_strategy()) {
        let fenced = format!("```sql\n{body}\n```");
        prop_assert_eq!(strip_code_fence(&fenced), body.clone());
        prop_assert_eq!(strip_code_fence(&body), body.trim().to_string());
    }

    #[test]
    fn parsed_tables_are_known_and_unique(
        names in prop::collection::vec(table_name_strategy(), 0..8),
    ) {
        let available = vec![
            "customers".to_string(),
            "orders".to_string(),
            "products".to_string(),
        ];
        let reply = names.join(", ");
        let parsed = parse_table_names(&reply, &available);

        prop_assert!(parsed.iter().all(|t| available.contains(t)));
        let unique: HashSet<&String> = parsed.iter().collect();
        prop_assert_eq!(unique.len(), parsed.len());
        for table in &available {
            prop_assert_eq!(parsed.contains(table), names.contains(table));
        }
    }
}
