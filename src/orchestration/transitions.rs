//! Transition table for the workflow stage machine.

use super::errors::{StateMachineError, StateMachineResult};
use super::events::StageEvent;
use super::states::WorkflowStage;
use crate::constants::MAX_SQL_REPAIR_ATTEMPTS;

/// Whether another `fix_sql` pass is allowed after `attempts` repairs
pub fn repair_allowed(attempts: u32) -> bool {
    attempts < MAX_SQL_REPAIR_ATTEMPTS
}

/// Next stage for `event` reported by `current`
pub fn determine_next_stage(
    current: WorkflowStage,
    event: StageEvent,
) -> StateMachineResult<WorkflowStage> {
    use StageEvent as E;
    use WorkflowStage as S;

    let next = match (current, event) {
        (S::Analyze, E::Advanced) => S::FetchSchema,
        (S::FetchSchema, E::Advanced) => S::GenerateSql,
        (S::GenerateSql, E::Advanced) => S::Execute,
        (S::Execute, E::Advanced) => S::GenerateAnswer,
        (S::FixSql, E::Advanced) => S::Execute,
        (S::GenerateAnswer, E::Advanced | E::AnswerDegraded) => S::Done,

        // Repair loop
        (S::Execute, E::ExecutionFailed) => S::FixSql,
        (S::Execute, E::RepairExhausted) => S::Failed,

        // Unrecoverable failures
        (S::Analyze | S::GenerateSql | S::FixSql, E::ProviderFailed) => S::Failed,
        (S::Analyze | S::FetchSchema | S::Execute, E::GatewayFailed) => S::Failed,
        (S::Analyze, E::NoTablesMatched) => S::Failed,
        (from, E::Inconsistent) if !from.is_terminal() => S::Failed,

        (from, event) => return Err(StateMachineError::InvalidTransition { from, event }),
    };

    Ok(next)
}
