//! # Workflow Orchestrator
//!
//! Drives one question through the stage machine:
//!
//! ```text
//! analyze -> fetch_schema -> generate_sql -> execute -> generate_answer -> done
//!                                              ^   |
//!                                              |   v
//!                                             fix_sql     (at most twice)
//! ```
//!
//! Each stage handler takes the current [`WorkflowState`] by value and returns the next
//! one together with a [`StageEvent`]. The successor stage comes only from
//! [`determine_next_stage`], so the dispatch loop cannot invent an edge.
//!
//! `ask` never fails. Every problem is folded into the returned [`AskResponse`] with an
//! [`ErrorCategory`] so callers can tell configuration faults from bad questions.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::events::StageEvent;
use super::sql_text::{parse_table_names, render_raw_rows, strip_code_fence};
use super::state::WorkflowState;
use super::states::WorkflowStage;
use super::transitions::{determine_next_stage, repair_allowed};
use super::types::{AnalystStats, AskResponse, ErrorCategory, StageTransition};
use crate::cache::SchemaCache;
use crate::config::AnalystConfig;
use crate::constants::{stages, token_budgets};
use crate::database::{DatabaseGateway, ExecutionOutcome};
use crate::llm::{ChatTurn, TokenTrackingClient};
use crate::logging::log_stage_operation;
use crate::prompts;

/// Behavior switches for the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSettings {
    /// Fail with `no_tables` when analysis names no known table
    pub strict_table_match: bool,
    /// Dialect named in the SQL-generation prompt
    pub dialect: String,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            strict_table_match: false,
            dialect: "SQLite".to_string(),
        }
    }
}

impl WorkflowSettings {
    pub fn from_config(config: &AnalystConfig) -> Self {
        Self {
            strict_table_match: config.workflow.strict_table_match,
            dialect: config.database.dialect.clone(),
        }
    }

    pub fn strict() -> Self {
        Self {
            strict_table_match: true,
            ..Self::default()
        }
    }
}

struct StageStep {
    state: WorkflowState,
    event: StageEvent,
}

impl StageStep {
    fn new(state: WorkflowState, event: StageEvent) -> Self {
        Self { state, event }
    }
}

pub struct WorkflowOrchestrator {
    llm: Arc<TokenTrackingClient>,
    gateway: Arc<dyn DatabaseGateway>,
    cache: Arc<SchemaCache>,
    settings: WorkflowSettings,
}

impl WorkflowOrchestrator {
    pub fn new(
        llm: Arc<TokenTrackingClient>,
        gateway: Arc<dyn DatabaseGateway>,
        cache: Arc<SchemaCache>,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            llm,
            gateway,
            cache,
            settings,
        }
    }

    /// Answer one question
    pub async fn ask(&self, question: &str) -> AskResponse {
        self.run(question).await.into()
    }

    /// Run the workflow and return the terminal state, history included
    pub async fn run(&self, question: &str) -> WorkflowState {
        let question_id = Uuid::new_v4();
        let span = info_span!("question", %question_id);
        self.drive(WorkflowState::new(question), question_id)
            .instrument(span)
            .await
    }

    async fn drive(&self, mut state: WorkflowState, question_id: Uuid) -> WorkflowState {
        let started = Instant::now();
        info!(question = %state.question, "Question received");

        while !state.current_stage.is_terminal() {
            let from = state.current_stage;
            let step = self.run_stage(from, state).await;

            let (next_state, to) = match determine_next_stage(from, step.event) {
                Ok(to) => (step.state, to),
                Err(e) => {
                    error!(stage = %from, error = %e, "Stage machine rejected transition");
                    (
                        step.state.with_failure(ErrorCategory::Internal, e.to_string()),
                        WorkflowStage::Failed,
                    )
                }
            };

            let mut stage_history = next_state.stage_history;
            stage_history.push(StageTransition {
                from,
                to,
                event: step.event,
                tokens_used: next_state.tokens_used,
                breakdown_total: next_state.tokens_breakdown.values().sum(),
            });
            state = WorkflowState {
                current_stage: to,
                stage_history,
                ..next_state
            };

            log_stage_operation(
                &question_id.to_string(),
                from.as_str(),
                to.as_str(),
                state.tokens_used,
                Some(step.event.event_type()),
            );
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match state.current_stage {
            WorkflowStage::Done => info!(
                tokens_used = state.tokens_used,
                sql_attempts = state.sql_attempts,
                degraded = state.degraded,
                elapsed_ms,
                "Question answered"
            ),
            _ => warn!(
                tokens_used = state.tokens_used,
                sql_attempts = state.sql_attempts,
                error_category = ?state.error_category,
                error = ?state.execution_error,
                elapsed_ms,
                "Question failed"
            ),
        }

        state
    }

    async fn run_stage(&self, stage: WorkflowStage, state: WorkflowState) -> StageStep {
        match stage {
            WorkflowStage::Analyze => self.analyze(state).await,
            WorkflowStage::FetchSchema => self.fetch_schema(state).await,
            WorkflowStage::GenerateSql => self.generate_sql(state).await,
            WorkflowStage::Execute => self.execute(state).await,
            WorkflowStage::FixSql => self.fix_sql(state).await,
            WorkflowStage::GenerateAnswer => self.generate_answer(state).await,
            WorkflowStage::Done | WorkflowStage::Failed => {
                StageStep::new(state, StageEvent::Inconsistent)
            }
        }
    }

    async fn analyze(&self, state: WorkflowState) -> StageStep {
        let available = match self.gateway.list_tables().await {
            Ok(tables) => tables,
            Err(e) => {
                let category = ErrorCategory::from(&e);
                return StageStep::new(
                    state.with_failure(category, e.to_string()),
                    StageEvent::GatewayFailed,
                );
            }
        };

        let prompt = prompts::analyze_question_prompt(&state.question, &available);
        let reply = match self
            .llm
            .complete(&[ChatTurn::user(prompt)], token_budgets::ANALYZE)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                return StageStep::new(
                    state.with_failure(
                        ErrorCategory::Provider,
                        format!("Failed to analyze question: {e}"),
                    ),
                    StageEvent::ProviderFailed,
                )
            }
        };

        let identified_tables = parse_table_names(&reply.text, &available);
        debug!(tables = ?identified_tables, reply = %reply.text, "Tables identified");

        let no_match = identified_tables.is_empty();
        let state = WorkflowState {
            identified_tables,
            ..state
        }
        .with_tokens(stages::ANALYZE, reply.tokens_used);

        if no_match && self.settings.strict_table_match {
            return StageStep::new(
                state.with_failure(
                    ErrorCategory::NoTables,
                    format!(
                        "No known tables matched the question (model replied: {})",
                        reply.text.trim()
                    ),
                ),
                StageEvent::NoTablesMatched,
            );
        }

        StageStep::new(state, StageEvent::Advanced)
    }

    async fn fetch_schema(&self, state: WorkflowState) -> StageStep {
        let mut table_schemas = state.table_schemas.clone();
        let mut cache_hits = state.cache_hits;
        let mut cache_misses = state.cache_misses;
        let tables = state.identified_tables.clone();

        for table in &tables {
            if let Some(schema) = self.cache.get(table) {
                cache_hits += 1;
                table_schemas.insert(table.clone(), schema);
                continue;
            }

            match self.gateway.get_schema(table).await {
                Ok(schema) => {
                    cache_misses += 1;
                    self.cache.set(table.clone(), schema.clone());
                    table_schemas.insert(table.clone(), schema);
                }
                Err(e) => {
                    let category = ErrorCategory::from(&e);
                    return StageStep::new(
                        state.with_failure(category, e.to_string()),
                        StageEvent::GatewayFailed,
                    );
                }
            }
        }

        debug!(cache_hits, cache_misses, "Schemas resolved");
        let state = WorkflowState {
            table_schemas,
            cache_hits,
            cache_misses,
            ..state
        }
        .with_tokens(stages::FETCH_SCHEMA, 0);

        StageStep::new(state, StageEvent::Advanced)
    }

    async fn generate_sql(&self, state: WorkflowState) -> StageStep {
        let prompt = prompts::generate_sql_prompt(
            &state.question,
            &state.identified_tables,
            &state.table_schemas,
            &self.settings.dialect,
        );

        match self
            .llm
            .complete(&[ChatTurn::user(prompt)], token_budgets::GENERATE_SQL)
            .await
        {
            Ok(reply) => {
                let sql = strip_code_fence(&reply.text);
                debug!(sql = %sql, "SQL generated");
                let state = WorkflowState {
                    generated_sql: Some(sql),
                    ..state
                }
                .with_tokens(stages::GENERATE_SQL, reply.tokens_used);
                StageStep::new(state, StageEvent::Advanced)
            }
            Err(e) => StageStep::new(
                state.with_failure(
                    ErrorCategory::Provider,
                    format!("Failed to generate SQL: {e}"),
                ),
                StageEvent::ProviderFailed,
            ),
        }
    }

    async fn execute(&self, state: WorkflowState) -> StageStep {
        let Some(sql) = state.generated_sql.clone() else {
            return StageStep::new(
                state.with_failure(ErrorCategory::Internal, "No SQL to execute"),
                StageEvent::Inconsistent,
            );
        };

        match self.gateway.execute(&sql).await {
            Ok(ExecutionOutcome::Succeeded(result)) => {
                debug!(row_count = result.row_count, "SQL executed");
                let state = WorkflowState {
                    query_result: Some(result),
                    execution_error: None,
                    error_category: None,
                    ..state
                };
                StageStep::new(state, StageEvent::Advanced)
            }
            Ok(ExecutionOutcome::Failed {
                error_message,
                error_class,
            }) => {
                warn!(
                    sql_attempts = state.sql_attempts,
                    error_class = %error_class,
                    error = %error_message,
                    "SQL execution failed"
                );
                if repair_allowed(state.sql_attempts) {
                    let state = WorkflowState {
                        sql_attempts: state.sql_attempts + 1,
                        ..state
                    }
                    .with_failure(ErrorCategory::Execution, error_message);
                    StageStep::new(state, StageEvent::ExecutionFailed)
                } else {
                    StageStep::new(
                        state.with_failure(ErrorCategory::Execution, error_message),
                        StageEvent::RepairExhausted,
                    )
                }
            }
            Err(e) => {
                let category = ErrorCategory::from(&e);
                StageStep::new(
                    state.with_failure(category, e.to_string()),
                    StageEvent::GatewayFailed,
                )
            }
        }
    }

    async fn fix_sql(&self, state: WorkflowState) -> StageStep {
        let failed_sql = state.generated_sql.clone().unwrap_or_default();
        let error_message = state.execution_error.clone().unwrap_or_default();
        let prompt = prompts::fix_sql_prompt(&failed_sql, &error_message, &state.question);

        match self
            .llm
            .complete(&[ChatTurn::user(prompt)], token_budgets::FIX_SQL)
            .await
        {
            Ok(reply) => {
                let sql = strip_code_fence(&reply.text);
                debug!(sql_attempts = state.sql_attempts, sql = %sql, "SQL repaired");
                let state = WorkflowState {
                    generated_sql: Some(sql),
                    ..state
                }
                .with_tokens(stages::FIX_SQL, reply.tokens_used);
                StageStep::new(state, StageEvent::Advanced)
            }
            Err(e) => StageStep::new(
                state.with_failure(
                    ErrorCategory::Provider,
                    format!("Failed to repair SQL: {e}"),
                ),
                StageEvent::ProviderFailed,
            ),
        }
    }

    async fn generate_answer(&self, state: WorkflowState) -> StageStep {
        let Some(rows) = state.query_result.as_ref().map(|r| r.rows.clone()) else {
            return StageStep::new(
                state.with_failure(ErrorCategory::Internal, "No query result to summarize"),
                StageEvent::Inconsistent,
            );
        };

        let prompt = prompts::generate_answer_prompt(&state.question, &rows);
        match self
            .llm
            .complete(&[ChatTurn::user(prompt)], token_budgets::GENERATE_ANSWER)
            .await
        {
            Ok(reply) => {
                if self.cache.note_question_completed() {
                    info!("Schema cache reset after question limit");
                }
                let state = WorkflowState {
                    final_answer: Some(reply.text.trim().to_string()),
                    ..state
                }
                .with_tokens(stages::GENERATE_ANSWER, reply.tokens_used);
                StageStep::new(state, StageEvent::Advanced)
            }
            Err(e) => {
                warn!(error = %e, "Answer generation failed, returning raw rows");
                let state = WorkflowState {
                    final_answer: Some(render_raw_rows(&rows)),
                    degraded: true,
                    ..state
                };
                StageStep::new(state, StageEvent::AnswerDegraded)
            }
        }
    }

    /// Session token figures merged with cache figures
    pub fn get_stats(&self) -> AnalystStats {
        let tokens = self.llm.get_stats();
        let cache = self.cache.stats();
        AnalystStats {
            session_total: tokens.session_total,
            questions_asked: tokens.questions_asked,
            average_per_question: tokens.average_per_question,
            last_call: tokens.last_call,
            cached_tables: cache.cached_table_names,
            cache_entry_count: cache.entry_count,
            questions_since_cache_reset: cache.questions_since_creation,
            cache_age_seconds: cache.cache_age_seconds,
            cache_age_minutes: cache.cache_age_minutes,
        }
    }

    /// Zero the token ledger and empty the schema cache
    pub fn reset(&self) {
        self.llm.reset_session();
        self.cache.clear();
        info!("Session reset");
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    pub fn cache(&self) -> &Arc<SchemaCache> {
        &self.cache
    }
}
