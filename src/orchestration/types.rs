use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::events::StageEvent;
use super::state::WorkflowState;
use super::states::WorkflowStage;
use crate::constants::FALLBACK_ANSWER;
use crate::database::{GatewayError, QueryResult};

/// Why a question did not end in a clean answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The completion provider failed
    Provider,
    /// The SQL kept failing
    Execution,
    /// The database could not be reached or described
    Connectivity,
    /// A named table does not exist
    NotFound,
    /// Strict matching found no usable tables
    NoTables,
    /// The workflow reached an impossible state
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Provider => "provider",
            Self::Execution => "execution",
            Self::Connectivity => "connectivity",
            Self::NotFound => "not_found",
            Self::NoTables => "no_tables",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&GatewayError> for ErrorCategory {
    fn from(error: &GatewayError) -> Self {
        match error {
            GatewayError::NotFound { .. } => Self::NotFound,
            GatewayError::Connectivity(_)
            | GatewayError::Introspection(_)
            | GatewayError::QueryFailed(_) => Self::Connectivity,
        }
    }
}

/// One recorded move of the stage machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTransition {
    pub from: WorkflowStage,
    pub to: WorkflowStage,
    pub event: StageEvent,
    pub tokens_used: u64,
    pub breakdown_total: u64,
}

/// What a caller gets back from one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub sql: Option<String>,
    pub results: Option<QueryResult>,
    pub error: Option<String>,
    pub error_category: Option<ErrorCategory>,
    pub tokens_used: u64,
    pub tokens_breakdown: BTreeMap<String, u64>,
    pub sql_attempts: u32,
    pub stage: WorkflowStage,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub degraded: bool,
}

impl AskResponse {
    pub fn is_success(&self) -> bool {
        self.stage == WorkflowStage::Done
    }
}

impl From<WorkflowState> for AskResponse {
    fn from(state: WorkflowState) -> Self {
        Self {
            answer: state
                .final_answer
                .unwrap_or_else(|| FALLBACK_ANSWER.to_string()),
            sql: state.generated_sql,
            results: state.query_result,
            error: state.execution_error,
            error_category: state.error_category,
            tokens_used: state.tokens_used,
            tokens_breakdown: state.tokens_breakdown,
            sql_attempts: state.sql_attempts,
            stage: state.current_stage,
            cache_hits: state.cache_hits,
            cache_misses: state.cache_misses,
            degraded: state.degraded,
        }
    }
}

/// Session-level usage and cache figures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalystStats {
    pub session_total: u64,
    pub questions_asked: u64,
    pub average_per_question: u64,
    pub last_call: u64,
    pub cached_tables: Vec<String>,
    pub cache_entry_count: usize,
    pub questions_since_cache_reset: u32,
    pub cache_age_seconds: i64,
    pub cache_age_minutes: i64,
}
