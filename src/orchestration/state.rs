//! Per-question workflow state.
//!
//! Stage handlers never mutate a state in place; each returns a new value built with
//! struct update syntax, so a snapshot taken at any transition stays valid.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::states::WorkflowStage;
use super::types::{ErrorCategory, StageTransition};
use crate::database::{QueryResult, TableSchema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub question: String,
    pub identified_tables: Vec<String>,
    pub table_schemas: BTreeMap<String, TableSchema>,
    pub generated_sql: Option<String>,
    /// Number of `fix_sql` passes entered so far
    pub sql_attempts: u32,
    pub query_result: Option<QueryResult>,
    pub execution_error: Option<String>,
    pub error_category: Option<ErrorCategory>,
    pub final_answer: Option<String>,
    pub tokens_used: u64,
    pub tokens_breakdown: BTreeMap<String, u64>,
    pub current_stage: WorkflowStage,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub degraded: bool,
    pub stage_history: Vec<StageTransition>,
}

impl WorkflowState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            identified_tables: Vec::new(),
            table_schemas: BTreeMap::new(),
            generated_sql: None,
            sql_attempts: 0,
            query_result: None,
            execution_error: None,
            error_category: None,
            final_answer: None,
            tokens_used: 0,
            tokens_breakdown: BTreeMap::new(),
            current_stage: WorkflowStage::Analyze,
            cache_hits: 0,
            cache_misses: 0,
            degraded: false,
            stage_history: Vec::new(),
        }
    }

    /// Charge `tokens` to `stage`, keeping the total and the breakdown in step
    pub fn with_tokens(self, stage: &str, tokens: u64) -> Self {
        let mut tokens_breakdown = self.tokens_breakdown;
        *tokens_breakdown.entry(stage.to_string()).or_insert(0) += tokens;
        Self {
            tokens_used: self.tokens_used + tokens,
            tokens_breakdown,
            ..self
        }
    }

    pub fn with_failure(self, category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            execution_error: Some(message.into()),
            error_category: Some(category),
            ..self
        }
    }

    pub fn breakdown_total(&self) -> u64 {
        self.tokens_breakdown.values().sum()
    }
}
