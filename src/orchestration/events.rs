use serde::{Deserialize, Serialize};

/// What a stage reported when it finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageEvent {
    /// The stage did its job
    Advanced,
    /// The completion provider failed
    ProviderFailed,
    /// The gateway could not be reached or could not describe a table
    GatewayFailed,
    /// SQL failed and a repair attempt is still available
    ExecutionFailed,
    /// SQL failed and the repair bound is used up
    RepairExhausted,
    /// Answer phrasing failed; raw rows stand in for the answer
    AnswerDegraded,
    /// Strict matching found none of the named tables
    NoTablesMatched,
    /// The state lacked something the stage needs
    Inconsistent,
}

impl StageEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Advanced => "advanced",
            Self::ProviderFailed => "provider_failed",
            Self::GatewayFailed => "gateway_failed",
            Self::ExecutionFailed => "execution_failed",
            Self::RepairExhausted => "repair_exhausted",
            Self::AnswerDegraded => "answer_degraded",
            Self::NoTablesMatched => "no_tables_matched",
            Self::Inconsistent => "inconsistent",
        }
    }
}
