use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::stages;

/// Stages of the question-answering workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    /// Pick the tables the question needs
    #[default]
    Analyze,
    /// Resolve schemas for the chosen tables, cache first
    FetchSchema,
    /// Write the first SQL attempt
    GenerateSql,
    /// Run the current SQL
    Execute,
    /// Rewrite failing SQL using the engine's error message
    FixSql,
    /// Phrase the result rows as an answer
    GenerateAnswer,
    /// Answer produced (possibly degraded)
    Done,
    /// Gave up
    Failed,
}

impl WorkflowStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analyze => stages::ANALYZE,
            Self::FetchSchema => stages::FETCH_SCHEMA,
            Self::GenerateSql => stages::GENERATE_SQL,
            Self::Execute => stages::EXECUTE,
            Self::FixSql => stages::FIX_SQL,
            Self::GenerateAnswer => stages::GENERATE_ANSWER,
            Self::Done => stages::DONE,
            Self::Failed => stages::FAILED,
        }
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WorkflowStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            stages::ANALYZE => Ok(Self::Analyze),
            stages::FETCH_SCHEMA => Ok(Self::FetchSchema),
            stages::GENERATE_SQL => Ok(Self::GenerateSql),
            stages::EXECUTE => Ok(Self::Execute),
            stages::FIX_SQL => Ok(Self::FixSql),
            stages::GENERATE_ANSWER => Ok(Self::GenerateAnswer),
            stages::DONE => Ok(Self::Done),
            stages::FAILED => Ok(Self::Failed),
            _ => Err(format!("Invalid workflow stage: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_stages() {
        assert!(WorkflowStage::Done.is_terminal());
        assert!(WorkflowStage::Failed.is_terminal());
        assert!(!WorkflowStage::Execute.is_terminal());
        assert!(!WorkflowStage::FixSql.is_terminal());
    }

    #[test]
    fn test_stage_string_conversion() {
        assert_eq!(WorkflowStage::GenerateSql.to_string(), "generate_sql");
        assert_eq!(
            "fix_sql".parse::<WorkflowStage>().unwrap(),
            WorkflowStage::FixSql
        );
        assert!("compile".parse::<WorkflowStage>().is_err());
    }

    #[test]
    fn test_stage_serde() {
        let json = serde_json::to_string(&WorkflowStage::FetchSchema).unwrap();
        assert_eq!(json, "\"fetch_schema\"");
        let parsed: WorkflowStage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, WorkflowStage::FetchSchema);
    }
}
