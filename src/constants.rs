//! # Workflow Constants
//!
//! Fixed policy values for the question-answering workflow. These are deliberately
//! not configurable: the repair bound and the per-stage token budgets are part of the
//! workflow's contract with its callers.

/// Maximum number of `fix_sql` repair attempts per question.
pub const MAX_SQL_REPAIR_ATTEMPTS: u32 = 2;

/// Answer text used when the workflow ends without producing one.
pub const FALLBACK_ANSWER: &str = "Sorry, I couldn't answer that.";

/// Maximum number of result rows shown to the model when phrasing an answer.
pub const ANSWER_PREVIEW_ROWS: usize = 10;

/// Reply-length caps handed to the completion provider, per stage.
pub mod token_budgets {
    pub const ANALYZE: u32 = 50;
    pub const GENERATE_SQL: u32 = 200;
    pub const FIX_SQL: u32 = 200;
    pub const GENERATE_ANSWER: u32 = 150;
}

/// Stage names as they appear in token breakdowns and logs
pub mod stages {
    pub const ANALYZE: &str = "analyze";
    pub const FETCH_SCHEMA: &str = "fetch_schema";
    pub const GENERATE_SQL: &str = "generate_sql";
    pub const EXECUTE: &str = "execute";
    pub const FIX_SQL: &str = "fix_sql";
    pub const GENERATE_ANSWER: &str = "generate_answer";
    pub const DONE: &str = "done";
    pub const FAILED: &str = "failed";
}

/// Environment variables consulted outside the layered configuration
pub mod env_vars {
    pub const ENVIRONMENT: &str = "SQL_ANALYST_ENV";
    pub const APP_ENV: &str = "APP_ENV";
    pub const CONFIG_PREFIX: &str = "SQL_ANALYST";
    pub const LEGACY_API_KEY: &str = "GROQ_API_KEY";
    pub const DATABASE_URL: &str = "DATABASE_URL";
}
