//! # Configuration
//!
//! Layered settings for the analyst. Sources, lowest precedence first:
//!
//! 1. Built-in defaults (the `Default` impls below) and the legacy `GROQ_API_KEY` /
//!    `DATABASE_URL` variables
//! 2. `config/sql-analyst.yaml`, then `config/sql-analyst.{environment}.yaml`
//! 3. `SQL_ANALYST_*` environment variables, with `__` between section and key
//!    (`SQL_ANALYST_CACHE__TTL_MINUTES=10`)
//!
//! See [`ConfigManager`] for the loading entry points.

pub mod error;
pub mod loader;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{info, warn};

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalystConfig {
    pub llm: LlmConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub workflow: WorkflowConfig,
    pub web: WebConfig,
    pub logging: LoggingConfig,
}

/// Completion provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub request_timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.1,
            request_timeout_seconds: 30,
        }
    }
}

impl LlmConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    /// SQL dialect named in generation prompts
    pub dialect: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://retail_analytics.db".to_string(),
            max_connections: 5,
            acquire_timeout_seconds: 10,
            dialect: "SQLite".to_string(),
        }
    }
}

/// Schema cache expiry settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_minutes: u32,
    pub max_questions: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: 30,
            max_questions: 20,
        }
    }
}

impl CacheConfig {
    /// Short-lived cache for tests
    pub fn for_test() -> Self {
        Self {
            ttl_minutes: 1,
            max_questions: 3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Fail a question when analysis names no known table
    pub strict_table_match: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub bind_address: String,
    pub enable_cors: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            enable_cors: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for JSON log files; console only when unset
    pub directory: Option<String>,
    /// Filter directive used when `RUST_LOG` is unset
    pub level: Option<String>,
}

impl AnalystConfig {
    /// Configuration for tests: in-memory SQLite, single connection, short cache
    pub fn for_test() -> Self {
        Self {
            llm: LlmConfig {
                api_key: Some("test-key".to_string()),
                ..LlmConfig::default()
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
                ..DatabaseConfig::default()
            },
            cache: CacheConfig::for_test(),
            ..Self::default()
        }
    }

    /// Check values that would otherwise fail later in confusing ways
    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigurationError::invalid_value(
                "llm.temperature",
                self.llm.temperature.to_string(),
                "must be between 0.0 and 2.0",
            ));
        }

        if !self.llm.base_url.starts_with("http://") && !self.llm.base_url.starts_with("https://")
        {
            return Err(ConfigurationError::invalid_value(
                "llm.base_url",
                self.llm.base_url.clone(),
                "must be an http(s) URL",
            ));
        }

        if self.llm.request_timeout_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "llm.request_timeout_seconds",
                "0",
                "must be greater than 0",
            ));
        }

        if self.database.url.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "database.url",
                "database",
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigurationError::invalid_value(
                "database.max_connections",
                "0",
                "must be greater than 0",
            ));
        }

        if self.cache.ttl_minutes == 0 {
            return Err(ConfigurationError::invalid_value(
                "cache.ttl_minutes",
                "0",
                "must be greater than 0",
            ));
        }

        if self.cache.max_questions == 0 {
            return Err(ConfigurationError::invalid_value(
                "cache.max_questions",
                "0",
                "must be greater than 0",
            ));
        }

        if self.web.bind_address.parse::<SocketAddr>().is_err() {
            return Err(ConfigurationError::invalid_value(
                "web.bind_address",
                self.web.bind_address.clone(),
                "must be a socket address such as 0.0.0.0:8000",
            ));
        }

        if self.llm.api_key.is_none() {
            warn!("No completion API key configured; questions will fail until one is set");
        }

        Ok(())
    }

    pub fn log_configuration(&self) {
        info!(
            model = %self.llm.model,
            base_url = %self.llm.base_url,
            api_key_configured = self.llm.api_key.is_some(),
            database_dialect = %self.database.dialect,
            max_connections = self.database.max_connections,
            cache_ttl_minutes = self.cache.ttl_minutes,
            cache_max_questions = self.cache.max_questions,
            strict_table_match = self.workflow.strict_table_match,
            "Analyst configuration"
        );
    }
}
