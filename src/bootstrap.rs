//! # Analyst Bootstrap
//!
//! Wires configuration into a running system: the SQLite gateway, the completion
//! provider behind its token ledger, the schema cache, the orchestrator and the table
//! browser. The CLI and the HTTP server both start from here.

use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::cache::SchemaCache;
use crate::config::AnalystConfig;
use crate::database::{DatabaseGateway, SqliteGateway, TableBrowser};
use crate::error::Result;
use crate::llm::{CompletionProvider, OpenAiCompatibleProvider, TokenTrackingClient};
use crate::orchestration::{WorkflowOrchestrator, WorkflowSettings};

/// Handle to a fully wired analyst
pub struct AnalystSystem {
    orchestrator: Arc<WorkflowOrchestrator>,
    browser: Arc<TableBrowser>,
    config: AnalystConfig,
    sqlite: Option<SqliteGateway>,
}

/// Snapshot for health reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemStatus {
    pub model: String,
    pub dialect: String,
    pub database_url_preview: String,
    pub strict_table_match: bool,
    pub cached_tables: usize,
}

impl AnalystSystem {
    /// Connect to the configured database and provider
    pub async fn from_config(config: AnalystConfig) -> Result<Self> {
        config.validate()?;
        let provider = OpenAiCompatibleProvider::from_config(&config.llm)?;
        let sqlite = SqliteGateway::connect(&config.database).await?;

        let mut system = Self::from_parts(Arc::new(provider), Arc::new(sqlite.clone()), config);
        system.sqlite = Some(sqlite);
        info!(
            model = %system.config.llm.model,
            dialect = %system.config.database.dialect,
            "🚀 Analyst system ready"
        );
        Ok(system)
    }

    /// Build around an existing provider and gateway
    pub fn from_parts(
        provider: Arc<dyn CompletionProvider>,
        gateway: Arc<dyn DatabaseGateway>,
        config: AnalystConfig,
    ) -> Self {
        let llm = Arc::new(TokenTrackingClient::new(provider));
        let cache = Arc::new(SchemaCache::from_config(&config.cache));
        let orchestrator = Arc::new(WorkflowOrchestrator::new(
            llm,
            gateway.clone(),
            cache,
            WorkflowSettings::from_config(&config),
        ));

        Self {
            orchestrator,
            browser: Arc::new(TableBrowser::new(gateway)),
            config,
            sqlite: None,
        }
    }

    pub fn orchestrator(&self) -> &Arc<WorkflowOrchestrator> {
        &self.orchestrator
    }

    pub fn browser(&self) -> &Arc<TableBrowser> {
        &self.browser
    }

    pub fn config(&self) -> &AnalystConfig {
        &self.config
    }

    pub fn status(&self) -> SystemStatus {
        let url = &self.config.database.url;
        let database_url_preview = if url.chars().count() > 30 {
            url.chars().take(30).collect::<String>() + "..."
        } else {
            url.clone()
        };

        SystemStatus {
            model: self.config.llm.model.clone(),
            dialect: self.config.database.dialect.clone(),
            database_url_preview,
            strict_table_match: self.config.workflow.strict_table_match,
            cached_tables: self.orchestrator.cache().stats().entry_count,
        }
    }

    /// Close the connection pool, if this system owns one
    pub async fn shutdown(&self) {
        if let Some(sqlite) = &self.sqlite {
            sqlite.close().await;
        }
        info!("🛑 Analyst system stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{InMemoryGateway, ScriptedProvider};

    #[tokio::test]
    async fn test_from_parts_wires_settings() {
        let mut config = AnalystConfig::for_test();
        config.workflow.strict_table_match = true;
        let system = AnalystSystem::from_parts(
            Arc::new(ScriptedProvider::new()),
            Arc::new(InMemoryGateway::retail()),
            config,
        );

        assert!(system.orchestrator().settings().strict_table_match);
        let status = system.status();
        assert_eq!(status.model, "llama-3.3-70b-versatile");
        assert_eq!(status.database_url_preview, "sqlite::memory:");
        assert_eq!(status.cached_tables, 0);
        system.shutdown().await;
    }

    #[tokio::test]
    async fn test_from_config_requires_api_key() {
        let mut config = AnalystConfig::for_test();
        config.llm.api_key = None;
        let result = AnalystSystem::from_config(config).await;
        assert!(matches!(
            result,
            Err(crate::error::AnalystError::ConfigurationError(_))
        ));
    }

    #[tokio::test]
    async fn test_from_config_connects_in_memory() {
        let system = AnalystSystem::from_config(AnalystConfig::for_test())
            .await
            .unwrap();
        let tables = system.browser().all_tables().await.unwrap();
        assert!(tables.is_empty());
        system.shutdown().await;
    }
}
