#![allow(clippy::doc_markdown)] // Allow technical terms like SQLite, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # SQL Analyst
//!
//! Natural-language question answering over a relational database, spending as few
//! completion tokens as possible.
//!
//! ## Overview
//!
//! A question runs through a fixed stage machine: pick the relevant tables, resolve
//! their schemas (cached across questions), generate SQL, execute it, repair it with the
//! engine's error message at most twice, then phrase the rows as a short answer. Every
//! completion call is charged to a session ledger and to the question's per-stage
//! breakdown.
//!
//! ## Module Organization
//!
//! - [`orchestration`] - Stage machine and the [`WorkflowOrchestrator`]
//! - [`llm`] - Completion provider seam, HTTP provider, token ledger
//! - [`cache`] - Schema cache with TTL and question-count expiry
//! - [`database`] - Gateway seam, SQLite gateway, table browser
//! - [`prompts`] - Prompt builders
//! - [`config`] - Layered configuration
//! - [`bootstrap`] - Wiring from configuration to a running system
//! - [`web`] / [`cli`] - Front ends
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sql_analyst::bootstrap::AnalystSystem;
//! use sql_analyst::config::ConfigManager;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let system = AnalystSystem::from_config(manager.config().clone()).await?;
//!
//! let response = system.orchestrator().ask("How many customers are in Berlin?").await;
//! println!("{} ({} tokens)", response.answer, response.tokens_used);
//!
//! system.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod cache;
pub mod cli;
pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod llm;
pub mod logging;
pub mod orchestration;
pub mod prompts;
pub mod test_helpers;
pub mod web;

pub use bootstrap::AnalystSystem;
pub use cache::SchemaCache;
pub use config::{AnalystConfig, ConfigManager};
pub use database::{DatabaseGateway, SqliteGateway, TableBrowser};
pub use error::{AnalystError, Result};
pub use llm::{CompletionProvider, TokenTrackingClient};
pub use orchestration::{AskResponse, ErrorCategory, WorkflowOrchestrator, WorkflowStage};
