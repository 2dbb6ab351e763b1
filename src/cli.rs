//! # Command-Line Front End
//!
//! Subcommands for one-shot questions, an interactive session, a table listing and
//! the HTTP server. Rendering helpers are plain functions so they can be tested
//! without a terminal.

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::bootstrap::AnalystSystem;
use crate::config::{AnalystConfig, ConfigManager};
use crate::database::TableSummary;
use crate::logging::init_structured_logging;
use crate::orchestration::{AnalystStats, AskResponse, WorkflowOrchestrator};

#[derive(Debug, Parser)]
#[command(name = "sql-analyst")]
#[command(about = "Ask questions about a relational database in plain language")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration file (default: config/sql-analyst.yaml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log more (repeat for more detail)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Answer one question and exit
    Ask {
        /// The question, quoted or as separate words
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive session
    Repl,

    /// List tables with row counts
    Tables,

    /// Run the HTTP server
    Serve {
        /// Listen address, overriding web.bind_address
        #[arg(long)]
        bind: Option<String>,
    },
}

/// One line of interactive input, interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Exit,
    Stats,
    Reset,
    Skip,
    Ask(String),
}

pub fn parse_repl_line(line: &str) -> ReplCommand {
    let trimmed = line.trim();
    match trimmed.to_lowercase().as_str() {
        "" => ReplCommand::Skip,
        "exit" | "quit" => ReplCommand::Exit,
        "stats" => ReplCommand::Stats,
        "reset" => ReplCommand::Reset,
        _ => ReplCommand::Ask(trimmed.to_string()),
    }
}

pub fn render_response(response: &AskResponse) -> String {
    let mut out = format!("Answer: {}\n", response.answer);
    if let Some(sql) = &response.sql {
        out.push_str(&format!("SQL: {sql}\n"));
    }
    if let Some(error) = &response.error {
        let category = response
            .error_category
            .map(|c| format!(" [{c}]"))
            .unwrap_or_default();
        out.push_str(&format!("Error{category}: {error}\n"));
    }
    let breakdown: Vec<String> = response
        .tokens_breakdown
        .iter()
        .map(|(stage, tokens)| format!("{stage}={tokens}"))
        .collect();
    out.push_str(&format!(
        "Tokens: {} ({})\n",
        response.tokens_used,
        breakdown.join(", ")
    ));
    out
}

pub fn render_stats(stats: &AnalystStats) -> String {
    let cached = if stats.cached_tables.is_empty() {
        "none".to_string()
    } else {
        stats.cached_tables.join(", ")
    };
    format!(
        "Session tokens: {}\nCompletion calls: {}\nAverage per call: {}\nLast call: {}\n\
         Cached tables: {cached}\nCache age: {} min\n",
        stats.session_total,
        stats.questions_asked,
        stats.average_per_question,
        stats.last_call,
        stats.cache_age_minutes
    )
}

pub fn render_tables(tables: &[TableSummary]) -> String {
    let width = tables.iter().map(|t| t.name.len()).max().unwrap_or(5).max(5);
    let mut out = format!("{:<width$}  rows\n", "table");
    for table in tables {
        out.push_str(&format!("{:<width$}  {}\n", table.name, table.row_count));
    }
    out
}

fn log_level_for(verbose: u8, command: &Command) -> Option<&'static str> {
    match (verbose, command) {
        (0, Command::Serve { .. }) => None,
        (0, _) => Some("warn"),
        (1, _) => Some("info"),
        (2, _) => Some("debug"),
        _ => Some("trace"),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<AnalystConfig> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::load_from_file(path),
        None => ConfigManager::load(),
    }
    .context("failed to load configuration")?;

    let mut config = manager.config().clone();
    if let Some(level) = log_level_for(cli.verbose, &cli.command) {
        if cli.verbose > 0 || config.logging.level.is_none() {
            config.logging.level = Some(level.to_string());
        }
    }
    Ok(config)
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    init_structured_logging(&config.logging);
    config.log_configuration();

    let system = Arc::new(
        AnalystSystem::from_config(config)
            .await
            .context("failed to start analyst")?,
    );

    let outcome = match cli.command {
        Command::Ask { question, json } => {
            let response = system.orchestrator().ask(&question.join(" ")).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print!("{}", render_response(&response));
            }
            Ok(())
        }
        Command::Repl => repl(system.orchestrator()).await,
        Command::Tables => {
            let tables = system.browser().all_tables().await?;
            print!("{}", render_tables(&tables));
            Ok(())
        }
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| system.config().web.bind_address.clone());
            crate::web::serve(system.clone(), &bind)
                .await
                .map_err(anyhow::Error::from)
        }
    };

    system.shutdown().await;
    outcome
}

async fn repl(orchestrator: &WorkflowOrchestrator) -> anyhow::Result<()> {
    println!("Ask a question about the database. Commands: stats, reset, exit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_repl_line(&line) {
            ReplCommand::Exit => break,
            ReplCommand::Skip => continue,
            ReplCommand::Stats => print!("{}", render_stats(&orchestrator.get_stats())),
            ReplCommand::Reset => {
                orchestrator.reset();
                println!("Session reset.");
            }
            ReplCommand::Ask(question) => {
                let response = orchestrator.ask(&question).await;
                print!("{}", render_response(&response));
                println!(
                    "Session total: {} tokens",
                    orchestrator.get_stats().session_total
                );
            }
        }
    }

    Ok(())
}
