//! # SQL Analyst
//!
//! Command-line entry point. Reads `.env` when present, then hands off to
//! [`sql_analyst::cli::run`].

use clap::Parser;
use sql_analyst::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal
    let _ = dotenvy::dotenv();
    cli::run(Cli::parse()).await
}
