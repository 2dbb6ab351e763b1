//! # Prompt Builders
//!
//! Pure functions turning workflow context into prompt text. Prompts are kept short:
//! every word here is paid for on every question.

use std::collections::BTreeMap;

use crate::constants::ANSWER_PREVIEW_ROWS;
use crate::database::{ResultRow, TableSchema};

/// Ask which of the available tables the question needs
pub fn analyze_question_prompt(question: &str, available_tables: &[String]) -> String {
    format!(
        "Available tables: {}\n\n\
         Question: {question}\n\n\
         Which tables are needed to answer this? Reply with ONLY the table names, comma-separated.",
        available_tables.join(", ")
    )
}

/// Ask for a single SQL statement, listing only the columns of the chosen tables
pub fn generate_sql_prompt(
    question: &str,
    tables: &[String],
    schemas: &BTreeMap<String, TableSchema>,
    dialect: &str,
) -> String {
    let mut schema_text = String::new();
    for table in tables {
        if let Some(schema) = schemas.get(table) {
            let columns: Vec<String> = schema
                .columns
                .iter()
                .map(|c| format!("{} ({})", c.name, c.data_type))
                .collect();
            schema_text.push_str(&format!("\n{table}: {}", columns.join(", ")));
        }
    }

    format!(
        "Tables and columns:{schema_text}\n\n\
         Question: {question}\n\n\
         Write a {dialect} query that answers this. Return ONLY the SQL, no explanation or formatting."
    )
}

/// Ask for a corrected statement given the engine's error message
pub fn fix_sql_prompt(failed_sql: &str, error_message: &str, question: &str) -> String {
    format!(
        "This SQL query failed:\n{failed_sql}\n\n\
         Error: {error_message}\n\n\
         Question was: {question}\n\n\
         Fix the query. Return ONLY the corrected SQL, no explanation."
    )
}

/// Ask for a short natural-language answer from the first few result rows
pub fn generate_answer_prompt(question: &str, rows: &[ResultRow]) -> String {
    let preview = &rows[..rows.len().min(ANSWER_PREVIEW_ROWS)];
    let rendered = serde_json::to_string(preview).unwrap_or_else(|_| "[]".to_string());

    format!(
        "Question: {question}\n\n\
         Query results: {rendered}\n\n\
         Explain the answer in 1-2 clear sentences."
    )
}
