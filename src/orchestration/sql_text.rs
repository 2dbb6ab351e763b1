//! Cleanup of model replies before they are used as SQL or table lists.

/// Remove a Markdown code fence wrapped around a reply.
///
/// The first and last lines are dropped when the trimmed text opens with a fence and
/// spans more than two lines. Anything else comes back trimmed.
pub fn strip_code_fence(reply: &str) -> String {
    let trimmed = reply.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let lines: Vec<&str> = trimmed.split('\n').collect();
    if lines.len() > 2 {
        lines[1..lines.len() - 1].join("\n")
    } else {
        trimmed.to_string()
    }
}

/// Table names from a comma-separated reply, keeping only ones that exist.
///
/// Order follows the reply; repeats are dropped.
pub fn parse_table_names(reply: &str, available: &[String]) -> Vec<String> {
    let mut tables: Vec<String> = Vec::new();
    for candidate in reply.split(',').map(str::trim) {
        if candidate.is_empty() || tables.iter().any(|t| t == candidate) {
            continue;
        }
        if available.iter().any(|t| t == candidate) {
            tables.push(candidate.to_string());
        }
    }
    tables
}

/// Stand-in answer built from raw rows when the answer stage fails
pub fn render_raw_rows(rows: &[crate::database::ResultRow]) -> String {
    let rendered = serde_json::to_string(rows).unwrap_or_else(|_| "[]".to_string());
    format!("Query returned {} rows: {rendered}", rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn available() -> Vec<String> {
        vec!["customers".to_string(), "orders".to_string(), "products".to_string()]
    }

    #[test]
    fn test_fenced_sql_is_unwrapped() {
        let reply = "```sql\nSELECT COUNT(*) FROM customers\n```";
        assert_eq!(strip_code_fence(reply), "SELECT COUNT(*) FROM customers");
    }

    #[test]
    fn test_multi_line_fenced_sql_keeps_body() {
        let reply = "  ```\nSELECT *\nFROM orders\n```  ";
        assert_eq!(strip_code_fence(reply), "SELECT *\nFROM orders");
    }

    #[test]
    fn test_short_fence_left_alone() {
        assert_eq!(strip_code_fence("```SELECT 1```"), "```SELECT 1```");
        assert_eq!(strip_code_fence("```\nSELECT 1"), "```\nSELECT 1");
    }

    #[test]
    fn test_plain_sql_trimmed() {
        assert_eq!(strip_code_fence("\n SELECT 1 \n"), "SELECT 1");
    }

    #[test]
    fn test_table_names_filtered_against_catalog() {
        let tables = parse_table_names(" orders , customers, invoices", &available());
        assert_eq!(tables, vec!["orders".to_string(), "customers".to_string()]);
    }

    #[test]
    fn test_table_names_deduplicated() {
        let tables = parse_table_names("orders, orders,orders", &available());
        assert_eq!(tables, vec!["orders".to_string()]);
    }

    #[test]
    fn test_no_matching_tables() {
        assert!(parse_table_names("I am not sure", &available()).is_empty());
        assert!(parse_table_names("", &available()).is_empty());
    }

    #[test]
    fn test_raw_rows_rendering() {
        let mut row = crate::database::ResultRow::new();
        row.insert("count".to_string(), serde_json::json!(3));
        assert_eq!(
            render_raw_rows(&[row]),
            r#"Query returned 1 rows: [{"count":3}]"#
        );
    }
}
