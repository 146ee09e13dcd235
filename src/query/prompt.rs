//! Prompt construction for query generation against a canonical schema.
//!
//! The generation endpoint itself lives with the caller; this module only
//! renders the schema into prompt text and cleans up the completion's reply.

use crate::ingestion::extractor::strip_code_fences;
use crate::schema::Schema;

/// Render a schema as one line per table: `Table: name (col1, col2)`
pub fn format_schema_lines(schema: &Schema) -> String {
    schema
        .tables
        .iter()
        .map(|table| {
            let columns: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
            format!("Table: {} ({})", table.name, columns.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the guarded natural-language-to-SQL prompt for a schema and question.
///
/// The guards matter: the model must use only the listed identifiers, keep
/// their exact case, and answer impossible questions with a query that
/// returns no rows instead of inventing names.
pub fn build_sql_prompt(schema: &Schema, question: &str) -> String {
    format!(
        r#"You are an expert SQL query generator. Given the following database schema and a natural language question, write a syntactically correct SQL query that answers the question.
IMPORTANT:
- Only use the tables and columns listed below. Do NOT guess or invent table or column names.
- Use the exact names and case as shown.
- If the question asks for a column or table not present, return a SQL query that returns no rows (e.g., SELECT * FROM employees WHERE 1=0;).
- If the question is ambiguous, use only the available columns.
The database schema is as follows:
{schema_lines}

Examples:
Q: Who are the employees?
A: SELECT name FROM employees;
Q: What is the salary of each employee?
A: SELECT name, salary FROM employees;
Q: What is the first name of each employee? (Column does not exist)
A: SELECT * FROM employees WHERE 1=0;

Question: {question}

SQL:"#,
        schema_lines = format_schema_lines(schema),
        question = question
    )
}

/// Strip markdown fences (and a `sql` language tag) from a generated query
pub fn clean_generated_sql(text: &str) -> String {
    strip_code_fences(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, Table};

    fn sample_schema() -> Schema {
        Schema::new(vec![Table::with_columns(
            "employees",
            vec![Column::new("name", "TEXT"), Column::new("salary", "REAL")],
        )])
    }

    #[test]
    fn test_schema_lines_rendering() {
        assert_eq!(
            format_schema_lines(&sample_schema()),
            "Table: employees (name, salary)"
        );
    }

    #[test]
    fn test_prompt_embeds_schema_and_question() {
        let prompt = build_sql_prompt(&sample_schema(), "Who earns the most?");
        assert!(prompt.contains("Table: employees (name, salary)"));
        assert!(prompt.contains("Who earns the most?"));
        assert!(prompt.contains("Do NOT guess"));
    }

    #[test]
    fn test_clean_generated_sql_strips_fences() {
        let fenced = "```sql\nSELECT name FROM employees;\n```";
        assert_eq!(clean_generated_sql(fenced), "SELECT name FROM employees;");
        assert_eq!(
            clean_generated_sql("SELECT name FROM employees;"),
            "SELECT name FROM employees;"
        );
    }
}
