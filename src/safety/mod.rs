//! Query safety classification module.
//!
//! Parses SQL with sqlparser and classifies statements as read-only or
//! mutating. The agent's query tool only executes read-only statements.

use sqlparser::ast::Statement;
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;
use std::fmt;

/// Safety level classification for SQL statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SafetyLevel {
    /// Read-only statements that can be executed (SELECT, EXPLAIN, SHOW).
    ReadOnly,
    /// Anything that writes data or changes schema (INSERT, UPDATE, DELETE,
    /// DROP, CREATE, ...). Refused at the tool boundary.
    Mutating,
}

impl fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly => write!(f, "read-only"),
            Self::Mutating => write!(f, "mutating"),
        }
    }
}

/// Result of classifying a SQL string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    /// The determined safety level.
    pub level: SafetyLevel,
    /// The leading keyword of the offending statement, for error messages.
    pub statement: String,
}

impl ClassificationResult {
    /// Returns true if the SQL may be executed by the query tool.
    pub fn is_read_only(&self) -> bool {
        self.level == SafetyLevel::ReadOnly
    }
}

/// Classifies a SQL string.
///
/// SQL that cannot be parsed is treated as mutating (conservative default):
/// the tool refuses it and the agent sees the refusal as an observation.
/// Multiple statements classify as the most dangerous one.
pub fn classify_sql(sql: &str) -> ClassificationResult {
    let statements = match Parser::parse_sql(&SQLiteDialect {}, sql) {
        Ok(statements) if !statements.is_empty() => statements,
        _ => {
            return ClassificationResult {
                level: SafetyLevel::Mutating,
                statement: "unparseable SQL".to_string(),
            }
        }
    };

    for statement in &statements {
        if !is_read_only_statement(statement) {
            return ClassificationResult {
                level: SafetyLevel::Mutating,
                statement: statement_keyword(statement).to_string(),
            };
        }
    }

    ClassificationResult {
        level: SafetyLevel::ReadOnly,
        statement: "SELECT".to_string(),
    }
}

/// Returns true for statements that cannot write data or change schema.
fn is_read_only_statement(statement: &Statement) -> bool {
    match statement {
        Statement::Query(_) => true,
        // Plain EXPLAIN only shows the plan; EXPLAIN ANALYZE executes the query
        Statement::Explain {
            analyze, statement, ..
        } => !*analyze || is_read_only_statement(statement),
        Statement::ShowVariable { .. }
        | Statement::ShowTables { .. }
        | Statement::ShowColumns { .. }
        | Statement::ShowCreate { .. } => true,
        _ => false,
    }
}

/// Returns the leading keyword for an error message.
fn statement_keyword(statement: &Statement) -> &'static str {
    match statement {
        Statement::Insert(_) => "INSERT",
        Statement::Update { .. } => "UPDATE",
        Statement::Delete(_) => "DELETE",
        Statement::Drop { .. } => "DROP",
        Statement::Truncate { .. } => "TRUNCATE",
        Statement::AlterTable { .. } | Statement::AlterIndex { .. } | Statement::AlterView { .. } => {
            "ALTER"
        }
        Statement::CreateTable(_) | Statement::CreateIndex(_) | Statement::CreateView { .. } => {
            "CREATE"
        }
        _ => "statement",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_is_read_only() {
        let result = classify_sql("SELECT * FROM patients ORDER BY sugar DESC LIMIT 1");
        assert!(result.is_read_only());
    }

    #[test]
    fn test_cte_is_read_only() {
        let result = classify_sql("WITH top AS (SELECT * FROM patients) SELECT * FROM top");
        assert!(result.is_read_only());
    }

    #[test]
    fn test_insert_is_mutating() {
        let result = classify_sql("INSERT INTO patients (name) VALUES ('Mallory')");
        assert_eq!(result.level, SafetyLevel::Mutating);
        assert_eq!(result.statement, "INSERT");
    }

    #[test]
    fn test_update_is_mutating() {
        let result = classify_sql("UPDATE patients SET sugar = 0");
        assert_eq!(result.level, SafetyLevel::Mutating);
        assert_eq!(result.statement, "UPDATE");
    }

    #[test]
    fn test_delete_is_mutating() {
        let result = classify_sql("DELETE FROM patients");
        assert_eq!(result.level, SafetyLevel::Mutating);
        assert_eq!(result.statement, "DELETE");
    }

    #[test]
    fn test_drop_is_mutating() {
        let result = classify_sql("DROP TABLE patients");
        assert_eq!(result.level, SafetyLevel::Mutating);
        assert_eq!(result.statement, "DROP");
    }

    #[test]
    fn test_multiple_statements_use_most_dangerous() {
        let result = classify_sql("SELECT 1; DELETE FROM patients");
        assert_eq!(result.level, SafetyLevel::Mutating);
    }

    #[test]
    fn test_unparseable_is_mutating() {
        let result = classify_sql("SELEKT * FORM patients");
        assert_eq!(result.level, SafetyLevel::Mutating);
        assert_eq!(result.statement, "unparseable SQL");
    }

    #[test]
    fn test_explain_is_read_only() {
        let result = classify_sql("EXPLAIN SELECT * FROM patients");
        assert!(result.is_read_only());
    }
}
