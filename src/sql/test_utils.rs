//! Test utilities for generated query validation.
//!
//! Metrics Insights is a SQL subset, so every query the generator emits
//! should also parse as generic SQL with sqlparser-rs.

use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

/// Validates that a generated query is syntactically valid generic SQL.
///
/// # Example
///
/// ```ignore
/// use crate::sql::test_utils::validate_sql;
///
/// validate_sql("SELECT AVG(CPUUtilization) FROM \"AWS/EC2\"").unwrap();
/// ```
pub fn validate_sql(sql: &str) -> Result<(), String> {
    Parser::parse_sql(&GenericDialect {}, sql)
        .map(|_| ())
        .map_err(|e| format!("Invalid SQL: {}\nSQL: {}", e, sql))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_sql() {
        validate_sql("SELECT MAX(CPUUtilization) FROM \"AWS/EC2\" GROUP BY InstanceId").unwrap();
    }

    #[test]
    fn test_validate_invalid_sql() {
        let result = validate_sql("SELEC AVG(x) FORM \"AWS/EC2\"");
        assert!(result.is_err());
    }
}
