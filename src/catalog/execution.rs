//! Execution payloads handed to an external SQL executor

use serde::Serialize;
use serde_json::Value;

/// A template body with validated parameters, ready for an executor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedExecution {
    /// Final SQL, including the appended limit clause when one was applied
    pub body: String,
    /// One value per placeholder, in placeholder order
    pub bound_parameters: Vec<Value>,
    /// Whether ` LIMIT n` was appended to the body
    pub applied_limit_clause: bool,
}

/// Case-insensitive check for an existing limit clause
pub fn has_limit_clause(sql: &str) -> bool {
    sql.to_uppercase().contains("LIMIT")
}

/// Append ` LIMIT n` unless `limit` is absent/zero or the SQL already limits
pub fn apply_limit(sql: &str, limit: Option<u32>) -> (String, bool) {
    match limit {
        Some(n) if n > 0 && !has_limit_clause(sql) => (format!("{} LIMIT {}", sql, n), true),
        _ => (sql.to_string(), false),
    }
}
