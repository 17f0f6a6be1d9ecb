//! End-to-end compilation from builder JSON to a Metrics Insights query.
//!
//! ```text
//! JSON → SqlExpression → TokenStream → SQL
//! ```
//!
//! # Example
//!
//! ```
//! use cwsql::compile::{compile_sql, CompileOptions};
//!
//! let json = r#"{
//!     "select": {"type": "function", "name": "AVG",
//!                "parameters": [{"type": "functionParameter", "name": "CPUUtilization"}]},
//!     "from": {"type": "property", "property": {"name": "AWS/EC2", "type": "string"}}
//! }"#;
//!
//! let output = compile_sql(json, &CompileOptions::default()).unwrap();
//! assert_eq!(output.sql, r#"SELECT AVG(CPUUtilization) FROM "AWS/EC2""#);
//! ```

use crate::config::Settings;
use crate::sql::{GenerateOptions, SqlExpression, SqlGenerator};
use crate::template::VariableMap;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during compilation.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Raised only in strict mode.
    #[error("Expression is not runnable: it needs a named FROM source and a SELECT with a metric")]
    NotRunnable,
}

pub type CompileResult<T> = Result<T, CompileError>;

// ============================================================================
// Options
// ============================================================================

/// Options for compilation.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Whether cross-account querying is enabled.
    pub cross_account: bool,

    /// Account filter selected for the query.
    pub account_id: Option<String>,

    /// Values used when deciding whether a label needs quoting.
    pub variables: VariableMap,

    /// Reject expressions that are not runnable instead of rendering them.
    pub strict: bool,
}

impl CompileOptions {
    /// Options seeded from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            cross_account: settings.features.cross_account_querying,
            variables: VariableMap::from(settings.variables.clone()),
            ..Default::default()
        }
    }

    pub fn with_cross_account(mut self, enabled: bool) -> Self {
        self.cross_account = enabled;
        self
    }

    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn with_variables(mut self, variables: VariableMap) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// A generator carrying these options.
    pub fn generator(&self) -> SqlGenerator {
        SqlGenerator::new()
            .with_options(GenerateOptions {
                account_id: self.account_id.clone(),
                cross_account: self.cross_account,
            })
            .with_variables(self.variables.clone())
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result of compiling an expression.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// The generated query string.
    pub sql: String,

    /// The parsed expression (for further editing if needed).
    pub expression: SqlExpression,
}

// ============================================================================
// Compilation Functions
// ============================================================================

/// Parse a builder expression from JSON and render it.
pub fn compile_sql(json: &str, options: &CompileOptions) -> CompileResult<CompileOutput> {
    let expression: SqlExpression = serde_json::from_str(json)?;
    compile_expression(expression, options)
}

/// Render an already parsed expression.
pub fn compile_expression(
    expression: SqlExpression,
    options: &CompileOptions,
) -> CompileResult<CompileOutput> {
    if options.strict && !expression.is_runnable() {
        return Err(CompileError::NotRunnable);
    }

    let sql = options.generator().generate(&expression);
    Ok(CompileOutput { sql, expression })
}
