//! # cwsql
//!
//! Query core of a CloudWatch metrics datasource: builds, validates and
//! renders Metrics Insights queries.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              Builder JSON (SqlExpression)                │
//! │  (select, from, where, group by, order by, limit)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sql::builder]
//! ┌─────────────────────────────────────────────────────────┐
//! │              Functional updates / accessors              │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sql::generator]
//! ┌─────────────────────────────────────────────────────────┐
//! │                     TokenStream                          │
//! │          + label quoting against template variables      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │              Metrics Insights query string               │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Around the generator sit the query records ([`model`]), the completeness
//! checks that decide what gets dispatched ([`validation`]) and the
//! annotation migration ([`model::annotation`]).

pub mod compile;
pub mod config;
pub mod model;
pub mod sql;
pub mod statistic;
pub mod template;
pub mod validation;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compile::{compile_sql, CompileError, CompileOptions, CompileOutput};
    pub use crate::model::{
        prepare_annotation, prepare_query, AnnotationQuery, AnnotationTarget, DimensionValue,
        Dimensions, FilterCondition, MetricEditorMode, MetricQueryType, MetricsQuery,
    };
    pub use crate::sql::{
        // Constructors
        and,
        eq,
        func,
        group_by,
        operator,
        or,
        // Types
        ComparisonOperator,
        Expression,
        FromClause,
        FunctionExpression,
        GenerateOptions,
        OperatorExpression,
        OperatorValue,
        SortDir,
        SqlExpression,
        SqlGenerator,
    };
    pub use crate::template::{NoVariables, TemplateVariables, VariableMap};
    pub use crate::validation::{executable, is_complete};
}

// Also export at crate root for convenience
pub use sql::{generate, SqlExpression, SqlGenerator};
pub use validation::is_complete;
