//! Metrics Insights query building and generation.
//!
//! - [`expr`] - Expression model edited by the query builder
//! - [`builder`] - Functional updates and accessors over [`SqlExpression`]
//! - [`generator`] - Expression tree to query string
//! - [`token`] - Token types for query generation
//! - [`quote`] - Label and literal quoting rules

pub mod builder;
pub mod expr;
pub mod generator;
pub mod quote;
pub mod token;

#[cfg(test)]
pub mod test_utils;

pub use expr::{
    and, eq, func, group_by, operator, or, Comparison, ComparisonOperator, Expression,
    FromClause, FunctionExpression, FunctionParameter, OperatorExpression, OperatorValue,
    Property, PropertyType, SortDir, SqlExpression, SCHEMA,
};
pub use generator::{generate, generate_with, GenerateOptions, SqlGenerator, ACCOUNT_ID_LABEL};
pub use token::{Token, TokenStream};
