//! Metrics Insights query generation.
//!
//! Folds a [`SqlExpression`] into a single-line query string:
//!
//! ```text
//! SELECT <fn> FROM <ns | SCHEMA(..)> [WHERE ..] [GROUP BY ..] [ORDER BY <fn> <dir>] [LIMIT n]
//! ```
//!
//! Each clause is emitted only when it renders something, so partially built
//! expressions never fail - they just produce shorter strings.

use log::trace;

use super::expr::{
    ComparisonOperator, Expression, FromClause, FunctionExpression, OperatorExpression,
    OperatorValue, SortDir, SqlExpression,
};
use super::token::{Token, TokenStream};
use crate::template::{NoVariables, TemplateVariables};

/// Group-by key that splits results per source account.
pub const ACCOUNT_ID_LABEL: &str = "AWS.AccountId";

// =============================================================================
// Options
// =============================================================================

/// Inputs to generation that live outside the expression tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Account filter selected for the query, if any.
    pub account_id: Option<String>,
    /// Whether cross-account querying is enabled for this datasource.
    pub cross_account: bool,
}

impl GenerateOptions {
    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn with_cross_account(mut self, enabled: bool) -> Self {
        self.cross_account = enabled;
        self
    }

    /// Whether `AWS.AccountId` must be appended to GROUP BY.
    fn groups_by_account(&self) -> bool {
        self.cross_account && self.account_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

// =============================================================================
// Token emission
// =============================================================================

impl SqlExpression {
    /// Convert this expression to a token stream.
    pub fn to_tokens(&self, options: &GenerateOptions) -> TokenStream {
        let mut ts = TokenStream::new();
        if self.is_empty() {
            return ts;
        }

        let clauses = [
            Some(self.select_tokens()),
            Some(self.from_tokens()),
            self.where_tokens(),
            self.group_by_tokens(options),
            self.order_by_tokens(),
            self.limit_tokens(),
        ];

        for (i, clause) in clauses.into_iter().flatten().enumerate() {
            if i > 0 {
                ts.space();
            }
            ts.append(&clause);
        }

        ts
    }

    /// Render the query string, resolving label quoting against `variables`.
    pub fn to_sql(&self, options: &GenerateOptions, variables: &dyn TemplateVariables) -> String {
        self.to_tokens(options).serialize(variables)
    }

    /// Whether the expression has a named source and a select with a metric.
    pub fn is_runnable(&self) -> bool {
        self.namespace().is_some()
            && self.select.as_ref().is_some_and(|select| {
                select.name().is_some() && select.parameters.iter().any(|p| p.name().is_some())
            })
    }

    fn select_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Select);
        if let Some(function) = self.select.as_ref().and_then(function_tokens) {
            ts.space().append(&function);
        }
        ts
    }

    fn from_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::From);
        let source = match &self.from {
            Some(FromClause::Namespace(property)) => property.name().map(|name| {
                let mut ns = TokenStream::new();
                ns.push(Token::Label(name.to_string()));
                ns
            }),
            Some(FromClause::Schema(function)) => function_tokens(function),
            None => None,
        };
        if let Some(source) = source {
            ts.space().append(&source);
        }
        ts
    }

    fn where_tokens(&self) -> Option<TokenStream> {
        let filter = self.where_clause.as_ref()?;
        let top_level_count = filter.children().len();
        let body = filter_tokens(filter, true, top_level_count)?;

        let mut ts = TokenStream::new();
        ts.push(Token::Where).space().append(&body);
        Some(ts)
    }

    fn group_by_tokens(&self, options: &GenerateOptions) -> Option<TokenStream> {
        let mut labels: Vec<Token> = group_by_names(self.group_by.as_ref())
            .into_iter()
            .map(|name| Token::Label(name.to_string()))
            .collect();

        if options.groups_by_account()
            && !labels
                .iter()
                .any(|t| matches!(t, Token::Label(l) if l == ACCOUNT_ID_LABEL))
        {
            labels.push(Token::Raw(ACCOUNT_ID_LABEL.to_string()));
        }

        if labels.is_empty() {
            return None;
        }

        let mut ts = TokenStream::new();
        ts.push(Token::GroupBy).space();
        for (i, label) in labels.into_iter().enumerate() {
            if i > 0 {
                ts.comma().space();
            }
            ts.push(label);
        }
        Some(ts)
    }

    fn order_by_tokens(&self) -> Option<TokenStream> {
        let function = function_tokens(self.order_by.as_ref()?)?;
        let direction = match self.order_by_direction.unwrap_or_default() {
            SortDir::Asc => Token::Asc,
            SortDir::Desc => Token::Desc,
        };

        let mut ts = TokenStream::new();
        ts.push(Token::OrderBy)
            .space()
            .append(&function)
            .space()
            .push(direction);
        Some(ts)
    }

    fn limit_tokens(&self) -> Option<TokenStream> {
        let limit = u64::try_from(self.limit?).ok().filter(|n| *n > 0)?;
        let mut ts = TokenStream::new();
        ts.push(Token::Limit).space().push(Token::LitInt(limit));
        Some(ts)
    }
}

/// `NAME(p1, p2)`; `None` when the function has no name.
fn function_tokens(function: &FunctionExpression) -> Option<TokenStream> {
    let name = function.name()?;
    let mut ts = TokenStream::new();
    ts.push(Token::FunctionName(name.to_string())).lparen();
    let params = function.parameters.iter().filter_map(|p| p.name());
    for (i, param) in params.enumerate() {
        if i > 0 {
            ts.comma().space();
        }
        ts.push(Token::Label(param.to_string()));
    }
    ts.rparen();
    Some(ts)
}

/// Render one node of a WHERE tree.
///
/// Nested groups are parenthesized when they sit below a top level holding
/// more than one child and they render more than one part themselves.
fn filter_tokens(
    filter: &Expression,
    is_top_level: bool,
    top_level_count: usize,
) -> Option<TokenStream> {
    let joiner = match filter {
        Expression::And { .. } => Token::And,
        Expression::Or { .. } => Token::Or,
        Expression::Operator(op) => return operator_tokens(op),
        Expression::Property { .. }
        | Expression::Function(_)
        | Expression::FunctionParameter { .. }
        | Expression::GroupBy { .. } => return None,
    };

    let parts: Vec<TokenStream> = filter
        .children()
        .iter()
        .filter_map(|child| filter_tokens(child, false, top_level_count))
        .collect();
    if parts.is_empty() {
        return None;
    }

    let wrap = !is_top_level && top_level_count > 1 && parts.len() > 1;
    let mut ts = TokenStream::new();
    if wrap {
        ts.lparen();
    }
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            ts.space().push(joiner.clone()).space();
        }
        ts.append(part);
    }
    if wrap {
        ts.rparen();
    }
    Some(ts)
}

/// `label op 'value'` or `label [NOT] IN ('a','b')`.
fn operator_tokens(op: &OperatorExpression) -> Option<TokenStream> {
    if !op.is_resolved() {
        return None;
    }
    let name = op.property.name()?;
    let comparison = op.operator.name?;

    let mut ts = TokenStream::new();
    ts.push(Token::Label(name.to_string())).space();

    match op.operator.value.as_ref()? {
        OperatorValue::Single(value) => {
            ts.push(comparison_token(comparison))
                .space()
                .push(Token::LitString(value.clone()));
        }
        OperatorValue::Multi(values) => {
            // A list only has a meaning for `=` and `!=`.
            let negated = match comparison {
                ComparisonOperator::Eq => false,
                ComparisonOperator::Ne => true,
                ComparisonOperator::Lt
                | ComparisonOperator::Lte
                | ComparisonOperator::Gt
                | ComparisonOperator::Gte => return None,
            };
            if negated {
                ts.push(Token::Not).space();
            }
            ts.push(Token::In).space().lparen();
            let values = values.iter().filter(|v| !v.is_empty());
            for (i, value) in values.enumerate() {
                if i > 0 {
                    ts.comma();
                }
                ts.push(Token::LitString(value.clone()));
            }
            ts.rparen();
        }
    }

    Some(ts)
}

fn comparison_token(op: ComparisonOperator) -> Token {
    match op {
        ComparisonOperator::Eq => Token::Eq,
        ComparisonOperator::Ne => Token::Ne,
        ComparisonOperator::Lt => Token::Lt,
        ComparisonOperator::Lte => Token::Lte,
        ComparisonOperator::Gt => Token::Gt,
        ComparisonOperator::Gte => Token::Gte,
    }
}

/// Named group-by keys of a GROUP BY expression, in order.
pub(crate) fn group_by_names(group_by: Option<&Expression>) -> Vec<&str> {
    let Some(group_by) = group_by else {
        return vec![];
    };
    let nodes = match group_by {
        Expression::GroupBy { .. } => std::slice::from_ref(group_by),
        other => other.children(),
    };
    nodes
        .iter()
        .filter_map(|node| match node {
            Expression::GroupBy { property } => property.name(),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Generator
// =============================================================================

/// Renders expressions with fixed options and variable source.
#[derive(Debug)]
pub struct SqlGenerator {
    options: GenerateOptions,
    variables: Box<dyn TemplateVariables>,
}

impl Default for SqlGenerator {
    fn default() -> Self {
        Self {
            options: GenerateOptions::default(),
            variables: Box::new(NoVariables),
        }
    }
}

impl SqlGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_variables(mut self, variables: impl TemplateVariables + 'static) -> Self {
        self.variables = Box::new(variables);
        self
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Render `expr`. Absent clauses are omitted; never fails.
    pub fn generate(&self, expr: &SqlExpression) -> String {
        let sql = expr.to_sql(&self.options, self.variables.as_ref());
        trace!("generated Metrics Insights query: {}", sql);
        sql
    }

    /// Render `expr` with a per-query account filter in place of the configured one.
    pub fn generate_for_account(&self, expr: &SqlExpression, account_id: Option<&str>) -> String {
        let options = GenerateOptions {
            account_id: account_id.map(String::from),
            ..self.options.clone()
        };
        let sql = expr.to_sql(&options, self.variables.as_ref());
        trace!("generated Metrics Insights query: {}", sql);
        sql
    }

    /// Render `expr` only if it is runnable (has FROM and a SELECT metric).
    pub fn try_generate(&self, expr: &SqlExpression) -> Option<String> {
        expr.is_runnable().then(|| self.generate(expr))
    }
}

/// Render `expr` with default options and no variable interpolation.
pub fn generate(expr: &SqlExpression) -> String {
    SqlGenerator::new().generate(expr)
}

/// Render `expr` with the given options and no variable interpolation.
pub fn generate_with(expr: &SqlExpression, options: &GenerateOptions) -> String {
    expr.to_sql(options, &NoVariables)
}

impl std::fmt::Display for SqlExpression {
    /// Formats the query with default options.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", generate(self))
    }
}
