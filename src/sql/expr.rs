//! Expression model for the Metrics Insights query builder.
//!
//! The builder edits a tree of tagged expressions. On the wire each node is a
//! JSON object discriminated by a `type` field (`property`, `function`,
//! `operator`, `and`, ...); here it is a Rust enum so the generator can match
//! exhaustively.

use serde::{Deserialize, Serialize};

// =============================================================================
// Leaf types
// =============================================================================

/// Primitive type tag of a property reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    #[default]
    String,
}

/// A named property: namespace, dimension or group-by key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Property {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: PropertyType,
}

impl Property {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            kind: PropertyType::String,
        }
    }

    /// The property name, if set and non-empty.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }
}

/// A parameter inside a function call's parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename = "functionParameter")]
pub struct FunctionParameter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl FunctionParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }
}

/// A function call: `AVG(CPUUtilization)`, `SCHEMA("AWS/EC2", InstanceId)`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FunctionExpression {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<FunctionParameter>,
}

impl FunctionExpression {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            parameters: vec![],
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(FunctionParameter::new(name));
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }
}

/// Comparison operators available in a WHERE filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
}

impl ComparisonOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "=",
            ComparisonOperator::Ne => "!=",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::Lte => "<=",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::Gte => ">=",
        }
    }
}

/// Right-hand side of a comparison: one value or an IN list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OperatorValue {
    Single(String),
    Multi(Vec<String>),
}

impl OperatorValue {
    /// Whether there is nothing to compare against.
    pub fn is_empty(&self) -> bool {
        match self {
            OperatorValue::Single(v) => v.is_empty(),
            OperatorValue::Multi(vs) => vs.iter().all(|v| v.is_empty()),
        }
    }
}

impl From<&str> for OperatorValue {
    fn from(value: &str) -> Self {
        OperatorValue::Single(value.to_string())
    }
}

impl From<String> for OperatorValue {
    fn from(value: String) -> Self {
        OperatorValue::Single(value)
    }
}

impl From<Vec<String>> for OperatorValue {
    fn from(values: Vec<String>) -> Self {
        OperatorValue::Multi(values)
    }
}

/// Operator name and value of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Comparison {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<ComparisonOperator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<OperatorValue>,
}

/// A single filter: `property op value`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OperatorExpression {
    #[serde(default)]
    pub property: Property,
    #[serde(default)]
    pub operator: Comparison,
}

impl OperatorExpression {
    pub fn new(
        property: impl Into<String>,
        op: ComparisonOperator,
        value: impl Into<OperatorValue>,
    ) -> Self {
        Self {
            property: Property::new(property),
            operator: Comparison {
                name: Some(op),
                value: Some(value.into()),
            },
        }
    }

    /// Whether the property, operator and value are all present.
    pub fn is_resolved(&self) -> bool {
        self.property.name().is_some()
            && self.operator.name.is_some()
            && self.operator.value.as_ref().is_some_and(|v| !v.is_empty())
    }
}

/// Sort direction of the ORDER BY clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

// =============================================================================
// Expression tree
// =============================================================================

/// A node of the builder's expression tree.
///
/// Every variant must be handled by the generator - the compiler enforces this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Expression {
    /// Property reference.
    Property { property: Property },

    /// Function call.
    Function(FunctionExpression),

    /// Bare function parameter.
    FunctionParameter {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },

    /// Comparison filter.
    Operator(OperatorExpression),

    /// Children joined by AND.
    And {
        #[serde(default)]
        expressions: Vec<Expression>,
    },

    /// Children joined by OR.
    Or {
        #[serde(default)]
        expressions: Vec<Expression>,
    },

    /// GROUP BY key.
    GroupBy { property: Property },
}

impl Expression {
    /// The wire name of this node's `type`.
    pub fn kind(&self) -> &'static str {
        match self {
            Expression::Property { .. } => "property",
            Expression::Function(_) => "function",
            Expression::FunctionParameter { .. } => "functionParameter",
            Expression::Operator(_) => "operator",
            Expression::And { .. } => "and",
            Expression::Or { .. } => "or",
            Expression::GroupBy { .. } => "groupBy",
        }
    }

    /// Child expressions of an `And`/`Or` node, empty for leaves.
    pub fn children(&self) -> &[Expression] {
        match self {
            Expression::And { expressions } | Expression::Or { expressions } => expressions,
            _ => &[],
        }
    }
}

impl From<FunctionExpression> for Expression {
    fn from(function: FunctionExpression) -> Self {
        Expression::Function(function)
    }
}

impl From<OperatorExpression> for Expression {
    fn from(operator: OperatorExpression) -> Self {
        Expression::Operator(operator)
    }
}

// =============================================================================
// FROM clause
// =============================================================================

/// Source of a Metrics Insights query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FromClause {
    /// Bare namespace: `FROM "AWS/EC2"`.
    Namespace(Property),
    /// Explicit schema: `FROM SCHEMA("AWS/EC2", InstanceId)`.
    Schema(FunctionExpression),
}

impl FromClause {
    pub fn namespace(namespace: impl Into<String>) -> Self {
        FromClause::Namespace(Property::new(namespace))
    }

    pub fn schema<S: AsRef<str>>(namespace: impl Into<String>, labels: &[S]) -> Self {
        let function = labels
            .iter()
            .fold(FunctionExpression::new(SCHEMA).with_parameter(namespace), |f, l| {
                f.with_parameter(l.as_ref())
            });
        FromClause::Schema(function)
    }
}

/// Name of the schema function used in `FROM SCHEMA(...)`.
pub const SCHEMA: &str = "SCHEMA";

// =============================================================================
// Root
// =============================================================================

/// A complete Metrics Insights builder query. Every clause is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlExpression {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "tagged_function"
    )]
    pub select: Option<FunctionExpression>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "tagged_from")]
    pub from: Option<FromClause>,

    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<Expression>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<Expression>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "tagged_function"
    )]
    pub order_by: Option<FunctionExpression>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by_direction: Option<SortDir>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl SqlExpression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no clause is set at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Serializes typed function fields through the tagged `Expression` form.
mod tagged_function {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{Expression, FunctionExpression};

    pub fn serialize<S: Serializer>(
        value: &Option<FunctionExpression>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value
            .clone()
            .map(Expression::Function)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<FunctionExpression>, D::Error> {
        match Option::<Expression>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Expression::Function(function)) => Ok(Some(function)),
            Some(other) => Err(D::Error::custom(format!(
                "expected a function expression, found `{}`",
                other.kind()
            ))),
        }
    }
}

/// Serializes `FromClause` as a `property` or `function` expression.
mod tagged_from {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{Expression, FromClause};

    pub fn serialize<S: Serializer>(
        value: &Option<FromClause>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value
            .clone()
            .map(|from| match from {
                FromClause::Namespace(property) => Expression::Property { property },
                FromClause::Schema(function) => Expression::Function(function),
            })
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<FromClause>, D::Error> {
        match Option::<Expression>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Expression::Property { property }) => Ok(Some(FromClause::Namespace(property))),
            Some(Expression::Function(function)) => Ok(Some(FromClause::Schema(function))),
            Some(other) => Err(D::Error::custom(format!(
                "expected a property or function expression in FROM, found `{}`",
                other.kind()
            ))),
        }
    }
}

// =============================================================================
// Constructors
// =============================================================================

/// Function call with parameters: `func("AVG", &["CPUUtilization"])`.
pub fn func(name: &str, parameters: &[&str]) -> FunctionExpression {
    parameters
        .iter()
        .fold(FunctionExpression::new(name), |f, p| f.with_parameter(*p))
}

/// GROUP BY key expression.
pub fn group_by(name: &str) -> Expression {
    Expression::GroupBy {
        property: Property::new(name),
    }
}

/// Comparison filter expression.
pub fn operator(
    property: &str,
    op: ComparisonOperator,
    value: impl Into<OperatorValue>,
) -> Expression {
    Expression::Operator(OperatorExpression::new(property, op, value))
}

/// `=` filter expression.
pub fn eq(property: &str, value: impl Into<OperatorValue>) -> Expression {
    operator(property, ComparisonOperator::Eq, value)
}

/// AND combinator.
pub fn and(expressions: Vec<Expression>) -> Expression {
    Expression::And { expressions }
}

/// OR combinator.
pub fn or(expressions: Vec<Expression>) -> Expression {
    Expression::Or { expressions }
}
