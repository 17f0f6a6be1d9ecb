//! Functional updates over [`SqlExpression`].
//!
//! Editors never mutate a query in place: each selection produces a new
//! expression, which is then rendered again for the preview. The setters here
//! take `self` by value and return the updated expression.

use super::expr::{
    group_by, Expression, FromClause, FunctionExpression, FunctionParameter, OperatorExpression,
    Property, SortDir, SqlExpression, SCHEMA,
};
use super::generator::group_by_names;

// =============================================================================
// Accessors
// =============================================================================

impl SqlExpression {
    /// Namespace from either FROM form.
    pub fn namespace(&self) -> Option<&str> {
        match self.from.as_ref()? {
            FromClause::Namespace(property) => property.name(),
            FromClause::Schema(function) => function.parameters.first()?.name(),
        }
    }

    /// Whether FROM is a `SCHEMA(...)` call.
    pub fn is_using_schema(&self) -> bool {
        matches!(&self.from, Some(FromClause::Schema(f)) if f.name() == Some(SCHEMA))
    }

    /// Dimension labels of a `SCHEMA(ns, labels...)` source; empty otherwise.
    pub fn schema_labels(&self) -> Vec<&str> {
        match &self.from {
            Some(FromClause::Schema(function)) => function
                .parameters
                .iter()
                .skip(1)
                .filter_map(FunctionParameter::name)
                .collect(),
            _ => vec![],
        }
    }

    /// Metric name: the first SELECT parameter.
    pub fn metric_name(&self) -> Option<&str> {
        self.select.as_ref()?.parameters.first()?.name()
    }

    /// Aggregation: the SELECT function name.
    pub fn aggregation(&self) -> Option<&str> {
        self.select.as_ref()?.name()
    }

    /// Every operator in the WHERE tree, depth first.
    pub fn flattened_filters(&self) -> Vec<&OperatorExpression> {
        let mut out = vec![];
        if let Some(filter) = &self.where_clause {
            collect_operators(filter, &mut out);
        }
        out
    }

    /// Named GROUP BY keys, in order.
    pub fn flattened_group_bys(&self) -> Vec<&str> {
        group_by_names(self.group_by.as_ref())
    }
}

fn collect_operators<'a>(expr: &'a Expression, out: &mut Vec<&'a OperatorExpression>) {
    match expr {
        Expression::Operator(op) => out.push(op),
        Expression::And { expressions } | Expression::Or { expressions } => {
            for child in expressions {
                collect_operators(child, out);
            }
        }
        _ => {}
    }
}

// =============================================================================
// Updates
// =============================================================================

impl SqlExpression {
    /// Set the namespace, keeping the current FROM form.
    ///
    /// In schema mode the labels are dropped since they belonged to the
    /// previous namespace. `None` clears FROM.
    #[must_use]
    pub fn with_namespace(mut self, namespace: Option<&str>) -> Self {
        let schema = self.is_using_schema();
        self.from = namespace.map(|ns| {
            if schema {
                FromClause::schema::<&str>(ns, &[])
            } else {
                FromClause::namespace(ns)
            }
        });
        self
    }

    /// Switch between `FROM ns` and `FROM SCHEMA(ns)`, keeping the namespace.
    #[must_use]
    pub fn with_schema(mut self, enabled: bool) -> Self {
        if enabled == self.is_using_schema() {
            return self;
        }
        let namespace = self.namespace().map(String::from);
        self.from = Some(if enabled {
            FromClause::Schema(FunctionExpression {
                name: Some(SCHEMA.to_string()),
                parameters: vec![FunctionParameter { name: namespace }],
            })
        } else {
            FromClause::Namespace(Property {
                name: namespace,
                ..Default::default()
            })
        });
        self
    }

    /// Set `SCHEMA(ns, labels...)`; switches to schema mode.
    #[must_use]
    pub fn with_schema_labels<S: AsRef<str>>(mut self, labels: &[S]) -> Self {
        let namespace = self.namespace().unwrap_or_default().to_string();
        self.from = Some(FromClause::schema(namespace, labels));
        self
    }

    /// Set the metric measured by SELECT, keeping the aggregation.
    #[must_use]
    pub fn with_metric_name(mut self, metric_name: &str) -> Self {
        let mut select = self.select.take().unwrap_or_default();
        select.parameters = vec![FunctionParameter::new(metric_name)];
        self.select = Some(select);
        self
    }

    /// Set the SELECT aggregation, keeping its parameters.
    #[must_use]
    pub fn with_aggregation(mut self, aggregation: &str) -> Self {
        let mut select = self.select.take().unwrap_or_default();
        select.name = Some(aggregation.to_string());
        self.select = Some(select);
        self
    }

    /// Set ORDER BY to `aggregation()`, or clear it.
    #[must_use]
    pub fn with_order_by(mut self, aggregation: Option<&str>) -> Self {
        self.order_by = aggregation.map(|name| FunctionExpression::new(name));
        self
    }

    #[must_use]
    pub fn with_order_by_direction(mut self, direction: Option<SortDir>) -> Self {
        self.order_by_direction = direction;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: Option<i64>) -> Self {
        self.limit = limit;
        self
    }

    /// Replace WHERE with the given filters joined by AND.
    #[must_use]
    pub fn with_filters(mut self, filters: Vec<OperatorExpression>) -> Self {
        self.where_clause = if filters.is_empty() {
            None
        } else {
            Some(Expression::And {
                expressions: filters.into_iter().map(Expression::Operator).collect(),
            })
        };
        self
    }

    /// Replace GROUP BY with the given keys.
    #[must_use]
    pub fn with_group_by<S: AsRef<str>>(mut self, keys: &[S]) -> Self {
        self.group_by = if keys.is_empty() {
            None
        } else {
            Some(Expression::And {
                expressions: keys.iter().map(|k| group_by(k.as_ref())).collect(),
            })
        };
        self
    }
}
