//! Completeness checks for metrics queries.
//!
//! A query is only dispatched once the fields its type and editor mode depend
//! on are filled in. Incomplete queries are skipped, never reported as
//! errors. Field contents are not checked: template variables and unknown
//! statistics pass through to the backend.

use log::debug;

use crate::model::query::{is_filled, MetricEditorMode, MetricQueryType, MetricsQuery};

/// The first field keeping a query from running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Incomplete {
    #[error("region is not set")]
    Region,

    #[error("metric query type is not set")]
    QueryType,

    #[error("editor mode is not set")]
    EditorMode,

    #[error("namespace is not set")]
    Namespace,

    #[error("metric name is not set")]
    MetricName,

    #[error("statistic is not set")]
    Statistic,

    #[error("math expression is empty")]
    Expression,

    #[error("SQL expression is empty")]
    SqlExpression,
}

/// Why `query` cannot run, or `None` if it can.
///
/// | type | mode | needs |
/// |---|---|---|
/// | Search | Builder | namespace, metricName, statistic |
/// | Search | Code | expression |
/// | Search | unset | never runs |
/// | Insights | any or unset | sqlExpression |
///
/// Every combination also needs a region.
pub fn incompleteness(query: &MetricsQuery) -> Option<Incomplete> {
    if !is_filled(&query.region) {
        return Some(Incomplete::Region);
    }

    let Some(query_type) = query.metric_query_type else {
        return Some(Incomplete::QueryType);
    };

    match (query_type, query.metric_editor_mode) {
        (MetricQueryType::Search, None) => Some(Incomplete::EditorMode),
        (MetricQueryType::Search, Some(MetricEditorMode::Builder)) => {
            if !is_filled(&query.namespace) {
                Some(Incomplete::Namespace)
            } else if !is_filled(&query.metric_name) {
                Some(Incomplete::MetricName)
            } else if !is_filled(&query.statistic) {
                Some(Incomplete::Statistic)
            } else {
                None
            }
        }
        (MetricQueryType::Search, Some(MetricEditorMode::Code)) => {
            (!is_filled(&query.expression)).then_some(Incomplete::Expression)
        }
        (MetricQueryType::Insights, _) => {
            (!is_filled(&query.sql_expression)).then_some(Incomplete::SqlExpression)
        }
    }
}

pub fn is_complete(query: &MetricsQuery) -> bool {
    incompleteness(query).is_none()
}

/// Queries that can be dispatched, in input order.
pub fn executable<'a, I>(queries: I) -> Vec<&'a MetricsQuery>
where
    I: IntoIterator<Item = &'a MetricsQuery>,
{
    queries
        .into_iter()
        .filter(|query| match incompleteness(query) {
            Some(reason) => {
                debug!("skipping query {}: {}", query.ref_id, reason);
                false
            }
            None => true,
        })
        .collect()
}
