//! Metrics query record as stored on a dashboard panel.

use serde::{Deserialize, Serialize};

use super::dimensions::Dimensions;
use crate::sql::{SqlExpression, SqlGenerator};

/// Classic metric search vs. Metrics Insights.
///
/// Serialized as its numeric discriminant (`0`/`1`), as the plugin stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MetricQueryType {
    #[default]
    Search,
    Insights,
}

impl TryFrom<u8> for MetricQueryType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MetricQueryType::Search),
            1 => Ok(MetricQueryType::Insights),
            other => Err(format!("unknown metric query type: {}", other)),
        }
    }
}

impl From<MetricQueryType> for u8 {
    fn from(value: MetricQueryType) -> Self {
        match value {
            MetricQueryType::Search => 0,
            MetricQueryType::Insights => 1,
        }
    }
}

/// Structured form vs. free-text editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MetricEditorMode {
    #[default]
    Builder,
    Code,
}

impl TryFrom<u8> for MetricEditorMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MetricEditorMode::Builder),
            1 => Ok(MetricEditorMode::Code),
            other => Err(format!("unknown metric editor mode: {}", other)),
        }
    }
}

impl From<MetricEditorMode> for u8 {
    fn from(value: MetricEditorMode) -> Self {
        match value {
            MetricEditorMode::Builder => 0,
            MetricEditorMode::Code => 1,
        }
    }
}

/// Which CloudWatch API family a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QueryMode {
    #[default]
    Metrics,
    Logs,
    Annotations,
}

/// A CloudWatch metrics query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsQuery {
    #[serde(default)]
    pub ref_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_mode: Option<QueryMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_exact: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<SqlExpression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_query_type: Option<MetricQueryType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_editor_mode: Option<MetricEditorMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl MetricsQuery {
    pub fn new(ref_id: impl Into<String>) -> Self {
        Self {
            ref_id: ref_id.into(),
            query_mode: Some(QueryMode::Metrics),
            ..Default::default()
        }
    }

    /// Re-render `sql_expression` from the builder tree.
    ///
    /// Only Insights queries edited in builder mode own their SQL text; in
    /// code mode the text is the user's and is left alone.
    #[must_use]
    pub fn with_generated_sql(mut self, generator: &SqlGenerator) -> Self {
        let builder_owned = self.metric_query_type == Some(MetricQueryType::Insights)
            && self.metric_editor_mode != Some(MetricEditorMode::Code);
        if let (true, Some(sql)) = (builder_owned, &self.sql) {
            let rendered = generator.generate_for_account(sql, self.account_id.as_deref());
            self.sql_expression = Some(rendered);
        }
        self
    }
}

/// Whether an optional text field holds something.
pub(crate) fn is_filled(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.is_empty())
}
