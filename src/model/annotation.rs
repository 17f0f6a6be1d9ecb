//! Annotation queries.
//!
//! Older dashboards store the CloudWatch fields of an annotation flat on the
//! annotation itself. Newer ones nest them under `target`. [`prepare_annotation`]
//! moves the flat form into the nested one, and [`prepare_query`] decides
//! whether a target can be sent to the alarm history API.

use log::debug;
use serde::{Deserialize, Serialize};

use super::dimensions::Dimensions;
use super::query::{is_filled, QueryMode};

pub const DEFAULT_STATISTIC: &str = "Average";
pub const DEFAULT_REGION: &str = "default";
pub const ANNOTATION_REF_ID: &str = "annotationQuery";

/// CloudWatch fields of an annotation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_mode: Option<QueryMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_exact: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_matching: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm_name_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

/// Flat CloudWatch fields of a legacy annotation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyAnnotationFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistic: Option<String>,
    /// Pre-statistic dashboards stored a list; only the first entry is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_exact: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_matching: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm_name_prefix: Option<String>,
}

impl LegacyAnnotationFields {
    /// Merge onto `target`, flat fields winning, then fill the defaults.
    fn merge_into(self, target: AnnotationTarget) -> AnnotationTarget {
        let statistic = self
            .statistic
            .filter(|s| !s.is_empty())
            .or(target.statistic.filter(|s| !s.is_empty()))
            .or_else(|| self.statistics.and_then(|stats| stats.into_iter().next()))
            .unwrap_or_else(|| DEFAULT_STATISTIC.to_string());

        let region = self
            .region
            .or(target.region)
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let ref_id = self
            .ref_id
            .or(target.ref_id)
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| ANNOTATION_REF_ID.to_string());

        AnnotationTarget {
            query_mode: Some(QueryMode::Annotations),
            ref_id: Some(ref_id),
            region: Some(region),
            namespace: self.namespace.or(target.namespace),
            metric_name: self.metric_name.or(target.metric_name),
            dimensions: self.dimensions.or(target.dimensions),
            statistic: Some(statistic),
            period: self.period.or(target.period),
            match_exact: self.match_exact.or(target.match_exact),
            prefix_matching: self.prefix_matching.or(target.prefix_matching),
            action_prefix: self.action_prefix.or(target.action_prefix),
            alarm_name_prefix: self.alarm_name_prefix.or(target.alarm_name_prefix),
            account_id: target.account_id,
        }
    }
}

/// A dashboard annotation backed by CloudWatch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub built_in: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<AnnotationTarget>,
    #[serde(flatten)]
    pub legacy: LegacyAnnotationFields,
}

impl AnnotationQuery {
    /// Whether `target` has already been through [`prepare_annotation`].
    fn is_prepared(&self) -> bool {
        self.target
            .as_ref()
            .is_some_and(|t| t.query_mode == Some(QueryMode::Annotations))
    }
}

/// Move legacy flat fields under `target`.
///
/// Flat fields are merged over any partial target, then `refId`, `region`
/// and `statistic` are defaulted where still missing and `queryMode` is set
/// to `Annotations`. Targets already in `Annotations` mode are returned
/// unchanged, so applying this twice is the same as applying it once.
pub fn prepare_annotation(query: AnnotationQuery) -> AnnotationQuery {
    if query.is_prepared() {
        return query;
    }

    debug!(
        "migrating legacy annotation {:?} to nested target",
        query.name.as_deref().unwrap_or_default()
    );
    let AnnotationQuery {
        name,
        enable,
        icon_color,
        hide,
        built_in,
        datasource,
        target,
        legacy,
    } = query;

    AnnotationQuery {
        name,
        enable,
        icon_color,
        hide,
        built_in,
        datasource,
        target: Some(legacy.merge_into(target.unwrap_or_default())),
        legacy: LegacyAnnotationFields::default(),
    }
}

/// The target to run, if it is complete in one of the two annotation modes.
///
/// Prefix matching needs both prefixes. Metric-stat mode needs namespace,
/// metric, statistic and at least one dimension.
pub fn prepare_query(query: &AnnotationQuery) -> Option<AnnotationTarget> {
    let target = query.target.as_ref()?;

    let runnable = if target.prefix_matching == Some(true) {
        is_filled(&target.action_prefix) && is_filled(&target.alarm_name_prefix)
    } else {
        is_filled(&target.namespace)
            && is_filled(&target.metric_name)
            && is_filled(&target.statistic)
            && target.dimensions.as_ref().is_some_and(|d| !d.is_empty())
    };

    if runnable {
        Some(target.clone())
    } else {
        debug!("skipping incomplete annotation target {:?}", target.ref_id);
        None
    }
}
