//! Tests for annotation query preparation.

use cwsql::model::{prepare_annotation, prepare_query, AnnotationQuery, QueryMode};
use serde_json::json;

fn annotation(value: serde_json::Value) -> AnnotationQuery {
    serde_json::from_value(value).unwrap()
}

fn legacy() -> AnnotationQuery {
    annotation(json!({
        "name": "CPU alarms",
        "enable": true,
        "iconColor": "red",
        "datasource": {"type": "cloudwatch", "uid": "cw"},
        "region": "us-east-1",
        "namespace": "AWS/EC2",
        "metricName": "CPUUtilization",
        "dimensions": {"InstanceId": "i-123"},
        "statistic": "Maximum",
        "period": "300"
    }))
}

#[test]
fn test_legacy_fields_move_into_target() {
    let prepared = prepare_annotation(legacy());
    let target = prepared.target.clone().unwrap();

    assert_eq!(target.region.as_deref(), Some("us-east-1"));
    assert_eq!(target.namespace.as_deref(), Some("AWS/EC2"));
    assert_eq!(target.metric_name.as_deref(), Some("CPUUtilization"));
    assert_eq!(target.statistic.as_deref(), Some("Maximum"));
    assert_eq!(target.period.as_deref(), Some("300"));
    assert_eq!(target.ref_id.as_deref(), Some("annotationQuery"));
    assert_eq!(target.query_mode, Some(QueryMode::Annotations));

    // envelope kept, flat fields gone
    assert_eq!(prepared.name.as_deref(), Some("CPU alarms"));
    assert_eq!(prepared.icon_color.as_deref(), Some("red"));
    let value = serde_json::to_value(&prepared).unwrap();
    assert!(value.get("namespace").is_none());
    assert_eq!(value["target"]["namespace"], "AWS/EC2");
}

#[test]
fn test_defaults_only_for_missing_fields() {
    let prepared = prepare_annotation(annotation(json!({"name": "bare"})));
    let target = prepared.target.unwrap();
    assert_eq!(target.statistic.as_deref(), Some("Average"));
    assert_eq!(target.region.as_deref(), Some("default"));
    assert!(target.namespace.is_none());
    assert!(target.dimensions.is_none());
    assert!(target.prefix_matching.is_none());
}

#[test]
fn test_prepare_annotation_idempotent() {
    let once = prepare_annotation(legacy());
    let twice = prepare_annotation(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn test_metric_stat_target_runs() {
    let prepared = prepare_annotation(legacy());
    let target = prepare_query(&prepared).unwrap();
    assert_eq!(target.namespace.as_deref(), Some("AWS/EC2"));
}

#[test]
fn test_metric_stat_needs_dimension() {
    let prepared = annotation(json!({
        "target": {
            "region": "us-east-1",
            "namespace": "AWS/EC2",
            "metricName": "CPUUtilization",
            "statistic": "Average",
            "dimensions": {}
        }
    }));
    assert!(prepare_query(&prepared).is_none());
}

#[test]
fn test_prefix_matching_needs_both_prefixes() {
    let prepared = annotation(json!({
        "target": {
            "prefixMatching": true,
            "actionPrefix": "",
            "alarmNamePrefix": "prod-"
        }
    }));
    assert!(prepare_query(&prepared).is_none());

    let prepared = annotation(json!({
        "target": {
            "prefixMatching": true,
            "actionPrefix": "arn:aws:sns",
            "alarmNamePrefix": "prod-"
        }
    }));
    assert!(prepare_query(&prepared).is_some());
}

#[test]
fn test_prefix_matching_ignores_metric_fields() {
    let prepared = annotation(json!({
        "target": {
            "prefixMatching": true,
            "namespace": "AWS/EC2",
            "metricName": "CPUUtilization",
            "statistic": "Average",
            "dimensions": {"InstanceId": "i-1"}
        }
    }));
    assert!(prepare_query(&prepared).is_none());
}

#[test]
fn test_no_target_is_not_runnable() {
    assert!(prepare_query(&legacy()).is_none());
}

#[test]
fn test_partial_target_normalized_and_runnable() {
    let prepared = prepare_annotation(annotation(json!({
        "target": {
            "region": "us-east-1",
            "namespace": "AWS/EC2",
            "metricName": "CPUUtilization",
            "dimensions": {"InstanceId": "i-1"}
        }
    })));
    let target = prepared.target.clone().unwrap();
    assert_eq!(target.query_mode, Some(QueryMode::Annotations));
    assert_eq!(target.ref_id.as_deref(), Some("annotationQuery"));
    assert_eq!(target.statistic.as_deref(), Some("Average"));
    assert_eq!(target.region.as_deref(), Some("us-east-1"));
    assert!(prepare_query(&prepared).is_some());
}

#[test]
fn test_partial_target_keeps_its_statistic() {
    let prepared = prepare_annotation(annotation(json!({
        "target": {"namespace": "AWS/EC2", "statistic": "p99", "refId": "Z"}
    })));
    let target = prepared.target.unwrap();
    assert_eq!(target.statistic.as_deref(), Some("p99"));
    assert_eq!(target.ref_id.as_deref(), Some("Z"));
}

#[test]
fn test_prepared_target_returned_as_is() {
    let query = annotation(json!({
        "target": {"queryMode": "Annotations", "namespace": "AWS/EC2"}
    }));
    assert_eq!(prepare_annotation(query.clone()), query);
}

#[test]
fn test_legacy_ref_id_kept() {
    let prepared = prepare_annotation(annotation(json!({
        "refId": "B",
        "namespace": "AWS/EC2"
    })));
    let target = prepared.target.unwrap();
    assert_eq!(target.ref_id.as_deref(), Some("B"));

    let value = serde_json::to_value(&prepare_annotation(legacy())).unwrap();
    assert!(value.get("refId").is_none());
}
