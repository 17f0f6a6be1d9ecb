//! Tests for query completeness checks.

use cwsql::model::{MetricEditorMode, MetricQueryType, MetricsQuery};
use cwsql::sql::{func, FromClause, GenerateOptions, SqlExpression, SqlGenerator};
use cwsql::validation::{executable, incompleteness, is_complete, Incomplete};
use serde_json::json;

fn query(value: serde_json::Value) -> MetricsQuery {
    serde_json::from_value(value).unwrap()
}

// ============================================================================
// Search
// ============================================================================

#[test]
fn test_search_builder_empty_namespace() {
    let q = query(json!({
        "refId": "A",
        "metricQueryType": 0,
        "metricEditorMode": 0,
        "namespace": "",
        "metricName": "x",
        "statistic": "Average",
        "region": "us-east-1"
    }));
    assert!(!is_complete(&q));
    assert_eq!(incompleteness(&q), Some(Incomplete::Namespace));
}

#[test]
fn test_search_builder_complete() {
    let q = query(json!({
        "refId": "A",
        "metricQueryType": 0,
        "metricEditorMode": 0,
        "namespace": "AWS/EC2",
        "metricName": "CPUUtilization",
        "statistic": "p99",
        "region": "default"
    }));
    assert!(is_complete(&q));
}

#[test]
fn test_search_builder_missing_statistic() {
    let q = query(json!({
        "metricQueryType": 0,
        "metricEditorMode": 0,
        "namespace": "AWS/EC2",
        "metricName": "CPUUtilization",
        "region": "us-east-1"
    }));
    assert_eq!(incompleteness(&q), Some(Incomplete::Statistic));
}

#[test]
fn test_search_code_needs_expression() {
    let q = query(json!({
        "metricQueryType": 0,
        "metricEditorMode": 1,
        "region": "us-east-1"
    }));
    assert_eq!(incompleteness(&q), Some(Incomplete::Expression));

    let q = query(json!({
        "metricQueryType": 0,
        "metricEditorMode": 1,
        "region": "us-east-1",
        "expression": "SUM(METRICS())"
    }));
    assert!(is_complete(&q));
}

#[test]
fn test_absent_editor_mode_is_incomplete() {
    let q = query(json!({
        "metricQueryType": 0,
        "region": "us-east-1",
        "expression": "SUM(METRICS())"
    }));
    assert_eq!(incompleteness(&q), Some(Incomplete::EditorMode));

    let q = query(json!({
        "metricQueryType": 0,
        "region": "us-east-1",
        "namespace": "AWS/EC2",
        "metricName": "CPUUtilization",
        "statistic": "Average"
    }));
    assert_eq!(incompleteness(&q), Some(Incomplete::EditorMode));
    assert!(!is_complete(&q));
}

#[test]
fn test_insights_ignores_absent_editor_mode() {
    let q = query(json!({
        "metricQueryType": 1,
        "region": "us-east-1",
        "sqlExpression": "SELECT AVG(CPUUtilization) FROM \"AWS/EC2\""
    }));
    assert!(is_complete(&q));
}

// ============================================================================
// Insights
// ============================================================================

#[test]
fn test_insights_only_needs_sql_expression() {
    let q = query(json!({
        "metricQueryType": 1,
        "sqlExpression": "SELECT 1",
        "region": "us-east-1"
    }));
    assert!(is_complete(&q));

    let q = query(json!({
        "metricQueryType": 1,
        "metricEditorMode": 0,
        "sqlExpression": "SELECT 1",
        "region": "us-east-1",
        "namespace": "",
        "statistic": ""
    }));
    assert!(is_complete(&q));
}

#[test]
fn test_insights_empty_sql_expression() {
    let q = query(json!({
        "metricQueryType": 1,
        "metricEditorMode": 1,
        "sqlExpression": "",
        "region": "us-east-1"
    }));
    assert_eq!(incompleteness(&q), Some(Incomplete::SqlExpression));
}

#[test]
fn test_insights_builder_completed_by_generation() {
    let q = MetricsQuery {
        region: Some("us-east-1".into()),
        metric_query_type: Some(MetricQueryType::Insights),
        metric_editor_mode: Some(MetricEditorMode::Builder),
        sql: Some(SqlExpression {
            select: Some(func("AVG", &["CPUUtilization"])),
            from: Some(FromClause::namespace("AWS/EC2")),
            ..Default::default()
        }),
        ..MetricsQuery::new("A")
    };
    assert!(!is_complete(&q));

    let generator = SqlGenerator::new().with_options(GenerateOptions::default());
    let q = q.with_generated_sql(&generator);
    assert_eq!(
        q.sql_expression.as_deref(),
        Some(r#"SELECT AVG(CPUUtilization) FROM "AWS/EC2""#)
    );
    assert!(is_complete(&q));
}

// ============================================================================
// Region and dispatch
// ============================================================================

#[test]
fn test_region_required() {
    let q = query(json!({
        "metricQueryType": 1,
        "sqlExpression": "SELECT 1"
    }));
    assert_eq!(incompleteness(&q), Some(Incomplete::Region));
    assert_eq!(Incomplete::Region.to_string(), "region is not set");
}

#[test]
fn test_executable_skips_silently() {
    let queries: Vec<MetricsQuery> = serde_json::from_value(json!([
        {"refId": "A", "metricQueryType": 1, "sqlExpression": "SELECT 1", "region": "$region"},
        {"refId": "B", "metricQueryType": 1, "region": "us-east-1"},
        {"refId": "C", "metricQueryType": 0, "metricEditorMode": 1,
         "expression": "m1 * 2", "region": "eu-west-1"}
    ]))
    .unwrap();

    let ids: Vec<_> = executable(&queries)
        .into_iter()
        .map(|q| q.ref_id.as_str())
        .collect();
    assert_eq!(ids, vec!["A", "C"]);
}
