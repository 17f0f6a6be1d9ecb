//! Tests for Metrics Insights query generation.

use cwsql::sql::{
    and, eq, func, generate, generate_with, group_by, or, FromClause, GenerateOptions,
    OperatorValue, SortDir, SqlExpression, SqlGenerator,
};
use cwsql::template::VariableMap;
use insta::assert_snapshot;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

fn assert_parses(sql: &str) {
    if let Err(e) = Parser::parse_sql(&GenericDialect {}, sql) {
        panic!("generated query does not parse: {}\n{}", e, sql);
    }
}

fn cpu() -> SqlExpression {
    SqlExpression {
        select: Some(func("AVG", &["CPUUtilization"])),
        from: Some(FromClause::namespace("AWS/EC2")),
        ..Default::default()
    }
}

// ============================================================================
// Clause rendering
// ============================================================================

#[test]
fn test_select_from_only() {
    let sql = generate(&cpu());
    assert_snapshot!(sql, @r#"SELECT AVG(CPUUtilization) FROM "AWS/EC2""#);
    assert_parses(&sql);
}

#[test]
fn test_group_order_limit() {
    let expr = SqlExpression {
        group_by: Some(and(vec![group_by("InstanceId")])),
        order_by: Some(func("AVG", &[])),
        order_by_direction: Some(SortDir::Desc),
        limit: Some(5),
        ..cpu()
    };
    let sql = generate(&expr);
    assert_snapshot!(sql, @r#"SELECT AVG(CPUUtilization) FROM "AWS/EC2" GROUP BY InstanceId ORDER BY AVG() DESC LIMIT 5"#);
    assert_parses(&sql);
}

#[test]
fn test_schema_source() {
    let expr = SqlExpression {
        from: Some(FromClause::schema("AWS/EC2", &["InstanceId"])),
        ..cpu()
    };
    assert_snapshot!(generate(&expr), @r#"SELECT AVG(CPUUtilization) FROM SCHEMA("AWS/EC2", InstanceId)"#);
}

#[test]
fn test_full_query() {
    let expr = SqlExpression {
        select: Some(func("MAX", &["NetworkIn"])),
        from: Some(FromClause::schema("AWS/EC2", &["InstanceId", "InstanceType"])),
        where_clause: Some(and(vec![
            eq("InstanceType", OperatorValue::Multi(vec!["m5.large".into(), "c5.xlarge".into()])),
            or(vec![eq("InstanceId", "i-1"), eq("InstanceId", "i-2")]),
        ])),
        group_by: Some(and(vec![group_by("InstanceId"), group_by("InstanceType")])),
        order_by: Some(func("MAX", &[])),
        limit: Some(10),
        ..Default::default()
    };
    assert_snapshot!(
        generate(&expr),
        @r#"SELECT MAX(NetworkIn) FROM SCHEMA("AWS/EC2", InstanceId, InstanceType) WHERE InstanceType IN ('m5.large','c5.xlarge') AND (InstanceId = 'i-1' OR InstanceId = 'i-2') GROUP BY InstanceId, InstanceType ORDER BY MAX() ASC LIMIT 10"#
    );
}

#[test]
fn test_labels_with_special_characters_quoted() {
    let expr = SqlExpression {
        select: Some(func("SUM", &["Invocations"])),
        from: Some(FromClause::namespace("AWS/Lambda")),
        where_clause: Some(and(vec![eq("Function Name", "it's-mine")])),
        group_by: Some(and(vec![group_by("Resource.Name")])),
        ..Default::default()
    };
    let sql = generate(&expr);
    assert_snapshot!(sql, @r#"SELECT SUM(Invocations) FROM "AWS/Lambda" WHERE "Function Name" = 'it''s-mine' GROUP BY "Resource.Name""#);
    assert_parses(&sql);
}

#[test]
fn test_empty_where_group_omitted() {
    let expr = SqlExpression {
        where_clause: Some(and(vec![])),
        group_by: Some(and(vec![])),
        ..cpu()
    };
    assert_eq!(generate(&expr), generate(&cpu()));
}

// ============================================================================
// Cross-account
// ============================================================================

#[test]
fn test_cross_account_appends_account_group() {
    let options = GenerateOptions::default()
        .with_cross_account(true)
        .with_account_id("123456789012");
    let expr = SqlExpression {
        group_by: Some(and(vec![group_by("InstanceId")])),
        ..cpu()
    };
    let sql = generate_with(&expr, &options);
    assert_snapshot!(sql, @r#"SELECT AVG(CPUUtilization) FROM "AWS/EC2" GROUP BY InstanceId, AWS.AccountId"#);
    assert_parses(&sql);
}

#[test]
fn test_cross_account_not_duplicated() {
    let options = GenerateOptions::default()
        .with_cross_account(true)
        .with_account_id("all");
    let expr = SqlExpression {
        group_by: Some(and(vec![group_by("AWS.AccountId")])),
        ..cpu()
    };
    let sql = generate_with(&expr, &options);
    assert_eq!(sql.matches("AWS.AccountId").count(), 1);
}

#[test]
fn test_empty_account_id_is_no_filter() {
    let options = GenerateOptions::default()
        .with_cross_account(true)
        .with_account_id("");
    assert_eq!(generate_with(&cpu(), &options), generate(&cpu()));
}

// ============================================================================
// Template variables
// ============================================================================

#[test]
fn test_variable_quoting_follows_interpolated_value() {
    let expr = SqlExpression {
        where_clause: Some(and(vec![eq("$dimension", "$value")])),
        group_by: Some(and(vec![group_by("$dimension")])),
        ..cpu()
    };

    let plain = SqlGenerator::new().with_variables(VariableMap::new().with("dimension", "InstanceId"));
    assert_snapshot!(plain.generate(&expr), @r#"SELECT AVG(CPUUtilization) FROM "AWS/EC2" WHERE $dimension = '$value' GROUP BY $dimension"#);

    let dotted =
        SqlGenerator::new().with_variables(VariableMap::new().with("dimension", "Resource.Name"));
    assert_snapshot!(dotted.generate(&expr), @r#"SELECT AVG(CPUUtilization) FROM "AWS/EC2" WHERE "$dimension" = '$value' GROUP BY "$dimension""#);
}

#[test]
fn test_generation_is_deterministic() {
    let expr = SqlExpression {
        where_clause: Some(and(vec![eq("InstanceId", "i-1"), eq("Env", "prod")])),
        group_by: Some(and(vec![group_by("InstanceId")])),
        order_by: Some(func("AVG", &[])),
        limit: Some(3),
        ..cpu()
    };
    let first = generate(&expr);
    for _ in 0..10 {
        assert_eq!(generate(&expr.clone()), first);
    }
}
