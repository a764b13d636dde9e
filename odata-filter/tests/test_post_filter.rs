mod common;

use common::{init_logger, notification_schema};
use odata_filter::{compile, CompareOp, EqualityFilters};
use serde_json::{json, Value};

fn records() -> Vec<Value> {
    (1..=5)
        .map(|priority| {
            let location = if priority % 2 == 0 { "Paris" } else { "London" };
            json!({
                "priority": priority,
                "location": location,
                "start_date": format!("2020-0{}-01", priority),
                "malfunction_start_date": "2020-03-01",
            })
        })
        .collect()
}

fn priorities(matched: &[&Value]) -> Vec<i64> {
    matched
        .iter()
        .filter_map(|record| record["priority"].as_i64())
        .collect()
}

#[test]
fn test_operators_agree_with_compiled_filter() {
    init_logger();
    let records = records();
    for op in [
        CompareOp::Equal,
        CompareOp::NotEqual,
        CompareOp::LessThan,
        CompareOp::GreaterThan,
        CompareOp::LessThanOrEqual,
        CompareOp::GreaterThanOrEqual,
    ] {
        let expression = format!("priority {} 3", op.symbol());
        let query = compile(&EqualityFilters::new(), &[expression], &notification_schema()).unwrap();
        let expected: Vec<i64> = (1..=5).filter(|p| op.holds(p.cmp(&3))).collect();
        assert_eq!(priorities(&query.apply(&records)), expected, "{}", op.symbol());
    }
}

#[test]
fn test_equality_and_extended_combined() {
    init_logger();
    let records = records();
    let equality = EqualityFilters::new().with("location", vec!["London"]);
    let query = compile(
        &equality,
        &["start_date >= '2020-02-01'"],
        &notification_schema(),
    )
    .unwrap();
    assert_eq!(priorities(&query.apply(&records)), vec![3, 5]);
}

#[test]
fn test_field_to_field_comparison() {
    init_logger();
    let records = records();
    let query = compile(
        &EqualityFilters::new(),
        &["start_date < malfunction_start_date"],
        &notification_schema(),
    )
    .unwrap();
    assert_eq!(priorities(&query.apply(&records)), vec![1, 2]);
}

#[test]
fn test_missing_fields_read_as_null() {
    init_logger();
    let records = vec![json!({"priority": 1}), json!({"priority": 2, "short_description": "pump"})];
    let query = compile(
        &EqualityFilters::new(),
        &["short_description == null"],
        &notification_schema(),
    )
    .unwrap();
    assert_eq!(priorities(&query.apply(&records)), vec![1]);
}

#[test]
fn test_boolean_int_string_compares_stored_form() {
    init_logger();
    let query = compile(&EqualityFilters::new(), &["breakdown == true"], &notification_schema())
        .unwrap();
    assert_eq!(query.filter_string().unwrap(), "breakdown eq '1'");
    assert!(query.matches(&json!({"breakdown": "1"})));
    assert!(!query.matches(&json!({"breakdown": "0"})));

    let equality = EqualityFilters::new().with("breakdown", false);
    let query = compile::<&str>(&equality, &[], &notification_schema()).unwrap();
    assert!(query.matches(&json!({"breakdown": "0"})));
    assert!(!query.matches(&json!({"breakdown": "1"})));
}

#[test]
fn test_date_field_drops_time_of_day() {
    init_logger();
    let query = compile(
        &EqualityFilters::new(),
        &["reported_on == '2020-07-01T10:00:00Z'"],
        &notification_schema(),
    )
    .unwrap();
    assert_eq!(query.filter_string().unwrap(), "reported_on eq '2020-07-01'");
    assert!(query.matches(&json!({"reported_on": "2020-07-01"})));
    assert!(!query.matches(&json!({"reported_on": "2020-07-02"})));

    let query = compile(
        &EqualityFilters::new(),
        &["reported_on < '2020-07-01T23:00:00Z'"],
        &notification_schema(),
    )
    .unwrap();
    assert_eq!(query.filter_string().unwrap(), "reported_on lt '2020-07-01'");
    assert!(!query.matches(&json!({"reported_on": "2020-07-01"})));
    assert!(query.matches(&json!({"reported_on": "2020-06-30"})));
}
