use resubmit_core::{ErrorKind, ResubError};
use resubmit_grid::{create_jobs_table, ensure_unique_combinations, JobTable, ParamSpec};
use serde_json::json;

fn table(a: &[i64], b: &[i64]) -> JobTable {
    JobTable::from_columns([
        ("a", a.iter().map(|v| json!(v)).collect()),
        ("b", b.iter().map(|v| json!(v)).collect()),
    ])
    .expect("table")
}

#[test]
fn duplicates_raise_when_requested() {
    let df = table(&[1, 1, 2], &[3, 3, 4]);
    let err = ensure_unique_combinations(&df, &["a", "b"], true).expect_err("duplicates");
    assert!(matches!(err, ResubError::Uniqueness(_)));
    assert_eq!(err.kind(), ErrorKind::Value);
    assert!(err.to_string().contains("a=1, b=3"));
    assert_eq!(err.info().context.get("rows").map(String::as_str), Some("0,1"));
}

#[test]
fn unique_table_reports_ok() {
    let df = table(&[1, 2, 3], &[3, 4, 5]);
    let (ok, dup) = ensure_unique_combinations(&df, &["a", "b"], false).expect("check");
    assert!(ok);
    assert!(dup.is_none());
}

#[test]
fn duplicates_are_reported_without_raising() {
    let df = table(&[1, 1, 2, 2, 1], &[3, 3, 4, 4, 3]);
    let (ok, dup) = ensure_unique_combinations(&df, &["a", "b"], false).expect("check");
    assert!(!ok);
    let report = dup.expect("report");
    assert_eq!(report.groups.len(), 2);
    assert_eq!(report.groups[0].values, vec![json!(1), json!(3)]);
    assert_eq!(report.groups[0].rows, vec![0, 1, 4]);
    assert_eq!(report.groups[1].rows, vec![2, 3]);
    assert_eq!(report.surplus_rows(), 3);
}

#[test]
fn subset_of_columns_can_collide() {
    let spec = ParamSpec::new()
        .values("seed", [0, 1])
        .values("lr", [0.1])
        .computed("run", |t| Ok(vec![json!("same"); t.len()]));
    let df = create_jobs_table(&spec).expect("table");
    assert!(ensure_unique_combinations(&df, &["seed", "lr"], true).is_ok());
    assert!(ensure_unique_combinations(&df, &["run"], true).is_err());
}

#[test]
fn unknown_key_column_is_a_configuration_error() {
    let df = table(&[1], &[2]);
    let err = ensure_unique_combinations(&df, &["missing"], true).expect_err("unknown");
    assert_eq!(err.info().code, "unknown-column");
}

#[test]
fn empty_key_list_is_rejected() {
    let df = table(&[1], &[2]);
    let keys: [&str; 0] = [];
    assert!(ensure_unique_combinations(&df, &keys, false).is_err());
}

#[test]
fn numbers_of_different_types_do_not_collide() {
    let df = JobTable::from_columns([("x", vec![json!(1), json!(1.0), json!("1")])]).expect("table");
    let (ok, _) = ensure_unique_combinations(&df, &["x"], false).expect("check");
    assert!(ok);
}
