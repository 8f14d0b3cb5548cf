use resubmit_core::JobRecord;
use resubmit_grid::{create_jobs_table, JobTable, ParamSpec, PatternRule};
use serde_json::json;

fn record(pairs: &[(&str, serde_json::Value)]) -> JobRecord {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

#[test]
fn records_rebuild_the_same_table() {
    let spec = ParamSpec::new()
        .values("model", ["a", "b"])
        .values("seed", [0, 1]);
    let table = create_jobs_table(&spec).expect("table");
    let rebuilt = JobTable::from_records(&table.records()).expect("rebuilt");
    assert_eq!(rebuilt, table);
}

#[test]
fn record_order_follows_the_first_record() {
    let records = vec![
        record(&[("b", json!(1)), ("a", json!(2))]),
        record(&[("a", json!(3)), ("b", json!(4))]),
    ];
    let table = JobTable::from_records(&records).expect("table");
    assert_eq!(table.columns(), ["b", "a"]);
    assert_eq!(table.get(1, "b"), Some(&json!(4)));
}

#[test]
fn records_with_different_columns_are_rejected() {
    let records = vec![
        record(&[("a", json!(1))]),
        record(&[("b", json!(2))]),
    ];
    let err = JobTable::from_records(&records).expect_err("mismatch");
    assert_eq!(err.info().code, "record-columns");
    assert_eq!(err.info().context.get("row").map(String::as_str), Some("1"));
}

#[test]
fn no_records_give_an_empty_table() {
    let table = JobTable::from_records(&[]).expect("table");
    assert!(table.is_empty());
    assert!(table.columns().is_empty());
}

#[test]
fn exclusion_prefix_inverts_the_rule() {
    let include = PatternRule::parse("^vit").expect("pattern");
    assert!(!include.is_exclusion());
    assert!(include.keeps("vit_b"));
    assert!(!include.keeps("resnet"));

    let exclude = PatternRule::parse("!re:^vit").expect("pattern");
    assert!(exclude.is_exclusion());
    assert_eq!(exclude.as_str(), "^vit");
    assert!(!exclude.keeps("vit_b"));
    assert!(exclude.keeps("resnet"));
}
