use criterion::{criterion_group, criterion_main, Criterion};
use resubmit_grid::{create_jobs_table, ensure_unique_combinations, ParamSpec};
use serde_json::json;

fn make_spec() -> ParamSpec {
    ParamSpec::new()
        .values("model", ["resnet18", "resnet50", "vit_b", "vit_l"])
        .values("lr", [0.1, 0.03, 0.01, 0.003, 0.001])
        .values("seed", 0..10)
        .values("batch", [64, 128, 256])
        .insert("model_regex", json!("!re:_l$"))
        .computed("tag", |table| {
            Ok(table
                .records()
                .iter()
                .map(|r| json!(format!("{}-{}", r["model"], r["seed"])))
                .collect())
        })
}

fn bench_grid(c: &mut Criterion) {
    let spec = make_spec();
    c.bench_function("grid_throughput", |b| {
        b.iter(|| {
            let table = create_jobs_table(&spec).expect("table");
            let _ = ensure_unique_combinations(&table, &["model", "lr", "seed", "batch"], true)
                .expect("unique");
        });
    });
}

criterion_group!(benches, bench_grid);
criterion_main!(benches);
