use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use resubmit_core::{render_field, ResubError};
use resubmit_grid::ParamSpec;
use resubmit_submit::{
    job_fn, Dispatcher, Executor, ExecutorBackend, ExecutorParameters, JobFn, JobHandle,
    PoolBackend, PromptDirective, SubmitConfig,
};
use tempfile::tempdir;

fn config(folder: String) -> SubmitConfig {
    SubmitConfig {
        folder,
        block: true,
        prompt: PromptDirective::Flag(false),
        timeout_min: 1,
        ..SubmitConfig::default()
    }
}

fn job_dirs(root: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(root)
        .expect("read dir")
        .map(|entry| entry.expect("entry").path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    dirs
}

fn square() -> JobFn<i64> {
    job_fn(|record| {
        let seed = record["seed"].as_i64().ok_or_else(|| ResubError::job("seed"))?;
        Ok(seed * seed)
    })
}

#[test]
fn blocking_pool_run_writes_job_folders() {
    let dir = tempdir().expect("tempdir");
    let folder = format!("{}/%j", dir.path().display());
    let spec = ParamSpec::new().values("seed", [0, 1, 2]);
    let results = Dispatcher::new(PoolBackend::new().with_workers(2))
        .submit_jobs(&spec, None, square(), &config(folder))
        .expect("submit")
        .results()
        .expect("results");
    assert_eq!(results, vec![0, 1, 4]);

    let dirs = job_dirs(dir.path());
    assert_eq!(dirs.len(), 3);
    let mut seen = BTreeSet::new();
    for job_dir in dirs {
        let name = job_dir.file_name().and_then(|n| n.to_str()).expect("name");
        assert!(name.starts_with("resubmit_"), "{name}");
        seen.insert(fs::read_to_string(job_dir.join("params.json")).expect("params"));
        let status = fs::read_to_string(job_dir.join("STATUS")).expect("status");
        assert!(status.starts_with("completed"), "{status}");
    }
    let expected: BTreeSet<String> = (0..3).map(|idx| format!("{{\"seed\":{idx}}}")).collect();
    assert_eq!(seen, expected);
}

#[test]
fn repeated_submissions_to_one_folder_keep_every_job() {
    let dir = tempdir().expect("tempdir");
    let folder = format!("{}/%j", dir.path().display());
    let spec = ParamSpec::new().values("seed", [0, 1]);
    for _ in 0..2 {
        Dispatcher::new(PoolBackend::new())
            .submit_jobs(&spec, None, square(), &config(folder.clone()))
            .expect("submit");
    }
    assert_eq!(job_dirs(dir.path()).len(), 4);
}

#[test]
fn very_large_time_limit_is_treated_as_unbounded() {
    let dir = tempdir().expect("tempdir");
    let settings = SubmitConfig {
        timeout_min: u64::MAX,
        ..config(format!("{}/%j", dir.path().display()))
    };
    let spec = ParamSpec::new().values("seed", [3]);
    let results = Dispatcher::new(PoolBackend::new())
        .submit_jobs(&spec, None, square(), &settings)
        .expect("submit")
        .results()
        .expect("results");
    assert_eq!(results, vec![9]);
}

#[test]
fn folder_without_placeholder_gets_one_subfolder_per_job() {
    let dir = tempdir().expect("tempdir");
    let backend = PoolBackend::new();
    let mut executor =
        ExecutorBackend::<String>::acquire(&backend, &dir.path().display().to_string())
            .expect("executor");
    let params = ExecutorParameters {
        name: "single".into(),
        ..ExecutorParameters::default()
    };
    Executor::<String>::update_parameters(&mut executor, params).expect("params");
    let record = [("name".to_string(), serde_json::json!("x"))]
        .into_iter()
        .collect();
    let echo = job_fn(|record| render_field(record, "name").ok_or_else(|| ResubError::job("name")));
    let handles = executor.map_array(echo, vec![record]).expect("map");
    let job_id = handles[0].job_id().to_string();
    assert!(job_id.starts_with("single_"), "{job_id}");
    let handle = handles.into_iter().next().expect("handle");
    assert_eq!(handle.result().expect("result"), "x");
    assert!(dir.path().join(&job_id).join("params.json").exists());
}

#[test]
fn failing_job_reports_error_and_status() {
    let dir = tempdir().expect("tempdir");
    let folder = format!("{}/%j", dir.path().display());
    let spec = ParamSpec::new().values("seed", [0]);
    let failing = job_fn(|_| -> Result<i64, ResubError> { Err(ResubError::job("bad seed")) });
    let err = Dispatcher::new(PoolBackend::new())
        .submit_jobs(&spec, None, failing, &config(folder))
        .expect_err("job fails");
    assert_eq!(err, ResubError::job("bad seed"));
    let dirs = job_dirs(dir.path());
    assert_eq!(dirs.len(), 1);
    let status = fs::read_to_string(dirs[0].join("STATUS")).expect("status");
    assert!(status.starts_with("failed"), "{status}");
}

#[test]
fn panicking_job_becomes_a_job_error() {
    let dir = tempdir().expect("tempdir");
    let folder = format!("{}/%j", dir.path().display());
    let spec = ParamSpec::new().values("seed", [0]);
    let panicking = job_fn(|_| -> Result<i64, ResubError> { panic!("worker exploded") });
    let err = Dispatcher::new(PoolBackend::new())
        .submit_jobs(&spec, None, panicking, &config(folder))
        .expect_err("job panics");
    assert!(matches!(err, ResubError::Job(_)));
    assert!(err.to_string().contains("panicked"), "{err}");
}

#[test]
fn empty_folder_is_rejected() {
    let result = ExecutorBackend::<String>::acquire(&PoolBackend::new(), " ");
    assert!(result.is_err());
}
