#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use resubmit_core::{render_field, JobRecord, ResubError};
use resubmit_submit::{
    job_fn, Confirm, DebuggerAttach, Executor, ExecutorBackend, ExecutorParameters, JobFn,
    JobHandle, PromptDirective, SubmitConfig,
};

#[derive(Debug, Default)]
pub struct BackendLog {
    pub folders: Vec<String>,
    pub params: Vec<ExecutorParameters>,
    pub submitted: Vec<JobRecord>,
}

/// Backend that runs each job eagerly inside `map_array`.
#[derive(Clone, Default)]
pub struct FakeBackend {
    pub log: Arc<Mutex<BackendLog>>,
}

impl FakeBackend {
    pub fn acquisitions(&self) -> usize {
        self.log.lock().unwrap().folders.len()
    }
}

pub struct FakeExecutor {
    log: Arc<Mutex<BackendLog>>,
}

#[derive(Debug)]
pub struct FakeHandle<R> {
    id: String,
    outcome: Result<R, ResubError>,
}

impl<R: 'static> ExecutorBackend<R> for FakeBackend {
    type Executor = FakeExecutor;

    fn acquire(&self, folder: &str) -> Result<FakeExecutor, ResubError> {
        self.log.lock().unwrap().folders.push(folder.to_string());
        Ok(FakeExecutor {
            log: Arc::clone(&self.log),
        })
    }
}

impl<R: 'static> Executor<R> for FakeExecutor {
    type Handle = FakeHandle<R>;

    fn update_parameters(&mut self, params: ExecutorParameters) -> Result<(), ResubError> {
        self.log.lock().unwrap().params.push(params);
        Ok(())
    }

    fn map_array(
        &mut self,
        func: JobFn<R>,
        jobs: Vec<JobRecord>,
    ) -> Result<Vec<FakeHandle<R>>, ResubError> {
        let mut log = self.log.lock().unwrap();
        Ok(jobs
            .into_iter()
            .enumerate()
            .map(|(idx, record)| {
                let outcome = func(&record);
                log.submitted.push(record);
                FakeHandle {
                    id: format!("fake_{idx}"),
                    outcome,
                }
            })
            .collect())
    }
}

impl<R> JobHandle<R> for FakeHandle<R> {
    fn job_id(&self) -> &str {
        &self.id
    }

    fn result(self) -> Result<R, ResubError> {
        self.outcome
    }
}

/// Prompt that always gives the same answer and counts questions.
#[derive(Clone)]
pub struct Scripted {
    pub answer: bool,
    pub asked: Arc<AtomicUsize>,
}

impl Scripted {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            asked: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn times_asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }
}

impl Confirm for Scripted {
    fn confirm(&mut self, _preview: &[String]) -> Result<bool, ResubError> {
        self.asked.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer)
    }
}

#[derive(Default)]
pub struct CountingDebugger {
    pub ports: Mutex<Vec<u16>>,
}

impl DebuggerAttach for CountingDebugger {
    fn wait_for_client(&self, port: u16) -> Result<(), ResubError> {
        self.ports.lock().unwrap().push(port);
        Ok(())
    }
}

/// Job returning `ok-<id>`.
pub fn ok_job() -> JobFn<String> {
    job_fn(|record| {
        let id = render_field(record, "id").ok_or_else(|| ResubError::job("missing id"))?;
        Ok(format!("ok-{id}"))
    })
}

pub fn quiet_config() -> SubmitConfig {
    SubmitConfig {
        prompt: PromptDirective::Flag(false),
        ..SubmitConfig::default()
    }
}
