//! Job orchestration: one background task per submitted job.
//!
//! [`JobRunner::submit`] returns at once. The run itself (encode, write the
//! request artifact, launch the engine, wait, clean up) happens on a spawned
//! tokio task. Its [`Outcome`] is posted to the [`CompletionQueue`], and the
//! callback only ever runs where the queue is drained, i.e. on the
//! interactive side.
//!
//! There is no cancellation: once an engine is launched it runs to exit,
//! even if the caller goes away.

pub mod artifact;
mod queue;

pub use queue::CompletionQueue;

use std::any::Any;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::Instrument;

use crate::config::RunnerConfig;
use crate::consts::DEFAULT_SUCCESS_MESSAGE;
use crate::engine::{Engine, EngineOutput};
use crate::error::JobError;
use crate::events::{EventBus, RunId, RunState};
use crate::job::Job;
use crate::protocol;
use artifact::RequestArtifact;

/// Terminal result of one run, delivered exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Success(String),
    Failure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Success(text) | Self::Failure(text) => text,
        }
    }
}

impl From<Result<EngineOutput, JobError>> for Outcome {
    fn from(result: Result<EngineOutput, JobError>) -> Self {
        match result {
            Ok(output) if output.stdout.trim().is_empty() => {
                Self::Success(DEFAULT_SUCCESS_MESSAGE.to_string())
            }
            Ok(output) => Self::Success(output.stdout),
            Err(err) => Self::Failure(err.to_string()),
        }
    }
}

pub(crate) type Callback = Box<dyn FnOnce(Outcome) + Send + 'static>;

/// A finished run waiting to be handed to its callback.
pub(crate) struct Completion {
    run: RunId,
    outcome: Outcome,
    callback: Callback,
}

pub(crate) type ActiveRuns = Arc<Mutex<BTreeMap<RunId, Job>>>;

/// Submits jobs to an [`Engine`] without blocking the caller.
pub struct JobRunner {
    engine: Arc<dyn Engine>,
    config: RunnerConfig,
    events: Arc<EventBus>,
    handle: Handle,
    tx: mpsc::UnboundedSender<Completion>,
    next_id: AtomicU64,
    active: ActiveRuns,
}

impl JobRunner {
    /// Build a runner and the queue its completions arrive on.
    ///
    /// # Panics
    ///
    /// Must be called from within a tokio runtime; runs are spawned onto it.
    pub fn new(engine: Arc<dyn Engine>, config: RunnerConfig) -> (Self, CompletionQueue) {
        Self::with_events(engine, config, Arc::new(EventBus::default()))
    }

    /// Like [`JobRunner::new`], emitting lifecycle events on a shared bus.
    pub fn with_events(
        engine: Arc<dyn Engine>,
        config: RunnerConfig,
        events: Arc<EventBus>,
    ) -> (Self, CompletionQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        let active: ActiveRuns = Arc::default();
        let runner = Self {
            engine,
            config,
            events,
            handle: Handle::current(),
            tx,
            next_id: AtomicU64::new(0),
            active: active.clone(),
        };
        (runner, CompletionQueue::new(rx, active))
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Runs submitted but not yet delivered, oldest first.
    pub fn active(&self) -> Vec<(RunId, Job)> {
        self.active
            .lock()
            .unwrap()
            .iter()
            .map(|(id, job)| (*id, job.clone()))
            .collect()
    }

    pub fn in_flight(&self) -> usize {
        self.active.lock().unwrap().len()
    }

    /// Start `job` in the background. `on_complete` is called exactly once,
    /// from [`CompletionQueue`] dispatch, with the run's outcome.
    pub fn submit<F>(&self, job: Job, on_complete: F) -> RunId
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        let run = RunId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let callback: Callback = Box::new(on_complete);
        self.events.transition(run, RunState::Created);
        self.active.lock().unwrap().insert(run, job.clone());

        if let Err(err) = job.validate() {
            tracing::warn!(%run, kind = err.kind(), error = %err, "job rejected");
            self.events
                .transition(run, RunState::Reported { success: false });
            post(&self.tx, run, Outcome::Failure(err.to_string()), callback);
            return run;
        }
        self.events.transition(run, RunState::Validated);

        let span = tracing::info_span!("run", %run, operation = %job.operation());
        let task = RunTask {
            run,
            job,
            engine: self.engine.clone(),
            artifact_dir: self.config.artifact_dir.clone(),
            events: self.events.clone(),
        };
        let events = self.events.clone();
        let tx = self.tx.clone();

        self.handle.spawn(
            async move {
                tracing::info!(
                    input = task.job.input_path(),
                    output = task.job.output_path(),
                    "run started"
                );
                // Separate task so a panic inside the run becomes a Failure.
                let outcome = match tokio::spawn(task.execute().in_current_span()).await {
                    Ok(result) => {
                        if let Err(err) = &result {
                            tracing::warn!(kind = err.kind(), error = %err, "run failed");
                        }
                        Outcome::from(result)
                    }
                    Err(join_err) => {
                        let err = JobError::Orchestration(panic_message(join_err));
                        tracing::error!(error = %err, "run aborted");
                        Outcome::Failure(err.to_string())
                    }
                };
                tracing::info!(success = outcome.is_success(), "run finished");
                events.transition(
                    run,
                    RunState::Reported {
                        success: outcome.is_success(),
                    },
                );
                post(&tx, run, outcome, callback);
            }
            .instrument(span),
        );

        run
    }
}

/// Everything one background run needs, owned.
struct RunTask {
    run: RunId,
    job: Job,
    engine: Arc<dyn Engine>,
    artifact_dir: PathBuf,
    events: Arc<EventBus>,
}

impl RunTask {
    async fn execute(self) -> Result<EngineOutput, JobError> {
        let request = protocol::encode(&self.job)?;
        self.engine.preflight()?;

        let artifact =
            RequestArtifact::create(&self.artifact_dir, self.run, &request, self.events.clone())
                .await?;

        let (run, events) = (self.run, &self.events);
        let on_launch = move || events.transition(run, RunState::EngineLaunched);
        let result = self.engine.invoke(artifact.path(), &on_launch).await;
        if result.is_ok() {
            self.events.transition(self.run, RunState::EngineExited);
        }
        artifact.release();

        let output = result?;
        tracing::debug!(exit_code = ?output.exit_code, "engine exited");
        if !output.success() {
            return Err(JobError::EngineRun {
                code: output.exit_code,
                stderr: output.stderr,
            });
        }
        Ok(output)
    }
}

fn post(tx: &mpsc::UnboundedSender<Completion>, run: RunId, outcome: Outcome, callback: Callback) {
    let completion = Completion {
        run,
        outcome,
        callback,
    };
    if tx.send(completion).is_err() {
        tracing::debug!(%run, "completion queue closed, outcome dropped");
    }
}

fn panic_message(err: tokio::task::JoinError) -> String {
    if !err.is_panic() {
        return "run was cancelled".to_string();
    }
    let payload: Box<dyn Any + Send> = err.into_panic();
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "run panicked".to_string()
    }
}
