//! Failure taxonomy for a single run.
//!
//! Every variant is terminal for the run it belongs to. Callers only ever
//! see the rendered message through [`Outcome::Failure`](crate::runner::Outcome).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobError {
    /// The job is not runnable (empty path, unknown operation, bad framing).
    #[error("{0}")]
    InvalidJob(String),

    /// The resolved engine executable does not exist.
    #[error("engine executable not found at {}", .0.display())]
    EngineNotFound(PathBuf),

    /// The OS refused to start the engine process.
    #[error("failed to launch engine: {0}")]
    EngineLaunch(#[source] io::Error),

    /// The engine ran and exited non-zero.
    #[error("{}", render_run_failure(.code, .stderr))]
    EngineRun { code: Option<i32>, stderr: String },

    /// Anything else that went wrong while orchestrating the run.
    #[error("an error occurred: {0}")]
    Orchestration(String),
}

impl JobError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidJob(reason.into())
    }

    /// Short machine-friendly tag, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidJob(_) => "invalid_job",
            Self::EngineNotFound(_) => "engine_not_found",
            Self::EngineLaunch(_) => "engine_launch_failure",
            Self::EngineRun { .. } => "engine_run_failure",
            Self::Orchestration(_) => "orchestration_error",
        }
    }
}

impl From<io::Error> for JobError {
    fn from(err: io::Error) -> Self {
        Self::Orchestration(err.to_string())
    }
}

fn render_run_failure(code: &Option<i32>, stderr: &str) -> String {
    let stderr = stderr.trim_end();
    if !stderr.is_empty() {
        return format!("process failed: {stderr}");
    }
    match code {
        Some(code) => format!("process failed with exit code {code}"),
        None => "process terminated by a signal".to_string(),
    }
}
