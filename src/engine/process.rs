use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::{Engine, EngineOutput, LaunchHook};
use crate::error::JobError;

/// The engine as a child process: request file on stdin, stdout and stderr captured.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    path: PathBuf,
}

impl ProcessEngine {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Engine for ProcessEngine {
    fn preflight(&self) -> Result<(), JobError> {
        if !self.path.is_file() {
            return Err(JobError::EngineNotFound(self.path.clone()));
        }
        Ok(())
    }

    async fn invoke(
        &self,
        request: &Path,
        on_launch: LaunchHook<'_>,
    ) -> Result<EngineOutput, JobError> {
        let stdin = tokio::fs::File::open(request).await?.into_std().await;

        let child = Command::new(&self.path)
            .stdin(Stdio::from(stdin))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(JobError::EngineLaunch)?;
        tracing::debug!(pid = child.id(), engine = %self.path.display(), "engine launched");
        on_launch();

        let output = child.wait_with_output().await?;
        Ok(EngineOutput::from_raw(
            output.status.code(),
            &output.stdout,
            &output.stderr,
        ))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
