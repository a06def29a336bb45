use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{Engine, EngineOutput, LaunchHook};
use crate::error::JobError;

/// A scripted engine for tests. Returns pre-defined outputs in order and
/// keeps a copy of every request it was handed.
pub struct ScriptedEngine {
    outputs: Vec<EngineOutput>,
    index: AtomicUsize,
    requests: Mutex<Vec<Vec<u8>>>,
    missing: bool,
}

impl ScriptedEngine {
    pub fn new(outputs: Vec<EngineOutput>) -> Self {
        Self {
            outputs,
            index: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            missing: false,
        }
    }

    /// An engine whose preflight always fails with `EngineNotFound`.
    pub fn missing() -> Self {
        Self {
            missing: true,
            ..Self::new(Vec::new())
        }
    }

    /// Convenience: one successful run printing `stdout`.
    pub fn succeeding(stdout: &str) -> Self {
        Self::new(vec![EngineOutput {
            exit_code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }])
    }

    /// Convenience: one failed run with `code` and `stderr`.
    pub fn failing(code: i32, stderr: &str) -> Self {
        Self::new(vec![EngineOutput {
            exit_code: Some(code),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }])
    }

    /// Raw request bytes seen so far, in call order.
    pub fn requests(&self) -> Vec<Vec<u8>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Engine for ScriptedEngine {
    fn preflight(&self) -> Result<(), JobError> {
        if self.missing {
            return Err(JobError::EngineNotFound("scripted".into()));
        }
        Ok(())
    }

    async fn invoke(
        &self,
        request: &Path,
        on_launch: LaunchHook<'_>,
    ) -> Result<EngineOutput, JobError> {
        let bytes = tokio::fs::read(request).await?;
        self.requests.lock().unwrap().push(bytes);
        on_launch();

        let i = self.index.fetch_add(1, Ordering::SeqCst);
        self.outputs.get(i).cloned().ok_or_else(|| {
            JobError::Orchestration(format!(
                "ScriptedEngine: no more outputs (called {} times)",
                i + 1
            ))
        })
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}
