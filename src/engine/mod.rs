pub mod mock;
pub mod process;

use std::path::Path;

use async_trait::async_trait;

use crate::consts::MAX_OUTPUT_BYTES;
use crate::error::JobError;

/// What the engine left behind after it exited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOutput {
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl EngineOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Decode raw process output, lossy UTF-8 and capped in size.
    pub fn from_raw(exit_code: Option<i32>, stdout: &[u8], stderr: &[u8]) -> Self {
        Self {
            exit_code,
            stdout: truncate_output(&String::from_utf8_lossy(stdout), MAX_OUTPUT_BYTES),
            stderr: truncate_output(&String::from_utf8_lossy(stderr), MAX_OUTPUT_BYTES),
        }
    }
}

/// Called by [`Engine::invoke`] right after the engine process starts.
pub type LaunchHook<'a> = &'a (dyn Fn() + Send + Sync);

/// The external compressor. The runner only knows this trait.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Cheap checks before any request artifact is written.
    fn preflight(&self) -> Result<(), JobError> {
        Ok(())
    }

    /// Run the engine with `request` as its stdin and wait for it to exit.
    /// `on_launch` fires once the process is actually running, not on a
    /// failed spawn.
    async fn invoke(&self, request: &Path, on_launch: LaunchHook<'_>)
    -> Result<EngineOutput, JobError>;

    /// Human-readable location, for banners and logs.
    fn describe(&self) -> String;
}

pub(crate) fn truncate_output(output: &str, max_bytes: usize) -> String {
    if output.len() <= max_bytes {
        return output.to_string();
    }
    let mut end = max_bytes;
    while !output.is_char_boundary(end) {
        end -= 1;
    }
    format!(
        "{}\n\n[truncated: showing {}/{} bytes]",
        &output[..end],
        end,
        output.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_requires_exit_zero() {
        assert!(EngineOutput::from_raw(Some(0), b"", b"").success());
        assert!(!EngineOutput::from_raw(Some(1), b"", b"").success());
        assert!(!EngineOutput::from_raw(None, b"", b"").success());
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let out = EngineOutput::from_raw(Some(0), b"ok \xff", b"");
        assert_eq!(out.stdout, "ok \u{fffd}");
    }

    #[test]
    fn short_output_is_untouched() {
        assert_eq!(truncate_output("done", 10), "done");
    }

    #[test]
    fn long_output_is_truncated() {
        let out = truncate_output(&"a".repeat(20), 8);
        assert!(out.starts_with("aaaaaaaa\n"));
        assert!(out.contains("[truncated: showing 8/20 bytes]"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let out = truncate_output("ééé", 3);
        assert!(out.starts_with("é\n"));
    }
}
