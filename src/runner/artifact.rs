use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::RngExt;
use tokio::io::AsyncWriteExt;

use crate::consts::ARTIFACT_PREFIX;
use crate::error::JobError;
use crate::events::{EventBus, RunId, RunState};

/// The encoded request, on disk, for exactly one run.
///
/// Removed by [`RequestArtifact::release`] on the normal path and by `Drop`
/// on every other one (early return, panic, aborted task). Removal errors
/// are logged and swallowed so they never replace the run's real outcome.
#[derive(Debug)]
pub struct RequestArtifact {
    path: PathBuf,
    run: RunId,
    events: Arc<EventBus>,
    written: bool,
    released: bool,
}

impl RequestArtifact {
    /// Write `bytes` to a fresh, uniquely named file in `dir`.
    pub async fn create(
        dir: &Path,
        run: RunId,
        bytes: &[u8],
        events: Arc<EventBus>,
    ) -> Result<Self, JobError> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(unique_name(run));

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        // Guard exists from here on, so a failed write still cleans up.
        let mut artifact = Self {
            path,
            run,
            events,
            written: false,
            released: false,
        };
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);
        artifact.written = true;

        tracing::debug!(path = %artifact.path.display(), "request artifact written");
        artifact.events.transition(run, RunState::ArtifactWritten);
        Ok(artifact)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the artifact now.
    pub fn release(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "request artifact removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove request artifact"
            ),
        }
        // Only a run that announced its artifact announces the cleanup.
        if self.written {
            self.events.transition(self.run, RunState::Cleaned);
        }
    }
}

impl Drop for RequestArtifact {
    fn drop(&mut self) {
        self.remove();
    }
}

/// `squash-request-<pid>-<run>-<random>.txt`, never shared between runs.
fn unique_name(run: RunId) -> String {
    let mut rng = rand::rng();
    let suffix: u64 = rng.random();
    format!(
        "{ARTIFACT_PREFIX}-{}-{}-{suffix:016x}.txt",
        std::process::id(),
        run.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bus() -> Arc<EventBus> {
        Arc::new(EventBus::default())
    }

    #[tokio::test]
    async fn create_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = RequestArtifact::create(dir.path(), RunId(1), b"compress\na\nb\n", bus())
            .await
            .unwrap();

        assert!(artifact.path().starts_with(dir.path()));
        assert_eq!(std::fs::read(artifact.path()).unwrap(), b"compress\na\nb\n");
    }

    #[tokio::test]
    async fn release_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = RequestArtifact::create(dir.path(), RunId(1), b"x", bus())
            .await
            .unwrap();
        let path = artifact.path().to_path_buf();

        artifact.release();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn drop_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let artifact = RequestArtifact::create(dir.path(), RunId(1), b"x", bus())
                .await
                .unwrap();
            artifact.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn already_removed_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = RequestArtifact::create(dir.path(), RunId(1), b"x", bus())
            .await
            .unwrap();
        std::fs::remove_file(artifact.path()).unwrap();
        artifact.release();
    }

    #[tokio::test]
    async fn names_are_unique_per_run() {
        let dir = tempfile::tempdir().unwrap();
        let a = RequestArtifact::create(dir.path(), RunId(1), b"a", bus()).await.unwrap();
        let b = RequestArtifact::create(dir.path(), RunId(1), b"b", bus()).await.unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[tokio::test]
    async fn cleanup_is_emitted_once() {
        let dir = tempfile::tempdir().unwrap();
        let events = bus();
        let mut rx = events.subscribe();

        let artifact = RequestArtifact::create(dir.path(), RunId(3), b"x", events.clone())
            .await
            .unwrap();
        artifact.release();

        let mut states = Vec::new();
        while let Ok(crate::events::Event::RunState { state, .. }) = rx.try_recv() {
            states.push(state);
        }
        assert_eq!(states, [RunState::ArtifactWritten, RunState::Cleaned]);
    }

    #[tokio::test]
    async fn failed_write_removes_file_without_cleanup_event() {
        let dir = tempfile::tempdir().unwrap();
        let events = bus();
        let mut rx = events.subscribe();

        let path = dir.path().join("half-written.txt");
        let artifact = RequestArtifact {
            path: path.clone(),
            run: RunId(4),
            events: events.clone(),
            written: false,
            released: false,
        };
        std::fs::write(&path, b"compress\n").unwrap();
        drop(artifact);

        assert!(!path.exists());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn name_carries_prefix_and_run() {
        let name = unique_name(RunId(9));
        assert!(name.starts_with(ARTIFACT_PREFIX));
        assert!(name.contains("-9-"));
        assert!(name.ends_with(".txt"));
    }
}
