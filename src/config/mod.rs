//! Where the engine lives and where request artifacts go.
//!
//! Each setting resolves in the same order: explicit value (CLI flag),
//! environment variable, built-in default. The engine default is the
//! directory of the running executable, never the working directory,
//! so packaged installs find their engine wherever they are launched from.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::consts::{ARTIFACT_DIR_ENV, ENGINE_ENV, ENGINE_FILE_NAME};

/// Settings for a [`JobRunner`](crate::runner::JobRunner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    pub engine_path: PathBuf,
    pub artifact_dir: PathBuf,
}

impl RunnerConfig {
    pub fn new(engine_path: impl Into<PathBuf>, artifact_dir: impl Into<PathBuf>) -> Self {
        Self {
            engine_path: engine_path.into(),
            artifact_dir: artifact_dir.into(),
        }
    }

    /// Resolve from explicit overrides, then the environment, then defaults.
    pub fn resolve(engine: Option<PathBuf>, artifact_dir: Option<PathBuf>) -> Result<Self> {
        let engine_path = match engine.or_else(|| env_path(ENGINE_ENV)) {
            Some(path) => path,
            None => default_engine_path()?,
        };
        let artifact_dir = artifact_dir
            .or_else(|| env_path(ARTIFACT_DIR_ENV))
            .unwrap_or_else(std::env::temp_dir);
        Ok(Self {
            engine_path,
            artifact_dir,
        })
    }
}

/// Directory the running executable was installed into.
pub fn install_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot determine current executable")?;
    let dir = exe
        .parent()
        .context("current executable has no parent directory")?;
    Ok(dir.to_path_buf())
}

/// `<install dir>/compressor[.exe]`.
pub fn default_engine_path() -> Result<PathBuf> {
    Ok(engine_path_in(&install_dir()?))
}

pub fn engine_path_in(dir: &Path) -> PathBuf {
    dir.join(ENGINE_FILE_NAME)
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_values_win() {
        let config = RunnerConfig::resolve(
            Some(PathBuf::from("/opt/engine")),
            Some(PathBuf::from("/var/tmp/squash")),
        )
        .unwrap();
        assert_eq!(config.engine_path, PathBuf::from("/opt/engine"));
        assert_eq!(config.artifact_dir, PathBuf::from("/var/tmp/squash"));
    }

    #[test]
    fn engine_path_in_joins_platform_name() {
        let path = engine_path_in(Path::new("/usr/lib/squash"));
        assert_eq!(path, Path::new("/usr/lib/squash").join(ENGINE_FILE_NAME));
    }

    #[test]
    fn default_engine_sits_next_to_executable() {
        let exe = std::env::current_exe().unwrap();
        let expected = exe.parent().unwrap().join(ENGINE_FILE_NAME);
        assert_eq!(default_engine_path().unwrap(), expected);
    }

    #[test]
    fn default_engine_ignores_working_directory() {
        let cwd = std::env::current_dir().unwrap();
        let path = default_engine_path().unwrap();
        assert_eq!(path.parent().unwrap(), install_dir().unwrap());
        if install_dir().unwrap() != cwd {
            assert_ne!(path, cwd.join(ENGINE_FILE_NAME));
        }
    }

    #[test]
    fn new_builds_from_parts() {
        let config = RunnerConfig::new("/e", "/a");
        assert_eq!(config.engine_path, PathBuf::from("/e"));
        assert_eq!(config.artifact_dir, PathBuf::from("/a"));
    }
}
