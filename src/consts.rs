//! Project-wide constants.

pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");
pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// Engine executable expected next to the squash binary.
#[cfg(windows)]
pub const ENGINE_FILE_NAME: &str = "compressor.exe";
#[cfg(not(windows))]
pub const ENGINE_FILE_NAME: &str = "compressor";

/// Environment overrides.
pub const ENGINE_ENV: &str = "SQUASH_ENGINE";
pub const ARTIFACT_DIR_ENV: &str = "SQUASH_ARTIFACT_DIR";
pub const LOG_ENV: &str = "SQUASH_LOG";

/// Prefix for request artifacts written before each engine launch.
pub const ARTIFACT_PREFIX: &str = "squash-request";

/// Reported when the engine succeeds without printing anything.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Operation completed successfully";

/// Captured engine output beyond this is truncated.
pub const MAX_OUTPUT_BYTES: usize = 64 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consts_are_non_empty() {
        assert!(!AUTHOR.is_empty());
        assert!(!HOMEPAGE.is_empty());
        assert!(!REPO.is_empty());
        assert!(!ENGINE_FILE_NAME.is_empty());
    }

    #[test]
    fn consts_from_cargo_toml() {
        assert!(REPO.contains("squash"));
    }

    #[cfg(not(windows))]
    #[test]
    fn engine_name_has_no_extension_on_unix() {
        assert_eq!(ENGINE_FILE_NAME, "compressor");
    }
}
