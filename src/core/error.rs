use std::path::PathBuf;
use thiserror::Error;

/// Remediation shown whenever on-disk launcher data is incomplete.
pub const RUN_FROM_NATIVE_LAUNCHER: &str =
    "run the instance once from its native launcher so it downloads the required files";

/// Central error type for the launch resolver.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── Launch guard ────────────────────────────────────
    #[error("Instance is already running: {0:?}")]
    AlreadyRunning(PathBuf),

    // ── Environment ─────────────────────────────────────
    #[error(
        "Java {required}+ not found. Install Java and make sure it is on your PATH, \
         or set JAVA_HOME / `java_home` in the launch settings"
    )]
    JavaNotFound { required: u32 },

    #[error(
        "Version data for Minecraft {version} not found in {searched:?}: {}",
        RUN_FROM_NATIVE_LAUNCHER
    )]
    VersionDataMissing { version: String, searched: PathBuf },

    #[error("No library JARs found for this instance: {}", RUN_FROM_NATIVE_LAUNCHER)]
    NoLibrariesFound,

    // ── Process ─────────────────────────────────────────
    #[error("Failed to spawn the game process: {0}")]
    SpawnFailed(String),

    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Parsing ─────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Account store error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid Maven coordinate: {0}")]
    InvalidMavenCoordinate(String),

    #[error("Unknown launcher kind: {0}")]
    InvalidLauncherKind(String),

    #[error("Invalid loader '{0}', expected <type>:<version>")]
    InvalidLoader(String),

    #[error("Incomplete launch request: {0}")]
    IncompleteRequest(String),

    // ── Configuration ───────────────────────────────────
    #[error("Invalid launch settings at {path:?}: {message}")]
    Config { path: PathBuf, message: String },
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl LauncherError {
    /// Environment and configuration failures the user can fix by hand.
    pub fn is_environment(&self) -> bool {
        matches!(
            self,
            LauncherError::JavaNotFound { .. }
                | LauncherError::VersionDataMissing { .. }
                | LauncherError::NoLibrariesFound
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_errors_carry_remediation_text() {
        let err = LauncherError::VersionDataMissing {
            version: "1.20.1".into(),
            searched: PathBuf::from("/tmp/meta"),
        };
        assert!(err.is_environment());
        assert!(err.to_string().contains("native launcher"));
        assert!(LauncherError::NoLibrariesFound
            .to_string()
            .contains("native launcher"));
        assert!(LauncherError::JavaNotFound { required: 17 }
            .to_string()
            .contains("Java 17+"));
    }

    #[test]
    fn already_running_is_not_an_environment_error() {
        let err = LauncherError::AlreadyRunning(PathBuf::from("/tmp/instance"));
        assert!(!err.is_environment());
    }
}
