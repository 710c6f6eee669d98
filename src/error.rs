//! Error types for podman-sandbox

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("Container 'podman-sandbox' is already running")]
    AlreadyRunning,

    #[error(
        "Container 'podman-sandbox' is already running with a different directory.\n  \
         Mounted: {}\n  \
         Current: {}\n\
         Run 'podman-sandbox stop && podman-sandbox start' to remount with current directory.",
        .mounted.display(),
        .current.display()
    )]
    MountConflict { mounted: PathBuf, current: PathBuf },

    #[error("Container 'podman-sandbox' is not running. Start it with 'podman-sandbox start'")]
    NotRunning,

    #[error("{action} failed: {message}")]
    EngineFailure { action: String, message: String },

    #[error("Could not run container engine '{program}'")]
    EngineUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SandboxError {
    /// Conflicts with the current container state, as opposed to failures
    pub fn is_user_state(&self) -> bool {
        matches!(
            self,
            Self::AlreadyRunning | Self::MountConflict { .. } | Self::NotRunning
        )
    }

    pub(crate) fn engine(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EngineFailure {
            action: action.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SandboxError>;
