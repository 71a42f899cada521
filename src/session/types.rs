use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Boxed error coming out of an opaque host primitive
pub type HostError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures of session load/start/stop
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session file is not readable: {}", .path.display())]
    NotReadable { path: PathBuf },

    #[error("Session is already tracked: {}", .path.display())]
    AlreadyTracked { path: PathBuf },

    #[error("Host failed to {operation} {}: {source}", .path.display())]
    Host {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: HostError,
    },

    #[error("I/O error while {operation} at {}: {source}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SessionError {
    pub fn host(operation: &'static str, path: impl Into<PathBuf>, source: anyhow::Error) -> Self {
        Self::Host {
            operation,
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

/// Which session file, if any, is being auto-saved
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TrackingState {
    #[default]
    Untracked,
    Tracked(PathBuf),
}

impl TrackingState {
    pub fn path(&self) -> Option<&Path> {
        match self {
            TrackingState::Untracked => None,
            TrackingState::Tracked(path) => Some(path),
        }
    }

    pub fn is_tracking(&self, path: &Path) -> bool {
        self.path() == Some(path)
    }
}

/// Result of one snapshot save attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// Host was in a restricted input mode; nothing was written
    Skipped,
}

/// Session status information
#[derive(Debug, Clone)]
pub struct SessionStatus {
    pub tracked: Option<PathBuf>,
    pub is_auto_save_active: bool,
    /// Auto-saves performed since auto-persistence was last armed
    pub auto_saves: u64,
    pub skipped_saves: u64,
    pub last_save: Option<DateTime<Utc>>,
}
