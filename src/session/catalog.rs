//! Listing of the session files stored under a sessions directory.

use crate::env;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One stored session file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEntry {
    pub path: PathBuf,
    /// Directory the file name decodes to; lossy for names with a literal `%`
    pub directory: Option<PathBuf>,
    pub modified: Option<DateTime<Utc>>,
}

/// List session files under `session_dir`, sorted by path.
///
/// View snapshots and foreign files are ignored; a missing directory yields
/// an empty list.
pub fn list_sessions(session_dir: &Path) -> Result<Vec<SessionEntry>> {
    let mut entries = Vec::new();
    if !session_dir.is_dir() {
        return Ok(entries);
    }

    let read_dir = fs::read_dir(session_dir).with_context(|| {
        format!("Failed to read sessions directory: {}", session_dir.display())
    })?;

    for entry in read_dir {
        let entry = entry.context("Failed to read sessions directory entry")?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let Some(directory) = env::unescape_file_name(file_name) else {
            debug!("Ignoring non-session file: {}", path.display());
            continue;
        };

        let modified = entry
            .metadata()
            .and_then(|metadata| metadata.modified())
            .ok()
            .map(DateTime::<Utc>::from);

        entries.push(SessionEntry {
            path,
            directory: Some(directory),
            modified,
        });
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}
