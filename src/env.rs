//! Environment constants and path utilities for dirsession.
//!
//! This module centralizes the on-disk naming scheme: where session files
//! live, how a working directory or document path becomes a file name, and
//! the small filesystem helpers the session engine relies on.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Application directory name used for config lookup (like .git, .vscode)
pub const APP_DIR_NAME: &str = ".dirsession";

/// Application name used under XDG data directories
pub const APP_NAME: &str = "dirsession";

/// Configuration file name inside [`APP_DIR_NAME`]
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration file name looked up in the current directory
pub const LOCAL_CONFIG_FILE_NAME: &str = "dirsession.toml";

/// Session-related directory and file names
pub mod session {
    /// Sessions directory name inside the data directory
    pub const SESSIONS_DIR_NAME: &str = "sessions";

    /// View snapshot directory name inside the sessions directory
    pub const VIEW_DIR_NAME: &str = "view";

    /// Extension appended to every session and view file
    pub const FILE_EXTENSION: &str = "vim";

    /// Character that replaces path separators in derived file names
    pub const ESCAPE_CHAR: char = '%';

    /// Name of the event group carrying auto-persistence hooks
    pub const AUTO_GROUP_NAME: &str = "DirSessionAuto";

    /// Name of the event group carrying view snapshot hooks
    pub const VIEW_GROUP_NAME: &str = "DirSessionView";
}

/// Test-related constants
pub mod test {
    /// Working directory used in path derivation examples
    pub const EXAMPLE_CWD: &str = "/home/u/proj";
}

/// Replace every path separator in `path` with [`session::ESCAPE_CHAR`].
///
/// No other normalization happens: case, trailing separators and `.`/`..`
/// components are kept as-is.
pub fn escape_path(path: &Path) -> String {
    path.to_string_lossy()
        .chars()
        .map(|c| {
            if std::path::is_separator(c) {
                session::ESCAPE_CHAR
            } else {
                c
            }
        })
        .collect()
}

/// Best-effort inverse of [`escape_path`] applied to a session file name.
///
/// Returns `None` when the name does not carry the session extension. The
/// result is ambiguous for directories that contained a literal escape
/// character.
pub fn unescape_file_name(file_name: &str) -> Option<PathBuf> {
    let stem = file_name.strip_suffix(&format!(".{}", session::FILE_EXTENSION))?;
    if stem.is_empty() {
        return None;
    }
    let restored: String = stem
        .chars()
        .map(|c| {
            if c == session::ESCAPE_CHAR {
                std::path::MAIN_SEPARATOR
            } else {
                c
            }
        })
        .collect();
    Some(PathBuf::from(restored))
}

fn escaped_file_name(path: &Path) -> String {
    format!("{}.{}", escape_path(path), session::FILE_EXTENSION)
}

/// Resolve the session file for `cwd`, or return `explicit` verbatim.
pub fn resolve_session_path(session_dir: &Path, explicit: Option<&Path>, cwd: &Path) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => session_dir.join(escaped_file_name(cwd)),
    }
}

/// Build the view snapshot directory path
pub fn view_dir_path(session_dir: &Path) -> PathBuf {
    session_dir.join(session::VIEW_DIR_NAME)
}

/// Resolve the view snapshot file for a document path
pub fn resolve_view_path(session_dir: &Path, document_path: &Path) -> PathBuf {
    view_dir_path(session_dir).join(escaped_file_name(document_path))
}

/// Build the default sessions directory from the process environment.
///
/// Prefers `$XDG_DATA_HOME`, then `$HOME/.local/share`, then the relative
/// `.dirsession` directory when neither is set.
pub fn default_session_dir() -> PathBuf {
    let data_home = std::env::var_os("XDG_DATA_HOME")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir().map(|home| home.join(".local").join("share")));

    match data_home {
        Some(dir) => dir.join(APP_NAME).join(session::SESSIONS_DIR_NAME),
        None => PathBuf::from(APP_DIR_NAME).join(session::SESSIONS_DIR_NAME),
    }
}

/// Get home directory path
pub fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .or_else(|| std::env::var("USERPROFILE").ok())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Build config directory path in user's home directory
pub fn user_config_dir_path(home_dir: &Path) -> PathBuf {
    home_dir.join(APP_DIR_NAME)
}

/// Build config file path in user's home directory
pub fn user_config_file_path(home_dir: &Path) -> PathBuf {
    user_config_dir_path(home_dir).join(CONFIG_FILE_NAME)
}

/// Build local config file path in current directory
pub fn local_config_file_path(current_dir: &Path) -> PathBuf {
    current_dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME)
}

/// True when `path` is a file that can be opened for reading
pub fn path_exists_and_readable(path: &Path) -> bool {
    path.is_file() && fs::File::open(path).is_ok()
}

/// Create `path` and all missing parents; existing directories are fine
pub fn make_directory(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

/// Delete a file. A file that is already gone counts as deleted.
pub fn delete_file(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
