//! Host application seam.
//!
//! The session engine never looks inside the host's layout format. It only
//! calls the primitives listed on [`Host`]: save and restore a layout
//! snapshot, save and restore a per-document view, adjust the view capture
//! scope, and report notices to the user.

pub mod layout;

pub use layout::{Cursor, FoldRange, InputMode, LayoutHost};

use crate::events::Event;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Host-assigned document handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub u32);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A document as seen by lifecycle hooks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: DocumentId,
    /// `None` for scratch documents that were never associated with a file
    pub path: Option<PathBuf>,
}

impl Document {
    pub fn new(id: DocumentId, path: Option<PathBuf>) -> Self {
        Self { id, path }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Pieces of per-document state a view snapshot may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewItem {
    Cursor,
    Folds,
    Options,
    CurDir,
}

/// The set of [`ViewItem`]s the host includes when it writes a view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewScope(BTreeSet<ViewItem>);

impl ViewScope {
    pub fn new(items: impl IntoIterator<Item = ViewItem>) -> Self {
        Self(items.into_iter().collect())
    }

    /// Cursor position and folds only
    pub fn cursor_and_folds() -> Self {
        Self::new([ViewItem::Cursor, ViewItem::Folds])
    }

    pub fn contains(&self, item: ViewItem) -> bool {
        self.0.contains(&item)
    }

    pub fn items(&self) -> impl Iterator<Item = ViewItem> + '_ {
        self.0.iter().copied()
    }
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new([
            ViewItem::Cursor,
            ViewItem::Folds,
            ViewItem::Options,
            ViewItem::CurDir,
        ])
    }
}

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Warn,
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Warn => "warn",
            NoticeLevel::Error => "error",
        };
        f.write_str(label)
    }
}

/// Primitives the session engine needs from the host application
pub trait Host {
    /// Working directory the default session is derived from
    fn current_dir(&self) -> anyhow::Result<PathBuf>;

    /// Serialize the current document/window layout to `path`
    fn save_snapshot(&mut self, path: &Path) -> anyhow::Result<()>;

    /// Rebuild the layout stored at `path`.
    ///
    /// Reopening documents may queue further lifecycle events; they are
    /// returned by [`Host::drain_events`].
    fn restore_snapshot(&mut self, path: &Path) -> anyhow::Result<()>;

    /// Write the view of `document` to `path`, limited to [`Host::view_scope`]
    fn save_view(&mut self, document: &Document, path: &Path) -> anyhow::Result<()>;

    /// Apply the view stored at `path` to `document`
    fn load_view(&mut self, document: &Document, path: &Path) -> anyhow::Result<()>;

    fn view_scope(&self) -> ViewScope;

    fn set_view_scope(&mut self, scope: ViewScope);

    /// True while input is captured by an overlay (e.g. command-line entry)
    /// in which a full snapshot cannot be taken
    fn in_restricted_mode(&self) -> bool;

    /// Report a message to the user
    fn notify(&mut self, level: NoticeLevel, message: &str);

    /// Lifecycle events queued by the host since the last call, oldest first
    fn drain_events(&mut self) -> Vec<Event> {
        Vec::new()
    }
}
