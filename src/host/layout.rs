//! File-backed reference host.
//!
//! `LayoutHost` models the parts of an editor the session engine cares
//! about: which documents are listed, which one is current, each
//! document's cursor, folds and local options, and whether input is
//! captured by the command line. It queues lifecycle events the way a real
//! editor would fire them; the runtime drains and dispatches them.

use super::{Document, DocumentId, Host, NoticeLevel, ViewItem, ViewScope};
use crate::events::{Event, EventKind};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Layout snapshot format version written by [`LayoutHost`]
pub const LAYOUT_FORMAT_VERSION: u32 = 1;

/// Cursor position, 1-based line and 0-based column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub line: u32,
    pub column: u32,
}

impl Default for Cursor {
    fn default() -> Self {
        Self { line: 1, column: 0 }
    }
}

/// Closed fold covering `start..=end` (1-based lines)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FoldRange {
    pub start: u32,
    pub end: u32,
}

/// Input mode of the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Command-line entry overlay; snapshots are not taken here
    CommandLine,
}

#[derive(Debug, Clone)]
struct DocumentState {
    document: Document,
    listed: bool,
    cursor: Cursor,
    folds: Vec<FoldRange>,
    options: BTreeMap<String, String>,
}

impl DocumentState {
    fn fresh(document: Document) -> Self {
        Self {
            document,
            listed: true,
            cursor: Cursor::default(),
            folds: Vec::new(),
            options: BTreeMap::new(),
        }
    }

    fn reset(&mut self) {
        self.listed = true;
        self.cursor = Cursor::default();
        self.folds.clear();
        self.options.clear();
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LayoutSnapshot {
    version: u32,
    cwd: PathBuf,
    documents: Vec<SnapshotDocument>,
    current: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotDocument {
    path: PathBuf,
    cursor: Cursor,
    folds: Vec<FoldRange>,
}

/// View file contents; absent fields were outside the capture scope
#[derive(Debug, Default, Serialize, Deserialize)]
struct ViewFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cursor: Option<Cursor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    folds: Option<Vec<FoldRange>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cwd: Option<PathBuf>,
}

/// In-memory editor layout with JSON snapshot files
#[derive(Debug)]
pub struct LayoutHost {
    cwd: PathBuf,
    documents: Vec<DocumentState>,
    current: Option<DocumentId>,
    next_id: u32,
    mode: InputMode,
    view_scope: ViewScope,
    pending: VecDeque<Event>,
    notices: Vec<(NoticeLevel, String)>,
}

impl LayoutHost {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            documents: Vec::new(),
            current: None,
            next_id: 1,
            mode: InputMode::Normal,
            view_scope: ViewScope::default(),
            pending: VecDeque::new(),
            notices: Vec::new(),
        }
    }

    /// Resolve `path` against the working directory
    pub fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    /// Open `path` and make it current.
    ///
    /// A document that was closed earlier is re-read: its in-memory view
    /// state is reset, as if loaded from disk again.
    pub fn open(&mut self, path: &Path) -> Document {
        let path = self.absolute(path);
        let existing = self
            .documents
            .iter()
            .position(|state| state.document.path.as_deref() == Some(path.as_path()));

        let document = match existing {
            Some(index) if self.documents[index].listed => {
                self.documents[index].document.clone()
            }
            Some(index) => {
                let state = &mut self.documents[index];
                state.reset();
                let document = state.document.clone();
                self.queue(EventKind::DocumentOpen, Some(document.clone()));
                document
            }
            None => {
                let document = Document::new(self.allocate_id(), Some(path));
                self.documents.push(DocumentState::fresh(document.clone()));
                self.queue(EventKind::DocumentOpen, Some(document.clone()));
                document
            }
        };

        self.make_current(&document);
        document
    }

    /// Open a document with no backing file
    pub fn open_scratch(&mut self) -> Document {
        let document = Document::new(self.allocate_id(), None);
        self.documents.push(DocumentState::fresh(document.clone()));
        self.queue(EventKind::DocumentOpen, Some(document.clone()));
        self.make_current(&document);
        document
    }

    /// Switch to an already listed document
    pub fn enter(&mut self, path: &Path) -> Result<Document> {
        let path = self.absolute(path);
        let document = self
            .listed_state(&path)
            .map(|state| state.document.clone())
            .with_context(|| format!("Document is not open: {}", path.display()))?;
        self.make_current(&document);
        Ok(document)
    }

    /// Close a listed document. Its state stays addressable until reopened.
    pub fn close(&mut self, path: &Path) -> Result<Document> {
        let path = self.absolute(path);
        let index = self
            .documents
            .iter()
            .position(|state| state.listed && state.document.path.as_deref() == Some(path.as_path()))
            .with_context(|| format!("Document is not open: {}", path.display()))?;

        self.documents[index].listed = false;
        let document = self.documents[index].document.clone();
        self.queue(EventKind::DocumentLeave, Some(document.clone()));

        if self.current == Some(document.id) {
            let next = self
                .documents
                .iter()
                .find(|state| state.listed)
                .map(|state| state.document.clone());
            self.current = None;
            if let Some(next) = next {
                self.make_current(&next);
            }
        }
        Ok(document)
    }

    /// Queue the exit event for the current document
    pub fn quit(&mut self) {
        let current = self.current_document();
        self.queue(EventKind::AppExit, current);
    }

    pub fn current_document(&self) -> Option<Document> {
        self.current
            .and_then(|id| self.state(id))
            .map(|state| state.document.clone())
    }

    /// Listed documents in opening order
    pub fn documents(&self) -> Vec<Document> {
        self.documents
            .iter()
            .filter(|state| state.listed)
            .map(|state| state.document.clone())
            .collect()
    }

    pub fn set_cursor(&mut self, line: u32, column: u32) -> Result<()> {
        let state = self.current_state_mut()?;
        state.cursor = Cursor { line, column };
        Ok(())
    }

    pub fn add_fold(&mut self, start: u32, end: u32) -> Result<()> {
        if end < start {
            bail!("Fold end {} is before start {}", end, start);
        }
        let state = self.current_state_mut()?;
        let fold = FoldRange { start, end };
        if !state.folds.contains(&fold) {
            state.folds.push(fold);
            state.folds.sort();
        }
        Ok(())
    }

    pub fn set_option(&mut self, name: &str, value: &str) -> Result<()> {
        let state = self.current_state_mut()?;
        state.options.insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn cursor(&self, path: &Path) -> Option<Cursor> {
        let path = self.absolute(path);
        self.any_state(&path).map(|state| state.cursor)
    }

    pub fn folds(&self, path: &Path) -> Vec<FoldRange> {
        let path = self.absolute(path);
        self.any_state(&path)
            .map(|state| state.folds.clone())
            .unwrap_or_default()
    }

    pub fn option(&self, path: &Path, name: &str) -> Option<String> {
        let path = self.absolute(path);
        self.any_state(&path)
            .and_then(|state| state.options.get(name).cloned())
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: InputMode) {
        self.mode = mode;
    }

    pub fn set_cwd(&mut self, cwd: impl Into<PathBuf>) {
        self.cwd = cwd.into();
    }

    pub fn notices(&self) -> &[(NoticeLevel, String)] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<(NoticeLevel, String)> {
        std::mem::take(&mut self.notices)
    }

    fn allocate_id(&mut self) -> DocumentId {
        let id = DocumentId(self.next_id);
        self.next_id += 1;
        id
    }

    fn queue(&mut self, kind: EventKind, document: Option<Document>) {
        self.pending.push_back(Event::new(kind, document));
    }

    fn make_current(&mut self, document: &Document) {
        if self.current != Some(document.id) {
            self.current = Some(document.id);
            self.queue(EventKind::DocumentEnter, Some(document.clone()));
        }
    }

    fn state(&self, id: DocumentId) -> Option<&DocumentState> {
        self.documents.iter().find(|state| state.document.id == id)
    }

    fn state_mut(&mut self, id: DocumentId) -> Option<&mut DocumentState> {
        self.documents
            .iter_mut()
            .find(|state| state.document.id == id)
    }

    fn listed_state(&self, path: &Path) -> Option<&DocumentState> {
        self.documents
            .iter()
            .find(|state| state.listed && state.document.path.as_deref() == Some(path))
    }

    fn any_state(&self, path: &Path) -> Option<&DocumentState> {
        self.documents
            .iter()
            .find(|state| state.document.path.as_deref() == Some(path))
    }

    fn current_state_mut(&mut self) -> Result<&mut DocumentState> {
        let id = self.current.context("No current document")?;
        self.state_mut(id).context("Current document vanished")
    }

    fn capture_layout(&self) -> LayoutSnapshot {
        let documents = self
            .documents
            .iter()
            .filter(|state| state.listed)
            .filter_map(|state| {
                state.document.path.clone().map(|path| SnapshotDocument {
                    path,
                    cursor: state.cursor,
                    folds: state.folds.clone(),
                })
            })
            .collect();

        LayoutSnapshot {
            version: LAYOUT_FORMAT_VERSION,
            cwd: self.cwd.clone(),
            documents,
            current: self.current_document().and_then(|document| document.path),
        }
    }
}

impl Host for LayoutHost {
    fn current_dir(&self) -> Result<PathBuf> {
        Ok(self.cwd.clone())
    }

    fn save_snapshot(&mut self, path: &Path) -> Result<()> {
        let snapshot = self.capture_layout();
        let content =
            serde_json::to_vec_pretty(&snapshot).context("Failed to serialize layout snapshot")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write layout snapshot: {}", path.display()))?;
        debug!(
            "Layout snapshot with {} document(s) written to {}",
            snapshot.documents.len(),
            path.display()
        );
        Ok(())
    }

    fn restore_snapshot(&mut self, path: &Path) -> Result<()> {
        let content = fs::read(path)
            .with_context(|| format!("Failed to read layout snapshot: {}", path.display()))?;
        let snapshot: LayoutSnapshot =
            serde_json::from_slice(&content).context("Failed to deserialize layout snapshot")?;

        if snapshot.version != LAYOUT_FORMAT_VERSION {
            warn!(
                "Layout snapshot version {} differs from {}",
                snapshot.version, LAYOUT_FORMAT_VERSION
            );
        }

        for state in &mut self.documents {
            let kept = state
                .document
                .path
                .as_ref()
                .is_some_and(|path| snapshot.documents.iter().any(|doc| &doc.path == path));
            if !kept {
                state.listed = false;
            }
        }
        self.current = None;

        for saved in &snapshot.documents {
            let document = self.open(&saved.path);
            if let Some(state) = self.state_mut(document.id) {
                state.cursor = saved.cursor;
                state.folds = saved.folds.clone();
            }
        }

        if let Some(current) = &snapshot.current {
            self.enter(current)?;
        }

        info!(
            "Restored layout with {} document(s) from {}",
            snapshot.documents.len(),
            path.display()
        );
        Ok(())
    }

    fn save_view(&mut self, document: &Document, path: &Path) -> Result<()> {
        let state = self
            .state(document.id)
            .with_context(|| format!("Unknown document {}", document.id))?;

        let scope = &self.view_scope;
        let view = ViewFile {
            cursor: scope.contains(ViewItem::Cursor).then_some(state.cursor),
            folds: scope
                .contains(ViewItem::Folds)
                .then(|| state.folds.clone()),
            options: scope
                .contains(ViewItem::Options)
                .then(|| state.options.clone()),
            cwd: scope.contains(ViewItem::CurDir).then(|| self.cwd.clone()),
        };

        let content = serde_json::to_vec_pretty(&view).context("Failed to serialize view")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write view file: {}", path.display()))?;
        Ok(())
    }

    fn load_view(&mut self, document: &Document, path: &Path) -> Result<()> {
        let content = fs::read(path)
            .with_context(|| format!("Failed to read view file: {}", path.display()))?;
        let view: ViewFile =
            serde_json::from_slice(&content).context("Failed to deserialize view file")?;

        let state = self
            .state_mut(document.id)
            .with_context(|| format!("Unknown document {}", document.id))?;
        if let Some(cursor) = view.cursor {
            state.cursor = cursor;
        }
        if let Some(folds) = view.folds {
            state.folds = folds;
        }
        if let Some(options) = view.options {
            state.options.extend(options);
        }
        if let Some(cwd) = view.cwd {
            self.cwd = cwd;
        }
        Ok(())
    }

    fn view_scope(&self) -> ViewScope {
        self.view_scope.clone()
    }

    fn set_view_scope(&mut self, scope: ViewScope) {
        self.view_scope = scope;
    }

    fn in_restricted_mode(&self) -> bool {
        self.mode == InputMode::CommandLine
    }

    fn notify(&mut self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Info => info!("{}", message),
            NoticeLevel::Warn => warn!("{}", message),
            NoticeLevel::Error => tracing::error!("{}", message),
        }
        self.notices.push((level, message.to_string()));
    }

    fn drain_events(&mut self) -> Vec<Event> {
        self.pending.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn kinds(host: &mut LayoutHost) -> Vec<EventKind> {
        host.drain_events().into_iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_open_queues_open_then_enter() {
        let mut host = LayoutHost::new("/work");
        host.open(Path::new("a.txt"));

        assert_eq!(
            kinds(&mut host),
            vec![EventKind::DocumentOpen, EventKind::DocumentEnter]
        );
        assert_eq!(
            host.current_document().and_then(|d| d.path),
            Some(PathBuf::from("/work/a.txt"))
        );
    }

    #[test]
    fn test_reopen_resets_view_state() {
        let mut host = LayoutHost::new("/work");
        let first = host.open(Path::new("a.txt"));
        host.set_cursor(12, 4).unwrap();
        host.close(Path::new("a.txt")).unwrap();
        host.drain_events();

        let second = host.open(Path::new("a.txt"));
        assert_eq!(first.id, second.id);
        assert_eq!(host.cursor(Path::new("a.txt")), Some(Cursor::default()));
        assert_eq!(
            kinds(&mut host),
            vec![EventKind::DocumentOpen, EventKind::DocumentEnter]
        );
    }

    #[test]
    fn test_close_moves_focus_to_next_listed() {
        let mut host = LayoutHost::new("/work");
        host.open(Path::new("a.txt"));
        host.open(Path::new("b.txt"));
        host.drain_events();

        host.close(Path::new("b.txt")).unwrap();
        assert_eq!(
            kinds(&mut host),
            vec![EventKind::DocumentLeave, EventKind::DocumentEnter]
        );
        assert_eq!(host.documents().len(), 1);
        assert!(host.close(Path::new("b.txt")).is_err());
    }

    #[test]
    fn test_snapshot_round_trip_rebuilds_layout() {
        let temp_dir = TempDir::new().unwrap();
        let snapshot = temp_dir.path().join("layout.vim");

        let mut host = LayoutHost::new("/work");
        host.open(Path::new("a.txt"));
        host.set_cursor(3, 1).unwrap();
        host.open(Path::new("b.txt"));
        host.open_scratch();
        host.enter(Path::new("a.txt")).unwrap();
        host.save_snapshot(&snapshot).unwrap();

        let mut restored = LayoutHost::new("/work");
        restored.restore_snapshot(&snapshot).unwrap();

        let paths: Vec<PathBuf> = restored
            .documents()
            .into_iter()
            .filter_map(|d| d.path)
            .collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("/work/a.txt"), PathBuf::from("/work/b.txt")]
        );
        assert_eq!(
            restored.cursor(Path::new("a.txt")),
            Some(Cursor { line: 3, column: 1 })
        );
        assert_eq!(
            restored.current_document().and_then(|d| d.path),
            Some(PathBuf::from("/work/a.txt"))
        );
    }

    #[test]
    fn test_repeated_snapshots_are_identical() {
        let temp_dir = TempDir::new().unwrap();
        let snapshot = temp_dir.path().join("layout.vim");

        let mut host = LayoutHost::new("/work");
        host.open(Path::new("a.txt"));
        host.save_snapshot(&snapshot).unwrap();
        let first = fs::read(&snapshot).unwrap();
        host.save_snapshot(&snapshot).unwrap();
        let second = fs::read(&snapshot).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_view_respects_scope() {
        let temp_dir = TempDir::new().unwrap();
        let view_path = temp_dir.path().join("a.view");

        let mut host = LayoutHost::new("/work");
        let document = host.open(Path::new("a.txt"));
        host.set_cursor(7, 2).unwrap();
        host.set_option("wrap", "false").unwrap();

        host.set_view_scope(ViewScope::cursor_and_folds());
        host.save_view(&document, &view_path).unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&fs::read(&view_path).unwrap()).unwrap();
        let keys: Vec<&String> = raw.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["cursor", "folds"]);
    }

    #[test]
    fn test_load_view_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut host = LayoutHost::new("/work");
        let document = host.open(Path::new("a.txt"));

        assert!(
            host.load_view(&document, &temp_dir.path().join("missing.vim"))
                .is_err()
        );
    }

    #[test]
    fn test_command_line_mode_is_restricted() {
        let mut host = LayoutHost::new("/work");
        assert!(!host.in_restricted_mode());
        host.set_mode(InputMode::CommandLine);
        assert!(host.in_restricted_mode());
    }
}
