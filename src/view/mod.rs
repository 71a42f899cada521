//! Per-document view snapshots.
//!
//! When a document is closed, or the application exits, its cursor and
//! folds are written to a view file derived from the document path. When
//! the document is opened again the view file is applied. These hooks run
//! whether or not a session is tracked.

pub mod policy;

pub use policy::CapturePolicy;

use crate::env;
use crate::events::{Event, EventBus, EventKind};
use crate::host::{Document, Host, ViewScope};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, warn};

/// Events that write a view snapshot
pub const CAPTURE_EVENTS: [EventKind; 2] = [EventKind::DocumentLeave, EventKind::AppExit];

/// Events that restore a view snapshot
pub const RESTORE_EVENTS: [EventKind; 1] = [EventKind::DocumentOpen];

/// What a view hook did for one document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewOutcome {
    Restored,
    Captured,
    /// Policy declined, or the document has no path
    Skipped,
    /// View file missing or unusable; this is the normal first-open case
    RestoreFailed,
    CaptureFailed,
}

/// Saves and restores view snapshots under `session_dir/view`
#[derive(Debug, Clone)]
pub struct ViewSnapshotManager {
    inner: Rc<ViewSettings>,
}

#[derive(Debug)]
struct ViewSettings {
    session_dir: PathBuf,
    policy: CapturePolicy,
}

impl ViewSnapshotManager {
    pub fn new(session_dir: impl Into<PathBuf>, policy: CapturePolicy) -> Self {
        Self {
            inner: Rc::new(ViewSettings {
                session_dir: session_dir.into(),
                policy,
            }),
        }
    }

    pub fn policy(&self) -> &CapturePolicy {
        &self.inner.policy
    }

    pub fn view_path(&self, document_path: &Path) -> PathBuf {
        env::resolve_view_path(&self.inner.session_dir, document_path)
    }

    /// Register the open and close hooks in the view group.
    ///
    /// Re-arming replaces earlier registrations. A `Never` policy leaves the
    /// group empty.
    pub fn arm<H: Host + 'static>(&self, bus: &mut EventBus<H>) {
        let group = bus.group(env::session::VIEW_GROUP_NAME);
        bus.disarm(group);

        if self.inner.policy.is_never() {
            debug!("View snapshots disabled");
            return;
        }

        let restore = self.clone();
        bus.arm(group, &RESTORE_EVENTS, move |event: &Event, host: &mut H| {
            if let Some(document) = &event.document {
                restore.restore(host, document);
            }
        });

        let capture = self.clone();
        bus.arm(group, &CAPTURE_EVENTS, move |event: &Event, host: &mut H| {
            if let Some(document) = &event.document {
                capture.capture(host, document);
            }
        });
    }

    /// Apply the stored view of `document`, swallowing any failure
    pub fn restore<H: Host>(&self, host: &mut H, document: &Document) -> ViewOutcome {
        let Some(path) = self.target(document) else {
            return ViewOutcome::Skipped;
        };

        match host.load_view(document, &path) {
            Ok(()) => {
                debug!("Restored view for {} from {}", document.id, path.display());
                ViewOutcome::Restored
            }
            Err(e) => {
                debug!("No usable view for {}: {:#}", document.id, e);
                ViewOutcome::RestoreFailed
            }
        }
    }

    /// Write the cursor and folds of `document` to its view file.
    ///
    /// The host's view scope is narrowed for the write and put back
    /// afterwards, whether or not the write succeeded.
    pub fn capture<H: Host>(&self, host: &mut H, document: &Document) -> ViewOutcome {
        let Some(path) = self.target(document) else {
            return ViewOutcome::Skipped;
        };

        let view_dir = env::view_dir_path(&self.inner.session_dir);
        if let Err(e) = env::make_directory(&view_dir) {
            warn!("Failed to create view directory {}: {}", view_dir.display(), e);
            return ViewOutcome::CaptureFailed;
        }

        let prior = host.view_scope();
        host.set_view_scope(ViewScope::cursor_and_folds());
        let result = host.save_view(document, &path);
        host.set_view_scope(prior);

        match result {
            Ok(()) => {
                debug!("Saved view for {} to {}", document.id, path.display());
                ViewOutcome::Captured
            }
            Err(e) => {
                warn!("Failed to save view for {}: {:#}", document.id, e);
                ViewOutcome::CaptureFailed
            }
        }
    }

    fn target(&self, document: &Document) -> Option<PathBuf> {
        let document_path = document.path()?;
        if !self.inner.policy.should_capture(document) {
            return None;
        }
        Some(self.view_path(document_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Cursor, FoldRange, LayoutHost, ViewItem};
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, LayoutHost, ViewSnapshotManager) {
        let temp_dir = TempDir::new().unwrap();
        let views = ViewSnapshotManager::new(temp_dir.path(), CapturePolicy::Always);
        (temp_dir, LayoutHost::new("/home/u/proj"), views)
    }

    #[test]
    fn test_capture_then_restore_cursor() {
        let (_temp_dir, mut host, views) = setup();
        let document = host.open(Path::new("a.lua"));
        host.set_cursor(42, 3).unwrap();
        host.add_fold(10, 20).unwrap();

        assert_eq!(views.capture(&mut host, &document), ViewOutcome::Captured);
        assert!(views.view_path(Path::new("/home/u/proj/a.lua")).is_file());

        host.set_cursor(1, 0).unwrap();
        assert_eq!(views.restore(&mut host, &document), ViewOutcome::Restored);
        assert_eq!(
            host.cursor(Path::new("a.lua")),
            Some(Cursor { line: 42, column: 3 })
        );
        assert_eq!(
            host.folds(Path::new("a.lua")),
            vec![FoldRange { start: 10, end: 20 }]
        );
    }

    #[test]
    fn test_capture_restores_prior_scope() {
        let (_temp_dir, mut host, views) = setup();
        let document = host.open(Path::new("a.lua"));
        let before = host.view_scope();
        assert!(before.contains(ViewItem::Options));

        views.capture(&mut host, &document);
        assert_eq!(host.view_scope(), before);
    }

    #[test]
    fn test_failed_capture_restores_prior_scope() {
        let (_temp_dir, mut host, views) = setup();
        let document = host.open(Path::new("a.lua"));
        let path = views.view_path(Path::new("/home/u/proj/a.lua"));
        fs::create_dir_all(&path).unwrap();
        let before = host.view_scope();

        assert_eq!(views.capture(&mut host, &document), ViewOutcome::CaptureFailed);
        assert_eq!(host.view_scope(), before);
        assert!(path.is_dir());
    }

    #[test]
    fn test_view_file_holds_only_cursor_and_folds() {
        let (_temp_dir, mut host, views) = setup();
        let document = host.open(Path::new("a.lua"));
        host.set_option("spell", "true").unwrap();
        views.capture(&mut host, &document);

        let content = fs::read_to_string(views.view_path(Path::new("/home/u/proj/a.lua"))).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("cursor"));
        assert!(object.contains_key("folds"));
        assert!(!object.contains_key("options"));
        assert!(!object.contains_key("cwd"));
    }

    #[test]
    fn test_missing_view_is_swallowed() {
        let (_temp_dir, mut host, views) = setup();
        let document = host.open(Path::new("new.lua"));

        assert_eq!(views.restore(&mut host, &document), ViewOutcome::RestoreFailed);
        assert_eq!(host.cursor(Path::new("new.lua")), Some(Cursor::default()));
    }

    #[test]
    fn test_corrupt_view_is_swallowed() {
        let (_temp_dir, mut host, views) = setup();
        let document = host.open(Path::new("a.lua"));
        let path = views.view_path(Path::new("/home/u/proj/a.lua"));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        assert_eq!(views.restore(&mut host, &document), ViewOutcome::RestoreFailed);
    }

    #[test]
    fn test_scratch_documents_are_skipped() {
        let (_temp_dir, mut host, views) = setup();
        let scratch = host.open_scratch();

        assert_eq!(views.capture(&mut host, &scratch), ViewOutcome::Skipped);
        assert_eq!(views.restore(&mut host, &scratch), ViewOutcome::Skipped);
    }

    #[test]
    fn test_predicate_gates_both_directions() {
        let temp_dir = TempDir::new().unwrap();
        let policy = CapturePolicy::predicate(|document: &Document| {
            document
                .path()
                .and_then(|p| p.extension())
                .is_some_and(|ext| ext == "lua")
        });
        let views = ViewSnapshotManager::new(temp_dir.path(), policy);
        let mut host = LayoutHost::new("/home/u/proj");

        let text = host.open(Path::new("notes.txt"));
        assert_eq!(views.capture(&mut host, &text), ViewOutcome::Skipped);
        assert_eq!(views.restore(&mut host, &text), ViewOutcome::Skipped);

        let lua = host.open(Path::new("init.lua"));
        assert_eq!(views.capture(&mut host, &lua), ViewOutcome::Captured);
    }

    #[test]
    fn test_never_policy_arms_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let views = ViewSnapshotManager::new(temp_dir.path(), CapturePolicy::Never);
        let mut bus: EventBus<LayoutHost> = EventBus::new();

        views.arm(&mut bus);
        let group = bus.group(env::session::VIEW_GROUP_NAME);
        assert_eq!(bus.hook_count(group), 0);
    }

    #[test]
    fn test_rearm_replaces_hooks() {
        let (_temp_dir, _host, views) = setup();
        let mut bus: EventBus<LayoutHost> = EventBus::new();

        views.arm(&mut bus);
        views.arm(&mut bus);
        let group = bus.group(env::session::VIEW_GROUP_NAME);
        assert_eq!(bus.hook_count(group), 2);
    }
}
