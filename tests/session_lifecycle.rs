//! End-to-end session lifecycle through the runtime and the layout host
//!
//! These tests drive a [`Runtime`] the way an editor would: documents are
//! opened and closed on the host, queued lifecycle events are pumped, and the
//! resulting session and view files are inspected on disk.

use dirsession::host::Cursor;
use dirsession::{
    BootstrapOutcome, CapturePolicy, DirSessionConfig, LayoutHost, Runtime, SessionError,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CWD: &str = "/home/u/proj";

fn runtime(session_dir: &Path, mkview: CapturePolicy) -> Runtime<LayoutHost> {
    let mut config = DirSessionConfig::default().with_session_dir(session_dir);
    config.mkview = mkview;
    Runtime::new(LayoutHost::new(CWD), config)
}

fn session_file(session_dir: &Path) -> PathBuf {
    session_dir.join("%home%u%proj.vim")
}

fn view_file(session_dir: &Path) -> PathBuf {
    session_dir.join("view").join("%home%u%proj%a.lua.vim")
}

#[test]
fn test_first_launch_starts_then_relaunch_resumes() {
    let temp_dir = TempDir::new().unwrap();
    let sessions = temp_dir.path().join("sessions");

    let mut first = runtime(&sessions, CapturePolicy::Never);
    let outcome = first.start_up(false).unwrap();
    assert_eq!(outcome, BootstrapOutcome::Started(session_file(&sessions)));
    assert!(session_file(&sessions).is_file());

    first.host_mut().open(Path::new("a.lua"));
    first.host_mut().set_cursor(8, 1).unwrap();
    first.host_mut().open(Path::new("b.lua"));
    first.pump();
    first.host_mut().quit();
    first.pump();

    let mut second = runtime(&sessions, CapturePolicy::Never);
    let outcome = second.start_up(false).unwrap();
    assert_eq!(outcome, BootstrapOutcome::Loaded(session_file(&sessions)));

    let paths: Vec<PathBuf> = second
        .host()
        .documents()
        .into_iter()
        .filter_map(|d| d.path)
        .collect();
    assert_eq!(
        paths,
        vec![
            PathBuf::from("/home/u/proj/a.lua"),
            PathBuf::from("/home/u/proj/b.lua")
        ]
    );
    assert_eq!(
        second.host().cursor(Path::new("a.lua")),
        Some(Cursor { line: 8, column: 1 })
    );
    assert_eq!(
        second.sessions().tracked_path(),
        Some(session_file(&sessions))
    );
}

#[test]
fn test_explicit_targets_skip_bootstrap() {
    let temp_dir = TempDir::new().unwrap();
    let sessions = temp_dir.path().join("sessions");

    let mut runtime = runtime(&sessions, CapturePolicy::Never);
    assert_eq!(runtime.start_up(true).unwrap(), BootstrapOutcome::Skipped);
    assert!(runtime.sessions().tracked_path().is_none());
    assert!(!sessions.exists());
}

#[test]
fn test_view_snapshot_keeps_cursor_and_folds_only() {
    let temp_dir = TempDir::new().unwrap();
    let sessions = temp_dir.path().join("sessions");
    let mut runtime = runtime(&sessions, CapturePolicy::Always);

    runtime.host_mut().open(Path::new("a.lua"));
    runtime.host_mut().set_cursor(10, 3).unwrap();
    runtime.host_mut().add_fold(2, 4).unwrap();
    runtime.host_mut().set_option("wrap", "false").unwrap();
    runtime.host_mut().close(Path::new("a.lua")).unwrap();
    runtime.pump();

    let raw: serde_json::Value =
        serde_json::from_slice(&fs::read(view_file(&sessions)).unwrap()).unwrap();
    let mut keys: Vec<&String> = raw.as_object().unwrap().keys().collect();
    keys.sort();
    assert_eq!(keys, vec!["cursor", "folds"]);

    runtime.host_mut().open(Path::new("a.lua"));
    runtime.pump();
    assert_eq!(
        runtime.host().cursor(Path::new("a.lua")),
        Some(Cursor { line: 10, column: 3 })
    );
    assert_eq!(runtime.host().folds(Path::new("a.lua")).len(), 1);
    assert_eq!(runtime.host().option(Path::new("a.lua"), "wrap"), None);
}

#[test]
fn test_views_disabled_by_default() {
    let temp_dir = TempDir::new().unwrap();
    let sessions = temp_dir.path().join("sessions");
    let mut runtime = runtime(&sessions, CapturePolicy::Never);

    runtime.host_mut().open(Path::new("a.lua"));
    runtime.host_mut().close(Path::new("a.lua")).unwrap();
    runtime.pump();

    assert!(!view_file(&sessions).exists());
}

#[test]
fn test_predicate_limits_view_capture() {
    let temp_dir = TempDir::new().unwrap();
    let sessions = temp_dir.path().join("sessions");
    let config = DirSessionConfig::default()
        .with_session_dir(&sessions)
        .with_view_predicate(|document| {
            document
                .path()
                .is_some_and(|p| p.extension().is_some_and(|e| e == "rs"))
        });
    let mut runtime = Runtime::new(LayoutHost::new(CWD), config);

    runtime.host_mut().open(Path::new("a.lua"));
    runtime.host_mut().open(Path::new("main.rs"));
    runtime.host_mut().close(Path::new("a.lua")).unwrap();
    runtime.host_mut().close(Path::new("main.rs")).unwrap();
    runtime.pump();

    assert!(!view_file(&sessions).exists());
    assert!(sessions.join("view").join("%home%u%proj%main.rs.vim").is_file());
}

#[test]
fn test_stop_removes_session_but_not_views() {
    let temp_dir = TempDir::new().unwrap();
    let sessions = temp_dir.path().join("sessions");
    let mut runtime = runtime(&sessions, CapturePolicy::Always);

    runtime.start(None, false).unwrap();
    runtime.host_mut().open(Path::new("a.lua"));
    runtime.host_mut().close(Path::new("a.lua")).unwrap();
    runtime.pump();
    assert!(view_file(&sessions).is_file());

    assert_eq!(runtime.stop().unwrap(), Some(session_file(&sessions)));
    assert!(!session_file(&sessions).exists());
    assert!(view_file(&sessions).is_file());

    // No auto-save once the session is gone.
    runtime.host_mut().open(Path::new("b.lua"));
    runtime.pump();
    assert!(!session_file(&sessions).exists());
    assert_eq!(runtime.stop().unwrap(), None);
}

#[test]
fn test_restarting_does_not_duplicate_auto_save() {
    let temp_dir = TempDir::new().unwrap();
    let sessions = temp_dir.path().join("sessions");
    let mut runtime = runtime(&sessions, CapturePolicy::Never);

    runtime.start(None, false).unwrap();
    runtime.start(None, true).unwrap();
    runtime.load(None, true).unwrap();
    runtime.start(None, true).unwrap();

    runtime.host_mut().open(Path::new("a.lua"));
    runtime.pump();
    assert_eq!(runtime.status().auto_saves, 1);

    runtime.host_mut().open(Path::new("b.lua"));
    runtime.pump();
    assert_eq!(runtime.status().auto_saves, 2);
}

#[test]
fn test_start_without_force_rejects_tracked_target() {
    let temp_dir = TempDir::new().unwrap();
    let sessions = temp_dir.path().join("sessions");
    let mut runtime = runtime(&sessions, CapturePolicy::Never);

    runtime.start(None, false).unwrap();
    let err = runtime.start(None, false).unwrap_err();
    assert!(matches!(err, SessionError::AlreadyTracked { .. }));

    let err = runtime.load(None, false).unwrap_err();
    assert!(matches!(err, SessionError::AlreadyTracked { .. }));
}

#[test]
fn test_switching_sessions_moves_auto_save() {
    let temp_dir = TempDir::new().unwrap();
    let sessions = temp_dir.path().join("sessions");
    let other = temp_dir.path().join("other.session");
    let mut runtime = runtime(&sessions, CapturePolicy::Never);

    runtime.start(None, false).unwrap();
    runtime.start(Some(other.as_path()), false).unwrap();
    assert_eq!(runtime.sessions().tracked_path(), Some(other.clone()));

    let before = fs::read(session_file(&sessions)).unwrap();
    runtime.host_mut().open(Path::new("a.lua"));
    runtime.pump();

    assert_eq!(fs::read(session_file(&sessions)).unwrap(), before);
    let snapshot = fs::read_to_string(&other).unwrap();
    assert!(snapshot.contains("/home/u/proj/a.lua"));
}
