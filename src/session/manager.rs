use crate::env;
use crate::events::{EventBus, EventGroup, EventKind};
use crate::host::{Host, NoticeLevel};
use crate::session::types::*;
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Lifecycle moments that trigger an auto-save of the tracked session
pub const AUTO_SAVE_EVENTS: [EventKind; 2] = [EventKind::DocumentEnter, EventKind::AppExit];

/// Tracks at most one session and keeps it saved while tracked.
///
/// The tracking record is shared with the auto-save hook, so the hook
/// always writes to whatever path is tracked when the event fires.
pub struct SessionManager {
    session_dir: PathBuf,
    tracker: Rc<RefCell<Tracker>>,
}

#[derive(Debug, Default)]
struct Tracker {
    state: TrackingState,
    armed: bool,
    auto_saves: u64,
    skipped_saves: u64,
    last_save: Option<DateTime<Utc>>,
}

impl Tracker {
    fn record(&mut self, outcome: SaveOutcome) {
        match outcome {
            SaveOutcome::Saved => self.last_save = Some(Utc::now()),
            SaveOutcome::Skipped => self.skipped_saves += 1,
        }
    }
}

/// Save the host layout to `path`, unless the host is in a restricted mode
pub fn save_snapshot<H: Host>(host: &mut H, path: &Path) -> Result<SaveOutcome, SessionError> {
    if host.in_restricted_mode() {
        debug!("Skipping session save in restricted mode: {}", path.display());
        return Ok(SaveOutcome::Skipped);
    }

    host.save_snapshot(path)
        .map_err(|e| SessionError::host("save snapshot to", path, e))?;
    Ok(SaveOutcome::Saved)
}

impl SessionManager {
    /// Create a manager storing derived session files under `session_dir`
    pub fn new(session_dir: impl Into<PathBuf>) -> Self {
        Self {
            session_dir: session_dir.into(),
            tracker: Rc::new(RefCell::new(Tracker::default())),
        }
    }

    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    pub fn state(&self) -> TrackingState {
        self.tracker.borrow().state.clone()
    }

    pub fn tracked_path(&self) -> Option<PathBuf> {
        self.tracker.borrow().state.path().map(Path::to_path_buf)
    }

    /// Get current session status
    pub fn status(&self) -> SessionStatus {
        let tracker = self.tracker.borrow();
        SessionStatus {
            tracked: tracker.state.path().map(Path::to_path_buf),
            is_auto_save_active: tracker.armed,
            auto_saves: tracker.auto_saves,
            skipped_saves: tracker.skipped_saves,
            last_save: tracker.last_save,
        }
    }

    /// Resolve the session file for `explicit`, or for the host's working directory
    pub fn resolve<H: Host>(&self, host: &H, explicit: Option<&Path>) -> Result<PathBuf, SessionError> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        let cwd = host
            .current_dir()
            .map_err(|e| SessionError::host("determine working directory for", &self.session_dir, e))?;
        Ok(env::resolve_session_path(&self.session_dir, None, &cwd))
    }

    /// Restore an existing session and start tracking it.
    ///
    /// Fails with [`SessionError::NotReadable`] when the file cannot be
    /// read, and with [`SessionError::AlreadyTracked`] when the same file
    /// is already tracked and `force` is false.
    pub fn load<H: Host + 'static>(
        &mut self,
        host: &mut H,
        bus: &mut EventBus<H>,
        explicit: Option<&Path>,
        force: bool,
    ) -> Result<PathBuf, SessionError> {
        let target = self.resolve(host, explicit)?;

        if !env::path_exists_and_readable(&target) {
            return Err(SessionError::NotReadable { path: target });
        }
        if !force && self.tracker.borrow().state.is_tracking(&target) {
            return Err(SessionError::AlreadyTracked { path: target });
        }

        info!("Loading session: {}", target.display());
        host.restore_snapshot(&target)
            .map_err(|e| SessionError::host("restore snapshot from", &target, e))?;

        self.track(bus, target.clone());
        Ok(target)
    }

    /// Write a fresh session file and start tracking it.
    ///
    /// An existing file at the target is overwritten. Only an identical
    /// tracked target is rejected, unless `force` is set.
    pub fn start<H: Host + 'static>(
        &mut self,
        host: &mut H,
        bus: &mut EventBus<H>,
        explicit: Option<&Path>,
        force: bool,
    ) -> Result<PathBuf, SessionError> {
        let target = self.resolve(host, explicit)?;

        if !force && self.tracker.borrow().state.is_tracking(&target) {
            return Err(SessionError::AlreadyTracked { path: target });
        }

        if let Some(parent) = target.parent()
            && !parent.as_os_str().is_empty()
        {
            env::make_directory(parent)
                .map_err(|e| SessionError::io("creating session directory", parent, e))?;
        }

        info!("Starting session: {}", target.display());
        let outcome = save_snapshot(host, &target)?;
        if outcome == SaveOutcome::Skipped {
            warn!(
                "Session {} is tracked but was not written yet (restricted mode)",
                target.display()
            );
        }
        self.tracker.borrow_mut().record(outcome);

        self.track(bus, target.clone());
        Ok(target)
    }

    /// Stop tracking and delete the tracked session file.
    ///
    /// Returns the deleted path, or `None` when nothing was tracked.
    pub fn stop<H>(&mut self, bus: &mut EventBus<H>) -> Result<Option<PathBuf>, SessionError> {
        let group = self.auto_group(bus);
        let tracked = self.tracked_path();

        if let Some(path) = &tracked {
            env::delete_file(path).map_err(|e| SessionError::io("deleting session file", path, e))?;
            info!("Stopped session: {}", path.display());
        } else {
            debug!("Stop requested with no tracked session");
        }

        bus.disarm(group);
        let mut tracker = self.tracker.borrow_mut();
        tracker.state = TrackingState::Untracked;
        tracker.armed = false;
        Ok(tracked)
    }

    fn auto_group<H>(&self, bus: &mut EventBus<H>) -> EventGroup {
        bus.group(env::session::AUTO_GROUP_NAME)
    }

    fn track<H: Host + 'static>(&mut self, bus: &mut EventBus<H>, target: PathBuf) {
        {
            let mut tracker = self.tracker.borrow_mut();
            tracker.state = TrackingState::Tracked(target);
            tracker.armed = true;
            tracker.auto_saves = 0;
        }

        let group = self.auto_group(bus);
        bus.disarm(group);

        let tracker = Rc::clone(&self.tracker);
        bus.arm(group, &AUTO_SAVE_EVENTS, move |event, host: &mut H| {
            let tracked = tracker.borrow().state.path().map(Path::to_path_buf);
            let Some(path) = tracked else {
                return;
            };
            match save_snapshot(host, &path) {
                Ok(outcome) => {
                    let mut tracker = tracker.borrow_mut();
                    tracker.record(outcome);
                    if outcome == SaveOutcome::Saved {
                        tracker.auto_saves += 1;
                    }
                    debug!("Auto-save on {}: {:?}", event.kind, outcome);
                }
                Err(e) => {
                    warn!("Auto-save on {} failed: {}", event.kind, e);
                    host.notify(NoticeLevel::Warn, &format!("Auto-save failed: {}", e));
                }
            }
        });
    }
}
