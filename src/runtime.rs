//! # Application runtime
//!
//! [`Runtime`] is the top-level context of a dirsession-enabled host. It
//! owns the host, the lifecycle [`EventBus`] and the [`SessionManager`], arms
//! the [`ViewSnapshotManager`] hooks once, and it is the only place that moves
//! events from the host into the bus. Exit is a host event like any other:
//! the host queues `AppExit` and [`Runtime::pump`] dispatches it.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                   Runtime                    │
//! │  ┌──────────┐  drain  ┌──────────┐           │
//! │  │   Host   │ ──────▶ │ EventBus │           │
//! │  └──────────┘         └────┬─────┘           │
//! │        ▲          auto-save│  view hooks     │
//! │        │       ┌───────────┴───────────┐     │
//! │        └────── │ SessionManager  Views │     │
//! │                └───────────────────────┘     │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use dirsession::{DirSessionConfig, LayoutHost, Runtime};
//! use std::path::Path;
//!
//! let config = DirSessionConfig::default();
//! let mut runtime = Runtime::new(LayoutHost::new("/home/u/proj"), config);
//! runtime.start_up(false)?;
//!
//! runtime.host_mut().open(Path::new("a.lua"));
//! runtime.pump();
//! # Ok::<(), dirsession::SessionError>(())
//! ```

use crate::commands::{CommandError, SessionCommand};
use crate::config::DirSessionConfig;
use crate::events::EventBus;
use crate::host::{Host, NoticeLevel};
use crate::session::{
    BootstrapOutcome, SessionError, SessionManager, SessionStatus, bootstrap, list_sessions,
    should_bootstrap,
};
use crate::view::ViewSnapshotManager;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct Runtime<H: Host + 'static> {
    host: H,
    bus: EventBus<H>,
    sessions: SessionManager,
    config: DirSessionConfig,
}

impl<H: Host + 'static> Runtime<H> {
    /// Build the runtime and arm the view hooks
    pub fn new(host: H, config: DirSessionConfig) -> Self {
        let mut bus = EventBus::new();
        let sessions = SessionManager::new(config.session_dir.clone());
        let views = ViewSnapshotManager::new(config.session_dir.clone(), config.mkview.clone());
        views.arm(&mut bus);

        info!("Runtime initialized with sessions in {}", config.session_dir.display());
        Self {
            host,
            bus,
            sessions,
            config,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host access; call [`Runtime::pump`] afterwards so queued
    /// lifecycle events reach the hooks
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Run the startup policy once.
    ///
    /// `has_explicit_targets` is true when the process was launched with
    /// documents to open; the policy is skipped in that case.
    pub fn start_up(&mut self, has_explicit_targets: bool) -> Result<BootstrapOutcome, SessionError> {
        if !should_bootstrap(self.config.auto_load, has_explicit_targets) {
            debug!("Bootstrap skipped");
            return Ok(BootstrapOutcome::Skipped);
        }
        let result = bootstrap(&mut self.sessions, &mut self.host, &mut self.bus);
        self.pump();
        self.report(result)
    }

    pub fn load(&mut self, explicit: Option<&Path>, force: bool) -> Result<PathBuf, SessionError> {
        let result = self
            .sessions
            .load(&mut self.host, &mut self.bus, explicit, force);
        self.pump();
        result
    }

    pub fn start(&mut self, explicit: Option<&Path>, force: bool) -> Result<PathBuf, SessionError> {
        let result = self
            .sessions
            .start(&mut self.host, &mut self.bus, explicit, force);
        self.pump();
        result
    }

    pub fn stop(&mut self) -> Result<Option<PathBuf>, SessionError> {
        self.sessions.stop(&mut self.bus)
    }

    pub fn status(&self) -> SessionStatus {
        self.sessions.status()
    }

    /// Dispatch every event the host has queued, oldest first, until the
    /// queue stays empty. Returns the number of events dispatched.
    pub fn pump(&mut self) -> usize {
        let mut dispatched = 0;
        loop {
            let events = self.host.drain_events();
            if events.is_empty() {
                return dispatched;
            }
            for event in &events {
                self.bus.emit(event, &mut self.host);
                dispatched += 1;
            }
        }
    }

    /// Parse and run a command line; `None` if it is not a session command
    pub fn execute_line(&mut self, line: &str) -> Option<Result<String, CommandError>> {
        let command = match SessionCommand::parse(line)? {
            Ok(command) => command,
            Err(e) => return Some(self.report(Err(e))),
        };
        Some(self.execute(command))
    }

    /// Run `command`, reporting failures through the host
    pub fn execute(&mut self, command: SessionCommand) -> Result<String, CommandError> {
        let result = self.run_command(command);
        self.report(result)
    }

    fn run_command(&mut self, command: SessionCommand) -> Result<String, CommandError> {
        if !self.config.create_commands {
            return Err(CommandError::Unknown(command.name().to_string()));
        }

        match command {
            SessionCommand::Load { force, file } => {
                let path = self.load(file.as_deref(), force)?;
                Ok(format!("Loaded session {}", path.display()))
            }
            SessionCommand::Start { force, file } => {
                let path = self.start(file.as_deref(), force)?;
                Ok(format!("Tracking session {}", path.display()))
            }
            SessionCommand::Stop => match self.stop()? {
                Some(path) => Ok(format!("Removed session {}", path.display())),
                None => Ok("No session tracked".to_string()),
            },
            SessionCommand::Status => Ok(format_status(&self.status())),
            SessionCommand::List => {
                let entries =
                    list_sessions(self.sessions.session_dir()).map_err(CommandError::Catalog)?;
                if entries.is_empty() {
                    return Ok("No sessions stored".to_string());
                }
                let tracked = self.sessions.tracked_path();
                let lines: Vec<String> = entries
                    .iter()
                    .map(|entry| {
                        let marker = if tracked.as_deref() == Some(entry.path.as_path()) {
                            '*'
                        } else {
                            ' '
                        };
                        let directory = entry
                            .directory
                            .as_deref()
                            .map(|d| d.display().to_string())
                            .unwrap_or_default();
                        format!("{} {}  {}", marker, directory, entry.path.display())
                    })
                    .collect();
                Ok(lines.join("\n"))
            }
        }
    }

    fn report<T, E: std::fmt::Display>(&mut self, result: Result<T, E>) -> Result<T, E> {
        if let Err(e) = &result {
            self.host.notify(NoticeLevel::Error, &e.to_string());
        }
        result
    }
}

/// Human-readable session status
pub fn format_status(status: &SessionStatus) -> String {
    match &status.tracked {
        None => "No session tracked".to_string(),
        Some(path) => {
            let mut details = vec![
                format!(
                    "auto-save {}",
                    if status.is_auto_save_active { "on" } else { "off" }
                ),
                format!("{} auto-save(s)", status.auto_saves),
            ];
            if status.skipped_saves > 0 {
                details.push(format!("{} skipped", status.skipped_saves));
            }
            if let Some(last_save) = status.last_save {
                details.push(format!("last save {}", last_save.format("%Y-%m-%d %H:%M:%S UTC")));
            }
            format!("Tracking {} ({})", path.display(), details.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::LayoutHost;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    #[test]
    fn test_format_status() {
        let mut status = SessionStatus {
            tracked: None,
            is_auto_save_active: false,
            auto_saves: 0,
            skipped_saves: 0,
            last_save: None,
        };
        assert_eq!(format_status(&status), "No session tracked");

        status.tracked = Some(PathBuf::from("/s/%a.vim"));
        status.is_auto_save_active = true;
        status.auto_saves = 3;
        assert_eq!(
            format_status(&status),
            "Tracking /s/%a.vim (auto-save on, 3 auto-save(s))"
        );

        status.skipped_saves = 1;
        status.last_save = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).single();
        assert_eq!(
            format_status(&status),
            "Tracking /s/%a.vim (auto-save on, 3 auto-save(s), 1 skipped, last save 2026-01-02 03:04:05 UTC)"
        );
    }

    #[test]
    fn test_quit_saves_through_event_queue() {
        let temp_dir = TempDir::new().unwrap();
        let config = DirSessionConfig::default().with_session_dir(temp_dir.path());
        let mut runtime = Runtime::new(LayoutHost::new("/home/u/proj"), config);
        runtime.start(None, false).unwrap();

        runtime.host_mut().quit();
        assert_eq!(runtime.pump(), 1);
        assert_eq!(runtime.status().auto_saves, 1);
    }
}
