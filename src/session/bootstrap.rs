//! Startup decision: resume the session for the working directory or
//! create one.

use crate::env;
use crate::events::EventBus;
use crate::host::Host;
use crate::session::manager::SessionManager;
use crate::session::types::SessionError;
use std::path::PathBuf;
use tracing::info;

/// What the startup policy did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Loaded(PathBuf),
    Started(PathBuf),
    /// Auto-load is off, or the process was given explicit targets
    Skipped,
}

/// Bootstrap runs only with auto-load enabled and no explicit target
pub fn should_bootstrap(auto_load: bool, has_explicit_targets: bool) -> bool {
    auto_load && !has_explicit_targets
}

/// Load the default session for the working directory when it is readable,
/// otherwise start a new one there.
pub fn bootstrap<H: Host + 'static>(
    sessions: &mut SessionManager,
    host: &mut H,
    bus: &mut EventBus<H>,
) -> Result<BootstrapOutcome, SessionError> {
    let default_path = sessions.resolve(host, None)?;

    if env::path_exists_and_readable(&default_path) {
        info!("Resuming session for working directory");
        sessions
            .load(host, bus, None, false)
            .map(BootstrapOutcome::Loaded)
    } else {
        info!("No session for working directory, starting one");
        sessions
            .start(host, bus, None, false)
            .map(BootstrapOutcome::Started)
    }
}
