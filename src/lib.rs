//! # dirsession
//!
//! Per-directory sessions for interactive document-editing applications.
//! A session is a snapshot of the open-document layout tied to the working
//! directory; once tracked it is saved automatically on lifecycle events
//! and resumed on the next launch from the same directory.
//!
//! ## Architecture Overview
//!
//! - **[`env`]**: path derivation (`/home/u/proj` → `%home%u%proj.vim`) and
//!   filesystem helpers
//! - **[`session`]**: the tracked-session state machine, the startup policy
//!   and the session catalog
//! - **[`events`]**: lifecycle event bus with revocable hook groups
//! - **[`view`]**: per-document cursor/fold snapshots
//! - **[`host`]**: the seam to the host application, plus the reference
//!   [`LayoutHost`]
//! - **[`runtime`]**: the top-level context wiring all of the above
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dirsession::{CapturePolicy, DirSessionConfig, LayoutHost, Runtime};
//!
//! let mut config = DirSessionConfig::default();
//! config.mkview = CapturePolicy::Always;
//!
//! let mut runtime = Runtime::new(LayoutHost::new("/home/u/proj"), config);
//! let outcome = runtime.start_up(false)?;
//! println!("{:?}", outcome);
//! # Ok::<(), dirsession::SessionError>(())
//! ```

/// Path derivation and filesystem helpers.
pub mod env;

/// Session tracking, startup policy and stored-session listing.
pub mod session;

/// Lifecycle event bus.
pub mod events;

/// Per-document view snapshots.
pub mod view;

/// Host application seam and the reference layout host.
pub mod host;

/// Engine configuration.
pub mod config;

/// Session command parsing.
pub mod commands;

/// Top-level runtime context.
pub mod runtime;

// CLI module for command-line interface
pub mod cli;

pub use commands::{CommandError, SessionCommand};
pub use config::DirSessionConfig;
pub use events::{Event, EventBus, EventGroup, EventKind};
pub use host::{Document, DocumentId, Host, LayoutHost, NoticeLevel, ViewItem, ViewScope};
pub use runtime::Runtime;
pub use session::{
    BootstrapOutcome, SaveOutcome, SessionError, SessionManager, SessionStatus, TrackingState,
};
pub use view::{CapturePolicy, ViewOutcome, ViewSnapshotManager};
