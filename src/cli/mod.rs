//! CLI-specific functionality for dirsession
//!
//! This module contains all CLI-related code including argument parsing,
//! configuration discovery and the interactive editor shell.

pub mod args;
pub mod config;
pub mod shell;

pub use args::{Args, ExecutionMode, PathConfig, ShellConfig};
pub use config::ConfigDiscovery;
pub use shell::{Shell, ShellAction};
