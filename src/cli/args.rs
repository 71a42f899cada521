//! Command line argument parsing
//!
//! This module handles CLI argument parsing with subcommands:
//! - `shell`: Interactive editor shell with session tracking (the default)
//! - `path`: Print the session file for a directory, or the view file for a document
//! - `list`: List stored sessions
//! - `show-config`: Show configuration discovery information

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug)]
pub enum ExecutionMode {
    Shell(ShellConfig),
    Path(PathConfig),
    List { config_override: Option<PathBuf> },
    ShowConfig,
}

#[derive(Debug, Default)]
pub struct ShellConfig {
    pub files: Vec<PathBuf>,
    pub config_override: Option<PathBuf>,
    pub directory: Option<PathBuf>,
    pub session_dir: Option<PathBuf>,
    pub no_bootstrap: bool,
    pub verbose: bool,
}

#[derive(Debug)]
pub struct PathConfig {
    pub directory: Option<PathBuf>,
    pub view: Option<PathBuf>,
    pub config_override: Option<PathBuf>,
}

#[derive(Debug, Parser)]
#[command(name = "dirsession")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Per-directory sessions with automatic layout persistence")]
#[command(long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the interactive shell (default when no subcommand is given)
    Shell {
        /// Documents to open; disables the startup session policy
        files: Vec<PathBuf>,
        /// Working directory the session is derived from
        #[arg(short = 'C', long = "directory")]
        directory: Option<PathBuf>,
        /// Override the configured sessions directory
        #[arg(long = "session-dir")]
        session_dir: Option<PathBuf>,
        /// Do not load or start a session at startup
        #[arg(long = "no-bootstrap")]
        no_bootstrap: bool,
        /// Enable verbose output
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },
    /// Print the session file for a directory
    Path {
        /// Directory (defaults to the current one)
        directory: Option<PathBuf>,
        /// Print the view file for this document instead
        #[arg(long = "view", value_name = "FILE", conflicts_with = "directory")]
        view: Option<PathBuf>,
    },
    /// List stored sessions
    List,
    /// Show configuration discovery information
    ShowConfig,
}

impl Args {
    pub fn parse() -> Self {
        Parser::parse()
    }

    pub fn mode(&self) -> Result<ExecutionMode, String> {
        let config_override = self.config.clone();
        match &self.command {
            Some(Commands::Shell {
                files,
                directory,
                session_dir,
                no_bootstrap,
                verbose,
            }) => Ok(ExecutionMode::Shell(ShellConfig {
                files: files.clone(),
                config_override,
                directory: directory.clone(),
                session_dir: session_dir.clone(),
                no_bootstrap: *no_bootstrap,
                verbose: *verbose,
            })),
            Some(Commands::Path { directory, view }) => {
                if let Some(view) = view
                    && view.as_os_str().is_empty()
                {
                    return Err("--view needs a document path".to_string());
                }
                Ok(ExecutionMode::Path(PathConfig {
                    directory: directory.clone(),
                    view: view.clone(),
                    config_override,
                }))
            }
            Some(Commands::List) => Ok(ExecutionMode::List { config_override }),
            Some(Commands::ShowConfig) => Ok(ExecutionMode::ShowConfig),
            None => Ok(ExecutionMode::Shell(ShellConfig {
                config_override,
                ..ShellConfig::default()
            })),
        }
    }
}
