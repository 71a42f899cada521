//! Session engine configuration.
//!
//! The engine reads this once when the runtime is built and never mutates
//! it afterwards.

use crate::env;
use crate::view::CapturePolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirSessionConfig {
    /// Resume or create the working directory's session at startup
    pub auto_load: bool,
    /// Expose the SessionLoad/SessionStart/SessionStop commands
    pub create_commands: bool,
    /// Which documents get view snapshots; a boolean in TOML
    pub mkview: CapturePolicy,
    pub session_dir: PathBuf,
}

impl Default for DirSessionConfig {
    fn default() -> Self {
        Self {
            auto_load: true,
            create_commands: true,
            mkview: CapturePolicy::Never,
            session_dir: env::default_session_dir(),
        }
    }
}

impl DirSessionConfig {
    /// Replace the capture policy with a predicate over documents
    pub fn with_view_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&crate::host::Document) -> bool + 'static,
    {
        self.mkview = CapturePolicy::predicate(predicate);
        self
    }

    pub fn with_session_dir(mut self, session_dir: impl Into<PathBuf>) -> Self {
        self.session_dir = session_dir.into();
        self
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration TOML")
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Load from TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid configuration file: {}", path.display()))
    }

    /// Save to TOML file
    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write configuration: {}", path.display()))
    }
}
