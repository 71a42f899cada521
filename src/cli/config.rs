//! Configuration discovery and loading
//!
//! This module handles the configuration discovery hierarchy:
//! 1. Current directory: ./dirsession.toml or ./.dirsession/config.toml
//! 2. User config: ~/.dirsession/config.toml
//! 3. System config: /etc/dirsession/config.toml
//! 4. Built-in defaults

use crate::{DirSessionConfig, env};
use anyhow::{Context, Result};
use std::env as std_env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Configuration discovery system
pub struct ConfigDiscovery;

impl ConfigDiscovery {
    /// Discover and load configuration using the hierarchy
    pub fn discover_config() -> Result<DirSessionConfig> {
        if let Some(config_path) = Self::find_config_file() {
            info!("Loading configuration from: {:?}", config_path);
            return DirSessionConfig::from_toml_file(config_path);
        }

        info!("No configuration file found, using defaults");
        Ok(DirSessionConfig::default())
    }

    /// Load `config_override` when given, else discover
    pub fn load(config_override: Option<&Path>) -> Result<DirSessionConfig> {
        match config_override {
            Some(path) => {
                info!("Loading configuration override from: {:?}", path);
                DirSessionConfig::from_toml_file(path)
                    .with_context(|| format!("Failed to load config override {}", path.display()))
            }
            None => Self::discover_config(),
        }
    }

    /// Find configuration file using discovery hierarchy
    pub fn find_config_file() -> Option<PathBuf> {
        Self::first_existing(Self::get_config_candidates())
    }

    fn first_existing(candidates: Vec<PathBuf>) -> Option<PathBuf> {
        for candidate in candidates {
            debug!("Checking for config file: {:?}", candidate);
            if candidate.is_file() {
                debug!("Found config file: {:?}", candidate);
                return Some(candidate);
            }
        }

        debug!("No config file found in discovery hierarchy");
        None
    }

    /// Get list of configuration file candidates in priority order
    fn get_config_candidates() -> Vec<PathBuf> {
        let current_dir = std_env::current_dir().ok();
        let home_dir = env::home_dir();
        Self::candidates_for(current_dir.as_deref(), home_dir.as_deref())
    }

    fn candidates_for(current_dir: Option<&Path>, home_dir: Option<&Path>) -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        // 1. Current directory
        if let Some(current_dir) = current_dir {
            candidates.push(current_dir.join(env::LOCAL_CONFIG_FILE_NAME));
            candidates.push(env::local_config_file_path(current_dir));
        }

        // 2. User config
        if let Some(home_dir) = home_dir {
            candidates.push(env::user_config_file_path(home_dir));
        }

        // 3. System config (Unix-like systems)
        #[cfg(unix)]
        candidates.push(PathBuf::from("/etc/dirsession/config.toml"));

        #[cfg(windows)]
        if let Ok(program_data) = std_env::var("PROGRAMDATA") {
            candidates.push(
                PathBuf::from(program_data)
                    .join(env::APP_NAME)
                    .join(env::CONFIG_FILE_NAME),
            );
        }

        candidates
    }

    /// Show configuration discovery information for debugging
    pub fn show_discovery_info() {
        println!("Configuration Discovery Hierarchy:");
        println!();

        let candidates = Self::get_config_candidates();
        for (i, candidate) in candidates.iter().enumerate() {
            let status = if candidate.exists() {
                if candidate.is_file() {
                    "✓ EXISTS"
                } else {
                    "✗ NOT A FILE"
                }
            } else {
                "✗ NOT FOUND"
            };

            println!("  {}. {:?} - {}", i + 1, candidate, status);
        }

        println!();
        match Self::find_config_file() {
            Some(found) => println!("Active configuration: {:?}", found),
            None => println!("Active configuration: Built-in defaults"),
        }

        match Self::discover_config() {
            Ok(config) => println!("Sessions directory: {}", config.session_dir.display()),
            Err(e) => println!("Configuration error: {:#}", e),
        }
    }
}
