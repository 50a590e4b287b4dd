//! Platform-specific path utilities for signin-guard.

use std::path::PathBuf;

use crate::error::{GuardError, Result};

const APP_DIR: &str = "signin-guard";

/// Get the configuration directory for signin-guard.
///
/// - Linux: `~/.config/signin-guard`
/// - macOS: `~/Library/Application Support/signin-guard`
/// - Windows: `%APPDATA%\signin-guard`
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir()
        .ok_or_else(|| GuardError::Config("Cannot determine config directory".to_string()))?;
    Ok(base.join(APP_DIR))
}

/// Get the data directory for signin-guard.
///
/// - Linux: `~/.local/share/signin-guard`
/// - macOS: `~/Library/Application Support/signin-guard`
/// - Windows: `%APPDATA%\signin-guard`
pub fn data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir()
        .ok_or_else(|| GuardError::Config("Cannot determine data directory".to_string()))?;
    Ok(base.join(APP_DIR))
}

/// Get the main configuration file path.
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Get the default directory holding one file per session.
pub fn sessions_dir() -> Result<PathBuf> {
    Ok(data_dir()?.join("sessions"))
}

