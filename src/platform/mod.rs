// ReviewBadge platform abstraction
// Provides the platform-specific settings directory for Windows, macOS, and Linux.
//
// Uses `cfg(target_os)` for conditional compilation to select the correct
// platform-specific implementation at compile time.

use std::env;
use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Environment variable that replaces the platform config directory.
pub const CONFIG_DIR_ENV: &str = "REVIEWBADGE_CONFIG_DIR";

/// Returns the configuration directory for ReviewBadge.
///
/// `REVIEWBADGE_CONFIG_DIR` wins when set. Otherwise:
/// - **Linux**: `~/.config/reviewbadge` (or `$XDG_CONFIG_HOME/reviewbadge`)
/// - **macOS**: `~/Library/Application Support/ReviewBadge`
/// - **Windows**: `%APPDATA%/ReviewBadge`
pub fn get_config_dir() -> PathBuf {
    if let Ok(dir) = env::var(CONFIG_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    platform_config_dir()
}

fn platform_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}
