// ReviewBadge settings location on macOS
// Config: ~/Library/Application Support/ReviewBadge

use std::env;
use std::path::PathBuf;

/// `~/Library/Application Support/ReviewBadge`
pub fn get_config_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
        .join("Library")
        .join("Application Support")
        .join("ReviewBadge")
}
