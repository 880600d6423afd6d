// Bookmark Audit platform abstraction
// Provides the platform-specific location of the audit database.
//
// Uses `cfg(target_os)` for conditional compilation to select the correct
// platform-specific implementation at compile time.

use std::path::{Path, PathBuf};

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "BOOKMARK_AUDIT_DATA_DIR";

/// File name of the audit database inside the data directory.
pub const DATABASE_FILE: &str = "bookmark-audit.db";

/// Returns the platform-specific data directory for the auditor.
///
/// - **Linux**: `~/.local/share/bookmark-audit` (or `$XDG_DATA_HOME/bookmark-audit`)
/// - **macOS**: `~/Library/Application Support/BookmarkAudit`
/// - **Windows**: `%APPDATA%/BookmarkAudit`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}

/// Database path under `override_dir` if given, else under the platform data dir.
pub fn database_path(override_dir: Option<&Path>) -> PathBuf {
    match override_dir {
        Some(dir) => dir.join(DATABASE_FILE),
        None => get_data_dir().join(DATABASE_FILE),
    }
}
