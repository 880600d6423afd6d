// Bookmark Audit platform paths for Linux
// Data: ~/.local/share/bookmark-audit

use std::env;
use std::path::PathBuf;

/// Returns the data directory on Linux.
/// Uses `$XDG_DATA_HOME/bookmark-audit` if set, otherwise `~/.local/share/bookmark-audit`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("bookmark-audit"),
        _ => {
            let home = env::var("HOME").unwrap_or_else(|_| String::from("/tmp"));
            PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("bookmark-audit")
        }
    }
}
