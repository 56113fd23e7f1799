// Bookmark store platform paths
// Linux:   $XDG_CONFIG_HOME/bookmark-store or ~/.config/bookmark-store
// macOS:   ~/Library/Application Support/bookmark-store
// Windows: %APPDATA%/bookmark-store

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "bookmark-store";

#[cfg(not(target_os = "windows"))]
fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Returns the platform-specific configuration directory for the bookmark store.
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let appdata = env::var("APPDATA")
            .unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
        PathBuf::from(appdata).join(APP_DIR)
    }
    #[cfg(target_os = "macos")]
    {
        home_dir()
            .join("Library")
            .join("Application Support")
            .join(APP_DIR)
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        match env::var("XDG_CONFIG_HOME") {
            Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join(APP_DIR),
            _ => home_dir().join(".config").join(APP_DIR),
        }
    }
}
