// Bookmark store preferences engine
// Loads and saves the settings document edited on the "General" preferences
// page, and provides the page's bookmark-related helpers.
// Settings are stored as a JSON file at the platform-specific config path.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{debug, info};

use crate::managers::bookmark_tree::BookmarkTree;
use crate::platform;
use crate::services::bookmarks_importer::ImportOptions;
use crate::types::bookmark::NodeId;
use crate::types::errors::{BookmarkError, SettingsError};
use crate::types::settings::{AppSettings, GeneralPreferences};

/// Scheme of home-page links that point at a bookmark folder.
pub const BOOKMARKS_SCHEME: &str = "bookmarks:";

/// Trait defining the preferences engine interface.
pub trait PreferencesEngineTrait {
    fn load(&mut self) -> Result<AppSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &AppSettings;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Preferences engine that persists settings as JSON on disk.
pub struct PreferencesEngine {
    config_path: String,
    settings: AppSettings,
}

impl PreferencesEngine {
    /// Creates a new PreferencesEngine.
    ///
    /// If `path_override` is `Some`, uses that path for the config file.
    /// Otherwise, uses the platform-specific config directory with `settings.json`.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = match path_override {
            Some(p) => p,
            None => platform::get_config_dir()
                .join("settings.json")
                .to_string_lossy()
                .to_string(),
        };

        Self {
            config_path,
            settings: AppSettings::default(),
        }
    }

    /// Builds an empty bookmark tree configured by the loaded settings.
    pub fn build_tree(&self) -> BookmarkTree {
        BookmarkTree::from_settings(&self.settings.bookmarks)
    }

    /// Applies the loaded bookmark settings to an existing tree. Returns the
    /// number of stale keywords cleared.
    pub fn apply_to_tree(&self, tree: &mut BookmarkTree) -> usize {
        tree.apply_settings(&self.settings.bookmarks)
    }

    /// Import options seeded from the loaded bookmark settings.
    pub fn import_options(&self) -> ImportOptions {
        ImportOptions::from_settings(&self.settings.bookmarks)
    }

    /// Points the home page at a bookmark and saves. Returns the new value.
    pub fn use_bookmark_as_home_page(&mut self, tree: &BookmarkTree, node: NodeId) -> Result<String, SettingsError> {
        let home_page = home_page_for_bookmark(tree, node)
            .map_err(|e| SettingsError::InvalidValue(e.to_string()))?;
        self.set_value("general.home_page", serde_json::Value::String(home_page.clone()))?;
        Ok(home_page)
    }

    /// Puts the home page back to its default value and saves.
    pub fn restore_home_page(&mut self) -> Result<(), SettingsError> {
        self.set_value(
            "general.home_page",
            serde_json::Value::String(GeneralPreferences::DEFAULT_HOME_PAGE.to_string()),
        )
    }
}

impl PreferencesEngineTrait for PreferencesEngine {
    /// Loads settings from the JSON config file.
    ///
    /// A missing file yields defaults; an unreadable or malformed one is an error.
    fn load(&mut self) -> Result<AppSettings, SettingsError> {
        let content = match fs::read_to_string(&self.config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", self.config_path);
                self.settings = AppSettings::default();
                return Ok(self.settings.clone());
            }
            Err(e) => {
                return Err(SettingsError::IoError(format!(
                    "Cannot read {}: {}",
                    self.config_path, e
                )));
            }
        };

        let settings: AppSettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Malformed settings in {}: {}", self.config_path, e))
        })?;
        info!(
            "Loaded settings from {} (keyword policy {:?}, duplicates allowed: {})",
            self.config_path, settings.bookmarks.keyword_policy, settings.bookmarks.allow_duplicates
        );
        self.settings = settings;
        Ok(self.settings.clone())
    }

    /// Writes the current settings as pretty JSON, creating the config
    /// directory on first save.
    fn save(&self) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Cannot encode settings: {}", e))
        })?;

        let path = Path::new(&self.config_path);
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| {
                SettingsError::IoError(format!("Cannot create {}: {}", dir.display(), e))
            })?;
        }
        fs::write(path, json)
            .map_err(|e| SettingsError::IoError(format!("Cannot write {}: {}", self.config_path, e)))?;

        debug!("Saved settings to {}", self.config_path);
        Ok(())
    }

    fn get_settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Updates one setting by dot-notation key path and saves to disk.
    ///
    /// # Examples
    /// - `"general.home_page"` → updates `settings.general.home_page`
    /// - `"bookmarks.keyword_policy"` → updates `settings.bookmarks.keyword_policy`
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }

        let parts: Vec<&str> = key.split('.').collect();
        let mut json_value = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        {
            let (last, path) = match parts.split_last() {
                Some(split) => split,
                None => return Err(SettingsError::InvalidKey(key.to_string())),
            };

            let mut current = &mut json_value;
            for part in path {
                current = current.get_mut(*part).ok_or_else(|| {
                    SettingsError::InvalidKey(format!("Key '{}' not found in settings", key))
                })?;
            }

            match current {
                serde_json::Value::Object(map) if map.contains_key(*last) => {
                    map.insert(last.to_string(), value);
                }
                _ => {
                    return Err(SettingsError::InvalidKey(format!(
                        "Key '{}' not found in settings",
                        key
                    )));
                }
            }
        }

        // Deserialize back to validate the new value
        let new_settings: AppSettings = serde_json::from_value(json_value).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;

        self.settings = new_settings;
        self.save()
    }

    /// Puts every preference back to its default and saves.
    ///
    /// Trees already built keep their policy until `apply_to_tree` is called.
    fn reset(&mut self) -> Result<(), SettingsError> {
        info!("Resetting settings at {}", self.config_path);
        self.settings = AppSettings::default();
        self.save()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}

/// Whether the "use bookmark as home page" picker has anything to offer.
pub fn can_use_bookmark_as_home_page(tree: &BookmarkTree) -> bool {
    !tree.children(tree.root()).is_empty()
}

/// Home-page text for a bookmark: its URL, or a `bookmarks:<id>` link for
/// nodes without one (folders).
pub fn home_page_for_bookmark(tree: &BookmarkTree, node: NodeId) -> Result<String, BookmarkError> {
    let bookmark = tree.node(node).ok_or(BookmarkError::NotFound(node))?;

    if bookmark.url().is_empty() {
        Ok(format!("{}{}", BOOKMARKS_SCHEME, bookmark.id()))
    } else {
        Ok(bookmark.url().to_string())
    }
}
