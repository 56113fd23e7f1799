use serde::{Deserialize, Serialize};

/// Top-level settings document persisted by the preferences engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppSettings {
    pub general: GeneralPreferences,
    #[serde(default)]
    pub bookmarks: BookmarkSettings,
}

/// Settings edited on the "General" preferences page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralPreferences {
    pub startup_behavior: StartupBehavior,
    pub home_page: String,
    pub downloads_path: String,
    pub always_ask_where_to_save_download: bool,
    pub open_links_in_new_tab: bool,
    pub delay_restoring_of_background_tabs: bool,
    pub reuse_current_tab: bool,
    pub open_next_to_active: bool,
    #[serde(default)]
    pub accept_language: String,
}

impl GeneralPreferences {
    pub const DEFAULT_HOME_PAGE: &'static str = "about:blank";
}

impl Default for GeneralPreferences {
    fn default() -> Self {
        Self {
            startup_behavior: StartupBehavior::ContinuePrevious,
            home_page: Self::DEFAULT_HOME_PAGE.to_string(),
            downloads_path: "~/Downloads".to_string(),
            always_ask_where_to_save_download: true,
            open_links_in_new_tab: true,
            delay_restoring_of_background_tabs: false,
            reuse_current_tab: false,
            open_next_to_active: true,
            accept_language: String::new(),
        }
    }
}

/// What the browser does on startup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StartupBehavior {
    ContinuePrevious,
    ShowDialog,
    StartHomePage,
    StartStartPage,
    StartEmpty,
}

/// How `set_keyword` treats a keyword already held by another node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum KeywordPolicy {
    /// Fail with `BookmarkError::DuplicateKeyword`.
    #[default]
    Reject,
    /// Move the index entry to the new node. The previous holder keeps the
    /// keyword in its own field but is no longer found through the index.
    Overwrite,
}

/// Bookmark behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookmarkSettings {
    pub keyword_policy: KeywordPolicy,
    /// Default for `ImportOptions::allow_duplicates`.
    pub allow_duplicates: bool,
}

impl Default for BookmarkSettings {
    fn default() -> Self {
        Self {
            keyword_policy: KeywordPolicy::Reject,
            allow_duplicates: true,
        }
    }
}
