//! Bookmark store: the bookmark tree of a desktop web browser.
//!
//! A hierarchical store of folders, URL bookmarks and separators with URL and
//! keyword indexes kept consistent on every edit, plus the importer and
//! preferences front-ends that work through it.

pub mod managers;
pub mod platform;
pub mod services;
pub mod types;
