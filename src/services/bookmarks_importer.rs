// Bookmark store importer
// Builds bookmark nodes from the structural events of a Netscape-format
// bookmarks file. Turning the HTML into events is done by the caller's HTML
// engine; this module only applies the events to a `BookmarkTree`.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::managers::bookmark_tree::{BookmarkTree, BookmarkTreeTrait};
use crate::types::bookmark::{BookmarkKind, NodeId};
use crate::types::errors::{BookmarkError, ImportError};
use crate::types::settings::BookmarkSettings;

/// File name looked up when the import path names a directory.
pub const DEFAULT_FILE_NAME: &str = "bookmarks.html";

/// One structural event read from a bookmarks document, in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImportEvent {
    /// A folder heading; following events land inside it until `CloseFolder`.
    OpenFolder {
        title: String,
        keyword: Option<String>,
        added: Option<i64>,
    },
    AddUrl {
        url: String,
        title: String,
        keyword: Option<String>,
        description: Option<String>,
        added: Option<i64>,
        modified: Option<i64>,
        visited: Option<i64>,
    },
    AddSeparator,
    CloseFolder,
}

impl ImportEvent {
    /// Shorthand for a URL entry carrying only an address and a title.
    pub fn url(url: &str, title: &str) -> Self {
        ImportEvent::AddUrl {
            url: url.to_string(),
            title: title.to_string(),
            keyword: None,
            description: None,
            added: None,
            modified: None,
            visited: None,
        }
    }

    /// Shorthand for a folder heading carrying only a title.
    pub fn folder(title: &str) -> Self {
        ImportEvent::OpenFolder {
            title: title.to_string(),
            keyword: None,
            added: None,
        }
    }
}

/// Where and how imported entries are placed.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOptions {
    /// Remove every existing bookmark before importing.
    pub remove_existing: bool,
    /// With `remove_existing`, import into a new folder under Root.
    pub import_into_subfolder: bool,
    pub subfolder_name: String,
    /// Keep entries whose URL is already bookmarked. Ignored with
    /// `remove_existing`, where every entry is kept.
    pub allow_duplicates: bool,
    /// Folder receiving the entries when existing bookmarks are kept. Root when `None`.
    pub target_folder: Option<NodeId>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            remove_existing: false,
            import_into_subfolder: false,
            subfolder_name: "Imported".to_string(),
            allow_duplicates: true,
            target_folder: None,
        }
    }
}

impl ImportOptions {
    /// Default options with duplicate handling taken from the saved settings.
    pub fn from_settings(settings: &BookmarkSettings) -> Self {
        Self {
            allow_duplicates: settings.allow_duplicates,
            ..Self::default()
        }
    }
}

/// Counts of what an import run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub folders: usize,
    pub urls: usize,
    pub separators: usize,
    pub skipped_duplicates: usize,
    pub skipped_keywords: usize,
}

/// Importer for Netscape-format ("HTML") bookmark files.
pub struct BookmarksImporter<'a> {
    tree: &'a mut BookmarkTree,
    options: ImportOptions,
    source: Option<PathBuf>,
}

impl<'a> BookmarksImporter<'a> {
    pub fn new(tree: &'a mut BookmarkTree, options: ImportOptions) -> Self {
        Self {
            tree,
            options,
            source: None,
        }
    }

    pub fn title(&self) -> &'static str {
        "HTML Bookmarks"
    }

    pub fn description(&self) -> &'static str {
        "Imports bookmarks from HTML file (Netscape format)."
    }

    pub fn version(&self) -> &'static str {
        "1.0"
    }

    pub fn browser(&self) -> &'static str {
        "other"
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Sets the file to import from. When `is_prefix` is set, `path` names a
    /// directory and `bookmarks.html` inside it is used.
    pub fn set_source_path(&mut self, path: &str, is_prefix: bool) -> Result<&Path, ImportError> {
        let resolved = resolve_source_path(path, is_prefix)?;
        Ok(self.source.insert(resolved).as_path())
    }

    /// Picks the folder entries are imported into, clearing existing
    /// bookmarks first when asked to.
    fn prepare_import_folder(&mut self) -> Result<NodeId, ImportError> {
        let root = self.tree.root();

        if self.options.remove_existing {
            let removed = self.tree.remove_all_bookmarks();
            info!("Removed {} existing bookmarks before import", removed);

            if self.options.import_into_subfolder {
                let folder = self
                    .tree
                    .create_node(BookmarkKind::Folder, "", &self.options.subfolder_name)?;
                self.tree.append_node(root, folder)?;
                return Ok(folder);
            }
            return Ok(root);
        }

        match self.options.target_folder {
            Some(folder) => match self.tree.node(folder).map(|n| n.kind()) {
                Some(kind) if kind.is_folder_like() => Ok(folder),
                Some(kind) => Err(ImportError::Bookmark(BookmarkError::StructuralViolation(format!(
                    "{:?} node {} cannot receive imported bookmarks",
                    kind, folder
                )))),
                None => Err(ImportError::Bookmark(BookmarkError::NotFound(folder))),
            },
            None => Ok(root),
        }
    }

    /// Assigns a keyword from the file unless some bookmark already uses it.
    fn apply_keyword(&mut self, node: NodeId, keyword: Option<&str>, summary: &mut ImportSummary) -> Result<(), ImportError> {
        let keyword = match keyword {
            Some(k) if !k.is_empty() => k,
            _ => return Ok(()),
        };

        if self.tree.has_keyword(keyword) {
            debug!("Keyword {} already in use, not importing it", keyword);
            summary.skipped_keywords += 1;
            return Ok(());
        }
        self.tree.set_keyword(node, keyword)?;
        Ok(())
    }

    /// Applies `events` in order and returns what was created.
    pub fn import<I>(&mut self, events: I) -> Result<ImportSummary, ImportError>
    where
        I: IntoIterator<Item = ImportEvent>,
    {
        let import_folder = self.prepare_import_folder()?;
        let mut folders = vec![import_folder];
        let mut summary = ImportSummary::default();

        for event in events {
            let current = folders.last().copied().unwrap_or(import_folder);

            match event {
                ImportEvent::OpenFolder { title, keyword, added } => {
                    let folder = self.tree.create_node(BookmarkKind::Folder, "", &title)?;
                    self.apply_keyword(folder, keyword.as_deref(), &mut summary)?;
                    self.tree.set_times(folder, added, added, None)?;
                    self.tree.append_node(current, folder)?;
                    folders.push(folder);
                    summary.folders += 1;
                }
                ImportEvent::AddUrl {
                    url,
                    title,
                    keyword,
                    description,
                    added,
                    modified,
                    visited,
                } => {
                    if !self.options.remove_existing
                        && !self.options.allow_duplicates
                        && self.tree.has_url(&url)
                    {
                        debug!("Skipping duplicate bookmark {}", url);
                        summary.skipped_duplicates += 1;
                        continue;
                    }

                    let bookmark = self.tree.create_node(BookmarkKind::Url, &url, &title)?;
                    self.apply_keyword(bookmark, keyword.as_deref(), &mut summary)?;
                    if let Some(description) = description {
                        self.tree.set_description(bookmark, &description)?;
                    }
                    self.tree.set_times(bookmark, added, modified, visited)?;
                    self.tree.append_node(current, bookmark)?;
                    summary.urls += 1;
                }
                ImportEvent::AddSeparator => {
                    let separator = self.tree.create_node(BookmarkKind::Separator, "", "")?;
                    self.tree.append_node(current, separator)?;
                    summary.separators += 1;
                }
                ImportEvent::CloseFolder => {
                    if folders.len() > 1 {
                        folders.pop();
                    } else {
                        warn!("Ignoring unbalanced folder close in bookmarks import");
                    }
                }
            }
        }

        info!(
            "Imported {} bookmarks, {} folders, {} separators ({} duplicates skipped)",
            summary.urls, summary.folders, summary.separators, summary.skipped_duplicates
        );
        Ok(summary)
    }
}

/// Resolves the file to read: `path` itself, or `path/bookmarks.html` when
/// `is_prefix` is set.
pub fn resolve_source_path(path: &str, is_prefix: bool) -> Result<PathBuf, ImportError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(ImportError::InvalidPath("path is empty".to_string()));
    }

    let base = PathBuf::from(trimmed);
    if is_prefix {
        Ok(base.join(DEFAULT_FILE_NAME))
    } else {
        Ok(base)
    }
}
