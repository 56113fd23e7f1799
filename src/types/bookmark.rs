use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle to a node owned by a `BookmarkTree`.
///
/// Ids are allocated monotonically per tree and never reused, so a stale
/// handle simply stops resolving once its node is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of a bookmark node. Fixed when the node is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookmarkKind {
    Root,
    Folder,
    Url,
    Separator,
    Trash,
}

impl BookmarkKind {
    /// Whether nodes of this kind may hold children.
    pub fn is_folder_like(self) -> bool {
        matches!(self, BookmarkKind::Root | BookmarkKind::Folder)
    }

    /// Whether nodes of this kind may carry a URL.
    pub fn accepts_url(self) -> bool {
        self == BookmarkKind::Url
    }

    /// Whether nodes of this kind may carry a keyword.
    pub fn accepts_keyword(self) -> bool {
        !matches!(self, BookmarkKind::Separator)
    }
}

/// A single entry in the bookmark hierarchy.
///
/// Instances are owned by the tree; callers get shared references through
/// `BookmarkTree::node` and change them only through the tree's setters, which
/// keep the URL and keyword indexes in step with the fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkNode {
    pub(crate) id: NodeId,
    pub(crate) kind: BookmarkKind,
    pub(crate) url: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) keyword: String,
    pub(crate) time_added: Option<i64>,
    pub(crate) time_modified: Option<i64>,
    pub(crate) time_visited: Option<i64>,
    pub(crate) visit_count: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl BookmarkNode {
    pub(crate) fn new(id: NodeId, kind: BookmarkKind, url: String, title: String, now: i64) -> Self {
        Self {
            id,
            kind,
            url,
            title,
            description: String::new(),
            keyword: String::new(),
            time_added: Some(now),
            time_modified: Some(now),
            time_visited: None,
            visit_count: 0,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> BookmarkKind {
        self.kind
    }

    /// Canonical URL text, empty for everything but `Url` nodes.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The keyword stored on the node. Under `KeywordPolicy::Overwrite` this
    /// may be stale: another node can have taken over the index entry.
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn time_added(&self) -> Option<i64> {
        self.time_added
    }

    pub fn time_modified(&self) -> Option<i64> {
        self.time_modified
    }

    pub fn time_visited(&self) -> Option<i64> {
        self.time_visited
    }

    pub fn visit_count(&self) -> u32 {
        self.visit_count
    }

    /// The owning container, `None` for top-level and detached nodes.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Separators and the Trash are shown as disabled placeholders.
    pub fn is_enabled(&self) -> bool {
        !matches!(self.kind, BookmarkKind::Separator | BookmarkKind::Trash)
    }
}
