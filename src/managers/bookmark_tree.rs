//! Bookmark tree for the bookmark store.
//!
//! Implements `BookmarkTreeTrait`: the hierarchical bookmark structure plus
//! the URL and keyword indexes kept in step with it. Nodes live in an arena
//! keyed by `NodeId`; containers own their children by id and every node
//! records its parent for traversal. All field writes that affect an index go
//! through this type, so index and tree are updated in the same call.

use std::collections::{HashMap, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, warn};

use crate::managers::bookmark_index::{canonicalize_url, BookmarkIndex};
use crate::types::bookmark::{BookmarkKind, BookmarkNode, NodeId};
use crate::types::errors::BookmarkError;
use crate::types::settings::{BookmarkSettings, KeywordPolicy};

/// Trait defining bookmark tree operations.
pub trait BookmarkTreeTrait {
    fn create_node(&mut self, kind: BookmarkKind, url: &str, title: &str) -> Result<NodeId, BookmarkError>;
    fn insert_node(&mut self, parent: NodeId, index: usize, node: NodeId) -> Result<(), BookmarkError>;
    fn append_node(&mut self, parent: NodeId, node: NodeId) -> Result<(), BookmarkError>;
    fn detach_node(&mut self, node: NodeId) -> Result<(), BookmarkError>;
    fn move_node(&mut self, node: NodeId, parent: NodeId, index: usize) -> Result<(), BookmarkError>;
    fn move_node_up(&mut self, node: NodeId) -> Result<bool, BookmarkError>;
    fn move_node_down(&mut self, node: NodeId) -> Result<bool, BookmarkError>;
    fn destroy_node(&mut self, node: NodeId) -> Result<(), BookmarkError>;
    fn remove_all_bookmarks(&mut self) -> usize;
    fn set_url(&mut self, node: NodeId, url: &str) -> Result<(), BookmarkError>;
    fn set_keyword(&mut self, node: NodeId, keyword: &str) -> Result<(), BookmarkError>;
    fn set_title(&mut self, node: NodeId, title: &str) -> Result<(), BookmarkError>;
    fn set_description(&mut self, node: NodeId, description: &str) -> Result<(), BookmarkError>;
    /// Overwrites the timestamps that are `Some`; `None` leaves a field as is.
    fn set_times(&mut self, node: NodeId, added: Option<i64>, modified: Option<i64>, visited: Option<i64>) -> Result<(), BookmarkError>;
    fn record_visit(&mut self, node: NodeId, at: i64) -> Result<(), BookmarkError>;
    fn find_nodes_by_url(&self, url: &str) -> Vec<NodeId>;
    fn find_node_by_keyword(&self, keyword: &str) -> Option<NodeId>;
    fn list_all_urls(&self) -> Vec<String>;
    fn list_all_keywords(&self) -> Vec<String>;
    fn has_url(&self, url: &str) -> bool;
    fn has_keyword(&self, keyword: &str) -> bool;
    /// Depth-first search below `start` (Root when `None`), without the index.
    fn find_descendants_by_url(&self, url: &str, start: Option<NodeId>) -> Vec<NodeId>;
}

/// In-memory bookmark tree owning its nodes and indexes.
#[derive(Debug, Clone)]
pub struct BookmarkTree {
    nodes: HashMap<NodeId, BookmarkNode>,
    index: BookmarkIndex,
    keyword_policy: KeywordPolicy,
    root: NodeId,
    trash: NodeId,
    next_id: u64,
}

impl Default for BookmarkTree {
    fn default() -> Self {
        Self::new()
    }
}

impl BookmarkTree {
    pub const ROOT_TITLE: &'static str = "Bookmarks";
    pub const TRASH_TITLE: &'static str = "Trash";

    /// Creates a tree whose top level is `[Root, Trash]`, rejecting duplicate keywords.
    pub fn new() -> Self {
        Self::with_policy(KeywordPolicy::default())
    }

    /// Creates an empty tree configured from the saved bookmark settings.
    pub fn from_settings(settings: &BookmarkSettings) -> Self {
        Self::with_policy(settings.keyword_policy)
    }

    /// Creates an empty tree using the given keyword collision policy.
    pub fn with_policy(keyword_policy: KeywordPolicy) -> Self {
        let now = Self::now();
        let root = NodeId(1);
        let trash = NodeId(2);

        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            BookmarkNode::new(root, BookmarkKind::Root, String::new(), Self::ROOT_TITLE.to_string(), now),
        );
        nodes.insert(
            trash,
            BookmarkNode::new(trash, BookmarkKind::Trash, String::new(), Self::TRASH_TITLE.to_string(), now),
        );

        Self {
            nodes,
            index: BookmarkIndex::new(),
            keyword_policy,
            root,
            trash,
            next_id: 3,
        }
    }

    /// Returns the current UNIX timestamp in seconds.
    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn trash(&self) -> NodeId {
        self.trash
    }

    pub fn keyword_policy(&self) -> KeywordPolicy {
        self.keyword_policy
    }

    /// Switches the keyword collision policy.
    ///
    /// Moving to `Reject` clears keyword fields left stale by `Overwrite`, so
    /// every remaining keyword is held by exactly one node. Returns the number
    /// of nodes whose keyword was cleared.
    pub fn set_keyword_policy(&mut self, policy: KeywordPolicy) -> usize {
        self.keyword_policy = policy;
        if policy != KeywordPolicy::Reject {
            return 0;
        }

        let index = &self.index;
        let mut cleared = 0;
        for (id, node) in self.nodes.iter_mut() {
            if !node.keyword.is_empty() && index.node_for_keyword(&node.keyword) != Some(*id) {
                warn!("Clearing stale keyword {} on bookmark {}", node.keyword, id);
                node.keyword.clear();
                cleared += 1;
            }
        }
        cleared
    }

    /// Applies the bookmark section of the saved settings to a live tree.
    pub fn apply_settings(&mut self, settings: &BookmarkSettings) -> usize {
        self.set_keyword_policy(settings.keyword_policy)
    }

    pub fn index(&self) -> &BookmarkIndex {
        &self.index
    }

    pub fn node(&self, id: NodeId) -> Option<&BookmarkNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Children of `id` in display order; empty for unknown ids and leaves.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// Number of live nodes, including Root, Trash and detached nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 2
    }

    fn get(&self, id: NodeId) -> Result<&BookmarkNode, BookmarkError> {
        self.nodes.get(&id).ok_or(BookmarkError::NotFound(id))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut BookmarkNode, BookmarkError> {
        self.nodes.get_mut(&id).ok_or(BookmarkError::NotFound(id))
    }

    fn reject<T>(err: BookmarkError) -> Result<T, BookmarkError> {
        warn!("Rejected bookmark operation: {}", err);
        Err(err)
    }

    /// Returns true if `ancestor` is `node` or lies on `node`'s parent chain.
    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Checks that `node` may live under `parent`, ignoring where it lives now.
    fn validate_attach(&self, parent: NodeId, node: NodeId) -> Result<(), BookmarkError> {
        let parent_kind = self.get(parent)?.kind;
        let node_kind = self.get(node)?.kind;

        if !parent_kind.is_folder_like() {
            return Self::reject(BookmarkError::StructuralViolation(format!(
                "{:?} node {} cannot hold children",
                parent_kind, parent
            )));
        }
        if matches!(node_kind, BookmarkKind::Root | BookmarkKind::Trash) {
            return Self::reject(BookmarkError::StructuralViolation(format!(
                "{:?} node {} must stay at the top level",
                node_kind, node
            )));
        }
        if self.is_ancestor_or_self(node, parent) {
            return Self::reject(BookmarkError::StructuralViolation(format!(
                "node {} cannot be placed inside its own subtree",
                node
            )));
        }
        Ok(())
    }

    /// Unlinks `node` from its parent's children, if it has a parent.
    fn unlink(&mut self, node: NodeId) {
        let parent = match self.nodes.get_mut(&node).and_then(|n| n.parent.take()) {
            Some(parent) => parent,
            None => return,
        };
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.retain(|id| *id != node);
        }
    }

    /// Links a validated, detached `node` under `parent` at `index` (clamped).
    fn link(&mut self, parent: NodeId, index: usize, node: NodeId) -> Result<(), BookmarkError> {
        let parent_node = self.get_mut(parent)?;
        let position = index.min(parent_node.children.len());
        parent_node.children.insert(position, node);
        self.get_mut(node)?.parent = Some(parent);
        Ok(())
    }

    /// Collects the subtree rooted at `id`, children before their parent.
    fn subtree_post_order(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![(id, false)];

        while let Some((current, expanded)) = stack.pop() {
            if expanded {
                order.push(current);
                continue;
            }
            stack.push((current, true));
            for child in self.children(current).iter().rev() {
                stack.push((*child, false));
            }
        }
        order
    }

    /// Removes one node from the arena and from both indexes.
    fn release(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(&id) {
            if !node.url.is_empty() {
                self.index.unregister_url(&node.url, id);
            }
            if !node.keyword.is_empty() {
                self.index.release_keyword(&node.keyword, id);
            }
        }
    }

    fn collect_descendants_by_url(&self, branch: NodeId, url: &str, found: &mut Vec<NodeId>) {
        for child in self.children(branch) {
            let node = match self.nodes.get(child) {
                Some(node) => node,
                None => continue,
            };
            match node.kind {
                BookmarkKind::Folder => self.collect_descendants_by_url(*child, url, found),
                BookmarkKind::Url if node.url == url => found.push(*child),
                _ => {}
            }
        }
    }

    /// Verifies that the indexes and the parent/child links agree with the
    /// nodes. Returns a description of the first problem found.
    pub fn check_consistency(&self) -> Result<(), String> {
        for (url, bucket) in self.index.url_entries() {
            if bucket.is_empty() {
                return Err(format!("empty bucket left for {}", url));
            }
            let unique: HashSet<&NodeId> = bucket.iter().collect();
            if unique.len() != bucket.len() {
                return Err(format!("bucket for {} lists a node twice", url));
            }
            for id in bucket {
                match self.nodes.get(id) {
                    Some(node) if &node.url == url => {}
                    Some(_) => return Err(format!("node {} indexed under stale url {}", id, url)),
                    None => return Err(format!("destroyed node {} still indexed under {}", id, url)),
                }
            }
        }

        for (keyword, id) in self.index.keyword_entries() {
            match self.nodes.get(id) {
                Some(node) if &node.keyword == keyword => {}
                Some(_) => return Err(format!("node {} indexed under stale keyword {}", id, keyword)),
                None => return Err(format!("destroyed node {} still holds keyword {}", id, keyword)),
            }
        }

        for (id, node) in &self.nodes {
            if !node.url.is_empty() && !self.index.nodes_for_url(&node.url).contains(id) {
                return Err(format!("node {} missing from bucket {}", id, node.url));
            }
            if self.keyword_policy == KeywordPolicy::Reject
                && !node.keyword.is_empty()
                && self.index.node_for_keyword(&node.keyword) != Some(*id)
            {
                return Err(format!("node {} not indexed under keyword {}", id, node.keyword));
            }
            if let Some(parent) = node.parent {
                if !self.children(parent).contains(id) {
                    return Err(format!("node {} not listed by its parent {}", id, parent));
                }
            }
            for child in &node.children {
                if self.parent(*child) != Some(*id) {
                    return Err(format!("child {} of {} points elsewhere", child, id));
                }
            }
        }
        Ok(())
    }
}

impl BookmarkTreeTrait for BookmarkTree {
    /// Allocates a detached node. A non-empty URL is indexed right away.
    fn create_node(&mut self, kind: BookmarkKind, url: &str, title: &str) -> Result<NodeId, BookmarkError> {
        if matches!(kind, BookmarkKind::Root | BookmarkKind::Trash) {
            return Self::reject(BookmarkError::StructuralViolation(format!(
                "a tree has exactly one {:?} node",
                kind
            )));
        }

        let url = canonicalize_url(url);
        if !url.is_empty() && !kind.accepts_url() {
            return Self::reject(BookmarkError::InvalidKind(format!(
                "{:?} node cannot have url {}",
                kind, url
            )));
        }

        let id = NodeId(self.next_id);
        self.next_id += 1;

        self.index.register_url(&url, id);
        self.nodes
            .insert(id, BookmarkNode::new(id, kind, url, title.to_string(), Self::now()));

        debug!("Created {:?} bookmark node {}", kind, id);
        Ok(id)
    }

    fn insert_node(&mut self, parent: NodeId, index: usize, node: NodeId) -> Result<(), BookmarkError> {
        self.validate_attach(parent, node)?;
        if let Some(current) = self.get(node)?.parent {
            return Self::reject(BookmarkError::StructuralViolation(format!(
                "node {} is already attached to {}",
                node, current
            )));
        }

        self.link(parent, index, node)?;
        debug!("Inserted bookmark node {} into {} at {}", node, parent, index);
        Ok(())
    }

    fn append_node(&mut self, parent: NodeId, node: NodeId) -> Result<(), BookmarkError> {
        let end = self.get(parent)?.children.len();
        self.insert_node(parent, end, node)
    }

    /// Takes `node` out of its parent. The node stays alive and indexed.
    fn detach_node(&mut self, node: NodeId) -> Result<(), BookmarkError> {
        let kind = self.get(node)?.kind;
        if matches!(kind, BookmarkKind::Root | BookmarkKind::Trash) {
            return Self::reject(BookmarkError::StructuralViolation(format!(
                "{:?} node {} cannot be detached",
                kind, node
            )));
        }

        self.unlink(node);
        Ok(())
    }

    /// Moves `node` under `parent` so that it ends up at position `index`.
    fn move_node(&mut self, node: NodeId, parent: NodeId, index: usize) -> Result<(), BookmarkError> {
        self.validate_attach(parent, node)?;
        self.unlink(node);
        self.link(parent, index, node)?;
        debug!("Moved bookmark node {} into {} at {}", node, parent, index);
        Ok(())
    }

    fn move_node_up(&mut self, node: NodeId) -> Result<bool, BookmarkError> {
        let parent = match self.get(node)?.parent {
            Some(parent) => parent,
            None => return Ok(false),
        };
        let siblings = &mut self.get_mut(parent)?.children;
        match siblings.iter().position(|id| *id == node) {
            Some(row) if row > 0 => {
                siblings.swap(row, row - 1);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn move_node_down(&mut self, node: NodeId) -> Result<bool, BookmarkError> {
        let parent = match self.get(node)?.parent {
            Some(parent) => parent,
            None => return Ok(false),
        };
        let siblings = &mut self.get_mut(parent)?.children;
        match siblings.iter().position(|id| *id == node) {
            Some(row) if row + 1 < siblings.len() => {
                siblings.swap(row, row + 1);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Destroys `node` and its whole subtree, children first, dropping every
    /// destroyed node from both indexes.
    fn destroy_node(&mut self, node: NodeId) -> Result<(), BookmarkError> {
        let kind = self.get(node)?.kind;
        if matches!(kind, BookmarkKind::Root | BookmarkKind::Trash) {
            return Self::reject(BookmarkError::StructuralViolation(format!(
                "{:?} node {} cannot be destroyed",
                kind, node
            )));
        }

        let doomed = self.subtree_post_order(node);
        self.unlink(node);
        for id in &doomed {
            self.release(*id);
        }

        debug!("Destroyed bookmark node {} ({} nodes)", node, doomed.len());
        Ok(())
    }

    /// Destroys every child of Root. Returns the number of nodes removed.
    fn remove_all_bookmarks(&mut self) -> usize {
        let before = self.nodes.len();
        let top: Vec<NodeId> = self.children(self.root).to_vec();
        for id in top {
            if let Err(err) = self.destroy_node(id) {
                warn!("Failed to remove bookmark {}: {}", id, err);
            }
        }
        before - self.nodes.len()
    }

    fn set_url(&mut self, node: NodeId, url: &str) -> Result<(), BookmarkError> {
        let url = canonicalize_url(url);
        let current = self.get(node)?;
        if current.url == url {
            return Ok(());
        }
        if !url.is_empty() && !current.kind.accepts_url() {
            return Self::reject(BookmarkError::InvalidKind(format!(
                "{:?} node {} cannot have url {}",
                current.kind, node, url
            )));
        }

        let old = std::mem::take(&mut self.get_mut(node)?.url);
        if !old.is_empty() {
            self.index.unregister_url(&old, node);
        }
        self.index.register_url(&url, node);

        let now = Self::now();
        let target = self.get_mut(node)?;
        target.url = url;
        target.time_modified = Some(now);
        Ok(())
    }

    fn set_keyword(&mut self, node: NodeId, keyword: &str) -> Result<(), BookmarkError> {
        let current = self.get(node)?;
        if current.keyword == keyword {
            return Ok(());
        }
        if !keyword.is_empty() && !current.kind.accepts_keyword() {
            return Self::reject(BookmarkError::InvalidKind(format!(
                "{:?} node {} cannot have a keyword",
                current.kind, node
            )));
        }
        if let Some(holder) = self.index.node_for_keyword(keyword) {
            if holder != node && self.keyword_policy == KeywordPolicy::Reject {
                return Self::reject(BookmarkError::DuplicateKeyword(keyword.to_string()));
            }
        }

        let old = std::mem::take(&mut self.get_mut(node)?.keyword);
        if !old.is_empty() {
            self.index.release_keyword(&old, node);
        }
        if let Some(previous) = self.index.assign_keyword(keyword, node) {
            warn!("Keyword {} moved from bookmark {} to {}", keyword, previous, node);
        }

        let now = Self::now();
        let target = self.get_mut(node)?;
        target.keyword = keyword.to_string();
        target.time_modified = Some(now);
        Ok(())
    }

    fn set_title(&mut self, node: NodeId, title: &str) -> Result<(), BookmarkError> {
        let now = Self::now();
        let target = self.get_mut(node)?;
        if target.title != title {
            target.title = title.to_string();
            target.time_modified = Some(now);
        }
        Ok(())
    }

    fn set_description(&mut self, node: NodeId, description: &str) -> Result<(), BookmarkError> {
        let now = Self::now();
        let target = self.get_mut(node)?;
        if target.description != description {
            target.description = description.to_string();
            target.time_modified = Some(now);
        }
        Ok(())
    }

    fn set_times(&mut self, node: NodeId, added: Option<i64>, modified: Option<i64>, visited: Option<i64>) -> Result<(), BookmarkError> {
        let target = self.get_mut(node)?;
        if added.is_some() {
            target.time_added = added;
        }
        if modified.is_some() {
            target.time_modified = modified;
        }
        if visited.is_some() {
            target.time_visited = visited;
        }
        Ok(())
    }

    fn record_visit(&mut self, node: NodeId, at: i64) -> Result<(), BookmarkError> {
        let target = self.get_mut(node)?;
        target.visit_count = target.visit_count.saturating_add(1);
        target.time_visited = Some(at);
        Ok(())
    }

    fn find_nodes_by_url(&self, url: &str) -> Vec<NodeId> {
        self.index.nodes_for_url(&canonicalize_url(url)).to_vec()
    }

    fn find_node_by_keyword(&self, keyword: &str) -> Option<NodeId> {
        self.index.node_for_keyword(keyword)
    }

    fn list_all_urls(&self) -> Vec<String> {
        self.index.urls()
    }

    fn list_all_keywords(&self) -> Vec<String> {
        self.index.keywords()
    }

    fn has_url(&self, url: &str) -> bool {
        self.index.has_url(&canonicalize_url(url))
    }

    fn has_keyword(&self, keyword: &str) -> bool {
        self.index.has_keyword(keyword)
    }

    fn find_descendants_by_url(&self, url: &str, start: Option<NodeId>) -> Vec<NodeId> {
        let url = canonicalize_url(url);
        let mut found = Vec::new();
        self.collect_descendants_by_url(start.unwrap_or(self.root), &url, &mut found);
        found
    }
}
