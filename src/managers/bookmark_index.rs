//! Secondary indexes over a bookmark tree.
//!
//! `BookmarkIndex` maps canonical URL text to every node holding that URL and
//! keywords to the single node they resolve to. It is owned by one
//! `BookmarkTree`; the tree's setters are the only writers, so the index never
//! observes a half-applied field change.

use std::collections::HashMap;

use url::Url;

use crate::types::bookmark::NodeId;

/// Returns the canonical text form used as a URL index key.
///
/// Absolute URLs are replaced by their parsed serialization so that
/// equivalent spellings (`HTTPS://Example.com` and `https://example.com/`)
/// share one key. Text that does not parse is kept as written, minus
/// surrounding whitespace.
pub fn canonicalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    match Url::parse(trimmed) {
        Ok(parsed) => parsed.to_string(),
        Err(_) => trimmed.to_string(),
    }
}

/// URL and keyword lookup tables for one bookmark tree.
#[derive(Debug, Default, Clone)]
pub struct BookmarkIndex {
    urls: HashMap<String, Vec<NodeId>>,
    keywords: HashMap<String, NodeId>,
}

impl BookmarkIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `node` to the bucket for `url`. Empty URLs are not indexed and
    /// a node already in the bucket is not added twice.
    pub fn register_url(&mut self, url: &str, node: NodeId) {
        if url.is_empty() {
            return;
        }

        let bucket = self.urls.entry(url.to_string()).or_default();
        if !bucket.contains(&node) {
            bucket.push(node);
        }
    }

    /// Removes `node` from the bucket for `url`, dropping the bucket once empty.
    pub fn unregister_url(&mut self, url: &str, node: NodeId) {
        let now_empty = match self.urls.get_mut(url) {
            Some(bucket) => {
                bucket.retain(|id| *id != node);
                bucket.is_empty()
            }
            None => false,
        };

        if now_empty {
            self.urls.remove(url);
        }
    }

    /// Points `keyword` at `node`, replacing any previous mapping.
    /// Returns the node that held the keyword before, if it was a different one.
    pub fn assign_keyword(&mut self, keyword: &str, node: NodeId) -> Option<NodeId> {
        if keyword.is_empty() {
            return None;
        }

        self.keywords
            .insert(keyword.to_string(), node)
            .filter(|previous| *previous != node)
    }

    /// Drops the mapping for `keyword` if, and only if, it resolves to `node`.
    pub fn release_keyword(&mut self, keyword: &str, node: NodeId) -> bool {
        if self.keywords.get(keyword) == Some(&node) {
            self.keywords.remove(keyword);
            true
        } else {
            false
        }
    }

    pub fn nodes_for_url(&self, url: &str) -> &[NodeId] {
        self.urls.get(url).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn node_for_keyword(&self, keyword: &str) -> Option<NodeId> {
        self.keywords.get(keyword).copied()
    }

    pub fn has_url(&self, url: &str) -> bool {
        self.urls.contains_key(url)
    }

    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.contains_key(keyword)
    }

    /// Indexed URLs in unspecified order.
    pub fn urls(&self) -> Vec<String> {
        self.urls.keys().cloned().collect()
    }

    /// Indexed keywords in unspecified order.
    pub fn keywords(&self) -> Vec<String> {
        self.keywords.keys().cloned().collect()
    }

    pub fn len_urls(&self) -> usize {
        self.urls.len()
    }

    pub fn len_keywords(&self) -> usize {
        self.keywords.len()
    }

    pub(crate) fn url_entries(&self) -> impl Iterator<Item = (&String, &Vec<NodeId>)> {
        self.urls.iter()
    }

    pub(crate) fn keyword_entries(&self) -> impl Iterator<Item = (&String, &NodeId)> {
        self.keywords.iter()
    }
}
