//! Unit tests for the BookmarkTree public API.
//!
//! These tests exercise node creation, attachment, destruction and the URL
//! and keyword indexes through the `BookmarkTreeTrait` interface.

use bookmark_store::managers::bookmark_tree::{BookmarkTree, BookmarkTreeTrait};
use bookmark_store::types::bookmark::{BookmarkKind, NodeId};
use bookmark_store::types::errors::BookmarkError;
use bookmark_store::types::settings::KeywordPolicy;

/// Helper: create a folder and append it to `parent`.
fn add_folder(tree: &mut BookmarkTree, parent: NodeId, title: &str) -> NodeId {
    let id = tree.create_node(BookmarkKind::Folder, "", title).unwrap();
    tree.append_node(parent, id).unwrap();
    id
}

/// Helper: create a URL bookmark and append it to `parent`.
fn add_url(tree: &mut BookmarkTree, parent: NodeId, url: &str) -> NodeId {
    let id = tree.create_node(BookmarkKind::Url, url, url).unwrap();
    tree.append_node(parent, id).unwrap();
    id
}

// === Creation ===

#[test]
fn test_create_node_indexes_url_before_attachment() {
    let mut tree = BookmarkTree::new();
    let id = tree
        .create_node(BookmarkKind::Url, "https://example.com", "Example")
        .unwrap();

    assert_eq!(tree.parent(id), None);
    assert_eq!(tree.find_nodes_by_url("https://example.com"), vec![id]);
    assert_eq!(tree.node(id).unwrap().url(), "https://example.com/");
    assert_eq!(tree.node(id).unwrap().title(), "Example");
}

#[test]
fn test_create_node_rejects_url_on_non_url_kind() {
    let mut tree = BookmarkTree::new();
    let before = tree.len();

    for kind in [BookmarkKind::Folder, BookmarkKind::Separator] {
        let result = tree.create_node(kind, "https://example.com", "x");
        assert!(matches!(result, Err(BookmarkError::InvalidKind(_))));
    }

    assert_eq!(tree.len(), before);
    assert!(!tree.has_url("https://example.com"));
}

#[test]
fn test_create_second_root_or_trash_is_rejected() {
    let mut tree = BookmarkTree::new();
    assert!(matches!(
        tree.create_node(BookmarkKind::Root, "", "Root"),
        Err(BookmarkError::StructuralViolation(_))
    ));
    assert!(matches!(
        tree.create_node(BookmarkKind::Trash, "", "Trash"),
        Err(BookmarkError::StructuralViolation(_))
    ));
}

#[test]
fn test_node_ids_are_not_reused() {
    let mut tree = BookmarkTree::new();
    let first = tree.create_node(BookmarkKind::Separator, "", "").unwrap();
    tree.destroy_node(first).unwrap();
    let second = tree.create_node(BookmarkKind::Separator, "", "").unwrap();
    assert_ne!(first, second);
    assert!(tree.node(first).is_none());
}

// === Structure ===

#[test]
fn test_insert_respects_position_and_clamps() {
    let mut tree = BookmarkTree::new();
    let root = tree.root();
    let a = add_url(&mut tree, root, "https://a.example");
    let b = add_url(&mut tree, root, "https://b.example");

    let c = tree.create_node(BookmarkKind::Url, "https://c.example", "c").unwrap();
    tree.insert_node(root, 1, c).unwrap();
    let d = tree.create_node(BookmarkKind::Separator, "", "").unwrap();
    tree.insert_node(root, 99, d).unwrap();

    assert_eq!(tree.children(root), &[a, c, b, d]);
    assert_eq!(tree.parent(c), Some(root));
}

#[test]
fn test_children_under_leaf_kinds_are_rejected() {
    let mut tree = BookmarkTree::new();
    let root = tree.root();
    let url = add_url(&mut tree, root, "https://a.example");
    let separator = tree.create_node(BookmarkKind::Separator, "", "").unwrap();
    tree.append_node(root, separator).unwrap();
    let child = tree.create_node(BookmarkKind::Url, "https://b.example", "b").unwrap();

    for parent in [url, separator, tree.trash()] {
        let result = tree.append_node(parent, child);
        assert!(
            matches!(result, Err(BookmarkError::StructuralViolation(_))),
            "appending under {:?} must fail",
            tree.node(parent).unwrap().kind()
        );
        assert!(tree.children(parent).is_empty());
    }
    assert_eq!(tree.parent(child), None);
}

#[test]
fn test_insert_attached_node_is_rejected() {
    let mut tree = BookmarkTree::new();
    let root = tree.root();
    let folder = add_folder(&mut tree, root, "F");
    let url = add_url(&mut tree, root, "https://a.example");

    assert!(matches!(
        tree.append_node(folder, url),
        Err(BookmarkError::StructuralViolation(_))
    ));
    assert_eq!(tree.parent(url), Some(root));
}

#[test]
fn test_folder_cannot_move_into_its_own_subtree() {
    let mut tree = BookmarkTree::new();
    let root = tree.root();
    let outer = add_folder(&mut tree, root, "Outer");
    let inner = add_folder(&mut tree, outer, "Inner");

    assert!(matches!(
        tree.move_node(outer, inner, 0),
        Err(BookmarkError::StructuralViolation(_))
    ));
    assert!(matches!(
        tree.move_node(outer, outer, 0),
        Err(BookmarkError::StructuralViolation(_))
    ));
    assert_eq!(tree.parent(outer), Some(root));
    assert!(tree.check_consistency().is_ok());
}

#[test]
fn test_root_and_trash_stay_in_place() {
    let mut tree = BookmarkTree::new();
    let root = tree.root();
    let folder = add_folder(&mut tree, root, "F");

    assert!(tree.destroy_node(tree.root()).is_err());
    assert!(tree.destroy_node(tree.trash()).is_err());
    assert!(tree.detach_node(tree.trash()).is_err());
    assert!(tree.move_node(tree.trash(), folder, 0).is_err());
    assert!(tree.contains(tree.root()));
    assert!(tree.contains(tree.trash()));
}

#[test]
fn test_unknown_ids_report_not_found() {
    let mut tree = BookmarkTree::new();
    let ghost = NodeId(999);
    assert_eq!(tree.set_url(ghost, "https://a"), Err(BookmarkError::NotFound(ghost)));
    assert_eq!(tree.destroy_node(ghost), Err(BookmarkError::NotFound(ghost)));
    assert_eq!(tree.append_node(ghost, tree.root()), Err(BookmarkError::NotFound(ghost)));
}

#[test]
fn test_move_node_reorders_and_reparents() {
    let mut tree = BookmarkTree::new();
    let root = tree.root();
    let folder = add_folder(&mut tree, root, "F");
    let a = add_url(&mut tree, root, "https://a.example");
    let b = add_url(&mut tree, root, "https://b.example");

    tree.move_node(b, root, 0).unwrap();
    assert_eq!(tree.children(root), &[b, folder, a]);

    tree.move_node(a, folder, 0).unwrap();
    assert_eq!(tree.children(root), &[b, folder]);
    assert_eq!(tree.children(folder), &[a]);
    assert_eq!(tree.parent(a), Some(folder));
    assert!(tree.check_consistency().is_ok());
}

#[test]
fn test_move_up_and_down_stop_at_the_edges() {
    let mut tree = BookmarkTree::new();
    let root = tree.root();
    let a = add_url(&mut tree, root, "https://a.example");
    let b = add_url(&mut tree, root, "https://b.example");

    assert!(!tree.move_node_up(a).unwrap());
    assert!(!tree.move_node_down(b).unwrap());
    assert!(tree.move_node_up(b).unwrap());
    assert_eq!(tree.children(root), &[b, a]);
    assert!(tree.move_node_down(b).unwrap());
    assert_eq!(tree.children(root), &[a, b]);
}

#[test]
fn test_detached_node_stays_indexed_and_can_be_reattached() {
    let mut tree = BookmarkTree::new();
    let root = tree.root();
    let folder = add_folder(&mut tree, root, "F");
    let url = add_url(&mut tree, folder, "https://a.example");

    tree.detach_node(url).unwrap();
    assert!(tree.children(folder).is_empty());
    assert_eq!(tree.parent(url), None);
    assert!(tree.has_url("https://a.example"));

    tree.append_node(root, url).unwrap();
    assert_eq!(tree.parent(url), Some(root));
}

// === URL index ===

#[test]
fn test_set_url_twice_is_idempotent() {
    let mut tree = BookmarkTree::new();
    let root = tree.root();
    let id = add_url(&mut tree, root, "");

    tree.set_url(id, "https://u.example").unwrap();
    tree.set_url(id, "https://u.example").unwrap();
    tree.set_url(id, "https://U.example/").unwrap();

    assert_eq!(tree.find_nodes_by_url("https://u.example"), vec![id]);
}

#[test]
fn test_reassigning_url_leaves_no_residue() {
    let mut tree = BookmarkTree::new();
    let root = tree.root();
    let id = add_url(&mut tree, root, "https://a.example");

    tree.set_url(id, "https://b.example").unwrap();
    assert!(!tree.has_url("https://a.example"));
    assert_eq!(tree.find_nodes_by_url("https://b.example"), vec![id]);

    tree.set_url(id, "https://a.example").unwrap();
    assert_eq!(tree.find_nodes_by_url("https://a.example"), vec![id]);
    assert!(!tree.has_url("https://b.example"));
    assert_eq!(tree.list_all_urls(), vec!["https://a.example/".to_string()]);
}

#[test]
fn test_clearing_url_drops_the_bucket() {
    let mut tree = BookmarkTree::new();
    let root = tree.root();
    let id = add_url(&mut tree, root, "https://a.example");
    tree.set_url(id, "").unwrap();
    assert!(!tree.has_url("https://a.example"));
    assert!(tree.list_all_urls().is_empty());
    assert_eq!(tree.node(id).unwrap().url(), "");
}

#[test]
fn test_set_url_on_folder_is_rejected() {
    let mut tree = BookmarkTree::new();
    let root = tree.root();
    let folder = add_folder(&mut tree, root, "F");
    assert!(matches!(
        tree.set_url(folder, "https://a.example"),
        Err(BookmarkError::InvalidKind(_))
    ));
    assert!(tree.set_url(folder, "").is_ok());
    assert!(tree.list_all_urls().is_empty());
}

#[test]
fn test_shared_url_bucket_holds_every_holder() {
    let mut tree = BookmarkTree::new();
    let root = tree.root();
    let first = add_url(&mut tree, root, "https://x.example");
    let second = add_url(&mut tree, root, "https://x.example");

    assert_eq!(tree.find_nodes_by_url("https://x.example"), vec![first, second]);

    tree.destroy_node(first).unwrap();
    assert_eq!(tree.find_nodes_by_url("https://x.example"), vec![second]);
    assert!(tree.has_url("https://x.example"));
}

// === Keyword index ===

#[test]
fn test_keyword_lookup_and_rename() {
    let mut tree = BookmarkTree::new();
    let root = tree.root();
    let id = add_url(&mut tree, root, "https://github.com");

    tree.set_keyword(id, "gh").unwrap();
    assert_eq!(tree.find_node_by_keyword("gh"), Some(id));

    tree.set_keyword(id, "git").unwrap();
    assert!(!tree.has_keyword("gh"));
    assert_eq!(tree.find_node_by_keyword("git"), Some(id));
    assert_eq!(tree.node(id).unwrap().keyword(), "git");

    tree.set_keyword(id, "").unwrap();
    assert!(tree.list_all_keywords().is_empty());
}

#[test]
fn test_duplicate_keyword_rejected_by_default() {
    let mut tree = BookmarkTree::new();
    let root = tree.root();
    let n1 = add_url(&mut tree, root, "https://a.example");
    let n2 = add_url(&mut tree, root, "https://b.example");

    tree.set_keyword(n1, "k").unwrap();
    assert_eq!(
        tree.set_keyword(n2, "k"),
        Err(BookmarkError::DuplicateKeyword("k".to_string()))
    );
    assert_eq!(tree.find_node_by_keyword("k"), Some(n1));
    assert_eq!(tree.node(n2).unwrap().keyword(), "");
}

#[test]
fn test_overwrite_policy_moves_keyword_and_leaves_stale_field() {
    let mut tree = BookmarkTree::with_policy(KeywordPolicy::Overwrite);
    let root = tree.root();
    let n1 = add_url(&mut tree, root, "https://a.example");
    let n2 = add_url(&mut tree, root, "https://b.example");

    tree.set_keyword(n1, "k").unwrap();
    tree.set_keyword(n2, "k").unwrap();

    assert_eq!(tree.find_node_by_keyword("k"), Some(n2));
    assert_eq!(tree.node(n1).unwrap().keyword(), "k");

    // Renaming the stale holder must not disturb the live mapping.
    tree.set_keyword(n1, "other").unwrap();
    assert_eq!(tree.find_node_by_keyword("k"), Some(n2));
    assert_eq!(tree.find_node_by_keyword("other"), Some(n1));

    // Releasing a keyword the node no longer holds leaves the live mapping alone.
    tree.set_keyword(n1, "").unwrap();
    tree.set_keyword(n1, "k").unwrap();
    tree.set_keyword(n2, "k2").unwrap();
    assert_eq!(tree.find_node_by_keyword("k"), Some(n1));
    assert!(tree.check_consistency().is_ok());
}

#[test]
fn test_switching_to_reject_keeps_keywords_unique() {
    let mut tree = BookmarkTree::with_policy(KeywordPolicy::Overwrite);
    let root = tree.root();
    let n1 = add_url(&mut tree, root, "https://a.example");
    let n2 = add_url(&mut tree, root, "https://b.example");
    let n3 = add_url(&mut tree, root, "https://c.example");
    tree.set_keyword(n1, "k").unwrap();
    tree.set_keyword(n2, "k").unwrap();

    assert_eq!(tree.set_keyword_policy(KeywordPolicy::Reject), 1);
    assert_eq!(tree.keyword_policy(), KeywordPolicy::Reject);
    assert!(tree.check_consistency().is_ok());
    assert_eq!(tree.node(n1).unwrap().keyword(), "");

    tree.destroy_node(n2).unwrap();
    tree.set_keyword(n3, "k").unwrap();

    let holders: Vec<NodeId> = [n1, n3]
        .into_iter()
        .filter(|id| tree.node(*id).unwrap().keyword() == "k")
        .collect();
    assert_eq!(holders, vec![n3]);
    assert_eq!(tree.find_node_by_keyword("k"), Some(n3));
    assert!(tree.check_consistency().is_ok());
}

#[test]
fn test_switching_to_reject_clears_keyword_orphaned_by_destroy() {
    let mut tree = BookmarkTree::with_policy(KeywordPolicy::Overwrite);
    let root = tree.root();
    let n1 = add_url(&mut tree, root, "https://a.example");
    let n2 = add_url(&mut tree, root, "https://b.example");
    tree.set_keyword(n1, "k").unwrap();
    tree.set_keyword(n2, "k").unwrap();
    tree.destroy_node(n2).unwrap();

    assert_eq!(tree.set_keyword_policy(KeywordPolicy::Reject), 1);
    assert_eq!(tree.node(n1).unwrap().keyword(), "");
    assert!(!tree.has_keyword("k"));
    assert!(tree.check_consistency().is_ok());
}

#[test]
fn test_switching_to_overwrite_clears_nothing() {
    let mut tree = BookmarkTree::new();
    let root = tree.root();
    let n1 = add_url(&mut tree, root, "https://a.example");
    tree.set_keyword(n1, "k").unwrap();

    assert_eq!(tree.set_keyword_policy(KeywordPolicy::Overwrite), 0);
    assert_eq!(tree.node(n1).unwrap().keyword(), "k");
}

#[test]
fn test_separator_cannot_carry_keyword() {
    let mut tree = BookmarkTree::new();
    let separator = tree.create_node(BookmarkKind::Separator, "", "").unwrap();
    assert!(matches!(
        tree.set_keyword(separator, "sep"),
        Err(BookmarkError::InvalidKind(_))
    ));
    assert!(!tree.has_keyword("sep"));
}

// === Destruction ===

#[test]
fn test_destroying_folder_clears_subtree_from_indexes() {
    let mut tree = BookmarkTree::new();
    let root = tree.root();
    let folder = add_folder(&mut tree, root, "F");
    let inner = add_folder(&mut tree, folder, "G");
    let a = add_url(&mut tree, folder, "https://a.example");
    let b = add_url(&mut tree, inner, "https://b.example");
    let shared = add_url(&mut tree, inner, "https://shared.example");
    let outside = add_url(&mut tree, root, "https://shared.example");
    tree.set_keyword(a, "ka").unwrap();
    tree.set_keyword(inner, "kg").unwrap();
    tree.set_keyword(outside, "ko").unwrap();

    tree.destroy_node(folder).unwrap();

    for id in [folder, inner, a, b, shared] {
        assert!(!tree.contains(id), "node {} should be destroyed", id);
    }
    assert!(!tree.has_url("https://a.example"));
    assert!(!tree.has_url("https://b.example"));
    assert!(!tree.has_keyword("ka"));
    assert!(!tree.has_keyword("kg"));
    assert_eq!(tree.find_nodes_by_url("https://shared.example"), vec![outside]);
    assert_eq!(tree.find_node_by_keyword("ko"), Some(outside));
    assert_eq!(tree.children(root), &[outside]);
    assert!(tree.check_consistency().is_ok());
}

#[test]
fn test_destroying_detached_node() {
    let mut tree = BookmarkTree::new();
    let id = tree.create_node(BookmarkKind::Url, "https://a.example", "a").unwrap();
    tree.set_keyword(id, "a").unwrap();
    tree.destroy_node(id).unwrap();
    assert!(!tree.has_url("https://a.example"));
    assert!(!tree.has_keyword("a"));
}

#[test]
fn test_remove_all_bookmarks_empties_root() {
    let mut tree = BookmarkTree::new();
    let root = tree.root();
    let folder = add_folder(&mut tree, root, "F");
    add_url(&mut tree, folder, "https://a.example");
    add_url(&mut tree, root, "https://b.example");

    assert_eq!(tree.remove_all_bookmarks(), 3);
    assert!(tree.children(root).is_empty());
    assert!(tree.list_all_urls().is_empty());
    assert!(tree.is_empty());
}

// === Subtree search ===

#[test]
fn test_find_descendants_by_url_is_depth_first_in_child_order() {
    let mut tree = BookmarkTree::new();
    let root = tree.root();
    let folder_a = add_folder(&mut tree, root, "FolderA");
    let nested_x = add_url(&mut tree, folder_a, "https://x");
    add_url(&mut tree, folder_a, "https://y");
    let direct_x = add_url(&mut tree, root, "https://x");

    assert_eq!(tree.find_descendants_by_url("https://x", None), vec![nested_x, direct_x]);
    assert_eq!(tree.find_descendants_by_url("https://x", Some(root)), vec![nested_x, direct_x]);
    assert_eq!(tree.find_descendants_by_url("https://x", Some(folder_a)), vec![nested_x]);
}

#[test]
fn test_find_descendants_ignores_detached_nodes() {
    let mut tree = BookmarkTree::new();
    let root = tree.root();
    let attached = add_url(&mut tree, root, "https://x");
    let detached = tree.create_node(BookmarkKind::Url, "https://x", "x").unwrap();

    assert_eq!(tree.find_nodes_by_url("https://x"), vec![attached, detached]);
    assert_eq!(tree.find_descendants_by_url("https://x", None), vec![attached]);
    assert!(tree.find_descendants_by_url("https://x", Some(NodeId(999))).is_empty());
}

// === Metadata ===

#[test]
fn test_times_and_visits() {
    let mut tree = BookmarkTree::new();
    let root = tree.root();
    let id = add_url(&mut tree, root, "https://a.example");

    tree.set_times(id, Some(100), Some(200), None).unwrap();
    tree.record_visit(id, 300).unwrap();
    tree.record_visit(id, 400).unwrap();

    let node = tree.node(id).unwrap();
    assert_eq!(node.time_added(), Some(100));
    assert_eq!(node.time_modified(), Some(200));
    assert_eq!(node.time_visited(), Some(400));
    assert_eq!(node.visit_count(), 2);
}

#[test]
fn test_title_and_description() {
    let mut tree = BookmarkTree::new();
    let root = tree.root();
    let id = add_url(&mut tree, root, "https://a.example");
    tree.set_title(id, "A site").unwrap();
    tree.set_description(id, "Notes").unwrap();
    let node = tree.node(id).unwrap();
    assert_eq!(node.title(), "A site");
    assert_eq!(node.description(), "Notes");
}
