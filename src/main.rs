//! Bookmark store demo.
//!
//! Builds a small bookmark tree, imports a batch of entries, exercises the
//! URL and keyword indexes, and points the home page at a bookmark.

use std::error::Error;

use bookmark_store::managers::bookmark_tree::{BookmarkTree, BookmarkTreeTrait};
use bookmark_store::services::bookmarks_importer::{BookmarksImporter, ImportEvent, ImportOptions};
use bookmark_store::services::preferences::{PreferencesEngine, PreferencesEngineTrait};
use bookmark_store::types::bookmark::BookmarkKind;
use log::info;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Starting bookmark store demo v{}", env!("CARGO_PKG_VERSION"));

    let path = std::env::temp_dir().join("bookmark_store_demo_settings.json");
    let mut engine = PreferencesEngine::new(Some(path.to_string_lossy().to_string()));
    engine.load()?;
    engine.set_value("bookmarks.allow_duplicates", serde_json::json!(false))?;

    let mut tree = engine.build_tree();
    demo_tree(&mut tree)?;
    demo_import(&mut tree, engine.import_options())?;
    demo_preferences(&mut engine, &tree)?;
    let _ = std::fs::remove_file(&path);

    println!();
    println!("  Tree holds {} nodes, {} indexed URLs", tree.len(), tree.list_all_urls().len());
    Ok(())
}

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

fn demo_tree(tree: &mut BookmarkTree) -> Result<(), Box<dyn Error>> {
    section("Bookmark Tree");

    let folder = tree.create_node(BookmarkKind::Folder, "", "Dev Resources")?;
    tree.append_node(tree.root(), folder)?;

    let docs = tree.create_node(BookmarkKind::Url, "https://docs.rs", "Docs.rs")?;
    tree.append_node(folder, docs)?;
    tree.set_keyword(docs, "docs")?;

    let crates = tree.create_node(BookmarkKind::Url, "https://crates.io", "Crates.io")?;
    tree.append_node(tree.root(), crates)?;
    println!("  Added 2 bookmarks (1 in folder, 1 at root)");

    if let Some(id) = tree.find_node_by_keyword("docs") {
        println!("  Keyword 'docs' -> bookmark {}", id);
    }
    println!("  https://docs.rs indexed: {}", tree.has_url("https://docs.rs"));

    tree.destroy_node(folder)?;
    println!("  Removed folder, https://docs.rs indexed: {}", tree.has_url("https://docs.rs"));
    println!();
    Ok(())
}

fn demo_import(tree: &mut BookmarkTree, options: ImportOptions) -> Result<(), Box<dyn Error>> {
    section("HTML Bookmarks Import");

    let events = vec![
        ImportEvent::folder("Reading"),
        ImportEvent::url("https://blog.rust-lang.org", "Rust Blog"),
        ImportEvent::AddSeparator,
        ImportEvent::url("https://crates.io", "Crates.io (again)"),
        ImportEvent::CloseFolder,
    ];

    let mut importer = BookmarksImporter::new(tree, options);
    let summary = importer.import(events)?;
    println!(
        "  {}: {} urls, {} folders, {} separators, {} duplicates skipped",
        importer.title(),
        summary.urls,
        summary.folders,
        summary.separators,
        summary.skipped_duplicates
    );
    println!();
    Ok(())
}

fn demo_preferences(engine: &mut PreferencesEngine, tree: &BookmarkTree) -> Result<(), Box<dyn Error>> {
    section("General Preferences");

    if let Some(first) = tree.find_nodes_by_url("https://crates.io").first() {
        let home_page = engine.use_bookmark_as_home_page(tree, *first)?;
        println!("  Home page set to {}", home_page);
    }

    engine.restore_home_page()?;
    println!("  Home page restored to {}", engine.get_settings().general.home_page);
    println!();
    Ok(())
}
