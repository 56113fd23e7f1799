// Bookmark store services
// Services work through the managers: importing bookmarks, editing preferences.

pub mod bookmarks_importer;
pub mod preferences;
