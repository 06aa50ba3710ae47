//! Review checklist for the Gerrit reply panel.
//!
//! The checklist lives next to Gerrit's own comment textarea. The user types into a
//! proxy textarea; the [`sync::SyncController`] keeps Gerrit's (hidden) textarea equal
//! to the proxy text followed by a summary of the checklist answers, so Gerrit submits
//! both as one comment.
//!
//! ```text
//! config::resolve_config ──► checklist::ChecklistModel ──► app::ChecklistApp
//!                                                            ├── sync::SyncController<P: Page>
//!                                                            └── watcher::ChangeWatcher
//!                                         platform::browser implements Page + ChangeWatcher
//! ```

#[macro_use]
pub mod log;

pub mod app;
pub mod checklist;
pub mod config;
pub mod host;
pub mod page;
pub mod platform;
pub mod sync;
pub mod table;
pub mod watcher;

pub use zoon;
