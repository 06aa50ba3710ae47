//! Browser implementations of the page, watcher and config fetcher.

mod dom_page;
mod fetch;
mod listener;
mod mutation_watcher;

pub use dom_page::DomPage;
pub use fetch::GitilesFetcher;
pub use listener::EventListener;
pub use mutation_watcher::MutationWatcher;

use web_sys::{Document, Window};

use crate::page::HostError;

pub fn window() -> Result<Window, HostError> {
    web_sys::window().ok_or_else(|| HostError::new("get window", "no global window"))
}

pub fn document() -> Result<Document, HostError> {
    window()?
        .document()
        .ok_or_else(|| HostError::new("get document", "window has no document"))
}

/// Full URL of the current page.
pub fn location_href() -> Result<String, HostError> {
    window()?
        .location()
        .href()
        .map_err(|error| HostError::from_js("read location", error))
}
