use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;
use web_sys::{Document, MutationObserver, MutationObserverInit, Node};

use crate::page::HostError;
use crate::watcher::ChangeWatcher;

/// Watches a subtree for added or removed nodes. Disconnects when dropped.
pub struct MutationWatcher {
    target: Node,
    observer: Option<MutationObserver>,
    closure: Option<Closure<dyn FnMut()>>,
}

impl MutationWatcher {
    pub fn new(target: &Node) -> Self {
        Self {
            target: target.clone(),
            observer: None,
            closure: None,
        }
    }

    /// Watch the whole `<body>`. Gerrit renders the reply panel anywhere below it.
    pub fn on_body(document: &Document) -> Result<Self, HostError> {
        let body = document
            .body()
            .ok_or_else(|| HostError::new("watch document", "document has no body"))?;
        Ok(Self::new(&body))
    }

    fn disconnect(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
        self.closure = None;
    }
}

impl ChangeWatcher for MutationWatcher {
    fn watch(&mut self, on_change: Box<dyn FnMut()>) -> Result<(), HostError> {
        self.disconnect();
        let closure = Closure::wrap(on_change);
        let observer = MutationObserver::new(closure.as_ref().unchecked_ref())
            .map_err(|error| HostError::from_js("create mutation observer", error))?;
        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(true);
        observer
            .observe_with_options(&self.target, &options)
            .map_err(|error| HostError::from_js("observe document", error))?;
        self.observer = Some(observer);
        self.closure = Some(closure);
        Ok(())
    }
}

impl Drop for MutationWatcher {
    fn drop(&mut self) {
        self.disconnect();
    }
}
