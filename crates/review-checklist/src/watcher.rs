//! Watching the host document for changes.

use crate::page::HostError;

/// Invokes a callback whenever something relevant in the host document changes.
///
/// The browser implementation is `platform::browser::MutationWatcher`. The callback
/// carries no payload; the sync controller re-queries the document itself.
pub trait ChangeWatcher {
    fn watch(&mut self, on_change: Box<dyn FnMut()>) -> Result<(), HostError>;
}

/// A watcher fired by hand.
#[derive(Default)]
pub struct ManualWatcher {
    on_change: Option<Box<dyn FnMut()>>,
}

impl ManualWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the callback as if the document changed. Returns whether a callback was set.
    pub fn fire(&mut self) -> bool {
        match &mut self.on_change {
            Some(on_change) => {
                on_change();
                true
            }
            None => false,
        }
    }
}

impl ChangeWatcher for ManualWatcher {
    fn watch(&mut self, on_change: Box<dyn FnMut()>) -> Result<(), HostError> {
        self.on_change = Some(on_change);
        Ok(())
    }
}
