//! Sync controller: keeps Gerrit's textarea equal to proxy text + checklist summary.
//!
//! # States
//!
//! ```text
//!            native input found              host re-renders the textarea
//!   Idle ───────────────────────────► Bound ─────────────────────────────┐
//!    ▲                                  │  ▲                              │
//!    │      review panel closed         │  └──── rebind to new element ───┘
//!    └──────────────────────────────────┘
//! ```
//!
//! The controller is the only writer of the native textarea's value. It reacts to
//! [`SyncEvent`]s published by the page (proxy edits, key presses, focus) and to the
//! checklist model's change callback, both routed through `app::ChecklistApp`.

use std::fmt;
use std::rc::Rc;

use crate::checklist::{ChecklistModel, TriState};
use crate::page::{HostError, Page};
use crate::table::ChecklistTable;

/// Identifies one binding of the proxy to a native textarea.
///
/// Wiring attached to an earlier native textarea carries an older id and is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BindingId(pub u64);

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A key press in the proxy textarea.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyChord {
    pub key: String,
    pub code: String,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl KeyChord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    /// Escape and Ctrl+Enter belong to Gerrit (close the dialog, send the reply).
    pub fn is_host_shortcut(&self) -> bool {
        match self.key.as_str() {
            "Escape" | "Esc" => true,
            "Enter" => self.ctrl,
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncEvent {
    /// Something in the host document changed.
    DomChanged,
    /// The proxy's free text changed.
    ProxyEdited,
    ProxyKey(KeyChord),
    NativeFocused { binding: BindingId },
    /// A radio button in the checklist table was selected.
    StatusSelected { index: usize, status: TriState },
}

/// Where pages publish [`SyncEvent`]s.
pub type EventSink = Rc<dyn Fn(SyncEvent)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Bound,
}

/// Outcome of one observation cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Observation {
    /// No native textarea in the document.
    PanelClosed,
    /// Still bound to the same native textarea.
    Unchanged,
    /// Bound to a native textarea for the first time or after the host replaced it.
    Bound(BindingId),
}

struct Binding<I> {
    native: I,
    id: BindingId,
}

/// Composed value of the native textarea.
pub fn compose(free_text: &str, summary: &str) -> String {
    let mut value = String::with_capacity(free_text.len() + summary.len());
    value.push_str(free_text);
    value.push_str(summary);
    value
}

/// Text the user had typed, given a native value written as `compose(text, summary)`.
fn salvage_draft(native_value: &str, summary: &str) -> String {
    if summary.is_empty() {
        return native_value.to_string();
    }
    native_value
        .strip_suffix(summary)
        .unwrap_or(native_value)
        .to_string()
}

pub struct SyncController<P: Page> {
    page: P,
    events: EventSink,
    proxy: Option<P::Input>,
    binding: Option<Binding<P::Input>>,
    panel_open: bool,
    bindings_made: u64,
    salvage_draft_on_rebind: bool,
}

impl<P: Page> SyncController<P> {
    pub fn new(page: P, events: EventSink) -> Self {
        Self {
            page,
            events,
            proxy: None,
            binding: None,
            panel_open: false,
            bindings_made: 0,
            salvage_draft_on_rebind: false,
        }
    }

    /// Seed the proxy with the text already in a freshly found native textarea
    /// instead of clearing it.
    pub fn salvage_draft_on_rebind(mut self, enabled: bool) -> Self {
        self.salvage_draft_on_rebind = enabled;
        self
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn state(&self) -> SyncState {
        if self.panel_open && self.binding.is_some() {
            SyncState::Bound
        } else {
            SyncState::Idle
        }
    }

    pub fn proxy(&self) -> Option<&P::Input> {
        self.proxy.as_ref()
    }

    pub fn bound_native(&self) -> Option<&P::Input> {
        self.binding.as_ref().map(|binding| &binding.native)
    }

    pub fn binding_id(&self) -> Option<BindingId> {
        self.binding.as_ref().map(|binding| binding.id)
    }

    /// One observation cycle, run on every host DOM change.
    pub fn observe(&mut self, model: &ChecklistModel) -> Result<Observation, HostError> {
        let Some(native) = self.page.find_native_input() else {
            if self.panel_open {
                log_debug!("[Checklist Sync] Review panel closed");
            }
            self.panel_open = false;
            return Ok(Observation::PanelClosed);
        };
        self.panel_open = true;

        let observation = if self.bound_native() == Some(&native) {
            Observation::Unchanged
        } else {
            Observation::Bound(self.bind(native, model)?)
        };

        if !self.page.has_table() {
            if let Some(proxy) = &self.proxy {
                self.page
                    .insert_table(proxy, &ChecklistTable::from_model(model), &self.events)?;
                log_debug!("[Checklist Sync] Checklist table inserted");
            }
        }
        Ok(observation)
    }

    fn bind(&mut self, native: P::Input, model: &ChecklistModel) -> Result<BindingId, HostError> {
        let proxy = match &self.proxy {
            Some(proxy) => proxy.clone(),
            None => {
                let proxy = self.page.create_proxy(&self.events)?;
                self.proxy = Some(proxy.clone());
                proxy
            }
        };

        let draft = if self.salvage_draft_on_rebind {
            salvage_draft(&self.page.value(&native), &model.summarize())
        } else {
            String::new()
        };
        self.page.set_value(&proxy, &draft);
        self.page.mount_proxy(&native, &proxy)?;

        self.bindings_made += 1;
        let id = BindingId(self.bindings_made);
        self.page.forward_focus(&native, id, &self.events)?;
        self.binding = Some(Binding { native, id });
        log_debug!("[Checklist Sync] Bound to native input {id}");

        self.recompute(model)?;
        Ok(id)
    }

    fn write_native(&self, summary: &str) -> Result<(), HostError> {
        let (Some(binding), Some(proxy)) = (&self.binding, &self.proxy) else {
            return Ok(());
        };
        let value = compose(&self.page.value(proxy), summary);
        self.page.set_value(&binding.native, &value);
        self.page.notify_input(&binding.native)
    }

    /// Rewrite the native value from the proxy text and the current model.
    pub fn recompute(&self, model: &ChecklistModel) -> Result<(), HostError> {
        self.write_native(&model.summarize())
    }

    pub fn on_proxy_edited(&self, model: &ChecklistModel) -> Result<(), HostError> {
        self.recompute(model)
    }

    /// Called from the model's change callback with the fresh summary.
    pub fn on_checklist_changed(&self, summary: &str) -> Result<(), HostError> {
        self.write_native(summary)
    }

    /// Forward Gerrit's shortcuts to the native textarea. Returns whether the key was
    /// forwarded.
    pub fn on_proxy_key(&self, chord: &KeyChord) -> Result<bool, HostError> {
        if !chord.is_host_shortcut() {
            return Ok(false);
        }
        let Some(binding) = &self.binding else {
            return Ok(false);
        };
        log_debug!("[Checklist Sync] Forwarding '{}' to native input", chord.key);
        self.page.focus(&binding.native)?;
        self.page.replay_key(&binding.native, chord)?;
        Ok(true)
    }

    /// The native textarea got focus: hand it to the proxy.
    pub fn on_native_focused(&self, binding: BindingId) -> Result<(), HostError> {
        match (&self.binding, &self.proxy) {
            (Some(current), Some(proxy)) if current.id == binding => self.page.focus(proxy),
            _ => {
                log_debug!("[Checklist Sync] Ignoring focus of stale native input {binding}");
                Ok(())
            }
        }
    }
}
