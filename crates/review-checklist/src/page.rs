//! The host page as seen by the sync controller.
//!
//! [`Page`] is the seam between the controller's state machine and the DOM. The
//! browser implementation lives in `platform::browser`; unit tests use a recording
//! fake.

use std::fmt;

use wasm_bindgen::JsValue;

use crate::sync::{BindingId, EventSink, KeyChord};
use crate::table::ChecklistTable;

/// A DOM operation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostError {
    pub operation: &'static str,
    pub message: String,
}

impl HostError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }

    pub fn from_js(operation: &'static str, error: JsValue) -> Self {
        let message = error
            .as_string()
            .unwrap_or_else(|| format!("{error:?}"));
        Self::new(operation, message)
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.operation, self.message)
    }
}

impl std::error::Error for HostError {}

pub trait Page {
    /// Handle to a textarea. Equality is element identity.
    type Input: Clone + PartialEq + fmt::Debug;

    /// Gerrit's comment textarea, if the reply panel is open.
    fn find_native_input(&self) -> Option<Self::Input>;

    /// Create the proxy textarea. Edits and key presses are published to `events`
    /// as `ProxyEdited` and `ProxyKey`.
    fn create_proxy(&self, events: &EventSink) -> Result<Self::Input, HostError>;

    /// Move `native` off-screen (it must stay focusable), apply the host layout
    /// fixups and place `proxy` right after it.
    fn mount_proxy(&self, native: &Self::Input, proxy: &Self::Input) -> Result<(), HostError>;

    /// Publish `NativeFocused { binding }` whenever `native` gains focus. Replaces the
    /// listener of any previously wired native input.
    fn forward_focus(
        &self,
        native: &Self::Input,
        binding: BindingId,
        events: &EventSink,
    ) -> Result<(), HostError>;

    fn value(&self, input: &Self::Input) -> String;

    fn set_value(&self, input: &Self::Input, value: &str);

    /// Dispatch a bubbling `input` event so the host's bindings pick up a value
    /// written by [`Page::set_value`].
    fn notify_input(&self, input: &Self::Input) -> Result<(), HostError>;

    fn focus(&self, input: &Self::Input) -> Result<(), HostError>;

    /// Dispatch a `keydown` equivalent to `chord` on `input`.
    fn replay_key(&self, input: &Self::Input, chord: &KeyChord) -> Result<(), HostError>;

    /// Whether the checklist table is in the document.
    fn has_table(&self) -> bool;

    /// Insert the checklist table after `proxy`. Radio selections are published to
    /// `events` as `StatusSelected`. Reuses the table built on the first call.
    fn insert_table(
        &self,
        proxy: &Self::Input,
        table: &ChecklistTable,
        events: &EventSink,
    ) -> Result<(), HostError>;
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory [`Page`] recording every operation.

    use std::cell::{Cell, RefCell};
    use std::collections::BTreeMap;
    use std::rc::Rc;

    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
    pub struct FakeInput(pub u32);

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum Op {
        CreateProxy(FakeInput),
        Mount { native: FakeInput, proxy: FakeInput },
        ForwardFocus { native: FakeInput, binding: BindingId },
        NotifyInput(FakeInput),
        Focus(FakeInput),
        ReplayKey(FakeInput, KeyChord),
        InsertTable { proxy: FakeInput, rows: usize },
    }

    #[derive(Default)]
    struct State {
        next_id: u32,
        native: Option<FakeInput>,
        values: BTreeMap<FakeInput, String>,
        hidden: Vec<FakeInput>,
        table_mounted: bool,
        focused: Option<FakeInput>,
        ops: Vec<Op>,
        focus_wiring: Option<(FakeInput, BindingId)>,
        events: Option<EventSink>,
        fail_mount: bool,
    }

    /// Cheap to clone; clones share the same document.
    #[derive(Clone, Default)]
    pub struct FakePage {
        state: Rc<RefCell<State>>,
        table_inserts: Rc<Cell<usize>>,
    }

    impl FakePage {
        pub fn new() -> Self {
            Self::default()
        }

        fn next_input(&self) -> FakeInput {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            FakeInput(state.next_id)
        }

        /// Gerrit renders a (new) reply textarea holding `value`.
        pub fn render_native(&self, value: &str) -> FakeInput {
            let input = self.next_input();
            let mut state = self.state.borrow_mut();
            state.values.insert(input, value.to_string());
            state.native = Some(input);
            // a re-render discards everything Gerrit owned, including our table
            state.table_mounted = false;
            input
        }

        /// Gerrit closes the reply panel.
        pub fn close_panel(&self) {
            let mut state = self.state.borrow_mut();
            state.native = None;
            state.table_mounted = false;
        }

        /// User types into `input`; the proxy's listener publishes the edit.
        pub fn type_text(&self, input: FakeInput, text: &str) {
            let events = {
                let mut state = self.state.borrow_mut();
                state.values.insert(input, text.to_string());
                state.events.clone()
            };
            if let Some(events) = events {
                events(crate::sync::SyncEvent::ProxyEdited);
            }
        }

        /// Browser focuses `input`, running its focus listener if one is wired.
        pub fn focus_by_user(&self, input: FakeInput) {
            let (wiring, events) = {
                let mut state = self.state.borrow_mut();
                state.focused = Some(input);
                (state.focus_wiring, state.events.clone())
            };
            if let (Some((native, binding)), Some(events)) = (wiring, events) {
                if native == input {
                    events(crate::sync::SyncEvent::NativeFocused { binding });
                }
            }
        }

        pub fn fail_next_mount(&self) {
            self.state.borrow_mut().fail_mount = true;
        }

        pub fn value_of(&self, input: FakeInput) -> String {
            self.state.borrow().values.get(&input).cloned().unwrap_or_default()
        }

        pub fn focused(&self) -> Option<FakeInput> {
            self.state.borrow().focused
        }

        pub fn is_hidden(&self, input: FakeInput) -> bool {
            self.state.borrow().hidden.contains(&input)
        }

        pub fn ops(&self) -> Vec<Op> {
            self.state.borrow().ops.clone()
        }

        pub fn count_ops(&self, matches: impl Fn(&Op) -> bool) -> usize {
            self.state.borrow().ops.iter().filter(|op| matches(op)).count()
        }

        pub fn table_inserts(&self) -> usize {
            self.table_inserts.get()
        }

        pub fn clear_ops(&self) {
            self.state.borrow_mut().ops.clear();
        }

        fn record(&self, op: Op) {
            self.state.borrow_mut().ops.push(op);
        }
    }

    impl Page for FakePage {
        type Input = FakeInput;

        fn find_native_input(&self) -> Option<FakeInput> {
            self.state.borrow().native
        }

        fn create_proxy(&self, events: &EventSink) -> Result<FakeInput, HostError> {
            let proxy = self.next_input();
            self.state.borrow_mut().events = Some(events.clone());
            self.record(Op::CreateProxy(proxy));
            Ok(proxy)
        }

        fn mount_proxy(&self, native: &FakeInput, proxy: &FakeInput) -> Result<(), HostError> {
            {
                let mut state = self.state.borrow_mut();
                if state.fail_mount {
                    state.fail_mount = false;
                    return Err(HostError::new("insert proxy", "detached parent"));
                }
                state.hidden.push(*native);
            }
            self.record(Op::Mount {
                native: *native,
                proxy: *proxy,
            });
            Ok(())
        }

        fn forward_focus(
            &self,
            native: &FakeInput,
            binding: BindingId,
            events: &EventSink,
        ) -> Result<(), HostError> {
            {
                let mut state = self.state.borrow_mut();
                state.focus_wiring = Some((*native, binding));
                state.events = Some(events.clone());
            }
            self.record(Op::ForwardFocus {
                native: *native,
                binding,
            });
            Ok(())
        }

        fn value(&self, input: &FakeInput) -> String {
            self.value_of(*input)
        }

        fn set_value(&self, input: &FakeInput, value: &str) {
            self.state.borrow_mut().values.insert(*input, value.to_string());
        }

        fn notify_input(&self, input: &FakeInput) -> Result<(), HostError> {
            self.record(Op::NotifyInput(*input));
            Ok(())
        }

        fn focus(&self, input: &FakeInput) -> Result<(), HostError> {
            self.record(Op::Focus(*input));
            self.focus_by_user(*input);
            Ok(())
        }

        fn replay_key(&self, input: &FakeInput, chord: &KeyChord) -> Result<(), HostError> {
            self.record(Op::ReplayKey(*input, chord.clone()));
            Ok(())
        }

        fn has_table(&self) -> bool {
            self.state.borrow().table_mounted
        }

        fn insert_table(
            &self,
            proxy: &FakeInput,
            table: &ChecklistTable,
            _events: &EventSink,
        ) -> Result<(), HostError> {
            self.state.borrow_mut().table_mounted = true;
            self.table_inserts.set(self.table_inserts.get() + 1);
            self.record(Op::InsertTable {
                proxy: *proxy,
                rows: table.rows.len(),
            });
            Ok(())
        }
    }
}
