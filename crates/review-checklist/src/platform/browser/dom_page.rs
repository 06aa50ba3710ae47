//! [`Page`] over the live Gerrit document.

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, EventInit, HtmlElement, HtmlInputElement, HtmlTextAreaElement,
    KeyboardEvent, KeyboardEventInit, Node,
};

use super::listener::EventListener;
use crate::host::{self, HostAdapter, HostVariant, PROXY_CLASSES};
use crate::page::{HostError, Page};
use crate::sync::{BindingId, EventSink, KeyChord, SyncEvent};
use crate::table::{ChecklistTable, STATUS_COLUMNS, TABLE_MARKER_ID};

const ITEM_TEXT_STYLE: &str = "vertical-align: middle; padding-left: 5px; font-size: 0.9em";

/// Gerrit's textarea stays focusable and readable by Gerrit, just out of sight.
const OFF_SCREEN: [(&str, &str); 2] = [("position", "fixed"), ("left", "-10000px")];

struct MountedTable {
    rule: Element,
    table: Element,
    _listeners: Vec<EventListener>,
}

pub struct DomPage {
    document: Document,
    adapter: Box<dyn HostAdapter>,
    proxy_listeners: RefCell<Vec<EventListener>>,
    focus_listener: RefCell<Option<EventListener>>,
    table: RefCell<Option<MountedTable>>,
}

impl DomPage {
    pub fn new(document: Document, adapter: Box<dyn HostAdapter>) -> Self {
        Self {
            document,
            adapter,
            proxy_listeners: RefCell::new(Vec::new()),
            focus_listener: RefCell::new(None),
            table: RefCell::new(None),
        }
    }

    /// Page for the current document, with the adapter for its Gerrit UI.
    pub fn detect() -> Result<Self, HostError> {
        let document = super::document()?;
        let variant = host::detect_variant(&document);
        log_info!("[Checklist] Detected {variant:?} UI");
        Ok(Self::new(document, host::adapter_for(variant)))
    }

    pub fn variant(&self) -> HostVariant {
        self.adapter.variant()
    }

    fn create<T: JsCast>(&self, tag: &'static str) -> Result<T, HostError> {
        self.document
            .create_element(tag)
            .map_err(|error| HostError::from_js("create element", error))?
            .dyn_into::<T>()
            .map_err(|_| HostError::new("create element", format!("<{tag}> has an unexpected type")))
    }

    fn build_table(&self, layout: &ChecklistTable, events: &EventSink) -> Result<MountedTable, HostError> {
        let mut listeners = Vec::new();

        let header_row: Element = self.create("tr")?;
        for (column, label) in ChecklistTable::header_labels().into_iter().enumerate() {
            let cell: Element = self.create("th")?;
            if column < STATUS_COLUMNS.len() {
                set_attribute(&cell, "align", "center")?;
            }
            cell.set_text_content(Some(label));
            append(&header_row, &cell)?;
        }
        let head: Element = self.create("thead")?;
        append(&head, &header_row)?;

        let body: Element = self.create("tbody")?;
        body.set_id(TABLE_MARKER_ID);
        for row in &layout.rows {
            let table_row: Element = self.create("tr")?;
            for status in STATUS_COLUMNS {
                let radio: HtmlInputElement = self.create("input")?;
                radio.set_type("radio");
                radio.set_name(&row.group_name());
                radio.set_checked(row.is_selected(status));
                let index = row.index;
                let events = events.clone();
                listeners.push(EventListener::new(&radio, "change", move |_| {
                    events(SyncEvent::StatusSelected { index, status });
                })?);

                let cell: Element = self.create("td")?;
                append(&cell, &radio)?;
                append(&table_row, &cell)?;
            }
            let text_cell: Element = self.create("td")?;
            set_attribute(&text_cell, "align", "left")?;
            set_attribute(&text_cell, "style", ITEM_TEXT_STYLE)?;
            text_cell.set_text_content(Some(&row.text));
            append(&table_row, &text_cell)?;
            append(&body, &table_row)?;
        }

        let table: Element = self.create("table")?;
        set_attribute(&table, "cellspacing", "8")?;
        set_attribute(&table, "cellpadding", "0")?;
        append(&table, &head)?;
        append(&table, &body)?;

        Ok(MountedTable {
            rule: self.create("hr")?,
            table,
            _listeners: listeners,
        })
    }
}

fn set_attribute(element: &Element, name: &str, value: &str) -> Result<(), HostError> {
    element
        .set_attribute(name, value)
        .map_err(|error| HostError::from_js("set attribute", error))
}

fn append(parent: &Node, child: &Node) -> Result<(), HostError> {
    parent
        .append_child(child)
        .map(drop)
        .map_err(|error| HostError::from_js("append child", error))
}

/// Insert `node` right after `anchor`.
fn insert_after(anchor: &Node, node: &Node) -> Result<(), HostError> {
    let parent = anchor
        .parent_node()
        .ok_or_else(|| HostError::new("insert element", "anchor has no parent"))?;
    parent
        .insert_before(node, anchor.next_sibling().as_ref())
        .map(drop)
        .map_err(|error| HostError::from_js("insert element", error))
}

fn key_chord(event: &KeyboardEvent) -> KeyChord {
    KeyChord {
        key: event.key(),
        code: event.code(),
        ctrl: event.ctrl_key(),
        alt: event.alt_key(),
        shift: event.shift_key(),
        meta: event.meta_key(),
    }
}

impl Page for DomPage {
    type Input = HtmlTextAreaElement;

    fn find_native_input(&self) -> Option<HtmlTextAreaElement> {
        self.adapter.find_input(&self.document)
    }

    fn create_proxy(&self, events: &EventSink) -> Result<HtmlTextAreaElement, HostError> {
        let proxy: HtmlTextAreaElement = self.create("textarea")?;
        let options = self.adapter.proxy_options();
        proxy.set_rows(options.rows);
        if let Some(cols) = options.cols {
            proxy.set_cols(cols);
        }
        if let Some(placeholder) = options.placeholder {
            proxy.set_placeholder(placeholder);
        }
        if options.autocomplete {
            set_attribute(&proxy, "autocomplete", "on")?;
        }
        if let Some(style) = options.style {
            set_attribute(&proxy, "style", style)?;
        }
        proxy.set_class_name(&PROXY_CLASSES.join(" "));

        let mut listeners = self.proxy_listeners.borrow_mut();
        for event_type in ["input", "change"] {
            let events = events.clone();
            listeners.push(EventListener::new(&proxy, event_type, move |_| {
                events(SyncEvent::ProxyEdited);
            })?);
        }
        let events = events.clone();
        listeners.push(EventListener::new(&proxy, "keydown", move |event: Event| {
            if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                events(SyncEvent::ProxyKey(key_chord(event)));
            }
        })?);
        Ok(proxy)
    }

    fn mount_proxy(
        &self,
        native: &HtmlTextAreaElement,
        proxy: &HtmlTextAreaElement,
    ) -> Result<(), HostError> {
        self.adapter.apply_layout_fixups(native)?;
        insert_after(native, proxy)?;
        let style = native.style();
        for (property, value) in OFF_SCREEN {
            style
                .set_property(property, value)
                .map_err(|error| HostError::from_js("hide native input", error))?;
        }
        Ok(())
    }

    fn forward_focus(
        &self,
        native: &HtmlTextAreaElement,
        binding: BindingId,
        events: &EventSink,
    ) -> Result<(), HostError> {
        let events = events.clone();
        let listener = EventListener::new(native, "focus", move |_| {
            events(SyncEvent::NativeFocused { binding });
        })?;
        // dropping the previous listener detaches it from the discarded textarea
        self.focus_listener.replace(Some(listener));
        Ok(())
    }

    fn value(&self, input: &HtmlTextAreaElement) -> String {
        input.value()
    }

    fn set_value(&self, input: &HtmlTextAreaElement, value: &str) {
        input.set_value(value);
    }

    fn notify_input(&self, input: &HtmlTextAreaElement) -> Result<(), HostError> {
        let init = EventInit::new();
        init.set_bubbles(true);
        let event = Event::new_with_event_init_dict("input", &init)
            .map_err(|error| HostError::from_js("create input event", error))?;
        input
            .dispatch_event(&event)
            .map(drop)
            .map_err(|error| HostError::from_js("dispatch input event", error))
    }

    fn focus(&self, input: &HtmlTextAreaElement) -> Result<(), HostError> {
        HtmlElement::focus(input).map_err(|error| HostError::from_js("focus", error))
    }

    fn replay_key(&self, input: &HtmlTextAreaElement, chord: &KeyChord) -> Result<(), HostError> {
        let init = KeyboardEventInit::new();
        init.set_key(&chord.key);
        init.set_code(&chord.code);
        init.set_ctrl_key(chord.ctrl);
        init.set_alt_key(chord.alt);
        init.set_shift_key(chord.shift);
        init.set_meta_key(chord.meta);
        init.set_bubbles(true);
        init.set_cancelable(true);
        let event = KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init)
            .map_err(|error| HostError::from_js("create key event", error))?;
        input
            .dispatch_event(&event)
            .map(drop)
            .map_err(|error| HostError::from_js("dispatch key event", error))
    }

    fn has_table(&self) -> bool {
        self.document.get_element_by_id(TABLE_MARKER_ID).is_some()
    }

    fn insert_table(
        &self,
        proxy: &HtmlTextAreaElement,
        layout: &ChecklistTable,
        events: &EventSink,
    ) -> Result<(), HostError> {
        let mut table = self.table.borrow_mut();
        if table.is_none() {
            *table = Some(self.build_table(layout, events)?);
        }
        let Some(mounted) = table.as_ref() else {
            return Ok(());
        };
        insert_after(proxy, &mounted.rule)?;
        insert_after(&mounted.rule, &mounted.table)
    }
}
