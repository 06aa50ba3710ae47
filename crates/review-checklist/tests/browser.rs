#![cfg(target_arch = "wasm32")]

use review_checklist::app::ChecklistApp;
use review_checklist::config::Settings;
use review_checklist::host::{HostVariant, adapter_for};
use review_checklist::platform::browser::{self, DomPage};
use review_checklist::table::TABLE_MARKER_ID;
use review_checklist::watcher::ManualWatcher;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Document, Element, Event, HtmlElement, HtmlTextAreaElement};

wasm_bindgen_test_configure!(run_in_browser);

/// A GWT reply popup holding one comment textarea.
fn render_reply_popup(document: &Document, text: &str) -> (Element, HtmlTextAreaElement) {
    let popup = document.create_element("div").unwrap();
    popup.set_class_name("popupContent");
    let native: HtmlTextAreaElement = document
        .create_element("textarea")
        .unwrap()
        .dyn_into()
        .unwrap();
    native.set_class_name("gwt-TextArea");
    native.set_value(text);
    popup.append_child(&native).unwrap();
    document.body().unwrap().append_child(&popup).unwrap();
    (popup, native)
}

#[wasm_bindgen_test]
fn checklist_drives_the_gwt_reply_textarea() {
    let document = browser::document().unwrap();
    let (popup, native) = render_reply_popup(&document, "old draft");
    let settings = Settings::default();
    let config = settings.fallback_config();
    let page = DomPage::new(document.clone(), adapter_for(HostVariant::Gwt));
    let app = ChecklistApp::new(page, &config, &settings);
    app.attach(&mut ManualWatcher::new()).unwrap();

    let proxy: HtmlTextAreaElement = native.next_element_sibling().unwrap().dyn_into().unwrap();
    assert_eq!(proxy.rows(), 5);
    assert_eq!(native.style().get_property_value("left").unwrap(), "-10000px");
    assert_eq!(native.value(), "");
    let table_body = document.get_element_by_id(TABLE_MARKER_ID).unwrap();

    let first_yes: HtmlElement = table_body
        .query_selector("tr:first-child td:nth-child(3) input")
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap();
    first_yes.click();
    let first_item = &config.items[0];
    assert_eq!(
        native.value(),
        format!("\n\n  Reviewer checked:\n   * {first_item}")
    );

    proxy.set_value("ship it");
    proxy.dispatch_event(&Event::new("input").unwrap()).unwrap();
    assert_eq!(
        native.value(),
        format!("ship it\n\n  Reviewer checked:\n   * {first_item}")
    );

    popup.remove();
}
