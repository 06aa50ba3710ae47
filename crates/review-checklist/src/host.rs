//! Host adapters: everything that depends on Gerrit's markup.
//!
//! Gerrit ships two UI generations. Each one is an interchangeable [`HostAdapter`]
//! chosen once at startup by probing for the PolyGerrit root element.

use web_sys::{Document, HtmlElement, HtmlTextAreaElement};
use wasm_bindgen::JsCast;

use crate::page::HostError;

/// Element that only exists in the PolyGerrit UI.
pub const POLYGERRIT_MARKER: &str = "gr-app";

/// Classes given to the proxy textarea so it picks up Gerrit's textarea styling.
pub const PROXY_CLASSES: [&str; 2] = ["style-scope", "iron-autogrow-textarea"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostVariant {
    PolyGerrit,
    Gwt,
}

/// Attributes of the proxy textarea.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProxyOptions {
    pub rows: u32,
    pub cols: Option<u32>,
    pub placeholder: Option<&'static str>,
    pub autocomplete: bool,
    pub style: Option<&'static str>,
}

/// A CSS property set on an ancestor of Gerrit's textarea so the panel grows to fit
/// the proxy and the checklist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StyleFixup {
    /// 1 is the textarea's parent, 2 its grandparent.
    pub ancestor: usize,
    pub property: &'static str,
    pub value: &'static str,
}

pub trait HostAdapter {
    fn variant(&self) -> HostVariant;

    /// Selector of Gerrit's comment textarea in the reply panel.
    fn input_selector(&self) -> &'static str;

    fn proxy_options(&self) -> ProxyOptions;

    fn layout_fixups(&self) -> &'static [StyleFixup];

    fn find_input(&self, document: &Document) -> Option<HtmlTextAreaElement> {
        document
            .query_selector(self.input_selector())
            .ok()
            .flatten()
            .and_then(|element| element.dyn_into::<HtmlTextAreaElement>().ok())
    }

    fn apply_layout_fixups(&self, native: &HtmlElement) -> Result<(), HostError> {
        for fixup in self.layout_fixups() {
            let Some(target) = ancestor(native, fixup.ancestor) else {
                log_debug!(
                    "[Checklist Sync] No ancestor {} for layout fixup '{}'",
                    fixup.ancestor,
                    fixup.property
                );
                continue;
            };
            target
                .style()
                .set_property(fixup.property, fixup.value)
                .map_err(|error| HostError::from_js("apply layout fixup", error))?;
        }
        Ok(())
    }
}

fn ancestor(element: &HtmlElement, generations: usize) -> Option<HtmlElement> {
    let mut current = element.clone();
    for _ in 0..generations {
        current = current.parent_element()?.dyn_into::<HtmlElement>().ok()?;
    }
    Some(current)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PolyGerritAdapter;

impl HostAdapter for PolyGerritAdapter {
    fn variant(&self) -> HostVariant {
        HostVariant::PolyGerrit
    }

    fn input_selector(&self) -> &'static str {
        "gr-reply-dialog gr-textarea textarea"
    }

    fn proxy_options(&self) -> ProxyOptions {
        ProxyOptions {
            rows: 4,
            cols: None,
            placeholder: Some("Say something nice..."),
            autocomplete: true,
            style: Some("height: inherit;"),
        }
    }

    fn layout_fixups(&self) -> &'static [StyleFixup] {
        &[
            StyleFixup {
                ancestor: 2,
                property: "min-height",
                value: "11em",
            },
            StyleFixup {
                ancestor: 2,
                property: "overflow",
                value: "scroll",
            },
        ]
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GwtAdapter;

impl HostAdapter for GwtAdapter {
    fn variant(&self) -> HostVariant {
        HostVariant::Gwt
    }

    fn input_selector(&self) -> &'static str {
        ".popupContent .gwt-TextArea"
    }

    fn proxy_options(&self) -> ProxyOptions {
        ProxyOptions {
            rows: 5,
            cols: Some(70),
            ..ProxyOptions::default()
        }
    }

    fn layout_fixups(&self) -> &'static [StyleFixup] {
        // let the gray popup background grow to fit the checklist
        &[StyleFixup {
            ancestor: 2,
            property: "max-height",
            value: "none",
        }]
    }
}

pub fn adapter_for(variant: HostVariant) -> Box<dyn HostAdapter> {
    match variant {
        HostVariant::PolyGerrit => Box::new(PolyGerritAdapter),
        HostVariant::Gwt => Box::new(GwtAdapter),
    }
}

/// Probe the page once for the UI generation.
pub fn detect_variant(document: &Document) -> HostVariant {
    match document.query_selector(POLYGERRIT_MARKER) {
        Ok(Some(_)) => HostVariant::PolyGerrit,
        _ => HostVariant::Gwt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapters_report_their_variant() {
        assert_eq!(adapter_for(HostVariant::PolyGerrit).variant(), HostVariant::PolyGerrit);
        assert_eq!(adapter_for(HostVariant::Gwt).variant(), HostVariant::Gwt);
    }

    #[test]
    fn polygerrit_targets_reply_dialog_textarea() {
        let adapter = PolyGerritAdapter;
        assert_eq!(adapter.input_selector(), "gr-reply-dialog gr-textarea textarea");

        let options = adapter.proxy_options();
        assert_eq!(options.rows, 4);
        assert!(options.autocomplete);
        assert_eq!(options.placeholder, Some("Say something nice..."));
        assert!(adapter
            .layout_fixups()
            .iter()
            .any(|fixup| fixup.property == "min-height" && fixup.value == "11em"));
    }

    #[test]
    fn gwt_targets_popup_textarea() {
        let adapter = GwtAdapter;
        assert_eq!(adapter.input_selector(), ".popupContent .gwt-TextArea");
        assert_eq!(adapter.proxy_options().cols, Some(70));
        assert_eq!(adapter.layout_fixups().len(), 1);
        assert_eq!(adapter.layout_fixups()[0].ancestor, 2);
    }
}
