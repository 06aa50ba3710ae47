//! Checklist model: ordered items with a tri-state answer each.
//!
//! Item texts and their order are fixed at construction. Only statuses change, and
//! every change goes through [`ChecklistModel::set_status`], which notifies the
//! registered change callback before returning.

use std::fmt;

const CHECKED_HEADER: &str = "Reviewer checked:";
const NOT_CHECKED_HEADER: &str = "Reviewer DID NOT check:";

/// Answer to a single checklist item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TriState {
    Checked,
    NotChecked,
    #[default]
    NotApplicable,
}

impl TriState {
    /// Maps the `defaultStatus` field of the remote config
    /// (`true`, `false` or `null`).
    pub fn from_json(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Checked,
            Some(false) => Self::NotChecked,
            None => Self::NotApplicable,
        }
    }

    /// Column label in the checklist table.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Checked => "yes",
            Self::NotChecked => "no",
            Self::NotApplicable => "N/A",
        }
    }
}

impl fmt::Display for TriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChecklistItem {
    text: String,
    status: TriState,
}

impl ChecklistItem {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn status(&self) -> TriState {
        self.status
    }
}

type ChangeCallback = Box<dyn Fn(&ChecklistModel)>;

/// Ordered set of answerable checklist items.
pub struct ChecklistModel {
    items: Vec<ChecklistItem>,
    on_change: Option<ChangeCallback>,
}

impl ChecklistModel {
    pub fn new(items: impl IntoIterator<Item = impl Into<String>>, default_status: TriState) -> Self {
        Self {
            items: items
                .into_iter()
                .map(|text| ChecklistItem {
                    text: text.into(),
                    status: default_status,
                })
                .collect(),
            on_change: None,
        }
    }

    /// Register the callback invoked after every successful `set_status`.
    /// Replaces any previously registered callback.
    pub fn on_change(&mut self, callback: impl Fn(&ChecklistModel) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn status(&self, index: usize) -> Option<TriState> {
        self.items.get(index).map(ChecklistItem::status)
    }

    /// Overwrite the status of the item at `index` and notify the change callback.
    ///
    /// An out-of-range index is ignored; returns whether the index was valid.
    pub fn set_status(&mut self, index: usize, status: TriState) -> bool {
        let Some(item) = self.items.get_mut(index) else {
            return false;
        };
        item.status = status;
        if let Some(callback) = &self.on_change {
            callback(self);
        }
        true
    }

    /// Text block appended to the reviewer's comment.
    ///
    /// Empty when no item is answered with yes or no.
    pub fn summarize(&self) -> String {
        let mut summary = String::new();
        for (header, status) in [
            (CHECKED_HEADER, TriState::Checked),
            (NOT_CHECKED_HEADER, TriState::NotChecked),
        ] {
            let mut texts = self
                .items
                .iter()
                .filter(|item| item.status == status)
                .map(ChecklistItem::text)
                .peekable();
            if texts.peek().is_none() {
                continue;
            }
            summary.push_str("\n\n  ");
            summary.push_str(header);
            for text in texts {
                summary.push_str("\n   * ");
                summary.push_str(text);
            }
        }
        summary
    }
}

impl fmt::Debug for ChecklistModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChecklistModel")
            .field("items", &self.items)
            .field("has_on_change", &self.on_change.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn model_abc() -> ChecklistModel {
        ChecklistModel::new(["A", "B", "C"], TriState::NotApplicable)
    }

    #[test]
    fn default_status_applies_to_every_item() {
        let model = ChecklistModel::new(["A", "B"], TriState::NotChecked);
        assert!(model.items().iter().all(|item| item.status() == TriState::NotChecked));
        assert_eq!(model.items()[1].text(), "B");
    }

    #[test]
    fn json_default_status_mapping() {
        assert_eq!(TriState::from_json(Some(true)), TriState::Checked);
        assert_eq!(TriState::from_json(Some(false)), TriState::NotChecked);
        assert_eq!(TriState::from_json(None), TriState::NotApplicable);
    }

    #[test]
    fn summary_is_empty_when_everything_is_not_applicable() {
        let mut model = model_abc();
        assert_eq!(model.summarize(), "");

        model.set_status(1, TriState::Checked);
        assert_ne!(model.summarize(), "");

        model.set_status(1, TriState::NotApplicable);
        assert_eq!(model.summarize(), "");
    }

    #[test]
    fn summary_lists_checked_before_not_checked() {
        let mut model = model_abc();
        model.set_status(0, TriState::Checked);
        model.set_status(1, TriState::NotChecked);

        assert_eq!(
            model.summarize(),
            "\n\n  Reviewer checked:\n   * A\n\n  Reviewer DID NOT check:\n   * B"
        );
    }

    #[test]
    fn summary_keeps_item_order_regardless_of_answer_order() {
        let mut model = ChecklistModel::new(["one", "two", "three", "four"], TriState::NotApplicable);
        model.set_status(3, TriState::NotChecked);
        model.set_status(2, TriState::Checked);
        model.set_status(0, TriState::Checked);
        model.set_status(1, TriState::NotChecked);

        assert_eq!(
            model.summarize(),
            "\n\n  Reviewer checked:\n   * one\n   * three\n\n  Reviewer DID NOT check:\n   * two\n   * four"
        );
    }

    #[test]
    fn summary_omits_empty_checked_section() {
        let mut model = model_abc();
        model.set_status(2, TriState::NotChecked);

        assert_eq!(model.summarize(), "\n\n  Reviewer DID NOT check:\n   * C");
    }

    #[test]
    fn out_of_range_index_is_ignored() {
        let calls = Rc::new(RefCell::new(0));
        let mut model = model_abc();
        model.on_change({
            let calls = calls.clone();
            move |_| *calls.borrow_mut() += 1
        });

        assert!(!model.set_status(3, TriState::Checked));
        assert_eq!(*calls.borrow(), 0);
        assert_eq!(model.summarize(), "");
    }

    #[test]
    fn change_callback_sees_updated_model() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut model = model_abc();
        model.on_change({
            let seen = seen.clone();
            move |model| seen.borrow_mut().push(model.summarize())
        });

        assert!(model.set_status(0, TriState::Checked));
        assert!(model.set_status(0, TriState::Checked));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], "\n\n  Reviewer checked:\n   * A");
    }
}
