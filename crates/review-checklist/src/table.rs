//! Layout of the checklist table.
//!
//! Pure description of what the browser layer renders once: a header row and one
//! row of three radio buttons (N/A, no, yes) plus the item text per checklist item.

use crate::checklist::{ChecklistModel, TriState};

/// Id of the table body; its presence in the document means the table is mounted.
pub const TABLE_MARKER_ID: &str = "review-checklist";

pub const ITEM_HEADING: &str = "Did you verify:";

/// Radio columns, left to right.
pub const STATUS_COLUMNS: [TriState; 3] = [
    TriState::NotApplicable,
    TriState::NotChecked,
    TriState::Checked,
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChecklistTable {
    pub rows: Vec<TableRow>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableRow {
    pub index: usize,
    pub text: String,
    pub selected: TriState,
}

impl TableRow {
    /// Name shared by the row's radio buttons, making them mutually exclusive.
    pub fn group_name(&self) -> String {
        format!("checkbox_{}", self.index)
    }

    pub fn is_selected(&self, status: TriState) -> bool {
        self.selected == status
    }
}

impl ChecklistTable {
    pub fn from_model(model: &ChecklistModel) -> Self {
        Self {
            rows: model
                .items()
                .iter()
                .enumerate()
                .map(|(index, item)| TableRow {
                    index,
                    text: item.text().to_string(),
                    selected: item.status(),
                })
                .collect(),
        }
    }

    /// Header labels, left to right. The item heading sits above the text column.
    pub fn header_labels() -> [&'static str; 4] {
        [
            STATUS_COLUMNS[0].label(),
            STATUS_COLUMNS[1].label(),
            STATUS_COLUMNS[2].label(),
            ITEM_HEADING,
        ]
    }
}
