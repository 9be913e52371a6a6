//! Multi-file selection used by the insert and merge workflows.
//!
//! The selection lives in a single tagged state, [`SelectionState`], so that "not selecting" and
//! "selecting for a merge" can never be mixed up:
//!
//! * `Idle`: picks are ignored.
//! * `Inserting`: one pick replaces the selection and immediately ends the gesture; the picked
//!   file is handed back to the caller as [`SelectOutcome::InsertReady`].
//! * `Merging`: picks toggle membership; entries carry a dense 1-based `selection_order`.

use serde::{Deserialize, Serialize};

/// A file picked in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFile {
    pub collection_id: String,
    pub file_id: String,
    pub file_name: String,
    /// 1-based rank; the entries of a [`Selection`] always hold exactly `1..=len`.
    pub selection_order: usize,
}

/// Files picked so far, in pick order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    entries: Vec<SelectedFile>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// A selection holding just one file.
    pub fn single(collection_id: &str, file_id: &str, file_name: &str) -> Self {
        let mut selection = Self::new();
        selection.push(collection_id, file_id, file_name);
        selection
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, file_id: &str) -> bool {
        self.entries.iter().any(|e| e.file_id == file_id)
    }

    pub fn entries(&self) -> &[SelectedFile] {
        &self.entries
    }

    /// Entries sorted by `selection_order`, i.e. the order in which content gets concatenated.
    pub fn ordered(&self) -> Vec<&SelectedFile> {
        let mut ordered: Vec<_> = self.entries.iter().collect();
        ordered.sort_by_key(|e| e.selection_order);
        ordered
    }

    fn push(&mut self, collection_id: &str, file_id: &str, file_name: &str) -> usize {
        let selection_order = self.entries.len() + 1;
        self.entries.push(SelectedFile {
            collection_id: collection_id.to_string(),
            file_id: file_id.to_string(),
            file_name: file_name.to_string(),
            selection_order,
        });
        selection_order
    }

    /// Removes a file and renumbers the rest to `1..=len`, keeping their relative order.
    fn remove(&mut self, file_id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.file_id != file_id);
        if self.entries.len() == before {
            return false;
        }
        self.entries.sort_by_key(|e| e.selection_order);
        for (idx, entry) in self.entries.iter_mut().enumerate() {
            entry.selection_order = idx + 1;
        }
        true
    }
}

/// Which workflow, if any, picks are currently feeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    None,
    Insert,
    Merge,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SelectionState {
    #[default]
    Idle,
    Inserting(Selection),
    Merging(Selection),
}

/// What a pick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// No selection workflow is active.
    Ignored,
    /// The insert gesture finished; the state is back to idle.
    InsertReady(Selection),
    /// Appended to the merge selection with this order.
    Added(usize),
    /// Was already selected for the merge and has been dropped.
    Removed,
}

impl SelectionState {
    pub fn mode(&self) -> SelectionMode {
        match self {
            SelectionState::Idle => SelectionMode::None,
            SelectionState::Inserting(_) => SelectionMode::Insert,
            SelectionState::Merging(_) => SelectionMode::Merge,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, SelectionState::Idle)
    }

    /// The current selection, if a workflow is active.
    pub fn selection(&self) -> Option<&Selection> {
        match self {
            SelectionState::Idle => None,
            SelectionState::Inserting(selection) | SelectionState::Merging(selection) => Some(selection),
        }
    }

    /// Starts an insert gesture with an empty selection.
    pub fn begin_insert(&mut self) {
        *self = SelectionState::Inserting(Selection::new());
    }

    /// Starts a merge with an empty selection.
    pub fn begin_merge(&mut self) {
        *self = SelectionState::Merging(Selection::new());
    }

    /// Drops the selection and returns to idle.
    pub fn cancel(&mut self) {
        *self = SelectionState::Idle;
    }

    /// Feeds one pick into the active workflow.
    pub fn select(&mut self, collection_id: &str, file_id: &str, file_name: &str) -> SelectOutcome {
        match self {
            SelectionState::Idle => SelectOutcome::Ignored,
            SelectionState::Inserting(_) => {
                *self = SelectionState::Idle;
                SelectOutcome::InsertReady(Selection::single(collection_id, file_id, file_name))
            }
            SelectionState::Merging(selection) => {
                if selection.remove(file_id) {
                    SelectOutcome::Removed
                } else {
                    SelectOutcome::Added(selection.push(collection_id, file_id, file_name))
                }
            }
        }
    }

    /// Ends the current workflow, handing back its selection. The state is idle afterwards.
    pub fn take(&mut self) -> Option<Selection> {
        match std::mem::take(self) {
            SelectionState::Idle => None,
            SelectionState::Inserting(selection) | SelectionState::Merging(selection) => Some(selection),
        }
    }
}
