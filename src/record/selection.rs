//! The set of checked rows in a record management table.
//!
//! The selection travels with the table as hidden form fields. Each request
//! rebuilds it, applies the user's change and then reconciles it against the
//! rows that were actually loaded, so a selection can never refer to a
//! record that is no longer shown.

use std::collections::BTreeSet;

/// The state of the "select all" checkbox in a table header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAllState {
    Unchecked,
    Checked,
    /// Some, but not all, rows are selected.
    Indeterminate,
}

/// The IDs of the selected records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<i64>,
}

impl Selection {
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Drop selected IDs that are not in `available_ids`.
    pub fn reconcile(&mut self, available_ids: &[i64]) {
        let available: BTreeSet<i64> = available_ids.iter().copied().collect();

        self.ids.retain(|id| available.contains(id));
    }

    /// Select or deselect a single record.
    pub fn toggle(&mut self, id: i64, checked: bool) {
        if checked {
            self.ids.insert(id);
        } else {
            self.ids.remove(&id);
        }
    }

    /// Replace the selection with every ID in `ids`, or clear it.
    pub fn select_all(&mut self, ids: &[i64], checked: bool) {
        self.ids.clear();

        if checked {
            self.ids.extend(ids.iter().copied());
        }
    }

    pub fn is_selected(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    /// Whether the bulk actions should be enabled.
    pub fn has_selection(&self) -> bool {
        !self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// The header checkbox state for a table of `total` rows.
    pub fn select_all_state(&self, total: usize) -> SelectAllState {
        if total == 0 || self.ids.is_empty() {
            SelectAllState::Unchecked
        } else if self.ids.len() >= total {
            SelectAllState::Checked
        } else {
            SelectAllState::Indeterminate
        }
    }

    /// The selected IDs in ascending order.
    pub fn ids(&self) -> Vec<i64> {
        self.ids.iter().copied().collect()
    }
}
