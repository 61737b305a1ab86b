//! Multi-selection for bulk actions, and the bulk-edit draft tied to it.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::board::repository::JobRepository;

/// Pending bulk comment/solution text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDraft {
    pub comment: String,
    pub solution: String,
}

impl BulkDraft {
    pub fn is_empty(&self) -> bool {
        self.comment.is_empty() && self.solution.is_empty()
    }
}

/// What a click on a job row means given the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Selection was non-empty; membership of the id was toggled.
    Toggled { selected: bool },
    /// Selection was empty; the caller should open single-job detail.
    OpenDetail(String),
    /// The id is not a known job; nothing changed.
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    selected: BTreeSet<String>,
    draft: BulkDraft,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` if absent, removes it if present. Returns the new membership.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.to_string());
            true
        }
    }

    /// Toggle-all: selects exactly `visible_ids` unless they are all selected
    /// already, in which case the selection is cleared.
    pub fn select_all<'a, I>(&mut self, visible_ids: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let visible: BTreeSet<String> = visible_ids.into_iter().map(str::to_string).collect();
        let all_selected = !visible.is_empty() && visible.iter().all(|id| self.selected.contains(id));

        if all_selected {
            self.selected.clear();
        } else {
            self.selected = visible;
        }
    }

    /// Empties the selection and discards the bulk draft.
    pub fn clear(&mut self) {
        self.selected.clear();
        self.draft = BulkDraft::default();
    }

    pub fn activate(&mut self, id: &str) -> Activation {
        if self.selected.is_empty() {
            Activation::OpenDetail(id.to_string())
        } else {
            Activation::Toggled {
                selected: self.toggle(id),
            }
        }
    }

    /// Drops ids the repository no longer knows. Returns how many were dropped.
    pub fn retain_present(&mut self, repository: &JobRepository) -> usize {
        let before = self.selected.len();
        self.selected.retain(|id| repository.contains(id));
        before - self.selected.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    pub fn draft(&self) -> &BulkDraft {
        &self.draft
    }

    pub fn set_draft_comment(&mut self, text: impl Into<String>) {
        self.draft.comment = text.into();
    }

    pub fn set_draft_solution(&mut self, text: impl Into<String>) {
        self.draft.solution = text.into();
    }
}
