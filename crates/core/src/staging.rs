//! Edit staging store.
//!
//! Tracks which grid cells carry unsaved local edits. A second set marks
//! the keys whose cell was created locally and has never round-tripped;
//! the save orchestrator uses it to pick the rollback on failure. Shift
//! selections made on empty cells are held here until the cell is
//! materialized.

use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;

use crate::grid::CellKey;
use crate::types::ShiftTypeId;

#[derive(Debug, Default, Clone)]
pub struct StagedEditSet {
    changed: IndexSet<CellKey>,
    created_locally: HashSet<CellKey>,
    selections: HashMap<CellKey, Option<ShiftTypeId>>,
}

impl StagedEditSet {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- changed markers ----

    /// Idempotent insert.
    pub fn mark_changed(&mut self, key: CellKey) {
        self.changed.insert(key);
    }

    /// Idempotent remove.
    pub fn clear_changed(&mut self, key: &CellKey) {
        self.changed.shift_remove(key);
    }

    pub fn is_changed(&self, key: &CellKey) -> bool {
        self.changed.contains(key)
    }

    /// Snapshot of the changed keys, in the order they were first marked.
    pub fn changed_keys(&self) -> Vec<CellKey> {
        self.changed.iter().copied().collect()
    }

    pub fn changed_count(&self) -> usize {
        self.changed.len()
    }

    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty()
    }

    // ---- created-locally markers ----

    pub fn mark_created_locally(&mut self, key: CellKey) {
        self.created_locally.insert(key);
    }

    pub fn clear_created_locally(&mut self, key: &CellKey) {
        self.created_locally.remove(key);
    }

    pub fn is_created_locally(&self, key: &CellKey) -> bool {
        self.created_locally.contains(key)
    }

    // ---- pending selections on empty cells ----

    /// Remember the shift picked for a cell that does not exist yet.
    pub fn stage_selection(&mut self, key: CellKey, shift_type_id: Option<ShiftTypeId>) {
        self.selections.insert(key, shift_type_id);
    }

    pub fn has_selection(&self, key: &CellKey) -> bool {
        self.selections.contains_key(key)
    }

    /// The staged selection; `None` when nothing is staged or "off" was
    /// picked.
    pub fn selection(&self, key: &CellKey) -> Option<ShiftTypeId> {
        self.selections.get(key).copied().flatten()
    }

    pub fn clear_selection(&mut self, key: &CellKey) {
        self.selections.remove(key);
    }

    // ---- bulk ----

    /// Drop every marker for one key after a terminal save attempt.
    pub fn settle(&mut self, key: &CellKey) {
        self.clear_changed(key);
        self.clear_created_locally(key);
        self.clear_selection(key);
    }

    /// Forget everything; used when the grid view closes.
    pub fn clear(&mut self) {
        self.changed.clear();
        self.created_locally.clear();
        self.selections.clear();
    }
}
