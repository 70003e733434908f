//! The open schedule's view state.

use std::collections::HashMap;

use rota_core::close_flow::CloseState;
use rota_core::grid::{CellKey, CellState, GridModel, Roster};
use rota_core::schedule::{ScheduleRecord, ScheduleSummary};
use rota_core::staging::StagedEditSet;
use rota_core::types::{EmployeeId, ScheduleId};

/// Everything shown for one open schedule.
///
/// Shared behind an `Arc<tokio::sync::RwLock<_>>` by the editor, the save
/// orchestrator and the hours aggregator. The lock is never held across a
/// network call.
#[derive(Debug, Clone)]
pub struct ViewState {
    /// Header of the open schedule; `None` while closed.
    pub schedule: Option<ScheduleSummary>,
    pub grid: GridModel,
    pub staging: StagedEditSet,
    /// Employee id to server-computed total hours.
    pub hours: HashMap<EmployeeId, f64>,
    pub close_state: CloseState,
}

impl ViewState {
    pub fn schedule_id(&self) -> Option<ScheduleId> {
        self.schedule.as_ref().map(|s| s.id)
    }

    /// `true` while `schedule_id` is the open schedule.
    pub fn is_showing(&self, schedule_id: ScheduleId) -> bool {
        self.schedule_id() == Some(schedule_id)
    }

    /// Replace the whole view with a freshly fetched schedule.
    ///
    /// Staged edits and hours from any previous schedule are dropped.
    pub fn load(&mut self, record: &ScheduleRecord, roster: &Roster) {
        self.schedule = Some(ScheduleSummary {
            id: record.id,
            team_id: record.team_id,
            start_date: record.start_date,
            end_date: record.end_date,
        });
        self.grid = GridModel::build(record, roster);
        self.staging.clear();
        self.hours.clear();
        self.close_state = CloseState::Viewing;
    }

    /// Drop the grid, staged edits and hours. Returns how many staged
    /// edits were discarded.
    pub fn teardown(&mut self) -> usize {
        let discarded = self.staging.changed_count();
        *self = Self::default();
        discarded
    }

    pub fn cell_state(&self, key: &CellKey) -> CellState {
        self.grid.cell_state(key, &self.staging)
    }

    pub fn hours_for(&self, employee_id: EmployeeId) -> Option<f64> {
        self.hours.get(&employee_id).copied()
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            schedule: None,
            grid: GridModel::default(),
            staging: StagedEditSet::new(),
            hours: HashMap::new(),
            close_state: CloseState::Closed,
        }
    }
}
