//! Grid model builder.
//!
//! Turns a [`ScheduleRecord`] (date range plus a sparse assignment list)
//! into the dense employee-by-date matrix the editor works on. Only days
//! that carry an assignment get a cell; a missing cell means "off".

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use indexmap::IndexSet;
use serde::Serialize;

use crate::dates::{date_range, DateKey};
use crate::error::CoreError;
use crate::schedule::{Assignment, Employee, ScheduleRecord};
use crate::staging::StagedEditSet;
use crate::types::{DbId, EmployeeId, ShiftTypeId};

/// Separator between the employee id and the date in a rendered key.
pub const CELL_KEY_SEPARATOR: &str = "__";

// ---------------------------------------------------------------------------
// Keys and cells
// ---------------------------------------------------------------------------

/// Address of one grid cell, rendered as `"{employee_id}__{date}"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub employee_id: EmployeeId,
    pub date: DateKey,
}

impl CellKey {
    pub fn new(employee_id: EmployeeId, date: DateKey) -> Self {
        Self { employee_id, date }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.employee_id, CELL_KEY_SEPARATOR, self.date)
    }
}

impl FromStr for CellKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::Validation(format!("Invalid cell key '{s}'"));
        let (employee, date) = s.split_once(CELL_KEY_SEPARATOR).ok_or_else(invalid)?;
        let employee_id = employee.parse().map_err(|_| invalid())?;
        let date = DateKey::parse(date).ok_or_else(invalid)?;
        Ok(Self { employee_id, date })
    }
}

impl Serialize for CellKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One assignment held in the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCell {
    /// Server id; `None` for a cell that has not round-tripped yet.
    pub id: Option<DbId>,
    pub employee_id: EmployeeId,
    pub date: DateKey,
    pub shift_type_id: Option<ShiftTypeId>,
}

impl GridCell {
    pub fn key(&self) -> CellKey {
        CellKey::new(self.employee_id, self.date)
    }

    /// A cell that exists only locally.
    pub fn local(key: CellKey, shift_type_id: Option<ShiftTypeId>) -> Self {
        Self {
            id: None,
            employee_id: key.employee_id,
            date: key.date,
            shift_type_id,
        }
    }
}

impl From<&Assignment> for GridCell {
    fn from(a: &Assignment) -> Self {
        Self {
            id: a.id,
            employee_id: a.employee_id,
            date: a.date,
            shift_type_id: a.shift_type_id,
        }
    }
}

/// Lifecycle state of a grid cell, derived from the cell map and the
/// staging store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CellState {
    /// No assignment and no pending edit; shown as "off".
    Absent,
    /// Mirrors a committed assignment.
    Saved,
    /// Exists locally and has never round-tripped.
    PendingCreate,
    /// Mirrors a committed assignment with an unsaved local override.
    StagedEdit,
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// Display-name cache for a team's employees.
#[derive(Debug, Default, Clone)]
pub struct Roster {
    names: HashMap<EmployeeId, String>,
}

impl Roster {
    pub fn from_employees(employees: &[Employee]) -> Self {
        let names = employees
            .iter()
            .filter_map(|e| {
                let name = e.display_name();
                (!name.is_empty()).then_some((e.id, name))
            })
            .collect();
        Self { names }
    }

    /// Best-effort display name, the stringified id when unknown.
    pub fn display_name(&self, employee_id: EmployeeId) -> String {
        self.names
            .get(&employee_id)
            .cloned()
            .unwrap_or_else(|| employee_id.to_string())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Grid model
// ---------------------------------------------------------------------------

/// One matrix row header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridEmployee {
    pub id: EmployeeId,
    pub name: String,
}

/// Dense employee-by-date view of a schedule.
#[derive(Debug, Default, Clone, Serialize)]
pub struct GridModel {
    /// Every day of the schedule, ascending.
    pub date_keys: Vec<DateKey>,
    /// Employees in order of first appearance in the assignment list.
    pub employees: Vec<GridEmployee>,
    cells: HashMap<CellKey, GridCell>,
}

impl GridModel {
    /// Build the matrix for a schedule.
    ///
    /// Dates span `start_date..=end_date`; without both bounds they fall
    /// back to the distinct assignment dates. A later assignment for the
    /// same (employee, date) overwrites an earlier one.
    pub fn build(record: &ScheduleRecord, roster: &Roster) -> Self {
        let date_keys = match (record.start_date, record.end_date) {
            (Some(start), Some(end)) => date_range(start, end),
            _ => record
                .assignments
                .iter()
                .map(|a| a.date)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        };

        let employee_ids: IndexSet<EmployeeId> =
            record.assignments.iter().map(|a| a.employee_id).collect();
        let employees = employee_ids
            .into_iter()
            .map(|id| GridEmployee {
                id,
                name: roster.display_name(id),
            })
            .collect();

        let mut cells = HashMap::with_capacity(record.assignments.len());
        for assignment in &record.assignments {
            let cell = GridCell::from(assignment);
            cells.insert(cell.key(), cell);
        }

        Self {
            date_keys,
            employees,
            cells,
        }
    }

    pub fn cell(&self, key: &CellKey) -> Option<&GridCell> {
        self.cells.get(key)
    }

    pub fn cell_mut(&mut self, key: &CellKey) -> Option<&mut GridCell> {
        self.cells.get_mut(key)
    }

    pub fn contains(&self, key: &CellKey) -> bool {
        self.cells.contains_key(key)
    }

    /// Shift at a key; a missing cell reads as off (`None`).
    pub fn shift_at(&self, key: &CellKey) -> Option<ShiftTypeId> {
        self.cells.get(key).and_then(|c| c.shift_type_id)
    }

    /// Insert or replace the cell at its own key.
    pub fn insert_cell(&mut self, cell: GridCell) {
        self.cells.insert(cell.key(), cell);
    }

    /// Insert or replace the cell stored under `key`, whatever the cell's
    /// own fields say.
    pub fn insert_at(&mut self, key: CellKey, cell: GridCell) {
        self.cells.insert(key, cell);
    }

    pub fn remove_cell(&mut self, key: &CellKey) -> Option<GridCell> {
        self.cells.remove(key)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.values()
    }

    /// Derive the lifecycle state of a cell.
    pub fn cell_state(&self, key: &CellKey, staging: &StagedEditSet) -> CellState {
        match self.cells.get(key) {
            None if staging.has_selection(key) => CellState::PendingCreate,
            None => CellState::Absent,
            Some(_) if staging.is_created_locally(key) => CellState::PendingCreate,
            Some(_) if staging.is_changed(key) => CellState::StagedEdit,
            Some(_) => CellState::Saved,
        }
    }
}
