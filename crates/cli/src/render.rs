//! Plain-text rendering of the schedule grid.

use std::collections::HashMap;
use std::fmt::Write;

use rota_core::grid::{CellKey, CellState};
use rota_core::schedule::{ScheduleSummary, ShiftType};
use rota_core::types::ShiftTypeId;
use rota_editor::ViewState;

/// Shown for a day off.
const OFF: &str = "-";

/// Appended to cells with unsaved edits.
const UNSAVED_MARK: &str = "*";

/// Render the open schedule as one row per employee and one column per
/// day, followed by the employee's total hours.
pub fn render_grid(view: &ViewState, shift_types: &[ShiftType]) -> String {
    let labels: HashMap<ShiftTypeId, &str> =
        shift_types.iter().map(|s| (s.id, s.label())).collect();
    let grid = &view.grid;

    let mut header = vec!["Employee".to_string()];
    header.extend(grid.date_keys.iter().map(|d| d.date().format("%m-%d").to_string()));
    header.push("Hours".to_string());

    let mut rows = vec![header];
    for employee in &grid.employees {
        let mut row = vec![employee.name.clone()];
        for date in &grid.date_keys {
            let key = CellKey::new(employee.id, *date);
            let shift = match grid.cell(&key) {
                Some(cell) => cell.shift_type_id,
                None => view.staging.selection(&key),
            };
            let mut text = match shift {
                Some(id) => labels.get(&id).map_or_else(|| id.to_string(), |l| l.to_string()),
                None => OFF.to_string(),
            };
            if matches!(
                view.cell_state(&key),
                CellState::StagedEdit | CellState::PendingCreate
            ) {
                text.push_str(UNSAVED_MARK);
            }
            row.push(text);
        }
        row.push(
            view.hours_for(employee.id)
                .map_or_else(|| OFF.to_string(), |h| format!("{h:.1}")),
        );
        rows.push(row);
    }

    let columns = rows[0].len();
    let widths: Vec<usize> = (0..columns)
        .map(|i| rows.iter().map(|r| r[i].chars().count()).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    for row in &rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    }
    out
}

/// One line per schedule.
pub fn render_schedule_list(schedules: &[ScheduleSummary]) -> String {
    fn opt<T: ToString>(value: Option<T>) -> String {
        value.map_or_else(|| OFF.to_string(), |v| v.to_string())
    }

    let mut out = String::new();
    let _ = writeln!(out, "{:<6}  {:<6}  {:<10}  {:<10}", "ID", "TEAM", "START", "END");
    for s in schedules {
        let _ = writeln!(
            out,
            "{:<6}  {:<6}  {:<10}  {:<10}",
            s.id,
            opt(s.team_id),
            opt(s.start_date),
            opt(s.end_date),
        );
    }
    out
}
