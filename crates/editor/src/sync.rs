//! Save orchestrator.
//!
//! Pushes one staged cell to the server and reconciles the grid with the
//! response. A save never fails outright: every path ends in a
//! [`SaveOutcome`], settles the cell's staging markers and refreshes the
//! hours totals.

use std::sync::Arc;

use rota_client::ScheduleApi;
use rota_core::grid::{CellKey, GridCell};
use rota_core::guard::Clock;
use rota_core::schedule::UpsertAssignment;
use rota_core::types::{DbId, ScheduleId, ShiftTypeId};
use rota_events::bus::{EditorEvent, EventBus};
use rota_events::toast::ToastCenter;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::hours::HoursAggregator;
use crate::state::ViewState;

/// Why a save was not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoSchedule,
    /// The date is today or earlier.
    PastDate,
    MissingCell,
}

/// Terminal result of one cell save.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SaveOutcome {
    /// Guard rejection; nothing was sent and no marker changed.
    Skipped { reason: SkipReason },
    /// The upsert succeeded. `id` is `None` when the server returned no
    /// canonical record and the local value was kept.
    Saved {
        id: Option<DbId>,
        shift_type_id: ShiftTypeId,
    },
    /// The cell was set to "off" and deleted.
    Deleted,
    /// The delete failed; the cell was removed locally anyway.
    DeleteFailed { error: String },
    /// The upsert of a locally created cell failed and the cell was removed.
    RolledBack { error: String },
    /// The upsert of a saved cell failed; the local edit is kept for retry.
    Retained { error: String },
    /// A new cell was chosen as "off"; there was nothing to send.
    Cleared,
}

impl SaveOutcome {
    /// `true` when a request was sent and failed.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            SaveOutcome::DeleteFailed { .. }
                | SaveOutcome::RolledBack { .. }
                | SaveOutcome::Retained { .. }
        )
    }

    fn skipped(reason: SkipReason) -> Self {
        SaveOutcome::Skipped { reason }
    }
}

pub struct SaveOrchestrator {
    api: Arc<dyn ScheduleApi>,
    clock: Arc<dyn Clock>,
    view: Arc<RwLock<ViewState>>,
    hours: HoursAggregator,
    bus: Arc<EventBus>,
    toasts: ToastCenter,
}

impl SaveOrchestrator {
    pub fn new(
        api: Arc<dyn ScheduleApi>,
        clock: Arc<dyn Clock>,
        view: Arc<RwLock<ViewState>>,
        bus: Arc<EventBus>,
        toasts: ToastCenter,
    ) -> Self {
        let hours = HoursAggregator::new(Arc::clone(&api), Arc::clone(&view), Arc::clone(&bus));
        Self {
            api,
            clock,
            view,
            hours,
            bus,
            toasts,
        }
    }

    pub fn hours(&self) -> &HoursAggregator {
        &self.hours
    }

    /// Save the cell at `key` using its current, possibly edited, value.
    ///
    /// "Off" deletes the assignment; anything else upserts it.
    pub async fn save_cell(&self, key: CellKey) -> SaveOutcome {
        let (schedule_id, target, created_locally) = {
            let view = self.view.read().await;
            let Some(schedule_id) = view.schedule_id() else {
                return SaveOutcome::skipped(SkipReason::NoSchedule);
            };
            if self.clock.is_past_or_today(key.date) {
                tracing::debug!(%key, "Refusing to save a past date");
                return SaveOutcome::skipped(SkipReason::PastDate);
            }
            let Some(cell) = view.grid.cell(&key) else {
                return SaveOutcome::skipped(SkipReason::MissingCell);
            };
            (
                schedule_id,
                cell.shift_type_id,
                view.staging.is_created_locally(&key),
            )
        };

        let outcome = match target {
            None => self.delete(schedule_id, key).await,
            Some(shift_type_id) => {
                self.upsert(schedule_id, key, shift_type_id, created_locally)
                    .await
            }
        };

        {
            let mut view = self.view.write().await;
            if view.is_showing(schedule_id) {
                view.staging.settle(&key);
            }
        }

        self.hours.refresh(schedule_id).await;
        outcome
    }

    /// Materialize a cell from an empty-cell selection, then save it.
    ///
    /// Choosing "off" for an empty cell only clears its markers.
    pub async fn create_cell_and_save(
        &self,
        key: CellKey,
        choice: Option<ShiftTypeId>,
    ) -> SaveOutcome {
        {
            let mut guard = self.view.write().await;
            let view = &mut *guard;
            if view.schedule_id().is_none() {
                return SaveOutcome::skipped(SkipReason::NoSchedule);
            }
            if self.clock.is_past_or_today(key.date) {
                tracing::debug!(%key, "Refusing to create a cell on a past date");
                return SaveOutcome::skipped(SkipReason::PastDate);
            }

            let Some(shift_type_id) = choice else {
                view.staging.settle(&key);
                return SaveOutcome::Cleared;
            };

            match view.grid.cell_mut(&key) {
                Some(cell) => cell.shift_type_id = Some(shift_type_id),
                None => {
                    view.grid
                        .insert_cell(GridCell::local(key, Some(shift_type_id)));
                    view.staging.mark_created_locally(key);
                }
            }
            view.staging.clear_selection(&key);
            view.staging.mark_changed(key);
        }

        self.save_cell(key).await
    }

    /// Save whatever is staged for `key`: the cell if one exists, else the
    /// pending empty-cell selection.
    pub async fn save_staged(&self, key: CellKey) -> SaveOutcome {
        let pending = {
            let view = self.view.read().await;
            if view.grid.contains(&key) {
                None
            } else {
                Some(view.staging.selection(&key))
            }
        };

        match pending {
            None => self.save_cell(key).await,
            Some(choice) => self.create_cell_and_save(key, choice).await,
        }
    }

    // ---- private helpers ----

    async fn delete(&self, schedule_id: ScheduleId, key: CellKey) -> SaveOutcome {
        let result = self
            .api
            .delete_assignment(schedule_id, key.employee_id, key.date)
            .await;

        {
            let mut view = self.view.write().await;
            if view.is_showing(schedule_id) {
                view.grid.remove_cell(&key);
            }
        }

        match result {
            Ok(()) => {
                tracing::info!(
                    schedule_id,
                    employee_id = key.employee_id,
                    date = %key.date,
                    "Assignment deleted",
                );
                self.bus
                    .publish(EditorEvent::CellDeleted { schedule_id, key });
                SaveOutcome::Deleted
            }
            Err(e) => {
                tracing::warn!(
                    schedule_id,
                    employee_id = key.employee_id,
                    date = %key.date,
                    error = %e,
                    "Delete failed; removing cell locally",
                );
                let error = e.user_message();
                self.toasts.error(format!("Failed to delete shift: {error}"));
                self.bus.publish(EditorEvent::CellSaveFailed {
                    schedule_id,
                    key,
                    rolled_back: false,
                    error: error.clone(),
                });
                SaveOutcome::DeleteFailed { error }
            }
        }
    }

    async fn upsert(
        &self,
        schedule_id: ScheduleId,
        key: CellKey,
        shift_type_id: ShiftTypeId,
        created_locally: bool,
    ) -> SaveOutcome {
        let request = UpsertAssignment {
            employee_id: key.employee_id,
            date: key.date,
            new_shift_type_id: shift_type_id,
        };

        match self.api.upsert_assignment(schedule_id, request).await {
            Ok(response) => {
                let id = response.as_ref().and_then(|a| a.id);
                let saved_shift = response
                    .and_then(|a| a.shift_type_id)
                    .unwrap_or(shift_type_id);

                let mut view = self.view.write().await;
                if view.is_showing(schedule_id) && id.is_some() {
                    view.grid.insert_at(
                        key,
                        GridCell {
                            id,
                            employee_id: key.employee_id,
                            date: key.date,
                            shift_type_id: Some(saved_shift),
                        },
                    );
                }
                drop(view);

                tracing::info!(
                    schedule_id,
                    employee_id = key.employee_id,
                    date = %key.date,
                    shift_type_id = saved_shift,
                    "Assignment saved",
                );
                self.bus.publish(EditorEvent::CellSaved {
                    schedule_id,
                    key,
                    shift_type_id: Some(saved_shift),
                });
                SaveOutcome::Saved {
                    id,
                    shift_type_id: saved_shift,
                }
            }
            Err(e) => {
                let error = e.user_message();
                if created_locally {
                    tracing::warn!(
                        schedule_id,
                        employee_id = key.employee_id,
                        date = %key.date,
                        error = %e,
                        "Create failed; rolling back cell",
                    );
                    let mut view = self.view.write().await;
                    if view.is_showing(schedule_id) {
                        view.grid.remove_cell(&key);
                        view.staging.settle(&key);
                    }
                } else {
                    tracing::warn!(
                        schedule_id,
                        employee_id = key.employee_id,
                        date = %key.date,
                        error = %e,
                        "Save failed; keeping local edit",
                    );
                }

                self.toasts.error(format!("Failed to save shift: {error}"));
                self.bus.publish(EditorEvent::CellSaveFailed {
                    schedule_id,
                    key,
                    rolled_back: created_locally,
                    error: error.clone(),
                });
                if created_locally {
                    SaveOutcome::RolledBack { error }
                } else {
                    SaveOutcome::Retained { error }
                }
            }
        }
    }
}
