//! The schedule editor facade.

use std::collections::HashMap;
use std::sync::Arc;

use rota_client::ScheduleApi;
use rota_core::close_flow::CloseState;
use rota_core::confirm::{ConfirmIntent, ConfirmPrompt};
use rota_core::dates::DateKey;
use rota_core::error::CoreError;
use rota_core::grid::{CellKey, Roster};
use rota_core::guard::{Clock, SystemClock};
use rota_core::schedule::{GenerateScheduleRequest, ScheduleRecord};
use rota_core::types::{ScheduleId, ShiftTypeId, TeamId};
use rota_events::bus::{EditorEvent, EventBus};
use rota_events::toast::ToastCenter;
use serde::Serialize;
use tokio::sync::{broadcast, watch, Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::queue::{BatchProgress, BatchReport, BatchTicket, SaveQueue};
use crate::state::ViewState;
use crate::sync::{SaveOrchestrator, SaveOutcome};

/// What answering the pending confirmation did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "resolution", rename_all = "snake_case")]
pub enum ConfirmResolution {
    /// A declined deletion; nothing changed.
    Dismissed,
    ScheduleDeleted { schedule_id: ScheduleId },
    /// Staged edits were saved, then the view closed.
    SavedAndClosed { report: BatchReport },
    /// Staged edits were dropped and the view closed.
    DiscardedAndClosed { discarded: usize },
}

/// Editing session for one schedule grid at a time.
///
/// Must be created inside a Tokio runtime; it spawns the batch-save worker.
pub struct ScheduleEditor {
    api: Arc<dyn ScheduleApi>,
    clock: Arc<dyn Clock>,
    view: Arc<RwLock<ViewState>>,
    sync: Arc<SaveOrchestrator>,
    queue: SaveQueue,
    bus: Arc<EventBus>,
    toasts: ToastCenter,
    /// Display-name cache per team.
    rosters: RwLock<HashMap<TeamId, Roster>>,
    /// At most one confirmation waits for an answer.
    confirm: Mutex<Option<ConfirmPrompt>>,
    cancel: CancellationToken,
}

impl ScheduleEditor {
    pub fn new(api: Arc<dyn ScheduleApi>, config: EditorConfig) -> Self {
        Self::with_clock(api, Arc::new(SystemClock), config)
    }

    /// Create an editor whose past-date guard reads "today" from `clock`.
    pub fn with_clock(
        api: Arc<dyn ScheduleApi>,
        clock: Arc<dyn Clock>,
        config: EditorConfig,
    ) -> Self {
        let view = Arc::new(RwLock::new(ViewState::default()));
        let bus = Arc::new(EventBus::default());
        let toasts = ToastCenter::new(config.toast_timeout);
        let cancel = CancellationToken::new();

        let sync = Arc::new(SaveOrchestrator::new(
            Arc::clone(&api),
            Arc::clone(&clock),
            Arc::clone(&view),
            Arc::clone(&bus),
            toasts.clone(),
        ));
        let queue = SaveQueue::spawn(
            Arc::clone(&sync),
            Arc::clone(&bus),
            toasts.clone(),
            config.save_step_delay,
            cancel.child_token(),
        );

        Self {
            api,
            clock,
            view,
            sync,
            queue,
            bus,
            toasts,
            rosters: RwLock::new(HashMap::new()),
            confirm: Mutex::new(None),
            cancel,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.bus.subscribe()
    }

    pub fn toasts(&self) -> &ToastCenter {
        &self.toasts
    }

    /// Copy of the current view state.
    pub async fn view(&self) -> ViewState {
        self.view.read().await.clone()
    }

    pub fn batch_progress(&self) -> BatchProgress {
        self.queue.progress()
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<BatchProgress> {
        self.queue.subscribe_progress()
    }

    // ---- opening ----

    /// Fetch a schedule and show it.
    pub async fn open(&self, schedule_id: ScheduleId) -> Result<(), EditorError> {
        let record = self.api.fetch_schedule(schedule_id).await.map_err(|e| {
            tracing::error!(schedule_id, error = %e, "Failed to load schedule");
            self.toasts.error(e.user_message());
            e
        })?;
        self.open_record(record).await
    }

    /// Show an already-fetched schedule, replacing whatever was open.
    pub async fn open_record(&self, record: ScheduleRecord) -> Result<(), EditorError> {
        let roster = match record.team_id {
            Some(team_id) => self.roster(team_id).await,
            None => Roster::default(),
        };

        let (employees, days) = {
            let mut view = self.view.write().await;
            view.close_state.transition(CloseState::Viewing)?;
            view.load(&record, &roster);
            (view.grid.employees.len(), view.grid.date_keys.len())
        };

        tracing::info!(schedule_id = record.id, employees, days, "Schedule opened");
        self.bus.publish(EditorEvent::ScheduleOpened {
            schedule_id: record.id,
            employees,
            days,
        });

        self.sync.hours().refresh(record.id).await;
        Ok(())
    }

    /// Generate a schedule on the server and open it.
    pub async fn generate(
        &self,
        team_id: TeamId,
        start_date: DateKey,
        end_date: DateKey,
    ) -> Result<ScheduleRecord, EditorError> {
        let request = GenerateScheduleRequest {
            team_id,
            start_date,
            end_date,
        };
        let record = self.api.generate_schedule(request).await.map_err(|e| {
            tracing::error!(team_id, error = %e, "Schedule generation failed");
            self.toasts.error(e.user_message());
            e
        })?;

        tracing::info!(schedule_id = record.id, team_id, "Schedule generated");
        self.toasts.success("Schedule generated successfully.");
        self.open_record(record.clone()).await?;
        Ok(record)
    }

    /// Cached team roster; a failed fetch falls back to bare ids.
    async fn roster(&self, team_id: TeamId) -> Roster {
        if let Some(roster) = self.rosters.read().await.get(&team_id) {
            return roster.clone();
        }

        match self.api.list_employees(team_id).await {
            Ok(employees) => {
                let roster = Roster::from_employees(&employees);
                self.rosters.write().await.insert(team_id, roster.clone());
                roster
            }
            Err(e) => {
                tracing::warn!(team_id, error = %e, "Failed to load team roster");
                Roster::default()
            }
        }
    }

    // ---- editing ----

    /// Stage a shift choice for a cell. `None` means "off".
    ///
    /// Returns `false` when the edit was refused: nothing is open, a close
    /// is under way or the date is today or earlier.
    pub async fn select_shift(&self, key: CellKey, choice: Option<ShiftTypeId>) -> bool {
        let mut guard = self.view.write().await;
        let view = &mut *guard;
        if view.schedule_id().is_none()
            || view.close_state != CloseState::Viewing
            || self.clock.is_past_or_today(key.date)
        {
            return false;
        }

        match view.grid.cell_mut(&key) {
            Some(cell) => cell.shift_type_id = choice,
            None => view.staging.stage_selection(key, choice),
        }
        view.staging.mark_changed(key);
        tracing::debug!(%key, ?choice, "Edit staged");
        true
    }

    pub async fn save_cell(&self, key: CellKey) -> SaveOutcome {
        self.sync.save_cell(key).await
    }

    pub async fn create_cell_and_save(
        &self,
        key: CellKey,
        choice: Option<ShiftTypeId>,
    ) -> SaveOutcome {
        self.sync.create_cell_and_save(key, choice).await
    }

    /// Queue every staged key for saving and return without waiting.
    ///
    /// Returns `None` and sends nothing when no edits are staged.
    pub async fn start_save_all(&self) -> Result<Option<BatchTicket>, EditorError> {
        let (schedule_id, keys) = {
            let view = self.view.read().await;
            let schedule_id = view.schedule_id().ok_or(EditorError::NoScheduleOpen)?;
            (schedule_id, view.staging.changed_keys())
        };

        if keys.is_empty() {
            tracing::info!(schedule_id, "Nothing to save");
            self.toasts.info("Nothing to save");
            self.bus.publish(EditorEvent::NothingToSave);
            return Ok(None);
        }

        self.queue.submit(schedule_id, keys).await.map(Some)
    }

    /// Save every staged key and wait for the batch to finish.
    pub async fn save_all(&self) -> Result<BatchReport, EditorError> {
        match self.start_save_all().await? {
            Some(ticket) => ticket.wait().await,
            None => Ok(BatchReport::default()),
        }
    }

    // ---- closing and confirmations ----

    /// Ask to close the open schedule.
    ///
    /// Closes at once when nothing is staged; otherwise leaves a
    /// confirmation pending and returns [`CloseState::ConfirmPending`].
    pub async fn request_close(&self) -> Result<CloseState, EditorError> {
        let mut confirm = self.confirm.lock().await;
        if let Some(prompt) = confirm.as_ref() {
            return Err(pending_prompt_conflict(prompt).into());
        }

        let (schedule_id, next, pending) = {
            let mut view = self.view.write().await;
            let schedule_id = view.schedule_id().ok_or(EditorError::NoScheduleOpen)?;
            let requested = view.close_state.transition(CloseState::CloseRequested)?;
            let pending = view.staging.changed_count();
            let next = requested.transition(CloseState::resolve_close_request(pending > 0))?;

            if next == CloseState::Closed {
                view.teardown();
            } else {
                view.close_state = next;
            }
            (schedule_id, next, pending)
        };

        if next == CloseState::Closed {
            tracing::info!(schedule_id, "View closed");
            self.bus.publish(EditorEvent::ViewClosed {
                schedule_id,
                discarded: 0,
            });
        } else {
            tracing::info!(schedule_id, pending, "Unsaved changes; confirmation required");
            *confirm = Some(ConfirmPrompt::close_with_unsaved(schedule_id, pending));
        }
        Ok(next)
    }

    /// Ask to delete a schedule record. The deletion runs once the returned
    /// prompt is accepted through [`Self::resolve_confirm`].
    ///
    /// Refused while another confirmation is unanswered or a close is under
    /// way.
    pub async fn request_delete_schedule(
        &self,
        schedule_id: ScheduleId,
    ) -> Result<ConfirmPrompt, EditorError> {
        let mut confirm = self.confirm.lock().await;
        if let Some(prompt) = confirm.as_ref() {
            return Err(pending_prompt_conflict(prompt).into());
        }

        let state = self.view.read().await.close_state;
        if !matches!(state, CloseState::Viewing | CloseState::Closed) {
            return Err(CoreError::Conflict(format!(
                "Cannot delete a schedule while the view is {state:?}"
            ))
            .into());
        }

        let prompt = ConfirmPrompt::delete_schedule(schedule_id);
        *confirm = Some(prompt.clone());
        Ok(prompt)
    }

    pub async fn pending_confirm(&self) -> Option<ConfirmPrompt> {
        self.confirm.lock().await.clone()
    }

    /// Answer the pending confirmation.
    pub async fn resolve_confirm(&self, accepted: bool) -> Result<ConfirmResolution, EditorError> {
        let prompt = self
            .confirm
            .lock()
            .await
            .take()
            .ok_or(EditorError::NoPendingConfirm)?;

        match prompt.intent {
            ConfirmIntent::DeleteSchedule { schedule_id } => {
                if accepted {
                    self.delete_schedule(schedule_id).await
                } else {
                    Ok(ConfirmResolution::Dismissed)
                }
            }
            ConfirmIntent::CloseWithUnsavedChanges { schedule_id, .. } => {
                if accepted {
                    self.save_then_close(schedule_id).await
                } else {
                    self.discard_then_close(schedule_id).await
                }
            }
        }
    }

    async fn delete_schedule(
        &self,
        schedule_id: ScheduleId,
    ) -> Result<ConfirmResolution, EditorError> {
        if let Err(e) = self.api.delete_schedule(schedule_id).await {
            tracing::error!(schedule_id, error = %e, "Failed to delete schedule");
            self.toasts.error(format!("Failed to delete schedule: {}", e.user_message()));
            return Err(e.into());
        }

        {
            let mut view = self.view.write().await;
            if view.is_showing(schedule_id) {
                view.teardown();
            }
        }

        tracing::info!(schedule_id, "Schedule deleted");
        self.toasts.success("Schedule deleted successfully.");
        self.bus.publish(EditorEvent::ScheduleDeleted { schedule_id });
        Ok(ConfirmResolution::ScheduleDeleted { schedule_id })
    }

    async fn save_then_close(
        &self,
        schedule_id: ScheduleId,
    ) -> Result<ConfirmResolution, EditorError> {
        {
            let mut view = self.view.write().await;
            view.close_state = view.close_state.transition(CloseState::SaveAllThenClosed)?;
        }

        let report = self.save_all().await;

        let discarded = {
            let mut view = self.view.write().await;
            view.close_state.transition(CloseState::Closed)?;
            view.teardown()
        };
        tracing::info!(schedule_id, discarded, "View closed after saving");
        self.bus.publish(EditorEvent::ViewClosed {
            schedule_id,
            discarded,
        });

        Ok(ConfirmResolution::SavedAndClosed { report: report? })
    }

    async fn discard_then_close(
        &self,
        schedule_id: ScheduleId,
    ) -> Result<ConfirmResolution, EditorError> {
        let discarded = {
            let mut view = self.view.write().await;
            view.close_state = view.close_state.transition(CloseState::DiscardThenClosed)?;
            view.close_state.transition(CloseState::Closed)?;
            view.teardown()
        };

        tracing::info!(schedule_id, discarded, "View closed; staged edits discarded");
        self.bus.publish(EditorEvent::ViewClosed {
            schedule_id,
            discarded,
        });
        Ok(ConfirmResolution::DiscardedAndClosed { discarded })
    }

    /// Stop the batch-save worker.
    pub fn shutdown(&self) {
        self.queue.shutdown();
        self.cancel.cancel();
    }
}

fn pending_prompt_conflict(prompt: &ConfirmPrompt) -> CoreError {
    CoreError::Conflict(format!(
        "A confirmation is already pending: {}",
        prompt.title
    ))
}

impl Drop for ScheduleEditor {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
