//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`EditorEvent`]s. It is
//! shared via `Arc<EventBus>` between the editor, its batch-save worker
//! and whatever front end renders the grid.

use rota_core::grid::CellKey;
use rota_core::types::{ScheduleId, ShiftTypeId};
use serde::Serialize;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// EditorEvent
// ---------------------------------------------------------------------------

/// A state change in the schedule editor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditorEvent {
    /// A schedule was loaded into the grid.
    ScheduleOpened {
        schedule_id: ScheduleId,
        employees: usize,
        days: usize,
    },

    /// An upsert round trip succeeded.
    CellSaved {
        schedule_id: ScheduleId,
        key: CellKey,
        shift_type_id: Option<ShiftTypeId>,
    },

    /// A cell was set to "off" and removed from the grid.
    CellDeleted {
        schedule_id: ScheduleId,
        key: CellKey,
    },

    /// A save round trip failed.
    CellSaveFailed {
        schedule_id: ScheduleId,
        key: CellKey,
        /// `true` when a locally-created cell was removed again.
        rolled_back: bool,
        error: String,
    },

    /// The employee-hours map was replaced from the server.
    HoursRefreshed {
        schedule_id: ScheduleId,
        employees: usize,
    },

    /// The hours fetch failed and the map was emptied.
    HoursCleared { schedule_id: ScheduleId },

    /// A batch save was accepted by the save queue.
    BatchStarted {
        schedule_id: ScheduleId,
        total: usize,
    },

    /// One key of a batch save reached a terminal outcome.
    BatchStep {
        schedule_id: ScheduleId,
        key: CellKey,
        index: usize,
    },

    /// A batch save finished or was cancelled.
    BatchCompleted {
        schedule_id: ScheduleId,
        processed: usize,
        cancelled: bool,
    },

    /// A batch save was requested with nothing staged.
    NothingToSave,

    /// The grid view was torn down.
    ViewClosed {
        schedule_id: ScheduleId,
        discarded: usize,
    },

    /// A schedule record was deleted on the server.
    ScheduleDeleted { schedule_id: ScheduleId },
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed events are dropped
    /// and slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: EditorEvent) {
        // Only fails when there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
