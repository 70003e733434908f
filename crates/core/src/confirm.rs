//! Confirmation prompts.
//!
//! One confirmation mechanism serves several intents. Each intent is its
//! own variant with its own payload, and the editor resolves a prompt
//! through a single exhaustive match.

use serde::Serialize;

use crate::types::ScheduleId;

/// What accepting a confirmation will do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum ConfirmIntent {
    /// Permanently delete a schedule record.
    DeleteSchedule { schedule_id: ScheduleId },
    /// Close a grid that still has `pending` unsaved edits.
    CloseWithUnsavedChanges {
        schedule_id: ScheduleId,
        pending: usize,
    },
}

/// A confirmation shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmPrompt {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
    pub intent: ConfirmIntent,
}

impl ConfirmPrompt {
    pub fn delete_schedule(schedule_id: ScheduleId) -> Self {
        Self {
            title: "Delete schedule".to_string(),
            message: format!("Schedule {schedule_id} and all of its assignments will be deleted."),
            confirm_label: "Delete".to_string(),
            cancel_label: "Cancel".to_string(),
            intent: ConfirmIntent::DeleteSchedule { schedule_id },
        }
    }

    pub fn close_with_unsaved(schedule_id: ScheduleId, pending: usize) -> Self {
        let noun = if pending == 1 { "change" } else { "changes" };
        Self {
            title: "Unsaved changes".to_string(),
            message: format!("You have {pending} unsaved {noun}. Save before closing?"),
            confirm_label: "Save".to_string(),
            cancel_label: "Discard".to_string(),
            intent: ConfirmIntent::CloseWithUnsavedChanges {
                schedule_id,
                pending,
            },
        }
    }
}
