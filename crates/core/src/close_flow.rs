//! Unsaved-changes close flow.
//!
//! ```text
//! Closed -> Viewing -> CloseRequested -> Closed
//!                                     -> ConfirmPending -> SaveAllThenClosed -> Closed
//!                                                       -> DiscardThenClosed -> Closed
//! ```
//!
//! `Viewing -> Viewing` is a refetch, which replaces the grid wholesale.

use serde::Serialize;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CloseState {
    /// No schedule is open.
    Closed,
    /// A schedule grid is open for editing.
    Viewing,
    /// The operator asked to close the grid.
    CloseRequested,
    /// Unsaved edits exist; waiting on the operator's answer.
    ConfirmPending,
    /// The operator chose to save; the batch save runs, then the view
    /// tears down.
    SaveAllThenClosed,
    /// The operator chose to discard; the view tears down immediately.
    DiscardThenClosed,
}

impl CloseState {
    /// States reachable from `self`.
    pub fn valid_transitions(self) -> &'static [CloseState] {
        use CloseState::*;
        match self {
            Closed => &[Viewing],
            Viewing => &[Viewing, CloseRequested],
            CloseRequested => &[Closed, ConfirmPending],
            ConfirmPending => &[SaveAllThenClosed, DiscardThenClosed],
            SaveAllThenClosed => &[Closed],
            DiscardThenClosed => &[Closed],
        }
    }

    pub fn can_transition(self, to: CloseState) -> bool {
        self.valid_transitions().contains(&to)
    }

    /// Validate and perform a transition.
    pub fn transition(self, to: CloseState) -> Result<CloseState, CoreError> {
        if self.can_transition(to) {
            Ok(to)
        } else {
            Err(CoreError::Conflict(format!(
                "Invalid close-flow transition: {self:?} -> {to:?}"
            )))
        }
    }

    /// Where a close request goes next.
    pub fn resolve_close_request(has_unsaved_changes: bool) -> CloseState {
        if has_unsaved_changes {
            CloseState::ConfirmPending
        } else {
            CloseState::Closed
        }
    }
}
