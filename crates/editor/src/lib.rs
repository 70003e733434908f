//! Schedule assignment grid editor.
//!
//! [`ScheduleEditor`] keeps one schedule's grid in sync with the remote
//! API: it stages edits, saves them cell by cell through
//! [`sync::SaveOrchestrator`], batches them through the single-consumer
//! [`queue::SaveQueue`], keeps the employee-hours totals fresh and drives
//! the unsaved-changes close flow.

pub mod config;
pub mod editor;
pub mod error;
pub mod hours;
pub mod queue;
pub mod state;
pub mod sync;

pub use config::EditorConfig;
pub use editor::{ConfirmResolution, ScheduleEditor};
pub use error::EditorError;
pub use queue::{BatchProgress, BatchReport, BatchTicket};
pub use state::ViewState;
pub use sync::{SaveOutcome, SkipReason};
