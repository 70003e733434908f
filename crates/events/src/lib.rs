//! Editor event bus and toast notifications.
//!
//! [`bus::EventBus`] fans out [`bus::EditorEvent`]s to any number of
//! subscribers. [`toast::ToastCenter`] keeps the list of visible toasts
//! and auto-dismisses them after a timeout.

pub mod bus;
pub mod toast;
