use std::time::Duration;

use rota_events::toast::DEFAULT_TOAST_TIMEOUT;

/// Pause between two cells of a batch save.
pub const DEFAULT_SAVE_STEP_DELAY: Duration = Duration::from_millis(150);

/// Tunables for [`ScheduleEditor`](crate::ScheduleEditor).
#[derive(Debug, Clone)]
pub struct EditorConfig {
    pub save_step_delay: Duration,
    /// Toast auto-dismiss timeout; zero keeps toasts until dismissed.
    pub toast_timeout: Duration,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            save_step_delay: DEFAULT_SAVE_STEP_DELAY,
            toast_timeout: DEFAULT_TOAST_TIMEOUT,
        }
    }
}
