use rota_client::ApiError;
use rota_core::error::CoreError;

/// Errors from editor operations that can fail outright.
///
/// Cell saves never produce one of these; they report a
/// [`SaveOutcome`](crate::SaveOutcome) instead.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("No schedule is open")]
    NoScheduleOpen,

    #[error("No confirmation is pending")]
    NoPendingConfirm,

    /// The batch-save worker has shut down.
    #[error("Save queue is not running")]
    QueueClosed,
}
