/// Errors from the domain layer.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Operator or configuration input that does not parse, e.g. a date,
    /// a cell key or an environment setting.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A server payload that cannot be mapped onto the domain types.
    #[error("Malformed payload: {0}")]
    Malformed(String),

    /// An operation the close flow does not allow in its current state.
    #[error("Conflict: {0}")]
    Conflict(String),
}
