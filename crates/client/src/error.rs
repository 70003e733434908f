use rota_core::wire::format_error_payload;

/// Message used when a failed response carries no readable body.
pub const FALLBACK_ERROR_MESSAGE: &str = "An error occurred";

/// Errors from the REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status.
    #[error("API error ({status}): {message}")]
    Status {
        status: u16,
        /// Error body flattened to one line.
        message: String,
    },

    /// A 2xx response whose body reports a failure (`error`, `errors`
    /// or `success: false`).
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// The response body was not valid JSON or not the expected shape.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// The request failed local validation and was never sent.
    #[error("Invalid request: {0}")]
    Invalid(String),
}

impl ApiError {
    /// Build a [`ApiError::Status`] from a raw error body.
    pub fn from_status_body(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<serde_json::Value>(body) {
            Ok(payload) => format_error_payload(&payload),
            Err(_) => body.trim().to_string(),
        };
        let message = if message.is_empty() {
            FALLBACK_ERROR_MESSAGE.to_string()
        } else {
            message
        };
        ApiError::Status { status, message }
    }

    /// Flat text suitable for a toast.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } | ApiError::Rejected(message) => message.clone(),
            ApiError::Request(e) => e.to_string(),
            ApiError::Decode(_) => "Unexpected response from the server".to_string(),
            ApiError::Invalid(msg) => msg.clone(),
        }
    }

    /// HTTP status when the server answered with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn json_body_is_flattened() {
        let err = ApiError::from_status_body(
            400,
            r#"{"title":"One or more validation errors occurred.","errors":{"Date":["Date is required"]}}"#,
        );
        assert_matches!(&err, ApiError::Status { status: 400, message } if message == "One or more validation errors occurred.");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn plain_text_body_is_kept() {
        let err = ApiError::from_status_body(500, "  upstream exploded \n");
        assert_eq!(err.user_message(), "upstream exploded");
    }

    #[test]
    fn empty_body_uses_fallback() {
        let err = ApiError::from_status_body(404, "");
        assert_eq!(err.user_message(), FALLBACK_ERROR_MESSAGE);
    }

    #[test]
    fn rejected_message_is_user_facing() {
        let err = ApiError::Rejected("Employee is on leave".into());
        assert_eq!(err.user_message(), "Employee is on leave");
        assert_eq!(err.status(), None);
    }
}
