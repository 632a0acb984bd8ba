/// Error type for calls to the questionnaire server.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, reset, ...).
    #[error("Request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    /// The server answered with a non-success status.
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// The session is not authenticated (HTTP 401).
    #[error("Not signed in")]
    Unauthorized,

    /// The response body could not be decoded.
    #[error("Malformed response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// The server reported an error in an otherwise well-formed body.
    #[error("Server error: {0}")]
    Server(String),

    /// Client-side failure (building the HTTP client, ...).
    #[error("Backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl ApiError {
    /// Create a backend error from any error type.
    pub fn backend(err: impl Into<anyhow::Error>) -> Self {
        Self::Backend(err.into())
    }

    /// Check if trying the same request again might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Server(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429 || *status == 408,
            Self::Unauthorized | Self::Decode { .. } | Self::Backend(_) => false,
        }
    }

    /// Check if this error means the user has to sign in again.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_statuses() {
        let server_side = ApiError::Status {
            endpoint: "/api/questions".into(),
            status: 503,
        };
        let client_side = ApiError::Status {
            endpoint: "/api/questions".into(),
            status: 404,
        };

        assert!(server_side.is_retryable());
        assert!(!client_side.is_retryable());
        assert!(!ApiError::Unauthorized.is_retryable());
    }
}
