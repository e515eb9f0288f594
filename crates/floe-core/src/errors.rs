use std::time::Duration;

/// Typed error hierarchy for agent transport operations.
/// Classifies errors as fatal (don't retry), retryable, or operational.
#[derive(Clone, Debug, thiserror::Error)]
pub enum TransportError {
    // Fatal — don't retry
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("credential unavailable: {0}")]
    Credential(String),

    // Retryable
    #[error("server error {status}: {body}")]
    ServerError { status: u16, body: String },
    #[error("network error: {0}")]
    NetworkError(String),
    #[error("stream interrupted: {0}")]
    StreamInterrupted(String),

    // Operational
    #[error("timeout after {0:?}")]
    Timeout(Duration),
    #[error("cancelled")]
    Cancelled,
}

impl TransportError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ServerError { .. } | Self::NetworkError(_) | Self::StreamInterrupted(_)
        )
    }

    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed(_) | Self::InvalidRequest(_) | Self::Credential(_)
        )
    }

    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed(_) => "authentication_failed",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Credential(_) => "credential",
            Self::ServerError { .. } => "server_error",
            Self::NetworkError(_) => "network_error",
            Self::StreamInterrupted(_) => "stream_interrupted",
            Self::Timeout(_) => "timeout",
            Self::Cancelled => "cancelled",
        }
    }

    /// Classify a non-success HTTP status into the appropriate error variant.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::AuthenticationFailed(body),
            400 => Self::InvalidRequest(body),
            500..=599 => Self::ServerError { status, body },
            _ => Self::InvalidRequest(format!("unexpected status {status}: {body}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(TransportError::ServerError { status: 500, body: "err".into() }.is_retryable());
        assert!(TransportError::NetworkError("tcp".into()).is_retryable());
        assert!(TransportError::StreamInterrupted("eof".into()).is_retryable());
    }

    #[test]
    fn fatal_classification() {
        assert!(TransportError::AuthenticationFailed("bad token".into()).is_fatal());
        assert!(TransportError::InvalidRequest("bad".into()).is_fatal());
        assert!(TransportError::Credential("missing file".into()).is_fatal());
    }

    #[test]
    fn not_retryable_and_not_fatal() {
        let timeout = TransportError::Timeout(Duration::from_secs(30));
        assert!(!timeout.is_retryable());
        assert!(!timeout.is_fatal());

        let cancelled = TransportError::Cancelled;
        assert!(!cancelled.is_retryable());
        assert!(!cancelled.is_fatal());
    }

    #[test]
    fn from_status_mapping() {
        assert!(TransportError::from_status(401, "unauthorized".into()).is_fatal());
        assert!(TransportError::from_status(403, "forbidden".into()).is_fatal());
        assert!(TransportError::from_status(400, "bad request".into()).is_fatal());
        assert!(TransportError::from_status(500, "internal".into()).is_retryable());
        assert!(TransportError::from_status(502, "bad gateway".into()).is_retryable());
    }

    #[test]
    fn from_status_unexpected_code() {
        let err = TransportError::from_status(302, "moved".into());
        assert!(matches!(&err, TransportError::InvalidRequest(msg) if msg.contains("302")));
    }

    #[test]
    fn error_kind_strings() {
        assert_eq!(TransportError::Cancelled.error_kind(), "cancelled");
        assert_eq!(
            TransportError::ServerError { status: 503, body: String::new() }.error_kind(),
            "server_error"
        );
        assert_eq!(
            TransportError::AuthenticationFailed(String::new()).error_kind(),
            "authentication_failed"
        );
    }
}
