//! Contract between the login flow and the remote accounting service.

use async_trait::async_trait;

/// Status value the accounting service reports for accepted credentials.
pub const STATUS_SUCCESS: &str = "0";

/// Result of a completed authentication exchange.
///
/// Only produced when the remote service answered with a well-formed
/// document. Transport and parse failures are reported as [`GatewayError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authorized,
    /// The service rejected the credentials. `status` holds the raw status
    /// attribute, or `None` when the reply carried no `Auth` status at all.
    Unauthorized { status: Option<String> },
}

impl AuthOutcome {
    /// Maps a raw `Auth` status attribute to an outcome.
    pub fn from_status(status: Option<&str>) -> Self {
        match status {
            Some(STATUS_SUCCESS) => Self::Authorized,
            other => Self::Unauthorized {
                status: other.map(str::to_string),
            },
        }
    }

    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized)
    }
}

/// Failures that prevent the gateway from reaching a verdict.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Failed to encode request document: {0}")]
    Encode(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Accounting service returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Malformed response document: {0}")]
    Parse(String),
}

impl GatewayError {
    /// Short machine-readable label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Encode(_) => "encode",
            GatewayError::Transport(_) => "transport",
            GatewayError::HttpStatus(_) => "http_status",
            GatewayError::Parse(_) => "parse",
        }
    }
}

/// Sends an encoded request document to the accounting service.
///
/// # Implementations
///
/// - [`crate::infrastructure::HttpTransport`] - reqwest-based HTTP POST
/// - Test mocks available with `cfg(test)`
///
/// # Errors
///
/// Returns [`GatewayError::Transport`] when the request cannot be delivered
/// or the body cannot be read, and [`GatewayError::HttpStatus`] on non-2xx
/// replies.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountingTransport: Send + Sync {
    /// Posts `body` and returns the raw reply document.
    async fn send(&self, body: String) -> Result<String, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_status_is_authorized() {
        assert_eq!(AuthOutcome::from_status(Some("0")), AuthOutcome::Authorized);
    }

    #[test]
    fn test_other_status_is_unauthorized() {
        assert_eq!(
            AuthOutcome::from_status(Some("1")),
            AuthOutcome::Unauthorized {
                status: Some("1".to_string())
            }
        );
        assert!(!AuthOutcome::from_status(Some("00")).is_authorized());
        assert!(!AuthOutcome::from_status(Some(" 0")).is_authorized());
    }

    #[test]
    fn test_missing_status_is_unauthorized() {
        assert_eq!(
            AuthOutcome::from_status(None),
            AuthOutcome::Unauthorized { status: None }
        );
    }

    #[test]
    fn test_empty_status_is_unauthorized() {
        assert!(!AuthOutcome::from_status(Some("")).is_authorized());
    }

    #[test]
    fn test_error_kind_labels() {
        assert_eq!(GatewayError::HttpStatus(502).kind(), "http_status");
        assert_eq!(GatewayError::Parse("x".into()).kind(), "parse");
        assert_eq!(GatewayError::Transport("x".into()).kind(), "transport");
    }
}
