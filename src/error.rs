//! Error taxonomy for banking API operations.

use reqwest::StatusCode;

/// Result alias used by every client operation.
pub type BankingResult<T> = Result<T, BankingError>;

/// Errors returned by the banking client.
///
/// `Validation`, `Authentication` and `Transfer` are the categorised
/// failures; the remaining variants are generic API errors (see
/// [`BankingError::is_api_error`]).
#[derive(Debug)]
pub enum BankingError {
    /// Malformed caller input, detected before any request is sent
    Validation(String),
    /// Missing token, token rejected by the server, or no token in the auth response
    Authentication(String),
    /// Transfer completed with a non-SUCCESS status
    Transfer(String),
    /// Non-2xx response other than 401
    Http { status: StatusCode, body: String },
    /// Request did not finish within the configured timeout
    Timeout { seconds: u64 },
    /// Server could not be reached
    Connection { base_url: String, reason: String },
    /// Any other transport failure
    Request(String),
    /// Client could not be constructed from its configuration
    Configuration(String),
}

impl BankingError {
    /// Returns true for the generic (not otherwise classified) API errors.
    pub fn is_api_error(&self) -> bool {
        matches!(
            self,
            BankingError::Http { .. }
                | BankingError::Timeout { .. }
                | BankingError::Connection { .. }
                | BankingError::Request(_)
                | BankingError::Configuration(_)
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, BankingError::Validation(_))
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, BankingError::Authentication(_))
    }

    pub fn is_transfer(&self) -> bool {
        matches!(self, BankingError::Transfer(_))
    }

    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            BankingError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl std::fmt::Display for BankingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BankingError::Validation(msg) => write!(f, "{}", msg),
            BankingError::Authentication(msg) => write!(f, "{}", msg),
            BankingError::Transfer(msg) => write!(f, "{}", msg),
            BankingError::Http { status, body } => {
                write!(f, "HTTP error {}: {}", status.as_u16(), body)
            }
            BankingError::Timeout { seconds } => {
                write!(f, "Request timeout after {} seconds", seconds)
            }
            BankingError::Connection { base_url, reason } => {
                write!(
                    f,
                    "Connection error: Unable to reach {}. Is the server running? {}",
                    base_url, reason
                )
            }
            BankingError::Request(msg) => write!(f, "Request failed: {}", msg),
            BankingError::Configuration(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for BankingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_http_error() {
        let err = BankingError::Http {
            status: StatusCode::NOT_FOUND,
            body: "Account not found".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error 404: Account not found");
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_display_timeout() {
        let err = BankingError::Timeout { seconds: 30 };
        assert_eq!(err.to_string(), "Request timeout after 30 seconds");
    }

    #[test]
    fn test_display_connection_error() {
        let err = BankingError::Connection {
            base_url: "http://localhost:8123".to_string(),
            reason: "connection refused".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Unable to reach http://localhost:8123"));
        assert!(msg.contains("Is the server running?"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_categorised_errors_display_message_verbatim() {
        assert_eq!(
            BankingError::Transfer("Insufficient funds".to_string()).to_string(),
            "Insufficient funds"
        );
        assert_eq!(
            BankingError::Validation("amount must be greater than 0".to_string()).to_string(),
            "amount must be greater than 0"
        );
    }

    #[test]
    fn test_api_error_classification() {
        assert!(BankingError::Request("x".into()).is_api_error());
        assert!(BankingError::Timeout { seconds: 1 }.is_api_error());
        assert!(BankingError::Configuration("x".into()).is_api_error());
        assert!(!BankingError::Validation("x".into()).is_api_error());
        assert!(!BankingError::Authentication("x".into()).is_api_error());
        assert!(!BankingError::Transfer("x".into()).is_api_error());
        assert!(BankingError::Authentication("x".into()).is_authentication());
        assert!(BankingError::Transfer("x".into()).is_transfer());
        assert!(BankingError::Validation("x".into()).is_validation());
    }
}
