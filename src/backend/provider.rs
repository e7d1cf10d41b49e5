//! Chat backend trait and its error type.
//!
//! The orchestrator talks to the remote assistant only through `ChatBackend`,
//! so tests and alternative transports can be swapped in freely.

use async_trait::async_trait;

use super::WireMessage;

/// Trait for the remote reasoning backend.
///
/// # Example
///
/// ```ignore
/// use crypto_chat::backend::{to_wire_format, ChatBackend};
/// use crypto_chat::message::Message;
///
/// async fn ask(backend: &dyn ChatBackend) {
///     let wire = to_wire_format(&[Message::user("what's btc worth")]);
///     match backend.chat(wire).await {
///         Ok(reply) => println!("{}", reply),
///         Err(e) => eprintln!("{}", e),
///     }
/// }
/// ```
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Returns a short name for logs.
    fn name(&self) -> &str;

    /// Send the whole outbound sequence and wait for a single reply.
    ///
    /// `messages` is never empty. There is no timeout: the call resolves only
    /// when the transport does.
    async fn chat(&self, messages: Vec<WireMessage>) -> BackendResult<String>;
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors that can occur while talking to the backend.
///
/// Callers treat every variant the same way ("request failed"); the split
/// exists for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// No endpoint configured
    NotConfigured(String),

    /// Network or connection error
    NetworkError(String),

    /// Backend answered with a non-success status
    ApiError { status: u16, message: String },

    /// Backend answered, but not with a usable reply
    InvalidResponse(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConfigured(msg) => write!(f, "Backend not configured: {}", msg),
            Self::NetworkError(msg) => write!(f, "Network error: {}", msg),
            Self::ApiError { status, message } => {
                write!(f, "Backend error ({}): {}", status, message)
            }
            Self::InvalidResponse(msg) => write!(f, "Invalid backend response: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::NetworkError("Request timed out".to_string())
        } else if err.is_connect() {
            Self::NetworkError(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::NetworkError(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::NotConfigured("empty url".to_string());
        assert_eq!(err.to_string(), "Backend not configured: empty url");

        let err = BackendError::NetworkError("connection refused".to_string());
        assert_eq!(err.to_string(), "Network error: connection refused");

        let err = BackendError::ApiError {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "Backend error (502): bad gateway");

        let err = BackendError::InvalidResponse("expected a string".to_string());
        assert!(err.to_string().starts_with("Invalid backend response"));
    }

    #[test]
    fn test_backend_error_from_reqwest() {
        fn assert_from<T: From<reqwest::Error>>() {}
        assert_from::<BackendError>();
    }
}
