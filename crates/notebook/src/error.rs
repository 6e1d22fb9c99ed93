//! Error types for notebook.
//!
//! This module defines all error types used throughout the notebook crate,
//! covering note validation, configuration, and the RPC transport.

use thiserror::Error;

/// The main error type for notebook operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Domain Errors ===
    /// A blank or otherwise unusable note identifier was supplied.
    #[error("invalid note id: {message}")]
    InvalidIdentifier {
        /// Description of the problem.
        message: String,
    },

    /// A note failed title or content validation.
    #[error("invalid note: {message}")]
    InvalidNote {
        /// Description of the validation failure.
        message: String,
    },

    /// No note exists with the given id.
    #[error("note not found with id: {id}")]
    NotFound {
        /// The id that was looked up.
        id: String,
    },

    /// A durable storage backend failed.
    ///
    /// The in-memory registry never produces this.
    #[error("persistence failure: {message}")]
    PersistenceFailure {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Transport Errors ===
    /// Failed to reach the note server.
    #[error("failed to connect to {url}: {message}")]
    ConnectionFailed {
        /// The URL that was tried.
        url: String,
        /// Description of what went wrong.
        message: String,
    },

    /// An HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The snapshot WebSocket failed.
    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    /// The server answered with an error the client does not recognize.
    #[error("server returned {status} ({code}): {}", message.as_deref().unwrap_or("no message"))]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Error code from the response body.
        code: String,
        /// Optional human-readable message.
        message: Option<String>,
    },

    // === I/O Errors ===
    /// File system or socket operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for notebook operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(err))
    }
}

impl Error {
    /// Wire code for [`Error::InvalidIdentifier`].
    pub const CODE_INVALID_IDENTIFIER: &'static str = "invalid_identifier";
    /// Wire code for [`Error::InvalidNote`].
    pub const CODE_INVALID_NOTE: &'static str = "invalid_note";
    /// Wire code for [`Error::NotFound`].
    pub const CODE_NOT_FOUND: &'static str = "not_found";
    /// Wire code for everything else.
    pub const CODE_INTERNAL: &'static str = "internal_error";

    /// Create an invalid identifier error.
    #[must_use]
    pub fn invalid_identifier(message: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            message: message.into(),
        }
    }

    /// Create an invalid note error.
    #[must_use]
    pub fn invalid_note(message: impl Into<String>) -> Self {
        Self::InvalidNote {
            message: message.into(),
        }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create a persistence failure.
    #[must_use]
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::PersistenceFailure {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error means the requested note does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error was caused by the caller's input.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidIdentifier { .. } | Self::InvalidNote { .. } | Self::NotFound { .. }
        )
    }

    /// The stable code used for this error on the wire.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier { .. } => Self::CODE_INVALID_IDENTIFIER,
            Self::InvalidNote { .. } => Self::CODE_INVALID_NOTE,
            Self::NotFound { .. } => Self::CODE_NOT_FOUND,
            _ => Self::CODE_INTERNAL,
        }
    }

    /// The message carried by a domain error, without the display prefix.
    ///
    /// Used to build wire responses that decode back into the same variant.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::InvalidIdentifier { message }
            | Self::InvalidNote { message }
            | Self::PersistenceFailure { message } => message.clone(),
            Self::NotFound { id } => id.clone(),
            other => other.to_string(),
        }
    }

    /// Rebuild a typed error from a server error response.
    ///
    /// Known codes map back to their domain variant; anything else becomes
    /// [`Error::Remote`].
    #[must_use]
    pub fn from_remote(status: u16, code: &str, message: Option<String>) -> Self {
        match code {
            Self::CODE_INVALID_IDENTIFIER => Self::invalid_identifier(message.unwrap_or_default()),
            Self::CODE_INVALID_NOTE => Self::invalid_note(message.unwrap_or_default()),
            Self::CODE_NOT_FOUND => Self::not_found(message.unwrap_or_default()),
            _ => Self::Remote {
                status,
                code: code.to_string(),
                message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::not_found("abc");
        assert_eq!(err.to_string(), "note not found with id: abc");

        let err = Error::invalid_note("Note title cannot be blank");
        assert_eq!(err.to_string(), "invalid note: Note title cannot be blank");

        let err = Error::invalid_identifier("Note ID cannot be blank");
        assert_eq!(err.to_string(), "invalid note id: Note ID cannot be blank");
    }

    #[test]
    fn test_error_is_not_found() {
        assert!(Error::not_found("x").is_not_found());
        assert!(!Error::invalid_note("x").is_not_found());
    }

    #[test]
    fn test_error_is_client_error() {
        assert!(Error::invalid_identifier("x").is_client_error());
        assert!(Error::invalid_note("x").is_client_error());
        assert!(Error::not_found("x").is_client_error());
        assert!(!Error::persistence("disk full").is_client_error());
        assert!(!Error::internal("bug").is_client_error());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::invalid_identifier("x").code(), "invalid_identifier");
        assert_eq!(Error::invalid_note("x").code(), "invalid_note");
        assert_eq!(Error::not_found("x").code(), "not_found");
        assert_eq!(Error::persistence("x").code(), "internal_error");
        assert_eq!(Error::internal("x").code(), "internal_error");
    }

    #[test]
    fn test_detail_strips_prefix() {
        assert_eq!(Error::invalid_note("too long").detail(), "too long");
        assert_eq!(Error::not_found("note-7").detail(), "note-7");
        assert_eq!(Error::internal("bug").detail(), "internal error: bug");
    }

    #[test]
    fn test_from_remote_known_codes() {
        let err = Error::from_remote(400, "invalid_note", Some("blank".to_string()));
        assert!(matches!(err, Error::InvalidNote { ref message } if message == "blank"));

        let err = Error::from_remote(400, "invalid_identifier", None);
        assert!(matches!(err, Error::InvalidIdentifier { .. }));

        let err = Error::from_remote(404, "not_found", Some("n-1".to_string()));
        assert!(matches!(err, Error::NotFound { ref id } if id == "n-1"));
    }

    #[test]
    fn test_from_remote_unknown_code() {
        let err = Error::from_remote(500, "internal_error", Some("boom".to_string()));
        match err {
            Error::Remote {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 500);
                assert_eq!(code, "internal_error");
                assert_eq!(message.as_deref(), Some("boom"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_remote_error_display() {
        let err = Error::from_remote(502, "bad_gateway", None);
        let msg = err.to_string();
        assert!(msg.contains("502"));
        assert!(msg.contains("bad_gateway"));
        assert!(msg.contains("no message"));
    }

    #[test]
    fn test_persistence_error_display() {
        let err = Error::persistence("disk full");
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "endpoint must start with '/'".to_string(),
        };
        assert!(err.to_string().contains("endpoint"));
    }

    #[test]
    fn test_connection_failed_display() {
        let err = Error::ConnectionFailed {
            url: "http://127.0.0.1:8080".to_string(),
            message: "connection refused".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("127.0.0.1:8080"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("address in use"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }
}
