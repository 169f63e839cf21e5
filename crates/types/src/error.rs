//! Error types for the CloudStack cloud provider

use thiserror::Error;

/// Main error type for provider and API client operations
#[derive(Error, Debug)]
pub enum CloudStackError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request never produced an HTTP response
    #[error("Transport error calling {command}: {message}")]
    Transport { command: String, message: String },

    /// Non-success HTTP status returned by the API
    #[error("CloudStack API error calling {command} (HTTP {status}): {message}")]
    Http {
        command: String,
        status: u16,
        message: String,
    },

    /// Response body could not be decoded
    #[error("Invalid response to {command}: {message}")]
    InvalidResponse { command: String, message: String },

    /// Request exceeded the client timeout
    #[error("Timeout calling {command}")]
    Timeout { command: String },

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for provider operations
pub type Result<T> = std::result::Result<T, CloudStackError>;

/// Configuration specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// File not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// The file exists but could not be read
    #[error("Failed to read configuration {path}: {message}")]
    Io { path: String, message: String },

    /// Parse error
    #[error("Configuration parse error: {0}")]
    ParseError(String),

    /// Required fields still empty after resolution
    #[error("Missing required configuration fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    /// Invalid value
    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

impl ConfigError {
    /// Whether this error came from malformed configuration text
    pub fn is_parse_error(&self) -> bool {
        matches!(self, ConfigError::ParseError(_))
    }
}

impl From<ConfigError> for CloudStackError {
    fn from(err: ConfigError) -> Self {
        CloudStackError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message_lists_every_field() {
        let err = ConfigError::MissingFields {
            fields: vec!["api-url".to_string(), "secret-key".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Missing required configuration fields: api-url, secret-key"
        );
    }

    #[test]
    fn test_config_error_converts_to_provider_error() {
        let err: CloudStackError = ConfigError::ParseError("line 3: expected '='".to_string()).into();
        match err {
            CloudStackError::Config(message) => assert!(message.contains("line 3")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
