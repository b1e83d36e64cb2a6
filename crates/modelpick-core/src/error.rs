//! Error types for modelpick.

use thiserror::Error;

/// A shared error type for the modelpick workspace.
///
/// Bad recent-model data is never an error (it is pruned). Only structural
/// problems with the configuration document and persistence failures surface
/// through this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelPickError {
    /// A configuration key is present but not in the expected shape.
    #[error("Malformed configuration at '{key}': {message}")]
    MalformedSnapshot { key: String, message: String },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// File locking error
    #[error("Lock error: {0}")]
    Lock(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ModelPickError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a MalformedSnapshot error
    pub fn malformed(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedSnapshot {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a MalformedSnapshot error
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedSnapshot { .. })
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error came from writing or reading persisted state.
    ///
    /// Callers use this to keep a model list usable even when recent-model
    /// history cannot be saved.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::Lock(_) | Self::Serialization { .. }
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ModelPickError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ModelPickError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ModelPickError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ModelPickError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, ModelPickError>`.
pub type Result<T> = std::result::Result<T, ModelPickError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_classification() {
        assert!(ModelPickError::io("disk full").is_persistence());
        assert!(ModelPickError::Lock("busy".into()).is_persistence());
        assert!(!ModelPickError::malformed("recent_models", "not an object").is_persistence());
        assert!(!ModelPickError::config("same path").is_persistence());
    }

    #[test]
    fn test_io_conversion_keeps_kind() {
        let err: ModelPickError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        match err {
            ModelPickError::Io { message } => assert!(message.contains("PermissionDenied")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
