use std::borrow::Cow;

use thiserror::Error;

/// Top-level error type returned by schema rewriting and computed field access.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Field path is empty or contains an empty segment.
    #[error("invalid field path '{path}': {reason}")]
    InvalidPath { path: String, reason: Cow<'static, str> },

    /// A deep write tried to descend through a value that is not an object.
    #[error("cannot set '{path}': segment '{segment}' is not an object")]
    NotAContainer { path: String, segment: String },

    /// A stored or supplied timestamp could not be interpreted.
    #[error("invalid timestamp at '{path}': {message}")]
    InvalidTimestamp { path: String, message: String },

    /// A stored offset is not numeric or cannot be represented as a clock offset.
    #[error("invalid offset at '{path}': {message}")]
    InvalidOffset { path: String, message: String },

    /// Typed timestamp access on a path without an offset accessor.
    #[error("no offset timestamp field declared at '{path}'")]
    UnknownField { path: String },

    /// A schema definition entry could not be turned into a field.
    #[error("invalid schema definition at '{path}': {message}")]
    InvalidDefinition { path: String, message: String },

    /// Document input was not a JSON object.
    #[error("invalid document: {message}")]
    InvalidDocument { message: String },

    /// Options could not be loaded.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Rendering a document to text failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SchemaError {
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_timestamp(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_offset(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOffset {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Convenience alias for results produced by this crate.
pub type SchemaResult<T> = Result<T, SchemaError>;
