//! Error types for schema definition, materialization and typed access

use std::fmt;

use thiserror::Error;

use crate::value::ValueType;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Schema definition and accessor errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Configuration key \"{name}\" is defined twice")]
    DuplicateKey { name: String },

    #[error("Invalid default value for \"{name}\": {reason}")]
    InvalidDefault { name: String, reason: String },

    #[error("Unknown configuration key \"{name}\"")]
    UnknownKey { name: String },

    #[error("Configuration key \"{name}\" is {actual}, not {requested}")]
    WrongType {
        name: String,
        actual: ValueType,
        requested: ValueType,
    },

    #[error(transparent)]
    Invalid(#[from] ValidationErrors),

    #[error("Unsupported value for \"{name}\": {detail}")]
    UnsupportedValue { name: String, detail: String },

    #[error("Configuration source error: {0}")]
    Load(#[from] config_crate::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Category of a per-key validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No raw value and no default
    MissingRequired,
    /// Raw value could not be converted to the declared type
    TypeMismatch,
    /// The key's validator rejected the value
    ConstraintViolation,
}

/// A single rejected key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyError {
    pub key: String,
    pub kind: ErrorKind,
    pub reason: String,
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.reason)
    }
}

/// Every failure found in one materialization pass
#[derive(Debug, Clone)]
pub struct ValidationErrors {
    errors: Vec<KeyError>,
}

impl ValidationErrors {
    pub(crate) fn new(errors: Vec<KeyError>) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &[KeyError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the failure recorded for a key, if any
    pub fn get(&self, key: &str) -> Option<&KeyError> {
        self.errors.iter().find(|e| e.key == key)
    }

    /// Names of every failing key, in schema order
    pub fn keys(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.key.as_str()).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.errors.len() == 1 { "error" } else { "errors" };
        write!(f, "Invalid configuration ({} {}):", self.errors.len(), noun)?;
        for error in &self.errors {
            write!(f, "\n  {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
