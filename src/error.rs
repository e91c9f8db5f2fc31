//! Error types for registry access operations.
//!
//! The taxonomy separates expected outcomes that callers absorb locally
//! (a missing key while enumerating, a write of an unsupported type) from
//! genuine backend failures that propagate.

use crate::value_type::ValueType;
use std::io;
use thiserror::Error;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors that can occur while reading or writing the registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The target key (or value) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Raw bytes are inconsistent with the declared value type.
    #[error("Malformed {value_type} value: {reason}")]
    MalformedValue {
        /// Declared type of the value.
        value_type: ValueType,
        /// What was wrong with the bytes.
        reason: String,
    },

    /// The value type is outside the set supported for writing.
    #[error("Unsupported value type for write: {0}")]
    UnsupportedType(ValueType),

    /// A host value could not be converted to the requested value type.
    #[error("Invalid {value_type} value {value:?}: {reason}")]
    InvalidHostValue {
        /// Requested value type.
        value_type: ValueType,
        /// Offending host value, rendered as text.
        value: String,
        /// Why the conversion failed.
        reason: String,
    },

    /// The key path is structurally invalid for the backend.
    #[error("Invalid key path: {0}")]
    InvalidPath(String),

    /// The backend refused access to the key.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Any other backend failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl RegistryError {
    /// Creates a not found error with context about what was being searched.
    ///
    /// # Arguments
    ///
    /// * `item_type` - Type of item (e.g., "key", "value")
    /// * `name` - Name of the item that wasn't found
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use reg_access::error::RegistryError;
    /// let err = RegistryError::not_found("key", r"HKEY_CURRENT_USER\Missing");
    /// assert!(err.is_not_found());
    /// ```
    pub fn not_found(item_type: &str, name: &str) -> Self {
        Self::NotFound(format!("{} '{}'", item_type, name))
    }

    /// Creates a malformed value error.
    pub fn malformed(value_type: ValueType, reason: impl Into<String>) -> Self {
        Self::MalformedValue {
            value_type,
            reason: reason.into(),
        }
    }

    /// Creates an invalid host value error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use reg_access::{error::RegistryError, ValueType};
    /// let err = RegistryError::invalid_host_value(ValueType::Dword, "abc", "not a number");
    /// assert!(err.is_rejection());
    /// ```
    pub fn invalid_host_value(
        value_type: ValueType,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidHostValue {
            value_type,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for the "key does not exist" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns true for errors a write absorbs into a `false` result
    /// instead of propagating.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedType(_) | Self::InvalidHostValue { .. }
        )
    }
}
