// Domain errors - Error types for the domain layer

use std::fmt;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required field was absent from a server payload
    MissingField(String),
    /// The media source allows no play method at all
    NoPlayMethod(String),
    /// Invalid arguments provided
    BadArgs(String),
    /// Settings could not be interpreted
    InvalidConfig(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::MissingField(msg) => write!(f, "Missing field: {}", msg),
            DomainError::NoPlayMethod(msg) => write!(f, "No play method: {}", msg),
            DomainError::BadArgs(msg) => write!(f, "Bad arguments: {}", msg),
            DomainError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
