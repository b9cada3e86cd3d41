// src/domain/error.rs
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Cannot decode bookmark data: {0}")]
    Decode(String),

    #[error("Invalid import source: {0}")]
    InvalidSource(String),

    #[error("Invalid tag: {0}")]
    InvalidTag(String),

    #[error("Storage permission denied")]
    PermissionDenied,

    #[error("No import source in intent")]
    NoLocator,

    #[error("Bookmark store error: {0}")]
    Store(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// The two messages a user can ever see for a failed import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserFacingError {
    Generic,
    Permissions,
}

impl DomainError {
    pub fn context<C: Into<String>>(self, context: C) -> Self {
        match self {
            DomainError::Decode(msg) => DomainError::Decode(format!("{}: {}", context.into(), msg)),
            DomainError::Store(msg) => DomainError::Store(format!("{}: {}", context.into(), msg)),
            DomainError::Other(msg) => DomainError::Other(format!("{}: {}", context.into(), msg)),
            err => err,
        }
    }

    /// Maps every failure kind onto one of the two surfaced messages.
    pub fn user_facing(&self) -> UserFacingError {
        match self {
            DomainError::PermissionDenied => UserFacingError::Permissions,
            _ => UserFacingError::Generic,
        }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::Decode(e.to_string())
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
