use std::fmt;

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Resource,
    ForumPost,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resource => f.write_str("resource"),
            Self::ForumPost => f.write_str("forum post"),
        }
    }
}

/// A submitted field failed its check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: Uuid },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid comment: {0}")]
    InvalidComment(&'static str),

    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl ContentError {
    pub fn not_found(kind: EntityKind, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }
}
