use thiserror::Error;

/// Failures a `Store` may report. Adapters classify their native errors
/// into these; callers above the store pass them through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("no {entity} found with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("foreign key violation: {0}")]
    ForeignKeyViolation(String),

    #[error("store error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Stable machine-readable code, used as the GraphQL error extension.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier(_) => "INVALID_IDENTIFIER",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ForeignKeyViolation(_) => "FOREIGN_KEY_VIOLATION",
            Self::Backend(_) => "STORE_ERROR",
        }
    }
}
