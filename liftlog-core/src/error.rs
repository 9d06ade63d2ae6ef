use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Also returned when the row exists but belongs to another identity.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("invalid set list: {0}")]
    InvalidSets(String),

    #[error("store unavailable")]
    Unavailable,
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Maps driver errors onto the variants callers branch on.
pub(crate) fn from_sqlx(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_foreign_key_violation() || db.is_unique_violation() || db.is_check_violation() {
            return StoreError::Constraint(db.message().to_string());
        }
    }
    StoreError::Database(e)
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
