use thiserror::Error;

/// Failures surfaced by the location tree, the resource filter and the stores.
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Cycle detected while resolving location '{name}' (path: {})", path.join(" -> "))]
    CycleDetected { name: String, path: Vec<String> },

    #[error("Location already exists: {0}")]
    DuplicateLocation(String),

    #[error("Location '{0}' needs a parent; only the root 'Global' may be created without one")]
    MissingParent(String),

    #[error("The location tree already has a root")]
    RootAlreadyExists,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;

impl DirectoryError {
    /// Converts a unique-key violation on `locations` into `RootAlreadyExists`
    /// for a root insert and `DuplicateLocation` otherwise.
    pub fn from_location_insert(err: sqlx::Error, name: &str, is_root: bool) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() && is_root => {
                DirectoryError::RootAlreadyExists
            }
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DirectoryError::DuplicateLocation(name.to_string())
            }
            _ => DirectoryError::Database(err),
        }
    }
}
