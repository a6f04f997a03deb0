use gastro_review_database_types::{EntityKind, Side};
use thiserror::Error;

pub type StoreResult<T> = core::result::Result<T, StoreError>;

/// Failures reported by an association store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("Exclusive constraint violated: {0}")]
    ExclusiveViolation(String),
    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type AssociationResult<T> = core::result::Result<T, AssociationError>;

#[derive(Error, Debug)]
pub enum AssociationError {
    #[error("{entity} {id} referenced as the {side} of {relation} does not exist.")]
    ReferenceNotFound {
        relation: &'static str,
        side: Side,
        entity: EntityKind,
        id: String,
    },
    #[error("No {relation} association exists for {key}.")]
    NotFound { relation: &'static str, key: String },
    #[error("A {relation} association already exists for {key}.")]
    AlreadyExists { relation: &'static str, key: String },
    #[error("Another {relation} association of {owner} was made exclusive concurrently.")]
    ExclusivityConflict {
        relation: &'static str,
        owner: String,
    },
    #[error("{relation} conflict: {reason}")]
    Conflict {
        relation: &'static str,
        reason: String,
    },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AssociationError {
    /// The request collided with existing state.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            AssociationError::AlreadyExists { .. }
                | AssociationError::ExclusivityConflict { .. }
                | AssociationError::Conflict { .. }
        )
    }

    /// The caller can fix the request; everything except store failures.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AssociationError::Store(_))
    }
}
