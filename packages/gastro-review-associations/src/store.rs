use crate::error::StoreResult;
use async_trait::async_trait;
use gastro_review_database_types::{
    Association, AssociationFilter, CompositeKey, Page, PageRequest, Relation,
};

/// Composite key of a relation kind.
pub type Key<R> = CompositeKey<<R as Relation>::OwnerId, <R as Relation>::TargetId>;

/// Persistence of association rows for one relation kind.
#[async_trait]
pub trait AssociationStore<R: Relation>: Send {
    async fn exists_by_key(&mut self, key: &Key<R>) -> StoreResult<bool>;

    async fn find_by_key(&mut self, key: &Key<R>) -> StoreResult<Option<Association<R>>>;

    /// The row of `owner` whose exclusive flag is set, if any.
    async fn find_exclusive_by_owner(
        &mut self,
        owner: &R::OwnerId,
    ) -> StoreResult<Option<Association<R>>>;

    /// Update the row when its key is present, insert it otherwise.
    ///
    /// An insert that races another insert of the same key fails with
    /// `StoreError::UniqueViolation`.
    async fn save(&mut self, association: &Association<R>) -> StoreResult<()>;

    /// Returns whether a row was removed.
    async fn delete_by_key(&mut self, key: &Key<R>) -> StoreResult<bool>;

    async fn list(
        &mut self,
        filter: &AssociationFilter<R>,
        page: PageRequest,
    ) -> StoreResult<Page<Association<R>>>;
}

/// Existence checks for the entities on both ends of a relation.
#[async_trait]
pub trait ReferenceLookup<R: Relation>: Send {
    async fn owner_exists(&mut self, owner: &R::OwnerId) -> StoreResult<bool>;

    async fn target_exists(&mut self, target: &R::TargetId) -> StoreResult<bool>;
}

/// Explicit transaction boundaries around a unit of work.
#[async_trait]
pub trait Transactional: Send {
    async fn start_transaction(&mut self) -> StoreResult<()>;

    async fn commit_transaction(&mut self) -> StoreResult<()>;

    async fn revert_transaction(&mut self) -> StoreResult<()>;
}
