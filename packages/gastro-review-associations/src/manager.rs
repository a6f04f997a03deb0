use crate::{
    error::{AssociationError, AssociationResult, StoreError},
    exclusivity::current_exclusive,
    store::{AssociationStore, Key, ReferenceLookup, Transactional},
};
use gastro_review_database_types::{
    Association, AssociationFilter, AssociationRequest, CompositeKey, Page, Paginator,
    Relation, Side,
};
use std::marker::PhantomData;
use tracing::{debug, error, info, warn};

/// Create, update, delete, get and list for one relation kind.
///
/// Every write runs inside a single store transaction. A failed write is
/// reverted and its error returned unchanged.
pub struct AssociationManager<R, S> {
    store: S,
    paginator: Paginator,
    _relation: PhantomData<R>,
}

impl<R, S> AssociationManager<R, S>
where
    R: Relation,
    S: AssociationStore<R> + ReferenceLookup<R> + Transactional,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            paginator: Paginator::default(),
            _relation: PhantomData,
        }
    }

    pub fn with_paginator(mut self, paginator: Paginator) -> Self {
        self.paginator = paginator;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub async fn create(
        &mut self,
        request: AssociationRequest<R>,
    ) -> AssociationResult<Association<R>> {
        let owner = request.owner_id.ok_or_else(|| {
            AssociationError::InvalidArgument(format!(
                "`owner_id` is required to create a {} association.",
                R::NAME
            ))
        })?;
        let target = request.target_id.ok_or_else(|| {
            AssociationError::InvalidArgument(format!(
                "`target_id` is required to create a {} association.",
                R::NAME
            ))
        })?;

        R::validate_pair(&owner, &target).map_err(AssociationError::InvalidArgument)?;

        let exclusive = request.exclusive.unwrap_or(false);
        check_exclusive_supported::<R>(exclusive)?;

        let attributes =
            R::attributes_from(request.attributes).map_err(AssociationError::InvalidArgument)?;
        let association = Association::new(CompositeKey::new(owner, target), exclusive, attributes);

        self.store.start_transaction().await?;
        let result = self.create_in_transaction(association).await;
        self.finish(result).await
    }

    async fn create_in_transaction(
        &mut self,
        association: Association<R>,
    ) -> AssociationResult<Association<R>> {
        let key = association.key.clone();

        if !self.store.owner_exists(&key.owner).await? {
            return Err(AssociationError::ReferenceNotFound {
                relation: R::NAME,
                side: Side::Owner,
                entity: R::OWNER,
                id: key.owner.to_string(),
            });
        }

        if !self.store.target_exists(&key.target).await? {
            return Err(AssociationError::ReferenceNotFound {
                relation: R::NAME,
                side: Side::Target,
                entity: R::TARGET,
                id: key.target.to_string(),
            });
        }

        if self.store.exists_by_key(&key).await? {
            return Err(already_exists::<R>(&key));
        }

        if association.exclusive {
            self.demote_previous(&key).await?;
        }

        self.store
            .save(&association)
            .await
            .map_err(|e| translate_write_error::<R>(e, &key))?;

        info!("Created {} association {key}.", R::NAME);

        Ok(association)
    }

    /// Apply `request` to the row at (`owner`, `target`).
    ///
    /// The key itself never changes. Identity fields in the request must be
    /// absent or equal to the addressed key.
    pub async fn update(
        &mut self,
        owner: R::OwnerId,
        target: R::TargetId,
        request: AssociationRequest<R>,
    ) -> AssociationResult<Association<R>> {
        if matches!(&request.owner_id, Some(requested) if requested != &owner) {
            return Err(AssociationError::InvalidArgument(format!(
                "`owner_id` of a {} association cannot be changed.",
                R::NAME
            )));
        }
        if matches!(&request.target_id, Some(requested) if requested != &target) {
            return Err(AssociationError::InvalidArgument(format!(
                "`target_id` of a {} association cannot be changed.",
                R::NAME
            )));
        }
        check_exclusive_supported::<R>(request.exclusive.unwrap_or(false))?;

        let key = CompositeKey::new(owner, target);

        self.store.start_transaction().await?;
        let result = self
            .update_in_transaction(key, request.exclusive, request.attributes)
            .await;
        self.finish(result).await
    }

    async fn update_in_transaction(
        &mut self,
        key: Key<R>,
        exclusive: Option<bool>,
        patch: R::Patch,
    ) -> AssociationResult<Association<R>> {
        let mut association = self
            .store
            .find_by_key(&key)
            .await?
            .ok_or_else(|| not_found::<R>(&key))?;

        R::apply_patch(&mut association.attributes, patch);

        match exclusive {
            Some(true) => {
                self.demote_previous(&key).await?;
                association.exclusive = true;
            }
            Some(false) => association.exclusive = false,
            None => {}
        }

        self.store
            .save(&association)
            .await
            .map_err(|e| translate_write_error::<R>(e, &key))?;

        info!("Updated {} association {key}.", R::NAME);

        Ok(association)
    }

    pub async fn delete(
        &mut self,
        owner: R::OwnerId,
        target: R::TargetId,
    ) -> AssociationResult<()> {
        let key = CompositeKey::new(owner, target);

        self.store.start_transaction().await?;
        let result = self.delete_in_transaction(&key).await;
        self.finish(result).await
    }

    async fn delete_in_transaction(&mut self, key: &Key<R>) -> AssociationResult<()> {
        if !self.store.exists_by_key(key).await? {
            return Err(not_found::<R>(key));
        }

        let deleted = self
            .store
            .delete_by_key(key)
            .await
            .map_err(|e| translate_write_error::<R>(e, key))?;

        // Removed by someone else between the check and the delete.
        if !deleted {
            return Err(not_found::<R>(key));
        }

        info!("Deleted {} association {key}.", R::NAME);

        Ok(())
    }

    pub async fn get(
        &mut self,
        owner: R::OwnerId,
        target: R::TargetId,
    ) -> AssociationResult<Association<R>> {
        let key = CompositeKey::new(owner, target);
        debug!("Fetching {} association {key}.", R::NAME);

        self.store
            .find_by_key(&key)
            .await?
            .ok_or_else(|| not_found::<R>(&key))
    }

    /// One page of the rows matching `filter`. Only the page index is chosen
    /// by the caller; the size comes from the configured paginator.
    pub async fn list(
        &mut self,
        filter: AssociationFilter<R>,
        page: usize,
    ) -> AssociationResult<Page<Association<R>>> {
        let request = self.paginator.page(page);
        debug!(
            "Listing {} associations, page {} of size {}.",
            R::NAME,
            request.page,
            request.size
        );

        Ok(self.store.list(&filter, request).await?)
    }

    async fn demote_previous(&mut self, key: &Key<R>) -> AssociationResult<()> {
        let previous = current_exclusive::<R, S>(&mut self.store, &key.owner, Some(key)).await?;

        if let Some(mut previous) = previous {
            previous.exclusive = false;
            self.store
                .save(&previous)
                .await
                .map_err(|e| translate_write_error::<R>(e, &previous.key))?;

            info!(
                "Demoted previous exclusive {} association {}.",
                R::NAME,
                previous.key
            );
        }

        Ok(())
    }

    async fn finish<T>(
        &mut self,
        result: AssociationResult<T>,
    ) -> AssociationResult<T> {
        match result {
            Ok(value) => {
                self.store.commit_transaction().await?;
                Ok(value)
            }
            Err(e) => {
                warn!("Reverting {} transaction: {e}", R::NAME);
                if let Err(revert) = self.store.revert_transaction().await {
                    error!("Failed to revert {} transaction: {revert}", R::NAME);
                }
                Err(e)
            }
        }
    }
}

fn check_exclusive_supported<R: Relation>(exclusive: bool) -> AssociationResult<()> {
    if exclusive && !R::SUPPORTS_EXCLUSIVE {
        return Err(AssociationError::InvalidArgument(format!(
            "{} associations cannot be marked exclusive.",
            R::NAME
        )));
    }
    Ok(())
}

fn not_found<R: Relation>(key: &Key<R>) -> AssociationError {
    AssociationError::NotFound {
        relation: R::NAME,
        key: key.to_string(),
    }
}

fn already_exists<R: Relation>(key: &Key<R>) -> AssociationError {
    AssociationError::AlreadyExists {
        relation: R::NAME,
        key: key.to_string(),
    }
}

fn translate_write_error<R: Relation>(err: StoreError, key: &Key<R>) -> AssociationError {
    match err {
        StoreError::UniqueViolation(_) => already_exists::<R>(key),
        StoreError::ExclusiveViolation(_) => AssociationError::ExclusivityConflict {
            relation: R::NAME,
            owner: key.owner.to_string(),
        },
        StoreError::ForeignKeyViolation(reason) => AssociationError::Conflict {
            relation: R::NAME,
            reason,
        },
        other => AssociationError::Store(other),
    }
}
