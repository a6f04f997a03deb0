use crate::{
    error::{StoreError, StoreResult},
    store::{AssociationStore, Key, ReferenceLookup, Transactional},
};
use anyhow::anyhow;
use async_trait::async_trait;
use gastro_review_database_types::{
    Association, AssociationFilter, Page, PageRequest, Relation,
};
use indexmap::IndexMap;
use std::collections::HashSet;

/// In-process store holding the rows of one relation kind.
///
/// It enforces the same constraints as the relational schema: composite
/// primary key, foreign keys on both ends, and at most one exclusive row per
/// owner. Transactions are snapshot based and cannot be nested.
#[derive(Debug)]
pub struct MemoryStore<R: Relation> {
    rows: IndexMap<Key<R>, Association<R>>,
    owners: HashSet<R::OwnerId>,
    targets: HashSet<R::TargetId>,
    pinned: HashSet<Key<R>>,
    snapshot: Option<IndexMap<Key<R>, Association<R>>>,
    failure: Option<(usize, StoreError)>,
}

impl<R: Relation> Default for MemoryStore<R> {
    fn default() -> Self {
        Self {
            rows: IndexMap::new(),
            owners: HashSet::new(),
            targets: HashSet::new(),
            pinned: HashSet::new(),
            snapshot: None,
            failure: None,
        }
    }
}

impl<R: Relation> MemoryStore<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_owner(&mut self, owner: R::OwnerId) {
        self.owners.insert(owner);
    }

    pub fn add_target(&mut self, target: R::TargetId) {
        self.targets.insert(target);
    }

    pub fn with_owner(mut self, owner: R::OwnerId) -> Self {
        self.add_owner(owner);
        self
    }

    pub fn with_target(mut self, target: R::TargetId) -> Self {
        self.add_target(target);
        self
    }

    /// Mark a row as referenced by a dependent record so deleting it fails
    /// with a foreign key violation.
    pub fn pin(&mut self, key: Key<R>) {
        self.pinned.insert(key);
    }

    /// Let `skip` saves through, then fail the next one with `err` without writing.
    pub fn fail_save(&mut self, skip: usize, err: StoreError) {
        self.failure = Some((skip, err));
    }

    pub fn fail_next_save(&mut self, err: StoreError) {
        self.fail_save(0, err);
    }

    pub fn rows(&self) -> impl Iterator<Item = &Association<R>> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn exclusive_count(&self, owner: &R::OwnerId) -> usize {
        self.rows
            .values()
            .filter(|row| row.exclusive && &row.key.owner == owner)
            .count()
    }

    pub fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }

    fn check_constraints(&self, association: &Association<R>) -> StoreResult<()> {
        let key = &association.key;

        if !self.owners.contains(&key.owner) {
            return Err(StoreError::ForeignKeyViolation(format!(
                "{} {} is not present",
                R::OWNER,
                key.owner
            )));
        }
        if !self.targets.contains(&key.target) {
            return Err(StoreError::ForeignKeyViolation(format!(
                "{} {} is not present",
                R::TARGET,
                key.target
            )));
        }

        if association.exclusive
            && self.rows.values().any(|row| {
                row.exclusive && row.key.owner == key.owner && &row.key != key
            })
        {
            return Err(StoreError::ExclusiveViolation(format!(
                "{} already has an exclusive {} row",
                key.owner,
                R::NAME
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl<R: Relation> AssociationStore<R> for MemoryStore<R> {
    async fn exists_by_key(&mut self, key: &Key<R>) -> StoreResult<bool> {
        Ok(self.rows.contains_key(key))
    }

    async fn find_by_key(&mut self, key: &Key<R>) -> StoreResult<Option<Association<R>>> {
        Ok(self.rows.get(key).cloned())
    }

    async fn find_exclusive_by_owner(
        &mut self,
        owner: &R::OwnerId,
    ) -> StoreResult<Option<Association<R>>> {
        Ok(self
            .rows
            .values()
            .find(|row| row.exclusive && &row.key.owner == owner)
            .cloned())
    }

    async fn save(&mut self, association: &Association<R>) -> StoreResult<()> {
        match self.failure.take() {
            Some((0, err)) => return Err(err),
            Some((skip, err)) => self.failure = Some((skip - 1, err)),
            None => {}
        }

        self.check_constraints(association)?;
        self.rows
            .insert(association.key.clone(), association.clone());
        Ok(())
    }

    async fn delete_by_key(&mut self, key: &Key<R>) -> StoreResult<bool> {
        if self.pinned.contains(key) {
            return Err(StoreError::ForeignKeyViolation(format!(
                "{} {key} is still referenced",
                R::NAME
            )));
        }
        Ok(self.rows.shift_remove(key).is_some())
    }

    async fn list(
        &mut self,
        filter: &AssociationFilter<R>,
        page: PageRequest,
    ) -> StoreResult<Page<Association<R>>> {
        let mut matching = self
            .rows
            .values()
            .filter(|row| filter.matches(&row.key))
            .cloned()
            .collect::<Vec<Association<R>>>();
        matching.sort_by(|a, b| a.key.cmp(&b.key));

        let total = matching.len();
        let items = matching
            .into_iter()
            .skip(page.offset())
            .take(page.size)
            .collect();

        Ok(Page::new(items, page, total))
    }
}

#[async_trait]
impl<R: Relation> ReferenceLookup<R> for MemoryStore<R> {
    async fn owner_exists(&mut self, owner: &R::OwnerId) -> StoreResult<bool> {
        Ok(self.owners.contains(owner))
    }

    async fn target_exists(&mut self, target: &R::TargetId) -> StoreResult<bool> {
        Ok(self.targets.contains(target))
    }
}

#[async_trait]
impl<R: Relation> Transactional for MemoryStore<R> {
    async fn start_transaction(&mut self) -> StoreResult<()> {
        if self.snapshot.is_some() {
            return Err(StoreError::Other(anyhow!("A transaction is already open.")));
        }
        self.snapshot = Some(self.rows.clone());
        Ok(())
    }

    async fn commit_transaction(&mut self) -> StoreResult<()> {
        self.snapshot
            .take()
            .map(|_| ())
            .ok_or_else(|| StoreError::Other(anyhow!("No transaction is open.")))
    }

    async fn revert_transaction(&mut self) -> StoreResult<()> {
        let snapshot = self
            .snapshot
            .take()
            .ok_or_else(|| StoreError::Other(anyhow!("No transaction is open.")))?;
        self.rows = snapshot;
        Ok(())
    }
}
