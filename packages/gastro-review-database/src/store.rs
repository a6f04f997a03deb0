use crate::{queries, types::*, DatabaseError, ReviewConnection};
use async_trait::async_trait;
use gastro_review_associations::{
    AssociationStore, Key, ReferenceLookup, StoreError, StoreResult, Transactional,
};
use gastro_review_postgres::PgRelation;
use sqlx::postgres::PgDatabaseError;
use std::marker::PhantomData;
use tracing::debug;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Association store backed by one pooled database connection.
///
/// Transactions run on that connection, so a manager built on this store
/// must keep it for the whole unit of work.
#[derive(Debug)]
pub struct DatabaseStore<R> {
    conn: ReviewConnection,
    _relation: PhantomData<R>,
}

impl<R: PgRelation> DatabaseStore<R> {
    pub fn new(conn: ReviewConnection) -> Self {
        Self {
            conn,
            _relation: PhantomData,
        }
    }
}

/// Map a SQLSTATE (plus the violated constraint, when known) onto a store error.
///
/// Returns `None` for codes that are not constraint violations.
pub(crate) fn classify_violation(
    code: Option<&str>,
    constraint: Option<&str>,
    exclusive_constraint: Option<&str>,
    message: &str,
) -> Option<StoreError> {
    match code {
        Some(UNIQUE_VIOLATION) => {
            if constraint.is_some() && constraint == exclusive_constraint {
                Some(StoreError::ExclusiveViolation(message.to_string()))
            } else {
                Some(StoreError::UniqueViolation(message.to_string()))
            }
        }
        Some(FOREIGN_KEY_VIOLATION) => {
            Some(StoreError::ForeignKeyViolation(message.to_string()))
        }
        _ => None,
    }
}

pub fn classify_error<R: PgRelation>(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let code = db_err.code();
        let constraint = db_err
            .try_downcast_ref::<PgDatabaseError>()
            .and_then(|e| e.constraint());

        if let Some(classified) = classify_violation(
            code.as_deref(),
            constraint,
            R::EXCLUSIVE_CONSTRAINT,
            db_err.message(),
        ) {
            return classified;
        }
    }
    StoreError::Other(anyhow::Error::new(err))
}

fn entity_violation(
    entity: EntityKind,
    code: Option<&str>,
    message: &str,
) -> Option<DatabaseError> {
    match classify_violation(code, None, None, message)? {
        StoreError::UniqueViolation(detail) => {
            Some(DatabaseError::AlreadyExists { entity, detail })
        }
        _ => None,
    }
}

/// Report a unique violation on an entity insert (a duplicate user email or
/// category name) as `AlreadyExists`; anything else stays a sqlx error.
pub fn classify_entity_error(entity: EntityKind, err: sqlx::Error) -> DatabaseError {
    if let sqlx::Error::Database(db_err) = &err {
        if let Some(classified) =
            entity_violation(entity, db_err.code().as_deref(), db_err.message())
        {
            return classified;
        }
    }
    DatabaseError::SqlxError(err)
}

#[async_trait]
impl<R: PgRelation> AssociationStore<R> for DatabaseStore<R> {
    async fn exists_by_key(&mut self, key: &Key<R>) -> StoreResult<bool> {
        queries::association_exists::<R>(&mut self.conn, key)
            .await
            .map_err(classify_error::<R>)
    }

    async fn find_by_key(&mut self, key: &Key<R>) -> StoreResult<Option<Association<R>>> {
        queries::association_get::<R>(&mut self.conn, key)
            .await
            .map_err(classify_error::<R>)
    }

    async fn find_exclusive_by_owner(
        &mut self,
        owner: &R::OwnerId,
    ) -> StoreResult<Option<Association<R>>> {
        queries::association_exclusive_by_owner::<R>(&mut self.conn, owner)
            .await
            .map_err(classify_error::<R>)
    }

    async fn save(&mut self, association: &Association<R>) -> StoreResult<()> {
        let updated = queries::association_update::<R>(&mut self.conn, association)
            .await
            .map_err(classify_error::<R>)?;

        if updated == 0
            && !queries::association_exists::<R>(&mut self.conn, &association.key)
                .await
                .map_err(classify_error::<R>)?
        {
            debug!("No {} row at {}, inserting.", R::NAME, association.key);
            queries::association_insert::<R>(&mut self.conn, association)
                .await
                .map_err(classify_error::<R>)?;
        }

        Ok(())
    }

    async fn delete_by_key(&mut self, key: &Key<R>) -> StoreResult<bool> {
        let deleted = queries::association_delete::<R>(&mut self.conn, key)
            .await
            .map_err(classify_error::<R>)?;
        Ok(deleted > 0)
    }

    async fn list(
        &mut self,
        filter: &AssociationFilter<R>,
        page: PageRequest,
    ) -> StoreResult<Page<Association<R>>> {
        queries::association_list::<R>(&mut self.conn, filter, page)
            .await
            .map_err(classify_error::<R>)
    }
}

#[async_trait]
impl<R: PgRelation> ReferenceLookup<R> for DatabaseStore<R> {
    async fn owner_exists(&mut self, owner: &R::OwnerId) -> StoreResult<bool> {
        queries::owner_exists::<R>(&mut self.conn, owner)
            .await
            .map_err(classify_error::<R>)
    }

    async fn target_exists(&mut self, target: &R::TargetId) -> StoreResult<bool> {
        queries::target_exists::<R>(&mut self.conn, target)
            .await
            .map_err(classify_error::<R>)
    }
}

#[async_trait]
impl<R: PgRelation> Transactional for DatabaseStore<R> {
    async fn start_transaction(&mut self) -> StoreResult<()> {
        queries::start_transaction(&mut self.conn)
            .await
            .map(|_| ())
            .map_err(classify_error::<R>)
    }

    async fn commit_transaction(&mut self) -> StoreResult<()> {
        queries::commit_transaction(&mut self.conn)
            .await
            .map(|_| ())
            .map_err(classify_error::<R>)
    }

    async fn revert_transaction(&mut self) -> StoreResult<()> {
        queries::revert_transaction(&mut self.conn)
            .await
            .map(|_| ())
            .map_err(classify_error::<R>)
    }
}
