use crate::{
    error::StoreResult,
    store::{AssociationStore, Key},
};
use gastro_review_database_types::{Association, Relation};

/// The exclusive row currently held by `owner`, skipping `exclude`.
///
/// This is a single read. The store's own constraint is what guarantees at
/// most one exclusive row per owner; callers still have to translate a
/// constraint failure on write.
pub async fn current_exclusive<R, S>(
    store: &mut S,
    owner: &R::OwnerId,
    exclude: Option<&Key<R>>,
) -> StoreResult<Option<Association<R>>>
where
    R: Relation,
    S: AssociationStore<R> + ?Sized,
{
    if !R::SUPPORTS_EXCLUSIVE {
        return Ok(None);
    }

    Ok(store
        .find_exclusive_by_owner(owner)
        .await?
        .filter(|current| Some(&current.key) != exclude))
}
