use gastro_review_associations::{
    types::*, AssociationError, AssociationManager, MemoryStore, StoreError,
};
use uuid::Uuid;

type BranchManager = AssociationManager<RestaurantAddress, MemoryStore<RestaurantAddress>>;

const A1: i64 = 1;
const A2: i64 = 2;
const A3: i64 = 3;

fn restaurant() -> Uuid {
    Uuid::from_u128(0x51)
}

fn branch_manager() -> BranchManager {
    let store = MemoryStore::new()
        .with_owner(restaurant())
        .with_target(A1)
        .with_target(A2)
        .with_target(A3);
    AssociationManager::new(store)
}

fn branch(target: i64) -> AssociationRequest<RestaurantAddress> {
    AssociationRequest::new(restaurant(), target)
}

fn named(name: &str) -> RestaurantAddressPatch {
    RestaurantAddressPatch {
        branch_name: Some(name.to_string()),
    }
}

#[tokio::test]
async fn test_new_exclusive_branch_demotes_previous_primary() {
    let mut manager = branch_manager();

    let first = manager.create(branch(A1).exclusive(true)).await.unwrap();
    assert!(first.exclusive);

    let second = manager.create(branch(A2).exclusive(true)).await.unwrap();
    assert!(second.exclusive);

    assert!(!manager.get(restaurant(), A1).await.unwrap().exclusive);
    assert!(manager.get(restaurant(), A2).await.unwrap().exclusive);
    assert_eq!(manager.store().exclusive_count(&restaurant()), 1);
}

#[tokio::test]
async fn test_duplicate_key_is_rejected_and_not_stored_twice() {
    let mut manager = branch_manager();

    manager.create(branch(A1)).await.unwrap();
    let err = manager.create(branch(A1)).await.unwrap_err();

    assert!(matches!(err, AssociationError::AlreadyExists { .. }));
    assert!(err.is_conflict());
    assert_eq!(manager.store().len(), 1);
    assert!(!manager.store().in_transaction());
}

#[tokio::test]
async fn test_missing_owner_fails_before_any_write() {
    let mut manager = branch_manager();
    let unknown = Uuid::from_u128(0xdead);

    let err = manager
        .create(AssociationRequest::new(unknown, A1).exclusive(true))
        .await
        .unwrap_err();

    match err {
        AssociationError::ReferenceNotFound {
            side, entity, id, ..
        } => {
            assert_eq!(side, Side::Owner);
            assert_eq!(entity, EntityKind::Restaurant);
            assert_eq!(id, unknown.to_string());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(manager.store().is_empty());
}

#[tokio::test]
async fn test_missing_target_fails_before_any_write() {
    let mut manager = branch_manager();

    let err = manager.create(branch(99)).await.unwrap_err();

    assert!(matches!(
        err,
        AssociationError::ReferenceNotFound {
            side: Side::Target,
            entity: EntityKind::Address,
            ..
        }
    ));
    assert!(manager.store().is_empty());
}

#[tokio::test]
async fn test_partial_update_keeps_exclusive_flag() {
    let mut manager = branch_manager();
    manager
        .create(branch(A1).exclusive(true).attributes(named("Centro")))
        .await
        .unwrap();

    let updated = manager
        .update(
            restaurant(),
            A1,
            AssociationRequest::default().attributes(named("Downtown")),
        )
        .await
        .unwrap();

    assert_eq!(updated.attributes.branch_name.as_deref(), Some("Downtown"));
    assert!(updated.exclusive);
    assert_eq!(manager.get(restaurant(), A1).await.unwrap(), updated);
}

#[tokio::test]
async fn test_update_without_attributes_leaves_branch_name() {
    let mut manager = branch_manager();
    manager
        .create(branch(A1).attributes(named("Centro")))
        .await
        .unwrap();

    let updated = manager
        .update(restaurant(), A1, AssociationRequest::default().exclusive(true))
        .await
        .unwrap();

    assert!(updated.exclusive);
    assert_eq!(updated.attributes.branch_name.as_deref(), Some("Centro"));
}

#[tokio::test]
async fn test_update_to_exclusive_demotes_other_row() {
    let mut manager = branch_manager();
    manager.create(branch(A1).exclusive(true)).await.unwrap();
    manager.create(branch(A2)).await.unwrap();

    manager
        .update(restaurant(), A2, AssociationRequest::default().exclusive(true))
        .await
        .unwrap();

    assert!(!manager.get(restaurant(), A1).await.unwrap().exclusive);
    assert!(manager.get(restaurant(), A2).await.unwrap().exclusive);
}

#[tokio::test]
async fn test_update_can_clear_exclusive_flag() {
    let mut manager = branch_manager();
    manager.create(branch(A1).exclusive(true)).await.unwrap();

    let updated = manager
        .update(restaurant(), A1, AssociationRequest::default().exclusive(false))
        .await
        .unwrap();

    assert!(!updated.exclusive);
    assert_eq!(manager.store().exclusive_count(&restaurant()), 0);
}

#[tokio::test]
async fn test_update_cannot_move_the_key() {
    let mut manager = branch_manager();
    manager.create(branch(A1)).await.unwrap();

    let err = manager
        .update(restaurant(), A1, branch(A2).attributes(named("Moved")))
        .await
        .unwrap_err();
    assert!(matches!(err, AssociationError::InvalidArgument(_)));

    let stored = manager.get(restaurant(), A1).await.unwrap();
    assert_eq!(stored.key, CompositeKey::new(restaurant(), A1));
    assert!(stored.attributes.branch_name.is_none());
    assert!(manager.get(restaurant(), A2).await.is_err());

    // Repeating the same identity is accepted.
    let updated = manager
        .update(restaurant(), A1, branch(A1).attributes(named("Same")))
        .await
        .unwrap();
    assert_eq!(updated.key, CompositeKey::new(restaurant(), A1));
}

#[tokio::test]
async fn test_update_of_missing_key_is_not_found() {
    let mut manager = branch_manager();

    let err = manager
        .update(restaurant(), A1, AssociationRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AssociationError::NotFound { .. }));
    assert!(!manager.store().in_transaction());
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let mut manager = branch_manager();
    manager.create(branch(A1)).await.unwrap();

    manager.delete(restaurant(), A1).await.unwrap();

    let err = manager.get(restaurant(), A1).await.unwrap_err();
    assert!(matches!(err, AssociationError::NotFound { .. }));
    assert!(matches!(
        manager.delete(restaurant(), A1).await,
        Err(AssociationError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_delete_blocked_by_dependent_is_conflict() {
    let mut manager = branch_manager();
    manager.create(branch(A1)).await.unwrap();
    manager
        .store_mut()
        .pin(CompositeKey::new(restaurant(), A1));

    let err = manager.delete(restaurant(), A1).await.unwrap_err();

    assert!(matches!(err, AssociationError::Conflict { .. }));
    assert_eq!(manager.store().len(), 1);
}

#[tokio::test]
async fn test_failed_insert_restores_demoted_primary() {
    let mut manager = branch_manager();
    manager.create(branch(A1).exclusive(true)).await.unwrap();

    // The demotion of A1 goes through, then the insert of A2 hits the
    // exclusive index because another writer promoted a row in between.
    manager.store_mut().fail_save(
        1,
        StoreError::ExclusiveViolation("restaurant_address_primary_idx".to_string()),
    );
    let err = manager.create(branch(A2).exclusive(true)).await.unwrap_err();

    assert!(matches!(err, AssociationError::ExclusivityConflict { .. }));
    assert!(err.is_conflict());
    assert!(manager.get(restaurant(), A1).await.unwrap().exclusive);
    assert!(manager.get(restaurant(), A2).await.is_err());
    assert!(!manager.store().in_transaction());
}

#[tokio::test]
async fn test_store_failure_is_reported_as_internal() {
    let mut manager = branch_manager();
    manager.create(branch(A1).exclusive(true)).await.unwrap();

    manager
        .store_mut()
        .fail_next_save(StoreError::Other(anyhow::anyhow!("connection reset by peer")));
    let err = manager.create(branch(A2).exclusive(true)).await.unwrap_err();

    assert!(matches!(err, AssociationError::Store(_)));
    assert!(!err.is_client_error());
    assert!(manager.get(restaurant(), A1).await.unwrap().exclusive);
    assert_eq!(manager.store().len(), 1);
}

#[tokio::test]
async fn test_listing_pages_by_owner_with_configured_size() {
    let mut manager = branch_manager().with_paginator(Paginator::new(2));
    for target in [A3, A1, A2] {
        manager.create(branch(target)).await.unwrap();
    }

    let first = manager
        .list(AssociationFilter::Owner(restaurant()), 0)
        .await
        .unwrap();
    assert_eq!(first.total, 3);
    assert_eq!(first.total_pages(), 2);
    assert_eq!(
        first.items.iter().map(|a| a.key.target).collect::<Vec<_>>(),
        vec![A1, A2]
    );

    let second = manager
        .list(AssociationFilter::Owner(restaurant()), 1)
        .await
        .unwrap();
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].key.target, A3);

    let by_address = manager.list(AssociationFilter::Target(A2), 0).await.unwrap();
    assert_eq!(by_address.total, 1);
}

#[tokio::test]
async fn test_plain_relation_rejects_exclusive_flag() {
    let user = Uuid::new_v4();
    let store = MemoryStore::<UserRole>::new().with_owner(user).with_target(1);
    let mut manager = AssociationManager::new(store);

    let err = manager
        .create(AssociationRequest::new(user, 1).exclusive(true))
        .await
        .unwrap_err();
    assert!(matches!(err, AssociationError::InvalidArgument(_)));

    let role = manager.create(AssociationRequest::new(user, 1)).await.unwrap();
    assert!(!role.exclusive);
}

#[tokio::test]
async fn test_create_requires_both_identity_fields() {
    let mut manager = branch_manager();

    let err = manager
        .create(AssociationRequest {
            owner_id: Some(restaurant()),
            ..AssociationRequest::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AssociationError::InvalidArgument(_)));
    assert!(!manager.store().in_transaction());
}

#[tokio::test]
async fn test_friendship_rejects_self_follow() {
    let ana = Uuid::new_v4();
    let luis = Uuid::new_v4();
    let store = MemoryStore::<Friendship>::new()
        .with_owner(ana)
        .with_owner(luis)
        .with_target(ana)
        .with_target(luis);
    let mut manager = AssociationManager::new(store);

    let err = manager
        .create(AssociationRequest::new(ana, ana))
        .await
        .unwrap_err();
    assert!(matches!(err, AssociationError::InvalidArgument(_)));

    manager.create(AssociationRequest::new(ana, luis)).await.unwrap();
    manager.create(AssociationRequest::new(luis, ana)).await.unwrap();

    let followers_of_ana = manager
        .list(AssociationFilter::Target(ana), 0)
        .await
        .unwrap();
    assert_eq!(followers_of_ana.total, 1);
    assert_eq!(followers_of_ana.items[0].key.owner, luis);
}

#[tokio::test]
async fn test_user_address_requires_type_and_patches_fields() {
    let user = Uuid::new_v4();
    let store = MemoryStore::<UserAddress>::new()
        .with_owner(user)
        .with_target(A1);
    let mut manager = AssociationManager::new(store);

    let err = manager
        .create(AssociationRequest::new(user, A1))
        .await
        .unwrap_err();
    assert!(matches!(err, AssociationError::InvalidArgument(_)));
    assert!(manager.store().is_empty());

    let created = manager
        .create(AssociationRequest::new(user, A1).attributes(UserAddressPatch {
            address_type: Some("home".to_string()),
            active: None,
        }))
        .await
        .unwrap();
    assert!(created.attributes.active);

    let updated = manager
        .update(
            user,
            A1,
            AssociationRequest::default().attributes(UserAddressPatch {
                address_type: None,
                active: Some(false),
            }),
        )
        .await
        .unwrap();

    assert_eq!(updated.attributes.address_type, "home");
    assert!(!updated.attributes.active);
}

#[tokio::test]
async fn test_favorite_restaurants_list_by_user_and_by_restaurant() {
    let ana = Uuid::new_v4();
    let luis = Uuid::new_v4();
    let taqueria = Uuid::new_v4();
    let store = MemoryStore::<FavoriteRestaurant>::new()
        .with_owner(ana)
        .with_owner(luis)
        .with_target(taqueria)
        .with_target(restaurant());
    let mut manager = AssociationManager::new(store);

    let favorite = manager
        .create(AssociationRequest::new(ana, taqueria))
        .await
        .unwrap();
    manager
        .create(AssociationRequest::new(ana, restaurant()))
        .await
        .unwrap();
    manager
        .create(AssociationRequest::new(luis, taqueria))
        .await
        .unwrap();

    let err = manager
        .create(AssociationRequest::new(ana, taqueria))
        .await
        .unwrap_err();
    assert!(matches!(err, AssociationError::AlreadyExists { .. }));

    // The creation time is stamped once and survives an update.
    let updated = manager
        .update(ana, taqueria, AssociationRequest::default())
        .await
        .unwrap();
    assert_eq!(updated.attributes.created_at, favorite.attributes.created_at);

    let of_ana = manager.list(AssociationFilter::Owner(ana), 0).await.unwrap();
    assert_eq!(of_ana.total, 2);

    let fans = manager
        .list(AssociationFilter::Target(taqueria), 0)
        .await
        .unwrap();
    assert_eq!(fans.total, 2);

    let err = manager
        .create(AssociationRequest::new(ana, Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AssociationError::ReferenceNotFound {
            side: Side::Target,
            entity: EntityKind::Restaurant,
            ..
        }
    ));
}

#[tokio::test]
async fn test_failed_promotion_on_update_restores_demoted_primary() {
    let mut manager = branch_manager();
    manager.create(branch(A1).exclusive(true)).await.unwrap();
    manager.create(branch(A2)).await.unwrap();

    // A1 is demoted, then promoting A2 hits the exclusive index.
    manager.store_mut().fail_save(
        1,
        StoreError::ExclusiveViolation("restaurant_address_primary_idx".to_string()),
    );
    let err = manager
        .update(restaurant(), A2, AssociationRequest::default().exclusive(true))
        .await
        .unwrap_err();

    assert!(matches!(err, AssociationError::ExclusivityConflict { .. }));
    assert!(manager.get(restaurant(), A1).await.unwrap().exclusive);
    assert!(!manager.get(restaurant(), A2).await.unwrap().exclusive);
    assert_eq!(manager.store().exclusive_count(&restaurant()), 1);
    assert!(!manager.store().in_transaction());
}
