use gastro_review_database::{classify_entity_error, queries, types::*, DatabaseError};
use gastro_review_tests::fixtures::postgres_pool;
use uuid::Uuid;

#[tokio::test]
async fn test_duplicate_category_name_is_already_exists_postgres() {
    let pool = postgres_pool().await.unwrap();
    let mut conn = pool.acquire().await.unwrap();
    let name = format!("tacos {}", Uuid::new_v4());

    let created = queries::category_insert(
        &mut conn,
        NewCategory {
            name: name.clone(),
            icon: None,
        },
    )
    .await
    .map_err(|e| classify_entity_error(EntityKind::Category, e))
    .unwrap();
    assert_eq!(created.name, name);

    // Category names are unique regardless of case.
    let err = queries::category_insert(
        &mut conn,
        NewCategory {
            name: name.to_uppercase(),
            icon: None,
        },
    )
    .await
    .map_err(|e| classify_entity_error(EntityKind::Category, e))
    .unwrap_err();

    match err {
        DatabaseError::AlreadyExists { entity, .. } => {
            assert_eq!(entity, EntityKind::Category)
        }
        other => panic!("Unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_entity_reads_as_none_postgres() {
    let pool = postgres_pool().await.unwrap();
    let mut conn = pool.acquire().await.unwrap();

    assert!(queries::restaurant_get(&mut conn, Uuid::new_v4())
        .await
        .unwrap()
        .is_none());
    assert_eq!(queries::address_delete(&mut conn, -1).await.unwrap(), 0);
}
