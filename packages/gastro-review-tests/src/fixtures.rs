use crate::{defaults, TestError};
use gastro_review_associations::{AssociationManager, AssociationStore, Transactional};
use gastro_review_database::{queries, types::*, DatabaseStore, ReviewConnectionPool};
use uuid::Uuid;

pub type BranchManager =
    AssociationManager<RestaurantAddress, DatabaseStore<RestaurantAddress>>;

pub fn database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| defaults::POSTGRES_URL.to_string())
}

/// Connect to the test database and bring its schema up to date.
pub async fn postgres_pool() -> Result<ReviewConnectionPool, TestError> {
    let pool = ReviewConnectionPool::connect(&database_url()).await?;
    let mut conn = pool.acquire().await?;
    queries::run_migration(&mut conn).await?;
    Ok(pool)
}

/// A fresh restaurant and `count` fresh addresses with no branches between them.
#[derive(Debug)]
pub struct Branches {
    pub restaurant: Uuid,
    pub addresses: Vec<i64>,
}

pub async fn seed_branches(
    pool: &ReviewConnectionPool,
    count: usize,
) -> Result<Branches, TestError> {
    let mut conn = pool.acquire().await?;
    let tag = Uuid::new_v4();

    let restaurant = queries::restaurant_insert(
        &mut conn,
        NewRestaurant {
            name: format!("Fonda {tag}"),
            description: None,
            phone: None,
            email: None,
            owner_id: None,
        },
    )
    .await?;

    let mut addresses = Vec::with_capacity(count);
    for n in 0..count {
        let address = queries::address_insert(
            &mut conn,
            NewAddress {
                street: format!("Calle {n} {tag}"),
                site: None,
                neighborhood: None,
                city: Some("Guadalajara".to_string()),
                state_region: None,
                postal_code: None,
                country: "MX".to_string(),
                latitude: None,
                longitude: None,
            },
        )
        .await?;
        addresses.push(address.id);
    }

    Ok(Branches {
        restaurant: restaurant.id,
        addresses,
    })
}

pub async fn branch_manager(pool: &ReviewConnectionPool) -> Result<BranchManager, TestError> {
    Ok(AssociationManager::new(DatabaseStore::new(pool.acquire().await?)))
}

/// Save `association` in a transaction on its own connection and leave the
/// transaction open. Commit or revert through the returned store.
pub async fn hold_uncommitted(
    pool: &ReviewConnectionPool,
    association: &Association<RestaurantAddress>,
) -> Result<DatabaseStore<RestaurantAddress>, TestError> {
    let mut store = DatabaseStore::new(pool.acquire().await?);
    store.start_transaction().await?;
    store.save(association).await?;
    Ok(store)
}

pub fn primary_branch(restaurant: Uuid, address: i64) -> Association<RestaurantAddress> {
    Association::new(
        CompositeKey::new(restaurant, address),
        true,
        RestaurantAddressAttributes::default(),
    )
}
