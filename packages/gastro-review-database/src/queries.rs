use crate::{types::*, ReviewConnection};
use gastro_review_postgres::{self as postgres, PgRelation};
use uuid::Uuid;

pub async fn run_migration(conn: &mut ReviewConnection) -> sqlx::Result<()> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => postgres::run_migration(c).await,
    }
}

pub async fn start_transaction(conn: &mut ReviewConnection) -> sqlx::Result<usize> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => postgres::start_transaction(c).await,
    }
}

pub async fn commit_transaction(conn: &mut ReviewConnection) -> sqlx::Result<usize> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => postgres::commit_transaction(c).await,
    }
}

pub async fn revert_transaction(conn: &mut ReviewConnection) -> sqlx::Result<usize> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => postgres::revert_transaction(c).await,
    }
}

pub async fn association_exists<R: PgRelation>(
    conn: &mut ReviewConnection,
    key: &CompositeKey<R::OwnerId, R::TargetId>,
) -> sqlx::Result<bool> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => {
            postgres::association_exists::<R>(c, key).await
        }
    }
}

pub async fn association_get<R: PgRelation>(
    conn: &mut ReviewConnection,
    key: &CompositeKey<R::OwnerId, R::TargetId>,
) -> sqlx::Result<Option<Association<R>>> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => postgres::association_get::<R>(c, key).await,
    }
}

pub async fn association_exclusive_by_owner<R: PgRelation>(
    conn: &mut ReviewConnection,
    owner: &R::OwnerId,
) -> sqlx::Result<Option<Association<R>>> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => {
            postgres::association_exclusive_by_owner::<R>(c, owner).await
        }
    }
}

pub async fn association_insert<R: PgRelation>(
    conn: &mut ReviewConnection,
    association: &Association<R>,
) -> sqlx::Result<usize> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => {
            postgres::association_insert::<R>(c, association).await
        }
    }
}

pub async fn association_update<R: PgRelation>(
    conn: &mut ReviewConnection,
    association: &Association<R>,
) -> sqlx::Result<usize> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => {
            postgres::association_update::<R>(c, association).await
        }
    }
}

pub async fn association_delete<R: PgRelation>(
    conn: &mut ReviewConnection,
    key: &CompositeKey<R::OwnerId, R::TargetId>,
) -> sqlx::Result<usize> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => {
            postgres::association_delete::<R>(c, key).await
        }
    }
}

pub async fn association_list<R: PgRelation>(
    conn: &mut ReviewConnection,
    filter: &AssociationFilter<R>,
    page: PageRequest,
) -> sqlx::Result<Page<Association<R>>> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => {
            postgres::association_list::<R>(c, filter, page).await
        }
    }
}

pub async fn owner_exists<R: PgRelation>(
    conn: &mut ReviewConnection,
    owner: &R::OwnerId,
) -> sqlx::Result<bool> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => postgres::owner_exists::<R>(c, owner).await,
    }
}

pub async fn target_exists<R: PgRelation>(
    conn: &mut ReviewConnection,
    target: &R::TargetId,
) -> sqlx::Result<bool> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => {
            postgres::target_exists::<R>(c, target).await
        }
    }
}

pub async fn user_insert(conn: &mut ReviewConnection, user: NewUser) -> sqlx::Result<User> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => postgres::user_insert(c, user).await,
    }
}

pub async fn user_get(conn: &mut ReviewConnection, id: Uuid) -> sqlx::Result<Option<User>> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => postgres::user_get(c, id).await,
    }
}

pub async fn user_delete(conn: &mut ReviewConnection, id: Uuid) -> sqlx::Result<usize> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => postgres::user_delete(c, id).await,
    }
}

pub async fn restaurant_insert(
    conn: &mut ReviewConnection,
    restaurant: NewRestaurant,
) -> sqlx::Result<Restaurant> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => {
            postgres::restaurant_insert(c, restaurant).await
        }
    }
}

pub async fn restaurant_get(
    conn: &mut ReviewConnection,
    id: Uuid,
) -> sqlx::Result<Option<Restaurant>> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => postgres::restaurant_get(c, id).await,
    }
}

pub async fn restaurant_delete(conn: &mut ReviewConnection, id: Uuid) -> sqlx::Result<usize> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => postgres::restaurant_delete(c, id).await,
    }
}

pub async fn address_insert(
    conn: &mut ReviewConnection,
    address: NewAddress,
) -> sqlx::Result<Address> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => postgres::address_insert(c, address).await,
    }
}

pub async fn address_get(
    conn: &mut ReviewConnection,
    id: i64,
) -> sqlx::Result<Option<Address>> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => postgres::address_get(c, id).await,
    }
}

pub async fn address_delete(conn: &mut ReviewConnection, id: i64) -> sqlx::Result<usize> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => postgres::address_delete(c, id).await,
    }
}

pub async fn role_insert(conn: &mut ReviewConnection, role: NewRole) -> sqlx::Result<Role> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => postgres::role_insert(c, role).await,
    }
}

pub async fn role_get(conn: &mut ReviewConnection, id: i32) -> sqlx::Result<Option<Role>> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => postgres::role_get(c, id).await,
    }
}

pub async fn role_delete(conn: &mut ReviewConnection, id: i32) -> sqlx::Result<usize> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => postgres::role_delete(c, id).await,
    }
}

pub async fn category_insert(
    conn: &mut ReviewConnection,
    category: NewCategory,
) -> sqlx::Result<Category> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => postgres::category_insert(c, category).await,
    }
}

pub async fn category_get(
    conn: &mut ReviewConnection,
    id: i32,
) -> sqlx::Result<Option<Category>> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => postgres::category_get(c, id).await,
    }
}

pub async fn category_delete(conn: &mut ReviewConnection, id: i32) -> sqlx::Result<usize> {
    match conn {
        ReviewConnection::Postgres(ref mut c) => postgres::category_delete(c, id).await,
    }
}
