#![deny(unused_crate_dependencies)]

use gastro_review_database_types::*;
use sqlx::{pool::PoolConnection, postgres::PgRow, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

pub mod relations;

pub use relations::{select_columns, PgQuery, PgRelation};

pub async fn run_migration(conn: &mut PoolConnection<Postgres>) -> sqlx::Result<()> {
    sqlx::migrate!().run(conn).await?;
    info!("Database migrations applied.");
    Ok(())
}

pub async fn execute_query(
    conn: &mut PoolConnection<Postgres>,
    query: String,
) -> sqlx::Result<usize> {
    let mut builder = sqlx::QueryBuilder::new(query);
    let query = builder.build();
    let result = query.execute(conn).await?;
    Ok(result.rows_affected() as usize)
}

pub async fn start_transaction(
    conn: &mut PoolConnection<Postgres>,
) -> sqlx::Result<usize> {
    execute_query(conn, "BEGIN".into()).await
}

pub async fn commit_transaction(
    conn: &mut PoolConnection<Postgres>,
) -> sqlx::Result<usize> {
    execute_query(conn, "COMMIT".into()).await
}

pub async fn revert_transaction(
    conn: &mut PoolConnection<Postgres>,
) -> sqlx::Result<usize> {
    execute_query(conn, "ROLLBACK".into()).await
}

fn key_clause<R: PgRelation>() -> String {
    format!("{} = $1 AND {} = $2", R::OWNER_COLUMN, R::TARGET_COLUMN)
}

pub async fn association_exists<R: PgRelation>(
    conn: &mut PoolConnection<Postgres>,
    key: &CompositeKey<R::OwnerId, R::TargetId>,
) -> sqlx::Result<bool> {
    let query = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE {})",
        R::TABLE,
        key_clause::<R>()
    );
    let row = R::bind_target(R::bind_owner(sqlx::query(&query), &key.owner), &key.target)
        .fetch_one(conn)
        .await?;
    Ok(row.get(0))
}

pub async fn association_get<R: PgRelation>(
    conn: &mut PoolConnection<Postgres>,
    key: &CompositeKey<R::OwnerId, R::TargetId>,
) -> sqlx::Result<Option<Association<R>>> {
    let query = format!(
        "SELECT {} FROM {} WHERE {}",
        select_columns::<R>(),
        R::TABLE,
        key_clause::<R>()
    );
    let row = R::bind_target(R::bind_owner(sqlx::query(&query), &key.owner), &key.target)
        .fetch_optional(conn)
        .await?;
    row.as_ref().map(R::from_row).transpose()
}

pub async fn association_exclusive_by_owner<R: PgRelation>(
    conn: &mut PoolConnection<Postgres>,
    owner: &R::OwnerId,
) -> sqlx::Result<Option<Association<R>>> {
    let exclusive_column = match R::EXCLUSIVE_COLUMN {
        Some(column) => column,
        None => return Ok(None),
    };

    let query = format!(
        "SELECT {} FROM {} WHERE {} = $1 AND {} LIMIT 1",
        select_columns::<R>(),
        R::TABLE,
        R::OWNER_COLUMN,
        exclusive_column
    );
    let row = R::bind_owner(sqlx::query(&query), owner)
        .fetch_optional(conn)
        .await?;
    row.as_ref().map(R::from_row).transpose()
}

pub async fn association_insert<R: PgRelation>(
    conn: &mut PoolConnection<Postgres>,
    association: &Association<R>,
) -> sqlx::Result<usize> {
    let mut columns = vec![R::OWNER_COLUMN, R::TARGET_COLUMN];
    columns.extend(R::EXCLUSIVE_COLUMN);
    columns.extend(R::ATTRIBUTE_COLUMNS.iter().copied());

    let placeholders = (1..=columns.len())
        .map(|i| format!("${i}"))
        .collect::<Vec<String>>()
        .join(", ");

    let query = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        R::TABLE,
        columns.join(", "),
        placeholders
    );

    let mut q = R::bind_target(
        R::bind_owner(sqlx::query(&query), &association.key.owner),
        &association.key.target,
    );
    if R::EXCLUSIVE_COLUMN.is_some() {
        q = q.bind(association.exclusive);
    }
    q = R::bind_attributes(q, &association.attributes);

    debug!("Inserting {} {}.", R::NAME, association.key);
    let result = q.execute(conn).await?;
    Ok(result.rows_affected() as usize)
}

pub async fn association_update<R: PgRelation>(
    conn: &mut PoolConnection<Postgres>,
    association: &Association<R>,
) -> sqlx::Result<usize> {
    let mut columns = Vec::new();
    columns.extend(R::EXCLUSIVE_COLUMN);
    columns.extend(R::ATTRIBUTE_COLUMNS.iter().copied());

    // Nothing besides the key is stored.
    if columns.is_empty() {
        return Ok(0);
    }

    let assignments = columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{column} = ${}", i + 3))
        .collect::<Vec<String>>()
        .join(", ");

    let query = format!(
        "UPDATE {} SET {} WHERE {}",
        R::TABLE,
        assignments,
        key_clause::<R>()
    );

    let mut q = R::bind_target(
        R::bind_owner(sqlx::query(&query), &association.key.owner),
        &association.key.target,
    );
    if R::EXCLUSIVE_COLUMN.is_some() {
        q = q.bind(association.exclusive);
    }
    q = R::bind_attributes(q, &association.attributes);

    debug!("Updating {} {}.", R::NAME, association.key);
    let result = q.execute(conn).await?;
    Ok(result.rows_affected() as usize)
}

pub async fn association_delete<R: PgRelation>(
    conn: &mut PoolConnection<Postgres>,
    key: &CompositeKey<R::OwnerId, R::TargetId>,
) -> sqlx::Result<usize> {
    let query = format!("DELETE FROM {} WHERE {}", R::TABLE, key_clause::<R>());
    let result =
        R::bind_target(R::bind_owner(sqlx::query(&query), &key.owner), &key.target)
            .execute(conn)
            .await?;
    Ok(result.rows_affected() as usize)
}

fn bind_filter<'q, R: PgRelation>(
    query: PgQuery<'q>,
    filter: &AssociationFilter<R>,
) -> PgQuery<'q> {
    match filter {
        AssociationFilter::All => query,
        AssociationFilter::Owner(owner) => R::bind_owner(query, owner),
        AssociationFilter::Target(target) => R::bind_target(query, target),
    }
}

pub async fn association_list<R: PgRelation>(
    conn: &mut PoolConnection<Postgres>,
    filter: &AssociationFilter<R>,
    page: PageRequest,
) -> sqlx::Result<Page<Association<R>>> {
    let (clause, next) = match filter {
        AssociationFilter::All => (String::new(), 1),
        AssociationFilter::Owner(_) => (format!(" WHERE {} = $1", R::OWNER_COLUMN), 2),
        AssociationFilter::Target(_) => (format!(" WHERE {} = $1", R::TARGET_COLUMN), 2),
    };

    let count_query = format!("SELECT COUNT(*) FROM {}{}", R::TABLE, clause);
    let total: i64 = bind_filter(sqlx::query(&count_query), filter)
        .fetch_one(&mut *conn)
        .await?
        .get(0);

    let list_query = format!(
        "SELECT {} FROM {}{} ORDER BY {}, {} LIMIT ${} OFFSET ${}",
        select_columns::<R>(),
        R::TABLE,
        clause,
        R::OWNER_COLUMN,
        R::TARGET_COLUMN,
        next,
        next + 1
    );
    let items = bind_filter(sqlx::query(&list_query), filter)
        .bind(page.size as i64)
        .bind(page.offset() as i64)
        .fetch_all(&mut *conn)
        .await?
        .iter()
        .map(R::from_row)
        .collect::<sqlx::Result<Vec<Association<R>>>>()?;

    Ok(Page::new(items, page, total as usize))
}

pub async fn owner_exists<R: PgRelation>(
    conn: &mut PoolConnection<Postgres>,
    owner: &R::OwnerId,
) -> sqlx::Result<bool> {
    let query = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
        R::OWNER.table_name()
    );
    let row = R::bind_owner(sqlx::query(&query), owner)
        .fetch_one(conn)
        .await?;
    Ok(row.get(0))
}

pub async fn target_exists<R: PgRelation>(
    conn: &mut PoolConnection<Postgres>,
    target: &R::TargetId,
) -> sqlx::Result<bool> {
    let query = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
        R::TARGET.table_name()
    );
    let row = R::bind_target(sqlx::query(&query), target)
        .fetch_one(conn)
        .await?;
    Ok(row.get(0))
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get(0),
        email: row.get(1),
        hash_password: row.get(2),
    }
}

pub async fn user_insert(
    conn: &mut PoolConnection<Postgres>,
    user: NewUser,
) -> sqlx::Result<User> {
    let row = sqlx::query(
        "INSERT INTO users (email, hash_password) VALUES ($1, $2)
        RETURNING id, email, hash_password",
    )
    .bind(user.email)
    .bind(user.hash_password)
    .fetch_one(conn)
    .await?;

    Ok(user_from_row(&row))
}

pub async fn user_get(
    conn: &mut PoolConnection<Postgres>,
    id: Uuid,
) -> sqlx::Result<Option<User>> {
    Ok(
        sqlx::query("SELECT id, email, hash_password FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?
            .map(|row| user_from_row(&row)),
    )
}

pub async fn user_delete(
    conn: &mut PoolConnection<Postgres>,
    id: Uuid,
) -> sqlx::Result<usize> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() as usize)
}

fn restaurant_from_row(row: &PgRow) -> Restaurant {
    Restaurant {
        id: row.get(0),
        name: row.get(1),
        description: row.get(2),
        phone: row.get(3),
        email: row.get(4),
        owner_id: row.get(5),
        created_at: row.get(6),
    }
}

pub async fn restaurant_insert(
    conn: &mut PoolConnection<Postgres>,
    restaurant: NewRestaurant,
) -> sqlx::Result<Restaurant> {
    let row = sqlx::query(
        "INSERT INTO restaurants (name, description, phone, email, owner_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, description, phone, email, owner_id, created_at",
    )
    .bind(restaurant.name)
    .bind(restaurant.description)
    .bind(restaurant.phone)
    .bind(restaurant.email)
    .bind(restaurant.owner_id)
    .fetch_one(conn)
    .await?;

    Ok(restaurant_from_row(&row))
}

pub async fn restaurant_get(
    conn: &mut PoolConnection<Postgres>,
    id: Uuid,
) -> sqlx::Result<Option<Restaurant>> {
    Ok(sqlx::query(
        "SELECT id, name, description, phone, email, owner_id, created_at
        FROM restaurants WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?
    .map(|row| restaurant_from_row(&row)))
}

pub async fn restaurant_delete(
    conn: &mut PoolConnection<Postgres>,
    id: Uuid,
) -> sqlx::Result<usize> {
    let result = sqlx::query("DELETE FROM restaurants WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() as usize)
}

fn address_from_row(row: &PgRow) -> Address {
    Address {
        id: row.get(0),
        street: row.get(1),
        site: row.get(2),
        neighborhood: row.get(3),
        city: row.get(4),
        state_region: row.get(5),
        postal_code: row.get(6),
        country: row.get(7),
        latitude: row.get(8),
        longitude: row.get(9),
        created_at: row.get(10),
    }
}

const ADDRESS_COLUMNS: &str = "id, street, site, neighborhood, city, state_region, \
    postal_code, country, latitude, longitude, created_at";

pub async fn address_insert(
    conn: &mut PoolConnection<Postgres>,
    address: NewAddress,
) -> sqlx::Result<Address> {
    let query = format!(
        "INSERT INTO addresses
        (street, site, neighborhood, city, state_region, postal_code, country, latitude, longitude)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {ADDRESS_COLUMNS}"
    );
    let row = sqlx::query(&query)
        .bind(address.street)
        .bind(address.site)
        .bind(address.neighborhood)
        .bind(address.city)
        .bind(address.state_region)
        .bind(address.postal_code)
        .bind(address.country)
        .bind(address.latitude)
        .bind(address.longitude)
        .fetch_one(conn)
        .await?;

    Ok(address_from_row(&row))
}

pub async fn address_get(
    conn: &mut PoolConnection<Postgres>,
    id: i64,
) -> sqlx::Result<Option<Address>> {
    let query = format!("SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = $1");
    Ok(sqlx::query(&query)
        .bind(id)
        .fetch_optional(conn)
        .await?
        .map(|row| address_from_row(&row)))
}

pub async fn address_delete(
    conn: &mut PoolConnection<Postgres>,
    id: i64,
) -> sqlx::Result<usize> {
    let result = sqlx::query("DELETE FROM addresses WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() as usize)
}

pub async fn role_insert(
    conn: &mut PoolConnection<Postgres>,
    role: NewRole,
) -> sqlx::Result<Role> {
    let row = sqlx::query(
        "INSERT INTO roles (name, description) VALUES ($1, $2)
        RETURNING id, name, description",
    )
    .bind(role.name)
    .bind(role.description)
    .fetch_one(conn)
    .await?;

    Ok(Role {
        id: row.get(0),
        name: row.get(1),
        description: row.get(2),
    })
}

pub async fn role_get(
    conn: &mut PoolConnection<Postgres>,
    id: i32,
) -> sqlx::Result<Option<Role>> {
    Ok(
        sqlx::query("SELECT id, name, description FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?
            .map(|row| Role {
                id: row.get(0),
                name: row.get(1),
                description: row.get(2),
            }),
    )
}

pub async fn role_delete(
    conn: &mut PoolConnection<Postgres>,
    id: i32,
) -> sqlx::Result<usize> {
    let result = sqlx::query("DELETE FROM roles WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() as usize)
}

pub async fn category_insert(
    conn: &mut PoolConnection<Postgres>,
    category: NewCategory,
) -> sqlx::Result<Category> {
    let row = sqlx::query(
        "INSERT INTO restaurant_categories (name, icon) VALUES ($1, $2)
        RETURNING id, name, icon",
    )
    .bind(category.name)
    .bind(category.icon)
    .fetch_one(conn)
    .await?;

    Ok(Category {
        id: row.get(0),
        name: row.get(1),
        icon: row.get(2),
    })
}

pub async fn category_get(
    conn: &mut PoolConnection<Postgres>,
    id: i32,
) -> sqlx::Result<Option<Category>> {
    Ok(
        sqlx::query("SELECT id, name, icon FROM restaurant_categories WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?
            .map(|row| Category {
                id: row.get(0),
                name: row.get(1),
                icon: row.get(2),
            }),
    )
}

pub async fn category_delete(
    conn: &mut PoolConnection<Postgres>,
    id: i32,
) -> sqlx::Result<usize> {
    let result = sqlx::query("DELETE FROM restaurant_categories WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() as usize)
}
