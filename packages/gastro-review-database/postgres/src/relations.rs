use chrono::{DateTime, Utc};
use gastro_review_database_types::*;
use sqlx::{
    postgres::{PgArguments, PgRow},
    query::Query,
    Postgres, Row,
};
use uuid::Uuid;

pub type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// Table layout of a relation kind, plus the typed binds and row decoding
/// the generic association queries need.
pub trait PgRelation: Relation {
    const TABLE: &'static str;
    const OWNER_COLUMN: &'static str;
    const TARGET_COLUMN: &'static str;
    const EXCLUSIVE_COLUMN: Option<&'static str> = None;
    /// Partial unique index backing the exclusive flag.
    const EXCLUSIVE_CONSTRAINT: Option<&'static str> = None;
    /// Non-key columns, in the order `bind_attributes` binds them.
    const ATTRIBUTE_COLUMNS: &'static [&'static str] = &[];

    fn bind_owner<'q>(query: PgQuery<'q>, owner: &Self::OwnerId) -> PgQuery<'q>;

    fn bind_target<'q>(query: PgQuery<'q>, target: &Self::TargetId) -> PgQuery<'q>;

    fn bind_attributes<'q>(query: PgQuery<'q>, _attributes: &Self::Attributes) -> PgQuery<'q> {
        query
    }

    fn from_row(row: &PgRow) -> sqlx::Result<Association<Self>>;
}

fn key_from_row<O, T>(row: &PgRow, owner: &str, target: &str) -> sqlx::Result<CompositeKey<O, T>>
where
    O: for<'r> sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
    T: for<'r> sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    Ok(CompositeKey::new(row.try_get(owner)?, row.try_get(target)?))
}

impl PgRelation for RestaurantAddress {
    const TABLE: &'static str = "restaurant_address";
    const OWNER_COLUMN: &'static str = "restaurant_id";
    const TARGET_COLUMN: &'static str = "address_id";
    const EXCLUSIVE_COLUMN: Option<&'static str> = Some("is_primary");
    const EXCLUSIVE_CONSTRAINT: Option<&'static str> = Some("restaurant_address_primary_idx");
    const ATTRIBUTE_COLUMNS: &'static [&'static str] = &["branch_name"];

    fn bind_owner<'q>(query: PgQuery<'q>, owner: &Uuid) -> PgQuery<'q> {
        query.bind(*owner)
    }

    fn bind_target<'q>(query: PgQuery<'q>, target: &i64) -> PgQuery<'q> {
        query.bind(*target)
    }

    fn bind_attributes<'q>(
        query: PgQuery<'q>,
        attributes: &RestaurantAddressAttributes,
    ) -> PgQuery<'q> {
        query.bind(attributes.branch_name.clone())
    }

    fn from_row(row: &PgRow) -> sqlx::Result<Association<Self>> {
        Ok(Association::new(
            key_from_row(row, Self::OWNER_COLUMN, Self::TARGET_COLUMN)?,
            row.try_get("is_primary")?,
            RestaurantAddressAttributes {
                branch_name: row.try_get("branch_name")?,
            },
        ))
    }
}

impl PgRelation for UserRole {
    const TABLE: &'static str = "user_roles";
    const OWNER_COLUMN: &'static str = "user_id";
    const TARGET_COLUMN: &'static str = "role_id";

    fn bind_owner<'q>(query: PgQuery<'q>, owner: &Uuid) -> PgQuery<'q> {
        query.bind(*owner)
    }

    fn bind_target<'q>(query: PgQuery<'q>, target: &i32) -> PgQuery<'q> {
        query.bind(*target)
    }

    fn from_row(row: &PgRow) -> sqlx::Result<Association<Self>> {
        Ok(Association::new(
            key_from_row(row, Self::OWNER_COLUMN, Self::TARGET_COLUMN)?,
            false,
            NoAttributes {},
        ))
    }
}

impl PgRelation for Friendship {
    const TABLE: &'static str = "friendships";
    const OWNER_COLUMN: &'static str = "follower_id";
    const TARGET_COLUMN: &'static str = "followed_id";
    const ATTRIBUTE_COLUMNS: &'static [&'static str] = &["created_at"];

    fn bind_owner<'q>(query: PgQuery<'q>, owner: &Uuid) -> PgQuery<'q> {
        query.bind(*owner)
    }

    fn bind_target<'q>(query: PgQuery<'q>, target: &Uuid) -> PgQuery<'q> {
        query.bind(*target)
    }

    fn bind_attributes<'q>(query: PgQuery<'q>, attributes: &FollowAttributes) -> PgQuery<'q> {
        query.bind(attributes.created_at)
    }

    fn from_row(row: &PgRow) -> sqlx::Result<Association<Self>> {
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        Ok(Association::new(
            key_from_row(row, Self::OWNER_COLUMN, Self::TARGET_COLUMN)?,
            false,
            FollowAttributes { created_at },
        ))
    }
}

impl PgRelation for FavoriteRestaurant {
    const TABLE: &'static str = "favorite_restaurants";
    const OWNER_COLUMN: &'static str = "user_id";
    const TARGET_COLUMN: &'static str = "restaurant_id";
    const ATTRIBUTE_COLUMNS: &'static [&'static str] = &["created_at"];

    fn bind_owner<'q>(query: PgQuery<'q>, owner: &Uuid) -> PgQuery<'q> {
        query.bind(*owner)
    }

    fn bind_target<'q>(query: PgQuery<'q>, target: &Uuid) -> PgQuery<'q> {
        query.bind(*target)
    }

    fn bind_attributes<'q>(query: PgQuery<'q>, attributes: &FavoriteAttributes) -> PgQuery<'q> {
        query.bind(attributes.created_at)
    }

    fn from_row(row: &PgRow) -> sqlx::Result<Association<Self>> {
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        Ok(Association::new(
            key_from_row(row, Self::OWNER_COLUMN, Self::TARGET_COLUMN)?,
            false,
            FavoriteAttributes { created_at },
        ))
    }
}

impl PgRelation for RestaurantCategory {
    const TABLE: &'static str = "restaurant_category";
    const OWNER_COLUMN: &'static str = "restaurant_id";
    const TARGET_COLUMN: &'static str = "category_id";

    fn bind_owner<'q>(query: PgQuery<'q>, owner: &Uuid) -> PgQuery<'q> {
        query.bind(*owner)
    }

    fn bind_target<'q>(query: PgQuery<'q>, target: &i32) -> PgQuery<'q> {
        query.bind(*target)
    }

    fn from_row(row: &PgRow) -> sqlx::Result<Association<Self>> {
        Ok(Association::new(
            key_from_row(row, Self::OWNER_COLUMN, Self::TARGET_COLUMN)?,
            false,
            NoAttributes {},
        ))
    }
}

impl PgRelation for UserAddress {
    const TABLE: &'static str = "user_address";
    const OWNER_COLUMN: &'static str = "user_id";
    const TARGET_COLUMN: &'static str = "address_id";
    const ATTRIBUTE_COLUMNS: &'static [&'static str] = &["type", "active"];

    fn bind_owner<'q>(query: PgQuery<'q>, owner: &Uuid) -> PgQuery<'q> {
        query.bind(*owner)
    }

    fn bind_target<'q>(query: PgQuery<'q>, target: &i64) -> PgQuery<'q> {
        query.bind(*target)
    }

    fn bind_attributes<'q>(
        query: PgQuery<'q>,
        attributes: &UserAddressAttributes,
    ) -> PgQuery<'q> {
        query
            .bind(attributes.address_type.clone())
            .bind(attributes.active)
    }

    fn from_row(row: &PgRow) -> sqlx::Result<Association<Self>> {
        Ok(Association::new(
            key_from_row(row, Self::OWNER_COLUMN, Self::TARGET_COLUMN)?,
            false,
            UserAddressAttributes {
                address_type: row.try_get("type")?,
                active: row.try_get("active")?,
            },
        ))
    }
}

/// Column list shared by every association `SELECT`.
pub fn select_columns<R: PgRelation>() -> String {
    let mut columns = vec![R::OWNER_COLUMN, R::TARGET_COLUMN];
    columns.extend(R::EXCLUSIVE_COLUMN);
    columns.extend(R::ATTRIBUTE_COLUMNS.iter().copied());
    columns.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_columns_follow_table_layout() {
        assert_eq!(
            select_columns::<RestaurantAddress>(),
            "restaurant_id, address_id, is_primary, branch_name"
        );
        assert_eq!(select_columns::<UserRole>(), "user_id, role_id");
        assert_eq!(
            select_columns::<UserAddress>(),
            "user_id, address_id, type, active"
        );
        assert_eq!(
            select_columns::<FavoriteRestaurant>(),
            "user_id, restaurant_id, created_at"
        );
    }

    #[test]
    fn test_only_restaurant_address_names_an_exclusive_index() {
        assert_eq!(
            RestaurantAddress::EXCLUSIVE_CONSTRAINT,
            Some("restaurant_address_primary_idx")
        );
        assert!(Friendship::EXCLUSIVE_CONSTRAINT.is_none());
        assert!(UserAddress::EXCLUSIVE_COLUMN.is_none());
    }
}
