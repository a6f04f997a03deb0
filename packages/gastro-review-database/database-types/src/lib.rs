#![deny(unused_crate_dependencies)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

pub mod association;
pub mod pagination;
pub mod relations;

pub use association::{
    Association, AssociationFilter, AssociationRequest, CompositeKey, RelationId,
};
pub use pagination::{Page, PageRequest, Paginator};
pub use relations::{
    FavoriteAttributes, FavoriteRestaurant, FollowAttributes, Friendship, NoAttributes,
    Relation, RestaurantAddress, RestaurantAddressAttributes, RestaurantAddressPatch,
    RestaurantCategory, UserAddress, UserAddressAttributes, UserAddressPatch, UserRole,
};

/// The kinds of entity an association can point at.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, AsRefStr, Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    User,
    Restaurant,
    Address,
    Role,
    Category,
}

impl EntityKind {
    /// Name of the table holding this entity.
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::User => "users",
            EntityKind::Restaurant => "restaurants",
            EntityKind::Address => "addresses",
            EntityKind::Role => "roles",
            EntityKind::Category => "restaurant_categories",
        }
    }
}

/// Which end of a composite key a value belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, AsRefStr, Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum Side {
    Owner,
    Target,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub hash_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub hash_password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub owner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRestaurant {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: i64,
    pub street: String,
    pub site: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state_region: Option<String>,
    pub postal_code: Option<i32>,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

fn default_country() -> String {
    "MX".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAddress {
    pub street: String,
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state_region: Option<String>,
    #[serde(default)]
    pub postal_code: Option<i32>,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRole {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}
