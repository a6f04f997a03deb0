use crate::{association::RelationId, EntityKind};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt::Debug;
use uuid::Uuid;

/// A kind of composite-key relation between two entities.
///
/// Each kind names its identifier types, the entities on both ends, whether
/// it carries the one-exclusive-row-per-owner flag, and how its non-key
/// attributes are built on create and patched on update.
pub trait Relation: Debug + Clone + Copy + PartialEq + Eq + Default + Send + Sync + 'static {
    type OwnerId: RelationId;
    type TargetId: RelationId;
    type Attributes: Debug
        + Clone
        + PartialEq
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;
    type Patch: Debug
        + Clone
        + Default
        + PartialEq
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    const NAME: &'static str;
    const OWNER: EntityKind;
    const TARGET: EntityKind;
    const SUPPORTS_EXCLUSIVE: bool;

    /// Reject pairs that can never form a valid association.
    fn validate_pair(_owner: &Self::OwnerId, _target: &Self::TargetId) -> Result<(), String> {
        Ok(())
    }

    /// Build the attributes of a new row, failing when a required one is missing.
    fn attributes_from(patch: Self::Patch) -> Result<Self::Attributes, String>;

    /// Overwrite only the attributes present in `patch`.
    fn apply_patch(attributes: &mut Self::Attributes, patch: Self::Patch);
}

/// Attribute set for relations that carry nothing besides their key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoAttributes {}

/// Restaurant branch located at an address. A restaurant has at most one primary branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RestaurantAddress;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantAddressAttributes {
    pub branch_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantAddressPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
}

impl Relation for RestaurantAddress {
    type OwnerId = Uuid;
    type TargetId = i64;
    type Attributes = RestaurantAddressAttributes;
    type Patch = RestaurantAddressPatch;

    const NAME: &'static str = "restaurant_address";
    const OWNER: EntityKind = EntityKind::Restaurant;
    const TARGET: EntityKind = EntityKind::Address;
    const SUPPORTS_EXCLUSIVE: bool = true;

    fn attributes_from(patch: Self::Patch) -> Result<Self::Attributes, String> {
        Ok(RestaurantAddressAttributes {
            branch_name: patch.branch_name,
        })
    }

    fn apply_patch(attributes: &mut Self::Attributes, patch: Self::Patch) {
        if let Some(branch_name) = patch.branch_name {
            attributes.branch_name = Some(branch_name);
        }
    }
}

/// Role membership of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserRole;

impl Relation for UserRole {
    type OwnerId = Uuid;
    type TargetId = i32;
    type Attributes = NoAttributes;
    type Patch = NoAttributes;

    const NAME: &'static str = "user_roles";
    const OWNER: EntityKind = EntityKind::User;
    const TARGET: EntityKind = EntityKind::Role;
    const SUPPORTS_EXCLUSIVE: bool = false;

    fn attributes_from(_patch: Self::Patch) -> Result<Self::Attributes, String> {
        Ok(NoAttributes {})
    }

    fn apply_patch(_attributes: &mut Self::Attributes, _patch: Self::Patch) {}
}

/// Directed follow edge: the owner follows the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Friendship;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowAttributes {
    pub created_at: DateTime<Utc>,
}

impl Relation for Friendship {
    type OwnerId = Uuid;
    type TargetId = Uuid;
    type Attributes = FollowAttributes;
    type Patch = NoAttributes;

    const NAME: &'static str = "friendships";
    const OWNER: EntityKind = EntityKind::User;
    const TARGET: EntityKind = EntityKind::User;
    const SUPPORTS_EXCLUSIVE: bool = false;

    fn validate_pair(follower: &Uuid, followed: &Uuid) -> Result<(), String> {
        if follower == followed {
            return Err("A user cannot follow themselves.".to_string());
        }
        Ok(())
    }

    fn attributes_from(_patch: Self::Patch) -> Result<Self::Attributes, String> {
        Ok(FollowAttributes {
            created_at: Utc::now(),
        })
    }

    fn apply_patch(_attributes: &mut Self::Attributes, _patch: Self::Patch) {}
}

/// Restaurant saved by a user as a favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FavoriteRestaurant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteAttributes {
    pub created_at: DateTime<Utc>,
}

impl Relation for FavoriteRestaurant {
    type OwnerId = Uuid;
    type TargetId = Uuid;
    type Attributes = FavoriteAttributes;
    type Patch = NoAttributes;

    const NAME: &'static str = "favorite_restaurants";
    const OWNER: EntityKind = EntityKind::User;
    const TARGET: EntityKind = EntityKind::Restaurant;
    const SUPPORTS_EXCLUSIVE: bool = false;

    fn attributes_from(_patch: Self::Patch) -> Result<Self::Attributes, String> {
        Ok(FavoriteAttributes {
            created_at: Utc::now(),
        })
    }

    fn apply_patch(_attributes: &mut Self::Attributes, _patch: Self::Patch) {}
}

/// Category membership of a restaurant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RestaurantCategory;

impl Relation for RestaurantCategory {
    type OwnerId = Uuid;
    type TargetId = i32;
    type Attributes = NoAttributes;
    type Patch = NoAttributes;

    const NAME: &'static str = "restaurant_category";
    const OWNER: EntityKind = EntityKind::Restaurant;
    const TARGET: EntityKind = EntityKind::Category;
    const SUPPORTS_EXCLUSIVE: bool = false;

    fn attributes_from(_patch: Self::Patch) -> Result<Self::Attributes, String> {
        Ok(NoAttributes {})
    }

    fn apply_patch(_attributes: &mut Self::Attributes, _patch: Self::Patch) {}
}

/// Address saved by a user, tagged with a kind such as "home" or "work".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserAddress;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAddressAttributes {
    #[serde(rename = "type")]
    pub address_type: String,
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAddressPatch {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub address_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl Relation for UserAddress {
    type OwnerId = Uuid;
    type TargetId = i64;
    type Attributes = UserAddressAttributes;
    type Patch = UserAddressPatch;

    const NAME: &'static str = "user_address";
    const OWNER: EntityKind = EntityKind::User;
    const TARGET: EntityKind = EntityKind::Address;
    const SUPPORTS_EXCLUSIVE: bool = false;

    fn attributes_from(patch: Self::Patch) -> Result<Self::Attributes, String> {
        let address_type = patch
            .address_type
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| "Field `type` is required for a user address.".to_string())?;

        Ok(UserAddressAttributes {
            address_type,
            active: patch.active.unwrap_or(true),
        })
    }

    fn apply_patch(attributes: &mut Self::Attributes, patch: Self::Patch) {
        if let Some(address_type) = patch.address_type {
            attributes.address_type = address_type;
        }
        if let Some(active) = patch.active {
            attributes.active = active;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_friendship_rejects_self_follow() {
        let user = Uuid::new_v4();

        assert!(Friendship::validate_pair(&user, &user).is_err());
        assert!(Friendship::validate_pair(&user, &Uuid::new_v4()).is_ok());
    }

    #[test]
    fn test_user_address_requires_type_and_defaults_active() {
        assert!(UserAddress::attributes_from(UserAddressPatch::default()).is_err());

        let attributes = UserAddress::attributes_from(UserAddressPatch {
            address_type: Some("home".to_string()),
            active: None,
        })
        .unwrap();

        assert_eq!(attributes.address_type, "home");
        assert!(attributes.active);
    }

    #[test]
    fn test_user_address_patch_only_touches_present_fields() {
        let mut attributes = UserAddressAttributes {
            address_type: "home".to_string(),
            active: true,
        };

        UserAddress::apply_patch(
            &mut attributes,
            UserAddressPatch {
                address_type: None,
                active: Some(false),
            },
        );

        assert_eq!(attributes.address_type, "home");
        assert!(!attributes.active);
    }

    #[test]
    fn test_restaurant_address_patch_keeps_branch_name_when_absent() {
        let mut attributes = RestaurantAddressAttributes {
            branch_name: Some("Centro".to_string()),
        };

        RestaurantAddress::apply_patch(&mut attributes, RestaurantAddressPatch::default());
        assert_eq!(attributes.branch_name.as_deref(), Some("Centro"));
    }

    #[test]
    fn test_only_restaurant_address_supports_exclusivity() {
        assert!(RestaurantAddress::SUPPORTS_EXCLUSIVE);
        assert!(!UserRole::SUPPORTS_EXCLUSIVE);
        assert!(!Friendship::SUPPORTS_EXCLUSIVE);
        assert!(!RestaurantCategory::SUPPORTS_EXCLUSIVE);
        assert!(!UserAddress::SUPPORTS_EXCLUSIVE);
        assert!(!FavoriteRestaurant::SUPPORTS_EXCLUSIVE);
    }

    #[test]
    fn test_favorite_restaurant_stamps_creation_time_once() {
        let before = Utc::now();
        let mut attributes = FavoriteRestaurant::attributes_from(NoAttributes {}).unwrap();
        assert!(attributes.created_at >= before);

        let created_at = attributes.created_at;
        FavoriteRestaurant::apply_patch(&mut attributes, NoAttributes {});
        assert_eq!(attributes.created_at, created_at);
    }
}
