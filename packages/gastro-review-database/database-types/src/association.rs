use crate::relations::Relation;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fmt::{self, Debug, Display},
    hash::Hash,
    str::FromStr,
};

/// Bounds shared by every identifier that can sit on either end of an association.
pub trait RelationId:
    Clone
    + Debug
    + Display
    + Eq
    + Hash
    + Ord
    + FromStr
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
}

impl<T> RelationId for T where
    T: Clone
        + Debug
        + Display
        + Eq
        + Hash
        + Ord
        + FromStr
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static
{
}

/// Two-part identity of an association row.
///
/// Equality, hashing and ordering are structural over both parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompositeKey<O, T> {
    #[serde(rename = "owner_id")]
    pub owner: O,
    #[serde(rename = "target_id")]
    pub target: T,
}

impl<O, T> CompositeKey<O, T> {
    pub fn new(owner: O, target: T) -> Self {
        Self { owner, target }
    }
}

impl<O: Display, T: Display> Display for CompositeKey<O, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.owner, self.target)
    }
}

/// A stored association between an owner and a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Association<R: Relation> {
    #[serde(flatten)]
    pub key: CompositeKey<R::OwnerId, R::TargetId>,
    pub exclusive: bool,
    #[serde(flatten)]
    pub attributes: R::Attributes,
}

impl<R: Relation> Association<R> {
    pub fn new(
        key: CompositeKey<R::OwnerId, R::TargetId>,
        exclusive: bool,
        attributes: R::Attributes,
    ) -> Self {
        Self {
            key,
            exclusive,
            attributes,
        }
    }
}

/// Caller-supplied shape for create and update.
///
/// Both identity fields are required on create. On update they may be left
/// out, and when present they must match the addressed key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct AssociationRequest<R: Relation> {
    #[serde(default)]
    pub owner_id: Option<R::OwnerId>,
    #[serde(default)]
    pub target_id: Option<R::TargetId>,
    #[serde(default)]
    pub exclusive: Option<bool>,
    #[serde(flatten)]
    pub attributes: R::Patch,
}

impl<R: Relation> Default for AssociationRequest<R> {
    fn default() -> Self {
        Self {
            owner_id: None,
            target_id: None,
            exclusive: None,
            attributes: R::Patch::default(),
        }
    }
}

impl<R: Relation> AssociationRequest<R> {
    pub fn new(owner_id: R::OwnerId, target_id: R::TargetId) -> Self {
        Self {
            owner_id: Some(owner_id),
            target_id: Some(target_id),
            ..Self::default()
        }
    }

    pub fn exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = Some(exclusive);
        self
    }

    pub fn attributes(mut self, attributes: R::Patch) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Which rows a listing returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationFilter<R: Relation> {
    All,
    Owner(R::OwnerId),
    Target(R::TargetId),
}

impl<R: Relation> AssociationFilter<R> {
    pub fn matches(&self, key: &CompositeKey<R::OwnerId, R::TargetId>) -> bool {
        match self {
            AssociationFilter::All => true,
            AssociationFilter::Owner(owner) => &key.owner == owner,
            AssociationFilter::Target(target) => &key.target == target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relations::{
        RestaurantAddress, RestaurantAddressAttributes, RestaurantAddressPatch,
        UserRole,
    };
    use uuid::Uuid;

    #[test]
    fn test_composite_key_equality_and_display() {
        let a = CompositeKey::new(1_i32, 2_i64);
        let b = CompositeKey::new(1_i32, 2_i64);
        let c = CompositeKey::new(1_i32, 3_i64);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a < c);
        assert_eq!(a.to_string(), "(1, 2)");
    }

    #[test]
    fn test_association_serializes_flat() {
        let restaurant = Uuid::new_v4();
        let association = Association::<RestaurantAddress>::new(
            CompositeKey::new(restaurant, 10),
            true,
            RestaurantAddressAttributes {
                branch_name: Some("Centro".to_string()),
            },
        );

        let json = serde_json::to_value(&association).unwrap();

        assert_eq!(json["owner_id"], restaurant.to_string());
        assert_eq!(json["target_id"], 10);
        assert_eq!(json["exclusive"], true);
        assert_eq!(json["branch_name"], "Centro");
    }

    #[test]
    fn test_association_request_parses_partial_json() {
        let request: AssociationRequest<RestaurantAddress> =
            serde_json::from_str(r#"{"branch_name": "Norte"}"#).unwrap();

        assert!(request.owner_id.is_none());
        assert!(request.exclusive.is_none());
        assert_eq!(
            request.attributes,
            RestaurantAddressPatch {
                branch_name: Some("Norte".to_string())
            }
        );
    }

    #[test]
    fn test_association_filter_matches_by_side() {
        let user = Uuid::new_v4();
        let key = CompositeKey::new(user, 3);

        assert!(AssociationFilter::<UserRole>::All.matches(&key));
        assert!(AssociationFilter::<UserRole>::Owner(user).matches(&key));
        assert!(!AssociationFilter::<UserRole>::Target(4).matches(&key));
    }
}
