use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use miro_connector_core::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Resource types exposed to the governance framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceTypeId {
    /// Organization member.
    User,
    /// Team inside the organization.
    Team,
    /// Organization role.
    Role,
    /// License tier.
    License,
}

impl ResourceTypeId {
    /// Returns the stable identifier used in tokens and entitlement ids.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Team => "team",
            Self::Role => "role",
            Self::License => "license",
        }
    }

    /// Returns the human readable name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Team => "Team",
            Self::Role => "Role",
            Self::License => "License",
        }
    }

    /// Returns the resource type description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::User => "User of Miro organization",
            Self::Team => "Team of Miro organization",
            Self::Role => "Role of Miro organization",
            Self::License => "License of Miro organization",
        }
    }

    /// Returns the trait shape of resources of this type, if any.
    #[must_use]
    pub fn trait_kind(&self) -> Option<TraitKind> {
        match self {
            Self::User => Some(TraitKind::User),
            Self::Team => Some(TraitKind::Group),
            Self::Role => Some(TraitKind::Role),
            Self::License => None,
        }
    }

    /// Returns all resource types in sync order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[ResourceTypeId] = &[
            ResourceTypeId::User,
            ResourceTypeId::Team,
            ResourceTypeId::Role,
            ResourceTypeId::License,
        ];

        ALL
    }
}

impl Display for ResourceTypeId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ResourceTypeId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "team" => Ok(Self::Team),
            "role" => Ok(Self::Role),
            "license" => Ok(Self::License),
            _ => Err(AppError::Validation(format!(
                "unknown resource type '{value}'"
            ))),
        }
    }
}

/// Trait shapes a resource can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitKind {
    /// Standard user shape.
    User,
    /// Group shape.
    Group,
    /// Role shape.
    Role,
}

/// Stable key of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId {
    /// Resource type of the node.
    pub resource_type: ResourceTypeId,
    /// Upstream identifier, unique within the resource type.
    pub resource: String,
}

impl ResourceId {
    /// Creates a resource key.
    #[must_use]
    pub fn new(resource_type: ResourceTypeId, resource: impl Into<String>) -> Self {
        Self {
            resource_type,
            resource: resource.into(),
        }
    }
}

impl Display for ResourceId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}:{}", self.resource_type, self.resource)
    }
}

/// Account status carried by the user trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Account can sign in.
    Enabled,
    /// Account is deactivated.
    Disabled,
}

/// Profile map with deterministic key order.
pub type Profile = BTreeMap<String, Value>;

/// Payload of user-shaped resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTrait {
    /// Free-form profile attributes.
    pub profile: Profile,
    /// Login identifier.
    pub login: String,
    /// Account status.
    pub status: UserStatus,
    /// Last observed activity.
    pub last_login: Option<DateTime<Utc>>,
}

/// Payload of group-shaped resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTrait {
    /// Free-form profile attributes.
    pub profile: Profile,
}

/// Payload of role-shaped resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleTrait {
    /// Free-form profile attributes.
    pub profile: Profile,
}

/// Typed trait payload attached to a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceTrait {
    /// User trait.
    User(UserTrait),
    /// Group trait.
    Group(GroupTrait),
    /// Role trait.
    Role(RoleTrait),
    /// Resource without a trait.
    Untyped,
}

/// Node of the governance graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Stable key.
    pub id: ResourceId,
    /// Name shown to reviewers.
    pub display_name: String,
    /// Typed payload.
    pub traits: ResourceTrait,
}

impl Resource {
    /// Creates a resource and checks the trait matches the resource type.
    pub fn new(
        id: ResourceId,
        display_name: impl Into<String>,
        traits: ResourceTrait,
    ) -> Result<Self, AppError> {
        let expected = id.resource_type.trait_kind();
        let actual = match &traits {
            ResourceTrait::User(_) => Some(TraitKind::User),
            ResourceTrait::Group(_) => Some(TraitKind::Group),
            ResourceTrait::Role(_) => Some(TraitKind::Role),
            ResourceTrait::Untyped => None,
        };

        if expected != actual {
            return Err(AppError::Validation(format!(
                "resource type '{}' does not accept trait {actual:?}",
                id.resource_type
            )));
        }

        Ok(Self {
            id,
            display_name: display_name.into(),
            traits,
        })
    }

    /// Returns the user trait, if present.
    #[must_use]
    pub fn user_trait(&self) -> Option<&UserTrait> {
        match &self.traits {
            ResourceTrait::User(user_trait) => Some(user_trait),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{GroupTrait, Profile, Resource, ResourceId, ResourceTrait, ResourceTypeId};

    #[test]
    fn resource_type_roundtrip_storage_value() {
        for resource_type in ResourceTypeId::all() {
            let restored = ResourceTypeId::from_str(resource_type.as_str());
            assert_eq!(restored.ok(), Some(*resource_type));
        }
    }

    #[test]
    fn unknown_resource_type_is_rejected() {
        assert!(ResourceTypeId::from_str("board").is_err());
    }

    #[test]
    fn trait_must_match_resource_type() {
        let result = Resource::new(
            ResourceId::new(ResourceTypeId::User, "user-1"),
            "someone",
            ResourceTrait::Group(GroupTrait {
                profile: Profile::new(),
            }),
        );
        assert!(result.is_err());
    }

    #[test]
    fn license_resources_are_untyped() {
        let result = Resource::new(
            ResourceId::new(ResourceTypeId::License, "full"),
            "Full License",
            ResourceTrait::Untyped,
        );
        assert!(result.is_ok());
    }
}
