use std::fmt::{Display, Formatter};
use std::str::FromStr;

use miro_connector_core::AppError;
use serde::{Deserialize, Serialize};

use crate::resource::{Resource, ResourceId, ResourceTypeId};

/// Structured form of an entitlement identifier (`type:resource:slug`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntitlementId {
    /// Resource the entitlement is defined on.
    pub resource: ResourceId,
    /// Capability slug.
    pub slug: String,
}

impl Display for EntitlementId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}:{}", self.resource, self.slug)
    }
}

impl FromStr for EntitlementId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = value.split(':').collect();
        let [resource_type, resource, slug] = parts.as_slice() else {
            return Err(AppError::MalformedEntitlementId(value.to_owned()));
        };

        let resource_type = ResourceTypeId::from_str(resource_type)
            .map_err(|_| AppError::MalformedEntitlementId(value.to_owned()))?;

        Ok(Self {
            resource: ResourceId::new(resource_type, *resource),
            slug: (*slug).to_owned(),
        })
    }
}

/// Purpose of an entitlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementPurpose {
    /// Membership or assignment style capability.
    Assignment,
}

/// Capability a principal can be granted on a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    /// Rendered identifier, `type:resource:slug`.
    pub id: String,
    /// Resource the capability belongs to.
    pub resource: ResourceId,
    /// Capability slug.
    pub slug: String,
    /// Name shown to reviewers.
    pub display_name: String,
    /// Longer explanation.
    pub description: String,
    /// Entitlement purpose.
    pub purpose: EntitlementPurpose,
    /// Principal resource types that may hold it.
    pub grantable_to: Vec<ResourceTypeId>,
}

impl Entitlement {
    /// Creates an assignment entitlement grantable to users.
    #[must_use]
    pub fn assignment(
        resource: &Resource,
        slug: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let slug = slug.into();
        let id = EntitlementId {
            resource: resource.id.clone(),
            slug: slug.clone(),
        };

        Self {
            id: id.to_string(),
            resource: resource.id.clone(),
            slug,
            display_name: display_name.into(),
            description: description.into(),
            purpose: EntitlementPurpose::Assignment,
            grantable_to: vec![ResourceTypeId::User],
        }
    }

    /// Parses the rendered identifier back into its parts.
    pub fn parse_id(&self) -> Result<EntitlementId, AppError> {
        EntitlementId::from_str(self.id.as_str())
    }
}

/// Evidence that a principal currently holds an entitlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Rendered identifier, `entitlement:principal_type:principal`.
    pub id: String,
    /// Entitlement being held.
    pub entitlement: EntitlementId,
    /// Principal holding it.
    pub principal: ResourceId,
}

impl Grant {
    /// Creates a grant of `slug` on `resource` held by `principal`.
    #[must_use]
    pub fn new(resource: &ResourceId, slug: impl Into<String>, principal: &ResourceId) -> Self {
        let entitlement = EntitlementId {
            resource: resource.clone(),
            slug: slug.into(),
        };

        Self {
            id: format!("{entitlement}:{principal}"),
            entitlement,
            principal: principal.clone(),
        }
    }

    /// Returns the granted slug.
    #[must_use]
    pub fn slug(&self) -> &str {
        self.entitlement.slug.as_str()
    }
}

/// Result classification of a provisioning call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningStatus {
    /// Upstream state was mutated.
    Applied,
    /// Principal already held the entitlement; nothing was sent upstream.
    GrantAlreadyExists,
    /// Principal no longer held the entitlement; nothing was sent upstream.
    GrantAlreadyRevoked,
}

impl ProvisioningStatus {
    /// Returns true when no mutation was performed.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        !matches!(self, Self::Applied)
    }
}

/// Outcome of a grant call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantOutcome {
    /// Grants created by the call.
    pub grants: Vec<Grant>,
    /// Whether upstream was mutated.
    pub status: ProvisioningStatus,
}

impl GrantOutcome {
    /// Outcome for a mutation that created `grants`.
    #[must_use]
    pub fn applied(grants: Vec<Grant>) -> Self {
        Self {
            grants,
            status: ProvisioningStatus::Applied,
        }
    }

    /// Outcome for a grant that was already in place.
    #[must_use]
    pub fn already_exists() -> Self {
        Self {
            grants: Vec::new(),
            status: ProvisioningStatus::GrantAlreadyExists,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use proptest::prelude::*;

    use super::{EntitlementId, Grant};
    use crate::resource::{ResourceId, ResourceTypeId};

    #[test]
    fn entitlement_id_is_parsed_into_three_parts() {
        let parsed = EntitlementId::from_str("team:team-123:admin");
        let parsed = parsed.unwrap_or_else(|error| panic!("unexpected error: {error}"));

        assert_eq!(parsed.resource, ResourceId::new(ResourceTypeId::Team, "team-123"));
        assert_eq!(parsed.slug, "admin");
    }

    #[test]
    fn entitlement_id_with_wrong_arity_is_rejected() {
        assert!(EntitlementId::from_str("team:team-123").is_err());
        assert!(EntitlementId::from_str("team:team-123:admin:extra").is_err());
    }

    #[test]
    fn grant_id_embeds_entitlement_and_principal() {
        let grant = Grant::new(
            &ResourceId::new(ResourceTypeId::Team, "team-123"),
            "member",
            &ResourceId::new(ResourceTypeId::User, "user-456"),
        );

        assert_eq!(grant.id, "team:team-123:member:user:user-456");
        assert_eq!(grant.slug(), "member");
    }

    proptest! {
        #[test]
        fn rendered_entitlement_id_parses_back(
            type_index in 0usize..4,
            resource in "[A-Za-z0-9_-]{1,24}",
            slug in "[a-z_]{1,16}",
        ) {
            let resource_type = ResourceTypeId::all()[type_index];
            let id = EntitlementId {
                resource: ResourceId::new(resource_type, resource),
                slug,
            };

            let parsed = EntitlementId::from_str(id.to_string().as_str());
            prop_assert_eq!(parsed.ok(), Some(id));
        }
    }
}
