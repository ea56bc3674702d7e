//! Static license, organization role and team role tables.
//!
//! Catalogs are immutable once built and are injected into the syncers, so
//! tests and deployments can swap them without touching process globals.

use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use miro_connector_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Upstream role key every member falls back to when a role is revoked.
pub const DEFAULT_ROLE_KEY: &str = "ORGANIZATION_INTERNAL_USER";

/// Entitlement slug used by organization role resources.
pub const ROLE_ASSIGNED_SLUG: &str = "assigned";

/// Role a member can hold inside a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    /// Organization member without team access.
    NonTeam,
    /// Regular team member.
    Member,
    /// Team administrator.
    Admin,
    /// Guest of the team.
    TeamGuest,
}

impl TeamRole {
    /// Returns the upstream value of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NonTeam => "non_team",
            Self::Member => "member",
            Self::Admin => "admin",
            Self::TeamGuest => "team_guest",
        }
    }

    /// Returns all team roles in entitlement order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[TeamRole] = &[
            TeamRole::NonTeam,
            TeamRole::Member,
            TeamRole::Admin,
            TeamRole::TeamGuest,
        ];

        ALL
    }
}

impl Display for TeamRole {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for TeamRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "non_team" => Ok(Self::NonTeam),
            "member" => Ok(Self::Member),
            "admin" => Ok(Self::Admin),
            "team_guest" => Ok(Self::TeamGuest),
            _ => Err(AppError::InvalidRole(value.to_owned())),
        }
    }
}

/// License tier definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseDefinition {
    /// Stable slug, equal to the upstream license value.
    pub slug: String,
    /// Human readable name.
    pub display_name: String,
}

/// Organization role definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    /// Stable slug, equal to the upstream member role value.
    pub slug: String,
    /// Human readable name.
    pub display_name: String,
    /// Key sent to the SCIM role patch endpoint.
    pub role_key: String,
}

/// Ordered, immutable license lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseCatalog {
    definitions: Vec<LicenseDefinition>,
}

impl LicenseCatalog {
    /// Builds a catalog, rejecting empty or duplicate slugs.
    pub fn new(definitions: Vec<LicenseDefinition>) -> AppResult<Self> {
        ensure_unique_slugs("license", definitions.iter().map(|item| item.slug.as_str()))?;
        Ok(Self { definitions })
    }

    /// Returns the catalog of licenses offered by the platform.
    #[must_use]
    pub fn standard() -> Self {
        let definitions = [
            ("full", "Full License"),
            ("occasional", "Occasional License"),
            ("free", "Free License"),
            ("free_restricted", "Free Restricted License"),
            ("full_trial", "Full Trial License"),
        ]
        .into_iter()
        .map(|(slug, display_name)| LicenseDefinition {
            slug: slug.to_owned(),
            display_name: display_name.to_owned(),
        })
        .collect();

        Self { definitions }
    }

    /// Iterates definitions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &LicenseDefinition> {
        self.definitions.iter()
    }

    /// Looks up a license by slug.
    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&LicenseDefinition> {
        self.definitions.iter().find(|item| item.slug == slug)
    }

    /// Looks up a license by slug, failing on unknown values.
    pub fn require(&self, slug: &str) -> AppResult<&LicenseDefinition> {
        self.get(slug)
            .ok_or_else(|| AppError::UnknownLicense(slug.to_owned()))
    }

    /// Returns the number of licenses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true when the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Ordered, immutable organization role lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleCatalog {
    definitions: Vec<RoleDefinition>,
    default_role_key: String,
}

impl RoleCatalog {
    /// Builds a catalog, rejecting duplicate slugs and an unknown default key.
    pub fn new(definitions: Vec<RoleDefinition>, default_role_key: &str) -> AppResult<Self> {
        ensure_unique_slugs("role", definitions.iter().map(|item| item.slug.as_str()))?;

        if !definitions
            .iter()
            .any(|item| item.role_key.eq_ignore_ascii_case(default_role_key))
        {
            return Err(AppError::Validation(format!(
                "default role key '{default_role_key}' is not part of the role catalog"
            )));
        }

        Ok(Self {
            definitions,
            default_role_key: default_role_key.to_owned(),
        })
    }

    /// Returns the catalog of organization roles offered by the platform.
    #[must_use]
    pub fn standard() -> Self {
        let definitions = [
            (
                "organization_internal_admin",
                "Organization Admin",
                "ORGANIZATION_INTERNAL_ADMIN",
            ),
            (
                "organization_internal_user",
                "Organization Internal User",
                "ORGANIZATION_INTERNAL_USER",
            ),
            (
                "organization_external_user",
                "Organization External User",
                "ORGANIZATION_EXTERNAL_USER",
            ),
            (
                "organization_team_guest_user",
                "Team Guest User",
                "ORGANIZATION_TEAM_GUEST_USER",
            ),
        ]
        .into_iter()
        .map(|(slug, display_name, role_key)| RoleDefinition {
            slug: slug.to_owned(),
            display_name: display_name.to_owned(),
            role_key: role_key.to_owned(),
        })
        .collect();

        Self {
            definitions,
            default_role_key: DEFAULT_ROLE_KEY.to_owned(),
        }
    }

    /// Iterates definitions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &RoleDefinition> {
        self.definitions.iter()
    }

    /// Looks up a role by slug.
    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&RoleDefinition> {
        self.definitions.iter().find(|item| item.slug == slug)
    }

    /// Looks up a role by slug, failing on unknown values.
    pub fn require(&self, slug: &str) -> AppResult<&RoleDefinition> {
        self.get(slug)
            .ok_or_else(|| AppError::UnknownRole(slug.to_owned()))
    }

    /// Returns the role key members are reset to on revoke.
    #[must_use]
    pub fn default_role_key(&self) -> &str {
        self.default_role_key.as_str()
    }

    /// Returns true when `role_key` is the default role.
    #[must_use]
    pub fn is_default_role_key(&self, role_key: &str) -> bool {
        role_key.eq_ignore_ascii_case(self.default_role_key.as_str())
    }

    /// Returns the number of roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true when the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn ensure_unique_slugs<'a>(kind: &str, slugs: impl Iterator<Item = &'a str>) -> AppResult<()> {
    let mut seen = HashSet::new();
    for slug in slugs {
        if slug.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "{kind} catalog entries must have a slug"
            )));
        }

        if !seen.insert(slug) {
            return Err(AppError::Validation(format!(
                "duplicate {kind} slug '{slug}'"
            )));
        }
    }

    Ok(())
}
