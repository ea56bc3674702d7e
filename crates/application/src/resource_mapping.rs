//! Pure conversions from upstream entities to governance resources.

use chrono::{DateTime, Utc};
use serde_json::Value;

use miro_connector_core::{AppError, AppResult};
use miro_connector_domain::{
    GroupTrait, LicenseDefinition, Profile, Resource, ResourceId, ResourceTrait, ResourceTypeId,
    RoleDefinition, RoleTrait, UserStatus, UserTrait,
};

use crate::upstream_ports::{OrganizationMember, Team};

/// Maps an organization member to a user resource keyed by member id.
pub fn user_resource(member: &OrganizationMember) -> AppResult<Resource> {
    let last_login = parse_timestamp(member.last_activity_at.as_str()).map_err(|error| {
        AppError::InvalidTimestamp(format!(
            "failed to parse last login time '{}': {error}",
            member.last_activity_at
        ))
    })?;

    let profile = Profile::from([
        ("email".to_owned(), Value::from(member.email.as_str())),
        ("login".to_owned(), Value::from(member.email.as_str())),
    ]);

    let status = if member.active {
        UserStatus::Enabled
    } else {
        UserStatus::Disabled
    };

    Resource::new(
        ResourceId::new(ResourceTypeId::User, member.id.as_str()),
        member.email.as_str(),
        ResourceTrait::User(UserTrait {
            profile,
            login: member.email.clone(),
            status,
            last_login,
        }),
    )
}

/// Maps a team to a group-shaped resource.
pub fn team_resource(team: &Team) -> AppResult<Resource> {
    let profile = Profile::from([
        ("name".to_owned(), Value::from(team.name.as_str())),
        ("id".to_owned(), Value::from(team.id.as_str())),
    ]);

    Resource::new(
        ResourceId::new(ResourceTypeId::Team, team.id.as_str()),
        team.name.as_str(),
        ResourceTrait::Group(GroupTrait { profile }),
    )
}

/// Maps a role catalog entry to a role-shaped resource.
pub fn role_resource(role: &RoleDefinition) -> AppResult<Resource> {
    let profile = Profile::from([
        ("role_id".to_owned(), Value::from(role.slug.as_str())),
        ("role_name".to_owned(), Value::from(role.display_name.as_str())),
    ]);

    Resource::new(
        ResourceId::new(ResourceTypeId::Role, role.slug.as_str()),
        role.display_name.as_str(),
        ResourceTrait::Role(RoleTrait { profile }),
    )
}

/// Maps a license catalog entry to an untyped resource.
pub fn license_resource(license: &LicenseDefinition) -> AppResult<Resource> {
    Resource::new(
        ResourceId::new(ResourceTypeId::License, license.slug.as_str()),
        license.display_name.as_str(),
        ResourceTrait::Untyped,
    )
}

fn parse_timestamp(value: &str) -> Result<Option<DateTime<Utc>>, chrono::ParseError> {
    if value.is_empty() {
        return Ok(None);
    }

    DateTime::parse_from_rfc3339(value).map(|parsed| Some(parsed.with_timezone(&Utc)))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use miro_connector_core::AppError;
    use miro_connector_domain::{
        LicenseCatalog, ResourceTrait, ResourceTypeId, RoleCatalog, UserStatus,
    };
    use serde_json::Value;

    use super::{license_resource, role_resource, team_resource, user_resource};
    use crate::upstream_ports::{OrganizationMember, Team};

    fn member(active: bool, last_activity_at: &str) -> OrganizationMember {
        OrganizationMember {
            id: "user-123".to_owned(),
            active,
            license: "full".to_owned(),
            role: "organization_internal_user".to_owned(),
            email: "ada@example.com".to_owned(),
            last_activity_at: last_activity_at.to_owned(),
        }
    }

    #[test]
    fn user_status_follows_active_flag() {
        for (active, expected) in [(true, UserStatus::Enabled), (false, UserStatus::Disabled)] {
            let resource = user_resource(&member(active, ""))
                .unwrap_or_else(|error| panic!("unexpected error: {error}"));
            assert_eq!(resource.user_trait().map(|item| item.status), Some(expected));
        }
    }

    #[test]
    fn user_is_keyed_by_id_and_named_by_email() {
        let resource = user_resource(&member(true, "2024-05-01T10:15:00Z"))
            .unwrap_or_else(|error| panic!("unexpected error: {error}"));

        assert_eq!(resource.id.resource_type, ResourceTypeId::User);
        assert_eq!(resource.id.resource, "user-123");
        assert_eq!(resource.display_name, "ada@example.com");

        let user_trait = resource
            .user_trait()
            .unwrap_or_else(|| panic!("user trait missing"));
        assert_eq!(user_trait.login, "ada@example.com");
        assert_eq!(
            user_trait.last_login,
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 15, 0).single()
        );
    }

    #[test]
    fn empty_last_activity_maps_to_absent() {
        let resource = user_resource(&member(true, ""))
            .unwrap_or_else(|error| panic!("unexpected error: {error}"));
        assert_eq!(resource.user_trait().and_then(|item| item.last_login), None);
    }

    #[test]
    fn malformed_last_activity_is_a_hard_error() {
        let result = user_resource(&member(true, "yesterday"));
        assert!(matches!(result, Err(AppError::InvalidTimestamp(_))));
    }

    #[test]
    fn user_mapping_is_deterministic() {
        let input = member(true, "2024-05-01T10:15:00+02:00");
        let first = user_resource(&input).ok().map(|item| serde_json::to_string(&item).ok());
        let second = user_resource(&input).ok().map(|item| serde_json::to_string(&item).ok());

        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn team_profile_carries_name_and_id() {
        let resource = team_resource(&Team {
            id: "team-123".to_owned(),
            name: "Engineering Team".to_owned(),
        })
        .unwrap_or_else(|error| panic!("unexpected error: {error}"));

        assert_eq!(resource.display_name, "Engineering Team");
        assert_eq!(resource.id.resource_type, ResourceTypeId::Team);
        match resource.traits {
            ResourceTrait::Group(group) => {
                assert_eq!(group.profile.get("id"), Some(&Value::from("team-123")));
                assert_eq!(group.profile.get("name"), Some(&Value::from("Engineering Team")));
            }
            other => panic!("expected group trait, got {other:?}"),
        }
    }

    #[test]
    fn catalog_entries_map_to_typed_resources() {
        let roles = RoleCatalog::standard();
        let licenses = LicenseCatalog::standard();

        for role in roles.iter() {
            let resource = role_resource(role).unwrap_or_else(|error| panic!("{error}"));
            assert!(matches!(resource.traits, ResourceTrait::Role(_)));
            assert_eq!(resource.display_name, role.display_name);
        }

        for license in licenses.iter() {
            let resource = license_resource(license).unwrap_or_else(|error| panic!("{error}"));
            assert_eq!(resource.traits, ResourceTrait::Untyped);
            assert_eq!(resource.id.resource, license.slug);
        }
    }
}
