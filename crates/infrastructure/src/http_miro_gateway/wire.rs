//! JSON bodies exchanged with the REST and SCIM endpoints.

use serde::{Deserialize, Deserializer, Serialize};

use miro_connector_application::{
    OrganizationContext, OrganizationMember, ScimName, ScimUser, ScimValue, Team, TeamMember,
};

pub(super) const SCIM_USER_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:User";
pub(super) const SCIM_PATCH_OP_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:PatchOp";
pub(super) const SCIM_ROLE_PATH: &str = "roles.value";

/// Reads an explicit JSON `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenContextResponse {
    #[serde(default)]
    pub organization: Option<OrganizationBody>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OrganizationBody {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

impl From<OrganizationBody> for OrganizationContext {
    fn from(value: OrganizationBody) -> Self {
        Self {
            organization_id: value.id,
            organization_name: value.name,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(super) struct ListResponse<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<T>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cursor: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct MemberBody {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub license: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_activity_at: String,
}

impl From<MemberBody> for OrganizationMember {
    fn from(value: MemberBody) -> Self {
        Self {
            id: value.id,
            active: value.active,
            license: value.license,
            role: value.role,
            email: value.email,
            last_activity_at: value.last_activity_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct TeamBody {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

impl From<TeamBody> for Team {
    fn from(value: TeamBody) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct TeamMemberBody {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub team_id: String,
}

impl From<TeamMemberBody> for TeamMember {
    fn from(value: TeamMemberBody) -> Self {
        Self {
            id: value.id,
            role: value.role,
            team_id: value.team_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct InviteTeamMemberRequest<'a> {
    pub email: &'a str,
    pub role: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateScimUserRequest<'a> {
    pub schemas: [&'a str; 1],
    pub user_name: &'a str,
    pub name: ScimNameBody,
}

#[derive(Debug, Serialize)]
pub(super) struct PatchOpRequest<'a> {
    pub schemas: [&'a str; 1],
    #[serde(rename = "Operations")]
    pub operations: [PatchOperation<'a>; 1],
}

#[derive(Debug, Serialize)]
pub(super) struct PatchOperation<'a> {
    pub op: &'a str,
    pub path: &'a str,
    pub value: &'a str,
}

impl<'a> PatchOpRequest<'a> {
    pub(super) fn replace_role(role_key: &'a str) -> Self {
        Self {
            schemas: [SCIM_PATCH_OP_SCHEMA],
            operations: [PatchOperation {
                op: "Replace",
                path: SCIM_ROLE_PATH,
                value: role_key,
            }],
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ScimNameBody {
    #[serde(default, deserialize_with = "null_as_default")]
    pub given_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub family_name: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(super) struct ScimValueBody {
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub display: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub primary: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ScimUserBody {
    #[serde(default, deserialize_with = "null_as_default")]
    pub schemas: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: ScimNameBody,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub display_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub emails: Vec<ScimValueBody>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: Vec<ScimValueBody>,
}

impl ScimUserBody {
    /// Primary email, falling back to the first one and then the user name.
    pub(super) fn login_email(&self) -> &str {
        self.emails
            .iter()
            .find(|email| email.primary)
            .or_else(|| self.emails.first())
            .map(|email| email.value.as_str())
            .filter(|email| !email.is_empty())
            .unwrap_or(self.user_name.as_str())
    }
}

impl From<ScimValueBody> for ScimValue {
    fn from(value: ScimValueBody) -> Self {
        Self {
            value: value.value,
            display: value.display,
            primary: value.primary,
        }
    }
}

impl From<&ScimValue> for ScimValueBody {
    fn from(value: &ScimValue) -> Self {
        Self {
            value: value.value.clone(),
            display: value.display.clone(),
            primary: value.primary,
        }
    }
}

impl From<ScimUserBody> for ScimUser {
    fn from(value: ScimUserBody) -> Self {
        Self {
            id: value.id,
            user_name: value.user_name,
            name: ScimName {
                given_name: value.name.given_name,
                family_name: value.name.family_name,
            },
            display_name: value.display_name,
            active: value.active,
            emails: value.emails.into_iter().map(ScimValue::from).collect(),
            roles: value.roles.into_iter().map(ScimValue::from).collect(),
        }
    }
}

impl From<&ScimUser> for ScimUserBody {
    fn from(value: &ScimUser) -> Self {
        Self {
            schemas: vec![SCIM_USER_SCHEMA.to_owned()],
            id: value.id.clone(),
            user_name: value.user_name.clone(),
            name: ScimNameBody {
                given_name: value.name.given_name.clone(),
                family_name: value.name.family_name.clone(),
            },
            display_name: value.display_name.clone(),
            active: value.active,
            emails: value.emails.iter().map(ScimValueBody::from).collect(),
            roles: value.roles.iter().map(ScimValueBody::from).collect(),
        }
    }
}

/// Error body of either API: SCIM sends `detail`, REST sends `message`.
#[derive(Debug, Default, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub(super) fn into_detail(self) -> Option<String> {
        self.detail
            .or(self.message)
            .filter(|detail| !detail.trim().is_empty())
    }
}
