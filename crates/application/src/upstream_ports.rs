use async_trait::async_trait;
use chrono::{DateTime, Utc};

use miro_connector_core::AppResult;
use miro_connector_domain::TeamRole;

/// Organization the credentials belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationContext {
    /// Organization identifier scoping every REST path.
    pub organization_id: String,
    /// Organization name.
    pub organization_name: String,
}

/// Organization member as returned by the REST API.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrganizationMember {
    /// Member identifier, shared with the SCIM id space.
    pub id: String,
    /// Whether the account is active.
    pub active: bool,
    /// License slug.
    pub license: String,
    /// Organization role slug.
    pub role: String,
    /// Email address.
    pub email: String,
    /// Last activity timestamp in RFC3339, empty when never active.
    pub last_activity_at: String,
}

/// Team inside the organization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Team {
    /// Team identifier.
    pub id: String,
    /// Team name.
    pub name: String,
}

/// Membership of a user in a team.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TeamMember {
    /// Member user identifier.
    pub id: String,
    /// Raw team role value.
    pub role: String,
    /// Team identifier.
    pub team_id: String,
}

/// Name block of a SCIM user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScimName {
    /// Given name.
    pub given_name: String,
    /// Family name.
    pub family_name: String,
}

/// Multi-valued SCIM attribute entry (emails, roles).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScimValue {
    /// Attribute value.
    pub value: String,
    /// Display text.
    pub display: String,
    /// Whether this is the primary entry.
    pub primary: bool,
}

/// SCIM user used for fetch-before-mutate provisioning.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScimUser {
    /// User identifier.
    pub id: String,
    /// Login name.
    pub user_name: String,
    /// Name block.
    pub name: ScimName,
    /// Display name.
    pub display_name: String,
    /// Whether the account is active.
    pub active: bool,
    /// Email addresses.
    pub emails: Vec<ScimValue>,
    /// Organization role keys.
    pub roles: Vec<ScimValue>,
}

impl ScimUser {
    /// Returns true when the user holds `role_key`, ignoring case.
    #[must_use]
    pub fn has_role(&self, role_key: &str) -> bool {
        self.roles
            .iter()
            .any(|role| role.value.eq_ignore_ascii_case(role_key))
    }
}

/// Input for creating an account through SCIM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateScimUserInput {
    /// Email, sent as the SCIM user name.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

/// Rate-limit state reported by the platform on a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    /// Credits available in the window.
    pub limit: u64,
    /// Credits left in the window.
    pub remaining: u64,
    /// When the window resets.
    pub reset_at: Option<DateTime<Utc>>,
}

/// One page of an upstream listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamPage<T> {
    /// Items on this page.
    pub data: Vec<T>,
    /// Cursor for the next page, empty when exhausted.
    pub cursor: String,
    /// Rate-limit headers of the response, when present.
    pub rate_limit: Option<RateLimitStatus>,
}

/// Port to the collaboration platform REST and SCIM APIs.
///
/// Implementations own transport, authentication and rate-limit handling;
/// callers never retry.
#[async_trait]
pub trait UpstreamGateway: Send + Sync {
    /// Resolves the organization the access token belongs to.
    async fn organization_context(&self) -> AppResult<OrganizationContext>;

    /// Lists organization members.
    async fn list_organization_members(
        &self,
        organization_id: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> AppResult<UpstreamPage<OrganizationMember>>;

    /// Fetches a single organization member.
    async fn get_organization_member(
        &self,
        organization_id: &str,
        user_id: &str,
    ) -> AppResult<OrganizationMember>;

    /// Lists teams of the organization.
    async fn list_teams(
        &self,
        organization_id: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> AppResult<UpstreamPage<Team>>;

    /// Lists members of a team.
    async fn list_team_members(
        &self,
        organization_id: &str,
        team_id: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> AppResult<UpstreamPage<TeamMember>>;

    /// Invites an email address to a team with a role.
    async fn invite_team_member(
        &self,
        organization_id: &str,
        team_id: &str,
        email: &str,
        role: TeamRole,
    ) -> AppResult<TeamMember>;

    /// Removes a user from a team.
    async fn remove_team_member(
        &self,
        organization_id: &str,
        team_id: &str,
        user_id: &str,
    ) -> AppResult<()>;

    /// Creates an account through SCIM.
    async fn create_scim_user(&self, input: CreateScimUserInput) -> AppResult<OrganizationMember>;

    /// Fetches a SCIM user.
    async fn get_scim_user(&self, user_id: &str) -> AppResult<ScimUser>;

    /// Replaces a SCIM user.
    async fn replace_scim_user(&self, user_id: &str, user: &ScimUser) -> AppResult<ScimUser>;

    /// Replaces the organization role of a SCIM user.
    async fn update_scim_user_role(&self, user_id: &str, role_key: &str) -> AppResult<ScimUser>;
}
