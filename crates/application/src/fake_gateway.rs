use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use miro_connector_core::{AppError, AppResult};
use miro_connector_domain::TeamRole;

use crate::upstream_ports::{
    CreateScimUserInput, OrganizationContext, OrganizationMember, ScimName, ScimUser, ScimValue,
    Team, TeamMember, UpstreamGateway, UpstreamPage,
};

pub(crate) const ORGANIZATION_ID: &str = "org-1";

/// In-memory platform that paginates with index cursors and records calls.
#[derive(Default)]
pub(crate) struct FakeGateway {
    pub(crate) members: Vec<OrganizationMember>,
    pub(crate) teams: Vec<Team>,
    pub(crate) team_members: HashMap<String, Vec<TeamMember>>,
    pub(crate) scim_users: Mutex<HashMap<String, ScimUser>>,
    pub(crate) remove_returns_not_found: bool,
    pub(crate) calls: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub(crate) fn member(id: &str, license: &str, role: &str) -> OrganizationMember {
        OrganizationMember {
            id: id.to_owned(),
            active: true,
            license: license.to_owned(),
            role: role.to_owned(),
            email: format!("{id}@example.com"),
            last_activity_at: String::new(),
        }
    }

    pub(crate) fn team_member(id: &str, role: &str, team_id: &str) -> TeamMember {
        TeamMember {
            id: id.to_owned(),
            role: role.to_owned(),
            team_id: team_id.to_owned(),
        }
    }

    pub(crate) fn scim_user(id: &str, role_keys: &[&str]) -> ScimUser {
        ScimUser {
            id: id.to_owned(),
            user_name: format!("{id}@example.com"),
            active: true,
            roles: role_keys
                .iter()
                .map(|key| ScimValue {
                    value: (*key).to_owned(),
                    ..ScimValue::default()
                })
                .collect(),
            ..ScimUser::default()
        }
    }

    pub(crate) async fn with_scim_user(self, user: ScimUser) -> Self {
        self.scim_users.lock().await.insert(user.id.clone(), user);
        self
    }

    pub(crate) async fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    pub(crate) async fn mutating_calls(&self) -> Vec<String> {
        self.recorded_calls()
            .await
            .into_iter()
            .filter(|call| {
                ["invite", "remove", "create", "patch", "replace"]
                    .iter()
                    .any(|prefix| call.starts_with(prefix))
            })
            .collect()
    }

    async fn record(&self, call: String) {
        self.calls.lock().await.push(call);
    }
}

fn paginate<T: Clone>(items: &[T], cursor: Option<&str>, limit: u32) -> AppResult<UpstreamPage<T>> {
    let start = match cursor {
        Some(value) => value
            .parse::<usize>()
            .map_err(|_| AppError::Upstream(format!("unknown cursor '{value}'")))?,
        None => 0,
    };
    let end = start.saturating_add(limit as usize).min(items.len());
    let data = items.get(start..end).map(<[T]>::to_vec).unwrap_or_default();
    let cursor = if end < items.len() {
        end.to_string()
    } else {
        String::new()
    };

    Ok(UpstreamPage {
        data,
        cursor,
        rate_limit: None,
    })
}

#[async_trait]
impl UpstreamGateway for FakeGateway {
    async fn organization_context(&self) -> AppResult<OrganizationContext> {
        self.record("context".to_owned()).await;
        Ok(OrganizationContext {
            organization_id: ORGANIZATION_ID.to_owned(),
            organization_name: "Example".to_owned(),
        })
    }

    async fn list_organization_members(
        &self,
        _organization_id: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> AppResult<UpstreamPage<OrganizationMember>> {
        self.record(format!("list_members {}", cursor.unwrap_or("-"))).await;
        paginate(&self.members, cursor, limit)
    }

    async fn get_organization_member(
        &self,
        _organization_id: &str,
        user_id: &str,
    ) -> AppResult<OrganizationMember> {
        self.record(format!("get_member {user_id}")).await;
        self.members
            .iter()
            .find(|member| member.id == user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("member {user_id}")))
    }

    async fn list_teams(
        &self,
        _organization_id: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> AppResult<UpstreamPage<Team>> {
        self.record(format!("list_teams {}", cursor.unwrap_or("-"))).await;
        paginate(&self.teams, cursor, limit)
    }

    async fn list_team_members(
        &self,
        _organization_id: &str,
        team_id: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> AppResult<UpstreamPage<TeamMember>> {
        self.record(format!("list_team_members {team_id} {}", cursor.unwrap_or("-")))
            .await;
        let members = self.team_members.get(team_id).cloned().unwrap_or_default();
        paginate(&members, cursor, limit)
    }

    async fn invite_team_member(
        &self,
        _organization_id: &str,
        team_id: &str,
        email: &str,
        role: TeamRole,
    ) -> AppResult<TeamMember> {
        self.record(format!("invite {team_id} {email} {role}")).await;
        Ok(TeamMember {
            id: email.to_owned(),
            role: role.as_str().to_owned(),
            team_id: team_id.to_owned(),
        })
    }

    async fn remove_team_member(
        &self,
        _organization_id: &str,
        team_id: &str,
        user_id: &str,
    ) -> AppResult<()> {
        self.record(format!("remove {team_id} {user_id}")).await;
        if self.remove_returns_not_found {
            return Err(AppError::NotFound(format!("team member {user_id}")));
        }

        Ok(())
    }

    async fn create_scim_user(&self, input: CreateScimUserInput) -> AppResult<OrganizationMember> {
        self.record(format!("create {}", input.email)).await;
        let user = ScimUser {
            id: "created-1".to_owned(),
            user_name: input.email.clone(),
            name: ScimName {
                given_name: input.first_name,
                family_name: input.last_name,
            },
            active: true,
            ..ScimUser::default()
        };
        self.scim_users
            .lock()
            .await
            .insert(user.id.clone(), user.clone());

        Ok(OrganizationMember {
            id: user.id,
            active: true,
            email: input.email,
            ..OrganizationMember::default()
        })
    }

    async fn get_scim_user(&self, user_id: &str) -> AppResult<ScimUser> {
        self.record(format!("get_scim_user {user_id}")).await;
        self.scim_users
            .lock()
            .await
            .get(user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("scim user {user_id}")))
    }

    async fn replace_scim_user(&self, user_id: &str, user: &ScimUser) -> AppResult<ScimUser> {
        self.record(format!("replace {user_id}")).await;
        self.scim_users
            .lock()
            .await
            .insert(user_id.to_owned(), user.clone());
        Ok(user.clone())
    }

    async fn update_scim_user_role(&self, user_id: &str, role_key: &str) -> AppResult<ScimUser> {
        self.record(format!("patch {user_id} {role_key}")).await;
        let mut users = self.scim_users.lock().await;
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(format!("scim user {user_id}")))?;
        user.roles = vec![ScimValue {
            value: role_key.to_owned(),
            ..ScimValue::default()
        }];

        Ok(user.clone())
    }
}
