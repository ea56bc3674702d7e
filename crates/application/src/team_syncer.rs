use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use miro_connector_core::{AppError, AppResult};
use miro_connector_domain::{
    Entitlement, Grant, GrantOutcome, ProvisioningStatus, Resource, ResourceId, ResourceTypeId,
    TeamRole,
};

use crate::pagination::{RESOURCE_PAGE_SIZE, parse_page_token};
use crate::resource_mapping::team_resource;
use crate::syncer_ports::{GrantProvisioner, ResourceSyncer, SyncPage};
use crate::upstream_ports::UpstreamGateway;

/// Syncs teams with their role memberships and provisions team invites.
#[derive(Clone)]
pub struct TeamSyncer {
    gateway: Arc<dyn UpstreamGateway>,
    organization_id: String,
}

impl TeamSyncer {
    /// Creates a team syncer scoped to one organization.
    #[must_use]
    pub fn new(gateway: Arc<dyn UpstreamGateway>, organization_id: impl Into<String>) -> Self {
        Self {
            gateway,
            organization_id: organization_id.into(),
        }
    }
}

fn ensure_user_principal(principal: &ResourceId) -> AppResult<()> {
    if principal.resource_type == ResourceTypeId::User {
        return Ok(());
    }

    warn!(
        principal_id = %principal.resource,
        principal_type = %principal.resource_type,
        "only users can be invited to a team"
    );

    Err(AppError::InvalidPrincipalType(format!(
        "only users can be invited to a team, got '{}'",
        principal.resource_type
    )))
}

#[async_trait]
impl ResourceSyncer for TeamSyncer {
    fn resource_type(&self) -> ResourceTypeId {
        ResourceTypeId::Team
    }

    async fn list(
        &self,
        _parent: Option<&ResourceId>,
        page_token: &str,
    ) -> AppResult<SyncPage<Resource>> {
        let (mut bag, cursor) = parse_page_token(page_token, ResourceTypeId::Team, "")?;

        let page = self
            .gateway
            .list_teams(
                self.organization_id.as_str(),
                cursor.as_deref(),
                RESOURCE_PAGE_SIZE,
            )
            .await
            .map_err(|error| error.context("failed to get teams"))?;

        let items = page
            .data
            .iter()
            .map(team_resource)
            .collect::<AppResult<Vec<_>>>()
            .map_err(|error| error.context("failed to create team resource"))?;

        let next_page_token = bag
            .next_token(page.cursor.as_str())
            .map_err(|error| error.context("failed to create next page cursor"))?;

        Ok(SyncPage {
            items,
            next_page_token,
            rate_limit: page.rate_limit,
        })
    }

    async fn entitlements(
        &self,
        resource: &Resource,
        _page_token: &str,
    ) -> AppResult<SyncPage<Entitlement>> {
        let name = resource.display_name.as_str();
        let items = TeamRole::all()
            .iter()
            .map(|role| {
                Entitlement::assignment(
                    resource,
                    role.as_str(),
                    format!("{name} team role {role}"),
                    format!("Has {name} team role"),
                )
            })
            .collect();

        Ok(SyncPage::last(items))
    }

    async fn grants(&self, resource: &Resource, page_token: &str) -> AppResult<SyncPage<Grant>> {
        let (mut bag, cursor) = parse_page_token(
            page_token,
            ResourceTypeId::Team,
            resource.id.resource.as_str(),
        )?;

        let page = self
            .gateway
            .list_team_members(
                self.organization_id.as_str(),
                resource.id.resource.as_str(),
                cursor.as_deref(),
                RESOURCE_PAGE_SIZE,
            )
            .await
            .map_err(|error| error.context("failed to get team members"))?;

        let mut items = Vec::with_capacity(page.data.len());
        for member in &page.data {
            let role = TeamRole::from_str(member.role.as_str())
                .map_err(|error| error.context("user does not have a valid team role"))?;

            items.push(Grant::new(
                &resource.id,
                role.as_str(),
                &ResourceId::new(ResourceTypeId::User, member.id.as_str()),
            ));
        }

        let next_page_token = bag
            .next_token(page.cursor.as_str())
            .map_err(|error| error.context("failed to create next page cursor"))?;

        Ok(SyncPage {
            items,
            next_page_token,
            rate_limit: page.rate_limit,
        })
    }
}

#[async_trait]
impl GrantProvisioner for TeamSyncer {
    async fn grant(
        &self,
        principal: &Resource,
        entitlement: &Entitlement,
    ) -> AppResult<GrantOutcome> {
        ensure_user_principal(&principal.id)?;

        let entitlement_id = entitlement.parse_id()?;
        let role = TeamRole::from_str(entitlement_id.slug.as_str()).inspect_err(|_| {
            warn!(role = %entitlement_id.slug, "invalid team role");
        })?;

        let member = self
            .gateway
            .get_organization_member(
                self.organization_id.as_str(),
                principal.id.resource.as_str(),
            )
            .await
            .map_err(|error| error.context("failed to get user"))?;

        let team_id = entitlement_id.resource.resource.as_str();
        self.gateway
            .invite_team_member(
                self.organization_id.as_str(),
                team_id,
                member.email.as_str(),
                role,
            )
            .await
            .map_err(|error| error.context("failed to invite user to team"))?;

        info!(team_id, user_id = %principal.id.resource, %role, "invited user to team");

        Ok(GrantOutcome::applied(vec![Grant::new(
            &entitlement_id.resource,
            role.as_str(),
            &principal.id,
        )]))
    }

    async fn revoke(&self, grant: &Grant) -> AppResult<ProvisioningStatus> {
        ensure_user_principal(&grant.principal)?;

        let team_id = grant.entitlement.resource.resource.as_str();
        let user_id = grant.principal.resource.as_str();

        match self
            .gateway
            .remove_team_member(self.organization_id.as_str(), team_id, user_id)
            .await
        {
            Ok(()) => Ok(ProvisioningStatus::Applied),
            Err(AppError::NotFound(_)) => {
                info!(team_id, user_id, "team membership already gone");
                Ok(ProvisioningStatus::GrantAlreadyRevoked)
            }
            Err(error) => Err(error.context("failed to remove user from team")),
        }
    }
}

#[cfg(test)]
mod tests;
