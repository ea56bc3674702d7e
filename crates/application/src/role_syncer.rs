use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use miro_connector_core::{AppError, AppResult};
use miro_connector_domain::{
    Entitlement, Grant, GrantOutcome, ProvisioningStatus, ROLE_ASSIGNED_SLUG, Resource, ResourceId,
    ResourceTypeId, RoleCatalog,
};

use crate::resource_mapping::role_resource;
use crate::syncer_ports::{GrantProvisioner, ResourceSyncer, SyncPage};
use crate::upstream_ports::UpstreamGateway;

/// Syncs organization roles from the catalog and provisions them over SCIM.
///
/// Role grants are reported by the user syncer; this syncer only lists the
/// catalog and mutates role assignments.
#[derive(Clone)]
pub struct RoleSyncer {
    gateway: Arc<dyn UpstreamGateway>,
    roles: Arc<RoleCatalog>,
}

impl RoleSyncer {
    /// Creates a role syncer over `roles`.
    #[must_use]
    pub fn new(gateway: Arc<dyn UpstreamGateway>, roles: Arc<RoleCatalog>) -> Self {
        Self { gateway, roles }
    }

    fn role_key(&self, role_slug: &str) -> AppResult<&str> {
        self.roles
            .require(role_slug)
            .map(|role| role.role_key.as_str())
    }
}

fn ensure_user_principal(principal: &ResourceId) -> AppResult<()> {
    if principal.resource_type == ResourceTypeId::User {
        return Ok(());
    }

    Err(AppError::InvalidPrincipalType(format!(
        "only users can hold organization roles, got '{}'",
        principal.resource_type
    )))
}

#[async_trait]
impl ResourceSyncer for RoleSyncer {
    fn resource_type(&self) -> ResourceTypeId {
        ResourceTypeId::Role
    }

    async fn list(
        &self,
        _parent: Option<&ResourceId>,
        _page_token: &str,
    ) -> AppResult<SyncPage<Resource>> {
        let items = self
            .roles
            .iter()
            .map(role_resource)
            .collect::<AppResult<Vec<_>>>()
            .map_err(|error| error.context("failed to create role resource"))?;

        Ok(SyncPage::last(items))
    }

    async fn entitlements(
        &self,
        resource: &Resource,
        _page_token: &str,
    ) -> AppResult<SyncPage<Entitlement>> {
        let name = resource.display_name.as_str();
        Ok(SyncPage::last(vec![Entitlement::assignment(
            resource,
            ROLE_ASSIGNED_SLUG,
            format!("{name} organization role {ROLE_ASSIGNED_SLUG}"),
            format!("Has {name} organization role"),
        )]))
    }

    async fn grants(&self, _resource: &Resource, _page_token: &str) -> AppResult<SyncPage<Grant>> {
        Ok(SyncPage::last(Vec::new()))
    }
}

#[async_trait]
impl GrantProvisioner for RoleSyncer {
    async fn grant(
        &self,
        principal: &Resource,
        entitlement: &Entitlement,
    ) -> AppResult<GrantOutcome> {
        ensure_user_principal(&principal.id)?;

        let user_id = principal.id.resource.as_str();
        let role_key = self.role_key(entitlement.resource.resource.as_str())?;

        let user = self
            .gateway
            .get_scim_user(user_id)
            .await
            .map_err(|error| error.context(&format!("failed to get user {user_id}")))?;

        if user.roles.iter().any(|role| role.value == role_key) {
            return Ok(GrantOutcome::already_exists());
        }

        self.gateway
            .update_scim_user_role(user_id, role_key)
            .await
            .map_err(|error| {
                error.context(&format!("failed to update user role for user {user_id}"))
            })?;

        info!(user_id, role_key, "assigned organization role");

        Ok(GrantOutcome::applied(vec![Grant::new(
            &entitlement.resource,
            ROLE_ASSIGNED_SLUG,
            &principal.id,
        )]))
    }

    /// Resets the user to the default role when they hold the revoked one.
    async fn revoke(&self, grant: &Grant) -> AppResult<ProvisioningStatus> {
        ensure_user_principal(&grant.principal)?;

        let user_id = grant.principal.resource.as_str();
        let role_key = self.role_key(grant.entitlement.resource.resource.as_str())?;

        let user = self
            .gateway
            .get_scim_user(user_id)
            .await
            .map_err(|error| error.context(&format!("failed to get user {user_id}")))?;

        if !user.has_role(role_key) || self.roles.is_default_role_key(role_key) {
            return Ok(ProvisioningStatus::GrantAlreadyRevoked);
        }

        let default_role_key = self.roles.default_role_key();
        self.gateway
            .update_scim_user_role(user_id, default_role_key)
            .await
            .map_err(|error| {
                error.context(&format!("failed to set default role for user {user_id}"))
            })?;

        info!(user_id, role_key, default_role_key, "reset organization role");

        Ok(ProvisioningStatus::Applied)
    }
}
