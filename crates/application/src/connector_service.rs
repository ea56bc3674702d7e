use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use miro_connector_core::{AppError, AppResult};
use miro_connector_domain::{
    AccountProvisioningCapability, ConnectorMetadata, Entitlement, Grant, GrantOutcome,
    LicenseCatalog, ProvisioningStatus, Resource, ResourceTypeId, RoleCatalog,
};

use crate::license_syncer::LicenseSyncer;
use crate::role_syncer::RoleSyncer;
use crate::syncer_ports::{AccountProvisioner, GrantProvisioner, ResourceSyncer, SyncPage};
use crate::team_syncer::TeamSyncer;
use crate::upstream_ports::{OrganizationContext, UpstreamGateway};
use crate::user_syncer::UserSyncer;

/// Everything one full sync pass produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncSnapshot {
    /// Resources of every type, in syncer order.
    pub resources: Vec<Resource>,
    /// Entitlements offered by those resources.
    pub entitlements: Vec<Entitlement>,
    /// Grants currently held.
    pub grants: Vec<Grant>,
}

/// Connector facade wiring the syncers for one organization.
#[derive(Clone)]
pub struct ConnectorService {
    gateway: Arc<dyn UpstreamGateway>,
    organization: OrganizationContext,
    users: Arc<UserSyncer>,
    teams: Arc<TeamSyncer>,
    roles: Arc<RoleSyncer>,
    licenses: Arc<LicenseSyncer>,
}

impl ConnectorService {
    /// Resolves the organization behind the gateway credentials and builds the facade.
    pub async fn connect(
        gateway: Arc<dyn UpstreamGateway>,
        licenses: LicenseCatalog,
        roles: RoleCatalog,
    ) -> AppResult<Self> {
        let organization = gateway
            .organization_context()
            .await
            .map_err(|error| error.context("failed to get organization context"))?;

        info!(
            organization_id = %organization.organization_id,
            organization_name = %organization.organization_name,
            "connected to miro organization"
        );

        Ok(Self::new(gateway, organization, licenses, roles))
    }

    /// Builds the facade for an already resolved organization.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn UpstreamGateway>,
        organization: OrganizationContext,
        licenses: LicenseCatalog,
        roles: RoleCatalog,
    ) -> Self {
        let licenses = Arc::new(licenses);
        let roles = Arc::new(roles);
        let organization_id = organization.organization_id.as_str();

        Self {
            users: Arc::new(UserSyncer::new(
                gateway.clone(),
                organization_id,
                licenses.clone(),
                roles.clone(),
            )),
            teams: Arc::new(TeamSyncer::new(gateway.clone(), organization_id)),
            roles: Arc::new(RoleSyncer::new(gateway.clone(), roles)),
            licenses: Arc::new(LicenseSyncer::new(licenses)),
            gateway,
            organization,
        }
    }

    /// Organization this connector is scoped to.
    #[must_use]
    pub fn organization(&self) -> &OrganizationContext {
        &self.organization
    }

    /// Syncers for every resource type.
    #[must_use]
    pub fn syncers(&self) -> Vec<Arc<dyn ResourceSyncer>> {
        vec![
            self.users.clone(),
            self.teams.clone(),
            self.roles.clone(),
            self.licenses.clone(),
        ]
    }

    /// Syncer handling `resource_type`.
    #[must_use]
    pub fn syncer(&self, resource_type: ResourceTypeId) -> Arc<dyn ResourceSyncer> {
        match resource_type {
            ResourceTypeId::User => self.users.clone(),
            ResourceTypeId::Team => self.teams.clone(),
            ResourceTypeId::Role => self.roles.clone(),
            ResourceTypeId::License => self.licenses.clone(),
        }
    }

    /// Static connector description.
    #[must_use]
    pub fn metadata(&self) -> ConnectorMetadata {
        ConnectorMetadata::miro()
    }

    /// Exercises the credentials against the platform.
    pub async fn validate(&self) -> AppResult<OrganizationContext> {
        let organization = self
            .gateway
            .organization_context()
            .await
            .map_err(|error| error.context("failed to validate credentials"))?;

        if organization.organization_id != self.organization.organization_id {
            return Err(AppError::Validation(format!(
                "credentials now resolve to organization '{}', expected '{}'",
                organization.organization_id, self.organization.organization_id
            )));
        }

        Ok(organization)
    }

    /// Grants `entitlement` to `principal` through the owning resource type.
    pub async fn grant(
        &self,
        principal: &Resource,
        entitlement: &Entitlement,
    ) -> AppResult<GrantOutcome> {
        self.provisioner(entitlement.resource.resource_type)?
            .grant(principal, entitlement)
            .await
    }

    /// Revokes `grant` through the owning resource type.
    pub async fn revoke(&self, grant: &Grant) -> AppResult<ProvisioningStatus> {
        self.provisioner(grant.entitlement.resource.resource_type)?
            .revoke(grant)
            .await
    }

    /// Creates a user account from a free-form profile.
    pub async fn create_account(&self, profile: &Map<String, Value>) -> AppResult<Resource> {
        self.users.create_account(profile).await
    }

    /// Account creation capability.
    #[must_use]
    pub fn account_capability(&self) -> AccountProvisioningCapability {
        self.users.account_capability()
    }

    /// Drains every syncer: resources, then entitlements and grants per resource.
    pub async fn full_sync(&self) -> AppResult<SyncSnapshot> {
        let mut snapshot = SyncSnapshot::default();

        for syncer in self.syncers() {
            let resource_type = syncer.resource_type();
            let resources = drain(resource_type, |token| {
                let syncer = syncer.clone();
                async move { syncer.list(None, token.as_str()).await }
            })
            .await?;

            for resource in &resources {
                let entitlements = drain(resource_type, |token| {
                    let syncer = syncer.clone();
                    async move { syncer.entitlements(resource, token.as_str()).await }
                })
                .await?;
                let grants = drain(resource_type, |token| {
                    let syncer = syncer.clone();
                    async move { syncer.grants(resource, token.as_str()).await }
                })
                .await?;

                snapshot.entitlements.extend(entitlements);
                snapshot.grants.extend(grants);
            }

            debug!(
                resource_type = %resource_type,
                resources = resources.len(),
                "synced resource type"
            );
            snapshot.resources.extend(resources);
        }

        info!(
            resources = snapshot.resources.len(),
            entitlements = snapshot.entitlements.len(),
            grants = snapshot.grants.len(),
            "full sync finished"
        );

        Ok(snapshot)
    }

    fn provisioner(&self, resource_type: ResourceTypeId) -> AppResult<&dyn GrantProvisioner> {
        match resource_type {
            ResourceTypeId::Team => Ok(self.teams.as_ref()),
            ResourceTypeId::Role => Ok(self.roles.as_ref()),
            ResourceTypeId::User | ResourceTypeId::License => Err(AppError::Validation(format!(
                "resource type '{resource_type}' does not support provisioning"
            ))),
        }
    }
}

/// Follows page tokens until a call returns the empty token.
async fn drain<T, F, Fut>(resource_type: ResourceTypeId, mut fetch: F) -> AppResult<Vec<T>>
where
    F: FnMut(String) -> Fut,
    Fut: std::future::Future<Output = AppResult<SyncPage<T>>>,
{
    let mut items = Vec::new();
    let mut token = String::new();

    loop {
        let page = fetch(token.clone()).await?;
        items.extend(page.items);

        if let Some(rate_limit) = page.rate_limit {
            debug!(
                resource_type = %resource_type,
                remaining = rate_limit.remaining,
                limit = rate_limit.limit,
                "upstream rate limit"
            );
        }

        if page.next_page_token.is_empty() {
            return Ok(items);
        }
        if page.next_page_token == token {
            return Err(AppError::Internal(format!(
                "{resource_type} traversal returned the same page token twice"
            )));
        }

        token = page.next_page_token;
    }
}
