use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::info;

use miro_connector_core::AppResult;
use miro_connector_domain::{
    AccountProfile, AccountProvisioningCapability, Entitlement, Grant, ROLE_ASSIGNED_SLUG,
    LicenseCatalog, Resource, ResourceId, ResourceTypeId, RoleCatalog,
};

use crate::pagination::{RESOURCE_PAGE_SIZE, parse_page_token};
use crate::resource_mapping::user_resource;
use crate::syncer_ports::{AccountProvisioner, ResourceSyncer, SyncPage};
use crate::upstream_ports::{CreateScimUserInput, UpstreamGateway};

/// Syncs organization members and creates accounts.
#[derive(Clone)]
pub struct UserSyncer {
    gateway: Arc<dyn UpstreamGateway>,
    organization_id: String,
    licenses: Arc<LicenseCatalog>,
    roles: Arc<RoleCatalog>,
}

impl UserSyncer {
    /// Creates a user syncer scoped to one organization.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn UpstreamGateway>,
        organization_id: impl Into<String>,
        licenses: Arc<LicenseCatalog>,
        roles: Arc<RoleCatalog>,
    ) -> Self {
        Self {
            gateway,
            organization_id: organization_id.into(),
            licenses,
            roles,
        }
    }
}

#[async_trait]
impl ResourceSyncer for UserSyncer {
    fn resource_type(&self) -> ResourceTypeId {
        ResourceTypeId::User
    }

    async fn list(
        &self,
        _parent: Option<&ResourceId>,
        page_token: &str,
    ) -> AppResult<SyncPage<Resource>> {
        let (mut bag, cursor) = parse_page_token(page_token, ResourceTypeId::User, "")?;

        let page = self
            .gateway
            .list_organization_members(
                self.organization_id.as_str(),
                cursor.as_deref(),
                RESOURCE_PAGE_SIZE,
            )
            .await
            .map_err(|error| error.context("failed to get users"))?;

        let items = page
            .data
            .iter()
            .map(user_resource)
            .collect::<AppResult<Vec<_>>>()
            .map_err(|error| error.context("failed to create user resource"))?;

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
        _resource: &Resource,
        _page_token: &str,
    ) -> AppResult<SyncPage<Entitlement>> {
        Ok(SyncPage::last(Vec::new()))
    }

    /// Emits the license grant and, when the member has one, the role grant.
    ///
    /// License and role resources never list grants themselves, so this is
    /// the single place those assignments are reported.
    async fn grants(&self, resource: &Resource, _page_token: &str) -> AppResult<SyncPage<Grant>> {
        let member = self
            .gateway
            .get_organization_member(self.organization_id.as_str(), resource.id.resource.as_str())
            .await
            .map_err(|error| error.context("failed to get user"))?;

        let license = self.licenses.require(member.license.as_str())?;
        let mut grants = vec![Grant::new(
            &ResourceId::new(ResourceTypeId::License, license.slug.as_str()),
            license.slug.as_str(),
            &resource.id,
        )];

        if !member.role.is_empty() {
            let role = self.roles.require(member.role.as_str())?;
            grants.push(Grant::new(
                &ResourceId::new(ResourceTypeId::Role, role.slug.as_str()),
                ROLE_ASSIGNED_SLUG,
                &resource.id,
            ));
        }

        Ok(SyncPage::last(grants))
    }
}

#[async_trait]
impl AccountProvisioner for UserSyncer {
    fn account_capability(&self) -> AccountProvisioningCapability {
        AccountProvisioningCapability::no_password()
    }

    async fn create_account(&self, profile: &Map<String, Value>) -> AppResult<Resource> {
        let profile = AccountProfile::from_map(profile)?;

        let member = self
            .gateway
            .create_scim_user(CreateScimUserInput {
                email: profile.email,
                first_name: profile.first_name,
                last_name: profile.last_name,
            })
            .await
            .map_err(|error| error.context("failed to create miro user"))?;

        info!(user_id = %member.id, "created miro account");

        user_resource(&member)
            .map_err(|error| error.context("failed to create user resource from miro user"))
    }
}
