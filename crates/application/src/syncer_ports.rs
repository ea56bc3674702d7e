use async_trait::async_trait;
use serde_json::{Map, Value};

use miro_connector_core::AppResult;
use miro_connector_domain::{
    AccountProvisioningCapability, Entitlement, Grant, GrantOutcome, ProvisioningStatus, Resource,
    ResourceId, ResourceTypeId,
};

use crate::upstream_ports::RateLimitStatus;

/// One page of sync output plus the token for the next call.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncPage<T> {
    /// Items produced by the call.
    pub items: Vec<T>,
    /// Opaque continuation token, empty when the traversal is exhausted.
    pub next_page_token: String,
    /// Upstream rate-limit state observed while producing the page.
    pub rate_limit: Option<RateLimitStatus>,
}

impl<T> SyncPage<T> {
    /// A complete, single-page result.
    #[must_use]
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page_token: String::new(),
            rate_limit: None,
        }
    }
}

/// Read side of a resource type, driven by the governance framework.
#[async_trait]
pub trait ResourceSyncer: Send + Sync {
    /// Resource type handled by this syncer.
    fn resource_type(&self) -> ResourceTypeId;

    /// Lists resources of this type.
    async fn list(
        &self,
        parent: Option<&ResourceId>,
        page_token: &str,
    ) -> AppResult<SyncPage<Resource>>;

    /// Lists the entitlements offered by `resource`.
    async fn entitlements(
        &self,
        resource: &Resource,
        page_token: &str,
    ) -> AppResult<SyncPage<Entitlement>>;

    /// Lists the grants currently held on `resource`.
    async fn grants(&self, resource: &Resource, page_token: &str) -> AppResult<SyncPage<Grant>>;
}

/// Write side of grantable resource types.
#[async_trait]
pub trait GrantProvisioner: Send + Sync {
    /// Grants `entitlement` to `principal`.
    async fn grant(&self, principal: &Resource, entitlement: &Entitlement)
    -> AppResult<GrantOutcome>;

    /// Revokes an existing grant.
    async fn revoke(&self, grant: &Grant) -> AppResult<ProvisioningStatus>;
}

/// Account creation for user-shaped resource types.
#[async_trait]
pub trait AccountProvisioner: Send + Sync {
    /// Credential options supported when creating accounts.
    fn account_capability(&self) -> AccountProvisioningCapability;

    /// Creates an account from a free-form profile.
    async fn create_account(&self, profile: &Map<String, Value>) -> AppResult<Resource>;
}
