use std::sync::Arc;

use async_trait::async_trait;

use miro_connector_core::AppResult;
use miro_connector_domain::{
    Entitlement, Grant, LicenseCatalog, Resource, ResourceId, ResourceTypeId,
};

use crate::resource_mapping::license_resource;
use crate::syncer_ports::{ResourceSyncer, SyncPage};

/// Syncs license tiers from the catalog. Licenses are read-only.
#[derive(Clone)]
pub struct LicenseSyncer {
    licenses: Arc<LicenseCatalog>,
}

impl LicenseSyncer {
    /// Creates a license syncer over `licenses`.
    #[must_use]
    pub fn new(licenses: Arc<LicenseCatalog>) -> Self {
        Self { licenses }
    }
}

#[async_trait]
impl ResourceSyncer for LicenseSyncer {
    fn resource_type(&self) -> ResourceTypeId {
        ResourceTypeId::License
    }

    async fn list(
        &self,
        _parent: Option<&ResourceId>,
        _page_token: &str,
    ) -> AppResult<SyncPage<Resource>> {
        let items = self
            .licenses
            .iter()
            .map(license_resource)
            .collect::<AppResult<Vec<_>>>()
            .map_err(|error| error.context("failed to create license resource"))?;

        Ok(SyncPage::last(items))
    }

    // The entitlement slug is the license slug so user grants line up with it.
    async fn entitlements(
        &self,
        resource: &Resource,
        _page_token: &str,
    ) -> AppResult<SyncPage<Entitlement>> {
        let name = resource.display_name.as_str();
        Ok(SyncPage::last(vec![Entitlement::assignment(
            resource,
            resource.id.resource.as_str(),
            format!("{name} assigned"),
            format!("Has {name}"),
        )]))
    }

    async fn grants(&self, _resource: &Resource, _page_token: &str) -> AppResult<SyncPage<Grant>> {
        Ok(SyncPage::last(Vec::new()))
    }
}
