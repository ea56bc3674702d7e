//! Application services and ports of the Miro connector.

#![forbid(unsafe_code)]

mod connector_service;
mod license_syncer;
mod pagination;
mod resource_mapping;
mod role_syncer;
mod syncer_ports;
mod team_syncer;
mod upstream_ports;
mod user_syncer;

#[cfg(test)]
mod fake_gateway;

pub use connector_service::{ConnectorService, SyncSnapshot};
pub use license_syncer::LicenseSyncer;
pub use pagination::{PageBag, PageState, RESOURCE_PAGE_SIZE, parse_page_token};
pub use resource_mapping::{license_resource, role_resource, team_resource, user_resource};
pub use role_syncer::RoleSyncer;
pub use syncer_ports::{AccountProvisioner, GrantProvisioner, ResourceSyncer, SyncPage};
pub use team_syncer::TeamSyncer;
pub use upstream_ports::{
    CreateScimUserInput, OrganizationContext, OrganizationMember, RateLimitStatus, ScimName,
    ScimUser, ScimValue, Team, TeamMember, UpstreamGateway, UpstreamPage,
};
pub use user_syncer::UserSyncer;
