//! Governance graph entities, static catalogs and invariants.

#![forbid(unsafe_code)]

mod account;
mod catalog;
mod entitlement;
mod resource;

pub use account::{
    AccountCreationField, AccountProfile, AccountProvisioningCapability, ConnectorMetadata,
    CredentialOption,
};
pub use catalog::{
    DEFAULT_ROLE_KEY, LicenseCatalog, LicenseDefinition, ROLE_ASSIGNED_SLUG, RoleCatalog,
    RoleDefinition, TeamRole,
};
pub use entitlement::{
    Entitlement, EntitlementId, EntitlementPurpose, Grant, GrantOutcome, ProvisioningStatus,
};
pub use resource::{
    GroupTrait, Profile, Resource, ResourceId, ResourceTrait, ResourceTypeId, RoleTrait,
    TraitKind, UserStatus, UserTrait,
};
