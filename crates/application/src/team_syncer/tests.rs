use std::collections::HashMap;
use std::sync::Arc;

use miro_connector_core::AppError;
use miro_connector_domain::{
    Entitlement, Grant, ProvisioningStatus, Resource, ResourceId, ResourceTrait, ResourceTypeId,
};

use crate::fake_gateway::{FakeGateway, ORGANIZATION_ID};
use crate::pagination::parse_page_token;
use crate::resource_mapping::{team_resource, user_resource};
use crate::syncer_ports::{GrantProvisioner, ResourceSyncer};
use crate::upstream_ports::Team;

use super::TeamSyncer;

fn engineering() -> Resource {
    team_resource(&Team {
        id: "team-123".to_owned(),
        name: "Engineering Team".to_owned(),
    })
    .unwrap_or_else(|error| panic!("unexpected error: {error}"))
}

fn ada() -> Resource {
    user_resource(&FakeGateway::member("user-1", "full", ""))
        .unwrap_or_else(|error| panic!("unexpected error: {error}"))
}

fn entitlement_with_id(id: &str) -> Entitlement {
    let mut entitlement = Entitlement::assignment(&engineering(), "admin", "", "");
    entitlement.id = id.to_owned();
    entitlement
}

fn gateway_with_team_members(count: usize) -> FakeGateway {
    let members = (0..count)
        .map(|index| FakeGateway::team_member(&format!("user-{index}"), "member", "team-123"))
        .collect();

    FakeGateway {
        members: vec![FakeGateway::member("user-1", "full", "")],
        team_members: HashMap::from([("team-123".to_owned(), members)]),
        ..FakeGateway::default()
    }
}

#[tokio::test]
async fn entitlements_cover_every_team_role() {
    let syncer = TeamSyncer::new(Arc::new(FakeGateway::default()), ORGANIZATION_ID);
    let page = syncer.entitlements(&engineering(), "").await;
    assert!(page.is_ok());
    let page = page.unwrap_or_else(|_| unreachable!());

    let ids = page
        .items
        .iter()
        .map(|entitlement| entitlement.id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        ids,
        vec![
            "team:team-123:non_team",
            "team:team-123:member",
            "team:team-123:admin",
            "team:team-123:team_guest",
        ]
    );

    let admin = page.items.get(2).unwrap_or_else(|| unreachable!());
    assert_eq!(admin.display_name, "Engineering Team team role admin");
    assert_eq!(admin.description, "Has Engineering Team team role");
    assert_eq!(admin.grantable_to, vec![ResourceTypeId::User]);
}

#[tokio::test]
async fn list_maps_teams_to_group_resources() {
    let gateway = Arc::new(FakeGateway {
        teams: vec![
            Team {
                id: "team-123".to_owned(),
                name: "Engineering Team".to_owned(),
            },
            Team {
                id: "team-456".to_owned(),
                name: "Design".to_owned(),
            },
        ],
        ..FakeGateway::default()
    });
    let syncer = TeamSyncer::new(gateway, ORGANIZATION_ID);

    let page = syncer
        .list(None, "")
        .await
        .unwrap_or_else(|error| panic!("unexpected error: {error}"));

    assert_eq!(page.items.len(), 2);
    assert!(page.next_page_token.is_empty());
    assert!(
        page.items
            .iter()
            .all(|item| matches!(item.traits, ResourceTrait::Group(_)))
    );
}

#[tokio::test]
async fn grants_follow_member_pages() {
    let gateway = Arc::new(gateway_with_team_members(75));
    let syncer = TeamSyncer::new(gateway.clone(), ORGANIZATION_ID);
    let team = engineering();

    let first = syncer
        .grants(&team, "")
        .await
        .unwrap_or_else(|error| panic!("unexpected error: {error}"));
    assert_eq!(first.items.len(), 50);
    assert!(!first.next_page_token.is_empty());

    let second = syncer
        .grants(&team, first.next_page_token.as_str())
        .await
        .unwrap_or_else(|error| panic!("unexpected error: {error}"));
    assert_eq!(second.items.len(), 25);
    assert!(second.next_page_token.is_empty());

    assert_eq!(
        gateway.recorded_calls().await,
        vec!["list_team_members team-123 -", "list_team_members team-123 50"]
    );
    assert_eq!(
        first.items.first().map(|grant| grant.id.as_str()),
        Some("team:team-123:member:user:user-0")
    );
}

#[tokio::test]
async fn member_page_token_is_bound_to_its_team() {
    let gateway = Arc::new(gateway_with_team_members(75));
    let syncer = TeamSyncer::new(gateway.clone(), ORGANIZATION_ID);
    let design = team_resource(&Team {
        id: "team-456".to_owned(),
        name: "Design".to_owned(),
    })
    .unwrap_or_else(|error| panic!("unexpected error: {error}"));

    let first = syncer
        .grants(&engineering(), "")
        .await
        .unwrap_or_else(|error| panic!("unexpected error: {error}"));
    let reused = syncer
        .grants(&design, first.next_page_token.as_str())
        .await;
    assert!(matches!(
        reused,
        Err(AppError::PageTokenResourceMismatch { ref expected, ref found })
            if expected == "team-456" && found == "team-123"
    ));

    let (mut bag, _) = parse_page_token("", ResourceTypeId::Team, "")
        .unwrap_or_else(|error| panic!("unexpected error: {error}"));
    let list_token = bag
        .next_token("50")
        .unwrap_or_else(|error| panic!("unexpected error: {error}"));
    let mixed = syncer.grants(&engineering(), list_token.as_str()).await;
    assert!(matches!(
        mixed,
        Err(AppError::PageTokenResourceMismatch { .. })
    ));

    assert_eq!(
        gateway.recorded_calls().await,
        vec!["list_team_members team-123 -"]
    );
}

#[tokio::test]
async fn member_with_unknown_role_fails_the_page() {
    let gateway = Arc::new(FakeGateway {
        team_members: HashMap::from([(
            "team-123".to_owned(),
            vec![
                FakeGateway::team_member("user-1", "member", "team-123"),
                FakeGateway::team_member("user-2", "owner", "team-123"),
            ],
        )]),
        ..FakeGateway::default()
    });
    let syncer = TeamSyncer::new(gateway, ORGANIZATION_ID);

    let result = syncer.grants(&engineering(), "").await;
    assert!(matches!(result, Err(AppError::InvalidRole(role)) if role == "owner"));
}

#[tokio::test]
async fn grant_invites_member_email_with_role() {
    let gateway = Arc::new(gateway_with_team_members(0));
    let syncer = TeamSyncer::new(gateway.clone(), ORGANIZATION_ID);

    let outcome = syncer
        .grant(&ada(), &entitlement_with_id("team:team-123:admin"))
        .await
        .unwrap_or_else(|error| panic!("unexpected error: {error}"));

    assert_eq!(outcome.status, ProvisioningStatus::Applied);
    assert_eq!(
        outcome
            .grants
            .iter()
            .map(|grant| grant.id.as_str())
            .collect::<Vec<_>>(),
        vec!["team:team-123:admin:user:user-1"]
    );
    assert_eq!(
        gateway.mutating_calls().await,
        vec!["invite team-123 user-1@example.com admin"]
    );
}

#[tokio::test]
async fn grant_rejects_bad_input_without_upstream_calls() {
    let gateway = Arc::new(gateway_with_team_members(0));
    let syncer = TeamSyncer::new(gateway.clone(), ORGANIZATION_ID);

    let principal = engineering();
    let wrong_principal = syncer
        .grant(&principal, &entitlement_with_id("team:team-123:admin"))
        .await;
    assert!(matches!(
        wrong_principal,
        Err(AppError::InvalidPrincipalType(_))
    ));

    let too_short = syncer
        .grant(&ada(), &entitlement_with_id("team:team-123"))
        .await;
    assert!(matches!(too_short, Err(AppError::MalformedEntitlementId(_))));

    let bad_role = syncer
        .grant(&ada(), &entitlement_with_id("team:team-123:owner"))
        .await;
    assert!(matches!(bad_role, Err(AppError::InvalidRole(_))));

    assert!(gateway.recorded_calls().await.is_empty());
}

#[tokio::test]
async fn revoke_removes_membership() {
    let gateway = Arc::new(FakeGateway::default());
    let syncer = TeamSyncer::new(gateway.clone(), ORGANIZATION_ID);
    let grant = Grant::new(
        &ResourceId::new(ResourceTypeId::Team, "team-123"),
        "member",
        &ResourceId::new(ResourceTypeId::User, "user-1"),
    );

    let status = syncer.revoke(&grant).await;
    assert!(matches!(status, Ok(ProvisioningStatus::Applied)));
    assert_eq!(gateway.mutating_calls().await, vec!["remove team-123 user-1"]);
}

#[tokio::test]
async fn revoke_of_missing_membership_is_a_noop() {
    let gateway = Arc::new(FakeGateway {
        remove_returns_not_found: true,
        ..FakeGateway::default()
    });
    let syncer = TeamSyncer::new(gateway, ORGANIZATION_ID);
    let grant = Grant::new(
        &ResourceId::new(ResourceTypeId::Team, "team-123"),
        "member",
        &ResourceId::new(ResourceTypeId::User, "user-1"),
    );

    let status = syncer.revoke(&grant).await;
    assert!(matches!(status, Ok(ProvisioningStatus::GrantAlreadyRevoked)));
}

#[tokio::test]
async fn revoke_rejects_non_user_principal() {
    let gateway = Arc::new(FakeGateway::default());
    let syncer = TeamSyncer::new(gateway.clone(), ORGANIZATION_ID);
    let grant = Grant::new(
        &ResourceId::new(ResourceTypeId::Team, "team-123"),
        "member",
        &ResourceId::new(ResourceTypeId::Team, "team-456"),
    );

    let status = syncer.revoke(&grant).await;
    assert!(matches!(status, Err(AppError::InvalidPrincipalType(_))));
    assert!(gateway.recorded_calls().await.is_empty());
}
