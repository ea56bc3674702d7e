//! Miro connector sync runtime.
//!
//! `sync` (the default) prints a full snapshot of resources, entitlements and
//! grants as JSON. `validate` checks the credentials against the organization.
//! `metadata` prints the connector metadata and needs no credentials.

#![forbid(unsafe_code)]

mod sync_config;

use std::env;
use std::sync::Arc;

use miro_connector_application::{ConnectorService, UpstreamGateway};
use miro_connector_core::{AppError, AppResult};
use miro_connector_domain::{ConnectorMetadata, LicenseCatalog, RoleCatalog};
use miro_connector_infrastructure::HttpMiroGateway;
use serde_json::to_string_pretty;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::sync_config::{SyncCommand, SyncConfig};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let command = SyncCommand::from_args(env::args().skip(1))?;
    if command == SyncCommand::Metadata {
        return print_json(&ConnectorMetadata::miro());
    }

    let config = SyncConfig::from_env()?;
    let run_id = Uuid::new_v4();
    info!(%run_id, ?command, api_base_url = %config.api_base_url, "starting miro connector");

    let connector = ConnectorService::connect(
        build_gateway(&config)?,
        LicenseCatalog::standard(),
        RoleCatalog::standard(),
    )
    .await?;

    match command {
        SyncCommand::Sync => {
            let snapshot = connector.full_sync().await?;
            info!(
                %run_id,
                resources = snapshot.resources.len(),
                entitlements = snapshot.entitlements.len(),
                grants = snapshot.grants.len(),
                "sync finished"
            );
            print_json(&snapshot)
        }
        SyncCommand::Validate => {
            let organization = connector.validate().await?;
            info!(
                %run_id,
                organization_id = %organization.organization_id,
                organization_name = %organization.organization_name,
                "credentials are valid"
            );
            Ok(())
        }
        SyncCommand::Metadata => Ok(()),
    }
}

fn build_gateway(config: &SyncConfig) -> AppResult<Arc<dyn UpstreamGateway>> {
    let http_client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    Ok(Arc::new(HttpMiroGateway::new(
        http_client,
        config.api_base_url.as_str(),
        config.scim_base_url.as_str(),
        config.access_token.clone(),
        config.scim_access_token.clone(),
    )))
}

fn print_json<T: serde::Serialize>(value: &T) -> AppResult<()> {
    let rendered = to_string_pretty(value)
        .map_err(|error| AppError::Internal(format!("failed to render output: {error}")))?;
    println!("{rendered}");
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the JSON output
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
