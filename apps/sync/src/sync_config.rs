use std::env;
use std::time::Duration;

use miro_connector_core::{AppError, AppResult, BearerToken};
use miro_connector_infrastructure::{DEFAULT_API_BASE_URL, DEFAULT_SCIM_BASE_URL};

const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Process configuration read from the environment.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub access_token: BearerToken,
    pub scim_access_token: Option<BearerToken>,
    pub api_base_url: String,
    pub scim_base_url: String,
    pub http_timeout: Duration,
}

impl SyncConfig {
    pub fn from_env() -> AppResult<Self> {
        Self::from_source(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable lookup.
    pub fn from_source<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let access_token = optional("MIRO_ACCESS_TOKEN")
            .ok_or_else(|| AppError::Validation("MIRO_ACCESS_TOKEN is required".to_owned()))
            .and_then(BearerToken::new)?;
        let scim_access_token = optional("MIRO_SCIM_ACCESS_TOKEN")
            .map(BearerToken::new)
            .transpose()?;

        let api_base_url = optional("MIRO_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let scim_base_url = optional("MIRO_SCIM_BASE_URL")
            .unwrap_or_else(|| DEFAULT_SCIM_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();

        let http_timeout_seconds = match optional("MIRO_HTTP_TIMEOUT_SECONDS") {
            Some(value) => value.parse::<u64>().map_err(|error| {
                AppError::Validation(format!(
                    "invalid MIRO_HTTP_TIMEOUT_SECONDS value '{value}': {error}"
                ))
            })?,
            None => DEFAULT_HTTP_TIMEOUT_SECONDS,
        };

        if http_timeout_seconds == 0 {
            return Err(AppError::Validation(
                "MIRO_HTTP_TIMEOUT_SECONDS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            access_token,
            scim_access_token,
            api_base_url,
            scim_base_url,
            http_timeout: Duration::from_secs(http_timeout_seconds),
        })
    }
}

/// What the binary does after connecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncCommand {
    Sync,
    Validate,
    Metadata,
}

impl SyncCommand {
    /// Parses the first CLI argument; no argument means `sync`.
    pub fn from_args(mut args: impl Iterator<Item = String>) -> AppResult<Self> {
        match args.next().as_deref() {
            None | Some("sync") => Ok(Self::Sync),
            Some("validate") => Ok(Self::Validate),
            Some("metadata") => Ok(Self::Metadata),
            Some(other) => Err(AppError::Validation(format!(
                "unknown command '{other}', expected sync, validate or metadata"
            ))),
        }
    }
}
