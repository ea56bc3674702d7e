//! Account provisioning profile, capability and connector metadata.

use miro_connector_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Validated profile used to create a platform account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email, also used as the login.
    pub email: String,
}

impl AccountProfile {
    /// Required profile fields, in validation order.
    pub const REQUIRED_FIELDS: [&'static str; 3] = ["first_name", "last_name", "email"];

    /// Builds a profile from a free-form map.
    ///
    /// Every required field must be a non-empty string.
    pub fn from_map(profile: &Map<String, Value>) -> AppResult<Self> {
        let field = |name: &str| -> AppResult<String> {
            match profile.get(name).and_then(Value::as_str) {
                Some(value) if !value.is_empty() => Ok(value.to_owned()),
                _ => Err(AppError::MissingProfileField(name.to_owned())),
            }
        };

        let [first_name, last_name, email] = Self::REQUIRED_FIELDS;
        Ok(Self {
            first_name: field(first_name)?,
            last_name: field(last_name)?,
            email: field(email)?,
        })
    }
}

/// Credential options offered when creating accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialOption {
    /// Account is created without a password; the platform handles sign-in.
    NoPassword,
}

/// Account creation capability advertised to the framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProvisioningCapability {
    /// Supported credential options.
    pub supported_credential_options: Vec<CredentialOption>,
    /// Option used when the caller expresses no preference.
    pub preferred_credential_option: CredentialOption,
}

impl AccountProvisioningCapability {
    /// Capability for platforms that never take a password.
    #[must_use]
    pub fn no_password() -> Self {
        Self {
            supported_credential_options: vec![CredentialOption::NoPassword],
            preferred_credential_option: CredentialOption::NoPassword,
        }
    }
}

/// One field of the account creation form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCreationField {
    /// Profile key.
    pub name: String,
    /// Label shown in the form.
    pub display_name: String,
    /// Help text.
    pub description: String,
    /// Example value.
    pub placeholder: String,
    /// Whether the field must be supplied.
    pub required: bool,
    /// Position in the form, starting at 1.
    pub order: u16,
}

/// Static description of the connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorMetadata {
    /// Connector name.
    pub display_name: String,
    /// What the connector syncs and provisions.
    pub description: String,
    /// Account creation form.
    pub account_creation_schema: Vec<AccountCreationField>,
}

impl ConnectorMetadata {
    /// Metadata of the Miro connector.
    #[must_use]
    pub fn miro() -> Self {
        let field = |name: &str, display_name: &str, description: &str, placeholder: &str, order| {
            AccountCreationField {
                name: name.to_owned(),
                display_name: display_name.to_owned(),
                description: description.to_owned(),
                placeholder: placeholder.to_owned(),
                required: true,
                order,
            }
        };

        Self {
            display_name: "Miro Connector".to_owned(),
            description: "Connector syncs data from Miro, including users, teams, roles and \
                          provisioning teams, roles and users."
                .to_owned(),
            account_creation_schema: vec![
                field(
                    "first_name",
                    "First Name",
                    "The first name of the user to create.",
                    "John",
                    1,
                ),
                field(
                    "last_name",
                    "Last Name",
                    "The last name of the user to create.",
                    "Doe",
                    2,
                ),
                field(
                    "email",
                    "Email",
                    "The email address for the user. It will be used as their login.",
                    "john.doe@example.com",
                    3,
                ),
            ],
        }
    }
}
