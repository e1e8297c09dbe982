//! Authentication provider trait and the auth-file implementation
//!
//! Credentials come from the JSON file produced by
//! `az ad sp create-for-rbac --sdk-auth`, located through the
//! `AZURE_AUTH_LOCATION` environment variable.

use async_trait::async_trait;
use azure_core::auth::{AccessToken, TokenCredential};
use azure_identity::ClientSecretCredential;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{AnfError, Result};

/// Environment variable holding the path of the auth file
pub const AUTH_LOCATION_ENV: &str = "AZURE_AUTH_LOCATION";

const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
const DEFAULT_RESOURCE_MANAGER_ENDPOINT: &str = "https://management.azure.com/";

/// Trait for Azure authentication providers
#[async_trait]
pub trait AzureAuthProvider: Send + Sync {
    /// Get an access token for the specified scopes
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken>;

    /// Subscription the credential operates in
    fn subscription_id(&self) -> &str;

    /// Base URL of the Azure Resource Manager endpoint, without trailing slash
    fn resource_manager_endpoint(&self) -> &str;

    /// Scope to request for management-plane tokens
    fn management_scope(&self) -> String {
        format!("{}/.default", self.resource_manager_endpoint())
    }
}

/// Contents of an Azure SDK auth file
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureAuthInfo {
    pub client_id: Option<String>,
    pub client_secret: Option<Zeroizing<String>>,
    pub subscription_id: Option<String>,
    pub tenant_id: Option<String>,
    pub active_directory_endpoint_url: Option<String>,
    pub resource_manager_endpoint_url: Option<String>,
    pub active_directory_graph_resource_id: Option<String>,
    pub sql_management_endpoint_url: Option<String>,
    pub gallery_endpoint_url: Option<String>,
    pub management_endpoint_url: Option<String>,
}

impl AzureAuthInfo {
    /// Read and parse an auth file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AnfError::authentication(format!(
                "Failed to read auth file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_json(&contents)
    }

    /// Parse auth file contents
    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents)
            .map_err(|e| AnfError::authentication(format!("Failed to parse auth file: {}", e)))
    }

    /// Read the auth file named by `AZURE_AUTH_LOCATION`
    pub fn from_env() -> Result<Self> {
        let location = std::env::var(AUTH_LOCATION_ENV).map_err(|_| {
            AnfError::authentication(format!("{} environment variable not set", AUTH_LOCATION_ENV))
        })?;
        if location.trim().is_empty() {
            return Err(AnfError::authentication(format!(
                "{} environment variable is empty",
                AUTH_LOCATION_ENV
            )));
        }

        Self::from_file(Path::new(&location))
    }

    fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
        value
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AnfError::authentication(format!("{} is missing from auth file", field)))
    }

    pub fn require_subscription_id(&self) -> Result<&str> {
        Self::required(&self.subscription_id, "subscriptionId")
    }

    pub fn require_tenant_id(&self) -> Result<&str> {
        Self::required(&self.tenant_id, "tenantId")
    }

    pub fn require_client_id(&self) -> Result<&str> {
        Self::required(&self.client_id, "clientId")
    }

    pub fn require_client_secret(&self) -> Result<&str> {
        self.client_secret
            .as_deref()
            .map(|s| s.as_str())
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AnfError::authentication("clientSecret is missing from auth file"))
    }

    /// Resource Manager endpoint with any trailing slash removed
    pub fn resource_manager_endpoint(&self) -> String {
        self.resource_manager_endpoint_url
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(DEFAULT_RESOURCE_MANAGER_ENDPOINT)
            .trim_end_matches('/')
            .to_string()
    }

    /// Active Directory authority host with any trailing slash removed
    pub fn authority_host(&self) -> String {
        self.active_directory_endpoint_url
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(DEFAULT_AUTHORITY_HOST)
            .trim_end_matches('/')
            .to_string()
    }
}

/// Service principal credential built from an auth file
pub struct AuthFileProvider {
    credential: Arc<ClientSecretCredential>,
    subscription_id: String,
    resource_manager_endpoint: String,
}

impl AuthFileProvider {
    /// Create a provider from the auth file named by `AZURE_AUTH_LOCATION`
    pub fn from_env() -> Result<Self> {
        Self::from_auth_info(&AzureAuthInfo::from_env()?)
    }

    /// Create a provider from parsed auth file contents
    pub fn from_auth_info(info: &AzureAuthInfo) -> Result<Self> {
        let subscription_id = info.require_subscription_id()?.to_string();
        let tenant_id = info.require_tenant_id()?.to_string();
        let client_id = info.require_client_id()?.to_string();
        let client_secret = info.require_client_secret()?.to_string();

        let authority_url = url::Url::parse(&info.authority_host())
            .map_err(|e| AnfError::authentication(format!("Invalid authority URL: {}", e)))?;

        debug!("Creating client secret credential for client {}", client_id);
        let credential = Arc::new(ClientSecretCredential::new(
            azure_core::new_http_client(),
            authority_url,
            tenant_id,
            client_id,
            client_secret,
        ));

        Ok(Self {
            credential,
            subscription_id,
            resource_manager_endpoint: info.resource_manager_endpoint(),
        })
    }
}

#[async_trait]
impl AzureAuthProvider for AuthFileProvider {
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken> {
        self.credential
            .get_token(scopes)
            .await
            .map_err(|e| AnfError::authentication(format!("Failed to get token: {}", e)))
    }

    fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    fn resource_manager_endpoint(&self) -> &str {
        &self.resource_manager_endpoint
    }
}
