//! NetApp operations implementation
//!
//! This module provides create, update, delete and lookup operations for
//! Azure NetApp Files resources over the Azure Resource Manager REST API.
//! Create, update and delete calls block until the long-running operation
//! behind them reaches a terminal state.

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, Method, StatusCode,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};
use uuid::Uuid;

use super::models::{
    AccountCreateRequest, CapacityPool, CapacityPoolCreateRequest, NetAppAccount, Snapshot,
    SnapshotCreateRequest, Volume, VolumeCreateRequest, VolumeUpdateRequest, NETAPP_API_VERSION,
};
use crate::auth::provider::AzureAuthProvider;
use crate::error::{AnfError, Result};
use crate::utils::network::{classify_network_error, create_http_client, NetworkConfig};
use crate::utils::retry::{retry_with_backoff, RetryOptions};

/// Default wait between long-running operation status checks
pub const DEFAULT_OPERATION_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Trait for NetApp resource operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NetAppOperations: Send + Sync {
    /// Create or update a NetApp account
    async fn create_account(&self, request: &AccountCreateRequest) -> Result<NetAppAccount>;

    /// Create or update a capacity pool
    async fn create_capacity_pool(
        &self,
        request: &CapacityPoolCreateRequest,
    ) -> Result<CapacityPool>;

    /// Create or update a volume, optionally restoring it from a snapshot
    async fn create_volume(&self, request: &VolumeCreateRequest) -> Result<Volume>;

    /// Take a snapshot of a volume
    async fn create_snapshot(&self, request: &SnapshotCreateRequest) -> Result<Snapshot>;

    /// Patch properties of an existing volume
    async fn update_volume(&self, request: &VolumeUpdateRequest) -> Result<Volume>;

    /// Delete a NetApp account
    async fn delete_account(&self, resource_group: &str, account_name: &str) -> Result<()>;

    /// Delete a capacity pool
    async fn delete_capacity_pool(
        &self,
        resource_group: &str,
        account_name: &str,
        pool_name: &str,
    ) -> Result<()>;

    /// Delete a volume
    async fn delete_volume(
        &self,
        resource_group: &str,
        account_name: &str,
        pool_name: &str,
        volume_name: &str,
    ) -> Result<()>;

    /// Delete a snapshot
    async fn delete_snapshot(
        &self,
        resource_group: &str,
        account_name: &str,
        pool_name: &str,
        volume_name: &str,
        snapshot_name: &str,
    ) -> Result<()>;

    /// Fetch any ARM resource by id
    async fn get_resource_by_id(&self, resource_id: &str, api_version: &str) -> Result<Value>;

    /// Check whether a NetApp resource still exists
    async fn resource_exists(&self, resource_id: &str) -> Result<bool>;
}

/// Response details kept from an ARM call
struct ArmResponse {
    status: StatusCode,
    async_operation: Option<String>,
    location: Option<String>,
    retry_after: Option<Duration>,
    body: String,
}

impl ArmResponse {
    /// Capture status, polling headers and the full body
    async fn read(response: reqwest::Response, url: &str) -> Result<Self> {
        let status = response.status();
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        };
        let async_operation = header("Azure-AsyncOperation");
        let location = header("Location");
        let retry_after = header("Retry-After")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs);

        let body = response
            .text()
            .await
            .map_err(|e| classify_network_error(&e, url))?;

        Ok(Self {
            status,
            async_operation,
            location,
            retry_after,
            body,
        })
    }

    fn json(&self) -> Result<Value> {
        serde_json::from_str(&self.body).map_err(|e| {
            AnfError::serialization(format!("Failed to parse management response: {}", e))
        })
    }
}

/// Azure NetApp Files operations implementation
pub struct AzureNetAppOperations {
    auth_provider: Arc<dyn AzureAuthProvider>,
    http_client: Client,
    subscription_id: String,
    operation_poll_interval: Duration,
}

impl AzureNetAppOperations {
    /// Create a new operations instance
    pub fn new(auth_provider: Arc<dyn AzureAuthProvider>) -> Result<Self> {
        let network_config = NetworkConfig::default();
        let http_client = create_http_client(&network_config)?;
        let subscription_id = auth_provider.subscription_id().to_string();

        Ok(Self {
            auth_provider,
            http_client,
            subscription_id,
            operation_poll_interval: DEFAULT_OPERATION_POLL_INTERVAL,
        })
    }

    /// Override the wait between long-running operation status checks
    pub fn with_operation_poll_interval(mut self, interval: Duration) -> Self {
        self.operation_poll_interval = interval;
        self
    }

    /// Get access token for Azure Resource Manager
    async fn get_management_token(&self) -> Result<String> {
        let scope = self.auth_provider.management_scope();
        let token = self.auth_provider.get_token(&[scope.as_str()]).await?;
        Ok(token.token.secret().to_string())
    }

    /// Create authorized headers for Azure REST API
    async fn create_headers(&self) -> Result<HeaderMap> {
        let token = self.get_management_token().await?;
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            format!("Bearer {}", token)
                .parse()
                .map_err(|e| AnfError::authentication(format!("Invalid token format: {}", e)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-ms-client-request-id",
            Uuid::new_v4()
                .to_string()
                .parse()
                .map_err(|e| AnfError::network(format!("Invalid request id: {}", e)))?,
        );
        Ok(headers)
    }

    /// Build Azure Resource Manager URL
    fn build_arm_url(&self, resource_id: &str, api_version: &str) -> String {
        format!(
            "{}{}?api-version={}",
            self.auth_provider.resource_manager_endpoint(),
            resource_id,
            api_version
        )
    }

    fn account_id(&self, resource_group: &str, account_name: &str) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.NetApp/netAppAccounts/{}",
            self.subscription_id, resource_group, account_name
        )
    }

    fn pool_id(&self, resource_group: &str, account_name: &str, pool_name: &str) -> String {
        format!(
            "{}/capacityPools/{}",
            self.account_id(resource_group, account_name),
            pool_name
        )
    }

    fn volume_id(
        &self,
        resource_group: &str,
        account_name: &str,
        pool_name: &str,
        volume_name: &str,
    ) -> String {
        format!(
            "{}/volumes/{}",
            self.pool_id(resource_group, account_name, pool_name),
            volume_name
        )
    }

    fn snapshot_id(
        &self,
        resource_group: &str,
        account_name: &str,
        pool_name: &str,
        volume_name: &str,
        snapshot_name: &str,
    ) -> String {
        format!(
            "{}/snapshots/{}",
            self.volume_id(resource_group, account_name, pool_name, volume_name),
            snapshot_name
        )
    }

    /// Parse Azure error response
    fn parse_azure_error(&self, status: u16, body: &str) -> AnfError {
        if let Ok(error_json) = serde_json::from_str::<Value>(body) {
            if let Some(error) = error_json.get("error") {
                if let Some(message) = error.get("message").and_then(|m| m.as_str()) {
                    return AnfError::azure_api(format!("HTTP {}: {}", status, message));
                }
            }
        }
        AnfError::azure_api(format!("HTTP {}: {}", status, body))
    }

    /// Retry wrapper for Azure operations
    async fn execute_with_retry<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let retry_options = RetryOptions {
            max_retries: 3,
            initial_interval: Duration::from_millis(1000),
            max_interval: Duration::from_millis(10000),
            multiplier: 2.0,
        };
        retry_with_backoff(operation, retry_options).await
    }

    /// Send one request, mapping 404 to `NotFound` and other failures to API errors
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        resource: &str,
    ) -> Result<ArmResponse> {
        let method = &method;
        let operation = move || async move {
            let headers = self.create_headers().await?;
            let mut request = self
                .http_client
                .request(method.clone(), url)
                .headers(headers);
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request
                .send()
                .await
                .map_err(|e| classify_network_error(&e, url))?;

            let response = ArmResponse::read(response, url).await?;

            if response.status == StatusCode::NOT_FOUND {
                return Err(AnfError::not_found(resource));
            }

            if !response.status.is_success() {
                return Err(self.parse_azure_error(response.status.as_u16(), &response.body));
            }

            Ok(response)
        };

        self.execute_with_retry(operation).await
    }

    fn needs_wait(response: &ArmResponse) -> bool {
        response.async_operation.is_some() || response.status == StatusCode::ACCEPTED
    }

    /// Block until the long-running operation started by `initial` finishes
    async fn wait_for_completion(&self, initial: &ArmResponse, resource: &str) -> Result<()> {
        let interval = initial.retry_after.unwrap_or(self.operation_poll_interval);

        if let Some(status_url) = &initial.async_operation {
            loop {
                sleep(interval).await;
                let response = self.send(Method::GET, status_url, None, resource).await?;
                let status_body = response.json()?;
                let status = status_body
                    .get("status")
                    .and_then(|s| s.as_str())
                    .unwrap_or("InProgress");

                debug!("Operation on {} is {}", resource, status);
                match status.to_lowercase().as_str() {
                    "succeeded" => return Ok(()),
                    "failed" | "canceled" | "cancelled" => {
                        let message = status_body
                            .get("error")
                            .and_then(|e| e.get("message"))
                            .and_then(|m| m.as_str())
                            .unwrap_or("no details returned");
                        return Err(AnfError::azure_api(format!(
                            "Operation on {} {}: {}",
                            resource, status, message
                        )));
                    }
                    _ => continue,
                }
            }
        }

        if initial.status == StatusCode::ACCEPTED {
            if let Some(location) = &initial.location {
                loop {
                    sleep(interval).await;
                    let response = self.send(Method::GET, location, None, resource).await?;
                    if response.status != StatusCode::ACCEPTED {
                        return Ok(());
                    }
                }
            }
        }

        Ok(())
    }

    /// PUT or PATCH a resource and return its final representation
    async fn put_resource(&self, method: Method, resource_id: &str, body: &Value) -> Result<Value> {
        let url = self.build_arm_url(resource_id, NETAPP_API_VERSION);
        let response = self.send(method, &url, Some(body), resource_id).await?;

        if Self::needs_wait(&response) {
            self.wait_for_completion(&response, resource_id).await?;
            let latest = self.send(Method::GET, &url, None, resource_id).await?;
            return latest.json();
        }

        response.json()
    }

    async fn delete_resource(&self, resource_id: &str) -> Result<()> {
        let url = self.build_arm_url(resource_id, NETAPP_API_VERSION);
        let response = self.send(Method::DELETE, &url, None, resource_id).await?;

        if Self::needs_wait(&response) {
            self.wait_for_completion(&response, resource_id).await?;
        }

        Ok(())
    }
}

#[async_trait]
impl NetAppOperations for AzureNetAppOperations {
    async fn create_account(&self, request: &AccountCreateRequest) -> Result<NetAppAccount> {
        let resource_id = self.account_id(&request.resource_group, &request.account_name);
        info!("Creating or updating account {}", resource_id);

        let value = self
            .put_resource(Method::PUT, &resource_id, &request.to_body())
            .await?;
        NetAppAccount::from_value(&value)
    }

    async fn create_capacity_pool(
        &self,
        request: &CapacityPoolCreateRequest,
    ) -> Result<CapacityPool> {
        let service_level = request.validate()?;
        let resource_id = self.pool_id(
            &request.resource_group,
            &request.account_name,
            &request.pool_name,
        );
        info!("Creating or updating capacity pool {}", resource_id);

        let value = self
            .put_resource(Method::PUT, &resource_id, &request.to_body(service_level))
            .await?;
        CapacityPool::from_value(&value)
    }

    async fn create_volume(&self, request: &VolumeCreateRequest) -> Result<Volume> {
        let (protocol, service_level) = request.validate()?;
        let resource_id = self.volume_id(
            &request.resource_group,
            &request.account_name,
            &request.pool_name,
            &request.volume_name,
        );
        info!("Creating or updating {} volume {}", protocol, resource_id);

        let value = self
            .put_resource(
                Method::PUT,
                &resource_id,
                &request.to_body(protocol, service_level),
            )
            .await?;
        Volume::from_value(&value)
    }

    async fn create_snapshot(&self, request: &SnapshotCreateRequest) -> Result<Snapshot> {
        let resource_id = self.snapshot_id(
            &request.resource_group,
            &request.account_name,
            &request.pool_name,
            &request.volume_name,
            &request.snapshot_name,
        );
        info!("Creating snapshot {}", resource_id);

        let value = self
            .put_resource(Method::PUT, &resource_id, &request.to_body())
            .await?;
        Snapshot::from_value(&value)
    }

    async fn update_volume(&self, request: &VolumeUpdateRequest) -> Result<Volume> {
        let resource_id = self.volume_id(
            &request.resource_group,
            &request.account_name,
            &request.pool_name,
            &request.volume_name,
        );
        info!("Updating volume {}", resource_id);

        let value = self
            .put_resource(Method::PATCH, &resource_id, &request.to_body())
            .await?;
        Volume::from_value(&value)
    }

    async fn delete_account(&self, resource_group: &str, account_name: &str) -> Result<()> {
        self.delete_resource(&self.account_id(resource_group, account_name))
            .await
    }

    async fn delete_capacity_pool(
        &self,
        resource_group: &str,
        account_name: &str,
        pool_name: &str,
    ) -> Result<()> {
        self.delete_resource(&self.pool_id(resource_group, account_name, pool_name))
            .await
    }

    async fn delete_volume(
        &self,
        resource_group: &str,
        account_name: &str,
        pool_name: &str,
        volume_name: &str,
    ) -> Result<()> {
        self.delete_resource(&self.volume_id(resource_group, account_name, pool_name, volume_name))
            .await
    }

    async fn delete_snapshot(
        &self,
        resource_group: &str,
        account_name: &str,
        pool_name: &str,
        volume_name: &str,
        snapshot_name: &str,
    ) -> Result<()> {
        self.delete_resource(&self.snapshot_id(
            resource_group,
            account_name,
            pool_name,
            volume_name,
            snapshot_name,
        ))
        .await
    }

    async fn get_resource_by_id(&self, resource_id: &str, api_version: &str) -> Result<Value> {
        let url = self.build_arm_url(resource_id, api_version);
        let response = self.send(Method::GET, &url, None, resource_id).await?;
        response.json()
    }

    async fn resource_exists(&self, resource_id: &str) -> Result<bool> {
        match self.get_resource_by_id(resource_id, NETAPP_API_VERSION).await {
            Ok(_) => Ok(true),
            Err(AnfError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
