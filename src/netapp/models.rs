//! NetApp data models and types
//!
//! This module defines the request and response shapes used for Azure
//! NetApp Files management, along with the input validation that must
//! pass before any request is sent.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::error::{AnfError, Result};

/// API version used for every `Microsoft.NetApp` call
pub const NETAPP_API_VERSION: &str = "2023-11-01";

/// API version used to look up virtual networks and subnets
pub const VIRTUAL_NETWORKS_API_VERSION: &str = "2019-09-01";

/// Capacity pool performance tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceLevel {
    Standard,
    Premium,
    Ultra,
}

impl ServiceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceLevel::Standard => "Standard",
            ServiceLevel::Premium => "Premium",
            ServiceLevel::Ultra => "Ultra",
        }
    }
}

impl std::str::FromStr for ServiceLevel {
    type Err = AnfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(ServiceLevel::Standard),
            "premium" => Ok(ServiceLevel::Premium),
            "ultra" => Ok(ServiceLevel::Ultra),
            _ => Err(AnfError::invalid_service_level(s)),
        }
    }
}

impl std::fmt::Display for ServiceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Protocol a volume is exported with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolType {
    #[serde(rename = "NFSv3")]
    Nfsv3,
    #[serde(rename = "NFSv4.1")]
    Nfsv41,
    #[serde(rename = "CIFS")]
    Cifs,
}

impl ProtocolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolType::Nfsv3 => "NFSv3",
            ProtocolType::Nfsv41 => "NFSv4.1",
            ProtocolType::Cifs => "CIFS",
        }
    }
}

impl std::str::FromStr for ProtocolType {
    type Err = AnfError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "NFSv3" => Ok(ProtocolType::Nfsv3),
            "NFSv4.1" => Ok(ProtocolType::Nfsv41),
            "CIFS" => Ok(ProtocolType::Cifs),
            _ => Err(AnfError::invalid_protocol(s)),
        }
    }
}

impl std::fmt::Display for ProtocolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a list of protocol names for a single volume.
///
/// Exactly one protocol is supported per volume and it must be one of
/// `NFSv3`, `NFSv4.1` or `CIFS`.
pub fn validate_protocol_types(protocol_types: &[String]) -> Result<ProtocolType> {
    match protocol_types {
        [single] => single.parse(),
        _ => Err(AnfError::ProtocolCount {
            count: protocol_types.len(),
        }),
    }
}

/// Azure NetApp Files account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetAppAccount {
    pub id: String,
    pub name: String,
    pub location: String,
    pub provisioning_state: Option<String>,
}

/// Capacity pool inside an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityPool {
    pub id: String,
    pub name: String,
    pub location: String,
    pub service_level: Option<String>,
    pub size_bytes: Option<u64>,
    pub provisioning_state: Option<String>,
}

/// Volume inside a capacity pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub id: String,
    pub name: String,
    pub location: String,
    pub creation_token: Option<String>,
    pub usage_threshold: Option<u64>,
    pub protocol_types: Vec<String>,
    pub provisioning_state: Option<String>,
}

/// Point-in-time snapshot of a volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    pub name: String,
    pub location: String,
    /// Service-side GUID used when restoring a volume from this snapshot
    pub snapshot_id: Option<String>,
    pub provisioning_state: Option<String>,
}

/// Request for creating or updating an account
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountCreateRequest {
    pub resource_group: String,
    pub account_name: String,
    pub location: String,
    pub tags: HashMap<String, String>,
}

impl AccountCreateRequest {
    pub fn to_body(&self) -> Value {
        json!({
            "location": self.location,
            "tags": self.tags,
        })
    }
}

/// Request for creating or updating a capacity pool
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapacityPoolCreateRequest {
    pub resource_group: String,
    pub account_name: String,
    pub pool_name: String,
    pub location: String,
    pub service_level: String,
    pub size_bytes: u64,
    pub tags: HashMap<String, String>,
}

impl CapacityPoolCreateRequest {
    /// Validated service level of the pool
    pub fn validate(&self) -> Result<ServiceLevel> {
        self.service_level.parse()
    }

    pub fn to_body(&self, service_level: ServiceLevel) -> Value {
        json!({
            "location": self.location,
            "tags": self.tags,
            "properties": {
                "serviceLevel": service_level.as_str(),
                "size": self.size_bytes,
            }
        })
    }
}

/// Request for creating or updating a volume
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeCreateRequest {
    pub resource_group: String,
    pub account_name: String,
    pub pool_name: String,
    pub volume_name: String,
    pub location: String,
    pub service_level: String,
    pub subnet_id: String,
    /// Snapshot GUID to restore from; empty for a blank volume
    pub snapshot_id: Option<String>,
    pub protocol_types: Vec<String>,
    pub usage_threshold: u64,
    pub unix_read_only: bool,
    pub unix_read_write: bool,
    pub tags: HashMap<String, String>,
}

impl VolumeCreateRequest {
    /// Check protocol and service level before any request is issued
    pub fn validate(&self) -> Result<(ProtocolType, ServiceLevel)> {
        let protocol = validate_protocol_types(&self.protocol_types)?;
        let service_level = self.service_level.parse()?;
        Ok((protocol, service_level))
    }

    pub fn to_body(&self, protocol: ProtocolType, service_level: ServiceLevel) -> Value {
        let mut properties = json!({
            "creationToken": self.volume_name,
            "serviceLevel": service_level.as_str(),
            "subnetId": self.subnet_id,
            "usageThreshold": self.usage_threshold,
            "protocolTypes": [protocol.as_str()],
            "exportPolicy": {
                "rules": [{
                    "ruleIndex": 1,
                    "allowedClients": "0.0.0.0/0",
                    "cifs": protocol == ProtocolType::Cifs,
                    "nfsv3": protocol == ProtocolType::Nfsv3,
                    "nfsv41": protocol == ProtocolType::Nfsv41,
                    "unixReadOnly": self.unix_read_only,
                    "unixReadWrite": self.unix_read_write,
                }]
            }
        });

        if let Some(snapshot_id) = self.snapshot_id.as_deref().filter(|s| !s.is_empty()) {
            properties["snapshotId"] = json!(snapshot_id);
        }

        json!({
            "location": self.location,
            "tags": self.tags,
            "properties": properties,
        })
    }
}

/// Request for taking a snapshot of a volume
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotCreateRequest {
    pub resource_group: String,
    pub account_name: String,
    pub pool_name: String,
    pub volume_name: String,
    pub snapshot_name: String,
    pub location: String,
}

impl SnapshotCreateRequest {
    pub fn to_body(&self) -> Value {
        json!({ "location": self.location })
    }
}

/// Patch applied to an existing volume
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeUpdateRequest {
    pub resource_group: String,
    pub account_name: String,
    pub pool_name: String,
    pub volume_name: String,
    pub location: String,
    pub usage_threshold: Option<u64>,
    pub tags: HashMap<String, String>,
}

impl VolumeUpdateRequest {
    pub fn to_body(&self) -> Value {
        let mut properties = serde_json::Map::new();
        if let Some(threshold) = self.usage_threshold {
            properties.insert("usageThreshold".to_string(), json!(threshold));
        }

        json!({
            "location": self.location,
            "tags": self.tags,
            "properties": properties,
        })
    }
}

fn str_field(value: &Value, field: &str) -> String {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

fn property_str(value: &Value, field: &str) -> Option<String> {
    value
        .get("properties")
        .and_then(|p| p.get(field))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn property_u64(value: &Value, field: &str) -> Option<u64> {
    value
        .get("properties")
        .and_then(|p| p.get(field))
        .and_then(|v| v.as_u64())
}

fn require_id(value: &Value, kind: &str) -> Result<String> {
    let id = str_field(value, "id");
    if id.is_empty() {
        return Err(AnfError::serialization(format!(
            "Missing id in {kind} response"
        )));
    }
    Ok(id)
}

impl NetAppAccount {
    /// Parse an ARM account response
    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Self {
            id: require_id(value, "account")?,
            name: str_field(value, "name"),
            location: str_field(value, "location"),
            provisioning_state: property_str(value, "provisioningState"),
        })
    }
}

impl CapacityPool {
    /// Parse an ARM capacity pool response
    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Self {
            id: require_id(value, "capacity pool")?,
            name: str_field(value, "name"),
            location: str_field(value, "location"),
            service_level: property_str(value, "serviceLevel"),
            size_bytes: property_u64(value, "size"),
            provisioning_state: property_str(value, "provisioningState"),
        })
    }
}

impl Volume {
    /// Parse an ARM volume response
    pub fn from_value(value: &Value) -> Result<Self> {
        let protocol_types = value
            .get("properties")
            .and_then(|p| p.get("protocolTypes"))
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            id: require_id(value, "volume")?,
            name: str_field(value, "name"),
            location: str_field(value, "location"),
            creation_token: property_str(value, "creationToken"),
            usage_threshold: property_u64(value, "usageThreshold"),
            protocol_types,
            provisioning_state: property_str(value, "provisioningState"),
        })
    }
}

impl Snapshot {
    /// Parse an ARM snapshot response
    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Self {
            id: require_id(value, "snapshot")?,
            name: str_field(value, "name"),
            location: str_field(value, "location"),
            snapshot_id: property_str(value, "snapshotId"),
            provisioning_state: property_str(value, "provisioningState"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume_request(protocols: &[&str]) -> VolumeCreateRequest {
        VolumeCreateRequest {
            volume_name: "vol1".to_string(),
            service_level: "standard".to_string(),
            protocol_types: protocols.iter().map(|p| p.to_string()).collect(),
            usage_threshold: 107_374_182_400,
            unix_read_write: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_service_level_is_case_insensitive() {
        assert_eq!("ULTRA".parse::<ServiceLevel>().unwrap(), ServiceLevel::Ultra);
        assert_eq!("premium".parse::<ServiceLevel>().unwrap(), ServiceLevel::Premium);
        assert!(matches!(
            "basic".parse::<ServiceLevel>(),
            Err(AnfError::InvalidServiceLevel { .. })
        ));
    }

    #[test]
    fn test_two_protocols_are_rejected() {
        let request = volume_request(&["NFSv3", "NFSv4.1"]);
        assert!(matches!(
            request.validate(),
            Err(AnfError::ProtocolCount { count: 2 })
        ));
    }

    #[test]
    fn test_unknown_protocol_is_rejected() {
        let request = volume_request(&["SMB"]);
        assert!(matches!(
            request.validate(),
            Err(AnfError::InvalidProtocol { .. })
        ));
    }

    #[test]
    fn test_volume_body_export_rule_follows_protocol() {
        let request = volume_request(&["NFSv4.1"]);
        let (protocol, level) = request.validate().unwrap();
        let body = request.to_body(protocol, level);

        let rule = &body["properties"]["exportPolicy"]["rules"][0];
        assert_eq!(rule["nfsv41"], json!(true));
        assert_eq!(rule["nfsv3"], json!(false));
        assert_eq!(body["properties"]["serviceLevel"], json!("Standard"));
        assert!(body["properties"].get("snapshotId").is_none());
    }

    #[test]
    fn test_volume_body_carries_snapshot_id() {
        let mut request = volume_request(&["NFSv3"]);
        request.snapshot_id = Some("a1b2".to_string());
        let (protocol, level) = request.validate().unwrap();
        let body = request.to_body(protocol, level);
        assert_eq!(body["properties"]["snapshotId"], json!("a1b2"));
    }

    #[test]
    fn test_parse_snapshot_response() {
        let value = json!({
            "id": "/subscriptions/S/resourceGroups/rg/providers/Microsoft.NetApp/netAppAccounts/a/capacityPools/p/volumes/v/snapshots/s",
            "name": "a/p/v/s",
            "location": "westus2",
            "properties": { "snapshotId": "9a1c", "provisioningState": "Succeeded" }
        });
        let snapshot = Snapshot::from_value(&value).unwrap();
        assert_eq!(snapshot.snapshot_id.as_deref(), Some("9a1c"));
        assert_eq!(snapshot.provisioning_state.as_deref(), Some("Succeeded"));
    }

    #[test]
    fn test_parse_response_without_id_fails() {
        let value = json!({ "name": "acct" });
        assert!(NetAppAccount::from_value(&value).is_err());
    }
}
