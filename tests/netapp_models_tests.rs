use anf_sample::error::AnfError;
use anf_sample::netapp::models::{
    validate_protocol_types, CapacityPoolCreateRequest, ProtocolType, ServiceLevel, Snapshot,
    Volume, VolumeCreateRequest, VolumeUpdateRequest,
};
use serde_json::json;

fn nfs_volume_request() -> VolumeCreateRequest {
    VolumeCreateRequest {
        resource_group: "anf02-rg".to_string(),
        account_name: "acct1".to_string(),
        pool_name: "Pool01".to_string(),
        volume_name: "NFSv3-Vol-acct1-Pool01".to_string(),
        location: "westus2".to_string(),
        service_level: "Standard".to_string(),
        subnet_id: "/subscriptions/s/resourceGroups/anf02-rg/providers/Microsoft.Network/virtualNetworks/vnet-03/subnets/anf-sn".to_string(),
        protocol_types: vec!["NFSv3".to_string()],
        usage_threshold: 107_374_182_400,
        unix_read_write: true,
        ..Default::default()
    }
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    #[test]
    fn test_service_level_is_case_insensitive() {
        assert_eq!("premium".parse::<ServiceLevel>().unwrap(), ServiceLevel::Premium);
        assert_eq!("ULTRA".parse::<ServiceLevel>().unwrap(), ServiceLevel::Ultra);
        assert!(matches!(
            "Gold".parse::<ServiceLevel>(),
            Err(AnfError::InvalidServiceLevel { .. })
        ));
    }

    #[test]
    fn test_exactly_one_protocol() {
        assert_eq!(
            validate_protocol_types(&["NFSv4.1".to_string()]).unwrap(),
            ProtocolType::Nfsv41
        );
        assert!(matches!(
            validate_protocol_types(&["NFSv3".to_string(), "CIFS".to_string()]),
            Err(AnfError::ProtocolCount { count: 2 })
        ));
        assert!(matches!(
            validate_protocol_types(&[]),
            Err(AnfError::ProtocolCount { count: 0 })
        ));
        assert!(matches!(
            validate_protocol_types(&["SMB".to_string()]),
            Err(AnfError::InvalidProtocol { .. })
        ));
    }

    #[test]
    fn test_pool_request_rejects_unknown_level() {
        let request = CapacityPoolCreateRequest {
            service_level: "Basic".to_string(),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }
}

#[cfg(test)]
mod payload_tests {
    use super::*;

    #[test]
    fn test_volume_body_export_policy() {
        let request = nfs_volume_request();
        let (protocol, level) = request.validate().unwrap();
        let body = request.to_body(protocol, level);

        let properties = &body["properties"];
        assert_eq!(properties["creationToken"], "NFSv3-Vol-acct1-Pool01");
        assert_eq!(properties["protocolTypes"], json!(["NFSv3"]));
        assert_eq!(properties["usageThreshold"], 107_374_182_400u64);
        assert!(properties.get("snapshotId").is_none());

        let rule = &properties["exportPolicy"]["rules"][0];
        assert_eq!(rule["allowedClients"], "0.0.0.0/0");
        assert_eq!(rule["nfsv3"], true);
        assert_eq!(rule["nfsv41"], false);
        assert_eq!(rule["unixReadWrite"], true);
    }

    #[test]
    fn test_volume_from_snapshot_body() {
        let request = VolumeCreateRequest {
            snapshot_id: Some("9760acf5-4638-11e7-9bdb-020073ca7778".to_string()),
            ..nfs_volume_request()
        };
        let (protocol, level) = request.validate().unwrap();
        let body = request.to_body(protocol, level);
        assert_eq!(
            body["properties"]["snapshotId"],
            "9760acf5-4638-11e7-9bdb-020073ca7778"
        );
    }

    #[test]
    fn test_update_body_only_carries_set_fields() {
        let request = VolumeUpdateRequest {
            location: "westus2".to_string(),
            usage_threshold: Some(214_748_364_800),
            ..Default::default()
        };
        let body = request.to_body();
        assert_eq!(body["properties"]["usageThreshold"], 214_748_364_800u64);

        let empty = VolumeUpdateRequest::default().to_body();
        assert_eq!(empty["properties"], json!({}));
    }

    #[test]
    fn test_parse_responses() {
        let volume = Volume::from_value(&json!({
            "id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.NetApp/netAppAccounts/a/capacityPools/p/volumes/v",
            "name": "a/p/v",
            "location": "westus2",
            "properties": {
                "usageThreshold": 107374182400u64,
                "protocolTypes": ["NFSv4.1"],
                "provisioningState": "Succeeded"
            }
        }))
        .unwrap();
        assert_eq!(volume.usage_threshold, Some(107_374_182_400));
        assert_eq!(volume.protocol_types, vec!["NFSv4.1".to_string()]);

        let snapshot = Snapshot::from_value(&json!({
            "id": "/subscriptions/s/x/snapshots/snap",
            "properties": { "snapshotId": "guid-1" }
        }))
        .unwrap();
        assert_eq!(snapshot.snapshot_id.as_deref(), Some("guid-1"));

        assert!(Snapshot::from_value(&json!({ "name": "no-id" })).is_err());
    }
}
