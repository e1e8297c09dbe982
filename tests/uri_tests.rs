use anf_sample::error::AnfError;
use anf_sample::uri::{self, AnfResourceKind, ResourceCoordinates};

const BASE: &str = "/subscriptions/66bc9830-19b6-4987-94d2-0e487be7aa47/resourceGroups/my-rg/providers/Microsoft.NetApp/netAppAccounts/acct1";

fn ids() -> Vec<(String, AnfResourceKind)> {
    vec![
        (BASE.to_string(), AnfResourceKind::Account),
        (format!("{BASE}/capacityPools/Pool01"), AnfResourceKind::CapacityPool),
        (
            format!("{BASE}/capacityPools/Pool01/volumes/vol1"),
            AnfResourceKind::Volume,
        ),
        (
            format!("{BASE}/capacityPools/Pool01/volumes/vol1/snapshots/snap1"),
            AnfResourceKind::Snapshot,
        ),
    ]
}

#[cfg(test)]
mod classification_tests {
    use super::*;

    #[test]
    fn test_exactly_one_predicate_holds() {
        for (id, kind) in ids() {
            let answers = [
                uri::is_anf_snapshot(&id),
                uri::is_anf_volume(&id),
                uri::is_anf_capacity_pool(&id),
                uri::is_anf_account(&id),
            ];
            assert_eq!(answers.iter().filter(|a| **a).count(), 1, "{}", id);
            assert_eq!(uri::classify(&id), Some(kind), "{}", id);
        }
    }

    #[test]
    fn test_pool_id_properties() {
        let id = format!("{BASE}/capacityPools/Pool01");
        assert!(uri::is_anf_capacity_pool(&id));
        assert!(!uri::is_anf_account(&id));
        assert!(!uri::is_anf_volume(&id));
        assert_eq!(uri::get_resource_group(&id).unwrap(), "my-rg");
        assert_eq!(uri::get_resource_name(&id).unwrap(), "Pool01");
        assert_eq!(uri::get_anf_capacity_pool(&id).unwrap(), "Pool01");
    }

    #[test]
    fn test_blank_input_is_false_not_error() {
        for blank in ["", "   "] {
            assert!(!uri::is_anf_resource(blank));
            assert!(!uri::is_anf_account(blank));
            assert!(!uri::is_anf_snapshot(blank));
            assert_eq!(uri::classify(blank), None);
        }
    }

    #[test]
    fn test_backup_policy_is_not_an_account() {
        let id = format!("{BASE}/backupPolicies/daily");
        assert!(!uri::is_anf_account(&id));
        assert_eq!(uri::classify(&id), None);
    }

    #[test]
    fn test_other_providers_are_not_anf() {
        let id = "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet/subnets/sn";
        assert!(!uri::is_anf_resource(id));
        assert_eq!(uri::classify(id), None);
    }
}

#[cfg(test)]
mod extraction_tests {
    use super::*;

    #[test]
    fn test_blank_input_is_invalid_argument() {
        assert!(matches!(
            uri::get_resource_value("", "/volumes"),
            Err(AnfError::InvalidArgument(_))
        ));
        assert!(matches!(
            uri::get_resource_value(BASE, " "),
            Err(AnfError::InvalidArgument(_))
        ));
        assert!(matches!(
            uri::get_resource_name(""),
            Err(AnfError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let id = format!("{BASE}/capacityPools/Pool01/volumes/vol1");
        let first = uri::get_anf_volume(&id).unwrap();
        let second = uri::get_anf_volume(&id).unwrap();
        assert_eq!(first, "vol1");
        assert_eq!(first, second);
    }

    #[test]
    fn test_account_named_like_resource_group() {
        let id = "/subscriptions/S/resourceGroups/RG/providers/P/netAppAccounts/RG/capacityPools/Pool01";
        assert_eq!(
            uri::get_resource_value(id, "/netAppAccounts").unwrap(),
            "capacityPools"
        );
    }

    #[test]
    fn test_missing_marker_yields_empty() {
        assert_eq!(uri::get_anf_snapshot(BASE).unwrap(), "");
        assert_eq!(uri::get_anf_volume(BASE).unwrap(), "");
    }

    #[test]
    fn test_coordinates_of_snapshot() {
        let id = format!("{BASE}/capacityPools/Pool01/volumes/vol1/snapshots/snap1");
        let coordinates = ResourceCoordinates::from_resource_id(&id).unwrap();

        assert_eq!(
            coordinates.subscription_id,
            "66bc9830-19b6-4987-94d2-0e487be7aa47"
        );
        assert_eq!(coordinates.resource_group, "my-rg");
        assert_eq!(coordinates.account, "acct1");
        assert_eq!(coordinates.capacity_pool.as_deref(), Some("Pool01"));
        assert_eq!(coordinates.volume.as_deref(), Some("vol1"));
        assert_eq!(coordinates.snapshot.as_deref(), Some("snap1"));
    }
}
