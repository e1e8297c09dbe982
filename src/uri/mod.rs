//! Resource identifier parsing and classification
//!
//! Azure resource ids are `/`-delimited paths such as
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.NetApp/netAppAccounts/{account}`.
//! The helpers here split an id into its segments once and reason over
//! that list. Extraction errors on blank input; the `is_anf_*` predicates
//! simply answer `false`.

use crate::error::{AnfError, Result};

/// Provider namespace owning every Azure NetApp Files resource
pub const NETAPP_PROVIDER: &str = "Microsoft.NetApp";

const SUBSCRIPTIONS_MARKER: &str = "/subscriptions";
const RESOURCE_GROUPS_MARKER: &str = "/resourceGroups";
const ACCOUNTS_MARKER: &str = "/netAppAccounts";
const CAPACITY_POOLS_MARKER: &str = "/capacityPools";
const VOLUMES_MARKER: &str = "/volumes";
const SNAPSHOTS_MARKER: &str = "/snapshots";
const BACKUP_POLICIES_LABEL: &str = "backupPolicies";

/// Kinds of Azure NetApp Files resources an id can name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnfResourceKind {
    Snapshot,
    Volume,
    CapacityPool,
    Account,
}

impl AnfResourceKind {
    /// Type label used in resource ids for this kind
    pub fn type_label(&self) -> &'static str {
        match self {
            AnfResourceKind::Snapshot => "snapshots",
            AnfResourceKind::Volume => "volumes",
            AnfResourceKind::CapacityPool => "capacityPools",
            AnfResourceKind::Account => "netAppAccounts",
        }
    }
}

impl std::fmt::Display for AnfResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AnfResourceKind::Snapshot => "snapshot",
            AnfResourceKind::Volume => "volume",
            AnfResourceKind::CapacityPool => "capacity pool",
            AnfResourceKind::Account => "account",
        };
        write!(f, "{name}")
    }
}

/// Classification order, most specific first. A resource id is the first
/// kind in this list whose type label it carries.
pub const ANF_KIND_PRECEDENCE: [AnfResourceKind; 4] = [
    AnfResourceKind::Snapshot,
    AnfResourceKind::Volume,
    AnfResourceKind::CapacityPool,
    AnfResourceKind::Account,
];

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Position of the first run of `needle` inside `haystack`, ignoring case
fn find_window(haystack: &[&str], needle: &[&str]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| {
        window
            .iter()
            .zip(needle)
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
    })
}

/// Position of the last run of `needle` inside `haystack`, ignoring case
fn rfind_window(haystack: &[&str], needle: &[&str]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).rposition(|window| {
        window
            .iter()
            .zip(needle)
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
    })
}

/// Returns the value that follows `marker` in `resource_uri`.
///
/// Both arguments may be given with or without a leading `/`. A missing
/// marker is not an error and yields an empty string.
///
/// When the name being looked up is the same as the resource group's name,
/// a plain search would land on the resource group instead. In that case the
/// segment after the *last* occurrence of the name is returned, e.g. the id
/// `.../resourceGroups/RG/providers/P/netAppAccounts/RG/capacityPools/Pool01`
/// with marker `/netAppAccounts` yields `capacityPools`.
pub fn get_resource_value(resource_uri: &str, marker: &str) -> Result<String> {
    if is_blank(resource_uri) {
        return Err(AnfError::invalid_argument("resource URI cannot be blank"));
    }
    if is_blank(marker) {
        return Err(AnfError::invalid_argument("resource marker cannot be blank"));
    }

    let uri = normalize(resource_uri.trim());
    let marker = normalize(marker.trim());
    let parts = segments(&uri);
    let marker_parts = segments(&marker);

    let resource_group = resource_group_of(&parts);

    // The marker is itself the resource group's name
    if let Some(rg) = resource_group {
        if marker_parts.len() == 1 && marker_parts[0].eq_ignore_ascii_case(rg) {
            return Ok(value_after_last(&parts, &marker_parts).unwrap_or_default());
        }
    }

    let Some(start) = find_window(&parts, &marker_parts) else {
        return Ok(String::new());
    };
    let Some(value) = parts.get(start + marker_parts.len()).copied() else {
        return Ok(String::new());
    };

    // The value found after a type marker is named like the resource group
    let marks_resource_group = marker_parts.len() == 1
        && marker_parts[0].eq_ignore_ascii_case(RESOURCE_GROUPS_MARKER.trim_start_matches('/'));
    if let Some(rg) = resource_group {
        if !marks_resource_group && value.eq_ignore_ascii_case(rg) {
            if let Some(following) = value_after_last(&parts, &[value]) {
                return Ok(following);
            }
        }
    }

    Ok(value.to_string())
}

fn normalize(value: &str) -> String {
    if value.starts_with('/') {
        value.to_string()
    } else {
        format!("/{value}")
    }
}

fn resource_group_of<'a>(parts: &[&'a str]) -> Option<&'a str> {
    let label = RESOURCE_GROUPS_MARKER.trim_start_matches('/');
    parts
        .iter()
        .position(|p| p.eq_ignore_ascii_case(label))
        .and_then(|i| parts.get(i + 1).copied())
}

fn value_after_last(parts: &[&str], name: &[&str]) -> Option<String> {
    let index = rfind_window(parts, name)?;
    parts.get(index + name.len()).map(|s| s.to_string())
}

/// Gets the resource name, everything after the final `/`
pub fn get_resource_name(resource_uri: &str) -> Result<String> {
    if is_blank(resource_uri) {
        return Err(AnfError::invalid_argument("resource URI cannot be blank"));
    }

    Ok(resource_uri
        .rsplit_once('/')
        .map(|(_, name)| name)
        .unwrap_or(resource_uri)
        .to_string())
}

/// Gets the subscription id
pub fn get_subscription(resource_uri: &str) -> Result<String> {
    get_resource_value(resource_uri, SUBSCRIPTIONS_MARKER)
}

/// Gets the resource group name
pub fn get_resource_group(resource_uri: &str) -> Result<String> {
    get_resource_value(resource_uri, RESOURCE_GROUPS_MARKER)
}

/// Gets the NetApp account name
pub fn get_anf_account(resource_uri: &str) -> Result<String> {
    get_resource_value(resource_uri, ACCOUNTS_MARKER)
}

/// Gets the capacity pool name
pub fn get_anf_capacity_pool(resource_uri: &str) -> Result<String> {
    get_resource_value(resource_uri, CAPACITY_POOLS_MARKER)
}

/// Gets the volume name
pub fn get_anf_volume(resource_uri: &str) -> Result<String> {
    get_resource_value(resource_uri, VOLUMES_MARKER)
}

/// Gets the snapshot name
pub fn get_anf_snapshot(resource_uri: &str) -> Result<String> {
    get_resource_value(resource_uri, SNAPSHOTS_MARKER)
}

/// Checks whether the id belongs to the `Microsoft.NetApp` provider
pub fn is_anf_resource(resource_uri: &str) -> bool {
    if is_blank(resource_uri) {
        return false;
    }

    segments(resource_uri).contains(&NETAPP_PROVIDER)
}

/// True when the id carries `/{label}/` followed by a name
fn has_typed_segment(parts: &[&str], label: &str) -> bool {
    parts
        .iter()
        .enumerate()
        .any(|(i, p)| *p == label && i + 1 < parts.len())
}

/// Classifies an id into the most specific ANF resource kind it names
pub fn classify(resource_uri: &str) -> Option<AnfResourceKind> {
    if !is_anf_resource(resource_uri) {
        return None;
    }

    let parts = segments(resource_uri);
    let kind = ANF_KIND_PRECEDENCE
        .iter()
        .copied()
        .find(|kind| has_typed_segment(&parts, kind.type_label()))?;

    if kind == AnfResourceKind::Account && parts.contains(&BACKUP_POLICIES_LABEL) {
        return None;
    }

    Some(kind)
}

/// Checks whether the id names a snapshot
pub fn is_anf_snapshot(resource_uri: &str) -> bool {
    classify(resource_uri) == Some(AnfResourceKind::Snapshot)
}

/// Checks whether the id names a volume
pub fn is_anf_volume(resource_uri: &str) -> bool {
    classify(resource_uri) == Some(AnfResourceKind::Volume)
}

/// Checks whether the id names a capacity pool
pub fn is_anf_capacity_pool(resource_uri: &str) -> bool {
    classify(resource_uri) == Some(AnfResourceKind::CapacityPool)
}

/// Checks whether the id names a NetApp account
pub fn is_anf_account(resource_uri: &str) -> bool {
    classify(resource_uri) == Some(AnfResourceKind::Account)
}

/// Every name that can be read out of an ANF resource id
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceCoordinates {
    pub subscription_id: String,
    pub resource_group: String,
    pub account: String,
    pub capacity_pool: Option<String>,
    pub volume: Option<String>,
    pub snapshot: Option<String>,
}

impl ResourceCoordinates {
    /// Parse an ANF resource id into its parent names.
    ///
    /// Fails when the id is blank or does not belong to `Microsoft.NetApp`.
    pub fn from_resource_id(resource_uri: &str) -> Result<Self> {
        if is_blank(resource_uri) {
            return Err(AnfError::invalid_argument("resource URI cannot be blank"));
        }
        if !is_anf_resource(resource_uri) {
            return Err(AnfError::invalid_argument(format!(
                "'{resource_uri}' is not an Azure NetApp Files resource"
            )));
        }

        let optional = |value: String| if value.is_empty() { None } else { Some(value) };

        Ok(Self {
            subscription_id: get_subscription(resource_uri)?,
            resource_group: get_resource_group(resource_uri)?,
            account: get_anf_account(resource_uri)?,
            capacity_pool: optional(get_anf_capacity_pool(resource_uri)?),
            volume: optional(get_anf_volume(resource_uri)?),
            snapshot: optional(get_anf_snapshot(resource_uri)?),
        })
    }
}
