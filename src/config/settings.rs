//! Configuration settings management
//!
//! This module handles loading configuration from multiple sources and
//! validating it before the workflow starts.

use crate::error::{AnfError, Result};
use crate::netapp::models::ServiceLevel;
use crate::netapp::polling::PollOptions;
use crate::utils::helpers::{generate_resource_name, gib_to_bytes, tib_to_bytes};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub location: String,
    pub resource_group: String,
    pub vnet_resource_group: String,
    pub vnet_name: String,
    pub subnet_name: String,
    pub account_name: String,
    pub pool_name: String,
    /// Valid service levels are Standard, Premium and Ultra
    pub service_level: String,
    /// 4 TiB is the minimum capacity pool size
    pub pool_size_bytes: u64,
    /// 100 GiB is the minimum volume size
    pub volume_size_bytes: u64,
    pub should_cleanup: bool,
    pub poll_interval_secs: u64,
    pub poll_max_attempts: u32,
    pub operation_poll_interval_secs: u64,
    pub tags: HashMap<String, String>,
    pub no_color: bool,
}

impl Default for Config {
    fn default() -> Self {
        let tags = HashMap::from([
            ("Author".to_string(), "ANF Rust Sample".to_string()),
            ("Service".to_string(), "Azure Netapp Files".to_string()),
        ]);

        Self {
            location: "westus2".to_string(),
            resource_group: "anf02-rg".to_string(),
            vnet_resource_group: "anf02-rg".to_string(),
            vnet_name: "vnet-03".to_string(),
            subnet_name: "anf-sn".to_string(),
            account_name: generate_resource_name(),
            pool_name: "Pool01".to_string(),
            service_level: "Standard".to_string(),
            pool_size_bytes: tib_to_bytes(4),
            volume_size_bytes: gib_to_bytes(100),
            should_cleanup: false,
            poll_interval_secs: 60,
            poll_max_attempts: 60,
            operation_poll_interval_secs: 10,
            tags,
            no_color: false,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("location", &self.location),
            ("resource_group", &self.resource_group),
            ("vnet_resource_group", &self.vnet_resource_group),
            ("vnet_name", &self.vnet_name),
            ("subnet_name", &self.subnet_name),
            ("account_name", &self.account_name),
            ("pool_name", &self.pool_name),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AnfError::config(format!("{} is required", field)));
            }
        }

        self.service_level.parse::<ServiceLevel>()?;

        if self.poll_max_attempts == 0 {
            return Err(AnfError::config("poll_max_attempts must be at least 1"));
        }

        if self.poll_interval_secs == 0 {
            return Err(AnfError::config("poll_interval_secs must be at least 1"));
        }

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AnfError::config("Unable to determine config directory"))?;
        Ok(config_dir.join("anf-sample").join("anf-sample.toml"))
    }

    pub fn nfsv3_volume_name(&self) -> String {
        format!("NFSv3-Vol-{}-{}", self.account_name, self.pool_name)
    }

    pub fn nfsv41_volume_name(&self) -> String {
        format!("NFSv41-Vol-{}-{}", self.account_name, self.pool_name)
    }

    pub fn snapshot_name(&self) -> String {
        format!("Snapshot-NFSv3-Vol-{}-{}", self.account_name, self.pool_name)
    }

    pub fn volume_from_snapshot_name(&self) -> String {
        format!(
            "NFSv3-FromSnapshot-Vol-{}-{}",
            self.account_name, self.pool_name
        )
    }

    /// Resource id of the delegated subnet volumes are attached to
    pub fn subnet_id(&self, subscription_id: &str) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/virtualNetworks/{}/subnets/{}",
            subscription_id, self.vnet_resource_group, self.vnet_name, self.subnet_name
        )
    }

    /// Existence-poll bounds used during cleanup
    pub fn poll_options(&self) -> PollOptions {
        PollOptions {
            interval: Duration::from_secs(self.poll_interval_secs),
            max_attempts: self.poll_max_attempts,
        }
    }

    pub fn operation_poll_interval(&self) -> Duration {
        Duration::from_secs(self.operation_poll_interval_secs)
    }
}

/// Load configuration from multiple sources with priority order:
/// 1. Command-line flags (applied by the caller)
/// 2. Environment variables
/// 3. Configuration file (`path`, or the default location)
/// 4. Default values
pub async fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    let config_path = match path {
        Some(path) => {
            if !path.exists() {
                return Err(AnfError::config(format!(
                    "Configuration file '{}' does not exist",
                    path.display()
                )));
            }
            Some(path.to_path_buf())
        }
        None => Config::get_config_path().ok().filter(|p| p.exists()),
    };

    if let Some(config_path) = config_path {
        debug!("Loading configuration from {}", config_path.display());
        config = load_from_file(&config_path).await?;
    }

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

async fn load_from_file(path: &Path) -> Result<Config> {
    let contents = tokio::fs::read_to_string(path).await?;

    // Try to parse as TOML first, then JSON as fallback
    if let Ok(config) = toml::from_str::<Config>(&contents) {
        return Ok(config);
    }

    let config = serde_json::from_str::<Config>(&contents).map_err(|e| {
        AnfError::config(format!(
            "Failed to parse configuration file '{}': {}",
            path.display(),
            e
        ))
    })?;
    Ok(config)
}

/// Apply `ANF_*` overrides using `lookup` to read variables
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let strings: [(&str, &mut String); 8] = [
        ("ANF_LOCATION", &mut config.location),
        ("ANF_RESOURCE_GROUP", &mut config.resource_group),
        ("ANF_VNET_RESOURCE_GROUP", &mut config.vnet_resource_group),
        ("ANF_VNET_NAME", &mut config.vnet_name),
        ("ANF_SUBNET_NAME", &mut config.subnet_name),
        ("ANF_ACCOUNT_NAME", &mut config.account_name),
        ("ANF_POOL_NAME", &mut config.pool_name),
        ("ANF_SERVICE_LEVEL", &mut config.service_level),
    ];
    for (key, field) in strings {
        if let Some(value) = lookup(key) {
            *field = value;
        }
    }

    if let Some(value) = lookup("ANF_SHOULD_CLEANUP") {
        config.should_cleanup = value.to_lowercase() == "true" || value == "1";
    }

    if let Some(value) = lookup("ANF_POLL_INTERVAL_SECS") {
        if let Ok(seconds) = value.parse::<u64>() {
            config.poll_interval_secs = seconds;
        }
    }

    if let Some(value) = lookup("ANF_POLL_MAX_ATTEMPTS") {
        if let Ok(attempts) = value.parse::<u32>() {
            config.poll_max_attempts = attempts;
        }
    }

    if let Some(value) = lookup("NO_COLOR") {
        config.no_color = !value.is_empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_sample() {
        let config = Config::default();
        assert_eq!(config.pool_size_bytes, 4_398_046_511_104);
        assert_eq!(config.volume_size_bytes, 107_374_182_400);
        assert_eq!(config.poll_options(), PollOptions::default());
        assert!(!config.should_cleanup);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_derived_names() {
        let config = Config {
            account_name: "quiet-lake-1234".to_string(),
            ..Config::default()
        };
        assert_eq!(config.nfsv3_volume_name(), "NFSv3-Vol-quiet-lake-1234-Pool01");
        assert_eq!(
            config.volume_from_snapshot_name(),
            "NFSv3-FromSnapshot-Vol-quiet-lake-1234-Pool01"
        );
        assert_eq!(
            config.subnet_id("sub"),
            "/subscriptions/sub/resourceGroups/anf02-rg/providers/Microsoft.Network/virtualNetworks/vnet-03/subnets/anf-sn"
        );
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        let env = HashMap::from([
            ("ANF_LOCATION", "eastus"),
            ("ANF_SHOULD_CLEANUP", "true"),
            ("ANF_POLL_MAX_ATTEMPTS", "5"),
            ("ANF_POLL_INTERVAL_SECS", "not-a-number"),
        ]);
        apply_env_overrides(&mut config, |key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.location, "eastus");
        assert!(config.should_cleanup);
        assert_eq!(config.poll_max_attempts, 5);
        assert_eq!(config.poll_interval_secs, 60);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = Config {
            service_level: "Gold".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AnfError::InvalidServiceLevel { .. })
        ));

        let config = Config {
            poll_max_attempts: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(AnfError::ConfigError(_))));

        let config = Config {
            pool_name: " ".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(AnfError::ConfigError(_))));
    }
}
